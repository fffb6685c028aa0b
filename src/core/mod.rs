pub mod account;
pub mod batch;
pub mod date;
pub mod engine;
pub mod import_id;
pub mod mapper;
pub mod payee;

pub use crate::domain::model::{SourceTransaction, Transaction};
pub use crate::domain::ports::{Reader, Writer};
pub use crate::utils::error::Result;
