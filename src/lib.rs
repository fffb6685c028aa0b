pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use config::SyncConfig;
pub use crate::core::engine::{RunSummary, SyncEngine};
pub use utils::error::{Result, SyncError};
