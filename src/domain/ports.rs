use crate::domain::model::{BatchSummary, SourceTransaction};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Source of raw bank transactions. A reader returns everything it can see
/// or fails as a whole.
#[async_trait]
pub trait Reader: Send + Sync {
    fn name(&self) -> &str;
    async fn bulk(&self) -> Result<Vec<SourceTransaction>>;
}

/// Destination for a run's transactions.
#[async_trait]
pub trait Writer: Send + Sync {
    fn name(&self) -> &str;
    async fn bulk(&self, transactions: &[SourceTransaction]) -> Result<BatchSummary>;
}
