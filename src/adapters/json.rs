use crate::core::mapper::Mapper;
use crate::domain::model::{BatchSummary, SourceTransaction, Transaction};
use crate::domain::ports::Writer;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Prints mapped transactions to stdout as a JSON array.
pub struct JsonWriter {
    mapper: Mapper,
}

impl JsonWriter {
    pub fn new(mapper: Mapper) -> Self {
        Self { mapper }
    }

    pub fn render(&self, transactions: &[SourceTransaction]) -> Result<(String, BatchSummary)> {
        let mut summary = BatchSummary::default();
        let mut mapped: Vec<Transaction> = Vec::with_capacity(transactions.len());

        for record in transactions {
            match self.mapper.map(&record.account, &record.raw) {
                Ok(t) => mapped.push(t),
                Err(e) => {
                    tracing::warn!(
                        "Failed to map transaction on account {}: {}",
                        record.account.iban,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        summary.sent = mapped.len();
        Ok((serde_json::to_string_pretty(&mapped)?, summary))
    }
}

#[async_trait]
impl Writer for JsonWriter {
    fn name(&self) -> &str {
        "json"
    }

    async fn bulk(&self, transactions: &[SourceTransaction]) -> Result<BatchSummary> {
        let (output, summary) = self.render(transactions)?;
        println!("{}", output);
        Ok(summary)
    }
}
