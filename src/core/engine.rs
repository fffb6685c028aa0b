use crate::domain::model::{BatchSummary, SourceTransaction};
use crate::domain::ports::{Reader, Writer};
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub read: usize,
    pub written: Vec<(String, BatchSummary)>,
}

/// Reads everything from every reader, then hands the whole set to each
/// writer. Any read failure ends the run before a writer is touched.
pub struct SyncEngine {
    readers: Vec<Box<dyn Reader>>,
    writers: Vec<Box<dyn Writer>>,
}

impl SyncEngine {
    pub fn new(readers: Vec<Box<dyn Reader>>, writers: Vec<Box<dyn Writer>>) -> Self {
        Self { readers, writers }
    }

    pub async fn read_all(&self) -> Result<Vec<SourceTransaction>> {
        let mut transactions = Vec::new();
        for reader in &self.readers {
            tracing::debug!("Reading from {}", reader.name());
            let batch = reader.bulk().await?;
            tracing::info!("Read {} transaction(s) from {}", batch.len(), reader.name());
            transactions.extend(batch);
        }
        Ok(transactions)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting sync run");

        let transactions = self.read_all().await?;

        let mut summary = RunSummary {
            read: transactions.len(),
            written: Vec::with_capacity(self.writers.len()),
        };
        for writer in &self.writers {
            tracing::debug!("Writing to {}", writer.name());
            let result = writer.bulk(&transactions).await?;
            summary.written.push((writer.name().to_string(), result));
        }

        tracing::info!("Sync run finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Account, RawTransaction};
    use crate::utils::error::SyncError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticReader {
        ids: Vec<&'static str>,
    }

    #[async_trait]
    impl Reader for StaticReader {
        fn name(&self) -> &str {
            "static"
        }

        async fn bulk(&self) -> Result<Vec<SourceTransaction>> {
            Ok(self
                .ids
                .iter()
                .map(|id| SourceTransaction {
                    account: Account {
                        iban: "DK001".to_string(),
                        name: "Checking".to_string(),
                    },
                    raw: RawTransaction {
                        transaction_id: id.to_string(),
                        ..Default::default()
                    },
                })
                .collect())
        }
    }

    struct FailingReader;

    #[async_trait]
    impl Reader for FailingReader {
        fn name(&self) -> &str {
            "failing"
        }

        async fn bulk(&self) -> Result<Vec<SourceTransaction>> {
            Err(SyncError::ReadRejected {
                account: "acc".to_string(),
                status: "401 Unauthorized".to_string(),
            })
        }
    }

    struct CountingWriter {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Writer for CountingWriter {
        fn name(&self) -> &str {
            "counting"
        }

        async fn bulk(&self, transactions: &[SourceTransaction]) -> Result<BatchSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BatchSummary {
                sent: transactions.len(),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_run_concatenates_readers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = SyncEngine::new(
            vec![
                Box::new(StaticReader { ids: vec!["a", "b"] }),
                Box::new(StaticReader { ids: vec!["c"] }),
            ],
            vec![Box::new(CountingWriter { calls: calls.clone() })],
        );

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.read, 3);
        assert_eq!(summary.written.len(), 1);
        assert_eq!(summary.written[0].0, "counting");
        assert_eq!(summary.written[0].1.sent, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_read_failure_prevents_any_write() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = SyncEngine::new(
            vec![
                Box::new(StaticReader { ids: vec!["a"] }),
                Box::new(FailingReader),
            ],
            vec![Box::new(CountingWriter { calls: calls.clone() })],
        );

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, SyncError::ReadRejected { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
