use crate::core::batch::{plan_batch, BatchEvent, BatchPlan, MappingConfig};
use crate::domain::model::{BatchSummary, SourceTransaction, YnabTransactions};
use crate::domain::ports::Writer;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

pub const DEFAULT_BASE_URL: &str = "https://api.youneedabudget.com";

/// Where and as whom to write.
#[derive(Debug, Clone)]
pub struct YnabDestination {
    pub base_url: String,
    pub budget_id: String,
    pub token: String,
}

impl YnabDestination {
    pub fn transactions_url(&self) -> String {
        format!(
            "{}/v1/budgets/{}/transactions",
            self.base_url.trim_end_matches('/'),
            self.budget_id
        )
    }
}

fn emit(event: &BatchEvent) {
    match event {
        BatchEvent::Skipped { account, date } => {
            tracing::debug!("Skipping transaction on {} dated {} (before from_date)", account, date);
        }
        BatchEvent::Truncated {
            field,
            account,
            date,
            max,
        } => {
            tracing::warn!(
                "{} on account {} on date {} is too long - truncated to {} characters",
                field,
                account,
                date,
                max
            );
        }
        BatchEvent::Failed {
            account,
            transaction,
            reason,
        } => {
            tracing::warn!(
                "Failed to parse transaction {} on account {}: {}",
                transaction,
                account,
                reason
            );
        }
    }
}

/// Sends a run's transactions to the budgeting API as one request.
pub struct YnabWriter {
    client: Client,
    destination: YnabDestination,
    config: MappingConfig,
    dry_run: bool,
}

impl YnabWriter {
    pub fn new(client: Client, destination: YnabDestination, config: MappingConfig) -> Self {
        Self {
            client,
            destination,
            config,
            dry_run: false,
        }
    }

    /// Plan and log the batch without sending it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn plan(&self, transactions: &[SourceTransaction]) -> BatchPlan {
        let plan = plan_batch(&self.config, transactions);
        plan.events.iter().for_each(emit);
        plan
    }

    async fn send(&self, plan: BatchPlan) -> Result<BatchSummary> {
        let summary = plan.summary();
        let body = YnabTransactions {
            transactions: plan.transactions,
        };
        let payload = serde_json::to_vec(&body)?;
        tracing::debug!("Request to YNAB: {}", String::from_utf8_lossy(&payload));

        let response = self
            .client
            .post(self.destination.transactions_url())
            .bearer_auth(&self.destination.token)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response from YNAB: {}", status);
        if status != StatusCode::CREATED {
            return Err(SyncError::WriteRejected {
                status: status.to_string(),
            });
        }

        Ok(summary)
    }
}

#[async_trait]
impl Writer for YnabWriter {
    fn name(&self) -> &str {
        "ynab"
    }

    async fn bulk(&self, transactions: &[SourceTransaction]) -> Result<BatchSummary> {
        let plan = self.plan(transactions);
        let summary = plan.summary();

        if plan.is_empty() {
            tracing::info!(
                "No transactions to write. {} got skipped and {} failed.",
                summary.skipped,
                summary.failed
            );
            return Ok(summary);
        }

        if self.dry_run {
            for t in &plan.transactions {
                tracing::info!(
                    "[dry run] {} {} {} {:?} ({})",
                    t.date,
                    t.account_id,
                    t.amount,
                    t.payee_name,
                    t.import_id
                );
            }
            tracing::info!("[dry run] {}", summary.describe(true));
            return Ok(summary);
        }

        let summary = self.send(plan).await?;
        tracing::info!("Successfully sent to YNAB: {}", summary.describe(false));
        Ok(summary)
    }
}
