use crate::domain::model::{Account, RawTransaction, SourceTransaction};
use crate::domain::ports::Reader;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// An aggregator account id together with the bank account it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    pub id: String,
    pub account: Account,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: TransactionLists,
}

#[derive(Debug, Default, Deserialize)]
struct TransactionLists {
    #[serde(default)]
    booked: Vec<RawTransaction>,
}

/// Reads booked transactions for every linked account. The access token is
/// obtained elsewhere; this reader only uses it.
pub struct AggregatorReader {
    client: Client,
    base_url: String,
    access_token: String,
    accounts: Vec<LinkedAccount>,
}

impl AggregatorReader {
    pub fn new(
        client: Client,
        base_url: String,
        access_token: String,
        accounts: Vec<LinkedAccount>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            accounts,
        }
    }

    async fn fetch(&self, linked: &LinkedAccount) -> Result<Vec<RawTransaction>> {
        let url = format!("{}/api/v2/accounts/{}/transactions/", self.base_url, linked.id);
        tracing::debug!("Making API request to: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());
        if !response.status().is_success() {
            return Err(SyncError::ReadRejected {
                account: linked.account.iban.clone(),
                status: response.status().to_string(),
            });
        }

        let body: TransactionsResponse = response.json().await?;
        Ok(body.transactions.booked)
    }
}

#[async_trait]
impl Reader for AggregatorReader {
    fn name(&self) -> &str {
        "aggregator"
    }

    async fn bulk(&self) -> Result<Vec<SourceTransaction>> {
        let mut transactions = Vec::new();
        for linked in &self.accounts {
            let booked = self.fetch(linked).await?;
            tracing::debug!(
                "Account {} ({}) returned {} booked transaction(s)",
                linked.account.name,
                linked.account.iban,
                booked.len()
            );
            transactions.extend(booked.into_iter().map(|raw| SourceTransaction {
                account: linked.account.clone(),
                raw,
            }));
        }
        Ok(transactions)
    }
}
