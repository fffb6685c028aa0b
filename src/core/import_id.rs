//! Import ids let the budgeting API drop transactions it has already seen.
//!
//! Ids already handed out must never change, so the generator is chosen from
//! the transaction's own date against fixed cutovers, never from the time of
//! the run. New generators are appended with a later cutover.

use crate::domain::model::Transaction;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};

pub const IMPORT_ID_PREFIX: &str = "YBBR";
const V2_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportIdVersion {
    /// Memo hash plus plaintext amount and date. Can collide across accounts.
    V1,
    /// Hash of account IBAN, transaction id, date and amount.
    V2,
}

impl ImportIdVersion {
    fn generate(self, t: &Transaction) -> String {
        let date = t.date.format("%Y-%m-%d").to_string();
        let amount = t.amount.to_string();

        match self {
            ImportIdVersion::V1 => {
                let hash = Sha256::digest(t.memo.as_bytes());
                format!(
                    "{}:{}:{}:{}",
                    IMPORT_ID_PREFIX,
                    amount,
                    date,
                    hex::encode(&hash[..2])
                )
            }
            ImportIdVersion::V2 => {
                let mut hasher = Sha256::new();
                hasher.update(t.account.iban.as_bytes());
                hasher.update(t.id.as_bytes());
                hasher.update(date.as_bytes());
                hasher.update(amount.as_bytes());
                let mut id = format!("{}:{}", IMPORT_ID_PREFIX, hex::encode(hasher.finalize()));
                id.truncate(V2_LENGTH);
                id
            }
        }
    }
}

/// Ordered `(cutover, version)` table, newest cutover first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIdScheme {
    generations: Vec<(NaiveDate, ImportIdVersion)>,
}

impl ImportIdScheme {
    pub fn new(v1_cutover: NaiveDate, v2_cutover: NaiveDate) -> Self {
        Self {
            generations: vec![
                (v2_cutover, ImportIdVersion::V2),
                (v1_cutover, ImportIdVersion::V1),
            ],
        }
    }

    /// Newest generator whose cutover is on or before the transaction date.
    /// Transactions older than every cutover fall back to V1.
    pub fn version_for(&self, date: NaiveDate) -> ImportIdVersion {
        self.generations
            .iter()
            .find(|(cutover, _)| date >= *cutover)
            .map(|(_, version)| *version)
            .unwrap_or(ImportIdVersion::V1)
    }

    pub fn import_id(&self, t: &Transaction) -> String {
        self.version_for(t.date).generate(t)
    }
}
