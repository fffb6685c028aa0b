use crate::utils::error::{Result, SyncError};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A bank account as reported by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub iban: String,
    pub name: String,
}

/// Integer amount in 1/1000 of the major currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milliunits(pub i64);

impl Milliunits {
    pub fn negate(self) -> Self {
        Milliunits(-self.0)
    }

    /// Parses a decimal major-unit amount such as `-123.45`. Digits past the
    /// third decimal are truncated toward zero; the flow is read from the
    /// untruncated value.
    pub fn parse_with_flow(value: &str) -> Result<(Self, Flow)> {
        let parse_error = |reason: &str| SyncError::AmountParseError {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let decimal = Decimal::from_str(value.trim()).map_err(|e| parse_error(&e.to_string()))?;
        let flow = if decimal > Decimal::ZERO {
            Flow::Inflow
        } else {
            Flow::Outflow
        };
        decimal
            .checked_mul(Decimal::from(1000))
            .and_then(|scaled| scaled.trunc().to_i64())
            .map(|units| (Milliunits(units), flow))
            .ok_or_else(|| parse_error("amount out of range"))
    }
}

/// Direction of money on the source account. Zero counts as outflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Inflow,
    Outflow,
}

impl fmt::Display for Milliunits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Milliunits {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self> {
        Milliunits::parse_with_flow(value).map(|(amount, _)| amount)
    }
}

/// Canonical transaction produced by a [`crate::core::mapper::Mapper`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub account: Account,
    pub id: String,
    pub date: NaiveDate,
    pub payee: String,
    pub memo: String,
    pub amount: Milliunits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAmount {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
}

/// Transaction in the shape returned by the account-data aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    pub transaction_id: String,
    pub internal_transaction_id: String,
    pub booking_date: String,
    pub value_date: String,
    pub transaction_amount: TransactionAmount,
    pub debtor_name: String,
    pub creditor_name: String,
    pub remittance_information_unstructured: String,
    pub additional_information: String,
}

/// One raw record together with the account it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTransaction {
    pub account: Account,
    pub raw: RawTransaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearedStatus {
    Cleared,
    #[default]
    Uncleared,
    Reconciled,
}

impl FromStr for ClearedStatus {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "cleared" => Ok(ClearedStatus::Cleared),
            "uncleared" => Ok(ClearedStatus::Uncleared),
            "reconciled" => Ok(ClearedStatus::Reconciled),
            _ => Err(SyncError::InvalidConfigValueError {
                field: "ynab.cleared".to_string(),
                value: value.to_string(),
                reason: "must be one of cleared, uncleared or reconciled".to_string(),
            }),
        }
    }
}

/// Wire shape of a single transaction sent to the budgeting API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YnabTransaction {
    pub account_id: String,
    pub date: String,
    pub amount: String,
    pub payee_name: String,
    pub memo: String,
    pub import_id: String,
    pub cleared: ClearedStatus,
    pub approved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YnabTransactions {
    pub transactions: Vec<YnabTransaction>,
}

/// Counts reported by a writer after a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// One-line report. In a dry run nothing left the process, so the
    /// planned count is not called sent.
    pub fn describe(&self, dry_run: bool) -> String {
        let sent = if dry_run {
            format!("{} planned (dry run, not sent)", self.sent)
        } else {
            format!("{} sent", self.sent)
        };
        format!("{}, {} skipped, {} failed", sent, self.skipped, self.failed)
    }
}
