use crate::core::date::resolve_transaction_date;
use crate::core::payee::{resolve_payee, strip_non_alphanumeric, PayeeSource};
use crate::domain::model::{Account, Milliunits, RawTransaction, Transaction};
use crate::utils::error::{Result, SyncError};
use std::str::FromStr;

pub const NORDEA_BANK_ID: &str = "NORDEA_NDEADKKK";

/// Which aggregator field identifies a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionIdField {
    #[default]
    TransactionId,
    InternalTransactionId,
}

impl TransactionIdField {
    fn pick(self, raw: &RawTransaction) -> &str {
        match self {
            TransactionIdField::TransactionId => &raw.transaction_id,
            TransactionIdField::InternalTransactionId => &raw.internal_transaction_id,
        }
    }
}

impl FromStr for TransactionIdField {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "TransactionId" => Ok(TransactionIdField::TransactionId),
            "InternalTransactionId" => Ok(TransactionIdField::InternalTransactionId),
            other => Err(SyncError::InvalidConfigValueError {
                field: "aggregator.transaction_id".to_string(),
                value: other.to_string(),
                reason: "expected TransactionId or InternalTransactionId".to_string(),
            }),
        }
    }
}

/// Turns an aggregator transaction into a canonical one. Picked once per run
/// from the bank id; banks with fixed field semantics get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapper {
    Default {
        payee_sources: Vec<PayeeSource>,
        transaction_id: TransactionIdField,
    },
    Nordea,
}

impl Mapper {
    pub fn for_bank(
        bank_id: &str,
        payee_sources: Vec<PayeeSource>,
        transaction_id: TransactionIdField,
    ) -> Self {
        match bank_id {
            NORDEA_BANK_ID => Mapper::Nordea,
            _ => Mapper::Default {
                payee_sources,
                transaction_id,
            },
        }
    }

    pub fn map(&self, account: &Account, raw: &RawTransaction) -> Result<Transaction> {
        let (amount, flow) = Milliunits::parse_with_flow(&raw.transaction_amount.amount)?;
        let date = resolve_transaction_date(raw)?;

        let (id, payee) = match self {
            Mapper::Default {
                payee_sources,
                transaction_id,
            } => (
                transaction_id.pick(raw).to_string(),
                resolve_payee(payee_sources, raw, flow),
            ),
            Mapper::Nordea => (
                raw.internal_transaction_id.clone(),
                strip_non_alphanumeric(&raw.remittance_information_unstructured),
            ),
        };

        Ok(Transaction {
            account: account.clone(),
            id,
            date,
            payee,
            memo: raw.remittance_information_unstructured.clone(),
            amount,
        })
    }
}
