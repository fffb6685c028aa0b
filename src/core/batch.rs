use crate::core::account::AccountResolver;
use crate::core::date::resolve_transaction_date;
use crate::core::import_id::ImportIdScheme;
use crate::core::mapper::Mapper;
use crate::domain::model::{
    BatchSummary, ClearedStatus, SourceTransaction, Transaction, YnabTransaction,
};
use crate::utils::error::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Max size of the memo field in the budgeting API.
pub const MAX_MEMO_SIZE: usize = 200;
/// Max size of the payee field in the budgeting API.
pub const MAX_PAYEE_SIZE: usize = 100;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Read-only settings shared by every record in a run.
#[derive(Debug, Clone)]
pub struct MappingConfig {
    pub mapper: Mapper,
    pub accounts: AccountResolver,
    /// IBANs whose inflow and outflow are reversed.
    pub swap_flow: HashSet<String>,
    /// Transactions dated before this are skipped.
    pub from_date: Option<NaiveDate>,
    pub import_ids: ImportIdScheme,
    pub cleared: ClearedStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Memo,
    Payee,
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextField::Memo => write!(f, "Memo"),
            TextField::Payee => write!(f, "Payee"),
        }
    }
}

/// Things worth telling the operator about while planning a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Skipped {
        account: String,
        date: NaiveDate,
    },
    Truncated {
        field: TextField,
        account: String,
        date: NaiveDate,
        max: usize,
    },
    Failed {
        account: String,
        transaction: String,
        reason: String,
    },
}

/// Outcome of mapping a run's records, before anything is sent.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    pub transactions: Vec<YnabTransaction>,
    pub skipped: usize,
    pub failed: usize,
    pub events: Vec<BatchEvent>,
}

impl BatchPlan {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            sent: self.transactions.len(),
            skipped: self.skipped,
            failed: self.failed,
        }
    }
}

/// Collapses whitespace runs into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Cuts `text` to `max - 1` characters when it is longer than `max` and
/// reports whether anything was cut.
pub fn truncate(text: &mut String, max: usize) -> bool {
    if text.chars().count() <= max {
        return false;
    }
    *text = text.chars().take(max.saturating_sub(1)).collect();
    true
}

fn prepare_text(
    raw: &str,
    field: TextField,
    max: usize,
    t: &Transaction,
    events: &mut Vec<BatchEvent>,
) -> String {
    let mut text = collapse_whitespace(raw);
    if truncate(&mut text, max) {
        events.push(BatchEvent::Truncated {
            field,
            account: t.account.name.clone(),
            date: t.date,
            max,
        });
    }
    text
}

/// Converts one canonical transaction into the budgeting API's shape.
pub fn to_ynab(
    config: &MappingConfig,
    mut t: Transaction,
    events: &mut Vec<BatchEvent>,
) -> Result<YnabTransaction> {
    let account_id = config.accounts.resolve(&t.account.iban)?.to_string();

    let memo = prepare_text(&t.memo, TextField::Memo, MAX_MEMO_SIZE, &t, events);
    let payee_name = prepare_text(&t.payee, TextField::Payee, MAX_PAYEE_SIZE, &t, events);

    // The import id is computed on the swapped amount.
    if config.swap_flow.contains(&t.account.iban) {
        t.amount = t.amount.negate();
    }

    Ok(YnabTransaction {
        import_id: config.import_ids.import_id(&t),
        account_id,
        date: t.date.format("%Y-%m-%d").to_string(),
        amount: t.amount.to_string(),
        payee_name,
        memo,
        cleared: config.cleared,
        approved: false,
    })
}

fn record_label(record: &SourceTransaction) -> String {
    if record.raw.transaction_id.is_empty() {
        record.raw.internal_transaction_id.clone()
    } else {
        record.raw.transaction_id.clone()
    }
}

/// Filters, maps and converts every record. Records dated before
/// `from_date` are skipped before any other work. A record that cannot be
/// mapped is counted as failed and left out; it never aborts the batch.
pub fn plan_batch(config: &MappingConfig, records: &[SourceTransaction]) -> BatchPlan {
    let mut plan = BatchPlan::default();

    for record in records {
        let result = resolve_transaction_date(&record.raw).and_then(|date| {
            if config.from_date.is_some_and(|from| date < from) {
                plan.events.push(BatchEvent::Skipped {
                    account: record.account.name.clone(),
                    date,
                });
                return Ok(None);
            }
            let t = config.mapper.map(&record.account, &record.raw)?;
            to_ynab(config, t, &mut plan.events).map(Some)
        });

        match result {
            Ok(Some(transaction)) => plan.transactions.push(transaction),
            Ok(None) => plan.skipped += 1,
            Err(e) => {
                plan.failed += 1;
                plan.events.push(BatchEvent::Failed {
                    account: record.account.iban.clone(),
                    transaction: record_label(record),
                    reason: e.to_string(),
                });
            }
        }
    }

    plan
}
