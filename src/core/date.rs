use crate::domain::model::RawTransaction;
use crate::utils::error::{Result, SyncError};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static REMITTANCE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}\.\d{2}\.\d{2}").expect("static regex"));

fn parse_iso(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn parse_remittance(remittance: &str) -> Option<NaiveDate> {
    let found = REMITTANCE_DATE.find(remittance)?;
    NaiveDate::parse_from_str(found.as_str(), "%Y.%m.%d").ok()
}

/// Returns the earliest of the value date, the booking date and a
/// `YYYY.MM.DD` prefix of the remittance text. Each signal is parsed on its
/// own; only when all three fail is the transaction undatable.
pub fn resolve_date(value_date: &str, booking_date: &str, remittance: &str) -> Result<NaiveDate> {
    [
        parse_remittance(remittance),
        parse_iso(value_date),
        parse_iso(booking_date),
    ]
    .into_iter()
    .flatten()
    .min()
    .ok_or(SyncError::NoDateError)
}

pub fn resolve_transaction_date(raw: &RawTransaction) -> Result<NaiveDate> {
    resolve_date(
        &raw.value_date,
        &raw.booking_date,
        &raw.remittance_information_unstructured,
    )
}
