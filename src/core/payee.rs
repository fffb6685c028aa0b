use crate::domain::model::{Flow, RawTransaction};
use crate::utils::error::{Result, SyncError};
use std::str::FromStr;

/// Where a payee name may be taken from, tried in configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayeeSource {
    /// Remittance text with everything but letters and digits removed.
    Unstructured,
    /// Debtor or creditor name depending on the direction of the money.
    Name,
    /// The aggregator's additional-information field, verbatim.
    Additional,
}

impl FromStr for PayeeSource {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "unstructured" => Ok(PayeeSource::Unstructured),
            "name" => Ok(PayeeSource::Name),
            "additional" => Ok(PayeeSource::Additional),
            other => Err(SyncError::InvalidConfigValueError {
                field: "aggregator.payee_source".to_string(),
                value: other.to_string(),
                reason: "unrecognized payee source, expected unstructured, name or additional"
                    .to_string(),
            }),
        }
    }
}

pub fn parse_sources(values: &[String]) -> Result<Vec<PayeeSource>> {
    values.iter().map(|v| v.parse()).collect()
}

/// Drops every character that is not a letter or a digit. Banks that put
/// dates and amounts in the remittance text would otherwise get a new payee
/// for every transaction.
pub fn strip_non_alphanumeric(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn name_payee(raw: &RawTransaction, flow: Flow) -> String {
    let (preferred, fallback) = match flow {
        Flow::Inflow => (&raw.debtor_name, &raw.creditor_name),
        Flow::Outflow => (&raw.creditor_name, &raw.debtor_name),
    };

    if !preferred.is_empty() {
        preferred.clone()
    } else {
        fallback.clone()
    }
}

fn from_source(source: PayeeSource, raw: &RawTransaction, flow: Flow) -> String {
    match source {
        PayeeSource::Unstructured => strip_non_alphanumeric(&raw.remittance_information_unstructured),
        PayeeSource::Name => name_payee(raw, flow),
        PayeeSource::Additional => raw.additional_information.clone(),
    }
}

/// First source yielding a non-empty name wins. An empty payee is a valid
/// outcome when every source comes up empty.
pub fn resolve_payee(sources: &[PayeeSource], raw: &RawTransaction, flow: Flow) -> String {
    sources
        .iter()
        .map(|source| from_source(*source, raw, flow))
        .find(|payee| !payee.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawTransaction {
        RawTransaction {
            debtor_name: "John Doe".to_string(),
            creditor_name: "Store A/S".to_string(),
            remittance_information_unstructured: "INV#2023-44, thanks!".to_string(),
            additional_information: "Card purchase".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_prefers_creditor_for_outflow() {
        let payee = resolve_payee(&[PayeeSource::Name], &raw(), Flow::Outflow);
        assert_eq!(payee, "Store A/S");
    }

    #[test]
    fn test_name_prefers_debtor_for_inflow() {
        let payee = resolve_payee(&[PayeeSource::Name], &raw(), Flow::Inflow);
        assert_eq!(payee, "John Doe");
    }

    #[test]
    fn test_name_falls_back_to_other_party() {
        let mut t = raw();
        t.creditor_name.clear();
        assert_eq!(resolve_payee(&[PayeeSource::Name], &t, Flow::Outflow), "John Doe");

        let mut t = raw();
        t.debtor_name.clear();
        assert_eq!(resolve_payee(&[PayeeSource::Name], &t, Flow::Inflow), "Store A/S");
    }

    #[test]
    fn test_unstructured_strips_punctuation_and_spaces() {
        let payee = resolve_payee(&[PayeeSource::Unstructured], &raw(), Flow::Outflow);
        assert_eq!(payee, "INV202344thanks");
        assert!(payee.chars().all(char::is_alphanumeric));
    }

    #[test]
    fn test_strip_keeps_non_ascii_letters() {
        assert_eq!(strip_non_alphanumeric("Føtex Århus, 12.05"), "FøtexÅrhus1205");
    }

    #[test]
    fn test_first_non_empty_source_wins() {
        let mut t = raw();
        t.debtor_name.clear();
        t.creditor_name.clear();
        let sources = [PayeeSource::Name, PayeeSource::Additional, PayeeSource::Unstructured];
        assert_eq!(resolve_payee(&sources, &t, Flow::Outflow), "Card purchase");
    }

    #[test]
    fn test_exhausted_sources_give_empty_payee() {
        let t = RawTransaction::default();
        let sources = [PayeeSource::Name, PayeeSource::Unstructured, PayeeSource::Additional];
        assert_eq!(resolve_payee(&sources, &t, Flow::Outflow), "");
        assert_eq!(resolve_payee(&[], &raw(), Flow::Outflow), "");
    }

    #[test]
    fn test_unrecognized_source_is_config_error() {
        let err = parse_sources(&["name".to_string(), "memo".to_string()]).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfigValueError { ref value, .. } if value == "memo"));
    }
}
