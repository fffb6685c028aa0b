use crate::utils::error::{Result, SyncError};
use std::collections::HashMap;

/// Static IBAN to budget account id lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountResolver {
    accounts: HashMap<String, String>,
}

impl AccountResolver {
    pub fn new(accounts: HashMap<String, String>) -> Self {
        Self { accounts }
    }

    pub fn resolve(&self, iban: &str) -> Result<&str> {
        self.accounts
            .get(iban)
            .map(String::as_str)
            .ok_or_else(|| SyncError::UnknownAccountError {
                iban: iban.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown_iban() {
        let resolver = AccountResolver::new(HashMap::from([(
            "DK001".to_string(),
            "acct-1".to_string(),
        )]));

        assert_eq!(resolver.resolve("DK001").unwrap(), "acct-1");
        let err = resolver.resolve("DK999").unwrap_err();
        assert_eq!(err.to_string(), "No account for: DK999");
    }
}
