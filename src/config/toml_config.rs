use crate::adapters::aggregator::{AggregatorReader, LinkedAccount};
use crate::adapters::json::JsonWriter;
use crate::adapters::ynab::{YnabDestination, YnabWriter, DEFAULT_BASE_URL};
use crate::core::account::AccountResolver;
use crate::core::batch::MappingConfig;
use crate::core::engine::SyncEngine;
use crate::core::import_id::ImportIdScheme;
use crate::core::mapper::{Mapper, TransactionIdField};
use crate::core::payee::parse_sources;
use crate::domain::model::{Account, ClearedStatus};
use crate::domain::ports::{Reader, Writer};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_one_of, validate_url, Validate,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const READERS: [&str; 1] = ["aggregator"];
pub const WRITERS: [&str; 2] = ["ynab", "json"];

const DEFAULT_AGGREGATOR_URL: &str = "https://bankaccountdata.gocardless.com";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

fn default_readers() -> Vec<String> {
    vec!["aggregator".to_string()]
}

fn default_writers() -> Vec<String> {
    vec!["ynab".to_string()]
}

fn default_aggregator_url() -> String {
    DEFAULT_AGGREGATOR_URL.to_string()
}

fn default_payee_source() -> Vec<String> {
    vec!["name".to_string()]
}

fn default_transaction_id() -> String {
    "TransactionId".to_string()
}

fn default_ynab_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cleared() -> String {
    "uncleared".to_string()
}

fn default_v1_cutover() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn default_v2_cutover() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 1).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_readers")]
    pub readers: Vec<String>,
    #[serde(default = "default_writers")]
    pub writers: Vec<String>,
    /// Seconds between runs; absent or zero runs once.
    pub interval_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub ynab: YnabConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default = "default_aggregator_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub bank_id: String,
    #[serde(default = "default_payee_source")]
    pub payee_source: Vec<String>,
    #[serde(default = "default_transaction_id")]
    pub transaction_id: String,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_aggregator_url(),
            access_token: String::new(),
            bank_id: String::new(),
            payee_source: default_payee_source(),
            transaction_id: default_transaction_id(),
            accounts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Aggregator account id.
    pub id: String,
    pub iban: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YnabConfig {
    #[serde(default = "default_ynab_url")]
    pub base_url: String,
    #[serde(default)]
    pub budget_id: String,
    #[serde(default)]
    pub token: String,
    pub from_date: Option<NaiveDate>,
    #[serde(default = "default_cleared")]
    pub cleared: String,
    #[serde(default)]
    pub account_map: HashMap<String, String>,
    #[serde(default)]
    pub swap_flow: Vec<String>,
    #[serde(default)]
    pub import_id: ImportIdConfig,
}

impl Default for YnabConfig {
    fn default() -> Self {
        Self {
            base_url: default_ynab_url(),
            budget_id: String::new(),
            token: String::new(),
            from_date: None,
            cleared: default_cleared(),
            account_map: HashMap::new(),
            swap_flow: Vec::new(),
            import_id: ImportIdConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportIdConfig {
    #[serde(default = "default_v1_cutover")]
    pub v1: NaiveDate,
    #[serde(default = "default_v2_cutover")]
    pub v2: NaiveDate,
}

impl Default for ImportIdConfig {
    fn default() -> Self {
        Self {
            v1: default_v1_cutover(),
            v2: default_v2_cutover(),
        }
    }
}

impl SyncConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment variable's value. Unknown
    /// variables are left untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn uses_reader(&self, name: &str) -> bool {
        self.readers.iter().any(|r| r == name)
    }

    pub fn uses_writer(&self, name: &str) -> bool {
        self.writers.iter().any(|w| w == name)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_seconds
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_list("readers", &self.readers)?;
        validate_non_empty_list("writers", &self.writers)?;
        for reader in &self.readers {
            validate_one_of("readers", reader, &READERS)?;
        }
        for writer in &self.writers {
            validate_one_of("writers", writer, &WRITERS)?;
        }

        // Parsed here so a bad choice stops the program before any request.
        self.mapper()?;

        if self.uses_reader("aggregator") {
            validate_url("aggregator.base_url", &self.aggregator.base_url)?;
            validate_non_empty_string("aggregator.access_token", &self.aggregator.access_token)?;
            validate_non_empty_list("aggregator.accounts", &self.aggregator.accounts)?;
            for account in &self.aggregator.accounts {
                validate_non_empty_string("aggregator.accounts.id", &account.id)?;
                validate_non_empty_string("aggregator.accounts.iban", &account.iban)?;
            }
        }

        if self.uses_writer("ynab") {
            validate_url("ynab.base_url", &self.ynab.base_url)?;
            validate_non_empty_string("ynab.budget_id", &self.ynab.budget_id)?;
            validate_non_empty_string("ynab.token", &self.ynab.token)?;
            self.ynab.cleared.parse::<ClearedStatus>()?;
        }

        Ok(())
    }

    pub fn mapper(&self) -> Result<Mapper> {
        let payee_sources = parse_sources(&self.aggregator.payee_source)?;
        let transaction_id: TransactionIdField = self.aggregator.transaction_id.parse()?;
        Ok(Mapper::for_bank(
            &self.aggregator.bank_id,
            payee_sources,
            transaction_id,
        ))
    }

    pub fn mapping_config(&self) -> Result<MappingConfig> {
        Ok(MappingConfig {
            mapper: self.mapper()?,
            accounts: AccountResolver::new(self.ynab.account_map.clone()),
            swap_flow: self.ynab.swap_flow.iter().cloned().collect(),
            from_date: self.ynab.from_date,
            import_ids: ImportIdScheme::new(self.ynab.import_id.v1, self.ynab.import_id.v2),
            cleared: self.ynab.cleared.parse()?,
        })
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        let timeout = self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?)
    }

    fn linked_accounts(&self) -> Vec<LinkedAccount> {
        self.aggregator
            .accounts
            .iter()
            .map(|a| LinkedAccount {
                id: a.id.clone(),
                account: Account {
                    iban: a.iban.clone(),
                    name: if a.name.is_empty() {
                        a.iban.clone()
                    } else {
                        a.name.clone()
                    },
                },
            })
            .collect()
    }

    /// Wires the configured readers and writers into an engine.
    pub fn build_engine(&self, dry_run: bool) -> Result<SyncEngine> {
        let client = self.http_client()?;

        let mut readers: Vec<Box<dyn Reader>> = Vec::new();
        for reader in &self.readers {
            match reader.as_str() {
                "aggregator" => readers.push(Box::new(AggregatorReader::new(
                    client.clone(),
                    self.aggregator.base_url.clone(),
                    self.aggregator.access_token.clone(),
                    self.linked_accounts(),
                ))),
                other => {
                    return Err(SyncError::InvalidConfigValueError {
                        field: "readers".to_string(),
                        value: other.to_string(),
                        reason: "Unknown reader".to_string(),
                    })
                }
            }
        }

        let mut writers: Vec<Box<dyn Writer>> = Vec::new();
        for writer in &self.writers {
            match writer.as_str() {
                "ynab" => writers.push(Box::new(
                    YnabWriter::new(
                        client.clone(),
                        YnabDestination {
                            base_url: self.ynab.base_url.clone(),
                            budget_id: self.ynab.budget_id.clone(),
                            token: self.ynab.token.clone(),
                        },
                        self.mapping_config()?,
                    )
                    .with_dry_run(dry_run),
                )),
                "json" => writers.push(Box::new(JsonWriter::new(self.mapper()?))),
                other => {
                    return Err(SyncError::InvalidConfigValueError {
                        field: "writers".to_string(),
                        value: other.to_string(),
                        reason: "Unknown writer".to_string(),
                    })
                }
            }
        }

        Ok(SyncEngine::new(readers, writers))
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
readers = ["aggregator"]
writers = ["ynab"]

[aggregator]
base_url = "https://aggregator.example.com"
access_token = "agg-token"
bank_id = "SOME_BANK"
payee_source = ["unstructured", "name"]
transaction_id = "InternalTransactionId"

[[aggregator.accounts]]
id = "acc-1"
iban = "DK001"
name = "Checking"

[ynab]
budget_id = "budget-1"
token = "ynab-token"
from_date = "2023-01-01"
cleared = "Cleared"
swap_flow = ["DK001"]

[ynab.account_map]
DK001 = "acct-1"

[ynab.import_id]
v1 = "2022-01-01"
v2 = "2023-06-01"
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = SyncConfig::from_toml_str(BASIC).unwrap();
        config.validate().unwrap();

        assert_eq!(config.aggregator.accounts[0].iban, "DK001");
        assert_eq!(config.ynab.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.interval(), None);

        let mapping = config.mapping_config().unwrap();
        assert_eq!(mapping.cleared, ClearedStatus::Cleared);
        assert_eq!(mapping.accounts.resolve("DK001").unwrap(), "acct-1");
        assert!(mapping.swap_flow.contains("DK001"));
        assert_eq!(mapping.from_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(
            mapping.import_ids,
            ImportIdScheme::new(
                NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
            )
        );
        assert!(matches!(mapping.mapper, Mapper::Default { .. }));
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_toml_str("").unwrap();

        assert_eq!(config.readers, vec!["aggregator"]);
        assert_eq!(config.writers, vec!["ynab"]);
        assert_eq!(config.aggregator.payee_source, vec!["name"]);
        assert_eq!(config.ynab.cleared, "uncleared");
        assert_eq!(
            config.ynab.import_id.v1,
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
        // Missing credentials fail validation.
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nordea_bank_id_selects_nordea_mapper() {
        let config =
            SyncConfig::from_toml_str(&BASIC.replace("SOME_BANK", "NORDEA_NDEADKKK")).unwrap();
        assert_eq!(config.mapper().unwrap(), Mapper::Nordea);
    }

    #[test]
    fn test_unrecognized_choices_fail_validation() {
        let bad_payee = BASIC.replace(r#"["unstructured", "name"]"#, r#"["nickname"]"#);
        let bad_id = BASIC.replace(r#""InternalTransactionId""#, r#""Id""#);
        let bad_cleared = BASIC.replace(r#""Cleared""#, r#""pending""#);
        let bad_writer = BASIC.replace(r#"writers = ["ynab"]"#, r#"writers = ["csv"]"#);

        for content in [bad_payee, bad_id, bad_cleared, bad_writer] {
            let config = SyncConfig::from_toml_str(&content).unwrap();
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, SyncError::InvalidConfigValueError { .. }),
                "unexpected error: {}",
                err
            );
        }
    }

    #[test]
    fn test_json_writer_needs_no_ynab_credentials() {
        let content = r#"
writers = ["json"]

[aggregator]
access_token = "t"

[[aggregator.accounts]]
id = "acc-1"
iban = "DK001"
"#;
        let config = SyncConfig::from_toml_str(content).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.build_engine(false).is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BANK_SYNC_TEST_TOKEN", "from-env");

        let config = SyncConfig::from_toml_str(
            r#"
[ynab]
token = "${BANK_SYNC_TEST_TOKEN}"
budget_id = "${BANK_SYNC_TEST_UNSET_VARIABLE}"
"#,
        )
        .unwrap();

        assert_eq!(config.ynab.token, "from-env");
        assert_eq!(config.ynab.budget_id, "${BANK_SYNC_TEST_UNSET_VARIABLE}");

        std::env::remove_var("BANK_SYNC_TEST_TOKEN");
    }

    #[test]
    fn test_interval() {
        let config = SyncConfig::from_toml_str("interval_seconds = 0").unwrap();
        assert_eq!(config.interval(), None);

        let config = SyncConfig::from_toml_str("interval_seconds = 3600").unwrap();
        assert_eq!(config.interval(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = SyncConfig::from_toml_str("readers = [").unwrap_err();
        assert!(matches!(err, SyncError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = SyncConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.ynab.budget_id, "budget-1");
    }
}
