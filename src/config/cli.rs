use crate::config::toml_config::SyncConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "bank-sync")]
#[command(about = "Import bank transactions from an account-data aggregator into YNAB")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "bank-sync.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Map and log the batch without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds between runs, overrides the config file. 0 runs once.
    #[arg(long)]
    pub interval: Option<u64>,
}

impl CliArgs {
    pub fn load_config(&self) -> Result<SyncConfig> {
        let mut config = SyncConfig::from_file(&self.config)?;
        if let Some(interval) = self.interval {
            config.interval_seconds = Some(interval);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_arguments() {
        let args = CliArgs::try_parse_from([
            "bank-sync",
            "--config",
            "custom.toml",
            "--dry-run",
            "--interval",
            "60",
        ])
        .unwrap();

        assert_eq!(args.config, "custom.toml");
        assert!(args.dry_run);
        assert!(!args.verbose);
        assert_eq!(args.interval, Some(60));
    }

    #[test]
    fn test_interval_override() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"interval_seconds = 3600\n").unwrap();
        let path = temp_file.path().to_str().unwrap();

        let args = CliArgs::try_parse_from(["bank-sync", "-c", path, "--interval", "0"]).unwrap();
        assert_eq!(args.load_config().unwrap().interval(), None);

        let args = CliArgs::try_parse_from(["bank-sync", "-c", path]).unwrap();
        assert_eq!(
            args.load_config().unwrap().interval(),
            Some(Duration::from_secs(3600))
        );
    }
}
