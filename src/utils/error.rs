use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is required")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse amount '{value}': {reason}")]
    AmountParseError { value: String, reason: String },

    #[error("Failed to parse any dates")]
    NoDateError,

    #[error("No account for: {iban}")]
    UnknownAccountError { iban: String },

    #[error("Failed to read transactions for account {account}: {status}")]
    ReadRejected { account: String, status: String },

    #[error("Failed to send request: {status}")]
    WriteRejected { status: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Mapping,
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ConfigError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SyncError::AmountParseError { .. }
            | SyncError::NoDateError
            | SyncError::UnknownAccountError { .. } => ErrorCategory::Mapping,
            SyncError::ApiError(_)
            | SyncError::IoError(_)
            | SyncError::SerializationError(_)
            | SyncError::ReadRejected { .. }
            | SyncError::WriteRejected { .. } => ErrorCategory::Transport,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Mapping => ErrorSeverity::Low,
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Only transport failures can succeed on a later run.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::ConfigError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => {
                "Check the configuration file and environment variables"
            }
            SyncError::AmountParseError { .. } | SyncError::NoDateError => {
                "The bank returned a malformed transaction; it will be skipped"
            }
            SyncError::UnknownAccountError { .. } => {
                "Add the IBAN to [ynab.account_map] in the configuration"
            }
            SyncError::ReadRejected { .. } => {
                "Verify the aggregator access token and that the requisition is still valid"
            }
            SyncError::WriteRejected { .. } => {
                "Verify the budget id and personal access token for the budgeting API"
            }
            SyncError::ApiError(_) | SyncError::IoError(_) => {
                "Check network connectivity and retry"
            }
            SyncError::SerializationError(_) => "Report this as a bug",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Mapping => format!("Could not map transaction: {}", self),
            ErrorCategory::Transport => format!("Sync failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
