use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Search provider '{provider}' failed: {message}")]
    SearchError { provider: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl LeadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::HttpError(_) | LeadError::SearchError { .. } => ErrorCategory::Network,
            LeadError::CsvError(_) | LeadError::SerializationError(_) => ErrorCategory::Data,
            LeadError::ConfigValidationError { .. }
            | LeadError::InvalidConfigValueError { .. }
            | LeadError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LeadError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LeadError::HttpError(_) | LeadError::SearchError { .. } => ErrorSeverity::Medium,
            LeadError::CsvError(_)
            | LeadError::SerializationError(_)
            | LeadError::ConfigValidationError { .. }
            | LeadError::InvalidConfigValueError { .. }
            | LeadError::MissingConfigError { .. } => ErrorSeverity::High,
            LeadError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::HttpError(_) => {
                "Check your network connection and that the listing site is reachable".to_string()
            }
            LeadError::SearchError { provider, .. } => format!(
                "The '{}' search provider rejected the request; wait a few minutes or switch providers",
                provider
            ),
            LeadError::CsvError(_) | LeadError::SerializationError(_) => {
                "Inspect the scraped values for unexpected characters".to_string()
            }
            LeadError::IoError(_) => {
                "Make sure the output directory exists and is writable".to_string()
            }
            LeadError::ConfigValidationError { field, .. }
            | LeadError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting and run again", field)
            }
            LeadError::MissingConfigError { field } => {
                format!("Provide a value for '{}' in the config file or environment", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Data => format!("Could not process scraped data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;
