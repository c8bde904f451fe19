use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Search service returned {status}: {message}")]
    SearchServiceError { status: u16, message: String },

    #[error("Sentiment classifier failed: {message}")]
    ClassifierError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Network,
    ExternalService,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::ValidationError { .. } => ErrorCategory::Validation,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::SearchServiceError { .. } | EtlError::ClassifierError { .. } => {
                ErrorCategory::ExternalService
            }
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Storage,
            EtlError::CsvError(_)
            | EtlError::XlsxError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 429 與 5xx 稍後重試通常就會成功
            EtlError::SearchServiceError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            EtlError::ApiError(_) => ErrorSeverity::Medium,
            EtlError::ClassifierError { .. } => ErrorSeverity::Low,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::SearchServiceError { status: 401, .. }
            | EtlError::SearchServiceError { status: 403, .. } => {
                "The search service rejected the credentials".to_string()
            }
            EtlError::SearchServiceError { status: 429, .. } => {
                "The search service rate limit was reached".to_string()
            }
            EtlError::SearchServiceError { .. } | EtlError::ApiError(_) => {
                "The tweet search failed".to_string()
            }
            EtlError::ValidationError { message } => format!("Invalid input: {}", message),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            EtlError::ConfigError { .. } | EtlError::ConfigValidationError { .. } => {
                "The configuration could not be loaded".to_string()
            }
            EtlError::IoError(_) | EtlError::ZipError(_) => {
                "The results could not be written to disk".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML file and the command line flags",
            ErrorCategory::Validation => {
                "Provide a keyword and a start date no later than the end date"
            }
            ErrorCategory::Network => "Check the network connection and try again",
            ErrorCategory::ExternalService => match self {
                EtlError::SearchServiceError { status: 401, .. }
                | EtlError::SearchServiceError { status: 403, .. } => {
                    "Verify BEARER_TOKEN in the environment or .env file"
                }
                EtlError::SearchServiceError { status: 429, .. } => {
                    "Wait for the rate limit window to reset"
                }
                _ => "Try again later or narrow the query",
            },
            ErrorCategory::Storage => "Check that the output directory is writable",
            ErrorCategory::Data => "Inspect the service responses with --verbose",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
