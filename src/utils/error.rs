use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// 上傳內容不是合法的分隔文字
    #[error("Failed to read CSV file: {message}")]
    Parse { message: String },

    #[error("No cleaned data available: {0}")]
    NoData(String),

    #[error("AI client not initialized. Please provide a valid API key.")]
    AiUnavailable,

    #[error("Could not connect to AI endpoint: {0}")]
    AiConnectivity(String),

    #[error("AI endpoint returned an error: {status} - {body}")]
    AiStatus { status: u16, body: String },

    #[error("Unexpected error during AI generation: {0}")]
    AiUnexpected(String),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Ai,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse { .. } | Self::NoData(_) | Self::CsvError(_) => ErrorCategory::Input,
            Self::AiUnavailable
            | Self::AiConnectivity(_)
            | Self::AiStatus { .. }
            | Self::AiUnexpected(_) => ErrorCategory::Ai,
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Config,
            Self::ZipError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // AI 失敗不影響儀表板本身
            Self::AiUnavailable | Self::NoData(_) => ErrorSeverity::Low,
            Self::AiConnectivity(_) | Self::AiStatus { .. } | Self::AiUnexpected(_) => {
                ErrorSeverity::Medium
            }
            Self::Parse { .. } | Self::CsvError(_) => ErrorSeverity::High,
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorSeverity::High,
            Self::ZipError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::Parse { .. } | Self::CsvError(_) => {
                "Make sure the file is UTF-8 comma-separated text with a header row".to_string()
            }
            Self::NoData(_) => "Upload a CSV with at least one dated row first".to_string(),
            Self::AiUnavailable => {
                "Provide an OpenRouter API key with --api-key or OPENROUTER_API_KEY".to_string()
            }
            Self::AiConnectivity(_) => {
                "Check your internet connection or the configured base URL".to_string()
            }
            Self::AiStatus { .. } => "Check your API key or model availability".to_string(),
            Self::AiUnexpected(_) => "Try again or choose a different model".to_string(),
            Self::MissingConfigError { field } => format!("Set a value for '{}'", field),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            Self::ConfigValidationError { field, .. } => {
                format!("Review the configuration near '{}'", field)
            }
            Self::IoError(_) => "Check that the path exists and is writable".to_string(),
            Self::ZipError(_) | Self::SerializationError(_) => {
                "Retry the export or disable it with --no-export".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Parse { message } => format!("Failed to read CSV file: {}", message),
            Self::AiUnavailable => {
                "AI client not initialized. Please provide a valid API key.".to_string()
            }
            Self::AiConnectivity(detail) => format!(
                "Could not connect to OpenRouter API: {}. Please check your internet connection or API key.",
                detail
            ),
            Self::AiStatus { status, body } => format!(
                "OpenRouter API returned an error: {} - {}. Please check your API key or model availability.",
                status, body
            ),
            Self::AiUnexpected(detail) => format!(
                "An unexpected error occurred during AI generation: {}",
                detail
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
