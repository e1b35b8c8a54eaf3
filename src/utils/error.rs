use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollenError {
    #[error("error fetching from {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("upstream {url} responded with status {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("unable to parse pollen value for \"{value}\": {source}")]
    ParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Cache is empty, try again in a few seconds")]
    CacheEmpty,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

impl PollenError {
    /// Errors that clear up on their own once the next rebuild succeeds.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PollenError::CacheEmpty
                | PollenError::FetchError { .. }
                | PollenError::UpstreamStatus { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PollenError::FetchError { url, .. } | PollenError::UpstreamStatus { url, .. } => {
                format!("Could not download the pollen forecast from {}", url)
            }
            PollenError::ParseError { value, .. } => {
                format!("The forecast page contained an unexpected value: {:?}", value)
            }
            PollenError::ConfigError { message } => format!("Invalid configuration: {}", message),
            PollenError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PollenError::FetchError { .. } | PollenError::UpstreamStatus { .. } => {
                "Check network access to the source URL; the next refresh will retry"
            }
            PollenError::ParseError { .. } => {
                "The upstream markup may have changed; check the block selector"
            }
            PollenError::CacheEmpty => "Retry the request in a few seconds",
            PollenError::ConfigError { .. } | PollenError::InvalidConfigValueError { .. } => {
                "Fix the command line flags, environment or config file and restart"
            }
            PollenError::IoError(_) => "Check that the listen address is free and files are readable",
            PollenError::TaskError(_) => "Inspect the logs for a panic in a background task",
        }
    }
}

pub type Result<T> = std::result::Result<T, PollenError>;
