use thiserror::Error;

/// Failure to supply observations. The collector logs these and moves on.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limited")]
    RateLimit,

    #[error("Fixture file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source timed out after {0}s")]
    Timeout(u64),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// A single observation could not be scored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("Malformed {kind} observation: {reason}")]
    MalformedObservation { kind: &'static str, reason: String },
}

impl ScoreError {
    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        ScoreError::MalformedObservation {
            kind,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid threshold {name} = {value}: {reason}")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

pub type SourceResult<T> = Result<T, SourceError>;
