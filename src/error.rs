//! Error types for the normalization pipeline
//!
//! Every variant except `Decode` and `Io` is a configuration error: it is
//! raised while a filter, aligner or summarizer is being built, never while
//! samples are flowing through it.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    /// Bucket size is zero or negative
    #[error("Invalid bucket size: {0} (must be a positive number of seconds)")]
    InvalidBucketSize(i64),

    /// Null filter policy name is not registered
    #[error("Unknown null filter: {0}")]
    UnknownNullFilter(String),

    /// Alignment mode name is not registered
    #[error("Unknown alignment: {0}")]
    UnknownAlignment(String),

    /// Aggregator name is not registered
    #[error("Unknown aggregator: {0}")]
    UnknownAggregator(String),

    /// Summary method name is neither `last` nor a registered aggregator
    #[error("Unknown summary method: {0}")]
    UnknownMethod(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Whether this error comes from an invalid configuration value
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidBucketSize(_)
                | Error::UnknownNullFilter(_)
                | Error::UnknownAlignment(_)
                | Error::UnknownAggregator(_)
                | Error::UnknownMethod(_)
                | Error::Config(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownAggregator("median".to_string());
        assert_eq!(err.to_string(), "Unknown aggregator: median");

        let err = Error::InvalidBucketSize(0);
        assert!(err.to_string().contains("0"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(Error::InvalidBucketSize(-5).is_configuration());
        assert!(Error::UnknownNullFilter("drop".into()).is_configuration());
        assert!(!Error::Decode("bad pair".into()).is_configuration());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(!Error::from(io).is_configuration());
    }
}
