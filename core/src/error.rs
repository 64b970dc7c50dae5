use docsearch_protocol::ServiceError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A fetch that did not produce a usable response. Never fatal: the caller is
/// left in a retryable state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("could not determine the home directory")]
    NoHomeDirectory,
}

pub type Result<T> = std::result::Result<T, FetchError>;
