//! Error types shared across keyscope crates.

use thiserror::Error;

/// Failure to obtain the table list from the data service.
///
/// Probing cannot start without a schema, so this is the only error that
/// reaches the caller of a probe run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The service answered with a non-success status. Carries the service's
    /// own message.
    #[error("{0}")]
    Rejected(String),

    /// Transport failure or a document that could not be understood.
    #[error("Error fetching schema.")]
    Fetch,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("service url is not set (use --url, KEYSCOPE_URL or service.url)")]
    MissingUrl,

    #[error("service url '{0}' must start with http:// or https://")]
    InvalidUrl(String),

    #[error("API key is not set (use --key, KEYSCOPE_API_KEY, service.api_key or service.api_key_env)")]
    MissingApiKey,

    #[error("environment variable '{0}' referenced by service.api_key_env is not set")]
    MissingEnv(String),

    #[error("table '{0}' is both included and excluded")]
    ConflictingFilter(String),
}
