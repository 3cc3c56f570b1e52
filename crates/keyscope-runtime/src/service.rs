use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure of a single request against the data service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request never produced a response (connect, timeout, TLS...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with an error status.
    #[error("{message} (HTTP {status})")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Row selector used by update and delete: `column = value`.
#[derive(Debug, Clone, Copy)]
pub struct RowKey<'a> {
    pub column: &'a str,
    pub value: &'a Value,
}

impl<'a> RowKey<'a> {
    pub fn new(column: &'a str, value: &'a Value) -> Self {
        Self { column, value }
    }

    /// The value as it appears in a query-string filter: strings unquoted,
    /// everything else in its JSON form.
    pub fn filter_value(&self) -> String {
        match self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// The operations the prober needs from a data service.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Fetch the raw schema description document.
    async fn describe_schema(&self) -> Result<Value, ServiceError>;

    /// Insert `record` and return the stored row.
    async fn insert(&self, table: &str, record: &Map<String, Value>) -> Result<Value, ServiceError>;

    /// Select every visible row of `table`.
    async fn select_all(&self, table: &str) -> Result<Vec<Value>, ServiceError>;

    /// Overwrite the row matching `key` with `record`.
    async fn update(&self, table: &str, record: &Value, key: RowKey<'_>) -> Result<(), ServiceError>;

    /// Delete the row matching `key`.
    async fn delete(&self, table: &str, key: RowKey<'_>) -> Result<(), ServiceError>;
}
