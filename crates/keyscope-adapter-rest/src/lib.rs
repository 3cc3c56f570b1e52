//! # keyscope-adapter-rest
//!
//! [`DataService`] over a PostgREST-style HTTP API (the `/rest/v1` endpoint of
//! a Supabase project).
//!
//! | Operation | Request |
//! |-----------|---------|
//! | schema | `GET {base}/?apikey=<key>` |
//! | insert | `POST {base}/{table}` returning the row as a single object |
//! | select | `GET {base}/{table}?select=*` |
//! | update | `PATCH {base}/{table}?{pk}=eq.{value}` |
//! | delete | `DELETE {base}/{table}?{pk}=eq.{value}` |
//!
//! Every request carries the key in both the `apikey` and `Authorization`
//! headers.

use async_trait::async_trait;
use keyscope_core::{ConfigError, ServiceConfig};
use keyscope_runtime::{DataService, RowKey, ServiceError};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{RequestBuilder, Response, Url};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Errors raised while building a [`RestService`].
#[derive(Debug, Error)]
pub enum RestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid service url '{0}'")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// HTTP client bound to one REST endpoint and API key.
#[derive(Debug, Clone)]
pub struct RestService {
    client: reqwest::Client,
    base: Url,
    api_key: String,
}

impl RestService {
    /// Build from configuration, resolving the URL and key.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, RestError> {
        let rest_url = config.rest_url()?;
        let api_key = config.resolve_api_key()?;
        Self::new(&rest_url, api_key, config.timeout_seconds)
    }

    /// Build for the REST root `rest_url` (e.g. `https://xyz.supabase.co/rest/v1`).
    pub fn new(
        rest_url: &str,
        api_key: impl Into<String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, RestError> {
        let base = Url::parse(rest_url).map_err(|_| RestError::InvalidUrl(rest_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RestError::InvalidUrl(rest_url.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder.build().map_err(|e| RestError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base,
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segment: &str) -> Result<Url, ServiceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::Transport(format!("cannot extend url {}", self.base)))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = self.authorized(request).send().await.map_err(transport_error)?;
        tracing::debug!(url = %response.url(), status = %response.status(), "response");
        check_status(response).await
    }
}

#[async_trait]
impl DataService for RestService {
    async fn describe_schema(&self) -> Result<Value, ServiceError> {
        let url = self.endpoint("")?;
        let response = self
            .send(self.client.get(url).query(&[("apikey", &self.api_key)]))
            .await?;
        response.json().await.map_err(transport_error)
    }

    async fn insert(&self, table: &str, record: &Map<String, Value>) -> Result<Value, ServiceError> {
        let url = self.endpoint(table)?;
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
            .json(record);
        self.send(request).await?.json().await.map_err(transport_error)
    }

    async fn select_all(&self, table: &str) -> Result<Vec<Value>, ServiceError> {
        let url = self.endpoint(table)?;
        let body: Value = self
            .send(self.client.get(url).query(&[("select", "*")]))
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        match body {
            Value::Array(rows) => Ok(rows),
            other => Err(ServiceError::Decode(format!("expected an array of rows, got {}", other))),
        }
    }

    async fn update(&self, table: &str, record: &Value, key: RowKey<'_>) -> Result<(), ServiceError> {
        let url = self.endpoint(table)?;
        let request = self
            .client
            .patch(url)
            .query(&[eq_filter(key)])
            .header("Prefer", "return=minimal")
            .json(record);
        self.send(request).await.map(|_| ())
    }

    async fn delete(&self, table: &str, key: RowKey<'_>) -> Result<(), ServiceError> {
        let url = self.endpoint(table)?;
        self.send(self.client.delete(url).query(&[eq_filter(key)]))
            .await
            .map(|_| ())
    }
}

fn eq_filter(key: RowKey<'_>) -> (String, String) {
    (key.column.to_string(), format!("eq.{}", key.filter_value()))
}

fn transport_error(error: reqwest::Error) -> ServiceError {
    if error.is_decode() {
        ServiceError::Decode(error.to_string())
    } else {
        ServiceError::Transport(error.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

/// Turn an error response into [`ServiceError::Api`], taking `message` and
/// `code` from a JSON body when present.
fn api_error(status: u16, body: &str) -> ServiceError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    ServiceError::Api {
        status,
        message: field("message").unwrap_or_else(|| format!("HTTP {}", status)),
        code: field("code"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_reads_message_and_code() {
        let err = api_error(
            403,
            r#"{"code":"42501","details":null,"hint":null,"message":"permission denied for table users"}"#,
        );
        assert_eq!(
            err,
            ServiceError::Api {
                status: 403,
                message: "permission denied for table users".into(),
                code: Some("42501".into()),
            }
        );
    }

    #[test]
    fn api_error_without_json_body() {
        let err = api_error(502, "<html>Bad gateway</html>");
        assert_eq!(
            err,
            ServiceError::Api {
                status: 502,
                message: "HTTP 502".into(),
                code: None,
            }
        );
    }

    #[test]
    fn endpoints_extend_rest_root() {
        let svc = RestService::new("https://abc.supabase.co/rest/v1", "k", None).unwrap();
        assert_eq!(svc.endpoint("").unwrap().as_str(), "https://abc.supabase.co/rest/v1/");
        assert_eq!(
            svc.endpoint("user profiles").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/user%20profiles"
        );

        let root = RestService::new("http://localhost:3000/", "k", None).unwrap();
        assert_eq!(root.endpoint("users").unwrap().as_str(), "http://localhost:3000/users");
    }

    #[test]
    fn eq_filter_renders_value() {
        let id = json!("9f1c");
        assert_eq!(
            eq_filter(RowKey::new("uuid", &id)),
            ("uuid".to_string(), "eq.9f1c".to_string())
        );
    }

    #[test]
    fn from_config_requires_key() {
        let config = ServiceConfig {
            url: Some("https://abc.supabase.co".into()),
            ..Default::default()
        };
        assert!(matches!(
            RestService::from_config(&config),
            Err(RestError::Config(ConfigError::MissingApiKey))
        ));

        let config = ServiceConfig {
            api_key: Some("anon".into()),
            ..config
        };
        let svc = RestService::from_config(&config).unwrap();
        assert_eq!(svc.base_url().as_str(), "https://abc.supabase.co/rest/v1");
    }

    #[test]
    fn rejects_unusable_urls() {
        assert!(matches!(
            RestService::new("not a url", "k", None),
            Err(RestError::InvalidUrl(_))
        ));
        assert!(matches!(
            RestService::new("mailto:a@b.c", "k", None),
            Err(RestError::InvalidUrl(_))
        ));
    }
}
