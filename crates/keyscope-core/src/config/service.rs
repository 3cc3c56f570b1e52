//! Connection settings for the probed data service.
//!
//! The API key can be given in two ways (in order of precedence):
//! 1. `api_key_env` - name of an environment variable holding the key
//! 2. `api_key` - the key itself

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Where and how to reach the data service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// API key sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Path of the REST API below the base URL.
    #[serde(default = "default_rest_path")]
    pub rest_path: String,

    /// Per-request timeout. `None` leaves it to the transport.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            api_key_env: None,
            rest_path: default_rest_path(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> Result<&str, ConfigError> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        Ok(url.trim_end_matches('/'))
    }

    /// Root of the REST API: base URL joined with `rest_path`.
    pub fn rest_url(&self) -> Result<String, ConfigError> {
        let base = self.base_url()?;
        let path = self.rest_path.trim_matches('/');
        if path.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{}/{}", base, path))
        }
    }

    /// Resolve the API key, preferring the environment variable when configured.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Some(var) = &self.api_key_env {
            return match std::env::var(var) {
                Ok(key) if !key.is_empty() => Ok(key),
                _ => Err(ConfigError::MissingEnv(var.clone())),
            };
        }

        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

fn default_rest_path() -> String {
    "/rest/v1".to_string()
}

fn default_timeout() -> Option<u64> {
    Some(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> ServiceConfig {
        ServiceConfig {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn rest_url_joins_path() {
        assert_eq!(
            with_url("https://abc.supabase.co/").rest_url().unwrap(),
            "https://abc.supabase.co/rest/v1"
        );

        let mut cfg = with_url("http://localhost:3000");
        cfg.rest_path = "/".to_string();
        assert_eq!(cfg.rest_url().unwrap(), "http://localhost:3000");
    }

    #[test]
    fn rejects_missing_or_bad_url() {
        assert!(matches!(
            ServiceConfig::default().base_url(),
            Err(ConfigError::MissingUrl)
        ));
        assert!(matches!(
            with_url("ftp://x").base_url(),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn api_key_from_inline_value() {
        let mut cfg = with_url("https://x.co");
        assert!(matches!(cfg.resolve_api_key(), Err(ConfigError::MissingApiKey)));
        cfg.api_key = Some("anon-key".into());
        assert_eq!(cfg.resolve_api_key().unwrap(), "anon-key");
    }

    #[test]
    fn api_key_env_takes_precedence() {
        let mut cfg = with_url("https://x.co");
        cfg.api_key = Some("inline".into());
        cfg.api_key_env = Some("KEYSCOPE_TEST_UNSET_VARIABLE_4711".into());
        assert!(matches!(cfg.resolve_api_key(), Err(ConfigError::MissingEnv(_))));
    }
}
