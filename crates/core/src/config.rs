//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the backend client.
//! Request handling never reads process-wide environment variables, which keeps behaviour
//! consistent across threads and test harnesses.

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::{IntakeError, IntakeResult};
use std::time::Duration;

/// Backend client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_base_url: String,
    request_timeout: Duration,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// The base URL must be an absolute `http` or `https` URL. A trailing `/` is removed so
    /// endpoint paths can be appended directly.
    pub fn new(api_base_url: impl Into<String>, request_timeout: Duration) -> IntakeResult<Self> {
        let api_base_url = api_base_url.into();
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();

        if api_base_url.is_empty() {
            return Err(IntakeError::InvalidInput(
                "api base URL cannot be empty".into(),
            ));
        }

        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(IntakeError::InvalidInput(format!(
                "api base URL must start with http:// or https:// (got {api_base_url})"
            )));
        }

        if request_timeout.is_zero() {
            return Err(IntakeError::InvalidInput(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            request_timeout,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Resolve the base URL from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default local backend URL.
pub fn api_base_url_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

/// Parse the request timeout (whole seconds) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn request_timeout_from_env_value(value: Option<String>) -> IntakeResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let secs = value
        .map(|v| {
            v.parse::<u64>().map_err(|_| {
                IntakeError::InvalidInput(format!("request timeout must be whole seconds (got {v})"))
            })
        })
        .transpose()?;

    Ok(Duration::from_secs(
        secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
    ))
}
