//! # API Client
//!
//! HTTP implementation of [`PatientBackend`] for the Arogith backend REST API.
//!
//! One [`ApiClient`] wraps one `reqwest::Client` configured from a [`ClientConfig`]. Every trait
//! method is a single request: nothing is retried and nothing is cached. Responses are handed
//! back as raw JSON so that key reconciliation stays in `arogith-core`.

use arogith_core::{BackendError, BackendResult, ClientConfig, LoginResponse, PatientBackend};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

/// Backend client over HTTP.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    nurse_id: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BackendError::Transport {
                url: config.api_base_url().to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> (RequestBuilder, String) {
        let url = self.config.endpoint(path);
        tracing::debug!(%method, %url, "backend request");
        let builder = self
            .client
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");
        (builder, url)
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> BackendResult<Response> {
        builder.send().await.map_err(|e| BackendError::Transport {
            url: url.to_string(),
            message: if e.is_connect() {
                "connection refused".to_string()
            } else if e.is_timeout() {
                format!(
                    "request timed out after {}s",
                    self.config.request_timeout().as_secs()
                )
            } else {
                e.to_string()
            },
        })
    }

    /// Send and require a 2xx status.
    async fn send_checked(&self, builder: RequestBuilder, url: &str) -> BackendResult<Response> {
        let response = self.send(builder, url).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %url, "backend rejected request");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Send and decode the body as JSON. An empty body decodes as `null`.
    async fn json(&self, method: Method, path: &str, body: Option<&Value>) -> BackendResult<Value> {
        let (mut builder, url) = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send_checked(builder, &url).await?;
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn list(&self, path: &str) -> BackendResult<Vec<Value>> {
        match self.json(Method::GET, path, None).await? {
            Value::Array(items) => Ok(items),
            other => Err(BackendError::Decode(format!(
                "expected a JSON array from {path}, got {}",
                kind(&other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait::async_trait]
impl PatientBackend for ApiClient {
    async fn find_by_national_id(&self, national_id: &str) -> BackendResult<Option<Value>> {
        let path = format!("patients/check-aadhar/{national_id}");
        match self.json(Method::GET, &path, None).await? {
            Value::Bool(false) | Value::Null => Ok(None),
            record @ Value::Object(_) => Ok(Some(record)),
            other => Err(BackendError::Decode(format!(
                "expected false or a patient from {path}, got {}",
                kind(&other)
            ))),
        }
    }

    async fn list_patients(&self) -> BackendResult<Vec<Value>> {
        self.list("patients").await
    }

    async fn get_patient(&self, patient_id: &str) -> BackendResult<Value> {
        self.json(Method::GET, &format!("patients/{patient_id}"), None)
            .await
    }

    async fn create_patient(&self, body: &Value) -> BackendResult<Value> {
        self.json(Method::POST, "patients", Some(body)).await
    }

    async fn update_patient(&self, patient_id: &str, body: &Value) -> BackendResult<Value> {
        self.json(Method::PUT, &format!("patients/{patient_id}"), Some(body))
            .await
    }

    async fn list_visits(&self) -> BackendResult<Vec<Value>> {
        self.list("visits").await
    }

    async fn visits_for_patient(&self, patient_id: &str) -> BackendResult<Vec<Value>> {
        self.list(&format!("visits/patient/{patient_id}")).await
    }

    async fn recent_visits(&self, patient_id: &str) -> BackendResult<Vec<Value>> {
        self.list(&format!("visits/patient/{patient_id}/recent"))
            .await
    }

    async fn create_visit(&self, patient_id: &str, body: &Value) -> BackendResult<Value> {
        self.json(
            Method::POST,
            &format!("visits/patient/{patient_id}"),
            Some(body),
        )
        .await
    }

    async fn update_visit(&self, visit_id: i64, body: &Value) -> BackendResult<Value> {
        self.json(Method::PUT, &format!("visits/{visit_id}"), Some(body))
            .await
    }

    /// The backend answers rejected logins with a non-2xx status and a [`LoginResponse`] body,
    /// so the body is decoded before the status is considered.
    async fn login(&self, nurse_id: &str, password: &str) -> BackendResult<LoginResponse> {
        let (builder, url) = self.request(Method::POST, "auth/login");
        let response = self
            .send(builder.json(&LoginRequest { nurse_id, password }), &url)
            .await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        match serde_json::from_str::<LoginResponse>(&text) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            }),
            Err(e) => Err(BackendError::Decode(e.to_string())),
        }
    }

    async fn set_nurse_status(&self, nurse_id: &str, status: &str) -> BackendResult<()> {
        let (builder, url) = self.request(Method::PUT, &format!("nurses/status/{nurse_id}"));
        self.send_checked(builder.query(&[("status", status)]), &url)
            .await?;
        Ok(())
    }
}
