//! The backend REST API seam.
//!
//! All persistence lives in an external service. Core code reaches it only through
//! [`PatientBackend`], which hands back raw JSON so that field-name reconciliation stays in one
//! place ([`crate::reconcile`]). The HTTP implementation lives in the `api-client` crate.

use crate::auth::LoginResponse;
use serde_json::Value;

/// Failure talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("could not reach {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// HTTP status, when the backend answered with a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Operations the intake workflow needs from the backend.
///
/// Every call is a single request awaited by the caller. Implementations must not retry or fan
/// out on their own.
#[async_trait::async_trait]
pub trait PatientBackend: Send + Sync {
    /// `GET /patients/check-aadhar/{id}`. `None` when the backend answers `false`.
    async fn find_by_national_id(&self, national_id: &str) -> BackendResult<Option<Value>>;

    /// `GET /patients`.
    async fn list_patients(&self) -> BackendResult<Vec<Value>>;

    /// `GET /patients/{id}`.
    async fn get_patient(&self, patient_id: &str) -> BackendResult<Value>;

    /// `POST /patients`.
    async fn create_patient(&self, body: &Value) -> BackendResult<Value>;

    /// `PUT /patients/{id}`.
    async fn update_patient(&self, patient_id: &str, body: &Value) -> BackendResult<Value>;

    /// `GET /visits`.
    async fn list_visits(&self) -> BackendResult<Vec<Value>>;

    /// `GET /visits/patient/{id}`.
    async fn visits_for_patient(&self, patient_id: &str) -> BackendResult<Vec<Value>>;

    /// `GET /visits/patient/{id}/recent`, newest first.
    async fn recent_visits(&self, patient_id: &str) -> BackendResult<Vec<Value>>;

    /// `POST /visits/patient/{id}`.
    async fn create_visit(&self, patient_id: &str, body: &Value) -> BackendResult<Value>;

    /// `PUT /visits/{id}`.
    async fn update_visit(&self, visit_id: i64, body: &Value) -> BackendResult<Value>;

    /// `POST /auth/login`.
    async fn login(&self, nurse_id: &str, password: &str) -> BackendResult<LoginResponse>;

    /// `PUT /nurses/status/{id}?status=...`.
    async fn set_nurse_status(&self, nurse_id: &str, status: &str) -> BackendResult<()>;
}

#[async_trait::async_trait]
impl<T: PatientBackend + ?Sized> PatientBackend for std::sync::Arc<T> {
    async fn find_by_national_id(&self, national_id: &str) -> BackendResult<Option<Value>> {
        (**self).find_by_national_id(national_id).await
    }
    async fn list_patients(&self) -> BackendResult<Vec<Value>> {
        (**self).list_patients().await
    }
    async fn get_patient(&self, patient_id: &str) -> BackendResult<Value> {
        (**self).get_patient(patient_id).await
    }
    async fn create_patient(&self, body: &Value) -> BackendResult<Value> {
        (**self).create_patient(body).await
    }
    async fn update_patient(&self, patient_id: &str, body: &Value) -> BackendResult<Value> {
        (**self).update_patient(patient_id, body).await
    }
    async fn list_visits(&self) -> BackendResult<Vec<Value>> {
        (**self).list_visits().await
    }
    async fn visits_for_patient(&self, patient_id: &str) -> BackendResult<Vec<Value>> {
        (**self).visits_for_patient(patient_id).await
    }
    async fn recent_visits(&self, patient_id: &str) -> BackendResult<Vec<Value>> {
        (**self).recent_visits(patient_id).await
    }
    async fn create_visit(&self, patient_id: &str, body: &Value) -> BackendResult<Value> {
        (**self).create_visit(patient_id, body).await
    }
    async fn update_visit(&self, visit_id: i64, body: &Value) -> BackendResult<Value> {
        (**self).update_visit(visit_id, body).await
    }
    async fn login(&self, nurse_id: &str, password: &str) -> BackendResult<LoginResponse> {
        (**self).login(nurse_id, password).await
    }
    async fn set_nurse_status(&self, nurse_id: &str, status: &str) -> BackendResult<()> {
        (**self).set_nurse_status(nurse_id, status).await
    }
}
