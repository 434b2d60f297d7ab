//! Nurse login and logout.

use crate::backend::PatientBackend;
use crate::constants::{NURSE_STATUS_ACTIVE, NURSE_STATUS_INACTIVE};
use crate::{IntakeError, IntakeResult};
use serde::{Deserialize, Serialize};

/// The authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nurse {
    #[serde(alias = "nurseId")]
    pub nurse_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body returned by `POST /auth/login`, on success and on rejection alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nurse: Option<Nurse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Login flow against a [`PatientBackend`].
pub struct AuthService<B> {
    backend: B,
}

impl<B: PatientBackend> AuthService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Authenticate a nurse.
    ///
    /// On success the nurse is marked `Active`. That status update is best effort: a failure is
    /// logged and does not fail the login. Returns `None` when the backend accepts the
    /// credentials but sends no nurse details.
    ///
    /// # Errors
    ///
    /// - [`IntakeError::MissingCredential`] if either field is empty.
    /// - [`IntakeError::UnknownNurse`] / [`IntakeError::WrongPassword`] for the backend's
    ///   `invalid_nurse_id` / `invalid_password` codes.
    /// - [`IntakeError::LoginRejected`] for any other rejection.
    /// - [`IntakeError::Backend`] if the backend could not be reached.
    pub async fn login(&self, nurse_id: &str, password: &str) -> IntakeResult<Option<Nurse>> {
        let nurse_id = nurse_id.trim();
        if nurse_id.is_empty() {
            return Err(IntakeError::MissingCredential("Nurse ID"));
        }
        if password.is_empty() {
            return Err(IntakeError::MissingCredential("Password"));
        }

        let response = self.backend.login(nurse_id, password).await?;
        if !response.success {
            tracing::info!(
                nurse_id,
                error = response.error.as_deref().unwrap_or("unknown"),
                "login rejected"
            );
            return Err(match response.error.as_deref() {
                Some("invalid_nurse_id") => IntakeError::UnknownNurse,
                Some("invalid_password") => IntakeError::WrongPassword,
                _ => IntakeError::LoginRejected(response.message.unwrap_or_else(|| {
                    "Authentication failed. Please try again.".to_string()
                })),
            });
        }

        let Some(nurse) = response.nurse else {
            tracing::warn!(nurse_id, "login succeeded but no nurse data was returned");
            return Ok(None);
        };

        self.mark(&nurse, NURSE_STATUS_ACTIVE).await;
        tracing::info!(nurse_id = %nurse.nurse_id, "nurse logged in");
        Ok(Some(nurse))
    }

    /// Mark the nurse `INActive`. Failures are logged only.
    pub async fn logout(&self, nurse: &Nurse) {
        self.mark(nurse, NURSE_STATUS_INACTIVE).await;
        tracing::info!(nurse_id = %nurse.nurse_id, "nurse logged out");
    }

    async fn mark(&self, nurse: &Nurse, status: &str) {
        if let Err(err) = self.backend.set_nurse_status(&nurse.nurse_id, status).await {
            tracing::warn!(nurse_id = %nurse.nurse_id, status, "failed to update nurse status: {err}");
        }
    }
}
