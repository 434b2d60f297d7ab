//! # Arogith Core
//!
//! Client-side business logic for the Arogith patient intake workflow.
//!
//! This crate contains pure data operations and the workflow that drives them:
//! - Intake form state ([`PatientDraft`]) updated through reducer transitions
//! - Reconciliation of alias-inconsistent backend JSON into [`PatientRecord`] / [`VisitRecord`]
//! - Matching a draft against an Aadhaar-verified record
//! - Validation, registration, dashboard filtering, the visit summary and nurse login
//!
//! **No transport concerns**: the backend is reached only through the [`PatientBackend`] trait.
//! The HTTP implementation lives in `api-client`.

pub mod auth;
pub mod backend;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod draft;
mod error;
pub mod matching;
pub mod reconcile;
pub mod registration;
pub mod summary;
pub mod validation;

pub use auth::{AuthService, LoginResponse, Nurse};
pub use backend::{BackendError, BackendResult, PatientBackend};
pub use config::ClientConfig;
pub use dashboard::{DashboardTab, PatientSummary};
pub use draft::{DraftAction, DraftField, PatientDraft};
pub use error::{IntakeError, IntakeResult};
pub use matching::MatchResult;
pub use reconcile::{PatientRecord, VisitRecord};
pub use registration::{RegistrationService, SubmissionKind, SubmissionOutcome, Verification};
pub use summary::VisitSummary;
pub use validation::{FormMode, ValidatedPatient, ValidationErrors};
