use crate::backend::BackendError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {0}")]
    ValidationFailure(ValidationErrors),
    #[error("{0}")]
    NameMismatch(String),
    #[error("national ID verification unavailable: {0}")]
    VerificationUnavailable(#[source] BackendError),
    #[error("a patient with national ID {0} already exists")]
    DuplicateNationalId(String),
    #[error("no visits found for patient {0}")]
    NoVisits(String),
    #[error("backend response did not include a patient id")]
    MissingPatientId,
    #[error("visit record has no visit id")]
    MissingVisitId,
    #[error("{0} is required")]
    MissingCredential(&'static str),
    #[error("Nurse ID not found")]
    UnknownNurse,
    #[error("Incorrect password")]
    WrongPassword,
    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl IntakeError {
    /// Whether the error must be resolved by the operator before the form can be submitted.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            IntakeError::ValidationFailure(_)
                | IntakeError::NameMismatch(_)
                | IntakeError::DuplicateNationalId(_)
        )
    }
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
