//! Aadhaar QR boundary support.
//!
//! This crate turns the text payload printed in an Aadhaar card's QR code into a structured
//! [`IdentityRecord`]. It is a boundary crate in the same sense as a wire-format crate: it knows
//! the payload layout and nothing about forms, patients or the backend.
//!
//! The payload is an XML-like element:
//!
//! ```text
//! <PrintLetterBarcodeData uid="123412341234" name="Asha Rao" gender="F" yob="1990"
//!   co="D/O Ram Rao" house="12" street="MG Road" vtc="Udupi" dist="Udupi" state="Karnataka"
//!   pc="576101"/>
//! ```
//!
//! Decoding is a pure, single pass over the input. There is no retained state between calls.

pub mod identity;
pub mod qr;

pub use identity::{IdentityGender, IdentityRecord};
pub use qr::{decode, try_decode, MARKER};

/// Errors returned when a scanned payload cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AadhaarError {
    #[error("payload does not contain the {MARKER} marker")]
    MissingMarker,

    #[error("payload attribute block is malformed: {0}")]
    MalformedAttributes(String),
}

/// Type alias for Results that can fail with an [`AadhaarError`].
pub type AadhaarResult<T> = Result<T, AadhaarError>;
