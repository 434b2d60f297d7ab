//! Validated primitive types shared across the Arogith crates.
//!
//! Each type here is a thin newtype over `String` whose constructor enforces an invariant, so
//! downstream code can hold a `NationalId` or `PhoneNumber` without re-checking it.

/// Number of digits in an Aadhaar national identity number.
pub const NATIONAL_ID_DIGITS: usize = 12;

/// Number of digits in a mobile phone number.
pub const PHONE_DIGITS: usize = 10;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input contained something other than ASCII digits
    #[error("must contain only digits")]
    NonDigit,
    /// The input had the wrong number of digits
    #[error("must be {expected} digits (got {actual})")]
    WrongLength { expected: usize, actual: usize },
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn exact_digits(input: &str, expected: usize) -> Result<String, TextError> {
    if input.is_empty() {
        return Err(TextError::Empty);
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TextError::NonDigit);
    }
    if input.len() != expected {
        return Err(TextError::WrongLength {
            expected,
            actual: input.len(),
        });
    }
    Ok(input.to_owned())
}

/// A 12-digit Aadhaar number.
///
/// No whitespace or separators are accepted; callers strip formatting before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NationalId(String);

impl NationalId {
    /// Parses a national ID consisting of exactly 12 ASCII digits.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        exact_digits(input.as_ref(), NATIONAL_ID_DIGITS).map(Self)
    }

    /// Returns `true` when `input` would parse as a national ID.
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A 10-digit phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses a phone number consisting of exactly 10 ASCII digits.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        exact_digits(input.as_ref(), PHONE_DIGITS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! text_newtype_impls {
    ($ty:ty, $ctor:path) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ctor(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

text_newtype_impls!(NonEmptyText, NonEmptyText::new);
text_newtype_impls!(NationalId, NationalId::parse);
text_newtype_impls!(PhoneNumber, PhoneNumber::parse);
