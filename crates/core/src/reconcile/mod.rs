//! Backend field-name reconciliation.
//!
//! The backend is inconsistent about key naming: the same patient can arrive as
//! `{"aadharNumber": ..., "phoneNumber": ...}` from one endpoint and as
//! `{"aadhar_number": ..., "phone_number": ...}` from another. Each record kind declares one
//! alias table ([`patient::PATIENT_ALIASES`], [`visit::VISIT_ALIASES`]) and [`reconcile`] walks
//! it once, feeding the first present value for every field into a builder.
//!
//! A value is present when it is a non-empty string, a number (rendered as text) or `true`.
//! `null`, `""`, `false`, arrays and objects are treated as absent.

pub mod casing;
pub mod patient;
pub mod visit;

pub use casing::{to_camel_case, to_snake_case};
pub use patient::{PatientField, PatientRecord, PatientRecordBuilder, PATIENT_ALIASES};
pub use visit::{sort_newest_first, VisitField, VisitRecord, VisitRecordBuilder, VISIT_ALIASES};

use serde_json::Value;

/// One row of an alias table: a canonical field and the source keys tried, in order.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases<F: 'static> {
    pub field: F,
    pub aliases: &'static [&'static str],
}

/// A builder fed by [`reconcile`].
///
/// Fields that receive no value keep the builder's default.
pub trait AliasBuilder: Default {
    type Field: Copy + 'static;
    type Output;

    /// Ordered alias table for this record kind.
    const TABLE: &'static [FieldAliases<Self::Field>];

    fn set(&mut self, field: Self::Field, value: String);

    fn build(self) -> Self::Output;
}

/// Map raw backend JSON into a canonical record.
///
/// Non-object input yields the builder's defaults.
pub fn reconcile<B: AliasBuilder>(raw: &Value) -> B::Output {
    let mut builder = B::default();
    for row in B::TABLE {
        if let Some(value) = first_present(raw, row.aliases) {
            builder.set(row.field, value);
        }
    }
    builder.build()
}

/// The first alias in `aliases` whose value in `raw` is present, as text.
pub fn first_present(raw: &Value, aliases: &[&str]) -> Option<String> {
    let object = raw.as_object()?;
    aliases
        .iter()
        .filter_map(|alias| object.get(*alias))
        .find_map(present_text)
}

fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}
