//! Intake form validation.
//!
//! [`validate`] checks a [`PatientDraft`] the way the intake form does before submitting, and on
//! success hands back a [`ValidatedPatient`] whose identifiers are already parsed.

use crate::draft::{DraftField, PatientDraft};
use arogith_types::{NationalId, NonEmptyText, PhoneNumber, TextError};
use std::collections::BTreeMap;

/// Which submission the form is preparing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// Registering a patient (new or returning) together with a new visit.
    Register,
    /// Editing a stored patient and their latest visit.
    Edit { patient_id: String },
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit { .. })
    }
}

/// Per-field validation messages, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<DraftField, String>);

impl ValidationErrors {
    pub fn insert(&mut self, field: DraftField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPatient {
    pub name: NonEmptyText,
    pub surname: NonEmptyText,
    pub guardian_name: NonEmptyText,
    pub gender: NonEmptyText,
    pub age: u32,
    pub phone: PhoneNumber,
    pub address: NonEmptyText,
    pub blood_group: NonEmptyText,
    pub national_id: NationalId,
    pub weight: String,
    pub blood_pressure: String,
    pub temperature: String,
    pub symptoms: String,
    pub complaint: String,
    pub status: String,
}

/// Validate a draft for submission.
///
/// # Arguments
///
/// * `draft` - The form state to check.
/// * `mode` - `Register` also requires the medical fields; `Edit` skips them.
/// * `name_conflict` - Reason from a failed name match, reported against name and surname.
///
/// # Errors
///
/// Returns every failing field with its message. A name conflict replaces any other message on
/// the name and surname fields.
pub fn validate(
    draft: &PatientDraft,
    mode: &FormMode,
    name_conflict: Option<&str>,
) -> Result<ValidatedPatient, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, DraftField::Name, &draft.name, "Name is required");
    let surname = required(
        &mut errors,
        DraftField::Surname,
        &draft.surname,
        "Surname is required",
    );
    let national_id = match NationalId::parse(&draft.national_id) {
        Ok(id) => Some(id),
        Err(TextError::Empty) => {
            errors.insert(DraftField::NationalId, "Aadhar number is required");
            None
        }
        Err(_) => {
            errors.insert(DraftField::NationalId, "Aadhar number must be 12 digits");
            None
        }
    };
    let guardian_name = required(
        &mut errors,
        DraftField::GuardianName,
        &draft.guardian_name,
        "Father's name is required",
    );
    let gender = required(
        &mut errors,
        DraftField::Gender,
        &draft.gender,
        "Gender is required",
    );
    let age = parse_age(&mut errors, &draft.age);
    let phone = match PhoneNumber::parse(&draft.phone) {
        Ok(phone) => Some(phone),
        Err(TextError::Empty) => {
            errors.insert(DraftField::Phone, "Phone number is required");
            None
        }
        Err(_) => {
            errors.insert(DraftField::Phone, "Phone number must be 10 digits");
            None
        }
    };
    let address = required(
        &mut errors,
        DraftField::Address,
        &draft.address,
        "Address is required",
    );
    let blood_group = required(
        &mut errors,
        DraftField::BloodGroup,
        &draft.blood_group,
        "Blood group is required",
    );

    if !mode.is_edit() {
        for (field, message) in [
            (DraftField::Weight, "Weight is required"),
            (DraftField::BloodPressure, "Blood pressure is required"),
            (DraftField::Temperature, "Temperature is required"),
            (DraftField::Symptoms, "Symptoms are required"),
            (DraftField::Complaint, "Complaint is required"),
        ] {
            if draft.get(field).is_empty() {
                errors.insert(field, message);
            }
        }
    }

    if let Some(reason) = name_conflict {
        errors.insert(DraftField::Name, reason);
        errors.insert(DraftField::Surname, reason);
    }

    match (
        name,
        surname,
        guardian_name,
        gender,
        age,
        phone,
        address,
        blood_group,
        national_id,
    ) {
        (
            Some(name),
            Some(surname),
            Some(guardian_name),
            Some(gender),
            Some(age),
            Some(phone),
            Some(address),
            Some(blood_group),
            Some(national_id),
        ) if errors.is_empty() => Ok(ValidatedPatient {
            name,
            surname,
            guardian_name,
            gender,
            age,
            phone,
            address,
            blood_group,
            national_id,
            weight: draft.weight.clone(),
            blood_pressure: draft.blood_pressure.clone(),
            temperature: draft.temperature.clone(),
            symptoms: draft.symptoms.clone(),
            complaint: draft.complaint.clone(),
            status: draft.status.clone(),
        }),
        _ => Err(errors),
    }
}

fn required(
    errors: &mut ValidationErrors,
    field: DraftField,
    value: &str,
    message: &str,
) -> Option<NonEmptyText> {
    match NonEmptyText::new(value) {
        Ok(text) => Some(text),
        Err(_) => {
            errors.insert(field, message);
            None
        }
    }
}

fn parse_age(errors: &mut ValidationErrors, age: &str) -> Option<u32> {
    let age = age.trim();
    if age.is_empty() {
        errors.insert(DraftField::Age, "Age is required");
        return None;
    }
    match age.parse() {
        Ok(age) => Some(age),
        Err(_) => {
            errors.insert(DraftField::Age, "Age must be a valid number");
            None
        }
    }
}
