//! Intake form state.
//!
//! A [`PatientDraft`] is the canonical, in-progress form. It is never mutated in place: every
//! change goes through [`PatientDraft::apply`] with a [`DraftAction`], which returns the next
//! draft. Field edits pass through the same input formatters the form applies while typing.

use crate::constants::{DEFAULT_GENDER, DEFAULT_STATUS};
use crate::matching::{self, MatchResult};
use crate::reconcile::PatientRecord;
use aadhaar::IdentityRecord;
use arogith_types::{NationalId, NATIONAL_ID_DIGITS, PHONE_DIGITS};
use serde::{Deserialize, Serialize};

/// Longest age the form accepts, in characters.
const AGE_MAX_DIGITS: usize = 3;

/// Form state, held as text exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientDraft {
    pub name: String,
    pub surname: String,
    pub guardian_name: String,
    pub gender: String,
    pub age: String,
    pub phone: String,
    pub address: String,
    pub blood_group: String,
    pub national_id: String,
    pub weight: String,
    pub blood_pressure: String,
    pub temperature: String,
    pub symptoms: String,
    pub complaint: String,
    pub status: String,
}

impl Default for PatientDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            surname: String::new(),
            guardian_name: String::new(),
            gender: DEFAULT_GENDER.to_string(),
            age: String::new(),
            phone: String::new(),
            address: String::new(),
            blood_group: String::new(),
            national_id: String::new(),
            weight: String::new(),
            blood_pressure: String::new(),
            temperature: String::new(),
            symptoms: String::new(),
            complaint: String::new(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

/// A single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    Name,
    Surname,
    GuardianName,
    Gender,
    Age,
    Phone,
    Address,
    BloodGroup,
    NationalId,
    Weight,
    BloodPressure,
    Temperature,
    Symptoms,
    Complaint,
    Status,
}

impl DraftField {
    /// The field's key in the form's JSON representation.
    pub fn key(self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Surname => "surname",
            DraftField::GuardianName => "guardianName",
            DraftField::Gender => "gender",
            DraftField::Age => "age",
            DraftField::Phone => "phone",
            DraftField::Address => "address",
            DraftField::BloodGroup => "bloodGroup",
            DraftField::NationalId => "nationalId",
            DraftField::Weight => "weight",
            DraftField::BloodPressure => "bloodPressure",
            DraftField::Temperature => "temperature",
            DraftField::Symptoms => "symptoms",
            DraftField::Complaint => "complaint",
            DraftField::Status => "status",
        }
    }
}

impl std::fmt::Display for DraftField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Transitions accepted by [`PatientDraft::apply`].
#[derive(Debug, Clone)]
pub enum DraftAction {
    /// Operator typed into a field.
    Edit(DraftField, String),
    /// A QR scan was decoded.
    ApplyScan {
        identity: IdentityRecord,
        current_year: i32,
    },
    /// The existence check found a record (or not) for the draft's national ID.
    ApplyExisting {
        record: Option<PatientRecord>,
        result: MatchResult,
    },
    /// Discard everything and start over.
    Reset,
}

impl PatientDraft {
    /// Pre-fill a draft from a stored patient, for edit mode.
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            surname: record.surname.clone(),
            guardian_name: record.guardian_name.clone(),
            gender: record.gender.clone(),
            age: record.age.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            blood_group: record.blood_group.clone(),
            national_id: record.national_id.clone(),
            weight: record.weight.clone(),
            blood_pressure: record.blood_pressure.clone(),
            temperature: record.temperature.clone(),
            symptoms: record.symptoms.clone(),
            complaint: record.complaint.clone(),
            status: record.status.clone(),
        }
    }

    /// Produce the next draft.
    pub fn apply(self, action: DraftAction) -> Self {
        match action {
            DraftAction::Edit(field, input) => self.edit(field, &input),
            DraftAction::ApplyScan {
                identity,
                current_year,
            } => self.scan(&identity, current_year),
            DraftAction::ApplyExisting { record, result } => match record {
                Some(record) => matching::autofill(self, &record, &result),
                None => self,
            },
            DraftAction::Reset => Self::default(),
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Surname => &self.surname,
            DraftField::GuardianName => &self.guardian_name,
            DraftField::Gender => &self.gender,
            DraftField::Age => &self.age,
            DraftField::Phone => &self.phone,
            DraftField::Address => &self.address,
            DraftField::BloodGroup => &self.blood_group,
            DraftField::NationalId => &self.national_id,
            DraftField::Weight => &self.weight,
            DraftField::BloodPressure => &self.blood_pressure,
            DraftField::Temperature => &self.temperature,
            DraftField::Symptoms => &self.symptoms,
            DraftField::Complaint => &self.complaint,
            DraftField::Status => &self.status,
        }
    }

    fn slot(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::Surname => &mut self.surname,
            DraftField::GuardianName => &mut self.guardian_name,
            DraftField::Gender => &mut self.gender,
            DraftField::Age => &mut self.age,
            DraftField::Phone => &mut self.phone,
            DraftField::Address => &mut self.address,
            DraftField::BloodGroup => &mut self.blood_group,
            DraftField::NationalId => &mut self.national_id,
            DraftField::Weight => &mut self.weight,
            DraftField::BloodPressure => &mut self.blood_pressure,
            DraftField::Temperature => &mut self.temperature,
            DraftField::Symptoms => &mut self.symptoms,
            DraftField::Complaint => &mut self.complaint,
            DraftField::Status => &mut self.status,
        }
    }

    fn edit(mut self, field: DraftField, input: &str) -> Self {
        *self.slot(field) = format_input(field, input);
        self
    }

    fn scan(mut self, identity: &IdentityRecord, current_year: i32) -> Self {
        let (surname, given) = identity.split_name();
        self.surname = surname;
        self.name = given;
        self.gender = identity.gender.to_string();
        if let Some(age) = identity.age_in(current_year) {
            self.age = age.to_string();
        }
        self.address = identity.address.clone();
        self.national_id = format_input(DraftField::NationalId, &identity.national_id);
        self.guardian_name = identity.guardian_name.clone();
        self
    }

    /// Whether the national ID is complete and can be checked against the backend.
    pub fn has_complete_national_id(&self) -> bool {
        NationalId::is_valid(&self.national_id)
    }
}

/// Apply the form's input formatter for `field`.
pub fn format_input(field: DraftField, input: &str) -> String {
    match field {
        DraftField::NationalId => digits_only(input, NATIONAL_ID_DIGITS),
        DraftField::Phone => digits_only(input, PHONE_DIGITS),
        DraftField::Age => digits_only(input, AGE_MAX_DIGITS),
        DraftField::Temperature | DraftField::Weight => one_decimal_place(input),
        _ => input.to_string(),
    }
}

fn digits_only(input: &str, max: usize) -> String {
    input.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Keep digits and the first `.`, with at most one digit after it.
fn one_decimal_place(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match cleaned.split_once('.') {
        None => cleaned,
        Some((whole, rest)) => {
            let decimals: String = rest.chars().filter(|c| *c != '.').take(1).collect();
            format!("{whole}.{decimals}")
        }
    }
}
