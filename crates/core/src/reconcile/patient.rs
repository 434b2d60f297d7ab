//! Canonical patient record.

use super::{AliasBuilder, FieldAliases};
use crate::constants::{DEFAULT_GENDER, DEFAULT_STATUS};
use serde::Serialize;
use serde_json::Value;

/// A patient as the rest of the client sees it, whatever key spelling the backend used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub patient_id: String,
    pub name: String,
    pub surname: String,
    pub guardian_name: String,
    pub gender: String,
    /// Kept as text; numeric ages are stringified.
    pub age: String,
    pub phone: String,
    pub address: String,
    pub blood_group: String,
    pub national_id: String,
    pub blood_pressure: String,
    pub weight: String,
    pub temperature: String,
    pub symptoms: String,
    pub status: String,
    pub complaint: String,
    pub op_no: String,
    pub reg_no: String,
    pub total_visits: u32,
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self {
            patient_id: String::new(),
            name: String::new(),
            surname: String::new(),
            guardian_name: String::new(),
            gender: DEFAULT_GENDER.to_string(),
            age: String::new(),
            phone: String::new(),
            address: String::new(),
            blood_group: String::new(),
            national_id: String::new(),
            blood_pressure: String::new(),
            weight: String::new(),
            temperature: String::new(),
            symptoms: String::new(),
            status: DEFAULT_STATUS.to_string(),
            complaint: String::new(),
            op_no: String::new(),
            reg_no: String::new(),
            total_visits: 0,
        }
    }
}

impl PatientRecord {
    /// Reconcile raw backend JSON into a record.
    pub fn from_json(raw: &Value) -> Self {
        super::reconcile::<PatientRecordBuilder>(raw)
    }

    /// `"surname name"`, skipping whichever part is empty.
    pub fn full_name(&self) -> String {
        [self.surname.as_str(), self.name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientField {
    PatientId,
    Name,
    Surname,
    GuardianName,
    Gender,
    Age,
    Phone,
    Address,
    BloodGroup,
    NationalId,
    BloodPressure,
    Weight,
    Temperature,
    Symptoms,
    Status,
    Complaint,
    OpNo,
    RegNo,
    TotalVisits,
}

const fn row(field: PatientField, aliases: &'static [&'static str]) -> FieldAliases<PatientField> {
    FieldAliases { field, aliases }
}

/// Patient alias table. Alias order is significant.
pub const PATIENT_ALIASES: &[FieldAliases<PatientField>] = &[
    row(PatientField::PatientId, &["patientId", "patient_id", "id"]),
    row(PatientField::Name, &["name", "first_name"]),
    row(PatientField::Surname, &["surname", "last_name"]),
    row(PatientField::GuardianName, &["father_name", "fatherName", "father"]),
    row(PatientField::Gender, &["gender"]),
    row(PatientField::Age, &["age"]),
    row(PatientField::Phone, &["phone_number", "phoneNumber", "phone"]),
    row(PatientField::Address, &["address"]),
    row(PatientField::BloodGroup, &["blood_group", "bloodGroup", "bloodgroup"]),
    row(PatientField::NationalId, &["aadhar_number", "aadharNumber"]),
    row(PatientField::BloodPressure, &["bp", "blood_pressure", "bloodPressure"]),
    row(PatientField::Weight, &["weight"]),
    row(PatientField::Temperature, &["temperature", "temp"]),
    row(
        PatientField::Symptoms,
        &["symptoms", "current_condition", "currentCondition", "condition"],
    ),
    row(PatientField::Status, &["status"]),
    row(PatientField::Complaint, &["complaint"]),
    row(PatientField::OpNo, &["opNo", "op_no"]),
    row(PatientField::RegNo, &["regNo", "reg_no"]),
    row(PatientField::TotalVisits, &["totalVisits", "total_visits"]),
];

#[derive(Debug, Default)]
pub struct PatientRecordBuilder {
    record: PatientRecord,
}

impl AliasBuilder for PatientRecordBuilder {
    type Field = PatientField;
    type Output = PatientRecord;

    const TABLE: &'static [FieldAliases<PatientField>] = PATIENT_ALIASES;

    fn set(&mut self, field: PatientField, value: String) {
        let r = &mut self.record;
        match field {
            PatientField::PatientId => r.patient_id = value,
            PatientField::Name => r.name = value,
            PatientField::Surname => r.surname = value,
            PatientField::GuardianName => r.guardian_name = value,
            PatientField::Gender => r.gender = value,
            PatientField::Age => r.age = value,
            PatientField::Phone => r.phone = value,
            PatientField::Address => r.address = value,
            PatientField::BloodGroup => r.blood_group = value,
            PatientField::NationalId => r.national_id = value,
            PatientField::BloodPressure => r.blood_pressure = value,
            PatientField::Weight => r.weight = value,
            PatientField::Temperature => r.temperature = value,
            PatientField::Symptoms => r.symptoms = value,
            PatientField::Status => r.status = value,
            PatientField::Complaint => r.complaint = value,
            PatientField::OpNo => r.op_no = value,
            PatientField::RegNo => r.reg_no = value,
            // Non-integer counts keep the default.
            PatientField::TotalVisits => {
                if let Ok(count) = value.parse() {
                    r.total_visits = count;
                }
            }
        }
    }

    fn build(self) -> PatientRecord {
        self.record
    }
}
