//! Canonical visit record.

use super::{AliasBuilder, FieldAliases};
use crate::constants::DEFAULT_STATUS;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Reverse;

/// Timestamp layouts the backend has been seen to emit, tried in order.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub visit_id: Option<i64>,
    /// As sent by the backend; see [`VisitRecord::visit_datetime`].
    pub visit_date: String,
    pub blood_pressure: String,
    pub complaint: String,
    pub symptoms: String,
    pub op_no: String,
    pub reg_no: String,
    pub status: String,
    pub temperature: String,
    pub weight: String,
    pub prescription: String,
    pub patient_id: String,
}

impl Default for VisitRecord {
    fn default() -> Self {
        Self {
            visit_id: None,
            visit_date: String::new(),
            blood_pressure: String::new(),
            complaint: String::new(),
            symptoms: String::new(),
            op_no: String::new(),
            reg_no: String::new(),
            status: DEFAULT_STATUS.to_string(),
            temperature: String::new(),
            weight: String::new(),
            prescription: String::new(),
            patient_id: String::new(),
        }
    }
}

impl VisitRecord {
    pub fn from_json(raw: &Value) -> Self {
        super::reconcile::<VisitRecordBuilder>(raw)
    }

    /// Parse `visit_date` as a local timestamp.
    ///
    /// Accepts ISO-8601 with or without fractional seconds or an offset, a space-separated
    /// date and time, or a bare date (taken as midnight). Returns `None` for anything else.
    pub fn visit_datetime(&self) -> Option<NaiveDateTime> {
        let raw = self.visit_date.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.naive_local());
        }
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }
}

/// Sort visits newest first. Visits whose date does not parse go last, in their original order.
pub fn sort_newest_first(visits: &mut [VisitRecord]) {
    visits.sort_by_key(|visit| Reverse(visit.visit_datetime()));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitField {
    VisitId,
    VisitDate,
    BloodPressure,
    Complaint,
    Symptoms,
    OpNo,
    RegNo,
    Status,
    Temperature,
    Weight,
    Prescription,
    PatientId,
}

const fn row(field: VisitField, aliases: &'static [&'static str]) -> FieldAliases<VisitField> {
    FieldAliases { field, aliases }
}

/// Visit alias table. Alias order is significant.
pub const VISIT_ALIASES: &[FieldAliases<VisitField>] = &[
    row(VisitField::VisitId, &["visitId", "visit_id"]),
    row(VisitField::VisitDate, &["visitDate", "visit_date"]),
    row(VisitField::BloodPressure, &["bp", "blood_pressure"]),
    row(VisitField::Complaint, &["complaint"]),
    row(VisitField::Symptoms, &["symptoms"]),
    row(VisitField::OpNo, &["opNo", "op_no"]),
    row(VisitField::RegNo, &["regNo", "reg_no"]),
    row(VisitField::Status, &["status"]),
    row(VisitField::Temperature, &["temperature"]),
    row(VisitField::Weight, &["weight"]),
    row(VisitField::Prescription, &["prescription"]),
    row(VisitField::PatientId, &["patientId", "patient_id"]),
];

#[derive(Debug, Default)]
pub struct VisitRecordBuilder {
    record: VisitRecord,
}

impl AliasBuilder for VisitRecordBuilder {
    type Field = VisitField;
    type Output = VisitRecord;

    const TABLE: &'static [FieldAliases<VisitField>] = VISIT_ALIASES;

    fn set(&mut self, field: VisitField, value: String) {
        let r = &mut self.record;
        match field {
            VisitField::VisitId => r.visit_id = value.parse().ok(),
            VisitField::VisitDate => r.visit_date = value,
            VisitField::BloodPressure => r.blood_pressure = value,
            VisitField::Complaint => r.complaint = value,
            VisitField::Symptoms => r.symptoms = value,
            VisitField::OpNo => r.op_no = value,
            VisitField::RegNo => r.reg_no = value,
            VisitField::Status => r.status = value,
            VisitField::Temperature => r.temperature = value,
            VisitField::Weight => r.weight = value,
            VisitField::Prescription => r.prescription = value,
            VisitField::PatientId => r.patient_id = value,
        }
    }

    fn build(self) -> VisitRecord {
        self.record
    }
}
