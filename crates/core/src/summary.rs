//! The success view shown after a submission.

use crate::backend::PatientBackend;
use crate::constants::{DEFAULT_STATUS, NOT_AVAILABLE};
use crate::reconcile::{
    first_present, sort_newest_first, PatientField, PatientRecord, VisitRecord, PATIENT_ALIASES,
};
use crate::IntakeResult;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Display-ready patient and latest-visit details. Every field is already rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub patient_id: String,
    pub full_name: String,
    pub guardian_name: String,
    pub gender: String,
    pub age: String,
    pub phone: String,
    pub national_id: String,
    pub address: String,
    pub blood_group: String,
    pub weight: String,
    pub blood_pressure: String,
    pub temperature: String,
    pub symptoms: String,
    pub complaint: String,
    pub status: String,
    pub visit_count: usize,
    pub op_no: String,
    pub reg_no: String,
    /// `MM/DD/YYYY`
    pub visit_date: String,
    /// `HH:MM:SS`
    pub visit_time: String,
}

impl VisitSummary {
    /// Build the summary from a patient and their visits.
    ///
    /// The newest visit supplies the medical fields and the visit timestamp. When there is no
    /// visit, or its date does not parse, `now` is shown instead.
    pub fn build(patient: &PatientRecord, visits: &[VisitRecord], now: NaiveDateTime) -> Self {
        let mut visits = visits.to_vec();
        sort_newest_first(&mut visits);
        let latest = visits.first();

        let from_visit = |pick: fn(&VisitRecord) -> &str| or_na(latest.map(pick).unwrap_or_default());
        let when = latest.and_then(VisitRecord::visit_datetime).unwrap_or(now);

        Self {
            patient_id: patient.patient_id.clone(),
            full_name: patient.full_name(),
            guardian_name: patient.guardian_name.clone(),
            gender: if patient.gender.is_empty() {
                "Not specified".to_string()
            } else {
                patient.gender.clone()
            },
            age: or_na(&patient.age),
            phone: or_na(&patient.phone),
            national_id: or_na(&patient.national_id),
            address: or_na(&patient.address),
            blood_group: or_na(&patient.blood_group),
            weight: from_visit(|v| v.weight.as_str()),
            blood_pressure: from_visit(|v| v.blood_pressure.as_str()),
            temperature: from_visit(|v| v.temperature.as_str()),
            symptoms: from_visit(|v| v.symptoms.as_str()),
            complaint: from_visit(|v| v.complaint.as_str()),
            status: latest
                .map(|v| v.status.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_STATUS)
                .to_string(),
            visit_count: visits.len().max(1),
            op_no: first_non_empty(latest.map(|v| v.op_no.as_str()), &patient.op_no),
            reg_no: first_non_empty(latest.map(|v| v.reg_no.as_str()), &patient.reg_no),
            visit_date: when.format("%m/%d/%Y").to_string(),
            visit_time: when.format("%H:%M:%S").to_string(),
        }
    }
}

/// Fetch a patient and their visits and build the summary.
///
/// # Errors
///
/// Returns [`crate::IntakeError::Backend`] if either request fails.
pub async fn load<B: PatientBackend + ?Sized>(
    backend: &B,
    patient_id: &str,
    now: NaiveDateTime,
) -> IntakeResult<VisitSummary> {
    let raw = backend.get_patient(patient_id).await?;
    let mut patient = PatientRecord::from_json(&raw);
    // The reconciler's gender default would hide a missing value.
    if !has_gender(&raw) {
        patient.gender.clear();
    }
    let visits: Vec<VisitRecord> = backend
        .visits_for_patient(patient_id)
        .await?
        .iter()
        .map(VisitRecord::from_json)
        .collect();
    Ok(VisitSummary::build(&patient, &visits, now))
}

fn has_gender(raw: &Value) -> bool {
    PATIENT_ALIASES
        .iter()
        .filter(|row| row.field == PatientField::Gender)
        .any(|row| first_present(raw, row.aliases).is_some())
}

fn or_na(value: &str) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

fn first_non_empty(from_visit: Option<&str>, from_patient: &str) -> String {
    or_na(
        from_visit
            .filter(|value| !value.is_empty())
            .unwrap_or(from_patient),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 12)
            .and_then(|d| d.and_hms_opt(18, 5, 9))
            .unwrap()
    }

    fn patient() -> PatientRecord {
        PatientRecord {
            patient_id: "001".into(),
            name: "Asha".into(),
            surname: "Rao".into(),
            age: "34".into(),
            op_no: "OP-P".into(),
            reg_no: "REG-P".into(),
            ..PatientRecord::default()
        }
    }

    #[test]
    fn uses_latest_visit_for_medical_fields() {
        let visits = vec![
            VisitRecord {
                visit_date: "2025-04-01T08:00:00".into(),
                weight: "60".into(),
                op_no: "OP-1".into(),
                ..VisitRecord::default()
            },
            VisitRecord {
                visit_date: "2025-04-11T16:34:05".into(),
                weight: "61.5".into(),
                blood_pressure: "120/80".into(),
                status: "Critical".into(),
                ..VisitRecord::default()
            },
        ];

        let summary = VisitSummary::build(&patient(), &visits, now());
        assert_eq!(summary.full_name, "Rao Asha");
        assert_eq!(summary.weight, "61.5");
        assert_eq!(summary.blood_pressure, "120/80");
        assert_eq!(summary.status, "Critical");
        assert_eq!(summary.symptoms, "N/A");
        assert_eq!(summary.visit_count, 2);
        assert_eq!(summary.visit_date, "04/11/2025");
        assert_eq!(summary.visit_time, "16:34:05");
        // The latest visit has no OP number, so the patient's is shown.
        assert_eq!(summary.op_no, "OP-P");
    }

    #[test]
    fn missing_values_render_placeholders() {
        let bare = PatientRecord {
            gender: String::new(),
            ..PatientRecord::default()
        };
        let summary = VisitSummary::build(&bare, &[], now());
        assert_eq!(summary.gender, "Not specified");
        assert_eq!(summary.age, "N/A");
        assert_eq!(summary.phone, "N/A");
        assert_eq!(summary.op_no, "N/A");
        assert_eq!(summary.reg_no, "N/A");
        assert_eq!(summary.status, "Active");
        assert_eq!(summary.visit_count, 1);
        assert_eq!(summary.visit_date, "04/12/2025");
        assert_eq!(summary.visit_time, "18:05:09");
    }

    #[test]
    fn visit_numbers_take_precedence_over_patient() {
        let visits = vec![VisitRecord {
            op_no: "OP-9".into(),
            reg_no: "REG-9".into(),
            ..VisitRecord::default()
        }];
        let summary = VisitSummary::build(&patient(), &visits, now());
        assert_eq!(summary.op_no, "OP-9");
        assert_eq!(summary.reg_no, "REG-9");
    }

    #[tokio::test]
    async fn load_fetches_patient_and_visits() {
        use crate::backend::mock::MockBackend;
        use serde_json::json;

        let backend = MockBackend::default()
            .with_patient(json!({ "patientId": "001", "name": "Asha", "surname": "Rao" }))
            .with_visit(json!({ "patientId": "001", "visitDate": "2025-04-11T16:34:05", "opNo": "OP-1" }));

        let summary = load(&backend, "001", now()).await.unwrap();
        assert_eq!(summary.full_name, "Rao Asha");
        assert_eq!(summary.gender, "Not specified");
        assert_eq!(summary.op_no, "OP-1");
        assert_eq!(
            backend.calls(),
            vec!["GET /patients/001", "GET /visits/patient/001"]
        );
    }

    #[tokio::test]
    async fn load_keeps_stored_gender() {
        use crate::backend::mock::MockBackend;
        use serde_json::json;

        let backend = MockBackend::default()
            .with_patient(json!({ "patientId": "001", "name": "Asha", "gender": "Female" }));

        let summary = load(&backend, "001", now()).await.unwrap();
        assert_eq!(summary.gender, "Female");
        assert_eq!(summary.visit_count, 1);
    }
}
