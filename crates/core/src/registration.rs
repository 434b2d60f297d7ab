//! Registration workflow: verify a national ID, then submit the draft.
//!
//! The service drives one submission at a time. Each backend call is awaited before the next is
//! made, and nothing is retried. Overlapping `verify` calls for the same draft are not
//! de-duplicated; callers discard a [`Verification`] whose `national_id` no longer matches.

use crate::backend::PatientBackend;
use crate::draft::PatientDraft;
use crate::matching::{compare_names, reconcile_existing, MatchResult};
use crate::reconcile::{to_camel_case, to_snake_case, PatientRecord, VisitRecord};
use crate::validation::{validate, FormMode, ValidatedPatient};
use crate::{IntakeError, IntakeResult};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Result of checking a draft's national ID against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// The national ID that was checked.
    pub national_id: String,
    /// The draft after autofill.
    pub draft: PatientDraft,
    pub result: MatchResult,
    /// The stored patient, when one exists.
    pub existing: Option<PatientRecord>,
}

impl Verification {
    pub fn existing_patient_id(&self) -> Option<&str> {
        self.existing
            .as_ref()
            .map(|record| record.patient_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionKind {
    /// A patient and their first visit were created.
    NewPatient,
    /// A visit was added for a returning patient.
    NewVisit,
    /// A stored patient and their latest visit were updated.
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub patient_id: String,
    pub kind: SubmissionKind,
    /// The patient as stored after the submission, when the backend returned it.
    pub patient: Option<PatientRecord>,
    /// Whether a visit was created or updated.
    pub visit_created: bool,
}

pub struct RegistrationService<B> {
    backend: B,
}

impl<B: PatientBackend> RegistrationService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check the draft's national ID and autofill from any stored record.
    ///
    /// Returns `Ok(None)` without contacting the backend when the national ID is not yet 12
    /// digits.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::VerificationUnavailable`] if the existence check fails. This is
    /// distinct from "no record".
    pub async fn verify(&self, draft: &PatientDraft) -> IntakeResult<Option<Verification>> {
        if !draft.has_complete_national_id() {
            return Ok(None);
        }

        let raw = self
            .backend
            .find_by_national_id(&draft.national_id)
            .await
            .map_err(IntakeError::VerificationUnavailable)?;
        let existing = raw.as_ref().map(PatientRecord::from_json);
        let (reconciled, result) = reconcile_existing(draft.clone(), existing.as_ref());

        tracing::info!(
            existing = existing.is_some(),
            conflict = result.is_conflict(),
            "national ID checked"
        );

        Ok(Some(Verification {
            national_id: draft.national_id.clone(),
            draft: reconciled,
            result,
            existing,
        }))
    }

    /// Submit the draft.
    ///
    /// `prior` is the last verification shown to the operator. It is ignored if it was made for
    /// a different national ID, and a fresh check is made instead. A reused verification is
    /// matched again against the draft's current names.
    ///
    /// # Errors
    ///
    /// - [`IntakeError::ValidationFailure`] if the draft is incomplete.
    /// - [`IntakeError::NameMismatch`] if the names conflict with the stored record.
    /// - [`IntakeError::VerificationUnavailable`] if a fresh existence check fails.
    /// - [`IntakeError::DuplicateNationalId`] if the backend answers 409 on create.
    /// - [`IntakeError::NoVisits`] / [`IntakeError::MissingVisitId`] in edit mode when there is
    ///   no latest visit to update.
    /// - [`IntakeError::MissingPatientId`] if a created patient comes back without an id.
    /// - [`IntakeError::Backend`] for any other backend failure.
    pub async fn submit(
        &self,
        draft: &PatientDraft,
        mode: &FormMode,
        prior: Option<&Verification>,
    ) -> IntakeResult<SubmissionOutcome> {
        let patient = validate(draft, mode, None).map_err(IntakeError::ValidationFailure)?;

        if let FormMode::Edit { patient_id } = mode {
            return self.update_existing(patient_id, &patient).await;
        }

        let verification = match prior.filter(|v| v.national_id == draft.national_id) {
            Some(prior) => Some(Verification {
                result: match &prior.existing {
                    Some(record) => compare_names(draft, record),
                    None => MatchResult::NoExistingRecord,
                },
                ..prior.clone()
            }),
            None => self.verify(draft).await?,
        };

        if let Some(reason) = verification
            .as_ref()
            .and_then(|v| v.result.conflict_reason())
        {
            return Err(IntakeError::NameMismatch(reason.to_string()));
        }

        let existing_id = verification
            .as_ref()
            .and_then(Verification::existing_patient_id)
            .map(str::to_string);

        match existing_id {
            Some(patient_id) => {
                self.backend
                    .create_visit(&patient_id, &visit_body(&patient))
                    .await?;
                tracing::info!(patient_id = %patient_id, "visit created for returning patient");
                Ok(SubmissionOutcome {
                    patient_id,
                    kind: SubmissionKind::NewVisit,
                    patient: verification.and_then(|v| v.existing),
                    visit_created: true,
                })
            }
            None => self.register_new(&patient).await,
        }
    }

    async fn register_new(&self, patient: &ValidatedPatient) -> IntakeResult<SubmissionOutcome> {
        let body = to_snake_case(new_patient_body(patient));
        let created = self
            .backend
            .create_patient(&body)
            .await
            .map_err(|err| match err.status() {
                Some(409) => IntakeError::DuplicateNationalId(patient.national_id.to_string()),
                _ => IntakeError::Backend(err),
            })?;

        let record = PatientRecord::from_json(&created);
        if record.patient_id.is_empty() {
            return Err(IntakeError::MissingPatientId);
        }
        let patient_id = record.patient_id.clone();
        tracing::info!(patient_id = %patient_id, "patient created");

        // The patient exists at this point; a failed visit does not undo it.
        let visit_created = match self
            .backend
            .create_visit(&patient_id, &visit_body(patient))
            .await
        {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(patient_id = %patient_id, "patient created but visit failed: {err}");
                false
            }
        };

        Ok(SubmissionOutcome {
            patient_id,
            kind: SubmissionKind::NewPatient,
            patient: Some(record),
            visit_created,
        })
    }

    async fn update_existing(
        &self,
        patient_id: &str,
        patient: &ValidatedPatient,
    ) -> IntakeResult<SubmissionOutcome> {
        let recent = self.backend.recent_visits(patient_id).await?;
        let latest = recent
            .first()
            .map(VisitRecord::from_json)
            .ok_or_else(|| IntakeError::NoVisits(patient_id.to_string()))?;
        let visit_id = latest.visit_id.ok_or(IntakeError::MissingVisitId)?;

        self.backend
            .update_patient(patient_id, &patient_update_body(patient))
            .await?;
        self.backend
            .update_visit(visit_id, &visit_update_body(patient, &latest))
            .await?;
        let stored = self.backend.get_patient(patient_id).await?;

        tracing::info!(patient_id, visit_id, "patient and latest visit updated");
        Ok(SubmissionOutcome {
            patient_id: patient_id.to_string(),
            kind: SubmissionKind::Updated,
            patient: Some(PatientRecord::from_json(&stored)),
            visit_created: true,
        })
    }
}

/// Patient fields for `POST /patients`, camelCase before snake-casing.
fn new_patient_body(patient: &ValidatedPatient) -> Value {
    json!({
        "name": patient.name.as_str(),
        "surname": patient.surname.as_str(),
        "fatherName": patient.guardian_name.as_str(),
        "gender": patient.gender.as_str(),
        "age": patient.age,
        "address": patient.address.as_str(),
        "bloodGroup": patient.blood_group.as_str(),
        "phoneNumber": patient.phone.as_str(),
        "aadharNumber": patient.national_id.as_str(),
    })
}

fn visit_body(patient: &ValidatedPatient) -> Value {
    json!({
        "bp": patient.blood_pressure,
        "weight": patient.weight,
        "temperature": patient.temperature,
        "symptoms": patient.symptoms,
        "status": patient.status,
        "complaint": patient.complaint,
    })
}

fn patient_update_body(patient: &ValidatedPatient) -> Value {
    let mut body = Map::new();
    insert_non_empty(&mut body, "name", patient.name.as_str());
    insert_non_empty(&mut body, "surname", patient.surname.as_str());
    insert_non_empty(&mut body, "father_name", patient.guardian_name.as_str());
    insert_non_empty(&mut body, "gender", patient.gender.as_str());
    body.insert("age".into(), patient.age.into());
    insert_non_empty(&mut body, "phone_number", patient.phone.as_str());
    insert_non_empty(&mut body, "address", patient.address.as_str());
    insert_non_empty(&mut body, "blood_group", patient.blood_group.as_str());
    to_camel_case(Value::Object(body))
}

/// Medical fields for `PUT /visits/{id}`. The latest visit's OP and registration numbers are
/// sent back unchanged.
fn visit_update_body(patient: &ValidatedPatient, latest: &VisitRecord) -> Value {
    let mut body = Map::new();
    insert_non_empty(&mut body, "bp", &patient.blood_pressure);
    insert_non_empty(&mut body, "weight", &patient.weight);
    insert_non_empty(&mut body, "temperature", &patient.temperature);
    insert_non_empty(&mut body, "symptoms", &patient.symptoms);
    insert_non_empty(&mut body, "status", &patient.status);
    insert_non_empty(&mut body, "complaint", &patient.complaint);
    insert_non_empty(&mut body, "op_no", &latest.op_no);
    insert_non_empty(&mut body, "reg_no", &latest.reg_no);
    to_camel_case(Value::Object(body))
}

fn insert_non_empty(body: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        body.insert(key.to_string(), Value::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::draft::DraftField;

    fn draft() -> PatientDraft {
        PatientDraft {
            name: "Asha".into(),
            surname: "Rao".into(),
            guardian_name: "Ram Rao".into(),
            gender: "Female".into(),
            age: "34".into(),
            phone: "9876543210".into(),
            address: "Udupi".into(),
            blood_group: "O+".into(),
            national_id: "123456789012".into(),
            weight: "61.5".into(),
            blood_pressure: "120/80".into(),
            temperature: "98.6".into(),
            symptoms: "fever".into(),
            complaint: "headache".into(),
            status: "Active".into(),
        }
    }

    fn stored_patient() -> Value {
        json!({
            "patientId": "001",
            "name": "Asha",
            "surname": "Rao",
            "fatherName": "Ram Rao",
            "gender": "Female",
            "age": 34,
            "phoneNumber": "9876543210",
            "address": "Udupi",
            "bloodGroup": "O+",
            "aadharNumber": "123456789012"
        })
    }

    #[tokio::test]
    async fn incomplete_national_id_skips_the_check() {
        let service = RegistrationService::new(MockBackend::default());
        let draft = PatientDraft {
            national_id: "12345".into(),
            ..draft()
        };
        assert_eq!(service.verify(&draft).await.unwrap(), None);
        assert!(service.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn verify_autofills_from_stored_record() {
        let service =
            RegistrationService::new(MockBackend::default().with_patient(stored_patient()));
        let draft = PatientDraft::default()
            .apply(crate::DraftAction::Edit(DraftField::NationalId, "123456789012".into()));

        let verification = service.verify(&draft).await.unwrap().unwrap();
        assert_eq!(verification.result, MatchResult::Matches);
        assert_eq!(verification.existing_patient_id(), Some("001"));
        assert_eq!(verification.draft.name, "Asha");
        assert_eq!(verification.draft.age, "34");
    }

    #[tokio::test]
    async fn failed_check_is_not_a_new_patient() {
        let service = RegistrationService::new(MockBackend {
            fail_with: Some(500),
            ..MockBackend::default()
        });
        let err = service.verify(&draft()).await.unwrap_err();
        assert!(matches!(err, IntakeError::VerificationUnavailable(_)));
    }

    #[tokio::test]
    async fn new_patient_is_created_with_snake_case_body_then_visit() {
        let service = RegistrationService::new(MockBackend::default());
        let outcome = service
            .submit(&draft(), &FormMode::Register, None)
            .await
            .unwrap();

        assert_eq!(outcome.kind, SubmissionKind::NewPatient);
        assert_eq!(outcome.patient_id, "001");
        assert!(outcome.visit_created);

        let backend = service.backend();
        assert_eq!(
            backend.calls(),
            vec![
                "GET /patients/check-aadhar/123456789012",
                "POST /patients",
                "POST /visits/patient/001",
            ]
        );
        let bodies = backend.bodies();
        assert_eq!(bodies[0]["father_name"], "Ram Rao");
        assert_eq!(bodies[0]["aadhar_number"], "123456789012");
        assert_eq!(bodies[0]["phone_number"], "9876543210");
        assert_eq!(bodies[0]["age"], 34);
        assert!(bodies[0].get("fatherName").is_none());
        assert_eq!(bodies[1]["bp"], "120/80");
        assert_eq!(bodies[1]["complaint"], "headache");
    }

    #[tokio::test]
    async fn returning_patient_gets_a_visit_only() {
        let service =
            RegistrationService::new(MockBackend::default().with_patient(stored_patient()));
        let prior = service.verify(&draft()).await.unwrap();

        let outcome = service
            .submit(&draft(), &FormMode::Register, prior.as_ref())
            .await
            .unwrap();

        assert_eq!(outcome.kind, SubmissionKind::NewVisit);
        assert_eq!(outcome.patient_id, "001");
        // The prior verification is reused; only one existence check is made.
        assert_eq!(
            service.backend().calls(),
            vec![
                "GET /patients/check-aadhar/123456789012",
                "POST /visits/patient/001",
            ]
        );
    }

    #[tokio::test]
    async fn conflicting_names_block_submission() {
        let service =
            RegistrationService::new(MockBackend::default().with_patient(stored_patient()));
        let draft = PatientDraft {
            name: "Priya".into(),
            ..draft()
        };

        let err = service
            .submit(&draft, &FormMode::Register, None)
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::NameMismatch(_)));
        assert!(err.is_blocking());
        assert!(!service
            .backend()
            .calls()
            .iter()
            .any(|call| call.starts_with("POST")));
    }

    #[tokio::test]
    async fn names_edited_after_verify_are_rematched() {
        let service =
            RegistrationService::new(MockBackend::default().with_patient(stored_patient()));
        let prior = service.verify(&draft()).await.unwrap();
        assert_eq!(prior.as_ref().map(|v| &v.result), Some(&MatchResult::Matches));

        let renamed = PatientDraft {
            name: "Priya".into(),
            ..draft()
        };
        let err = service
            .submit(&renamed, &FormMode::Register, prior.as_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::NameMismatch(_)));
        assert_eq!(
            service.backend().calls(),
            vec!["GET /patients/check-aadhar/123456789012"]
        );
    }

    #[tokio::test]
    async fn corrected_names_clear_an_earlier_conflict() {
        let service =
            RegistrationService::new(MockBackend::default().with_patient(stored_patient()));
        let mistyped = PatientDraft {
            name: "Priya".into(),
            ..draft()
        };
        let prior = service.verify(&mistyped).await.unwrap();
        assert!(prior.as_ref().is_some_and(|v| v.result.is_conflict()));

        let outcome = service
            .submit(&draft(), &FormMode::Register, prior.as_ref())
            .await
            .unwrap();
        assert_eq!(outcome.kind, SubmissionKind::NewVisit);
        assert_eq!(outcome.patient_id, "001");
        assert_eq!(
            service.backend().calls(),
            vec![
                "GET /patients/check-aadhar/123456789012",
                "POST /visits/patient/001",
            ]
        );
    }

    #[tokio::test]
    async fn stale_verification_is_ignored() {
        let service = RegistrationService::new(MockBackend::default());
        let stale = Verification {
            national_id: "999999999999".into(),
            draft: draft(),
            result: MatchResult::Conflicts("old".into()),
            existing: None,
        };

        let outcome = service
            .submit(&draft(), &FormMode::Register, Some(&stale))
            .await
            .unwrap();
        assert_eq!(outcome.kind, SubmissionKind::NewPatient);
    }

    #[tokio::test]
    async fn invalid_draft_makes_no_requests() {
        let service = RegistrationService::new(MockBackend::default());
        let err = service
            .submit(&PatientDraft::default(), &FormMode::Register, None)
            .await
            .unwrap_err();
        match err {
            IntakeError::ValidationFailure(errors) => {
                assert_eq!(errors.get(DraftField::Name), Some("Name is required"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn conflict_status_on_create_is_a_duplicate() {
        let backend = MockBackend {
            fail_with: Some(409),
            ..MockBackend::default()
        };
        let service = RegistrationService::new(backend);
        let prior = Verification {
            national_id: "123456789012".into(),
            draft: draft(),
            result: MatchResult::NoExistingRecord,
            existing: None,
        };

        let err = service
            .submit(&draft(), &FormMode::Register, Some(&prior))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::DuplicateNationalId(id) if id == "123456789012"));
    }

    #[tokio::test]
    async fn failed_visit_after_create_still_succeeds() {
        let service = RegistrationService::new(MockBackend {
            fail_visit_with: Some(500),
            ..MockBackend::default()
        });
        let outcome = service
            .submit(&draft(), &FormMode::Register, None)
            .await
            .unwrap();
        assert_eq!(outcome.kind, SubmissionKind::NewPatient);
        assert!(!outcome.visit_created);
    }

    #[tokio::test]
    async fn edit_preserves_visit_numbers() {
        let backend = MockBackend::default()
            .with_patient(stored_patient())
            .with_visit(json!({
                "visitId": 7,
                "patientId": "001",
                "opNo": "OP-17",
                "regNo": "REG-3",
                "bp": "110/70"
            }));
        let service = RegistrationService::new(backend);
        let draft = PatientDraft {
            symptoms: String::new(),
            blood_pressure: "130/85".into(),
            ..draft()
        };
        let mode = FormMode::Edit {
            patient_id: "001".into(),
        };

        let outcome = service.submit(&draft, &mode, None).await.unwrap();
        assert_eq!(outcome.kind, SubmissionKind::Updated);

        let backend = service.backend();
        assert_eq!(
            backend.calls(),
            vec![
                "GET /visits/patient/001/recent",
                "PUT /patients/001",
                "PUT /visits/7",
                "GET /patients/001",
            ]
        );
        let bodies = backend.bodies();
        assert_eq!(bodies[0]["fatherName"], "Ram Rao");
        assert_eq!(bodies[0]["phoneNumber"], "9876543210");
        assert!(bodies[0].get("father_name").is_none());
        assert!(bodies[1].get("op_no").is_none());
        assert_eq!(bodies[1]["opNo"], "OP-17");
        assert_eq!(bodies[1]["regNo"], "REG-3");
        assert_eq!(bodies[1]["bp"], "130/85");
        assert!(bodies[1].get("symptoms").is_none());
    }

    #[tokio::test]
    async fn edit_without_visits_fails() {
        let service =
            RegistrationService::new(MockBackend::default().with_patient(stored_patient()));
        let mode = FormMode::Edit {
            patient_id: "001".into(),
        };
        let err = service.submit(&draft(), &mode, None).await.unwrap_err();
        assert!(matches!(err, IntakeError::NoVisits(id) if id == "001"));
    }
}
