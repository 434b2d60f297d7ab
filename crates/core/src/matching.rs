//! Matching a draft against an Aadhaar-verified backend record.

use crate::constants::NAME_MISMATCH_REASON;
use crate::draft::PatientDraft;
use crate::reconcile::PatientRecord;
use serde::Serialize;

/// Outcome of comparing a draft with the record stored for its national ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "camelCase")]
pub enum MatchResult {
    /// No record exists; the draft is a new patient.
    NoExistingRecord,
    /// A record exists and the draft's name and surname agree with it.
    Matches,
    /// A record exists and the names disagree. Submission must be blocked.
    Conflicts(String),
}

impl MatchResult {
    pub fn is_conflict(&self) -> bool {
        matches!(self, MatchResult::Conflicts(_))
    }

    /// The conflict message, if any.
    pub fn conflict_reason(&self) -> Option<&str> {
        match self {
            MatchResult::Conflicts(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Compare the draft's name and surname with a stored record.
///
/// Comparison is case-insensitive. An empty draft field matches anything; an empty stored
/// field never matches a non-empty draft field. A draft with neither name nor surname always
/// matches.
pub fn compare_names(draft: &PatientDraft, record: &PatientRecord) -> MatchResult {
    let agrees = |entered: &str, stored: &str| {
        entered.is_empty() || (!stored.is_empty() && entered.to_lowercase() == stored.to_lowercase())
    };

    if agrees(&draft.name, &record.name) && agrees(&draft.surname, &record.surname) {
        MatchResult::Matches
    } else {
        MatchResult::Conflicts(NAME_MISMATCH_REASON.to_string())
    }
}

/// Reconcile a draft with the outcome of an existence check.
///
/// Returns the autofilled draft and the match result. With no record the draft is returned
/// unchanged.
pub fn reconcile_existing(
    draft: PatientDraft,
    record: Option<&PatientRecord>,
) -> (PatientDraft, MatchResult) {
    match record {
        None => (draft, MatchResult::NoExistingRecord),
        Some(record) => {
            let result = compare_names(&draft, record);
            (autofill(draft, record, &result), result)
        }
    }
}

/// Copy stored values into the draft according to `result`.
///
/// Phone, guardian name and blood group always come from the record. A draft with neither name
/// nor surname takes every personal field. Otherwise gender, age and address are taken only
/// when the names match.
pub(crate) fn autofill(
    mut draft: PatientDraft,
    record: &PatientRecord,
    result: &MatchResult,
) -> PatientDraft {
    draft.phone = record.phone.clone();
    draft.guardian_name = record.guardian_name.clone();
    draft.blood_group = record.blood_group.clone();

    if draft.name.is_empty() && draft.surname.is_empty() {
        draft.surname = record.surname.clone();
        draft.name = record.name.clone();
        draft.gender = record.gender.clone();
        draft.age = record.age.clone();
        draft.address = record.address.clone();
    } else if !result.is_conflict() {
        draft.gender = record.gender.clone();
        draft.age = record.age.clone();
        draft.address = record.address.clone();
    }
    draft
}
