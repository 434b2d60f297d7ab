//! Patient list: joining visits to patients, tab filters and search.

use crate::backend::PatientBackend;
use crate::constants::CONSULTED_STATUSES;
use crate::reconcile::{sort_newest_first, PatientRecord, VisitRecord};
use crate::IntakeResult;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

/// A patient with their visits, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub patient: PatientRecord,
    pub visits: Vec<VisitRecord>,
    /// Raw date of the newest visit, or empty when there are none.
    pub latest_visit_date: String,
}

impl PatientSummary {
    /// Newest visit date as `("Apr 12, 2025", "16:34")`, if it parses.
    pub fn latest_visit_display(&self) -> Option<(String, String)> {
        let when = self.visits.first()?.visit_datetime()?;
        Some((
            when.format("%b %d, %Y").to_string(),
            when.format("%H:%M").to_string(),
        ))
    }

    fn is_consulted(&self) -> bool {
        self.visits.iter().any(|visit| {
            CONSULTED_STATUSES.contains(&visit.status.as_str()) || !visit.prescription.is_empty()
        })
    }

    fn matches_query(&self, query: &str) -> bool {
        let p = &self.patient;
        let full_name = format!("{} {}", p.name, p.surname).to_lowercase();
        let reverse_name = format!("{} {}", p.surname, p.name).to_lowercase();

        full_name.contains(query)
            || reverse_name.contains(query)
            || (!p.phone.is_empty() && p.phone.contains(query))
            || (!p.national_id.is_empty() && p.national_id.contains(query))
            || self.visits.iter().any(|visit| visit_date_matches(visit, query))
            || self
                .visits
                .iter()
                .any(|visit| visit.complaint.to_lowercase().contains(query))
    }
}

/// Date parts a search query can hit: short and long month name, `YYYY-MM-DD`, the exact day
/// of month and the year.
fn visit_date_matches(visit: &VisitRecord, query: &str) -> bool {
    let Some(when) = visit.visit_datetime() else {
        return false;
    };
    let date = when.date();

    date.format("%b").to_string().to_lowercase().contains(query)
        || date.format("%B").to_string().to_lowercase().contains(query)
        || date.format("%Y-%m-%d").to_string().contains(query)
        || date.day().to_string() == query
        || date.year().to_string().contains(query)
}

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DashboardTab {
    /// Latest visit was today.
    #[default]
    Today,
    /// Latest visit was yesterday.
    Yesterday,
    All,
    /// Any visit has been consulted or prescribed for.
    Consulted,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 4] = [
        DashboardTab::Today,
        DashboardTab::Yesterday,
        DashboardTab::All,
        DashboardTab::Consulted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DashboardTab::Today => "Today",
            DashboardTab::Yesterday => "Yesterday",
            DashboardTab::All => "All",
            DashboardTab::Consulted => "Consulted",
        }
    }
}

impl std::fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DashboardTab::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab {s:?} (expected today, yesterday, all or consulted)"))
    }
}

/// Join visits to patients by patient id.
///
/// Each patient's visits are sorted newest first; visits whose date does not parse sort last.
/// Patients keep their input order.
pub fn build_summaries(patients: Vec<PatientRecord>, visits: &[VisitRecord]) -> Vec<PatientSummary> {
    patients
        .into_iter()
        .map(|patient| {
            let mut own: Vec<VisitRecord> = visits
                .iter()
                .filter(|visit| visit.patient_id == patient.patient_id)
                .cloned()
                .collect();
            sort_newest_first(&mut own);

            let latest_visit_date = own
                .first()
                .map(|visit| visit.visit_date.clone())
                .unwrap_or_default();

            PatientSummary {
                patient,
                visits: own,
                latest_visit_date,
            }
        })
        .collect()
}

/// Fetch every patient and visit and join them.
///
/// # Errors
///
/// Returns [`crate::IntakeError::Backend`] if either list cannot be fetched.
pub async fn load<B: PatientBackend + ?Sized>(backend: &B) -> IntakeResult<Vec<PatientSummary>> {
    let patients = backend.list_patients().await?;
    let visits = backend.list_visits().await?;
    tracing::debug!(
        patients = patients.len(),
        visits = visits.len(),
        "dashboard data fetched"
    );

    let patients = patients.iter().map(PatientRecord::from_json).collect();
    let visits: Vec<VisitRecord> = visits.iter().map(VisitRecord::from_json).collect();
    Ok(build_summaries(patients, &visits))
}

/// Apply a tab and a search query.
///
/// The query is trimmed and lower-cased; an empty query matches everything.
pub fn filter<'a>(
    summaries: &'a [PatientSummary],
    tab: DashboardTab,
    query: &str,
    today: NaiveDate,
) -> Vec<&'a PatientSummary> {
    let day_prefix = match tab {
        DashboardTab::Today => Some(today),
        DashboardTab::Yesterday => today.pred_opt(),
        _ => None,
    }
    .map(|day| day.format("%Y-%m-%d").to_string());
    let query = query.trim().to_lowercase();

    summaries
        .iter()
        .filter(|summary| match tab {
            DashboardTab::Today | DashboardTab::Yesterday => day_prefix.as_deref().is_some_and(
                |prefix| {
                    !summary.latest_visit_date.is_empty()
                        && summary.latest_visit_date.starts_with(prefix)
                },
            ),
            DashboardTab::Consulted => summary.is_consulted(),
            DashboardTab::All => true,
        })
        .filter(|summary| query.is_empty() || summary.matches_query(&query))
        .collect()
}

/// List header for a tab, e.g. `"3 today"`.
pub fn count_label(tab: DashboardTab, count: usize) -> String {
    match tab {
        DashboardTab::Today => format!("{count} today"),
        DashboardTab::Yesterday => format!("{count} yesterday"),
        DashboardTab::Consulted => format!("{count} consulted"),
        DashboardTab::All => format!("{count} total"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str, name: &str, surname: &str) -> PatientRecord {
        PatientRecord {
            patient_id: id.into(),
            name: name.into(),
            surname: surname.into(),
            phone: format!("98765432{id:0>2}"),
            national_id: format!("1234567890{id:0>2}"),
            ..PatientRecord::default()
        }
    }

    fn visit(patient_id: &str, date: &str) -> VisitRecord {
        VisitRecord {
            patient_id: patient_id.into(),
            visit_date: date.into(),
            ..VisitRecord::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
    }

    fn fixture() -> Vec<PatientSummary> {
        let visits = vec![
            visit("1", "2025-04-10T10:00:00"),
            visit("1", "2025-04-12T09:30:00"),
            VisitRecord {
                complaint: "Chest pain".into(),
                ..visit("2", "2025-04-11T16:34:00")
            },
            VisitRecord {
                prescription: "Paracetamol".into(),
                ..visit("3", "2025-01-05T08:00:00")
            },
        ];
        build_summaries(
            vec![
                patient("1", "Asha", "Rao"),
                patient("2", "Ravi", "Kumar"),
                patient("3", "Meena", "Shetty"),
                patient("4", "Kiran", "Nayak"),
            ],
            &visits,
        )
    }

    fn ids(found: Vec<&PatientSummary>) -> Vec<&str> {
        found.into_iter().map(|s| s.patient.patient_id.as_str()).collect()
    }

    #[test]
    fn visits_are_sorted_newest_first() {
        let summaries = fixture();
        assert_eq!(summaries[0].latest_visit_date, "2025-04-12T09:30:00");
        assert_eq!(summaries[0].visits.len(), 2);
        assert_eq!(summaries[3].latest_visit_date, "");
    }

    #[test]
    fn unparseable_dates_sort_last() {
        let summaries = build_summaries(
            vec![patient("1", "Asha", "Rao")],
            &[visit("1", "yesterday"), visit("1", "2025-04-10")],
        );
        assert_eq!(summaries[0].latest_visit_date, "2025-04-10");
    }

    #[test]
    fn day_tabs_use_latest_visit() {
        let summaries = fixture();
        assert_eq!(ids(filter(&summaries, DashboardTab::Today, "", today())), ["1"]);
        assert_eq!(
            ids(filter(&summaries, DashboardTab::Yesterday, "", today())),
            ["2"]
        );
        assert_eq!(filter(&summaries, DashboardTab::All, "", today()).len(), 4);
    }

    #[test]
    fn consulted_tab_uses_status_or_prescription() {
        let mut summaries = fixture();
        summaries[1].visits[0].status = "Completed".into();
        assert_eq!(
            ids(filter(&summaries, DashboardTab::Consulted, "", today())),
            ["2", "3"]
        );
    }

    #[test]
    fn search_matches_name_in_either_order() {
        let summaries = fixture();
        assert_eq!(
            ids(filter(&summaries, DashboardTab::All, "  RAO ASHA ", today())),
            ["1"]
        );
        assert_eq!(
            ids(filter(&summaries, DashboardTab::All, "asha rao", today())),
            ["1"]
        );
    }

    #[test]
    fn search_matches_identifiers_and_complaints() {
        let summaries = fixture();
        assert_eq!(
            ids(filter(&summaries, DashboardTab::All, "123456789003", today())),
            ["3"]
        );
        assert_eq!(
            ids(filter(&summaries, DashboardTab::All, "chest", today())),
            ["2"]
        );
    }

    #[test]
    fn search_matches_visit_dates() {
        let summaries = fixture();
        assert_eq!(
            ids(filter(&summaries, DashboardTab::All, "january", today())),
            ["3"]
        );
        assert_eq!(
            ids(filter(&summaries, DashboardTab::All, "apr", today())),
            ["1", "2"]
        );
        assert_eq!(
            ids(filter(&summaries, DashboardTab::All, "2025-04-11", today())),
            ["2"]
        );
    }

    #[tokio::test]
    async fn load_joins_backend_lists() {
        use crate::backend::mock::MockBackend;
        use serde_json::json;

        let backend = MockBackend::default()
            .with_patient(json!({ "patient_id": "001", "first_name": "Asha", "surname": "Rao" }))
            .with_visit(json!({ "patient_id": "001", "visit_date": "2025-04-12T09:30:00" }));

        let summaries = load(&backend).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].patient.name, "Asha");
        assert_eq!(summaries[0].latest_visit_date, "2025-04-12T09:30:00");
        assert_eq!(backend.calls(), vec!["GET /patients", "GET /visits"]);
    }

    #[test]
    fn count_labels() {
        assert_eq!(count_label(DashboardTab::Today, 3), "3 today");
        assert_eq!(count_label(DashboardTab::Yesterday, 0), "0 yesterday");
        assert_eq!(count_label(DashboardTab::Consulted, 1), "1 consulted");
        assert_eq!(count_label(DashboardTab::All, 12), "12 total");
    }

    #[test]
    fn tabs_parse_case_insensitively() {
        assert_eq!(
            "consulted".parse::<DashboardTab>(),
            Ok(DashboardTab::Consulted)
        );
        assert_eq!("ALL".parse::<DashboardTab>(), Ok(DashboardTab::All));
        assert!("week".parse::<DashboardTab>().is_err());
    }

    #[test]
    fn latest_visit_display_format() {
        let summaries = fixture();
        assert_eq!(
            summaries[1].latest_visit_display(),
            Some(("Apr 11, 2025".to_string(), "16:34".to_string()))
        );
        assert_eq!(summaries[3].latest_visit_display(), None);
    }
}
