//! Identity record decoded from an Aadhaar QR payload.

use serde::Serialize;

/// Gender as printed on the card.
///
/// The card encodes `M`, `F` or `T`; only `M` is recognised and every other code decodes to
/// `Female`. The form offers a third option that the decoder never produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IdentityGender {
    Male,
    Female,
}

impl IdentityGender {
    /// Map a card gender code to a gender.
    pub fn from_code(code: &str) -> Self {
        if code == "M" {
            IdentityGender::Male
        } else {
            IdentityGender::Female
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IdentityGender::Male => "Male",
            IdentityGender::Female => "Female",
        }
    }
}

impl std::fmt::Display for IdentityGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured identity fields extracted from one scan.
///
/// Constructed once per scan and consumed immediately into form state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub full_name: String,
    pub gender: IdentityGender,
    pub year_of_birth: Option<i32>,
    /// Non-empty address parts joined with `", "`.
    pub address: String,
    /// Digits only.
    pub national_id: String,
    /// Care-of name with any `S/O ` / `D/O ` prefix removed.
    pub guardian_name: String,
}

impl IdentityRecord {
    /// Split the printed name into `(surname, given)`.
    ///
    /// The first word is taken as the surname and the remaining words as the given name. A single
    /// word yields an empty given name.
    pub fn split_name(&self) -> (String, String) {
        let mut words = self.full_name.split_whitespace();
        let surname = words.next().unwrap_or_default().to_string();
        let given = words.collect::<Vec<_>>().join(" ");
        (surname, given)
    }

    /// Age in whole years as of `current_year`, if the year of birth is known, positive and not
    /// in the future.
    pub fn age_in(&self, current_year: i32) -> Option<u32> {
        let yob = self.year_of_birth.filter(|year| *year > 0)?;
        current_year
            .checked_sub(yob)
            .and_then(|age| u32::try_from(age).ok())
    }
}
