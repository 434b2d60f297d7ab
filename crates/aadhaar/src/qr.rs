//! QR payload decoding.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::identity::{IdentityGender, IdentityRecord};
use crate::{AadhaarError, AadhaarResult};

/// Element name that introduces the attribute list.
pub const MARKER: &str = "PrintLetterBarcodeData";

/// Address attributes, in the order they are joined.
const ADDRESS_KEYS: [&str; 7] = ["house", "street", "loc", "vtc", "dist", "state", "pc"];

/// Relation prefixes stripped from the care-of attribute.
const RELATION_PREFIXES: [&str; 2] = ["S/O ", "D/O "];

static ATTRIBUTE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PrintLetterBarcodeData\s+([^>\r\n]+)").expect("valid attribute block regex")
});

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b([A-Za-z_]+)="([^"]*)""#).expect("valid attribute regex"));

/// Decode a scanned payload, returning `None` when it is not an Aadhaar QR code.
///
/// Failures are logged at `warn` and collapsed to `None`; the caller shows an "invalid code"
/// notice and leaves the form untouched.
pub fn decode(payload: &str) -> Option<IdentityRecord> {
    match try_decode(payload) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!("rejected QR payload: {err}");
            None
        }
    }
}

/// Decode a scanned payload, reporting why it was rejected.
///
/// # Errors
///
/// - [`AadhaarError::MissingMarker`] if the payload has no `PrintLetterBarcodeData` element.
/// - [`AadhaarError::MalformedAttributes`] if the marker is present but no `key="value"`
///   attributes follow it.
pub fn try_decode(payload: &str) -> AadhaarResult<IdentityRecord> {
    if !payload.contains(MARKER) {
        return Err(AadhaarError::MissingMarker);
    }

    let block = ATTRIBUTE_BLOCK
        .captures(payload)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AadhaarError::MalformedAttributes("no attribute list after marker".into()))?;

    let attributes = parse_attributes(block);
    if attributes.is_empty() {
        return Err(AadhaarError::MalformedAttributes(format!(
            "no key=\"value\" pairs in {block:?}"
        )));
    }

    let get = |key: &str| attributes.get(key).copied().unwrap_or_default();

    let address = ADDRESS_KEYS
        .iter()
        .map(|&key| get(key))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(IdentityRecord {
        full_name: get("name").to_string(),
        gender: IdentityGender::from_code(get("gender")),
        year_of_birth: get("yob").trim().parse().ok(),
        address,
        national_id: get("uid").chars().filter(char::is_ascii_digit).collect(),
        guardian_name: strip_relation_prefix(get("co")).to_string(),
    })
}

/// Collect `key="value"` pairs. The first occurrence of a key wins.
fn parse_attributes(block: &str) -> HashMap<&str, &str> {
    let mut attributes = HashMap::new();
    for caps in ATTRIBUTE.captures_iter(block) {
        if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
            attributes.entry(key.as_str()).or_insert(value.as_str());
        }
    }
    attributes
}

fn strip_relation_prefix(care_of: &str) -> &str {
    RELATION_PREFIXES
        .iter()
        .find_map(|prefix| care_of.strip_prefix(prefix))
        .unwrap_or(care_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAYLOAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PrintLetterBarcodeData uid="1234 5678 9012" name="Asha Rao" gender="F" yob="1990" co="D/O Ram Rao" house="12" street="" lm="Near Temple" loc="Car Street" vtc="Udupi" po="Udupi" dist="Udupi" subdist="Udupi" state="Karnataka" pc="576101" dob="01/01/1990"/>"#;

    #[test]
    fn decodes_documented_example() {
        let payload = r#"xx PrintLetterBarcodeData name="Asha Rao" gender="F" yob="1990" uid="123456789012" co="S/O Ram Rao" yy"#;
        let record = decode(payload).expect("should decode");

        assert_eq!(record.full_name, "Asha Rao");
        assert_eq!(record.gender, IdentityGender::Female);
        assert_eq!(record.year_of_birth, Some(1990));
        assert_eq!(record.national_id, "123456789012");
        assert_eq!(record.guardian_name, "Ram Rao");
        assert_eq!(record.address, "");
    }

    #[test]
    fn decodes_full_card_payload() {
        let record = try_decode(FULL_PAYLOAD).expect("should decode");

        assert!(record.national_id.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(record.national_id, "123456789012");
        assert_eq!(record.guardian_name, "Ram Rao");
        // `street` is empty and must not leave an empty segment behind.
        assert_eq!(
            record.address,
            "12, Car Street, Udupi, Udupi, Karnataka, 576101"
        );
        assert!(!record.address.split(", ").any(str::is_empty));
    }

    #[test]
    fn missing_marker_yields_none() {
        assert_eq!(decode(r#"name="Asha" uid="123456789012""#), None);
        assert_eq!(
            try_decode("https://example.org/not-a-card"),
            Err(AadhaarError::MissingMarker)
        );
    }

    #[test]
    fn marker_without_attributes_is_malformed() {
        assert!(matches!(
            try_decode("<PrintLetterBarcodeData/>"),
            Err(AadhaarError::MalformedAttributes(_))
        ));
        assert!(matches!(
            try_decode("PrintLetterBarcodeData garbage without pairs"),
            Err(AadhaarError::MalformedAttributes(_))
        ));
        assert_eq!(decode("<PrintLetterBarcodeData/>"), None);
    }

    #[test]
    fn male_code_maps_to_male() {
        let record =
            decode(r#"<PrintLetterBarcodeData name="Ravi Kumar" gender="M" uid="999988887777"/>"#)
                .unwrap();
        assert_eq!(record.gender, IdentityGender::Male);
    }

    #[test]
    fn other_gender_codes_map_to_female() {
        let record =
            decode(r#"<PrintLetterBarcodeData name="Kiran" gender="T" uid="999988887777"/>"#)
                .unwrap();
        assert_eq!(record.gender, IdentityGender::Female);
    }

    #[test]
    fn missing_keys_become_empty() {
        let record = decode(r#"<PrintLetterBarcodeData name="Kiran"/>"#).unwrap();
        assert_eq!(record.national_id, "");
        assert_eq!(record.guardian_name, "");
        assert_eq!(record.year_of_birth, None);
    }

    #[test]
    fn non_numeric_year_of_birth_is_absent() {
        let record = decode(r#"<PrintLetterBarcodeData name="Kiran" yob="19x0"/>"#).unwrap();
        assert_eq!(record.year_of_birth, None);
    }

    #[test]
    fn negative_year_of_birth_gives_no_age() {
        let record =
            decode(r#"<PrintLetterBarcodeData name="Kiran" yob="-2147483648"/>"#).unwrap();
        assert_eq!(record.age_in(2025), None);
    }

    #[test]
    fn care_of_without_relation_prefix_is_kept() {
        let record = decode(r#"<PrintLetterBarcodeData name="Kiran" co="Ram Rao"/>"#).unwrap();
        assert_eq!(record.guardian_name, "Ram Rao");
    }

    #[test]
    fn key_match_does_not_bleed_into_longer_keys() {
        // `subdist` must not be read as `dist`, and `loc` must not be read from `xloc`.
        let record =
            decode(r#"<PrintLetterBarcodeData name="K" subdist="Kundapura" xloc="X" dist="Udupi"/>"#)
                .unwrap();
        assert_eq!(record.address, "Udupi");
    }
}
