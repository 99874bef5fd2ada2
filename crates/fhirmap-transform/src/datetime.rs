//! Date handling for `date` and `dateTime` targets.
//!
//! Source systems write dates in many shapes; mapping normalizes whatever
//! parses to `YYYY-MM-DD` and leaves the rest untouched.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use fhirmap_model::SourceValue;
use regex::Regex;

static FHIR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12]\d|3[01]))?)?$")
        .expect("invalid FHIR date regex")
});

static FHIR_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12]\d|3[01])(T([01]\d|2[0-3]):[0-5]\d:([0-5]\d|60)(\.\d+)?(Z|[+-]((0\d|1[0-3]):[0-5]\d|14:00)))?)?)?$",
    )
    .expect("invalid FHIR dateTime regex")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y", // US: 01/15/2024
    "%m-%d-%Y",
    "%d-%b-%Y", // 15-Jan-2024
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y%m%d",
];

/// Parses a date from free text, ignoring any time component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|timestamp| timestamp.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        })
}

pub fn format_fhir_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD` for date-like source values, `None` when nothing parses.
pub fn to_fhir_date(value: &SourceValue) -> Option<String> {
    match value {
        SourceValue::Date(date) => Some(format_fhir_date(*date)),
        SourceValue::DateTime(timestamp) => Some(format_fhir_date(timestamp.date())),
        SourceValue::Null => None,
        other => parse_date(&other.to_string()).map(format_fhir_date),
    }
}

/// Matches the FHIR `date` lexical form (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`).
pub fn is_fhir_date(value: &str) -> bool {
    FHIR_DATE.is_match(value)
}

/// Matches the FHIR `dateTime` lexical form; a time requires a zone.
pub fn is_fhir_datetime(value: &str) -> bool {
    FHIR_DATETIME.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_source_formats() {
        let expected = NaiveDate::from_ymd_opt(1970, 1, 31);
        for text in [
            "1970-01-31",
            "01/31/1970",
            "1970/01/31",
            "31-Jan-1970",
            "January 31, 1970",
            "1970-01-31T08:15:00",
            "1970-01-31T08:15:00+02:00",
            "01/31/1970 08:15:00",
            " 19700131 ",
        ] {
            assert_eq!(parse_date(text), expected, "{text}");
        }
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn fhir_lexical_forms() {
        assert!(is_fhir_date("2024"));
        assert!(is_fhir_date("2024-02"));
        assert!(is_fhir_date("2024-02-29"));
        assert!(!is_fhir_date("2024-13-01"));
        assert!(!is_fhir_date("02/29/2024"));

        assert!(is_fhir_datetime("2024-02-29"));
        assert!(is_fhir_datetime("2024-02-29T10:00:00Z"));
        assert!(is_fhir_datetime("2024-02-29T10:00:00.5+05:30"));
        assert!(!is_fhir_datetime("2024-02-29T10:00:00"));
    }
}
