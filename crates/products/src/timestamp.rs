//! Parsing of caller-supplied creation timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::DomainError;

/// A timestamp as it arrives on the wire: Unix milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d %Y", "%d %B %Y"];

/// Parse a supplied timestamp.
///
/// Accepted text forms: RFC 3339, RFC 2822, ISO date-times with a compact
/// `+hhmm` offset or none, slash dates and English month-name dates such as
/// `March 1, 2024` or `Mar 1 2024 10:00:00`. Values without an offset are
/// read as UTC.
pub fn parse_timestamp(raw: &RawTimestamp) -> Result<DateTime<Utc>, DomainError> {
    match raw {
        RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms)
            .ok_or_else(|| DomainError::invalid_timestamp(format!("{ms} is out of range"))),
        RawTimestamp::Text(text) => parse_text(text.trim())
            .ok_or_else(|| DomainError::invalid_timestamp(format!("'{text}' is not a recognizable date"))),
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// True when the value carries no timestamp at all (an empty string).
pub fn is_blank(raw: &RawTimestamp) -> bool {
    matches!(raw, RawTimestamp::Text(text) if text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text(s: &str) -> RawTimestamp {
        RawTimestamp::Text(s.to_string())
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp(&text("2024-03-01T12:00:00+02:00")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn parses_bare_date_as_utc_midnight() {
        let parsed = parse_timestamp(&text("2024-03-01")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_datetime_as_utc() {
        let parsed = parse_timestamp(&text("2024-03-01T08:30:00")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn parses_slash_and_month_name_dates() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        for input in ["2024/03/01", "March 1, 2024", "Mar 1 2024", "03/01/2024"] {
            assert_eq!(parse_timestamp(&text(input)).unwrap(), midnight, "{input:?}");
        }
    }

    #[test]
    fn parses_month_name_date_with_time() {
        let parsed = parse_timestamp(&text("Mar 1 2024 10:00:00")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn parses_compact_offset_with_fraction() {
        let parsed = parse_timestamp(&text("2024-03-01T10:00:00.000+0200")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn only_empty_text_is_blank() {
        assert!(is_blank(&text("")));
        assert!(is_blank(&text("  ")));
        assert!(!is_blank(&text("2024-03-01")));
        assert!(!is_blank(&RawTimestamp::Millis(0)));
    }

    #[test]
    fn parses_epoch_millis() {
        let parsed = parse_timestamp(&RawTimestamp::Millis(1_700_000_000_000)).unwrap();
        assert_eq!(parsed.timestamp(), 1_700_000_000);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["not-a-date", "", "   ", "2024-13-01", "2024-02-30"] {
            let err = parse_timestamp(&text(bad)).unwrap_err();
            assert!(matches!(err, DomainError::InvalidTimestamp(_)), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn wire_form_accepts_numbers_and_strings() {
        let n: RawTimestamp = serde_json::from_str("1700000000000").unwrap();
        assert_eq!(n, RawTimestamp::Millis(1_700_000_000_000));
        let s: RawTimestamp = serde_json::from_str("\"2024-01-01\"").unwrap();
        assert_eq!(s, text("2024-01-01"));
    }
}
