//! `HH:MM` and `YYYY-MM-DD` text forms used by tasks and the CLI.

use chrono::{NaiveDate, NaiveTime};

use crate::error::ValidationError;

/// Parse an `HH:MM` wall-clock time.
pub fn parse_fixed_time(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| ValidationError::invalid("fixed_time", format!("expected HH:MM, got '{s}'")))
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_due_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid("due_date", format!("expected YYYY-MM-DD, got '{s}'")))
}

pub fn format_fixed_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

pub(crate) mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_some(&super::format_fixed_time(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_fixed_time(text)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_fixed_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_fixed_time("23:59").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["24:00", "9h30", "", "12:60"] {
            assert!(parse_fixed_time(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_due_date("2026-10-19").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
        assert!(parse_due_date("19/10/2026").is_err());
    }
}
