//! Conversions among the three textual date forms crossing the engine's
//! boundaries: the picker callback form (`d-MM-yyyy`, day unpadded), the
//! canonical storage form (`yyyy-MM-dd`) and the localized display form.

use chrono::{Locale, NaiveDate};
use std::fmt;

pub const CANONICAL_FMT: &str = "%Y-%m-%d";
const PICKER_FMT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatError {
    pub raw: String,
}

impl fmt::Display for DateFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed date: {}", self.raw)
    }
}

impl std::error::Error for DateFormatError {}

fn bad(raw: &str) -> DateFormatError {
    DateFormatError {
        raw: raw.to_string(),
    }
}

pub fn parse_canonical(s: &str) -> Result<NaiveDate, DateFormatError> {
    NaiveDate::parse_from_str(s.trim(), CANONICAL_FMT).map_err(|_| bad(s))
}

pub fn parse_picker(s: &str) -> Result<NaiveDate, DateFormatError> {
    NaiveDate::parse_from_str(s.trim(), PICKER_FMT).map_err(|_| bad(s))
}

pub fn canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FMT).to_string()
}

/// Picker callback form -> canonical storage form.
pub fn picker_to_canonical(s: &str) -> Result<String, DateFormatError> {
    parse_picker(s).map(canonical)
}

/// Two-line localized header form, e.g. "5 Mart 2024\nSalı".
pub fn display(canonical_date: &str) -> Result<String, DateFormatError> {
    let date = parse_canonical(canonical_date)?;
    Ok(date
        .format_localized("%-d %B %Y\n%A", Locale::tr_TR)
        .to_string())
}

/// Single-line form used for ledger rows in reports, e.g. "5 Mart 2024 Salı".
pub fn display_single_line(canonical_date: &str) -> Result<String, DateFormatError> {
    let date = parse_canonical(canonical_date)?;
    Ok(date
        .format_localized("%-d %B %Y %A", Locale::tr_TR)
        .to_string())
}

/// Date-only comparison against `today`. A malformed date is treated as
/// not-past so the session stays editable.
pub fn is_past(canonical_date: &str, today: NaiveDate) -> bool {
    match parse_canonical(canonical_date) {
        Ok(date) => date < today,
        Err(_) => false,
    }
}

pub fn today_canonical() -> String {
    canonical(chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_accepts_unpadded_day() {
        assert_eq!(picker_to_canonical("5-03-2024").unwrap(), "2024-03-05");
        assert_eq!(picker_to_canonical("15-12-2024").unwrap(), "2024-12-15");
    }

    #[test]
    fn canonical_round_trips_through_display() {
        let d = "2024-03-05";
        // Rendering for display must not lose the underlying date.
        let parsed = parse_canonical(d).unwrap();
        assert_eq!(canonical(parsed), d);
        assert_eq!(display(d).unwrap(), "5 Mart 2024\nSalı");
        assert_eq!(display_single_line(d).unwrap(), "5 Mart 2024 Salı");
    }

    #[test]
    fn malformed_dates_error_and_are_not_past() {
        assert!(parse_canonical("03/05/2024").is_err());
        assert!(parse_picker("yesterday").is_err());
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(!is_past("garbage", today));
    }

    #[test]
    fn past_comparison_is_date_only_and_strict() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(is_past("2024-03-04", today));
        assert!(!is_past("2024-03-05", today));
        assert!(!is_past("2024-03-06", today));
    }
}
