//! Boundary checks for request input.
//!
//! Date checks are syntactic only; calendar validity is left to `parse_date`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::student::BIRTHDATE_FORMAT;

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:19|20)[0-9]{2}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])$")
        .expect("valid date regex")
});

/// A date as it reaches the boundary: already parsed, or raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    Parsed(NaiveDate),
    Text(&'a str),
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(value: NaiveDate) -> Self {
        Self::Parsed(value)
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

/// Returns whether `input` is an acceptable date.
///
/// - Parsed dates are always valid.
/// - Text must be `YYYY-MM-DD` with year 1900-2099, month 01-12, day 01-31.
/// - `None` and empty text are invalid.
pub fn is_valid_date(input: Option<DateInput<'_>>) -> bool {
    match input {
        Some(DateInput::Parsed(_)) => true,
        Some(DateInput::Text(text)) => !text.is_empty() && DATE_RE.is_match(text),
        None => false,
    }
}

/// Parses `text` when it passes `is_valid_date` and names a real calendar day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if !is_valid_date(Some(DateInput::Text(text))) {
        return None;
    }
    NaiveDate::parse_from_str(text, BIRTHDATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::{is_valid_date, parse_date, DateInput};
    use chrono::NaiveDate;

    fn text(value: &str) -> Option<DateInput<'_>> {
        Some(DateInput::Text(value))
    }

    #[test]
    fn accepts_well_formed_dates() {
        assert!(is_valid_date(text("2020-07-01")));
        assert!(is_valid_date(text("2017-10-29")));
        assert!(is_valid_date(text("1900-01-31")));
    }

    #[test]
    fn rejects_out_of_range_or_reordered_parts() {
        assert!(!is_valid_date(text("2020-13-01")));
        assert!(!is_valid_date(text("01-07-2020")));
        assert!(!is_valid_date(text("29-10-2017")));
        assert!(!is_valid_date(text("1899-01-01")));
        assert!(!is_valid_date(text("2020-00-10")));
        assert!(!is_valid_date(text("2020-01-32")));
        assert!(!is_valid_date(text("2020-07-01T00:00:00")));
    }

    #[test]
    fn rejects_missing_and_empty_input() {
        assert!(!is_valid_date(None));
        assert!(!is_valid_date(text("")));
    }

    #[test]
    fn parsed_dates_are_always_valid() {
        let date = NaiveDate::from_ymd_opt(1850, 2, 3).unwrap();
        assert!(is_valid_date(Some(date.into())));
    }

    #[test]
    fn check_is_syntactic_only() {
        assert!(is_valid_date(text("2021-02-30")));
        assert_eq!(parse_date("2021-02-30"), None);
        assert_eq!(
            parse_date("2021-02-28"),
            NaiveDate::from_ymd_opt(2021, 2, 28)
        );
    }
}
