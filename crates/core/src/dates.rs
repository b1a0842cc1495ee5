//! Normalization of loosely-formatted natural-language date fragments.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)(?:st|nd|rd|th)\b").unwrap());

static BARE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}$").unwrap());

/// Formats that carry an explicit year. A fragment matching one of these
/// is taken as-is, with no year inference. The ISO form comes first so
/// that normalizing an already-normalized value is a no-op.
const EXPLICIT_YEAR_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%m-%d-%y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Formats tried after appending the current year to a yearless fragment.
const APPENDED_YEAR_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%b %d %Y",
    "%m/%d %Y",
    "%m-%d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Converts a free-text date fragment into a calendar date.
///
/// The fragment may be anything a date-range pattern captured: a
/// month-name date ("November 2nd"), a numeric date ("11/5"), or a bare
/// day-of-month ("2", resolved against `today`'s month). A fragment
/// without an explicit year is placed in `today`'s year, rolling forward
/// one year when the result would lie strictly in the past, so a trip
/// planned across a new-year boundary lands on the intended date.
///
/// Returns `None` for unparseable fragments; a missing date is never an
/// error, the caller just keeps treating the field as unknown.
pub fn normalize(fragment: &str, today: NaiveDate) -> Option<NaiveDate> {
    let cleaned = ORDINAL_RE.replace_all(fragment.trim(), "$1");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    // A bare 1-2 digit number denotes a day in the current month.
    let cleaned = if BARE_DAY_RE.is_match(cleaned) {
        format!("{} {}", today.format("%B"), cleaned)
    } else {
        cleaned.to_owned()
    };

    for format in EXPLICIT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date);
        }
    }

    let with_year = format!("{} {}", cleaned, today.year());
    for format in APPENDED_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, format) {
            let date = if date < today {
                date.with_year(date.year() + 1).unwrap_or(date)
            } else {
                date
            };
            return Some(date);
        }
    }

    trace!("failed to normalize date fragment: {fragment:?}");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_name_in_future() {
        let today = date(2025, 1, 15);
        assert_eq!(
            normalize("November 2nd", today),
            Some(date(2025, 11, 2))
        );
    }

    #[test]
    fn test_yearless_past_date_rolls_forward() {
        let today = date(2025, 11, 15);
        assert_eq!(normalize("November 2", today), Some(date(2026, 11, 2)));
    }

    #[test]
    fn test_bare_day_uses_current_month() {
        let today = date(2025, 11, 15);
        // "2" is rewritten as "November 2", which is already past, so it
        // lands on next year's November 2.
        assert_eq!(normalize("2", today), Some(date(2026, 11, 2)));
        // A day later in the month stays put.
        assert_eq!(normalize("20", today), Some(date(2025, 11, 20)));
    }

    #[test]
    fn test_explicit_year_skips_inference() {
        let today = date(2025, 11, 15);
        assert_eq!(
            normalize("November 2, 2020", today),
            Some(date(2020, 11, 2))
        );
        assert_eq!(normalize("11/5/2024", today), Some(date(2024, 11, 5)));
    }

    #[test]
    fn test_numeric_yearless() {
        let today = date(2025, 1, 1);
        assert_eq!(normalize("11/5", today), Some(date(2025, 11, 5)));
        assert_eq!(normalize("11-5", today), Some(date(2025, 11, 5)));
    }

    #[test]
    fn test_ordinal_suffixes_stripped() {
        let today = date(2025, 1, 1);
        assert_eq!(normalize("December 1st", today), Some(date(2025, 12, 1)));
        assert_eq!(normalize("December 3rd", today), Some(date(2025, 12, 3)));
    }

    #[test]
    fn test_idempotent_over_own_output() {
        let today = date(2025, 11, 15);
        let first = normalize("December 1st", today).unwrap();
        let second = normalize(&first.to_string(), today).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unparseable_is_none() {
        let today = date(2025, 11, 15);
        assert_eq!(normalize("sometime soon", today), None);
        assert_eq!(normalize("", today), None);
    }
}
