//! Heuristic extraction of trip details from accumulated conversation
//! text.
//!
//! Extraction is an ordered-pattern-list, first-match-wins affair. The
//! patterns are deliberately simple; ambiguity is resolved by pattern
//! order, not by any language understanding.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::dates::normalize;

/// The structured goal of the conversation: a destination plus a date
/// range. Only ever constructed fully populated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripDetails {
    /// The destination city.
    pub city: String,
    /// First day of the trip.
    pub start_date: NaiveDate,
    /// Last day of the trip.
    pub end_date: NaiveDate,
}

/// Field-level report of what the text already contains.
///
/// This is what drives the next prompt: the responder needs to know
/// *which* fields are missing, not just that something is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailScan {
    /// The destination, if one was found.
    pub city: Option<String>,
    /// The start date, if one was found.
    pub start_date: Option<NaiveDate>,
    /// The end date, if one was found.
    pub end_date: Option<NaiveDate>,
}

/// Destination patterns, most specific first.
static CITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Trip keyword + capitalized phrase, bounded by a connector word,
        // punctuation or end of text.
        r"(?:(?i:visit|go to|travel to|trip to|going to))\s+([A-Z][A-Za-z ]+?)(?:\s+(?i:from|on|in|starting|between)|[.,]|$)",
        // Trip keyword + a single capitalized word.
        r"(?:(?i:visit|go to|travel to|trip to|going to))\s+([A-Z][A-Za-z]+)",
        // Looser: a capitalized phrase right before "from"/"on".
        r"(?:^|\s)([A-Z][A-Za-z ]{3,}?)\s+(?i:from|on)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static TRAILING_CONNECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?i:from|on|in|starting|between)$").unwrap()
});

/// A month-name date fragment, with optional ordinal suffix and year.
const MONTH_DAY: &str = r"\w+\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?";
const MONTH_DAY_SHORT: &str = r"\w+\s+\d{1,2}(?:st|nd|rd|th)?";

/// Date-range patterns, tried in order. A pattern only wins when both of
/// its captures resolve to calendar dates.
static RANGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "from November 2 to November 10"
        format!(r"(?i)from\s+({MONTH_DAY})\s+to\s+({MONTH_DAY})"),
        // "November 2 to November 10" (without "from")
        format!(r"(?i)({MONTH_DAY})\s+to\s+({MONTH_DAY})"),
        // "2 to November 10"
        format!(
            r"(?i)(\d{{1,2}}(?:st|nd|rd|th)?)\s+to\s+({MONTH_DAY_SHORT})"
        ),
        // "11/1 to 11/5" or "11-1 to 11-5"
        r"(?i)(\d{1,2}[-/]\d{1,2}(?:[-/]\d{2,4})?)\s+(?:to|through|until|-)\s+(\d{1,2}[-/]\d{1,2}(?:[-/]\d{2,4})?)"
            .to_owned(),
        // "starting November 1 ending November 5"
        format!(
            r"(?i)starting\s+({MONTH_DAY_SHORT})\s+ending\s+({MONTH_DAY_SHORT})"
        ),
        // "between November 1 and November 5"
        format!(
            r"(?i)between\s+({MONTH_DAY_SHORT})\s+and\s+({MONTH_DAY_SHORT})"
        ),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

const MONTH_NAMES: &str = "january|february|march|april|may|june|july\
                           |august|september|october|november|december";

/// A single month-name date, used only when no range matched so the
/// responder can ask for the missing half.
static LONE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b((?:{MONTH_NAMES})\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?)"
    ))
    .unwrap()
});

/// Scans the text and reports every trip-detail field it can find.
///
/// Pure function of the text and `today` (which only feeds the date
/// normalizer's year inference).
pub fn scan(text: &str, today: NaiveDate) -> DetailScan {
    let mut result = DetailScan::default();

    for pattern in CITY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let city = TRAILING_CONNECTOR_RE.replace(caps[1].trim(), "");
            let city = city.trim();
            if !city.is_empty() {
                trace!("found city: {city}");
                result.city = Some(city.to_owned());
                break;
            }
        }
    }

    for pattern in RANGE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            // A textual match is not enough: both fragments must resolve
            // to dates, otherwise the next pattern gets its chance.
            let (Some(start), Some(end)) =
                (normalize(&caps[1], today), normalize(&caps[2], today))
            else {
                continue;
            };
            trace!("found date range: {start} to {end}");
            result.start_date = Some(start);
            result.end_date = Some(end);
            break;
        }
    }

    if result.start_date.is_none() && result.end_date.is_none() {
        if let Some(caps) = LONE_DATE_RE.captures(text) {
            result.start_date = normalize(&caps[1], today);
        }
    }

    result
}

/// Extracts complete trip details, or `None` if any field is still
/// missing. A full date range is required; a lone date never completes an
/// extraction.
pub fn extract(text: &str, today: NaiveDate) -> Option<TripDetails> {
    let scan = scan(text, today);
    match (scan.city, scan.start_date, scan.end_date) {
        (Some(city), Some(start_date), Some(end_date)) => Some(TripDetails {
            city,
            start_date,
            end_date,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_canonical_form() {
        let details = extract(
            "I want to visit Tokyo from December 1st to December 10th",
            today(),
        )
        .unwrap();
        assert_eq!(details.city, "Tokyo");
        assert_eq!(details.start_date, date(2025, 12, 1));
        assert_eq!(details.end_date, date(2025, 12, 10));
    }

    #[test]
    fn test_multi_word_city() {
        let details = extract(
            "I'm going to New York from November 2 to November 10",
            today(),
        )
        .unwrap();
        assert_eq!(details.city, "New York");
    }

    #[test]
    fn test_range_without_from() {
        let details =
            extract("Let's visit Rome. November 2 to November 10", today())
                .unwrap();
        assert_eq!(details.city, "Rome");
        assert_eq!(details.start_date, date(2025, 11, 2));
    }

    #[test]
    fn test_numeric_range() {
        let details =
            extract("trip to Lisbon 11/1 to 11/5 please", today()).unwrap();
        assert_eq!(details.city, "Lisbon");
        assert_eq!(details.start_date, date(2025, 11, 1));
        assert_eq!(details.end_date, date(2025, 11, 5));
    }

    #[test]
    fn test_bare_day_to_month_day() {
        let today = date(2025, 1, 1);
        let details =
            extract("visit Paris from 2 to November 10", today).unwrap();
        // "2" resolves against the current month (January here).
        assert_eq!(details.start_date, date(2025, 1, 2));
        assert_eq!(details.end_date, date(2025, 11, 10));
    }

    #[test]
    fn test_starting_ending() {
        let details = extract(
            "visit Oslo starting November 1 ending November 5",
            today(),
        )
        .unwrap();
        assert_eq!(details.start_date, date(2025, 11, 1));
        assert_eq!(details.end_date, date(2025, 11, 5));
    }

    #[test]
    fn test_between_and() {
        let details = extract(
            "I want to go to Kyoto between November 1 and November 5",
            today(),
        )
        .unwrap();
        assert_eq!(details.city, "Kyoto");
        assert_eq!(details.start_date, date(2025, 11, 1));
    }

    #[test]
    fn test_city_only_is_incomplete() {
        assert_eq!(extract("I want to visit Paris", today()), None);
        let scan = scan("I want to visit Paris", today());
        assert_eq!(scan.city.as_deref(), Some("Paris"));
        assert_eq!(scan.start_date, None);
    }

    #[test]
    fn test_dates_only_is_incomplete() {
        let text = "from December 1st to December 10th";
        assert_eq!(extract(text, today()), None);
        let scan = scan(text, today());
        assert_eq!(scan.city, None);
        assert!(scan.start_date.is_some() && scan.end_date.is_some());
    }

    #[test]
    fn test_lone_date_reported_not_extracted() {
        let text = "I want to visit Rome on November 2";
        assert_eq!(extract(text, today()), None);
        let scan = scan(text, today());
        assert_eq!(scan.city.as_deref(), Some("Rome"));
        assert_eq!(scan.start_date, Some(date(2025, 11, 2)));
        assert_eq!(scan.end_date, None);
    }

    #[test]
    fn test_unresolvable_range_keeps_trying() {
        // "2 to flying 9" matches the loose range pattern shape but the
        // second capture is not a date; the scan must not report a range.
        let scan = scan("going to Berlin, 2 to flying 9", today());
        assert_eq!(scan.city.as_deref(), Some("Berlin"));
        assert_eq!(scan.start_date, None);
        assert_eq!(scan.end_date, None);
    }

    #[test]
    fn test_trailing_connector_stripped() {
        let scan =
            scan("I want to visit San Francisco from 11/1 to 11/5", today());
        assert_eq!(scan.city.as_deref(), Some("San Francisco"));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(scan("", today()), DetailScan::default());
        assert_eq!(extract("", today()), None);
    }
}
