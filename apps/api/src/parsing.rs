//! Normalisation helpers shared by validation and candidate analysis.
//!
//! Extractor output is loosely formatted text. These functions turn dates, amounts and
//! names into comparable values and return `None` rather than guessing.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Full-date formats tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const PRESENT_MARKERS: &[&str] = &["present", "current", "now", "ongoing", "till date", "to date"];

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})$").expect("valid year-month regex"));
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{4})$").expect("valid month-year regex"));
static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("valid year regex"));
static CURRENCY_SYMBOLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$€£¥₹]").expect("valid currency symbol regex"));
static CURRENCY_CODES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(USD|EUR|GBP|INR|JPY|CAD|AUD)\b").expect("valid currency code regex")
});

/// True when the text marks an open-ended role ("Present", "Current", ...).
pub fn is_present_marker(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    PRESENT_MARKERS.iter().any(|m| lowered == *m)
}

/// Parses the date formats extractors commonly emit. Month-precision dates resolve to
/// the first of the month, a bare year to January 1st.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let value = text.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    if let Some(caps) = YEAR_MONTH.captures(value) {
        return ymd(&caps[1], &caps[2]);
    }
    if let Some(caps) = MONTH_YEAR.captures(value) {
        return ymd(&caps[2], &caps[1]);
    }
    if let Some(caps) = BARE_YEAR.captures(value) {
        return ymd(&caps[1], "1");
    }

    // "March 2021", "Mar 2021", "Sept. 2021"
    let cleaned = value.replace(['.', ','], " ");
    let mut parts = cleaned.split_whitespace();
    if let (Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next()) {
        if let Some(month) = month_from_name(month) {
            return ymd(year, &month.to_string());
        }
    }

    None
}

fn ymd(year: &str, month: &str) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_from_name(name: &str) -> Option<u32> {
    let lowered = name.to_lowercase();
    if lowered.len() < 3 {
        return None;
    }
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lowered))
        .map(|idx| idx as u32 + 1)
}

/// Whole calendar months from `start` to `end`. Never negative.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Parses monetary text such as `$1,500.00`, `1.500,00 EUR` or `1500`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let stripped = CURRENCY_SYMBOLS.replace_all(text, "");
    let stripped = CURRENCY_CODES.replace_all(&stripped, "");
    let mut value = stripped.trim().replace(' ', "");
    if value.is_empty() {
        return None;
    }

    if value.contains('.') && value.contains(',') {
        let last_dot = value.rfind('.').unwrap_or(0);
        let last_comma = value.rfind(',').unwrap_or(0);
        value = if last_dot > last_comma {
            value.replace(',', "")
        } else {
            value.replace('.', "").replace(',', ".")
        };
    } else if value.contains(',') {
        let parts: Vec<&str> = value.split(',').collect();
        value = if parts.len() == 2 && parts[1].len() == 2 {
            value.replace(',', ".")
        } else {
            value.replace(',', "")
        };
    }

    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lowercases and collapses whitespace; used for company identity.
pub fn normalize_name(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_and_month_precision() {
        assert_eq!(parse_date("2021-03-15"), Some(date(2021, 3, 15)));
        assert_eq!(parse_date("2021-03"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("03/2021"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("2019"), Some(date(2019, 1, 1)));
    }

    #[test]
    fn test_parse_month_names() {
        assert_eq!(parse_date("March 2021"), Some(date(2021, 3, 1)));
        assert_eq!(parse_date("Sep 2020"), Some(date(2020, 9, 1)));
        assert_eq!(parse_date("Sept. 2020"), Some(date(2020, 9, 1)));
        assert_eq!(parse_date("Mar 15, 2024"), Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_unresolvable_dates_are_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("sometime"), None);
        assert_eq!(parse_date("2021-13"), None);
        assert_eq!(parse_date("Present"), None);
    }

    #[test]
    fn test_present_markers() {
        assert!(is_present_marker("Present"));
        assert!(is_present_marker(" current "));
        assert!(!is_present_marker("2020-01"));
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2020, 1, 1), date(2020, 7, 1)), 6);
        assert_eq!(months_between(date(2020, 1, 15), date(2020, 2, 10)), 0);
        assert_eq!(months_between(date(2021, 1, 1), date(2020, 1, 1)), 0);
        assert_eq!(months_between(date(2018, 6, 1), date(2021, 6, 1)), 36);
    }

    #[test]
    fn test_parse_amount_conventions() {
        assert_eq!(parse_amount("$1,500.00"), Some(1500.0));
        assert_eq!(parse_amount("1.500,00 EUR"), Some(1500.0));
        assert_eq!(parse_amount("12,50"), Some(12.5));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Acme   Corp "), "acme corp");
        assert_eq!(normalize_name("ACME corp"), "acme corp");
    }
}
