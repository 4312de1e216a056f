//! Date normalization for mixed Hijri/Gregorian spreadsheet cells
//!
//! Dates are optional enrichments: anything that cannot be understood
//! degrades to `None` instead of failing the row.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::types::CellValue;

use super::hijri;

/// Era suffix written after Hijri dates
const HIJRI_ERA_MARKER: &str = "هـ";

/// A leading component at or above this value is read as a year
const YEAR_FIRST_THRESHOLD: i64 = 1400;

/// Years representable by the spreadsheet tooling the files come from
const MIN_GREGORIAN_YEAR: i32 = 1677;
const MAX_GREGORIAN_YEAR: i32 = 2262;

const FLEXIBLE_DATE_FORMATS: &[&str] = &[
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const FLEXIBLE_DATETIME_FORMATS: &[&str] = &[
    "%Y.%m.%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y%m%dT%H%M%S",
];

/// Normalize a cell into a Gregorian calendar date.
///
/// Date cells are returned as-is. Text of the form `YYYY/MM/DD` or
/// `DD/MM/YYYY` (either separator, optional `هـ` suffix) is read as Hijri and
/// converted. Anything else gets a best-effort Gregorian parse.
pub fn normalize_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Empty | CellValue::Error(_) => None,
        CellValue::Bool(false) | CellValue::Int(0) => None,
        CellValue::Float(v) if *v == 0.0 || v.is_nan() => None,
        other => normalize_date_str(&other.to_string()),
    }
}

/// Normalize the textual form of a date
pub fn normalize_date_str(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw
        .trim()
        .replace(HIJRI_ERA_MARKER, "")
        .replace('-', "/");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let parts: Vec<&str> = cleaned.split('/').collect();
    if parts.len() != 3 {
        return parse_gregorian_flexible(cleaned);
    }

    let components = parts
        .iter()
        .map(|part| parse_component(part))
        .collect::<Option<Vec<i64>>>()?;

    let (year, month, day) = if components[0] >= YEAR_FIRST_THRESHOLD {
        (components[0], components[1], components[2])
    } else {
        (components[2], components[1], components[0])
    };

    // Every three-part date is treated as Hijri, whatever its year looks like.
    match hijri::to_gregorian(year, month, day) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(value = raw, "Discarding date: {}", e);
            None
        }
    }
}

/// Parse one numeric date component, accepting Arabic-Indic digits
fn parse_component(part: &str) -> Option<i64> {
    let part = part.trim();
    let digits = part.strip_prefix('+').unwrap_or(part);
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0i64, |acc, c| {
        let digit = decimal_digit(c)?;
        acc.checked_mul(10)?.checked_add(digit)
    })
}

fn decimal_digit(c: char) -> Option<i64> {
    match c {
        '0'..='9' => Some(c as i64 - '0' as i64),
        '\u{0660}'..='\u{0669}' => Some(c as i64 - 0x0660),
        '\u{06F0}'..='\u{06F9}' => Some(c as i64 - 0x06F0),
        _ => None,
    }
}

/// Best-effort Gregorian parse for values that are not three-part dates
fn parse_gregorian_flexible(s: &str) -> Option<NaiveDate> {
    let date = parse_compact(s)
        .or_else(|| parse_year_only(s))
        .or_else(|| parse_year_month(s))
        .or_else(|| {
            FLEXIBLE_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
        .or_else(|| {
            FLEXIBLE_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })?;

    (MIN_GREGORIAN_YEAR..=MAX_GREGORIAN_YEAR)
        .contains(&date.year())
        .then_some(date)
}

/// `YYYYMMDD`
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYY`, read as the first of January
fn parse_year_only(s: &str) -> Option<NaiveDate> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
}

/// `YYYY/MM`, read as the first of the month
fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.split_once('/')?;
    if year.len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.trim().parse().ok()?, month.trim().parse().ok()?, 1)
}
