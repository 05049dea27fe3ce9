//! Field extractors.
//!
//! Each extractor is a pure function over already-normalized text. None of them
//! read the clock: callers pass the year in.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::intent::types::ParseFailure;
use super::lexicon::MonthTable;

/// Used when an intent needs a duration and the phrase gives none.
pub const DEFAULT_DURATION_MINUTES: u32 = 2;

/// Longest exercise a phrase can ask for.
pub const MAX_DURATION_MINUTES: u32 = 60;

static MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z]+)\s+(\d{1,2})\b").expect("static pattern"));

static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:minutes|minute|mins|min)\b").expect("static pattern"));

static DOSAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*mg\b").expect("static pattern"));

/// `("july", "5", 2026)` -> 2026-07-05.
///
/// Fails on an unknown month word or a day that does not exist in that month.
/// The year is always the caller's current year; dates that already passed are not
/// rolled forward.
pub fn date_from_month_day(
    months: &MonthTable,
    month: &str,
    day: &str,
    year: i32,
) -> Result<NaiveDate, ParseFailure> {
    let mm = months
        .lookup(month)
        .ok_or_else(|| ParseFailure::UnknownMonth(month.to_string()))?;

    let invalid = || ParseFailure::InvalidDay {
        month: month.to_string(),
        day: day.to_string(),
    };
    let dd: u32 = day.parse().map_err(|_| invalid())?;
    let mm: u32 = mm.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, mm, dd).ok_or_else(invalid)
}

/// First `<month-word> <day>` pair anywhere in `text`.
pub fn find_month_day(
    months: &MonthTable,
    text: &str,
    year: i32,
) -> Result<NaiveDate, ParseFailure> {
    let caps = MONTH_DAY
        .captures(text)
        .ok_or(ParseFailure::Shape("<month> <day>"))?;
    date_from_month_day(months, &caps[1], &caps[2], year)
}

/// `N minute(s) | min | mins`, if present, clamped to `1..=MAX_DURATION_MINUTES`.
/// A number too long to parse is treated as the maximum.
pub fn duration_minutes(text: &str) -> Option<u32> {
    let caps = DURATION.captures(text)?;
    let minutes = caps[1]
        .parse::<u64>()
        .map_or(MAX_DURATION_MINUTES, |n| n.clamp(1, u64::from(MAX_DURATION_MINUTES)) as u32);
    Some(minutes)
}

pub fn duration_or_default(text: &str) -> u32 {
    duration_minutes(text).unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// `500mg` / `500 mg` -> "500mg". Absent dosage is an empty string, not an error.
pub fn dosage(text: &str) -> String {
    DOSAGE
        .captures(text)
        .map(|caps| format!("{}mg", &caps[1]))
        .unwrap_or_default()
}

/// Remainder text, trimmed. Empty counts as not matched.
pub fn free_text(rest: &str, what: &'static str) -> Result<String, ParseFailure> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::Empty(what));
    }
    Ok(trimmed.to_string())
}
