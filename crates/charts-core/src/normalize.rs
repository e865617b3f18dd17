//! Value normalization.
//!
//! Converts raw heterogeneous cell values into canonical quantities: a
//! time-of-day in minutes since midnight, a duration in hours, or a
//! `"Month Year"` grouping key. Unparsable values become `None`, never an
//! error — the owning row is simply excluded from whichever derived
//! quantity failed to parse.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::models::CellValue;

const MINUTES_PER_DAY: f64 = 1440.0;

// ── Compiled patterns ─────────────────────────────────────────────────────────

fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d{1,2})\s*:\s*(\d{2})(?:\s*:\s*(\d{2}))?\s*(am|pm)?")
            .expect("regex is valid")
    })
}

fn day_duration_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*days?\s*(\d{1,2}):(\d{2})(?::(\d{2}))?").expect("regex is valid")
    })
}

fn duration_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?").expect("regex is valid"))
}

// First alternative: season with a year, which may abut the season word
// ("Fall2024"). Second: a standalone season word; its trailing boundary
// keeps embedded matches like "fallback" out. Alternation is
// leftmost-first, so the with-year form wins when both apply.
fn semester_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(fall|spring|summer|winter)(?:\s*semester)?\s*(\d{4})\b|\b(fall|spring|summer|winter)\b(?:\s*semester)?",
        )
        .expect("regex is valid")
    })
}

// ── Time of day ───────────────────────────────────────────────────────────────

/// Extract a time-of-day as minutes since midnight.
///
/// Accepts, in priority order:
/// 1. a temporal cell → `hour * 60 + minute`;
/// 2. a number → fractional day (the fractional part when ≥ 1), rounded to
///    the nearest minute; results outside `[0, 1440)` are rejected;
/// 3. text matching `H[:]MM[:SS] [AM|PM]` with 12-hour conversion.
pub fn time_to_minutes(cell: &CellValue) -> Option<u32> {
    match cell {
        CellValue::Missing => None,
        CellValue::DateTime(dt) => Some(dt.hour() * 60 + dt.minute()),
        CellValue::Number(n) if !n.is_finite() => None,
        CellValue::Number(n) => {
            let frac = if *n >= 1.0 { n.fract() } else { *n };
            let total = (frac * MINUTES_PER_DAY).round();
            if (0.0..MINUTES_PER_DAY).contains(&total) {
                Some(total as u32)
            } else {
                None
            }
        }
        CellValue::Text(s) => text_time_to_minutes(s),
    }
}

fn text_time_to_minutes(s: &str) -> Option<u32> {
    let caps = time_pattern().captures(s.trim())?;
    let mut hour: i64 = caps[1].parse().ok()?;
    let minute: i64 = caps[2].parse().ok()?;
    let meridiem = caps.get(4).map(|m| m.as_str().to_ascii_uppercase());

    match meridiem.as_deref() {
        Some("AM") if hour == 12 => hour = 0,
        Some("PM") if hour < 12 => hour += 12,
        _ => {}
    }

    if !(0..=23).contains(&hour) || !(0..=59).contains(&minute) {
        debug!("time out of range: \"{}\"", s);
        return None;
    }
    Some((hour * 60 + minute) as u32)
}

// ── Duration ──────────────────────────────────────────────────────────────────

/// Extract a duration in hours.
///
/// Accepts, in priority order: a number (spreadsheet fraction-of-day, so
/// × 24), a temporal cell (`(h*60+m)/60`), text `D day[s] H:MM[:SS]`, or
/// text `H:MM[:SS]`.
pub fn duration_to_hours(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Missing => None,
        CellValue::Number(n) if !n.is_finite() => None,
        CellValue::Number(n) => Some(n * 24.0),
        CellValue::DateTime(dt) => Some((dt.hour() * 60 + dt.minute()) as f64 / 60.0),
        CellValue::Text(s) => text_duration_to_hours(s),
    }
}

fn text_duration_to_hours(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = day_duration_pattern().captures(s) {
        let days: f64 = caps[1].parse().ok()?;
        let hours: f64 = caps[2].parse().ok()?;
        let minutes: f64 = caps[3].parse().ok()?;
        let seconds: f64 = caps.get(4).map_or(0.0, |m| m.as_str().parse().unwrap_or(0.0));
        return Some(days * 24.0 + hours + minutes / 60.0 + seconds / 3600.0);
    }

    if let Some(caps) = duration_pattern().captures(s) {
        let hours: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        let seconds: f64 = caps.get(3).map_or(0.0, |m| m.as_str().parse().unwrap_or(0.0));
        return Some(hours + minutes / 60.0 + seconds / 3600.0);
    }

    None
}

// ── Month keys ────────────────────────────────────────────────────────────────

/// Derive the canonical `"Month Year"` grouping key from a date cell.
///
/// Numbers are interpreted as spreadsheet date serials (days since
/// 1899-12-30; the base already absorbs the historical 1900 leap-year bug).
/// Text goes through a generic date-parse cascade; anything unparsable
/// yields `None` and the row is silently excluded from month grouping.
pub fn date_to_month_key(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Missing => None,
        CellValue::DateTime(dt) => Some(format_month_key(dt.date())),
        CellValue::Number(n) => serial_to_datetime(*n).map(|dt| format_month_key(dt.date())),
        CellValue::Text(s) => parse_text_date(s).map(format_month_key),
    }
}

/// Format a date as the canonical month key, e.g. `"September 2024"`.
pub fn format_month_key(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Convert a spreadsheet date serial to a naive date-time.
///
/// Serial 0 is 1899-12-30; fractional parts carry the time of day.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() >= 1.0e9 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Date-time patterns tried before the date-only patterns.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%b %d %Y",
];

/// Generic free-text date parse used for month grouping.
fn parse_text_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    // A bare "Month Year" string maps onto the first of that month.
    if let Some(date) = parse_month_key(s) {
        return Some(date);
    }

    debug!("could not parse date string \"{}\"", s);
    None
}

/// Re-parse a month key back into the first day of that month.
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {}", key.trim()), "%d %B %Y").ok()
}

/// Chronological ordering value for a month key.
///
/// Unparsable keys sort to a fixed earliest position (epoch zero) rather
/// than erroring.
pub fn month_sort_key(key: &str) -> i64 {
    parse_month_key(key)
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp())
        .unwrap_or(0)
}

/// Stable chronological sort of month keys.
pub fn sort_month_keys(keys: &mut [String]) {
    keys.sort_by_key(|k| month_sort_key(k));
}

// ── Semester labels ───────────────────────────────────────────────────────────

/// Parse a semester label out of arbitrary text.
///
/// Matches a season word, optionally followed by "Semester" and a four-digit
/// year (the year may abut the season, as in `"Fall2024"`); produces
/// `"Fall Semester 2024"` or the season-only `"Fall Semester"` when no year
/// is present.
pub fn parse_semester_label(text: &str) -> Option<String> {
    let caps = semester_pattern().captures(text)?;
    let season = capitalize(caps.get(1).or_else(|| caps.get(3))?.as_str());
    match caps.get(2) {
        Some(year) => Some(format!("{} Semester {}", season, year.as_str())),
        None => Some(format!("{} Semester", season)),
    }
}

/// Infer the semester label for a workbook: the file name is scanned first,
/// then the sheet names in order; the first match wins. Falls back to the
/// generic `"Semester"`.
pub fn infer_semester_label(file_name: &str, sheet_names: &[String]) -> String {
    std::iter::once(file_name)
        .chain(sheet_names.iter().map(|s| s.as_str()))
        .find_map(parse_semester_label)
        .unwrap_or_else(|| "Semester".to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
