//! Parsing and formatting of the sheet's `Time` column
//!
//! The column is filled by several writers over a competition: the submission
//! form writes `MM/DD/YY, hh:mm:ss AM` text, manual edits tend to produce ISO or
//! US dates, and the spreadsheet API may hand back a serial day number when a
//! cell is formatted as a date. All of them map onto a UTC instant here.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

/// Display format used by the dashboard
const DISPLAY_FORMAT: &str = "%m/%d/%y, %I:%M:%S %p";

/// Two-digit-year formats must be tried before `%Y`, which happily reads `25` as year 25.
const DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%y, %I:%M:%S %p",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Same ordering rule as [`DATE_TIME_FORMATS`]
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%Y-%m-%d", "%m/%d/%Y"];

/// Text dates before this year are typos, not submissions
const MIN_TEXT_YEAR: i32 = 1900;

/// Day zero of spreadsheet serial dates
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial accepted (9999-12-31)
const MAX_SERIAL: f64 = 2_958_465.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parse a `Time` cell into a UTC instant.
///
/// Returns `None` for anything unrecognizable; callers treat that as the oldest
/// possible time. Times without an offset are taken as UTC.
pub fn parse_submission_time(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_prefix('\'').unwrap_or(trimmed).trim();
    if cleaned.is_empty() {
        return None;
    }

    match parse_text_time(cleaned) {
        Some(parsed) if parsed.year() >= MIN_TEXT_YEAR => Some(parsed),
        Some(_) => None,
        None => parse_serial_date(cleaned),
    }
}

fn parse_text_time(cleaned: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc2822(cleaned) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(naive.and_utc());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cleaned, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Spreadsheet serial date: whole days since 1899-12-30, fraction = time of day
fn parse_serial_date(cleaned: &str) -> Option<DateTime<Utc>> {
    let serial: f64 = cleaned.parse().ok()?;
    if !serial.is_finite() || serial <= 0.0 || serial > MAX_SERIAL {
        return None;
    }

    let (year, month, day) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    let offset = Duration::milliseconds((serial * MILLIS_PER_DAY).round() as i64);

    epoch
        .checked_add_signed(offset)
        .map(|naive| naive.and_utc())
}

/// Render a submission time the way the dashboard shows it, `-` when absent
pub fn format_submission_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.format(DISPLAY_FORMAT).to_string(),
        None => "-".to_string(),
    }
}
