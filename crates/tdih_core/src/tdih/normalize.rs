//! Date normalization.
//!
//! # Responsibility
//! - Turn stored date values (text or structured) into `PartialDate`.
//! - Reject values without month/day granularity.
//!
//! # Invariants
//! - Pure function of its input.
//! - February 29 is always accepted; the year may be unknown, so no leap-year
//!   check is possible.
//! - Unknown years (`????`, `0000`, absent) normalize to `year = None`.

use crate::model::event::{PartialDate, RawDate};
use crate::tdih::error::{InvalidDateError, InvalidDateReason};
use once_cell::sync::Lazy;
use regex::Regex;

static FULL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<year>[-+]?\d{1,6}|\?{4})-|--)?(?P<month>\d{1,2}|\?{1,2})-(?P<day>\d{1,2}|\?{1,2})(?:[T\s].*)?$",
    )
    .expect("valid full date regex")
});
static COARSE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d{1,6}(?:-\d{1,2})?$").expect("valid coarse date regex"));

/// Normalizes a stored date to a (year?, month, day) triple.
///
/// # Errors
/// - `Empty` for blank text or `RawDate::Missing`.
/// - `Malformed` for text that is not ISO-like.
/// - `MissingMonthOrDay` when month or day is unknown (`00`, `??`, `None`) or
///   the text only carries a year or year-month.
/// - `OutOfRange` for month outside 1-12 or day outside the month.
pub fn normalize_date(raw: &RawDate) -> Result<PartialDate, InvalidDateError> {
    match raw {
        RawDate::Missing => Err(InvalidDateError::new(InvalidDateReason::Empty, "")),
        RawDate::Text(text) => normalize_text(text),
        RawDate::Parts { year, month, day } => {
            let describe = || format!("{year:?}/{month:?}/{day:?}");
            let (Some(month), Some(day)) = (*month, *day) else {
                return Err(InvalidDateError::new(
                    InvalidDateReason::MissingMonthOrDay,
                    describe(),
                ));
            };
            checked(*year, month, day).ok_or_else(|| {
                InvalidDateError::new(InvalidDateReason::OutOfRange, describe())
            })
        }
    }
}

/// Returns the highest valid day for `month`, with February fixed at 29.
///
/// Returns `None` for months outside 1-12.
pub fn max_day_of_month(month: u32) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 => Some(29),
        _ => None,
    }
}

fn normalize_text(text: &str) -> Result<PartialDate, InvalidDateError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvalidDateError::new(InvalidDateReason::Empty, text));
    }

    let Some(caps) = FULL_DATE_RE.captures(trimmed) else {
        let reason = if COARSE_DATE_RE.is_match(trimmed) {
            InvalidDateReason::MissingMonthOrDay
        } else {
            InvalidDateReason::Malformed
        };
        return Err(InvalidDateError::new(reason, trimmed));
    };

    let year = match caps.name("year").map(|m| m.as_str()) {
        None => None,
        Some(value) if value.starts_with('?') => None,
        Some(value) => {
            let parsed = value
                .parse::<i32>()
                .map_err(|_| InvalidDateError::new(InvalidDateReason::Malformed, trimmed))?;
            (parsed != 0).then_some(parsed)
        }
    };

    let month = known_component(&caps["month"]);
    let day = known_component(&caps["day"]);
    let (Some(month), Some(day)) = (month, day) else {
        return Err(InvalidDateError::new(
            InvalidDateReason::MissingMonthOrDay,
            trimmed,
        ));
    };

    checked(year, month, day)
        .ok_or_else(|| InvalidDateError::new(InvalidDateReason::OutOfRange, trimmed))
}

/// `??` and `00` both mean "unknown" for month/day components.
fn known_component(value: &str) -> Option<u32> {
    if value.starts_with('?') {
        return None;
    }
    value.parse::<u32>().ok().filter(|parsed| *parsed != 0)
}

fn checked(year: Option<i32>, month: u32, day: u32) -> Option<PartialDate> {
    let max_day = max_day_of_month(month)?;
    if day == 0 || day > max_day {
        return None;
    }
    Some(PartialDate { year, month, day })
}
