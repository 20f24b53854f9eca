//! Error taxonomy for "this day in history" lookups.
//!
//! # Invariants
//! - `InvalidDateError` is per-item and never aborts a lookup.
//! - `InvalidQueryError` and `TdihError::UpstreamUnavailable` abort the whole
//!   call before any partial result is produced.

use crate::repo::event_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for lookup APIs.
pub type TdihResult<T> = Result<T, TdihError>;

/// Why a stored date could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDateReason {
    /// Blank text or a `Missing` date.
    Empty,
    /// Text that does not look like `YYYY-MM-DD`.
    Malformed,
    /// Month or day is unknown.
    MissingMonthOrDay,
    /// Month outside 1-12 or day outside the month.
    OutOfRange,
}

impl InvalidDateReason {
    /// Stable token used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Malformed => "malformed",
            Self::MissingMonthOrDay => "missing_month_or_day",
            Self::OutOfRange => "out_of_range",
        }
    }
}

/// A stored date that lacks month/day granularity or cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateError {
    pub reason: InvalidDateReason,
    /// Raw value as received, for diagnostics only.
    pub value: String,
}

impl InvalidDateError {
    pub(crate) fn new(reason: InvalidDateReason, value: impl Into<String>) -> Self {
        Self {
            reason,
            value: value.into(),
        }
    }
}

impl Display for InvalidDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid date `{}`: {}",
            self.value,
            self.reason.as_str()
        )
    }
}

impl Error for InvalidDateError {}

/// Caller-supplied query values that cannot describe a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidQueryError {
    /// Month outside 1-12.
    Month(u32),
    /// Day outside 1..=days-in-month (February allows 29).
    Day { month: u32, day: u32 },
    /// A range bound names a day without naming its month.
    DayWithoutMonth { day: u32 },
}

impl Display for InvalidQueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Month(month) => write!(f, "month {month} is out of range 1-12"),
            Self::Day { month, day } => {
                write!(f, "day {day} is out of range for month {month}")
            }
            Self::DayWithoutMonth { day } => {
                write!(f, "range bound has day {day} but no month")
            }
        }
    }
}

impl Error for InvalidQueryError {}

/// Fatal lookup error surfaced to callers.
#[derive(Debug)]
pub enum TdihError {
    InvalidQuery(InvalidQueryError),
    /// The content store call failed; passed through unchanged.
    UpstreamUnavailable(RepoError),
}

impl Display for TdihError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery(err) => write!(f, "invalid date query: {err}"),
            Self::UpstreamUnavailable(err) => write!(f, "content store unavailable: {err}"),
        }
    }
}

impl Error for TdihError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery(err) => Some(err),
            Self::UpstreamUnavailable(err) => Some(err),
        }
    }
}

impl From<InvalidQueryError> for TdihError {
    fn from(value: InvalidQueryError) -> Self {
        Self::InvalidQuery(value)
    }
}

impl From<RepoError> for TdihError {
    fn from(value: RepoError) -> Self {
        Self::UpstreamUnavailable(value)
    }
}
