//! Calendar-position matching that ignores the year.
//!
//! # Responsibility
//! - Match a candidate date against one calendar day.
//! - Match a candidate date against a day or month range, including ranges
//!   that wrap across the December/January boundary.
//!
//! # Invariants
//! - Comparisons use the composite `MMDD` key (`month * 100 + day`), or the
//!   bare month when a range carries no day bounds.
//! - `from > to` always means the range wraps the year end.

use crate::model::event::PartialDate;
use crate::tdih::error::InvalidQueryError;
use crate::tdih::normalize::max_day_of_month;
use chrono::{Datelike, NaiveDate};

/// One calendar day without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Validates and builds a calendar day. February 29 is accepted.
    pub fn new(month: u32, day: u32) -> Result<Self, InvalidQueryError> {
        validate_day(month, day)?;
        Ok(Self { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn mmdd(&self) -> u32 {
        self.month * 100 + self.day
    }
}

impl From<NaiveDate> for MonthDay {
    fn from(value: NaiveDate) -> Self {
        Self {
            month: value.month(),
            day: value.day(),
        }
    }
}

/// Returns whether `candidate` falls on `target`, ignoring the year.
pub fn matches_day(target: MonthDay, candidate: &PartialDate) -> bool {
    candidate.month == target.month && candidate.day == target.day
}

/// One end of a `DateRange`. A missing day widens the bound to the whole month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBound {
    pub month: u32,
    pub day: Option<u32>,
}

/// Calendar range without a year.
///
/// Only `from` is mandatory. Without `to` the range degrades to equality on
/// the `from` month (or on the `from` day, when one is given).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: RangeBound,
    to: Option<RangeBound>,
}

impl DateRange {
    /// Builds a range from optional components.
    ///
    /// # Errors
    /// - `Month` for months outside 1-12.
    /// - `Day` for days outside the given month.
    /// - `DayWithoutMonth` when `to_day` is set but `to_month` is not.
    pub fn new(
        from_month: u32,
        from_day: Option<u32>,
        to_month: Option<u32>,
        to_day: Option<u32>,
    ) -> Result<Self, InvalidQueryError> {
        let from = bound(from_month, from_day)?;
        let to = match (to_month, to_day) {
            (Some(month), day) => Some(bound(month, day)?),
            (None, Some(day)) => return Err(InvalidQueryError::DayWithoutMonth { day }),
            (None, None) => None,
        };
        Ok(Self { from, to })
    }

    /// Day-precise range, e.g. Dec 15 to Jan 15.
    pub fn days(
        from_month: u32,
        from_day: u32,
        to_month: u32,
        to_day: u32,
    ) -> Result<Self, InvalidQueryError> {
        Self::new(from_month, Some(from_day), Some(to_month), Some(to_day))
    }

    /// Month-granular range, e.g. November to February.
    pub fn months(from_month: u32, to_month: u32) -> Result<Self, InvalidQueryError> {
        Self::new(from_month, None, Some(to_month), None)
    }

    /// Single-month range.
    pub fn month(month: u32) -> Result<Self, InvalidQueryError> {
        Self::new(month, None, None, None)
    }

    pub fn start(&self) -> RangeBound {
        self.from
    }

    pub fn end(&self) -> Option<RangeBound> {
        self.to
    }

    /// Returns whether the range crosses the December/January boundary.
    pub fn wraps(&self) -> bool {
        match self.to {
            None => false,
            Some(to) => {
                let (from_key, to_key) = self.keys(to);
                from_key > to_key
            }
        }
    }

    /// Returns whether `candidate` falls inside the range, ignoring the year.
    pub fn matches(&self, candidate: &PartialDate) -> bool {
        let Some(to) = self.to else {
            return match self.from.day {
                None => candidate.month == self.from.month,
                Some(day) => candidate.month == self.from.month && candidate.day == day,
            };
        };

        let (from_key, to_key) = self.keys(to);
        let value = if self.is_month_granular(to) {
            candidate.month
        } else {
            candidate.mmdd()
        };
        in_cyclic_range(value, from_key, to_key)
    }

    fn is_month_granular(&self, to: RangeBound) -> bool {
        self.from.day.is_none() && to.day.is_none()
    }

    fn keys(&self, to: RangeBound) -> (u32, u32) {
        if self.is_month_granular(to) {
            return (self.from.month, to.month);
        }
        let from_day = self.from.day.unwrap_or(1);
        let to_day = to
            .day
            .or_else(|| max_day_of_month(to.month))
            .unwrap_or(31);
        (
            self.from.month * 100 + from_day,
            to.month * 100 + to_day,
        )
    }
}

fn in_cyclic_range(value: u32, from: u32, to: u32) -> bool {
    if from <= to {
        from <= value && value <= to
    } else {
        value >= from || value <= to
    }
}

fn bound(month: u32, day: Option<u32>) -> Result<RangeBound, InvalidQueryError> {
    match day {
        Some(day) => validate_day(month, day)?,
        None => {
            validate_month(month)?;
        }
    }
    Ok(RangeBound { month, day })
}

fn validate_month(month: u32) -> Result<u32, InvalidQueryError> {
    max_day_of_month(month).ok_or(InvalidQueryError::Month(month))
}

fn validate_day(month: u32, day: u32) -> Result<(), InvalidQueryError> {
    let max_day = validate_month(month)?;
    if day == 0 || day > max_day {
        return Err(InvalidQueryError::Day { month, day });
    }
    Ok(())
}
