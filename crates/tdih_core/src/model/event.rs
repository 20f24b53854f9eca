//! Historical event domain model.
//!
//! # Responsibility
//! - Define the canonical record for dated content (events, biographies,
//!   articles) as handed over by the content store.
//! - Provide write-path validation for records created through the repository.
//!
//! # Invariants
//! - `id` is stable and never reused for another event.
//! - `date` is kept exactly as stored; normalization happens at lookup time.
//! - `PartialDate` never represents an unknown month or day.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a historical event.
pub type EventId = Uuid;

/// Content type used for plain dated events.
pub const CONTENT_TYPE_EVENT: &str = "event";
/// Content type used for people, dated by birth.
pub const CONTENT_TYPE_BIOGRAPHY: &str = "biography";
/// Content type used for long-form articles.
pub const CONTENT_TYPE_ARTICLE: &str = "article";

/// Date value as stored by the content store, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawDate {
    /// ISO-like text such as `1994-04-27`, `????-12-25` or `1652-04-06T00:00:00`.
    Text(String),
    /// Structured date where any component may be unknown.
    Parts {
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
    },
    /// No date recorded.
    Missing,
}

impl RawDate {
    /// Builds a structured date with all three components known.
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self::Parts {
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }

    /// Builds a structured date with an unknown year.
    pub fn month_day(month: u32, day: u32) -> Self {
        Self::Parts {
            year: None,
            month: Some(month),
            day: Some(day),
        }
    }

    /// Builds a text date.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Normalized calendar position of an event.
///
/// Month and day are always known; the year is optional because many
/// historical records only preserve the anniversary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

impl PartialDate {
    /// Composite `month * 100 + day` key used for calendar comparisons.
    pub fn mmdd(&self) -> u32 {
        self.month * 100 + self.day
    }
}

impl Display for PartialDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{year:04}-{:02}-{:02}", self.month, self.day),
            None => write!(f, "????-{:02}-{:02}", self.month, self.day),
        }
    }
}

/// One dated content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub id: EventId,
    pub title: String,
    pub date: RawDate,
    /// Body or teaser text shown under the title.
    pub summary: String,
    /// Editor-curated highlight flag.
    pub featured: bool,
    /// Content bundle name, e.g. `event` or `biography`.
    pub content_type: String,
    pub published: bool,
}

/// Validation errors for event write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyTitle,
    EmptyContentType,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title cannot be empty"),
            Self::EmptyContentType => write!(f, "event content type cannot be empty"),
        }
    }
}

impl Error for EventValidationError {}

impl HistoricalEvent {
    /// Creates a published, non-featured `event` with a generated ID.
    pub fn new(title: impl Into<String>, date: RawDate) -> Self {
        Self::with_id(Uuid::new_v4(), title, date)
    }

    /// Creates an event with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists in the CMS.
    pub fn with_id(id: EventId, title: impl Into<String>, date: RawDate) -> Self {
        Self {
            id,
            title: title.into(),
            date,
            summary: String::new(),
            featured: false,
            content_type: CONTENT_TYPE_EVENT.to_string(),
            published: true,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    /// Validates write-path invariants.
    ///
    /// Dates are not validated here: malformed dates are legal content and
    /// are skipped at lookup time instead.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        if self.content_type.trim().is_empty() {
            return Err(EventValidationError::EmptyContentType);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{EventValidationError, HistoricalEvent, PartialDate, RawDate};

    #[test]
    fn new_event_defaults_to_published_plain_event() {
        let event = HistoricalEvent::new("Freedom Day", RawDate::ymd(1994, 4, 27));
        assert!(event.published);
        assert!(!event.featured);
        assert_eq!(event.content_type, "event");
        assert!(event.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_title_and_content_type() {
        let event = HistoricalEvent::new("   ", RawDate::Missing);
        assert_eq!(event.validate(), Err(EventValidationError::EmptyTitle));

        let event = HistoricalEvent::new("x", RawDate::Missing).with_content_type("");
        assert_eq!(event.validate(), Err(EventValidationError::EmptyContentType));
    }

    #[test]
    fn raw_date_serializes_with_snake_case_tags() {
        let text = serde_json::to_value(RawDate::text("1994-04-27")).unwrap();
        assert_eq!(text, serde_json::json!({ "text": "1994-04-27" }));

        let parts = serde_json::to_value(RawDate::month_day(12, 25)).unwrap();
        assert_eq!(
            parts,
            serde_json::json!({ "parts": { "year": null, "month": 12, "day": 25 } })
        );

        let missing: RawDate = serde_json::from_str("\"missing\"").unwrap();
        assert_eq!(missing, RawDate::Missing);
    }

    #[test]
    fn partial_date_display_marks_unknown_year() {
        let known = PartialDate {
            year: Some(1652),
            month: 4,
            day: 6,
        };
        let unknown = PartialDate {
            year: None,
            month: 12,
            day: 25,
        };
        assert_eq!(known.to_string(), "1652-04-06");
        assert_eq!(unknown.to_string(), "????-12-25");
        assert_eq!(unknown.mmdd(), 1225);
    }
}
