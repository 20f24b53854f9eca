//! Historical event store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the candidate query consumed by lookups (`EventStore`).
//! - Provide write/read APIs used by imports over `historical_events`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Dates are stored as a nullable year/month/day triple or as raw legacy
//!   text; no pattern matching on date strings happens in SQL.
//! - Candidate queries filter only by content type and publish status.
//! - Candidate order is insertion order, so repeated reads are identical.
//! - Only identity and flag corruption fail a read; odd date columns are
//!   handed on for the lookup to skip.

use crate::db::DbError;
use crate::model::event::{EventId, EventValidationError, HistoricalEvent, RawDate};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    summary,
    content_type,
    event_year,
    event_month,
    event_day,
    event_date_text,
    is_featured,
    is_published
FROM historical_events";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and candidate queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    /// Non-SQL backends report transport failures here.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::Unavailable(message) => write!(f, "event store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Candidate query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    /// Accepted content types. Empty means every type.
    pub content_types: Vec<String>,
    pub published_only: bool,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            content_types: Vec::new(),
            published_only: true,
        }
    }
}

impl CandidateFilter {
    pub fn for_types<I, S>(content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content_types: content_types.into_iter().map(Into::into).collect(),
            published_only: true,
        }
    }
}

/// Content store consumed by lookups.
pub trait EventStore {
    /// Returns candidate events pre-filtered by type and publish status.
    fn fetch_candidate_events(
        &self,
        filter: &CandidateFilter,
    ) -> RepoResult<Vec<HistoricalEvent>>;
}

impl<T: EventStore + ?Sized> EventStore for &T {
    fn fetch_candidate_events(
        &self,
        filter: &CandidateFilter,
    ) -> RepoResult<Vec<HistoricalEvent>> {
        (**self).fetch_candidate_events(filter)
    }
}

impl<T: EventStore + ?Sized> EventStore for Box<T> {
    fn fetch_candidate_events(
        &self,
        filter: &CandidateFilter,
    ) -> RepoResult<Vec<HistoricalEvent>> {
        (**self).fetch_candidate_events(filter)
    }
}

/// Write/read APIs for event records.
pub trait EventRepository {
    fn create_event(&self, event: &HistoricalEvent) -> RepoResult<EventId>;
    fn update_event(&self, event: &HistoricalEvent) -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<HistoricalEvent>>;
    fn set_published(&self, id: EventId, published: bool) -> RepoResult<()>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "historical_events")? {
            return Err(RepoError::MissingRequiredTable("historical_events"));
        }
        Ok(Self { conn })
    }
}

impl EventStore for SqliteEventRepository<'_> {
    fn fetch_candidate_events(
        &self,
        filter: &CandidateFilter,
    ) -> RepoResult<Vec<HistoricalEvent>> {
        let mut sql = format!("{EVENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if filter.published_only {
            sql.push_str(" AND is_published = 1");
        }

        if !filter.content_types.is_empty() {
            let placeholders = vec!["?"; filter.content_types.len()].join(", ");
            sql.push_str(&format!(" AND content_type IN ({placeholders})"));
            bind_values.extend(
                filter
                    .content_types
                    .iter()
                    .map(|content_type| Value::Text(content_type.clone())),
            );
        }

        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &HistoricalEvent) -> RepoResult<EventId> {
        event.validate()?;
        let columns = DateColumns::from(&event.date);

        self.conn.execute(
            "INSERT INTO historical_events (
                uuid,
                title,
                summary,
                content_type,
                event_year,
                event_month,
                event_day,
                event_date_text,
                is_featured,
                is_published
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                event.summary.as_str(),
                event.content_type.as_str(),
                columns.year,
                columns.month,
                columns.day,
                columns.text,
                bool_to_int(event.featured),
                bool_to_int(event.published),
            ],
        )?;

        Ok(event.id)
    }

    fn update_event(&self, event: &HistoricalEvent) -> RepoResult<()> {
        event.validate()?;
        let columns = DateColumns::from(&event.date);

        let changed = self.conn.execute(
            "UPDATE historical_events
             SET
                title = ?1,
                summary = ?2,
                content_type = ?3,
                event_year = ?4,
                event_month = ?5,
                event_day = ?6,
                event_date_text = ?7,
                is_featured = ?8,
                is_published = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                event.title.as_str(),
                event.summary.as_str(),
                event.content_type.as_str(),
                columns.year,
                columns.month,
                columns.day,
                columns.text,
                bool_to_int(event.featured),
                bool_to_int(event.published),
                event.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<HistoricalEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn set_published(&self, id: EventId, published: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE historical_events
             SET
                is_published = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(published), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Column projection of `RawDate`.
struct DateColumns<'a> {
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    text: Option<&'a str>,
}

impl<'a> From<&'a RawDate> for DateColumns<'a> {
    fn from(value: &'a RawDate) -> Self {
        match value {
            RawDate::Text(text) => Self {
                year: None,
                month: None,
                day: None,
                text: Some(text.as_str()),
            },
            RawDate::Parts { year, month, day } => Self {
                year: year.map(i64::from),
                month: month.map(i64::from),
                day: day.map(i64::from),
                text: None,
            },
            RawDate::Missing => Self {
                year: None,
                month: None,
                day: None,
                text: None,
            },
        }
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<HistoricalEvent> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in historical_events.uuid"
        ))
    })?;

    let date = match row.get::<_, Option<String>>("event_date_text")? {
        Some(text) => RawDate::Text(text),
        None => date_from_parts(
            row.get("event_year")?,
            row.get("event_month")?,
            row.get("event_day")?,
        ),
    };

    let event = HistoricalEvent {
        id,
        title: row.get("title")?,
        date,
        summary: row.get("summary")?,
        featured: parse_flag(row, "is_featured")?,
        content_type: row.get("content_type")?,
        published: parse_flag(row, "is_published")?,
    };
    event.validate()?;
    Ok(event)
}

/// Rebuilds a structured date from its stored columns.
///
/// Components that do not fit the model types come back as raw text, which
/// normalization then rejects for that row alone.
fn date_from_parts(year: Option<i64>, month: Option<i64>, day: Option<i64>) -> RawDate {
    if year.is_none() && month.is_none() && day.is_none() {
        return RawDate::Missing;
    }

    let narrowed = (
        year.map(i32::try_from).transpose(),
        month.map(u32::try_from).transpose(),
        day.map(u32::try_from).transpose(),
    );
    match narrowed {
        (Ok(year), Ok(month), Ok(day)) => RawDate::Parts { year, month, day },
        _ => {
            let render =
                |value: Option<i64>| value.map_or_else(|| "??".to_string(), |v| v.to_string());
            RawDate::Text(format!("{}-{}-{}", render(year), render(month), render(day)))
        }
    }
}

fn parse_flag(row: &Row<'_>, column: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in historical_events.{column}"
        ))),
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
