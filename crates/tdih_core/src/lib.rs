//! Core "this day in history" logic for dated historical content.
//! This crate owns date normalization, calendar matching and ranking; content
//! storage is reached only through the `EventStore` trait.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tdih;

pub use config::{ConfigError, LoggingConfig, RetrievalConfig, StorageConfig, TdihConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::event::{
    EventId, EventValidationError, HistoricalEvent, PartialDate, RawDate, CONTENT_TYPE_ARTICLE,
    CONTENT_TYPE_BIOGRAPHY, CONTENT_TYPE_EVENT,
};
pub use repo::event_repo::{
    CandidateFilter, EventRepository, EventStore, RepoError, RepoResult, SqliteEventRepository,
};
pub use service::tdih_service::{local_today, Clock, DateQuery, TdihService};
pub use tdih::error::{
    InvalidDateError, InvalidDateReason, InvalidQueryError, TdihError, TdihResult,
};
pub use tdih::matcher::{matches_day, DateRange, MonthDay, RangeBound};
pub use tdih::normalize::normalize_date;
pub use tdih::ranker::{rank_events, EventOrder, MatchedEvent, RankedEvent, RankedResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
