//! "This day in history" lookup service.
//!
//! # Responsibility
//! - Orchestrate store fetch, date normalization, matching and ranking.
//! - Validate caller queries before touching the store.
//!
//! # Invariants
//! - The store is injected at construction; no ambient global state.
//! - Events failing normalization are skipped, never fatal.
//! - Store failures propagate as `TdihError::UpstreamUnavailable`; no retry,
//!   no empty-result masking.
//! - No event is mutated. Identical inputs against an unchanged store yield
//!   identical output.

use crate::config::RetrievalConfig;
use crate::model::event::{HistoricalEvent, PartialDate, CONTENT_TYPE_BIOGRAPHY};
use crate::repo::event_repo::{CandidateFilter, EventStore};
use crate::tdih::error::{InvalidQueryError, TdihError, TdihResult};
use crate::tdih::matcher::{matches_day, DateRange, MonthDay};
use crate::tdih::normalize::normalize_date;
use crate::tdih::ranker::{apply_order, rank_events, MatchedEvent, RankedResult};
use chrono::{Datelike, Local, NaiveDate};
use log::{debug, error, info};
use std::time::Instant;

/// Target calendar day plus optional year to promote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateQuery {
    pub target: MonthDay,
    /// Year whose events rank first, e.g. the year of a birthday.
    pub reference_year: Option<i32>,
}

impl DateQuery {
    pub fn new(
        month: u32,
        day: u32,
        reference_year: Option<i32>,
    ) -> Result<Self, InvalidQueryError> {
        Ok(Self {
            target: MonthDay::new(month, day)?,
            reference_year,
        })
    }

    /// Query for the calendar day of `date`, promoting its year.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            target: MonthDay::from(date),
            reference_year: Some(date.year()),
        }
    }
}

/// Source of "today" for date-relative lookups.
pub type Clock = fn() -> NaiveDate;

/// Today's date in the local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Lookup facade over an `EventStore`.
pub struct TdihService<S: EventStore> {
    store: S,
    config: RetrievalConfig,
    filter: CandidateFilter,
    clock: Clock,
}

impl<S: EventStore> TdihService<S> {
    /// Creates a service with default retrieval settings.
    pub fn new(store: S) -> Self {
        Self::with_config(store, RetrievalConfig::default())
    }

    /// Creates a service using explicit retrieval settings.
    pub fn with_config(store: S, config: RetrievalConfig) -> Self {
        let filter = config.candidate_filter();
        Self {
            store,
            config,
            filter,
            clock: local_today,
        }
    }

    /// Replaces the local clock used by `find_events_today`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Finds events on `target_month`/`target_day` of any year.
    ///
    /// # Contract
    /// - Only events whose normalized month and day equal the target.
    /// - Events from `reference_year` first with `exact_match = true`; the
    ///   remaining order follows `RetrievalConfig::order`.
    /// - At most `RetrievalConfig::limit` items.
    ///
    /// # Errors
    /// - `InvalidQuery` for an impossible month/day, before any store call.
    /// - `UpstreamUnavailable` when the store fails.
    pub fn find_events(
        &self,
        target_month: u32,
        target_day: u32,
        reference_year: Option<i32>,
    ) -> TdihResult<RankedResult> {
        let query = DateQuery::new(target_month, target_day, reference_year)?;
        self.find(&query)
    }

    /// Runs a prepared day query.
    pub fn find(&self, query: &DateQuery) -> TdihResult<RankedResult> {
        let matched = self.collect_matches("find_events", &self.filter, |date| {
            matches_day(query.target, date)
        })?;
        Ok(self.rank(matched, query.reference_year))
    }

    /// Finds events on the calendar day of `date`, promoting its year.
    pub fn find_events_on(&self, date: NaiveDate) -> TdihResult<RankedResult> {
        self.find(&DateQuery::on(date))
    }

    /// Finds events on the clock's current day, promoting the current year.
    pub fn find_events_today(&self) -> TdihResult<RankedResult> {
        self.find_events_on((self.clock)())
    }

    /// Finds people and events sharing a birthday; the birth year ranks first.
    ///
    /// Biographies are searched in addition to the configured content types.
    pub fn find_birthday_events(&self, birthday: NaiveDate) -> TdihResult<RankedResult> {
        let query = DateQuery::on(birthday);
        let filter = with_biographies(&self.filter);
        let matched = self.collect_matches("find_birthday_events", &filter, |date| {
            matches_day(query.target, date)
        })?;
        Ok(self.rank(matched, query.reference_year))
    }

    /// Finds editor-featured events on a calendar day.
    ///
    /// # Errors
    /// - `InvalidQuery` for an impossible month/day, before any store call.
    pub fn find_featured_events(
        &self,
        target_month: u32,
        target_day: u32,
    ) -> TdihResult<RankedResult> {
        let target = MonthDay::new(target_month, target_day)?;
        let matched = self.collect_matches("find_featured_events", &self.filter, |date| {
            matches_day(target, date)
        })?;
        let featured = matched
            .into_iter()
            .filter(|matched| matched.event.featured)
            .collect();
        Ok(self.rank(featured, None))
    }

    /// Finds events whose calendar day lies in an inclusive day range.
    ///
    /// A range whose start is after its end wraps the year boundary
    /// (Dec 15 to Jan 15). Results are unranked, in store order.
    pub fn find_events_in_range(
        &self,
        from_month: u32,
        from_day: u32,
        to_month: u32,
        to_day: u32,
    ) -> TdihResult<Vec<HistoricalEvent>> {
        let range = DateRange::days(from_month, from_day, to_month, to_day)?;
        self.find_events_in(&range)
    }

    /// Finds events inside any `DateRange`, including month-granular ones.
    pub fn find_events_in(&self, range: &DateRange) -> TdihResult<Vec<HistoricalEvent>> {
        let matched =
            self.collect_matches("find_events_in_range", &self.filter, |date| range.matches(date))?;
        Ok(matched.into_iter().map(|matched| matched.event).collect())
    }

    fn rank(&self, mut matched: Vec<MatchedEvent>, reference_year: Option<i32>) -> RankedResult {
        apply_order(&mut matched, self.config.order);
        let mut ranked = rank_events(matched, reference_year);
        if let Some(limit) = self.config.limit {
            ranked.truncate(limit);
        }
        ranked
    }

    fn collect_matches<P>(
        &self,
        operation: &'static str,
        filter: &CandidateFilter,
        predicate: P,
    ) -> TdihResult<Vec<MatchedEvent>>
    where
        P: Fn(&PartialDate) -> bool,
    {
        let started_at = Instant::now();
        let candidates = self
            .store
            .fetch_candidate_events(filter)
            .map_err(|err| {
                error!(
                    "event=tdih_lookup module=tdih status=error op={operation} duration_ms={} error_code=upstream_unavailable error={err}",
                    started_at.elapsed().as_millis()
                );
                TdihError::UpstreamUnavailable(err)
            })?;

        let candidate_count = candidates.len();
        let mut skipped = 0_usize;
        let mut matched = Vec::new();
        for event in candidates {
            match normalize_date(&event.date) {
                Ok(date) if predicate(&date) => matched.push(MatchedEvent { event, date }),
                Ok(_) => {}
                Err(err) => {
                    skipped += 1;
                    debug!(
                        "event=tdih_skip module=tdih status=skip op={operation} event_id={} reason={}",
                        event.id,
                        err.reason.as_str()
                    );
                }
            }
        }

        info!(
            "event=tdih_lookup module=tdih status=ok op={operation} candidates={candidate_count} matched={} skipped={skipped} duration_ms={}",
            matched.len(),
            started_at.elapsed().as_millis()
        );
        Ok(matched)
    }
}

/// An empty type list already covers every type.
fn with_biographies(filter: &CandidateFilter) -> CandidateFilter {
    let mut filter = filter.clone();
    let listed = filter
        .content_types
        .iter()
        .any(|content_type| content_type == CONTENT_TYPE_BIOGRAPHY);
    if !filter.content_types.is_empty() && !listed {
        filter.content_types.push(CONTENT_TYPE_BIOGRAPHY.to_string());
    }
    filter
}
