//! Ordering of matched events.
//!
//! # Responsibility
//! - Promote events whose year equals a reference year (a birthday, today).
//! - Provide the chronological base order applied before promotion.
//!
//! # Invariants
//! - Every sort here is stable: items with equal rank keep input order.
//! - Ranking never drops or duplicates events.

use crate::model::event::{HistoricalEvent, PartialDate};
use serde::{Deserialize, Serialize};

/// Event paired with its normalized date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedEvent {
    pub event: HistoricalEvent,
    pub date: PartialDate,
}

/// Base order applied to matched events before exact-year promotion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrder {
    /// Known years ascending, unknown years last.
    #[default]
    Chronological,
    /// Keep the order the content store returned.
    Store,
}

/// One entry of a ranked lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEvent {
    pub event: HistoricalEvent,
    pub date: PartialDate,
    /// `true` when the event year equals the reference year.
    pub exact_match: bool,
}

/// Ordered lookup result, exact-year matches first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedResult {
    pub items: Vec<RankedEvent>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over exact-year matches only.
    pub fn exact_matches(&self) -> impl Iterator<Item = &RankedEvent> {
        self.items.iter().filter(|item| item.exact_match)
    }

    /// Drops ranking metadata and returns events in ranked order.
    pub fn into_events(self) -> Vec<HistoricalEvent> {
        self.items.into_iter().map(|item| item.event).collect()
    }

    /// Keeps at most `limit` items.
    pub fn truncate(&mut self, limit: usize) {
        self.items.truncate(limit);
    }
}

/// Sorts by known year ascending, unknown years last.
pub fn order_chronologically(events: &mut [MatchedEvent]) {
    events.sort_by_key(|matched| (matched.date.year.is_none(), matched.date.year));
}

/// Applies `order`, leaving the slice untouched for `EventOrder::Store`.
pub fn apply_order(events: &mut [MatchedEvent], order: EventOrder) {
    match order {
        EventOrder::Chronological => order_chronologically(events),
        EventOrder::Store => {}
    }
}

/// Ranks matched events, promoting exact-year matches.
///
/// Without a reference year no event is flagged and input order is kept.
pub fn rank_events(matched: Vec<MatchedEvent>, reference_year: Option<i32>) -> RankedResult {
    let mut items = matched
        .into_iter()
        .map(|MatchedEvent { event, date }| RankedEvent {
            exact_match: reference_year.is_some() && date.year == reference_year,
            event,
            date,
        })
        .collect::<Vec<_>>();

    // `sort_by_key` is stable; `false` sorts before `true`.
    items.sort_by_key(|item| !item.exact_match);
    RankedResult { items }
}
