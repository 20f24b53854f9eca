//! Domain model for dated historical content.
//!
//! # Responsibility
//! - Define the content records consumed by "this day in history" lookups.
//! - Keep raw (as stored) and normalized (as matched) date shapes distinct.
//!
//! # Invariants
//! - Every event is identified by a stable `EventId`.
//! - A normalized date always carries a known month and day.
//!
//! # See also
//! - `crate::tdih::normalize` for the raw-to-normalized conversion

pub mod event;
