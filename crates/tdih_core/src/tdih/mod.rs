//! "This day in history" matching and ranking.
//!
//! # Responsibility
//! - Normalize stored dates, match them by calendar position and rank the
//!   matches. Storage and presentation stay outside this module.
//!
//! # Invariants
//! - Everything here is pure and synchronous; no I/O, no shared state.

pub mod error;
pub mod matcher;
pub mod normalize;
pub mod ranker;
