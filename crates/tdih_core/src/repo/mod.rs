//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the content store contract consumed by lookups.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `HistoricalEvent::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod event_repo;
