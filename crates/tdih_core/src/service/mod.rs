//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and pure lookup logic into caller-facing APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod tdih_service;
