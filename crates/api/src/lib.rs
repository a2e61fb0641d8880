//! Trellis API client — the grid engine's network collaborator.
//!
//! This crate is the single source of truth for the REST wire contract:
//! list, patch, create, delete, and the JSON-to-record mapping.
//!
//! No view concepts. No retries. The engine decides what to do with
//! failures; this crate just reports them.

mod client;

pub use client::{record_from_json, ApiError, EntityClient, EntityKind, RestClient};
