//! NetEvent Algo - pairing and team-formation engine for networking events
//!
//! Participants are paired across a fixed number of rounds so that nobody
//! meets the same person twice, then partitioned into balanced teams that
//! spread distinctive strengths. The algorithms live in `core`; the
//! `services` layer runs them against a persistent store.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_compatibility_score, RoundMatcher, TeamAssigner};
pub use error::EngineError;
pub use models::{Match, Participant, ScoringWeights, Team, TeamSizing};
pub use services::{EventService, EventStore, InMemoryStore};
