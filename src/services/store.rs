//! Persistence ports for participants, matches and teams.
//!
//! The engine never holds records between calls: every operation reads a
//! fresh snapshot through these traits and writes its results back in one
//! batch. Batch inserts are expected to be all-or-nothing.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Match, MatchDraft, Participant, ParticipantDraft, Team, TeamDraft};
use crate::services::postgres::PostgresError;
use crate::services::supabase::SupabaseError;

/// Errors raised by any store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("PostgreSQL store error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Supabase store error: {0}")]
    Supabase(#[from] SupabaseError),

    #[error("Write rejected: {0}")]
    Conflict(String),

    #[error("Incomplete write: expected {expected} records, stored {stored}")]
    IncompleteWrite { expected: usize, stored: usize },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError>;

    async fn create_participant(&self, draft: ParticipantDraft) -> Result<Participant, StoreError>;
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// List matches, optionally restricted to one round
    async fn list_matches(&self, round: Option<u8>) -> Result<Vec<Match>, StoreError>;

    /// Insert a batch of matches atomically
    async fn insert_matches(&self, drafts: &[MatchDraft]) -> Result<Vec<Match>, StoreError>;

    /// Delete every match. Returns the number of records removed.
    async fn clear_matches(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;

    async fn insert_teams(&self, drafts: &[TeamDraft]) -> Result<Vec<Team>, StoreError>;

    async fn clear_teams(&self) -> Result<u64, StoreError>;

    /// Replace all persisted teams with `drafts`
    ///
    /// Backends with transactions should override this so the swap is atomic.
    async fn replace_teams(&self, drafts: &[TeamDraft]) -> Result<Vec<Team>, StoreError> {
        self.clear_teams().await?;
        self.insert_teams(drafts).await
    }
}

/// Everything the event service needs from persistence
#[async_trait]
pub trait EventStore: ParticipantStore + MatchStore + TeamStore {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }

    /// Delete every match and team. Returns `(matches, teams)` removed.
    ///
    /// The default clears teams first so a failure part way leaves the
    /// round history intact. Backends with transactions should override it.
    async fn reset(&self) -> Result<(u64, u64), StoreError> {
        let teams = self.clear_teams().await?;
        let matches = self.clear_matches().await?;
        Ok((matches, teams))
    }
}
