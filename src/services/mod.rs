// Service exports
pub mod cache;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod supabase;

pub use cache::{CacheManager, CacheKey, CacheError};
pub use event::{EventService, RoundOutcome, TeamsOutcome};
pub use memory::InMemoryStore;
pub use postgres::{PostgresClient, PostgresError};
pub use store::{EventStore, MatchStore, ParticipantStore, StoreError, TeamStore};
pub use supabase::{SupabaseClient, SupabaseError, SupabaseTables};
