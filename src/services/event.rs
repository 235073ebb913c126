use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::core::{current_round, RoundMatcher, TeamAssigner};
use crate::error::EngineError;
use crate::models::{Match, Participant, ParticipantDraft, Team};
use crate::services::cache::{CacheError, CacheKey, CacheManager};
use crate::services::store::{EventStore, StoreError};

/// Outcome of a successful round advance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u8,
    pub matches: Vec<Match>,
    pub unmatched: Vec<Participant>,
    pub candidate_count: usize,
    pub average_score: f64,
}

/// Outcome of a successful team formation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsOutcome {
    pub teams: Vec<Team>,
    pub team_size: usize,
    pub balanced: bool,
}

/// Runs event operations against a store
///
/// Each mutating operation reads a fresh snapshot, computes its result with
/// the core algorithms and writes it back in one batch. Mutating operations
/// are serialized by an in-flight guard: a second caller fails immediately
/// with `OperationInProgress` instead of racing on the same round.
pub struct EventService {
    store: Arc<dyn EventStore>,
    cache: Option<Arc<CacheManager>>,
    matcher: RoundMatcher,
    assigner: TeamAssigner,
    require_final_round: bool,
    in_flight: Mutex<()>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, matcher: RoundMatcher, assigner: TeamAssigner) -> Self {
        Self {
            store,
            cache: None,
            matcher,
            assigner,
            require_final_round: true,
            in_flight: Mutex::new(()),
        }
    }

    /// Serve listings through `cache`
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Whether team formation waits for the final round
    pub fn with_final_round_gate(mut self, required: bool) -> Self {
        self.require_final_round = required;
        self
    }

    pub fn max_rounds(&self) -> u8 {
        self.matcher.max_rounds()
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    fn begin(&self) -> Result<MutexGuard<'_, ()>, EngineError> {
        self.in_flight
            .try_lock()
            .map_err(|_| EngineError::OperationInProgress)
    }

    /// Current round, derived from the stored matches
    pub async fn current_round(&self) -> Result<u8, EngineError> {
        let history = self.store.list_matches(None).await?;
        Ok(current_round(&history))
    }

    /// Pair participants for the next round and persist the matches
    pub async fn advance_round(&self) -> Result<RoundOutcome, EngineError> {
        let _guard = self.begin()?;

        let participants = self.store.list_participants().await?;
        let history = self.store.list_matches(None).await?;

        let plan = self.matcher.plan_next_round(&participants, &history)?;

        if plan.matches.is_empty() {
            tracing::warn!("Round {} has no eligible pairs left", plan.round);
            return Err(EngineError::NoEligiblePairs { round: plan.round });
        }

        for participant in &plan.unmatched {
            tracing::warn!(
                "{} has no partner in round {}",
                participant.display_name(),
                plan.round
            );
        }

        let created = match self.store.insert_matches(&plan.matches).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!("Failed to persist round {} matches: {}", plan.round, e);
                return Err(e.into());
            }
        };

        if created.len() != plan.matches.len() {
            tracing::error!(
                "Round {} stored {} of {} matches",
                plan.round,
                created.len(),
                plan.matches.len()
            );
            return Err(StoreError::IncompleteWrite {
                expected: plan.matches.len(),
                stored: created.len(),
            }
            .into());
        }

        self.invalidate_matches().await;

        let average_score = plan.average_score();
        tracing::info!(
            "Round {} generated: {} matches from {} candidates, average score {:.1}",
            plan.round,
            created.len(),
            plan.candidate_count,
            average_score
        );

        Ok(RoundOutcome {
            round: plan.round,
            matches: created,
            unmatched: plan.unmatched,
            candidate_count: plan.candidate_count,
            average_score,
        })
    }

    /// Partition all participants into teams, replacing any existing teams
    pub async fn form_teams(&self) -> Result<TeamsOutcome, EngineError> {
        let _guard = self.begin()?;

        if self.require_final_round {
            let current = self.current_round().await?;
            if current < self.max_rounds() {
                return Err(EngineError::TeamsNotReady {
                    current_round: current,
                    max_rounds: self.max_rounds(),
                });
            }
        }

        let participants = self.store.list_participants().await?;
        let plan = self.assigner.form_teams(&participants)?;

        if !plan.balanced {
            let (smallest, largest) = plan.size_range();
            tracing::warn!(
                "Teams could not be fully balanced: sizes range from {} to {}",
                smallest,
                largest
            );
        }

        let teams = match self.store.replace_teams(&plan.teams).await {
            Ok(teams) => teams,
            Err(e) => {
                tracing::error!("Failed to persist teams: {}", e);
                return Err(e.into());
            }
        };

        if teams.len() != plan.teams.len() {
            return Err(StoreError::IncompleteWrite {
                expected: plan.teams.len(),
                stored: teams.len(),
            }
            .into());
        }

        self.invalidate(&CacheKey::teams()).await;

        tracing::info!(
            "Formed {} teams of about {} from {} participants",
            teams.len(),
            plan.team_size,
            participants.len()
        );

        Ok(TeamsOutcome {
            teams,
            team_size: plan.team_size,
            balanced: plan.balanced,
        })
    }

    /// Delete every match and team, returning the event to round 0
    ///
    /// Cached listings are dropped even when the store fails, since a
    /// partial delete may already have happened.
    pub async fn reset(&self) -> Result<(), EngineError> {
        let _guard = self.begin()?;

        let result = self.store.reset().await;

        self.invalidate_matches().await;
        self.invalidate(&CacheKey::teams()).await;

        let (matches, teams) = result.map_err(|e| {
            tracing::error!("Event reset failed: {}", e);
            e
        })?;

        tracing::info!("Event reset: removed {} matches and {} teams", matches, teams);
        Ok(())
    }

    pub async fn list_matches(&self, round: Option<u8>) -> Result<Vec<Match>, EngineError> {
        let store = Arc::clone(&self.store);
        self.cached(CacheKey::matches(round), || async move {
            store.list_matches(round).await
        })
        .await
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, EngineError> {
        let store = Arc::clone(&self.store);
        self.cached(CacheKey::teams(), || async move { store.list_teams().await })
            .await
    }

    pub async fn list_participants(&self) -> Result<Vec<Participant>, EngineError> {
        let store = Arc::clone(&self.store);
        self.cached(CacheKey::participants(), || async move {
            store.list_participants().await
        })
        .await
    }

    pub async fn register_participant(&self, draft: ParticipantDraft) -> Result<Participant, EngineError> {
        let participant = self.store.create_participant(draft).await?;
        self.invalidate(&CacheKey::participants()).await;

        tracing::info!("Registered participant {}", participant.id);
        Ok(participant)
    }

    pub async fn health_check(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Store health check failed: {}", e);
                false
            }
        }
    }

    /// Read through the cache; cache failures fall back to the store
    async fn cached<T, F, Fut>(&self, key: String, fetch: F) -> Result<T, EngineError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let Some(cache) = &self.cache else {
            return Ok(fetch().await?);
        };

        match cache.get::<T>(&key).await {
            Ok(value) => return Ok(value),
            Err(CacheError::CacheMiss(_)) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let value = fetch().await?;
        if let Err(e) = cache.set(&key, &value).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
        Ok(value)
    }

    async fn invalidate(&self, key: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(key).await {
                tracing::warn!("Failed to invalidate cache: {}", e);
            }
        }
    }

    async fn invalidate_matches(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_pattern(CacheKey::MATCHES_PATTERN).await {
                tracing::warn!("Failed to invalidate cache: {}", e);
            }
        }
    }
}
