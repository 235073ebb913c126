use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::PairExclusionTracker;
use crate::models::{Match, MatchDraft, Participant, ParticipantDraft, Team, TeamDraft};
use crate::services::store::{EventStore, MatchStore, ParticipantStore, StoreError, TeamStore};

/// In-memory event storage for tests and local runs.
///
/// Match batches are validated in full before any record is applied, so a
/// rejected batch leaves the store untouched.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    participants: Vec<Participant>,
    matches: Vec<Match>,
    teams: Vec<Team>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Store pre-populated with `participants`
    pub fn with_participants(participants: Vec<Participant>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                participants,
                ..Inner::default()
            }),
        }
    }

    fn check_batch(existing: &[Match], drafts: &[MatchDraft]) -> Result<(), StoreError> {
        let mut tracker = PairExclusionTracker::from_history(existing);
        let mut busy: HashSet<(u8, &str)> = existing
            .iter()
            .flat_map(|m| [(m.round, m.participant1_id.as_str()), (m.round, m.participant2_id.as_str())])
            .collect();

        for draft in drafts {
            let a = draft.participant1_id.as_str();
            let b = draft.participant2_id.as_str();
            if a == b {
                return Err(StoreError::Conflict(format!("participant {} paired with itself", a)));
            }
            if tracker.is_forbidden(a, b) {
                return Err(StoreError::Conflict(format!("pair {}/{} already matched", a, b)));
            }
            if !busy.insert((draft.round, a)) || !busy.insert((draft.round, b)) {
                return Err(StoreError::Conflict(format!(
                    "participant matched twice in round {}",
                    draft.round
                )));
            }
            tracker.record(a, b);
        }

        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParticipantStore for InMemoryStore {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.inner.lock().participants.clone())
    }

    async fn create_participant(&self, draft: ParticipantDraft) -> Result<Participant, StoreError> {
        let participant = Participant {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            surname: draft.surname,
            strengths: draft.strengths,
            needs: draft.needs,
            business_type: draft.business_type,
            created_at: Some(chrono::Utc::now()),
        };
        self.inner.lock().participants.push(participant.clone());
        Ok(participant)
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn list_matches(&self, round: Option<u8>) -> Result<Vec<Match>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .matches
            .iter()
            .filter(|m| round.map_or(true, |r| m.round == r))
            .cloned()
            .collect())
    }

    async fn insert_matches(&self, drafts: &[MatchDraft]) -> Result<Vec<Match>, StoreError> {
        let mut inner = self.inner.lock();
        Self::check_batch(&inner.matches, drafts)?;

        let now = chrono::Utc::now();
        let created: Vec<Match> = drafts
            .iter()
            .map(|d| Match {
                id: uuid::Uuid::new_v4().to_string(),
                round: d.round,
                participant1_id: d.participant1_id.clone(),
                participant2_id: d.participant2_id.clone(),
                score: d.score,
                created_at: Some(now),
            })
            .collect();
        inner.matches.extend(created.iter().cloned());

        Ok(created)
    }

    async fn clear_matches(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let removed = inner.matches.len() as u64;
        inner.matches.clear();
        Ok(removed)
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(self.inner.lock().teams.clone())
    }

    async fn insert_teams(&self, drafts: &[TeamDraft]) -> Result<Vec<Team>, StoreError> {
        let created = materialize_teams(drafts);
        self.inner.lock().teams.extend(created.iter().cloned());
        Ok(created)
    }

    async fn clear_teams(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let removed = inner.teams.len() as u64;
        inner.teams.clear();
        Ok(removed)
    }

    async fn replace_teams(&self, drafts: &[TeamDraft]) -> Result<Vec<Team>, StoreError> {
        let created = materialize_teams(drafts);
        self.inner.lock().teams = created.clone();
        Ok(created)
    }
}

fn materialize_teams(drafts: &[TeamDraft]) -> Vec<Team> {
    let now = chrono::Utc::now();
    drafts
        .iter()
        .map(|d| Team {
            id: uuid::Uuid::new_v4().to_string(),
            name: d.name.clone(),
            participant_ids: d.participant_ids.clone(),
            created_at: Some(now),
        })
        .collect()
}

#[async_trait]
impl EventStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn reset(&self) -> Result<(u64, u64), StoreError> {
        let mut inner = self.inner.lock();
        let removed = (inner.matches.len() as u64, inner.teams.len() as u64);
        inner.matches.clear();
        inner.teams.clear();
        Ok(removed)
    }
}
