use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::{exclusion::PairExclusionTracker, scoring::CompatibilityScorer};
use crate::error::EngineError;
use crate::models::{Match, MatchDraft, Participant, ScoringWeights};

/// Number of rounds in a standard event
pub const DEFAULT_MAX_ROUNDS: u8 = 3;

/// Minimum participants required to run a round
pub const MIN_MATCH_PARTICIPANTS: usize = 2;

/// Scored pair eligible for the current round
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub participant1: &'a Participant,
    pub participant2: &'a Participant,
    pub score: f64,
}

/// Result of planning one round
#[derive(Debug, Clone)]
pub struct RoundPlan {
    pub round: u8,
    pub matches: Vec<MatchDraft>,
    pub unmatched: Vec<Participant>,
    pub candidate_count: usize,
}

impl RoundPlan {
    pub fn average_score(&self) -> f64 {
        if self.matches.is_empty() {
            return 0.0;
        }
        self.matches.iter().map(|m| m.score).sum::<f64>() / self.matches.len() as f64
    }
}

/// Current round derived from match history: highest round present, or 0
pub fn current_round(history: &[Match]) -> u8 {
    history.iter().map(|m| m.round).max().unwrap_or(0)
}

/// Greedy round matcher with cross-round exclusion
///
/// # Pipeline Stages
/// 1. Precondition checks (round limit, participant count)
/// 2. Exclusion tracker rebuilt from the full history
/// 3. Candidate enumeration and scoring
/// 4. Sort by score, ties broken by participant ids
/// 5. Greedy commit of disjoint pairs
///
/// The greedy pass does not backtrack, so the total score can fall short of
/// an exact maximum-weight matching.
#[derive(Debug, Clone)]
pub struct RoundMatcher {
    scorer: CompatibilityScorer,
    max_rounds: u8,
}

impl RoundMatcher {
    pub fn new(weights: ScoringWeights, max_rounds: u8) -> Self {
        Self {
            scorer: CompatibilityScorer::new(weights),
            max_rounds,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), DEFAULT_MAX_ROUNDS)
    }

    pub fn max_rounds(&self) -> u8 {
        self.max_rounds
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    /// Plan the matches for the round after the last one in `history`
    ///
    /// # Arguments
    /// * `participants` - All registered participants
    /// * `history` - Every match persisted so far, across all rounds
    ///
    /// # Returns
    /// RoundPlan with the drafts to persist and the participants left out
    pub fn plan_next_round(
        &self,
        participants: &[Participant],
        history: &[Match],
    ) -> Result<RoundPlan, EngineError> {
        let next_round = u16::from(current_round(history)) + 1;
        if next_round > u16::from(self.max_rounds) {
            return Err(EngineError::RoundLimitExceeded {
                attempted: u8::try_from(next_round).unwrap_or(u8::MAX),
                max_rounds: self.max_rounds,
            });
        }
        let next_round = next_round as u8;

        let roster = sorted_roster(participants);
        if roster.len() < MIN_MATCH_PARTICIPANTS {
            return Err(EngineError::InsufficientParticipants {
                required: MIN_MATCH_PARTICIPANTS,
                found: roster.len(),
            });
        }

        let tracker = PairExclusionTracker::from_history(history);
        let candidates = self.ranked_candidates(&roster, &tracker);
        let candidate_count = candidates.len();

        let mut assigned: HashSet<&str> = HashSet::with_capacity(roster.len());
        let mut matches = Vec::with_capacity(roster.len() / 2);

        for candidate in candidates {
            let p1 = candidate.participant1.id.as_str();
            let p2 = candidate.participant2.id.as_str();
            if assigned.contains(p1) || assigned.contains(p2) {
                continue;
            }

            matches.push(MatchDraft {
                round: next_round,
                participant1_id: p1.to_string(),
                participant2_id: p2.to_string(),
                score: candidate.score,
            });
            assigned.insert(p1);
            assigned.insert(p2);
        }

        let unmatched = roster
            .iter()
            .filter(|p| !assigned.contains(p.id.as_str()))
            .map(|p| (*p).clone())
            .collect();

        Ok(RoundPlan {
            round: next_round,
            matches,
            unmatched,
            candidate_count,
        })
    }

    /// Eligible pairs scored and sorted best first
    ///
    /// `roster` must be sorted by id so that every candidate has
    /// `participant1.id < participant2.id`.
    pub fn ranked_candidates<'a>(
        &self,
        roster: &[&'a Participant],
        tracker: &PairExclusionTracker,
    ) -> Vec<Candidate<'a>> {
        let mut candidates = Vec::new();

        for (i, p1) in roster.iter().enumerate() {
            for p2 in &roster[i + 1..] {
                if tracker.is_forbidden(&p1.id, &p2.id) {
                    continue;
                }
                candidates.push(Candidate {
                    participant1: *p1,
                    participant2: *p2,
                    score: self.scorer.score(p1, p2),
                });
            }
        }

        // Sort by score (descending) and then by participant ids (ascending)
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.participant1.id.cmp(&b.participant1.id))
                .then_with(|| a.participant2.id.cmp(&b.participant2.id))
        });

        candidates
    }
}

impl Default for RoundMatcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Participants ordered by id with duplicate ids removed
pub fn sorted_roster(participants: &[Participant]) -> Vec<&Participant> {
    let mut roster: Vec<&Participant> = participants.iter().collect();
    roster.sort_by(|a, b| a.id.cmp(&b.id));

    let before = roster.len();
    roster.dedup_by(|a, b| a.id == b.id);
    if roster.len() != before {
        tracing::warn!("Ignoring {} participant records with duplicate ids", before - roster.len());
    }

    roster
}
