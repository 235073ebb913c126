use std::collections::{HashMap, HashSet};

use crate::models::Match;

/// Unordered participant pairs already matched in some round
///
/// Both orderings are recorded so lookups need no canonicalisation.
#[derive(Debug, Clone, Default)]
pub struct PairExclusionTracker {
    partners: HashMap<String, HashSet<String>>,
    pairs: usize,
}

impl PairExclusionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tracker from the full match history
    pub fn from_history(matches: &[Match]) -> Self {
        let mut tracker = Self::new();
        for m in matches {
            tracker.record(&m.participant1_id, &m.participant2_id);
        }
        tracker
    }

    /// Mark a pair as matched. Returns false if it was already known.
    pub fn record(&mut self, a: &str, b: &str) -> bool {
        let inserted = self
            .partners
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.partners
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());

        if inserted {
            self.pairs += 1;
        }
        inserted
    }

    /// Whether `a` and `b` may not be paired. A participant is always forbidden with itself.
    pub fn is_forbidden(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .partners
                .get(a)
                .map_or(false, |partners| partners.contains(b))
    }

    /// Number of distinct forbidden pairs
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(round: u8, a: &str, b: &str) -> Match {
        Match {
            id: format!("{}-{}-{}", round, a, b),
            round,
            participant1_id: a.to_string(),
            participant2_id: b.to_string(),
            score: 0.0,
            created_at: None,
        }
    }

    #[test]
    fn test_pairs_are_unordered() {
        let tracker = PairExclusionTracker::from_history(&[m(1, "a", "b")]);

        assert!(tracker.is_forbidden("a", "b"));
        assert!(tracker.is_forbidden("b", "a"));
        assert!(!tracker.is_forbidden("a", "c"));
    }

    #[test]
    fn test_self_pair_forbidden() {
        let tracker = PairExclusionTracker::new();
        assert!(tracker.is_forbidden("a", "a"));
    }

    #[test]
    fn test_reversed_duplicate_counted_once() {
        let tracker = PairExclusionTracker::from_history(&[m(1, "a", "b"), m(2, "b", "a"), m(2, "c", "d")]);

        assert_eq!(tracker.len(), 2);
        assert!(!tracker.is_empty());
    }
}
