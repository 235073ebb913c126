use std::collections::HashSet;

use crate::models::{Participant, ScoringWeights};

/// Calculate the compatibility score between two participants
///
/// Scoring formula:
/// score = (
///     mutual_help * 4 +            # my needs met by their strengths, and vice versa
///     business_diversity * 1       # different business types
/// )
///
/// The score is symmetric and never negative.
pub fn calculate_compatibility_score(
    p1: &Participant,
    p2: &Participant,
    weights: &ScoringWeights,
) -> f64 {
    let mutual_help = mutual_help(p1, p2) as f64;
    let diversity = if p1.business_type != p2.business_type { 1.0 } else { 0.0 };

    (mutual_help * weights.mutual_help + diversity * weights.business_diversity).max(0.0)
}

/// Number of needs on either side covered by the other's strengths
pub fn mutual_help(p1: &Participant, p2: &Participant) -> usize {
    covered_needs(p1, p2) + covered_needs(p2, p1)
}

/// Distinct needs of `seeker` present among the strengths of `helper`
#[inline]
fn covered_needs(seeker: &Participant, helper: &Participant) -> usize {
    let strengths: HashSet<&str> = helper.strengths.iter().map(String::as_str).collect();
    seeker
        .needs
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|need| strengths.contains(need))
        .count()
}

/// Scores participant pairs with a fixed set of weights
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityScorer {
    weights: ScoringWeights,
}

impl CompatibilityScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, p1: &Participant, p2: &Participant) -> f64 {
        calculate_compatibility_score(p1, p2, &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, needs: &[&str], strengths: &[&str], business: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: id.to_string(),
            surname: String::new(),
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            needs: needs.iter().map(|s| s.to_string()).collect(),
            business_type: business.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_mutual_help_both_directions() {
        let a = participant("a", &["x"], &["y", "z"], "Math");
        let b = participant("b", &["y"], &["x"], "Bio");

        assert_eq!(mutual_help(&a, &b), 2);
        assert_eq!(calculate_compatibility_score(&a, &b, &ScoringWeights::default()), 9.0);
    }

    #[test]
    fn test_duplicate_labels_counted_once() {
        let a = participant("a", &["x", "x"], &[], "Math");
        let b = participant("b", &[], &["x", "x"], "Math");

        assert_eq!(mutual_help(&a, &b), 1);
    }

    #[test]
    fn test_empty_profiles_score_zero() {
        let a = participant("a", &[], &[], "Math");
        let b = participant("b", &[], &[], "Math");

        assert_eq!(calculate_compatibility_score(&a, &b, &ScoringWeights::default()), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let scorer = CompatibilityScorer::new(ScoringWeights {
            mutual_help: 10.0,
            business_diversity: 3.0,
        });
        let a = participant("a", &["x"], &[], "Math");
        let b = participant("b", &[], &["x"], "Bio");

        assert_eq!(scorer.score(&a, &b), 13.0);
    }

    #[test]
    fn test_negative_weights_clamped() {
        let scorer = CompatibilityScorer::new(ScoringWeights {
            mutual_help: -1.0,
            business_diversity: 0.0,
        });
        let a = participant("a", &["x"], &[], "Math");
        let b = participant("b", &[], &["x"], "Bio");

        assert_eq!(scorer.score(&a, &b), 0.0);
    }
}
