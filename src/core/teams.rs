use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::EngineError;
use crate::models::{Participant, TeamDraft, TeamSizing};

/// Minimum participants required to form teams
pub const MIN_TEAM_PARTICIPANTS: usize = 3;

/// Weight of the rarity term in the diversity score
const RARITY_WEIGHT: f64 = 10.0;

/// Result of partitioning participants into teams
#[derive(Debug, Clone)]
pub struct TeamPlan {
    pub teams: Vec<TeamDraft>,
    pub team_size: usize,
    /// True when team sizes differ by at most one
    pub balanced: bool,
}

impl TeamPlan {
    /// Smallest and largest team size
    pub fn size_range(&self) -> (usize, usize) {
        size_range(&self.teams)
    }
}

/// Team size and team count for `n` participants
///
/// Returns `(team_size, team_count)`.
pub fn team_dimensions(n: usize, sizing: &TeamSizing) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let target = sizing.target_size.max(1);
    let min_size = sizing.min_size.max(1);
    let max_size = sizing.max_size.max(min_size);

    let approx_teams = n.div_ceil(target);
    let team_size = n.div_ceil(approx_teams).clamp(min_size, max_size);
    (team_size, n.div_ceil(team_size))
}

/// Diversity score for every participant, in input order
///
/// `diversity = |strengths| + |distinct strengths| / |all strengths| * 10`
pub fn diversity_scores(participants: &[&Participant]) -> Vec<f64> {
    let universe: HashSet<&str> = participants
        .iter()
        .flat_map(|p| p.strengths.iter().map(String::as_str))
        .collect();

    participants
        .iter()
        .map(|p| {
            let own: HashSet<&str> = p.strengths.iter().map(String::as_str).collect();
            let rarity = if universe.is_empty() {
                0.0
            } else {
                own.len() as f64 / universe.len() as f64 * RARITY_WEIGHT
            };
            own.len() as f64 + rarity
        })
        .collect()
}

/// Diversity-driven team partitioner
///
/// Participants are dealt round-robin in order of decreasing diversity so
/// that distinctive profiles are spread across teams, then oversized teams
/// hand their last members to undersized ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamAssigner {
    sizing: TeamSizing,
}

impl TeamAssigner {
    pub fn new(sizing: TeamSizing) -> Self {
        Self { sizing }
    }

    pub fn sizing(&self) -> &TeamSizing {
        &self.sizing
    }

    pub fn form_teams(&self, participants: &[Participant]) -> Result<TeamPlan, EngineError> {
        let roster = crate::core::matcher::sorted_roster(participants);
        let n = roster.len();
        if n < MIN_TEAM_PARTICIPANTS {
            return Err(EngineError::InsufficientParticipants {
                required: MIN_TEAM_PARTICIPANTS,
                found: n,
            });
        }

        let (team_size, team_count) = team_dimensions(n, &self.sizing);

        let scores = diversity_scores(&roster);
        let mut order: Vec<usize> = (0..n).collect();
        // Roster is already in id order, so a stable sort keeps ties by id
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

        let mut teams: Vec<TeamDraft> = Vec::with_capacity(team_count);
        for (position, &idx) in order.iter().enumerate() {
            let team_index = position % team_count;
            if team_index >= teams.len() {
                teams.push(TeamDraft {
                    name: format!("Team {}", teams.len() + 1),
                    participant_ids: Vec::with_capacity(team_size),
                });
            }
            teams[team_index].participant_ids.push(roster[idx].id.clone());
        }

        let balanced = rebalance(&mut teams, n);

        Ok(TeamPlan {
            teams,
            team_size,
            balanced,
        })
    }
}

/// Move members out of teams above `ceil(n/k)` into teams below `floor(n/k)`
///
/// Stops when no team is oversized or no team can take a member.
/// Returns whether the final spread is at most one.
pub fn rebalance(teams: &mut [TeamDraft], n: usize) -> bool {
    if teams.is_empty() {
        return true;
    }
    let k = teams.len();
    let max_size = n.div_ceil(k);
    let min_size = n / k;

    for i in 0..k {
        while teams[i].participant_ids.len() > max_size {
            let Some(dest) = teams
                .iter()
                .position(|team| team.participant_ids.len() < min_size)
            else {
                tracing::debug!("No undersized team can take members from {}", teams[i].name);
                break;
            };
            if let Some(moved) = teams[i].participant_ids.pop() {
                teams[dest].participant_ids.push(moved);
            }
        }
    }

    let (smallest, largest) = size_range(teams);
    largest - smallest <= 1
}

fn size_range(teams: &[TeamDraft]) -> (usize, usize) {
    let sizes = teams.iter().map(|t| t.participant_ids.len());
    let smallest = sizes.clone().min().unwrap_or(0);
    let largest = sizes.max().unwrap_or(0);
    (smallest, largest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, strengths: &[&str]) -> Participant {
        Participant {
            id: id.to_string(),
            name: id.to_string(),
            surname: String::new(),
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            needs: vec![],
            business_type: "x".to_string(),
            created_at: None,
        }
    }

    fn draft(name: &str, size: usize) -> TeamDraft {
        TeamDraft {
            name: name.to_string(),
            participant_ids: (0..size).map(|i| format!("{}-{}", name, i)).collect(),
        }
    }

    #[test]
    fn test_team_dimensions() {
        let sizing = TeamSizing::default();
        assert_eq!(team_dimensions(3, &sizing), (3, 1));
        assert_eq!(team_dimensions(4, &sizing), (4, 1));
        assert_eq!(team_dimensions(5, &sizing), (3, 2));
        assert_eq!(team_dimensions(10, &sizing), (4, 3));
        assert_eq!(team_dimensions(17, &sizing), (4, 5));
    }

    #[test]
    fn test_diversity_scores() {
        let a = participant("a", &["x", "y"]);
        let b = participant("b", &["y", "z", "w", "v"]);
        let c = participant("c", &[]);
        let scores = diversity_scores(&[&a, &b, &c]);

        // universe = {x, y, z, w, v}
        assert!((scores[0] - (2.0 + 2.0 / 5.0 * 10.0)).abs() < 1e-9);
        assert!((scores[1] - (4.0 + 4.0 / 5.0 * 10.0)).abs() < 1e-9);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_diversity_empty_universe() {
        let a = participant("a", &[]);
        assert_eq!(diversity_scores(&[&a]), vec![0.0]);
    }

    #[test]
    fn test_round_robin_spreads_high_diversity() {
        let participants = vec![
            participant("p1", &["a", "b", "c"]),
            participant("p2", &["d", "e", "f"]),
            participant("p3", &[]),
            participant("p4", &[]),
            participant("p5", &["g"]),
            participant("p6", &["h"]),
        ];

        let plan = TeamAssigner::default().form_teams(&participants).unwrap();

        assert_eq!(plan.teams.len(), 2);
        assert_eq!(plan.teams[0].name, "Team 1");
        assert_eq!(plan.teams[0].participant_ids, vec!["p1", "p5", "p3"]);
        assert_eq!(plan.teams[1].participant_ids, vec!["p2", "p6", "p4"]);
        assert!(plan.balanced);
    }

    #[test]
    fn test_insufficient_participants() {
        let participants = vec![participant("a", &[]), participant("b", &[])];
        let err = TeamAssigner::default().form_teams(&participants).unwrap_err();

        assert!(matches!(err, EngineError::InsufficientParticipants { required: 3, found: 2 }));
    }

    #[test]
    fn test_rebalance_moves_from_end() {
        let mut teams = vec![draft("t1", 5), draft("t2", 1), draft("t3", 3)];
        assert!(rebalance(&mut teams, 9));

        assert_eq!(teams[0].participant_ids.len(), 3);
        assert_eq!(teams[1].participant_ids, vec!["t2-0", "t1-4", "t1-3"]);
    }

    #[test]
    fn test_rebalance_reports_non_convergence() {
        // 8 over 3 teams: max 3, min 2. The 4-member team has nowhere to go
        // because no team is below the minimum.
        let mut teams = vec![draft("t1", 4), draft("t2", 2), draft("t3", 2)];
        let balanced = rebalance(&mut teams, 8);

        assert!(!balanced);
        assert_eq!(teams[0].participant_ids.len(), 4);
        assert_eq!(teams.iter().map(|t| t.participant_ids.len()).sum::<usize>(), 8);
    }

    #[test]
    fn test_rebalance_fills_empty_team() {
        let mut teams = vec![draft("t1", 5), draft("t2", 2), draft("t3", 0)];
        assert!(rebalance(&mut teams, 7));

        let sizes: Vec<usize> = teams.iter().map(|t| t.participant_ids.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
    }
}
