// Core algorithm exports
pub mod exclusion;
pub mod matcher;
pub mod scoring;
pub mod teams;

pub use exclusion::PairExclusionTracker;
pub use matcher::{current_round, RoundMatcher, RoundPlan, Candidate};
pub use scoring::{calculate_compatibility_score, CompatibilityScorer};
pub use teams::{TeamAssigner, TeamPlan};
