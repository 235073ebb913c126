// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Participant, ParticipantDraft, Match, MatchDraft, Team, TeamDraft, ScoringWeights, TeamSizing};
pub use requests::{RegisterParticipantRequest, ListMatchesQuery};
pub use responses::{AdvanceRoundResponse, FormTeamsResponse, RoundStatusResponse, HealthResponse, ErrorResponse};
