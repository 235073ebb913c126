use serde::{Deserialize, Serialize};
use crate::models::domain::{Match, Participant, Team};

/// Response for the advance round endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRoundResponse {
    pub round: u8,
    pub matches: Vec<Match>,
    pub unmatched: Vec<Participant>,
    #[serde(rename = "candidateCount")]
    pub candidate_count: usize,
    #[serde(rename = "averageScore")]
    pub average_score: f64,
}

/// Response for the form teams endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTeamsResponse {
    pub teams: Vec<Team>,
    #[serde(rename = "teamSize")]
    pub team_size: usize,
    pub balanced: bool,
}

/// Current event progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStatusResponse {
    #[serde(rename = "currentRound")]
    pub current_round: u8,
    #[serde(rename = "maxRounds")]
    pub max_rounds: u8,
    #[serde(rename = "teamsReady")]
    pub teams_ready: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}
