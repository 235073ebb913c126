use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::ParticipantDraft;

/// Request to register a participant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterParticipantRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub surname: String,
    #[serde(default)]
    #[validate(length(max = 5))]
    pub strengths: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 5))]
    pub needs: Vec<String>,
    #[validate(length(min = 1))]
    #[serde(rename = "businessType", alias = "business_type")]
    pub business_type: String,
}

impl From<RegisterParticipantRequest> for ParticipantDraft {
    fn from(req: RegisterParticipantRequest) -> Self {
        ParticipantDraft {
            name: req.name,
            surname: req.surname,
            strengths: req.strengths,
            needs: req.needs,
            business_type: req.business_type,
        }
    }
}

/// Query for listing matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListMatchesQuery {
    #[validate(range(min = 1))]
    pub round: Option<u8>,
}
