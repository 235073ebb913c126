use serde::{Deserialize, Deserializer, Serialize};

/// Registered event participant
///
/// Serialized in camelCase; the snake_case column names of stored rows are
/// accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs: Vec<String>,
    #[serde(default, alias = "business_type", deserialize_with = "null_as_default")]
    pub business_type: String,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Participant {
    /// Full display name, falling back to the id for anonymous records
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.name, self.surname);
        let full = full.trim();
        if full.is_empty() {
            self.id.clone()
        } else {
            full.to_string()
        }
    }
}

/// Participant fields supplied at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDraft {
    pub name: String,
    pub surname: String,
    pub strengths: Vec<String>,
    pub needs: Vec<String>,
    pub business_type: String,
}

/// Persisted pairing of two participants in one round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub round: u8,
    #[serde(alias = "participant1_id")]
    pub participant1_id: String,
    #[serde(alias = "participant2_id")]
    pub participant2_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Match computed by the round matcher, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDraft {
    pub round: u8,
    pub participant1_id: String,
    pub participant2_id: String,
    pub score: f64,
}

/// Persisted team
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "participant_ids", deserialize_with = "null_as_default")]
    pub participant_ids: Vec<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Team computed by the team assigner, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDraft {
    pub name: String,
    pub participant_ids: Vec<String>,
}

/// Compatibility scoring weights
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub mutual_help: f64,
    pub business_diversity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            mutual_help: 4.0,
            business_diversity: 1.0,
        }
    }
}

/// Team size targets used when partitioning participants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamSizing {
    pub target_size: usize,
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for TeamSizing {
    fn default() -> Self {
        Self {
            target_size: 4,
            min_size: 3,
            max_size: 5,
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
