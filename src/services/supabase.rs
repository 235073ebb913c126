use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Match, MatchDraft, Participant, ParticipantDraft, Team, TeamDraft};
use crate::services::store::{EventStore, MatchStore, ParticipantStore, StoreError, TeamStore};

/// Filter matching every row; PostgREST refuses unfiltered deletes
const MATCH_ALL_FILTER: &str = "neq.00000000-0000-0000-0000-000000000000";

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Table names in the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub participants: String,
    pub matches: String,
    pub teams: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            participants: "participants".to_string(),
            matches: "matches".to_string(),
            teams: "teams".to_string(),
        }
    }
}

/// Supabase REST (PostgREST) client
///
/// Bulk inserts are sent as a single JSON array, which PostgREST executes
/// in one transaction.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response, action: &str) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Supabase request to {} failed: {} - {}", action, status, body);
        Err(SupabaseError::ApiError(format!("Failed to {}: {}", action, status)))
    }

    async fn parse<T: DeserializeOwned>(response: Response, action: &str) -> Result<T, SupabaseError> {
        response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse {}: {}", action, e)))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, SupabaseError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(filters);

        tracing::debug!("Selecting rows from {}", table);

        let response = self.authorized(request).send().await?;
        let response = Self::check(response, &format!("list {}", table)).await?;
        Self::parse(response, table).await
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<Vec<T>, SupabaseError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);

        let response = self.authorized(request).send().await?;
        let response = Self::check(response, &format!("insert into {}", table)).await?;
        Self::parse(response, table).await
    }

    async fn delete_all(&self, table: &str) -> Result<u64, SupabaseError> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", MATCH_ALL_FILTER)])
            .header("Prefer", "return=representation");

        let response = self.authorized(request).send().await?;
        let response = Self::check(response, &format!("clear {}", table)).await?;
        let removed: Vec<serde_json::Value> = Self::parse(response, table).await?;

        tracing::info!("Cleared {} rows from {}", removed.len(), table);

        Ok(removed.len() as u64)
    }
}

#[async_trait]
impl ParticipantStore for SupabaseClient {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.select(&self.tables.participants, &[]).await?)
    }

    async fn create_participant(&self, draft: ParticipantDraft) -> Result<Participant, StoreError> {
        let mut created: Vec<Participant> = self.insert(&self.tables.participants, &draft).await?;
        created.pop().ok_or_else(|| {
            SupabaseError::InvalidResponse("Insert returned no participant".to_string()).into()
        })
    }
}

#[async_trait]
impl MatchStore for SupabaseClient {
    async fn list_matches(&self, round: Option<u8>) -> Result<Vec<Match>, StoreError> {
        let mut filters = vec![("order", "round.asc".to_string())];
        if let Some(round) = round {
            filters.push(("round", format!("eq.{}", round)));
        }
        Ok(self.select(&self.tables.matches, &filters).await?)
    }

    async fn insert_matches(&self, drafts: &[MatchDraft]) -> Result<Vec<Match>, StoreError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.insert(&self.tables.matches, drafts).await?)
    }

    async fn clear_matches(&self) -> Result<u64, StoreError> {
        Ok(self.delete_all(&self.tables.matches).await?)
    }
}

#[async_trait]
impl TeamStore for SupabaseClient {
    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let filters = [("order", "created_at.asc".to_string())];
        Ok(self.select(&self.tables.teams, &filters).await?)
    }

    async fn insert_teams(&self, drafts: &[TeamDraft]) -> Result<Vec<Team>, StoreError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.insert(&self.tables.teams, drafts).await?)
    }

    async fn clear_teams(&self) -> Result<u64, StoreError> {
        Ok(self.delete_all(&self.tables.teams).await?)
    }
}

#[async_trait]
impl EventStore for SupabaseClient {
    fn backend(&self) -> &'static str {
        "supabase"
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let request = self
            .client
            .get(self.table_url(&self.tables.participants))
            .query(&[("select", "id"), ("limit", "1")]);
        let response = self.authorized(request).send().await.map_err(SupabaseError::from)?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(url: String) -> SupabaseClient {
        SupabaseClient::new(url, "test_key".to_string(), SupabaseTables::default(), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_participants() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/participants")
            .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
            .match_header("apikey", "test_key")
            .match_header("authorization", "Bearer test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":"p1","name":"Ana","surname":"Ruiz","strengths":["ventas"],"needs":null,"business_type":"Retail","phone":"555"}]"#,
            )
            .create_async()
            .await;

        let participants = client(server.url()).list_participants().await.unwrap();

        mock.assert_async().await;
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].strengths, vec!["ventas"]);
        assert!(participants[0].needs.is_empty());
    }

    #[tokio::test]
    async fn test_list_matches_filters_round() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/matches")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("round".into(), "eq.2".into()),
                Matcher::UrlEncoded("order".into(), "round.asc".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"id":"m1","round":2,"participant1_id":"a","participant2_id":"b","score":5}]"#)
            .create_async()
            .await;

        let matches = client(server.url()).list_matches(Some(2)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(matches[0].round, 2);
        assert_eq!(matches[0].score, 5.0);
    }

    #[tokio::test]
    async fn test_insert_matches_sends_one_batch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/matches")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(serde_json::json!([
                {"round": 1, "participant1_id": "a", "participant2_id": "b", "score": 9.0}
            ])))
            .with_status(201)
            .with_body(r#"[{"id":"m1","round":1,"participant1_id":"a","participant2_id":"b","score":9}]"#)
            .expect(1)
            .create_async()
            .await;

        let drafts = vec![MatchDraft {
            round: 1,
            participant1_id: "a".to_string(),
            participant2_id: "b".to_string(),
            score: 9.0,
        }];
        let created = client(server.url()).insert_matches(&drafts).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, "m1");
    }

    #[tokio::test]
    async fn test_list_teams_in_creation_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/teams")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "created_at.asc".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id":"t1","name":"Team 1","participant_ids":["a","b","c"]},{"id":"t2","name":"Team 2","participant_ids":null}]"#,
            )
            .create_async()
            .await;

        let teams = client(server.url()).list_teams().await.unwrap();

        mock.assert_async().await;
        assert_eq!(teams[0].name, "Team 1");
        assert_eq!(teams[0].participant_ids.len(), 3);
        assert!(teams[1].participant_ids.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/teams")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let result = client(server.url()).list_teams().await;

        assert!(matches!(result, Err(StoreError::Supabase(SupabaseError::Unauthorized))));
    }

    #[tokio::test]
    async fn test_conflict_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/teams")
            .with_status(409)
            .with_body(r#"{"message":"duplicate key"}"#)
            .create_async()
            .await;

        let drafts = vec![TeamDraft {
            name: "Team 1".to_string(),
            participant_ids: vec!["a".to_string()],
        }];
        let result = client(server.url()).insert_teams(&drafts).await;

        assert!(matches!(result, Err(StoreError::Supabase(SupabaseError::ApiError(_)))));
    }

    #[tokio::test]
    async fn test_clear_matches_counts_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/rest/v1/matches")
            .match_query(Matcher::UrlEncoded("id".into(), MATCH_ALL_FILTER.into()))
            .with_status(200)
            .with_body(r#"[{"id":"m1"},{"id":"m2"}]"#)
            .create_async()
            .await;

        assert_eq!(client(server.url()).clear_matches().await.unwrap(), 2);
    }
}
