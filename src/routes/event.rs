use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    AdvanceRoundResponse, FormTeamsResponse, HealthResponse, ListMatchesQuery, RoundStatusResponse,
};
use crate::routes::{engine_error_response, validation_error_response, AppState};

/// Configure event administration routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/event/round", web::get().to(round_status))
        .route("/event/rounds/advance", web::post().to(advance_round))
        .route("/event/matches", web::get().to(list_matches))
        .route("/event/teams", web::post().to(form_teams))
        .route("/event/teams", web::get().to(list_teams))
        .route("/event/reset", web::post().to(reset_event));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.event.health_check().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/event/round
async fn round_status(state: web::Data<AppState>) -> impl Responder {
    match state.event.current_round().await {
        Ok(current_round) => {
            let max_rounds = state.event.max_rounds();
            HttpResponse::Ok().json(RoundStatusResponse {
                current_round,
                max_rounds,
                teams_ready: current_round >= max_rounds,
            })
        }
        Err(e) => engine_error_response(&e),
    }
}

/// Generate the next round of matches
///
/// POST /api/v1/event/rounds/advance
///
/// Participants left without a partner are listed under `unmatched`.
async fn advance_round(state: web::Data<AppState>) -> impl Responder {
    match state.event.advance_round().await {
        Ok(outcome) => HttpResponse::Created().json(AdvanceRoundResponse {
            round: outcome.round,
            matches: outcome.matches,
            unmatched: outcome.unmatched,
            candidate_count: outcome.candidate_count,
            average_score: outcome.average_score,
        }),
        Err(e) => {
            tracing::info!("Advance round refused: {}", e);
            engine_error_response(&e)
        }
    }
}

/// GET /api/v1/event/matches?round={round}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<ListMatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error_response(&errors);
    }

    match state.event.list_matches(query.round).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => engine_error_response(&e),
    }
}

/// Partition participants into teams
///
/// POST /api/v1/event/teams
async fn form_teams(state: web::Data<AppState>) -> impl Responder {
    match state.event.form_teams().await {
        Ok(outcome) => HttpResponse::Created().json(FormTeamsResponse {
            teams: outcome.teams,
            team_size: outcome.team_size,
            balanced: outcome.balanced,
        }),
        Err(e) => {
            tracing::info!("Team formation refused: {}", e);
            engine_error_response(&e)
        }
    }
}

async fn list_teams(state: web::Data<AppState>) -> impl Responder {
    match state.event.list_teams().await {
        Ok(teams) => HttpResponse::Ok().json(teams),
        Err(e) => engine_error_response(&e),
    }
}

/// POST /api/v1/event/reset
async fn reset_event(state: web::Data<AppState>) -> impl Responder {
    match state.event.reset().await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => engine_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    use crate::core::{RoundMatcher, TeamAssigner};
    use crate::models::{Participant, TeamSizing};
    use crate::services::{EventService, InMemoryStore};

    fn participant(id: &str, strengths: &[&str], needs: &[&str], business: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: id.to_uppercase(),
            surname: "Test".to_string(),
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            needs: needs.iter().map(|s| s.to_string()).collect(),
            business_type: business.to_string(),
            created_at: None,
        }
    }

    fn state(participants: Vec<Participant>) -> AppState {
        let store = Arc::new(InMemoryStore::with_participants(participants));
        let event = EventService::new(
            store,
            RoundMatcher::with_default_weights(),
            TeamAssigner::new(TeamSizing::default()),
        );
        AppState { event: Arc::new(event) }
    }

    fn four_participants() -> Vec<Participant> {
        vec![
            participant("a", &["x"], &["y"], "T1"),
            participant("b", &["y"], &["x"], "T2"),
            participant("c", &["w"], &["v"], "T1"),
            participant("d", &["z"], &["u"], "T2"),
        ]
    }

    #[actix_web::test]
    async fn test_advance_round_returns_matches() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(four_participants())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/event/rounds/advance").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["round"], 1);
        assert_eq!(body["matches"].as_array().unwrap().len(), 2);
        assert_eq!(body["unmatched"].as_array().unwrap().len(), 0);

        let req = test::TestRequest::get().uri("/event/round").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["currentRound"], 1);
        assert_eq!(body["teamsReady"], false);
    }

    #[actix_web::test]
    async fn test_advance_with_one_participant_is_unprocessable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(vec![participant("a", &[], &[], "T1")])))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/event/rounds/advance").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "insufficient_participants");
        assert_eq!(body["statusCode"], 422);
    }

    #[actix_web::test]
    async fn test_form_teams_before_final_round_conflicts() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(four_participants())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/event/teams").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_round_zero_query_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(four_participants())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/event/matches?round=0").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_reset_returns_no_content() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(four_participants())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/event/rounds/advance").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post().uri("/event/reset").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/event/matches").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().is_empty());
    }
}
