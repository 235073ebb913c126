use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::RegisterParticipantRequest;
use crate::routes::{engine_error_response, validation_error_response, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/participants", web::get().to(list_participants))
        .route("/participants", web::post().to(register_participant));
}

async fn list_participants(state: web::Data<AppState>) -> impl Responder {
    match state.event.list_participants().await {
        Ok(participants) => HttpResponse::Ok().json(participants),
        Err(e) => engine_error_response(&e),
    }
}

/// Register a participant
///
/// POST /api/v1/participants
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "surname": "string",
///   "strengths": ["string"],
///   "needs": ["string"],
///   "businessType": "string"
/// }
/// ```
async fn register_participant(
    state: web::Data<AppState>,
    req: web::Json<RegisterParticipantRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for participant registration: {:?}", errors);
        return validation_error_response(&errors);
    }

    match state.event.register_participant(req.into_inner().into()).await {
        Ok(participant) => HttpResponse::Created().json(participant),
        Err(e) => engine_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    use crate::core::{RoundMatcher, TeamAssigner};
    use crate::models::TeamSizing;
    use crate::services::{EventService, InMemoryStore};

    fn state() -> AppState {
        let event = EventService::new(
            Arc::new(InMemoryStore::new()),
            RoundMatcher::with_default_weights(),
            TeamAssigner::new(TeamSizing::default()),
        );
        AppState { event: Arc::new(event) }
    }

    #[actix_web::test]
    async fn test_register_then_list() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/participants")
            .set_json(serde_json::json!({
                "name": "Lucía",
                "surname": "Gómez",
                "strengths": ["marketing"],
                "needs": ["finanzas"],
                "businessType": "Servicios"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/participants").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["businessType"], "Servicios");
        assert!(listed[0]["createdAt"].is_string());
    }

    #[actix_web::test]
    async fn test_register_rejects_empty_name() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/participants")
            .set_json(serde_json::json!({
                "name": "",
                "surname": "Gómez",
                "businessType": "Servicios"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
