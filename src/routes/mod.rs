// Route exports
pub mod event;
pub mod participants;

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::error::EngineError;
use crate::models::ErrorResponse;
use crate::services::EventService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub event: Arc<EventService>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(event::configure)
            .configure(participants::configure),
    );
}

/// Translate an engine error into its JSON response
pub(crate) fn engine_error_response(err: &EngineError) -> HttpResponse {
    let body = |status_code: u16| ErrorResponse {
        error: err.code().to_string(),
        message: err.to_string(),
        status_code,
    };

    match err {
        EngineError::InsufficientParticipants { .. } => {
            HttpResponse::UnprocessableEntity().json(body(422))
        }
        EngineError::RoundLimitExceeded { .. }
        | EngineError::TeamsNotReady { .. }
        | EngineError::NoEligiblePairs { .. }
        | EngineError::OperationInProgress => HttpResponse::Conflict().json(body(409)),
        EngineError::PersistenceFailure(e) => {
            tracing::error!("Persistence failure: {}", e);
            HttpResponse::InternalServerError().json(body(500))
        }
    }
}

/// Validation failure response
pub(crate) fn validation_error_response(errors: &validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}
