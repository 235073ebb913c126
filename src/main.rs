use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use netevent_algo::config::{LogFormat, Settings, StoreBackend};
use netevent_algo::core::{RoundMatcher, TeamAssigner};
use netevent_algo::models::ErrorResponse;
use netevent_algo::routes::{self, AppState};
use netevent_algo::services::{
    CacheManager, EventService, EventStore, InMemoryStore, PostgresClient, SupabaseClient,
    SupabaseTables,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for malformed payloads and queries
#[derive(Debug)]
pub struct JsonError(ErrorResponse);

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError(ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    })
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError(ErrorResponse {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    })
    .into()
}

fn init_logging(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.logging.format {
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match settings.store.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; event data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or_else(|| startup_error("Configuration error", "missing [database] section"))?;

            let client = PostgresClient::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
                database.acquire_timeout_secs,
                database.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                database.max_connections.unwrap_or(10)
            );
            Arc::new(client)
        }
        StoreBackend::Supabase => {
            let supabase = settings
                .supabase
                .as_ref()
                .ok_or_else(|| startup_error("Configuration error", "missing [supabase] section"))?;

            let tables = SupabaseTables {
                participants: supabase.participants_table.clone(),
                matches: supabase.matches_table.clone(),
                teams: supabase.teams_table.clone(),
            };

            let client = SupabaseClient::new(
                supabase.url.clone(),
                supabase.api_key.clone(),
                tables,
                Duration::from_secs(supabase.timeout_secs),
            )
            .map_err(|e| startup_error("Failed to build Supabase client", e))?;

            info!("Supabase store initialized at {}", supabase.url);
            Arc::new(client)
        }
    };

    Ok(store)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings);

    info!("Starting NetEvent Algo service...");

    let store = build_store(&settings).await?;

    let matcher = RoundMatcher::new(settings.scoring_weights(), settings.event.max_rounds);
    let assigner = TeamAssigner::new(settings.teams.sizing());

    info!(
        "Matcher initialized with weights: {:?}, {} rounds",
        matcher.scorer().weights(),
        matcher.max_rounds()
    );

    let mut event = EventService::new(store, matcher, assigner)
        .with_final_round_gate(settings.teams.require_final_round);

    info!("Event store backend: {}", event.backend());

    // Cache is optional - listings fall back to the store without it
    if let Some(cache_settings) = &settings.cache {
        let cache_ttl = cache_settings.ttl_secs.unwrap_or(300);
        let l1_cache_size = cache_settings.l1_cache_size.unwrap_or(1000);

        match CacheManager::new(&cache_settings.redis_url, l1_cache_size, cache_ttl).await {
            Ok(cache) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                event = event.with_cache(Arc::new(cache));
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running without cache", e);
            }
        }
    }

    let app_state = AppState {
        event: Arc::new(event),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
