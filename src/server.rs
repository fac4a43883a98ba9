//! HTTP server exposing the query layer.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/characters/random` | One random character |
//! | `GET`  | `/api/characters/search?name=<letters>` | Case-insensitive name search |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Every error response has the shape:
//!
//! ```json
//! { "error": "Invalid name format" }
//! ```
//!
//! | Error | Status |
//! |-------|--------|
//! | no characters stored | 404 |
//! | invalid or missing `name` | 400 |
//! | upstream / unexpected failure | 500 |
//!
//! # Startup
//!
//! [`run_server`] opens the store, runs the one-shot initial ingestion
//! (fatal on failure), then serves until the process is terminated.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::{ServiceError, INVALID_NAME};
use crate::ingest::{IngestionService, InitOutcome};
use crate::models::CharacterView;
use crate::query::QueryService;
use crate::source::HttpCharacterSource;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    /// Read side of the mirror; handlers never touch the store directly.
    query: Arc<QueryService>,
}

/// Starts the HTTP server.
///
/// Opens the configured SQLite database (applying migrations), runs
/// [`IngestionService::initialize_if_empty`] once, and binds to
/// `[server].bind`. An ingestion failure aborts startup.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = Arc::new(SqliteStore::open(config).await?);
    let source = Arc::new(HttpCharacterSource::new(&config.source)?);

    let ingestion = IngestionService::new(source, store.clone());
    match ingestion.initialize_if_empty().await? {
        InitOutcome::AlreadyPopulated { count } => {
            println!("Store holds {} characters, skipping initial sync.", count);
        }
        InitOutcome::Ingested(report) => {
            println!(
                "Initial sync: fetched {}, inserted {}.",
                report.fetched, report.reconcile.inserted
            );
        }
    }

    let app = router(Arc::new(QueryService::new(store)));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "query API bound");
    println!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router around an existing query service.
///
/// Exposed separately from [`run_server`] so callers can mount the API
/// over any [`CharacterStore`](crate::store::CharacterStore) backend.
pub fn router(query: Arc<QueryService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/characters/random", get(handle_random))
        .route("/api/characters/search", get(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { query })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    /// Sent to the client as the `error` field.
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::ExternalSource(_) | ServiceError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/characters/random ============

async fn handle_random(State(state): State<AppState>) -> Result<Json<CharacterView>, AppError> {
    Ok(Json(state.query.get_random().await?))
}

// ============ GET /api/characters/search ============

#[derive(Deserialize)]
struct SearchParams {
    name: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<CharacterView>>, AppError> {
    // Repeated or undecodable parameters can never satisfy the name pattern.
    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected search query string");
        AppError::bad_request(INVALID_NAME)
    })?;
    let name = params
        .name
        .ok_or_else(|| AppError::bad_request("Missing required parameter: name"))?;

    Ok(Json(state.query.search_by_name(&name).await?))
}
