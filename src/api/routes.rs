use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{LeaderboardError, PeriodError, UpstreamError};
use crate::leaderboard::{period, service};
use crate::middleware::request_logging;
use crate::models::{LeaderboardEntry, PeriodOverview, RawRecord};
use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/leaderboard/top14", get(get_current_leaderboard))
        .route("/leaderboard/prev", get(get_previous_leaderboard))
        .route("/leaderboard/biweekly", get(get_biweekly_leaderboard))
        .route("/period", get(get_period))
        .route("/raw", get(get_raw_records))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer())
        .with_state(state)
}

/// Open CORS: the boards are embedded on third-party pages.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

// ===== Route Handlers =====

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.cache.snapshot();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_entries: snapshot.entries.len(),
        last_refresh: snapshot.refreshed_at,
    })
}

/// Cached board for the running cycle. Capped at ten rows despite the route name.
async fn get_current_leaderboard(State(state): State<AppState>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.cache.snapshot().entries.clone())
}

/// Previous cycle, fetched fresh on every call.
async fn get_previous_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    service::leaderboard_for_offset(state.cycle_source.as_ref(), Utc::now(), -1)
        .await
        .map(Json)
        .map_err(ApiError::PreviousLeaderboard)
}

async fn get_period() -> Result<Json<PeriodOverview>, ApiError> {
    period::overview_at(Utc::now())
        .map(Json)
        .map_err(ApiError::Period)
}

async fn get_raw_records(State(state): State<AppState>) -> Result<Json<Vec<RawRecord>>, ApiError> {
    service::biweekly_records(state.biweekly_source.as_ref(), &state.biweekly)
        .await
        .map(Json)
        .map_err(ApiError::RawRecords)
}

async fn get_biweekly_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    service::biweekly_leaderboard(state.biweekly_source.as_ref(), &state.biweekly)
        .await
        .map(Json)
        .map_err(ApiError::BiweeklyLeaderboard)
}

// ===== Response Types =====

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    cached_entries: usize,
    last_refresh: Option<DateTime<Utc>>,
}

// ===== Error Handling =====

/// Route failures. Clients only ever see a fixed message; the cause goes to the log.
#[derive(Debug)]
pub enum ApiError {
    PreviousLeaderboard(LeaderboardError),
    RawRecords(UpstreamError),
    BiweeklyLeaderboard(UpstreamError),
    Period(PeriodError),
}

impl ApiError {
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::PreviousLeaderboard(_) => "Failed to fetch previous leaderboard data.",
            ApiError::RawRecords(_) => "Failed to fetch raw data",
            ApiError::BiweeklyLeaderboard(_) => "Failed to build leaderboard",
            ApiError::Period(_) => "Failed to compute period bounds",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::PreviousLeaderboard(err) => {
                tracing::error!("❌ Failed to fetch previous leaderboard: {}", err)
            }
            ApiError::RawRecords(err) => tracing::error!("❌ Failed to fetch raw records: {}", err),
            ApiError::BiweeklyLeaderboard(err) => {
                tracing::error!("❌ Failed to build biweekly leaderboard: {}", err)
            }
            ApiError::Period(err) => tracing::error!("❌ Failed to compute period bounds: {}", err),
        }

        let body = Json(json!({
            "error": self.public_message(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
