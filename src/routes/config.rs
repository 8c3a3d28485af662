//! Schedule configuration endpoints
//!
//! - GET /api/config - current inter-cycle interval
//! - POST /api/config - set the interval in minutes

use axum::{
    Router,
    routing::get,
    Json,
    extract::State,
    response::Json as ResponseJson,
};
use crate::models::{AppState, IntervalRequest, IntervalResponse, IntervalUpdatedResponse};
use crate::types::{AppError, AppResult};
use std::time::Duration;
use tracing::info;

pub const MIN_INTERVAL_MINUTES: i64 = 1;
pub const MAX_INTERVAL_MINUTES: i64 = 24 * 60;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/config", get(get_interval).post(update_interval))
        .with_state(state)
}

/// Convert a requested interval to a sleep duration, rejecting values
/// outside `MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES`
pub fn interval_from_minutes(minutes: i64) -> AppResult<Duration> {
    if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
        return Err(AppError::InvalidRequest(format!(
            "interval_minutes must be between {} and {}, got {}",
            MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES, minutes
        )));
    }

    Ok(Duration::from_secs(minutes as u64 * 60))
}

async fn get_interval(State(state): State<AppState>) -> ResponseJson<IntervalResponse> {
    let seconds = state.store.interval().as_secs();

    Json(IntervalResponse {
        interval_seconds: seconds,
        // every path that sets the interval stores whole minutes
        interval_minutes: seconds / 60,
    })
}

async fn update_interval(
    State(state): State<AppState>,
    Json(request): Json<IntervalRequest>,
) -> AppResult<ResponseJson<IntervalUpdatedResponse>> {
    let interval = interval_from_minutes(request.interval_minutes)?;
    state.store.set_interval(interval);

    info!(seconds = interval.as_secs(), "Update interval changed");

    Ok(Json(IntervalUpdatedResponse {
        message: "Interval updated".to_string(),
        interval_seconds: interval.as_secs(),
    }))
}
