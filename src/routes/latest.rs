use axum::{Router, routing::get, Json, extract::State, response::Json as ResponseJson};
use crate::models::{AppState, PipelineResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/latest", get(get_latest))
        .with_state(state)
}

/// Current record as-is, including fields from a cycle still in flight
async fn get_latest(State(state): State<AppState>) -> ResponseJson<PipelineResult> {
    Json(state.store.snapshot().await)
}
