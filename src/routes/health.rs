use axum::{Router, routing::get, Json, extract::State, response::Json as ResponseJson};
use crate::models::{AppState, HealthResponse, MessageResponse};

pub const LIVENESS_MESSAGE: &str = "Paper Pulse backend is running!";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn root() -> ResponseJson<MessageResponse> {
    Json(MessageResponse {
        message: LIVENESS_MESSAGE.to_string(),
    })
}

async fn health_check(State(state): State<AppState>) -> ResponseJson<HealthResponse> {
    let latest = state.store.snapshot().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        cycle_status: latest.status,
        cycles_completed: state.store.cycles_completed(),
    })
}
