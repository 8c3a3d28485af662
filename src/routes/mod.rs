//! API Routes
//!
//! - `/` - Liveness message
//! - `/api/health` - Health check with scheduler progress
//! - `/api/latest` - Latest digest record
//! - `/api/config` - Read or change the update interval

pub mod config;
pub mod health;
pub mod latest;

use axum::Router;
use crate::middleware::apply_cors;
use crate::models::AppState;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(health::router(state.clone()))
        .merge(latest::router(state.clone()))
        .merge(config::router(state));

    apply_cors(router, &origins).layer(TraceLayer::new_for_http())
}
