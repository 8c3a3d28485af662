// Paper Pulse - periodic arXiv digest service backed by a hosted LLM

pub mod config;
pub mod models;
pub mod types;
pub mod agents;
pub mod llm;
pub mod search;    // arXiv listing and full-text retrieval
pub mod scheduler; // Background cycle worker
pub mod store;     // Shared latest-result record
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use store::StateStore;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
