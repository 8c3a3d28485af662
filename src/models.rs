use crate::agents::Stage;
use crate::config::Config;
use crate::store::StateStore;
use std::fmt;

#[derive(Clone)]
pub struct AppState {
    pub store: StateStore,
    pub config: Config,
}

/// Latest outputs of the pipeline as served by `GET /api/latest`.
///
/// Fields are overwritten one at a time while a cycle runs, so a read taken
/// mid-cycle may mix fields from two cycles.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineResult {
    pub news: String,
    pub link: String,
    pub analogy: String,
    pub notification: String,
    pub status: String,
    pub date: String,
    /// Absent until the first cycle completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl Default for PipelineResult {
    fn default() -> Self {
        Self {
            news: "Ready to search...".to_string(),
            link: "#".to_string(),
            analogy: "Waiting for news...".to_string(),
            notification: "Standby...".to_string(),
            status: CycleStatus::Idle.to_string(),
            date: "Today".to_string(),
            time: None,
        }
    }
}

/// Scheduler state as shown to clients in the `status` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    Idle,
    Running(Stage),
    Complete,
    Error(String),
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleStatus::Idle => write!(f, "Idle"),
            CycleStatus::Running(Stage::Research) => write!(f, "🔍 Agent 1: Scanning Arxiv..."),
            CycleStatus::Running(Stage::Explain) => write!(f, "💡 Agent 2: Creating Analogy..."),
            CycleStatus::Running(Stage::Notify) => write!(f, "🎨 Agent 3: Aligning Notification..."),
            CycleStatus::Complete => write!(f, "✅ Cycle Complete"),
            CycleStatus::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

// API Request/Response types

#[derive(Debug, serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct IntervalRequest {
    pub interval_minutes: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct IntervalUpdatedResponse {
    pub message: String,
    pub interval_seconds: u64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct IntervalResponse {
    pub interval_seconds: u64,
    pub interval_minutes: u64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub cycle_status: String,
    pub cycles_completed: u64,
}
