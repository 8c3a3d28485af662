//! Cycle Scheduler
//!
//! Background worker that runs the pipeline forever:
//!
//! ```text
//! Idle → Researching → Explaining → Notifying → Complete → (interval) → Researching …
//!              └──────────┴────────────┴──▶ Error → (backoff) → Researching …
//! ```
//!
//! The configured interval is read fresh after every successful cycle, so a
//! change made through the API applies to the next sleep. The cancellation
//! token is honoured before every stage, during every stage call and during
//! every sleep.

pub mod sleeper;

pub use sleeper::{Sleeper, TokioSleeper};

use crate::agents::{Pipeline, Stage};
use crate::models::CycleStatus;
use crate::store::StateStore;
use crate::types::{AppError, AppResult};
use crate::utils::links::extract_paper_link;
use chrono::NaiveDateTime;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub const DATE_FORMAT: &str = "%b %d, %Y";
pub const TIME_FORMAT: &str = "%I:%M %p";

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct CycleScheduler {
    pipeline: Pipeline,
    store: StateStore,
    sleeper: Arc<dyn Sleeper>,
    clock: Clock,
    error_backoff: Duration,
    cancel: CancellationToken,
}

impl CycleScheduler {
    pub fn new(
        pipeline: Pipeline,
        store: StateStore,
        error_backoff: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            pipeline,
            store,
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(|| chrono::Local::now().naive_local()),
            error_backoff,
            cancel,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Loop until cancelled. Cycle failures are recorded in the status field
    /// and never end the loop.
    pub async fn run(self) {
        info!("Cycle scheduler started");

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let pause = match self.run_cycle().await {
                Ok(()) => {
                    let interval = self.store.interval();
                    info!(seconds = interval.as_secs(), "Waiting for next cycle");
                    interval
                }
                Err(AppError::Cancelled) => break,
                Err(e) => {
                    error!(error = %e, "Cycle failed");
                    self.store.set_status(&CycleStatus::Error(e.to_string())).await;
                    self.error_backoff
                }
            };

            if !self.pause(pause).await {
                break;
            }
        }

        info!("Cycle scheduler stopped");
    }

    /// One full cycle: three stages, then the completion timestamp
    pub async fn run_cycle(&self) -> AppResult<()> {
        let news = self.run_stage(Stage::Research, self.pipeline.research()).await?;
        let link = extract_paper_link(&news);
        self.store.update(|latest| latest.news = news.clone()).await;
        self.store.update(|latest| latest.link = link).await;

        let analogy = self
            .run_stage(Stage::Explain, self.pipeline.explain(&news))
            .await?;
        self.store.update(|latest| latest.analogy = analogy.clone()).await;

        let notification = self
            .run_stage(Stage::Notify, self.pipeline.notify(&news, &analogy))
            .await?;
        self.store
            .update(|latest| latest.notification = notification.clone())
            .await;

        let now = (self.clock)();
        self.store
            .update(|latest| {
                latest.date = now.format(DATE_FORMAT).to_string();
                latest.time = Some(now.format(TIME_FORMAT).to_string());
                latest.status = CycleStatus::Complete.to_string();
            })
            .await;

        let cycles = self.store.record_cycle_complete();
        info!(cycles, notification = %notification, "Cycle complete");

        Ok(())
    }

    async fn run_stage<F>(&self, stage: Stage, work: F) -> AppResult<String>
    where
        F: Future<Output = AppResult<String>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        self.store.set_status(&CycleStatus::Running(stage)).await;
        info!(stage = %stage, role = self.pipeline.role(stage).name, "Stage started");

        let output = tokio::select! {
            _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
            result = work => result?,
        };

        info!(stage = %stage, chars = output.len(), "Stage finished");
        Ok(output)
    }

    /// Sleep unless cancelled first. Returns false on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = self.sleeper.sleep(duration) => true,
        }
    }
}
