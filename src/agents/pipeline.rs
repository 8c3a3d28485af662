//! Three-stage pipeline: research → explain → notify
//!
//! Each stage is one role invocation. Later stages embed the earlier outputs
//! verbatim in their prompt, so they can never run ahead of their inputs.

use super::roles::{Roster, WorkerRole};
use super::runner::RoleRunner;
use crate::types::AppResult;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Research,
    Explain,
    Notify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Research => write!(f, "research"),
            Stage::Explain => write!(f, "explain"),
            Stage::Notify => write!(f, "notify"),
        }
    }
}

pub struct Pipeline {
    runner: RoleRunner,
    roster: Roster,
    lookback_days: u32,
}

impl Pipeline {
    pub fn new(runner: RoleRunner, roster: Roster, lookback_days: u32) -> Self {
        Self {
            runner,
            roster,
            lookback_days,
        }
    }

    pub fn role(&self, stage: Stage) -> &WorkerRole {
        match stage {
            Stage::Research => &self.roster.researcher,
            Stage::Explain => &self.roster.teacher,
            Stage::Notify => &self.roster.designer,
        }
    }

    /// Stage 1: find and report on a recent paper
    pub async fn research(&self) -> AppResult<String> {
        self.runner
            .run(self.role(Stage::Research), &research_prompt(self.lookback_days))
            .await
    }

    /// Stage 2: one lay analogy for the report
    pub async fn explain(&self, news: &str) -> AppResult<String> {
        self.runner.run(self.role(Stage::Explain), &explain_prompt(news)).await
    }

    /// Stage 3: short hook + value notification
    pub async fn notify(&self, news: &str, analogy: &str) -> AppResult<String> {
        self.runner
            .run(self.role(Stage::Notify), &notify_prompt(news, analogy))
            .await
    }
}

pub fn research_prompt(lookback_days: u32) -> String {
    format!(
        "Search arXiv for the latest AI research papers submitted in the last {} days. \
         Pick one very interesting paper, get its arXiv ID from the search results, \
         read it, and then explain it deeply.",
        lookback_days
    )
}

pub fn explain_prompt(news: &str) -> String {
    format!("Explain this research using an analogy: {}", news)
}

pub fn notify_prompt(news: &str, analogy: &str) -> String {
    format!(
        "Create a notification based on this analogy: '{}'.\n\nBut ensure it is grounded in this real research: '{}'",
        analogy, news
    )
}
