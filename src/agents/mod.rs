//! Agent System
//!
//! The worker roles that produce each digest:
//!
//! - **Researcher**: finds a recent arXiv paper and writes a structured report
//! - **Teacher**: turns the report into one lay analogy
//! - **Designer**: condenses both into a short notification
//!
//! ## Pipeline Overview
//!
//! ```text
//!   Researcher ──(report)──▶ Teacher ──(analogy)──▶ Designer
//!       │                                              │
//!   arXiv tools                                 notification
//! ```
//!
//! All three are rows in one role table and run through the same
//! [`RoleRunner`]; only the Researcher is given tools.

pub mod roles;
pub mod tools;
pub mod runner;
pub mod pipeline;

pub use pipeline::{Pipeline, Stage};
pub use roles::{Roster, ToolCapability, WorkerRole};
pub use runner::RoleRunner;
pub use tools::{Tool, ToolBox};
