//! Campaign orchestration for PIMForge.
//!
//! A campaign repeatedly asks the trust-region optimizer for a design point,
//! evaluates it under every configured scheduling mode, feeds the objective
//! mode's cost back, and appends one log line per evaluation:
//!
//! ```text
//! propose ──► evaluate(baseline) ─┐
//!        └──► evaluate(spatial)  ─┴─► update(objective cost) ──► campaign.jsonl
//! ```
//!
//! The search state is checkpointed periodically so a campaign can resume.

#[cfg(feature = "cli")]
pub mod cli;
pub mod driver;
pub mod log;
pub mod run_dir;

pub use driver::{BestOutcome, CampaignDriver, CampaignSummary};
pub use log::{spatial_improvement, CampaignLog, LogRecord};
pub use run_dir::{RunDirectory, RunMetadata};
