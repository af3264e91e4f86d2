//! Adapters around the external tools of the evaluation pipeline.
//!
//! Each tool is driven through files: an artifact is written, a process is
//! launched with a bounded timeout, and its output artifacts are parsed.
//! Launching goes through the [`stage::StageRunner`] seam so the pipeline
//! can be exercised without the real simulators installed.
//!
//! # Key Components
//!
//! - [`stage::ProcessRunner`]: timeout-bounded process invocation
//! - [`render::TemplateRenderer`]: architecture description from a parameter table
//! - [`mapping`]: mapper and constraint artifact for a scheduling mode
//! - [`timing`] / [`parser`]: timing/area simulator invocation and output parsing
//! - [`trace::TraceSynthesizer`]: bounded access trace plus scale factor
//! - [`noc::NetworkConfig`] / [`memory`]: memory/network co-simulation

pub mod error;
pub mod mapping;
pub mod memory;
pub mod noc;
pub mod parser;
pub mod render;
pub mod stage;
pub mod timing;
pub mod trace;

pub use error::ArtifactError;
pub use memory::{MemorySimulator, MemoryStats};
pub use noc::{NetworkConfig, Topology};
pub use parser::TimingStats;
pub use render::{DesignRenderer, TemplateFile, TemplateRenderer};
pub use stage::{Invocation, ProcessRunner, StageRun, StageRunner};
pub use timing::{TimingReport, TimingSimulator};
pub use trace::{trace_seed, TracePlan, TraceSynthesizer};
