//! Stage-tagged error taxonomy for the evaluation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    MaterializeDesign,
    MaterializeMapping,
    TimingSimulation,
    ParseTiming,
    AreaCheck,
    TraceSynthesis,
    MemorySimulation,
    Aggregation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::MaterializeDesign => "materialize-design",
            Stage::MaterializeMapping => "materialize-mapping",
            Stage::TimingSimulation => "timing-simulation",
            Stage::ParseTiming => "parse-timing",
            Stage::AreaCheck => "area-check",
            Stage::TraceSynthesis => "trace-synthesis",
            Stage::MemorySimulation => "memory-simulation",
            Stage::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an external simulator invocation did not produce usable output.
#[derive(Debug, Error)]
pub enum SimFailure {
    #[error("failed to launch `{program}`: {detail}")]
    Spawn { program: String, detail: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("exited with code {code:?}: {tail}")]
    NonZeroExit { code: Option<i32>, tail: String },

    #[error("expected output artifact missing: {}", .0.display())]
    MissingOutput(PathBuf),
}

#[derive(Debug, Error)]
pub enum StageErrorKind {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("simulation failed: {0}")]
    Simulation(#[from] SimFailure),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure inside one pipeline stage, keeping the stage identity.
#[derive(Debug, Error)]
#[error("stage {stage} failed: {kind}")]
pub struct StageError {
    pub stage: Stage,
    pub kind: StageErrorKind,
}

impl StageError {
    pub fn new(stage: Stage, kind: impl Into<StageErrorKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }

    pub fn config(stage: Stage, detail: impl Into<String>) -> Self {
        Self::new(stage, StageErrorKind::Config(detail.into()))
    }

    pub fn parse(stage: Stage, detail: impl Into<String>) -> Self {
        Self::new(stage, StageErrorKind::Parse(detail.into()))
    }

    pub fn io(stage: Stage, err: std::io::Error) -> Self {
        Self::new(stage, StageErrorKind::Io(err))
    }

    pub fn simulation(stage: Stage, failure: SimFailure) -> Self {
        Self::new(stage, StageErrorKind::Simulation(failure))
    }

    pub fn constraint(stage: Stage, detail: impl Into<String>) -> Self {
        Self::new(stage, StageErrorKind::ConstraintViolation(detail.into()))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self.kind,
            StageErrorKind::Simulation(SimFailure::Timeout(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_display_keeps_stage() {
        let err = StageError::simulation(
            Stage::TimingSimulation,
            SimFailure::MissingOutput(PathBuf::from("out/stats.txt")),
        );
        let msg = err.to_string();
        assert!(msg.contains("timing-simulation"));
        assert!(msg.contains("out/stats.txt"));
    }

    #[test]
    fn test_timeout_detection() {
        let err = StageError::simulation(
            Stage::MemorySimulation,
            SimFailure::Timeout(Duration::from_secs(3)),
        );
        assert!(err.is_timeout());
        assert!(!StageError::parse(Stage::ParseTiming, "no cycles").is_timeout());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = StageError::io(Stage::TraceSynthesis, io);
        assert!(matches!(err.kind, StageErrorKind::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
