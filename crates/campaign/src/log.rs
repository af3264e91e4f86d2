//! Append-only JSON-lines campaign log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pimforge_design::{DesignPoint, EvaluationResult, Outcome, ScheduleMode};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One line of `campaign.jsonl`: a single (iteration, mode) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub iteration: usize,
    pub point: DesignPoint,
    pub mode: ScheduleMode,
    /// True when this mode's cost was fed to the optimizer.
    pub objective: bool,
    pub cost: f64,
    pub cycles: f64,
    pub energy: f64,
    pub area: f64,
    pub duration_s: f64,
    pub valid: bool,
    pub outcome: Outcome,
    pub tr_length: f64,
    /// Relative EDP improvement of spatial over baseline for this point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement: Option<f64>,
}

impl LogRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        iteration: usize,
        point: &DesignPoint,
        mode: ScheduleMode,
        objective: bool,
        result: &EvaluationResult,
        duration_s: f64,
        tr_length: f64,
        improvement: Option<f64>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            iteration,
            point: point.clone(),
            mode,
            objective,
            cost: result.cost,
            cycles: result.cycles,
            energy: result.energy,
            area: result.area,
            duration_s,
            valid: result.valid,
            outcome: result.outcome.clone(),
            tr_length,
            improvement,
        }
    }
}

/// `(baseline - spatial) / baseline`, only when both evaluations are usable.
pub fn spatial_improvement(baseline: &EvaluationResult, spatial: &EvaluationResult) -> Option<f64> {
    if baseline.is_penalty() || spatial.is_penalty() || baseline.cost <= 0.0 {
        return None;
    }
    Some((baseline.cost - spatial.cost) / baseline.cost)
}

/// Records are appended and flushed one at a time; existing lines are never rewritten.
pub struct CampaignLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CampaignLog {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open campaign log {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer
            .flush()
            .with_context(|| format!("failed to flush {}", self.path.display()))?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Vec<LogRecord>> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read campaign log {}", path.display()))?;
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("malformed record on line {} of {}", i + 1, path.display()))
            })
            .collect()
    }
}
