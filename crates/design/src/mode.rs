//! Software scheduling modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the workload is mapped onto the node array.
///
/// `Baseline` leaves scheduling unconstrained; `Spatial` forces one
/// computation dimension to be partitioned across the configured nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    Baseline,
    Spatial,
}

impl ScheduleMode {
    pub const ALL: [ScheduleMode; 2] = [ScheduleMode::Baseline, ScheduleMode::Spatial];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleMode::Baseline => "baseline",
            ScheduleMode::Spatial => "spatial",
        }
    }
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(ScheduleMode::Baseline),
            "spatial" | "atomic" => Ok(ScheduleMode::Spatial),
            other => Err(format!("Unknown schedule mode: {}", other)),
        }
    }
}
