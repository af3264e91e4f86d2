//! Evaluation results returned by the pipeline.

use crate::error::{Stage, StageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest cost any invalid evaluation may report.
///
/// Every fully valid run must stay strictly below this value.
pub const PENALTY_FLOOR: f64 = 1.0e18;

/// True for costs that carry no information about the design.
pub fn is_penalty_cost(cost: f64) -> bool {
    !cost.is_finite() || cost >= PENALTY_FLOOR
}

/// What happened to one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    AreaViolation {
        area_mm2: f64,
        limit_mm2: f64,
        penalty_factor: f64,
    },
    Failed {
        stage: Stage,
        reason: String,
    },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::AreaViolation { .. } => "area-violation",
            Outcome::Failed { .. } => "failed",
        }
    }
}

/// Scalar cost plus diagnostic metrics for one (point, mode) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub cost: f64,
    pub cycles: f64,
    pub energy: f64,
    pub area: f64,
    pub valid: bool,
    pub detail: BTreeMap<String, f64>,
    pub outcome: Outcome,
}

impl EvaluationResult {
    /// Penalised result for an evaluation that could not be completed.
    pub fn failed(stage: Stage, reason: impl Into<String>, penalty_cost: f64) -> Self {
        Self {
            cost: penalty_cost.max(PENALTY_FLOOR),
            cycles: 0.0,
            energy: 0.0,
            area: 0.0,
            valid: false,
            detail: BTreeMap::new(),
            outcome: Outcome::Failed {
                stage,
                reason: reason.into(),
            },
        }
    }

    pub fn from_error(err: &StageError, penalty_cost: f64) -> Self {
        Self::failed(err.stage, err.kind.to_string(), penalty_cost)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: f64) -> Self {
        self.detail.insert(key.into(), value);
        self
    }

    pub fn is_penalty(&self) -> bool {
        !self.valid || is_penalty_cost(self.cost)
    }

    pub fn detail(&self, key: &str) -> Option<f64> {
        self.detail.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;

    #[test]
    fn test_failed_result_respects_floor() {
        let result = EvaluationResult::failed(Stage::TimingSimulation, "boom", 1.0);
        assert!(!result.valid);
        assert!(result.cost >= PENALTY_FLOOR);
        assert!(result.is_penalty());
        assert_eq!(result.outcome.label(), "failed");
    }

    #[test]
    fn test_from_error_records_stage() {
        let err = StageError::parse(Stage::ParseTiming, "no Cycles line");
        let result = EvaluationResult::from_error(&err, 5.0e18);
        assert_eq!(result.cost, 5.0e18);
        match result.outcome {
            Outcome::Failed { stage, reason } => {
                assert_eq!(stage, Stage::ParseTiming);
                assert!(reason.contains("Cycles"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_penalty_cost_classification() {
        assert!(is_penalty_cost(f64::INFINITY));
        assert!(is_penalty_cost(f64::NAN));
        assert!(is_penalty_cost(PENALTY_FLOOR));
        assert!(!is_penalty_cost(1.0e12));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::AreaViolation {
            area_mm2: 60.0,
            limit_mm2: 48.0,
            penalty_factor: 3.5,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("area_violation"));
    }
}
