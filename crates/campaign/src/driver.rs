//! The outer campaign loop: propose, evaluate every mode, update, log.

use crate::log::{spatial_improvement, CampaignLog, LogRecord};
use crate::run_dir::RunDirectory;
use anyhow::{Context, Result};
use pimforge_design::{CodesignConfig, DesignPoint, EvaluationResult, Outcome, ScheduleMode, Stage};
use pimforge_pipeline::Evaluator;
use pimforge_search::{SearchCheckpoint, TrustRegionOptimizer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Best point of a finished campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BestOutcome {
    Found { point: DesignPoint, cost: f64 },
    /// No iteration produced a usable cost.
    NoFeasible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub iterations: usize,
    pub successes: usize,
    pub area_violations: usize,
    pub failures: usize,
    pub restarts: u32,
    pub final_length: f64,
    pub best: BestOutcome,
}

impl CampaignSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.iterations += 1;
        match outcome {
            Outcome::Success => self.successes += 1,
            Outcome::AreaViolation { .. } => self.area_violations += 1,
            Outcome::Failed { .. } => self.failures += 1,
        }
    }
}

pub struct CampaignDriver {
    config: Arc<CodesignConfig>,
    optimizer: TrustRegionOptimizer,
    evaluator: Box<dyn Evaluator>,
    run: RunDirectory,
    log: CampaignLog,
    next_iteration: usize,
}

impl CampaignDriver {
    pub fn new(config: Arc<CodesignConfig>, evaluator: Box<dyn Evaluator>, run: RunDirectory) -> Result<Self> {
        let optimizer = TrustRegionOptimizer::new(config.space.clone(), config.search.clone());
        let log = CampaignLog::open(run.log_path())?;
        Ok(Self {
            config,
            optimizer,
            evaluator,
            run,
            log,
            next_iteration: 1,
        })
    }

    /// Continue from a saved search state.
    ///
    /// Objective records logged after the checkpoint was taken are replayed
    /// into the optimizer, so iteration numbering continues after the last
    /// logged iteration and no iteration appears twice in the log.
    pub fn resume(
        config: Arc<CodesignConfig>,
        evaluator: Box<dyn Evaluator>,
        run: RunDirectory,
        checkpoint: SearchCheckpoint,
    ) -> Result<Self> {
        let checkpointed = checkpoint.proposals;
        let mut optimizer = TrustRegionOptimizer::from_checkpoint(config.search.clone(), checkpoint)
            .context("failed to restore search state")?;

        let log_path = run.log_path();
        let mut replayed = 0usize;
        if log_path.exists() {
            let mut pending: Vec<LogRecord> = CampaignLog::read(&log_path)?
                .into_iter()
                .filter(|r| r.objective && r.iteration > checkpointed)
                .collect();
            pending.sort_by_key(|r| r.iteration);
            pending.dedup_by_key(|r| r.iteration);
            for record in &pending {
                optimizer.replay(&record.point, record.cost);
            }
            replayed = pending.len();
        }
        if replayed > 0 {
            warn!(replayed, checkpointed, "replayed iterations logged after the last checkpoint");
        }

        let next_iteration = optimizer.proposals() + 1;
        let log = CampaignLog::open(log_path)?;
        info!(next_iteration, "resuming campaign");
        Ok(Self {
            config,
            optimizer,
            evaluator,
            run,
            log,
            next_iteration,
        })
    }

    pub fn optimizer(&self) -> &TrustRegionOptimizer {
        &self.optimizer
    }

    pub fn run_directory(&self) -> &RunDirectory {
        &self.run
    }

    pub fn save_checkpoint(&self) -> Result<()> {
        self.optimizer.checkpoint().save_to_file(&self.run.checkpoint_path())
    }

    fn evaluate_modes(&self, point: &DesignPoint, iteration: usize) -> Vec<(ScheduleMode, EvaluationResult, f64)> {
        let modes = &self.config.campaign.modes;
        let evaluate = |mode: &ScheduleMode| {
            let start = Instant::now();
            let result = self.evaluator.evaluate(point, *mode, iteration);
            let elapsed = result
                .detail("duration_s")
                .unwrap_or_else(|| start.elapsed().as_secs_f64());
            (*mode, result, elapsed)
        };
        if self.config.campaign.parallel_modes {
            modes.par_iter().map(evaluate).collect()
        } else {
            modes.iter().map(evaluate).collect()
        }
    }

    /// Run `iterations` more iterations. Per-iteration failures never abort
    /// the campaign; only log and checkpoint IO errors do.
    pub fn run(&mut self, iterations: usize) -> Result<CampaignSummary> {
        let objective_mode = self.config.campaign.objective_mode;
        let checkpoint_every = self.config.campaign.checkpoint_every.max(1);
        let mut summary = CampaignSummary {
            iterations: 0,
            successes: 0,
            area_violations: 0,
            failures: 0,
            restarts: 0,
            final_length: self.optimizer.state().length,
            best: BestOutcome::NoFeasible,
        };

        let first = self.next_iteration;
        for iteration in first..first + iterations {
            let point = self.optimizer.propose();
            let results = self.evaluate_modes(&point, iteration);

            let objective = match results.iter().find(|(mode, _, _)| *mode == objective_mode) {
                Some((_, result, _)) => result.clone(),
                None => {
                    warn!(iteration, mode = %objective_mode, "objective mode was not evaluated");
                    EvaluationResult::failed(
                        Stage::Aggregation,
                        "objective mode not evaluated",
                        self.config.pipeline.penalty_cost,
                    )
                }
            };
            let update = self.optimizer.update(&point, objective.cost);
            summary.record(&objective.outcome);

            let baseline = results.iter().find(|(m, _, _)| *m == ScheduleMode::Baseline);
            let spatial = results.iter().find(|(m, _, _)| *m == ScheduleMode::Spatial);
            let improvement = match (baseline, spatial) {
                (Some((_, b, _)), Some((_, s, _))) => spatial_improvement(b, s),
                _ => None,
            };

            for (mode, result, duration_s) in &results {
                let record = LogRecord::new(
                    iteration,
                    &point,
                    *mode,
                    *mode == objective_mode,
                    result,
                    *duration_s,
                    update.length,
                    improvement,
                );
                self.log.append(&record)?;
                info!(
                    iteration,
                    mode = %mode,
                    outcome = result.outcome.label(),
                    cost = result.cost,
                    cycles = result.cycles,
                    energy = result.energy,
                    area = result.area,
                    duration_s = *duration_s,
                    tr_length = update.length,
                    "iteration finished"
                );
            }

            self.next_iteration = iteration + 1;
            if iteration % checkpoint_every == 0 {
                self.save_checkpoint()?;
            }
        }
        self.save_checkpoint()?;

        let state = self.optimizer.state();
        summary.restarts = state.restart_count;
        summary.final_length = state.length;
        summary.best = match self.optimizer.best_found() {
            Some((point, cost)) => BestOutcome::Found {
                point: point.clone(),
                cost,
            },
            None => BestOutcome::NoFeasible,
        };
        match &summary.best {
            BestOutcome::Found { point, cost } => info!(point = %point, cost, "campaign finished"),
            BestOutcome::NoFeasible => warn!(
                iterations = summary.iterations,
                "campaign finished without a feasible design"
            ),
        }
        Ok(summary)
    }
}
