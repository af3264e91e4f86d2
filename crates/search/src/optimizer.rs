//! The trust-region optimizer: `propose` a point, `update` with its cost.

use crate::checkpoint::SearchCheckpoint;
use crate::sampler::{
    best_observation, sample_with_fallback, CandidateSampler, Observation, TpeSampler, UniformSampler,
};
use crate::surrogate::{cost_to_target, SurrogateModel};
use crate::trust_region::{RegionUpdate, TrustRegionState, Window};
use anyhow::{anyhow, Result};
use pimforge_design::{DesignPoint, DesignSpace, SamplerKind, SearchConfig};
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub struct TrustRegionOptimizer {
    space: DesignSpace,
    config: SearchConfig,
    state: TrustRegionState,
    sampler: Box<dyn CandidateSampler>,
    surrogate: Option<SurrogateModel>,
    history: Vec<Observation>,
    rng: fastrand::Rng,
    proposals: usize,
}

impl TrustRegionOptimizer {
    pub fn new(space: DesignSpace, config: SearchConfig) -> Self {
        let sampler: Box<dyn CandidateSampler> = match config.sampler {
            SamplerKind::Tpe => Box::new(TpeSampler::new(config.n_startup)),
            SamplerKind::Uniform => Box::new(UniformSampler),
        };
        let surrogate = config
            .surrogate
            .enabled
            .then(|| SurrogateModel::new(&space, config.surrogate.clone()));

        Self {
            state: TrustRegionState::new(&config),
            rng: fastrand::Rng::with_seed(config.seed),
            space,
            config,
            sampler,
            surrogate,
            history: Vec::new(),
            proposals: 0,
        }
    }

    /// Replace the inner sampler.
    pub fn with_sampler(mut self, sampler: Box<dyn CandidateSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Rebuild an optimizer from a checkpoint, replaying history into the surrogate.
    pub fn from_checkpoint(config: SearchConfig, checkpoint: SearchCheckpoint) -> Result<Self> {
        if checkpoint.state.best_point.as_ref().is_some_and(|p| !checkpoint.space.contains(p)) {
            return Err(anyhow!("checkpointed incumbent lies outside the checkpointed space"));
        }

        let mut optimizer = Self::new(checkpoint.space, config);
        optimizer.state = checkpoint.state;
        optimizer.proposals = checkpoint.proposals;
        optimizer.rng = fastrand::Rng::with_seed(checkpoint.rng_state);
        if let Some(surrogate) = optimizer.surrogate.as_mut() {
            for obs in &checkpoint.history {
                if let Some(target) = cost_to_target(obs.cost) {
                    surrogate.update(&obs.point, target);
                }
            }
        }
        optimizer.history = checkpoint.history;
        Ok(optimizer)
    }

    pub fn checkpoint(&self) -> SearchCheckpoint {
        SearchCheckpoint::new(
            self.space.clone(),
            self.state.clone(),
            self.history.clone(),
            self.rng.get_seed(),
            self.proposals,
        )
    }

    pub fn space(&self) -> &DesignSpace {
        &self.space
    }

    pub fn state(&self) -> &TrustRegionState {
        &self.state
    }

    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    pub fn proposals(&self) -> usize {
        self.proposals
    }

    /// The trust region's current incumbent. Cleared by a forgetting restart.
    pub fn best(&self) -> Option<(&DesignPoint, f64)> {
        self.state
            .best_point
            .as_ref()
            .map(|p| (p, self.state.best_value))
    }

    /// Best usable design seen over the whole search, across restarts.
    pub fn best_found(&self) -> Option<(&DesignPoint, f64)> {
        best_observation(&self.history).map(|obs| (&obs.point, obs.cost))
    }

    /// The currently published trust-region bounds.
    pub fn window(&self) -> Window {
        self.state.bounds(&self.space)
    }

    /// Next point to evaluate. Always inside the published window.
    pub fn propose(&mut self) -> DesignPoint {
        let window = self.window();
        self.proposals += 1;

        let ranked = match &self.surrogate {
            Some(surrogate) if surrogate.is_ready() => {
                let n = self.config.surrogate.candidates.max(1);
                let mut fallbacks = 0usize;
                let mut candidates = Vec::with_capacity(n);
                for _ in 0..n {
                    let (point, err) = sample_with_fallback(
                        self.sampler.as_ref(),
                        &window,
                        &self.history,
                        &mut self.rng,
                    );
                    fallbacks += usize::from(err.is_some());
                    candidates.push(point);
                }
                candidates.sort_by(|a, b| a.coords().cmp(b.coords()));
                candidates.dedup();
                if fallbacks > 0 {
                    debug!(fallbacks, drawn = n, "inner sampler fell back to uniform draws");
                }

                let scored: Vec<(f64, DesignPoint)> = candidates
                    .into_par_iter()
                    .map(|c| (surrogate.predict(&c).ucb, c))
                    .collect();
                scored
                    .into_iter()
                    .filter(|(ucb, _)| ucb.is_finite())
                    .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(ucb, point)| {
                        debug!(point = %point, ucb, "surrogate selected candidate");
                        point
                    })
            }
            _ => None,
        };

        let point = match ranked {
            Some(point) => point,
            None => {
                let (point, err) = sample_with_fallback(
                    self.sampler.as_ref(),
                    &window,
                    &self.history,
                    &mut self.rng,
                );
                if let Some(e) = err {
                    warn!(
                        error = %e,
                        sampler = self.sampler.name(),
                        "sampler failed; falling back to uniform sampling"
                    );
                }
                point
            }
        };

        debug_assert!(window.contains(&point));
        point
    }

    /// Fold in an evaluation whose proposal predates this optimizer, such as
    /// one logged after the last checkpoint. Counts as a proposal.
    pub fn replay(&mut self, point: &DesignPoint, cost: f64) -> RegionUpdate {
        self.proposals += 1;
        self.update(point, cost)
    }

    /// Fold one evaluated cost into the search state.
    pub fn update(&mut self, point: &DesignPoint, cost: f64) -> RegionUpdate {
        let before = self.state.length;
        let outcome = self.state.update(point, cost);

        self.history.push(Observation {
            point: point.clone(),
            cost,
        });
        if let (Some(surrogate), Some(target)) = (self.surrogate.as_mut(), cost_to_target(cost)) {
            surrogate.update(point, target);
        }

        if outcome.restarted {
            info!(
                restart_count = self.state.restart_count,
                length = self.state.length,
                "trust region restarted"
            );
        } else if outcome.expanded || outcome.shrunk {
            debug!(from = before, to = outcome.length, "trust region resized");
        }
        if outcome.improved {
            debug!(point = %point, cost, "new incumbent");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pimforge_design::PENALTY_FLOOR;

    fn quadratic(point: &DesignPoint) -> f64 {
        let target = [6, 20, 22];
        1.0 + point
            .coords()
            .iter()
            .zip(target)
            .map(|(&v, t)| ((v - t) as f64).powi(2))
            .sum::<f64>()
    }

    #[test]
    fn test_propose_inside_window_every_iteration() {
        let mut opt = TrustRegionOptimizer::new(DesignSpace::pim_default(), SearchConfig::default());
        for _ in 0..40 {
            let window = opt.window();
            let point = opt.propose();
            assert!(window.contains(&point), "{} outside {:?}", point, window);
            assert!(opt.space().contains(&point));
            let cost = quadratic(&point);
            opt.update(&point, cost);
        }
        assert_eq!(opt.proposals(), 40);
        assert_eq!(opt.history().len(), 40);
    }

    #[test]
    fn test_search_improves_on_quadratic() {
        let mut opt = TrustRegionOptimizer::new(DesignSpace::pim_default(), SearchConfig::default());
        let mut first = None;
        for _ in 0..60 {
            let point = opt.propose();
            let cost = quadratic(&point);
            first.get_or_insert(cost);
            opt.update(&point, cost);
        }
        let (_, best) = opt.best().unwrap();
        assert!(best <= first.unwrap());
        assert!(best < 50.0, "best = {}", best);
    }

    #[test]
    fn test_all_penalties_leave_no_incumbent() {
        let config = SearchConfig {
            surrogate: pimforge_design::SurrogateConfig {
                enabled: false,
                ..Default::default()
            },
            ..SearchConfig::default()
        };
        let mut opt = TrustRegionOptimizer::new(DesignSpace::pim_default(), config);
        for _ in 0..12 {
            let point = opt.propose();
            opt.update(&point, PENALTY_FLOOR);
        }
        assert!(opt.best().is_none());
        assert!(opt.best_found().is_none());
        assert_eq!(opt.window(), Window::full(opt.space()));
        assert_eq!(opt.state().restart_count, 1);
    }

    #[test]
    fn test_checkpoint_restores_state() {
        let mut opt = TrustRegionOptimizer::new(DesignSpace::pim_default(), SearchConfig::default());
        for _ in 0..8 {
            let point = opt.propose();
            opt.update(&point, quadratic(&point));
        }
        let snapshot = opt.checkpoint();
        let restored = TrustRegionOptimizer::from_checkpoint(SearchConfig::default(), snapshot).unwrap();
        assert_eq!(restored.state(), opt.state());
        assert_eq!(restored.history(), opt.history());
        assert_eq!(restored.window(), opt.window());
        assert_eq!(restored.proposals(), 8);
        assert_eq!(restored.best_found(), opt.best_found());
    }

    #[test]
    fn test_best_found_survives_forgetting_restart() {
        let config = SearchConfig {
            restart: pimforge_design::RestartPolicy::ForgetIncumbent,
            ..SearchConfig::default()
        };
        let mut opt = TrustRegionOptimizer::new(DesignSpace::pim_default(), config);
        let first = opt.propose();
        opt.update(&first, 1.0e6);
        while opt.state().restart_count == 0 {
            let point = opt.propose();
            opt.update(&point, PENALTY_FLOOR);
        }
        assert!(opt.best().is_none());
        assert_eq!(opt.best_found(), Some((&first, 1.0e6)));
    }
}
