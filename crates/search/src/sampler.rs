//! Inner candidate samplers restricted to the trust-region window.

use crate::trust_region::{finite_or_null, Bound, Window};
use pimforge_design::{is_penalty_cost, DesignPoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest per-dimension window the Parzen sampler will histogram.
const MAX_DISCRETE_RANGE: i64 = 1 << 16;

#[derive(Debug, Error, PartialEq)]
pub enum SamplerError {
    #[error("window is degenerate: every dimension is pinned")]
    DegenerateWindow,

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("no candidate found after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// One completed evaluation as seen by the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub point: DesignPoint,
    #[serde(with = "finite_or_null")]
    pub cost: f64,
}

/// Lowest non-penalty observation; the earliest wins ties.
///
/// Independent of the trust region's incumbent, which a restart may clear.
pub fn best_observation(history: &[Observation]) -> Option<&Observation> {
    history
        .iter()
        .filter(|obs| !is_penalty_cost(obs.cost))
        .fold(None, |best: Option<&Observation>, obs| match best {
            Some(b) if b.cost <= obs.cost => Some(b),
            _ => Some(obs),
        })
}

/// Proposes one point inside a window given the evaluation history.
pub trait CandidateSampler: Send + Sync {
    fn name(&self) -> &str;

    fn sample(
        &self,
        window: &Window,
        history: &[Observation],
        rng: &mut fastrand::Rng,
    ) -> Result<DesignPoint, SamplerError>;
}

/// Uniform draw over the window; the fallback of last resort.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl CandidateSampler for UniformSampler {
    fn name(&self) -> &str {
        "uniform"
    }

    fn sample(
        &self,
        window: &Window,
        _history: &[Observation],
        rng: &mut fastrand::Rng,
    ) -> Result<DesignPoint, SamplerError> {
        Ok(window.sample_uniform(rng))
    }
}

/// Per-dimension Parzen estimator over integer values.
///
/// Observations are split at the `gamma` quantile into good and bad sets;
/// each coordinate is drawn with probability proportional to `l(x) / g(x)`
/// using Laplace-smoothed histograms over the window.
#[derive(Debug, Clone)]
pub struct TpeSampler {
    gamma: f64,
    n_startup: usize,
}

impl TpeSampler {
    pub fn new(n_startup: usize) -> Self {
        Self {
            gamma: 0.25,
            n_startup,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(0.01, 0.99);
        self
    }

    fn sample_dimension(
        &self,
        bound: &Bound,
        good: &[i64],
        bad: &[i64],
        rng: &mut fastrand::Rng,
    ) -> Result<i64, SamplerError> {
        if bound.width() <= 0 {
            return Ok(bound.low);
        }
        if bound.width() > MAX_DISCRETE_RANGE {
            return Err(SamplerError::Numerical(format!(
                "window of width {} is too wide to histogram",
                bound.width()
            )));
        }

        let range = (bound.width() + 1) as usize;
        let mut good_counts = vec![1.0_f64; range];
        let mut bad_counts = vec![1.0_f64; range];
        for &v in good.iter().filter(|v| bound.contains(**v)) {
            good_counts[(v - bound.low) as usize] += 1.0;
        }
        for &v in bad.iter().filter(|v| bound.contains(**v)) {
            bad_counts[(v - bound.low) as usize] += 1.0;
        }
        let good_total: f64 = good_counts.iter().sum();
        let bad_total: f64 = bad_counts.iter().sum();

        let weights: Vec<f64> = good_counts
            .iter()
            .zip(&bad_counts)
            .map(|(l, g)| (l / good_total) / (g / bad_total))
            .collect();
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(SamplerError::Numerical(format!(
                "density ratio sums to {}",
                total
            )));
        }

        let r = rng.f64() * total;
        let mut cumsum = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumsum += w;
            if r < cumsum {
                return Ok(bound.low + i as i64);
            }
        }
        Ok(bound.high)
    }
}

impl CandidateSampler for TpeSampler {
    fn name(&self) -> &str {
        "tpe"
    }

    fn sample(
        &self,
        window: &Window,
        history: &[Observation],
        rng: &mut fastrand::Rng,
    ) -> Result<DesignPoint, SamplerError> {
        if window.is_degenerate() {
            return Err(SamplerError::DegenerateWindow);
        }

        let mut scored: Vec<&Observation> = history
            .iter()
            .filter(|o| o.point.len() == window.len())
            .collect();
        if scored.len() < self.n_startup.max(2) {
            return Ok(window.sample_uniform(rng));
        }

        // Penalties sort last so they always land in the bad set.
        scored.sort_by(|a, b| {
            let ka = if is_penalty_cost(a.cost) { f64::INFINITY } else { a.cost };
            let kb = if is_penalty_cost(b.cost) { f64::INFINITY } else { b.cost };
            ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
        });
        let n_good = ((scored.len() as f64) * self.gamma).ceil() as usize;
        let n_good = n_good.max(1).min(scored.len() - 1);
        let (good, bad) = scored.split_at(n_good);

        let coords = window
            .bounds
            .iter()
            .enumerate()
            .map(|(dim, bound)| {
                let good: Vec<i64> = good.iter().filter_map(|o| o.point.get(dim)).collect();
                let bad: Vec<i64> = bad.iter().filter_map(|o| o.point.get(dim)).collect();
                self.sample_dimension(bound, &good, &bad, rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DesignPoint::new(coords))
    }
}

/// Draw from `sampler`, falling back to a uniform draw on any failure.
///
/// Returns the point and whether the fallback was used. Never fails.
pub fn sample_with_fallback(
    sampler: &dyn CandidateSampler,
    window: &Window,
    history: &[Observation],
    rng: &mut fastrand::Rng,
) -> (DesignPoint, Option<SamplerError>) {
    match sampler.sample(window, history, rng) {
        Ok(point) if window.contains(&point) => (point, None),
        Ok(point) => (
            window.sample_uniform(rng),
            Some(SamplerError::Numerical(format!(
                "{} proposed {} outside the window",
                sampler.name(),
                point
            ))),
        ),
        Err(e) => (window.sample_uniform(rng), Some(e)),
    }
}
