//! Gaussian-process surrogate used to rank cheap candidates.
//!
//! Inputs are normalised to `[0, 1]` per dimension, targets are
//! standardised, and the model is refit from scratch on every update with an
//! RBF kernel and a Cholesky solve. Histories here are tens to a few hundred
//! points, so the cubic refit is negligible next to one simulator call.

use ndarray::{Array1, Array2};
use pimforge_design::{is_penalty_cost, DesignPoint, DesignSpace, SurrogateConfig};
use tracing::warn;

/// Point estimate with uncertainty, in target units (higher is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub mean: f64,
    pub std: f64,
    pub ucb: f64,
}

/// Monotone transform of cost so that higher is better.
///
/// Penalty and non-positive costs carry no usable signal and map to `None`.
pub fn cost_to_target(cost: f64) -> Option<f64> {
    if is_penalty_cost(cost) || cost <= 0.0 {
        None
    } else {
        Some(-cost.log10())
    }
}

struct Fitted {
    chol: Array2<f64>,
    alpha: Array1<f64>,
    y_mean: f64,
    y_std: f64,
}

pub struct SurrogateModel {
    lows: Vec<f64>,
    spans: Vec<f64>,
    config: SurrogateConfig,
    inputs: Vec<Vec<f64>>,
    targets: Vec<f64>,
    fitted: Option<Fitted>,
}

impl SurrogateModel {
    pub fn new(space: &DesignSpace, config: SurrogateConfig) -> Self {
        Self {
            lows: space.dimensions.iter().map(|d| d.low as f64).collect(),
            spans: space
                .dimensions
                .iter()
                .map(|d| (d.span() as f64).max(1.0))
                .collect(),
            config,
            inputs: Vec::new(),
            targets: Vec::new(),
            fitted: None,
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// True once enough observations exist and the last refit succeeded.
    pub fn is_ready(&self) -> bool {
        self.fitted.is_some() && self.len() >= self.config.min_observations
    }

    /// Add one observation and refit.
    pub fn update(&mut self, point: &DesignPoint, target: f64) {
        if !target.is_finite() || point.len() != self.lows.len() {
            return;
        }
        self.inputs.push(self.normalise(point));
        self.targets.push(target);
        self.fitted = self.fit();
        if self.fitted.is_none() {
            warn!(
                observations = self.len(),
                "surrogate refit failed; ranking disabled until next update"
            );
        }
    }

    /// Posterior mean, standard deviation and upper confidence bound.
    ///
    /// Before the first successful fit this returns the unit prior.
    pub fn predict(&self, point: &DesignPoint) -> Prediction {
        let z = self.config.ucb_z;
        let fitted = match &self.fitted {
            Some(f) if point.len() == self.lows.len() => f,
            _ => {
                return Prediction {
                    mean: 0.0,
                    std: 1.0,
                    ucb: z,
                }
            }
        };

        let x = self.normalise(point);
        let k_star = Array1::from_iter(self.inputs.iter().map(|xi| self.kernel(xi, &x)));
        let mean_n = k_star.dot(&fitted.alpha);
        let v = forward_substitute(&fitted.chol, &k_star);
        let var_n = (1.0 - v.dot(&v)).max(0.0);

        let mean = mean_n * fitted.y_std + fitted.y_mean;
        let std = var_n.sqrt() * fitted.y_std;
        Prediction {
            mean,
            std,
            ucb: mean + z * std,
        }
    }

    fn normalise(&self, point: &DesignPoint) -> Vec<f64> {
        point
            .coords()
            .iter()
            .zip(self.lows.iter().zip(&self.spans))
            .map(|(&v, (low, span))| (v as f64 - low) / span)
            .collect()
    }

    fn kernel(&self, a: &[f64], b: &[f64]) -> f64 {
        let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
        (-sq / (2.0 * self.config.length_scale.powi(2))).exp()
    }

    fn fit(&self) -> Option<Fitted> {
        let n = self.targets.len();
        if n == 0 {
            return None;
        }

        let y_mean = self.targets.iter().sum::<f64>() / n as f64;
        let var = self.targets.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>() / n as f64;
        let y_std = if var > 1e-24 { var.sqrt() } else { 1.0 };
        let y = Array1::from_iter(self.targets.iter().map(|t| (t - y_mean) / y_std));

        let mut k = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let value = self.kernel(&self.inputs[i], &self.inputs[j]);
                k[[i, j]] = value;
                k[[j, i]] = value;
            }
            k[[i, i]] += self.config.noise;
        }

        let chol = cholesky(&k)?;
        let tmp = forward_substitute(&chol, &y);
        let alpha = back_substitute_transposed(&chol, &tmp);
        if alpha.iter().any(|a| !a.is_finite()) {
            return None;
        }

        Some(Fitted {
            chol,
            alpha,
            y_mean,
            y_std,
        })
    }
}

/// Lower-triangular `L` with `L Lᵀ = a`, or `None` if `a` is not positive definite.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solve `L x = b`.
fn forward_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut x = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    x
}

/// Solve `Lᵀ x = b`.
fn back_substitute_transposed(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = b[i];
        for k in i + 1..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    x
}
