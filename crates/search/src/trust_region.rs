//! Trust-region state machine and window computation.

use pimforge_design::{is_penalty_cost, DesignPoint, DesignSpace, RestartPolicy, SearchConfig};
use serde::{Deserialize, Serialize};

/// Closed integer interval for one dimension of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    pub low: i64,
    pub high: i64,
}

impl Bound {
    pub fn width(&self) -> i64 {
        self.high - self.low
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// The currently published search window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub bounds: Vec<Bound>,
}

impl Window {
    /// The whole domain, unrestricted.
    pub fn full(space: &DesignSpace) -> Self {
        Self {
            bounds: space
                .dimensions
                .iter()
                .map(|d| Bound {
                    low: d.low,
                    high: d.high,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn contains(&self, point: &DesignPoint) -> bool {
        point.len() == self.bounds.len()
            && self
                .bounds
                .iter()
                .zip(point.coords())
                .all(|(b, &v)| b.contains(v))
    }

    /// True when every dimension is pinned to a single value.
    pub fn is_degenerate(&self) -> bool {
        self.bounds.iter().all(|b| b.width() <= 0)
    }

    /// True when the window lies inside `space`.
    pub fn within(&self, space: &DesignSpace) -> bool {
        self.bounds.len() == space.len()
            && self
                .bounds
                .iter()
                .zip(&space.dimensions)
                .all(|(b, d)| b.low >= d.low && b.high <= d.high && b.low <= b.high)
    }

    /// Draw a point uniformly from the window. Never fails.
    pub fn sample_uniform(&self, rng: &mut fastrand::Rng) -> DesignPoint {
        DesignPoint::new(
            self.bounds
                .iter()
                .map(|b| {
                    if b.high > b.low {
                        rng.i64(b.low..=b.high)
                    } else {
                        b.low
                    }
                })
                .collect(),
        )
    }
}

/// What one `update` call did to the region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionUpdate {
    pub improved: bool,
    pub expanded: bool,
    pub shrunk: bool,
    pub restarted: bool,
    pub length: f64,
}

/// Length, counters and incumbent of the trust region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustRegionState {
    pub length: f64,
    pub length_init: f64,
    pub length_min: f64,
    pub length_max: f64,
    pub succ_tol: u32,
    pub fail_tol: u32,
    pub success_counter: u32,
    pub failure_counter: u32,
    #[serde(with = "finite_or_null")]
    pub best_value: f64,
    pub best_point: Option<DesignPoint>,
    pub restart_count: u32,
    pub restart_policy: RestartPolicy,
}

impl TrustRegionState {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            length: config.length_init,
            length_init: config.length_init,
            length_min: config.length_min,
            length_max: config.length_max,
            succ_tol: config.succ_tol,
            fail_tol: config.fail_tol,
            success_counter: 0,
            failure_counter: 0,
            best_value: f64::INFINITY,
            best_point: None,
            restart_count: 0,
            restart_policy: config.restart,
        }
    }

    /// Fold one evaluated cost into the region.
    ///
    /// Penalty costs never become the incumbent; they count as misses.
    pub fn update(&mut self, point: &DesignPoint, cost: f64) -> RegionUpdate {
        let mut outcome = RegionUpdate::default();

        if !is_penalty_cost(cost) && cost < self.best_value {
            self.best_value = cost;
            self.best_point = Some(point.clone());
            self.success_counter += 1;
            self.failure_counter = 0;
            outcome.improved = true;
        } else {
            self.failure_counter += 1;
            self.success_counter = 0;
        }

        if self.success_counter >= self.succ_tol {
            self.length = (self.length * 2.0).min(self.length_max);
            self.success_counter = 0;
            outcome.expanded = true;
        }

        if self.failure_counter >= self.fail_tol {
            self.length /= 2.0;
            self.failure_counter = 0;
            outcome.shrunk = true;
        }

        if self.length < self.length_min {
            self.restart();
            outcome.restarted = true;
        }

        outcome.length = self.length;
        outcome
    }

    fn restart(&mut self) {
        self.length = self.length_init;
        self.success_counter = 0;
        self.failure_counter = 0;
        self.restart_count += 1;
        if self.restart_policy == RestartPolicy::ForgetIncumbent {
            self.best_value = f64::INFINITY;
            self.best_point = None;
        }
    }

    /// Window centred on the incumbent, or the full domain when there is none.
    pub fn bounds(&self, space: &DesignSpace) -> Window {
        let center = match &self.best_point {
            Some(p) if p.len() == space.len() => p,
            _ => return Window::full(space),
        };

        let bounds = space
            .dimensions
            .iter()
            .zip(center.coords())
            .map(|(dim, &c)| {
                let radius = ((self.length * dim.span() as f64) / 2.0).floor() as i64;
                let radius = radius.max(1);
                let c = dim.clamp(c);
                let mut low = dim.low.max(c - radius);
                let mut high = dim.high.min(c + radius);

                if low >= high {
                    if high < dim.high {
                        high += 1;
                    } else if low > dim.low {
                        low -= 1;
                    }
                }
                Bound { low, high }
            })
            .collect();

        Window { bounds }
    }
}

/// Serialises non-finite floats as `null` and reads `null` back as +inf.
pub(crate) mod finite_or_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
