//! Sample-efficient search over the integer design space.
//!
//! The outer loop is a trust region that doubles after a run of improvements,
//! halves after a run of misses and restarts once it shrinks below its
//! minimum length. Candidates inside the current window come from an inner
//! sampler; an optional Gaussian-process surrogate ranks many cheap
//! candidates so that only one expensive evaluation is spent per iteration.
//!
//! ```text
//! ┌──────────────┐  window  ┌──────────────┐  candidates  ┌──────────────┐
//! │ TrustRegion  │─────────▶│ Sampler      │─────────────▶│ Surrogate    │
//! │ State        │◀─────────│ (TPE/uniform)│              │ (GP + UCB)   │
//! └──────────────┘  update  └──────────────┘              └──────────────┘
//! ```
//!
//! # Key Components
//!
//! - [`trust_region::TrustRegionState`]: length/counter state machine and window bounds
//! - [`sampler::CandidateSampler`]: pluggable inner proposer with a uniform fallback
//! - [`surrogate::SurrogateModel`]: incrementally refit regression with UCB scores
//! - [`optimizer::TrustRegionOptimizer`]: `propose` / `update` contract
//! - [`checkpoint::SearchCheckpoint`]: JSON snapshot for resuming a campaign

pub mod checkpoint;
pub mod optimizer;
pub mod sampler;
pub mod surrogate;
pub mod trust_region;

pub use checkpoint::SearchCheckpoint;
pub use optimizer::TrustRegionOptimizer;
pub use sampler::{best_observation, CandidateSampler, Observation, SamplerError, TpeSampler, UniformSampler};
pub use surrogate::{cost_to_target, Prediction, SurrogateModel};
pub use trust_region::{Bound, RegionUpdate, TrustRegionState, Window};
