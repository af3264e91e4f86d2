//! Evaluation pipeline: one design point in, one scalar cost out.
//!
//! ```text
//! render design ─▶ mapping ─▶ timing/area sim ─▶ parse ─▶ area check
//!                                                             │
//!        cost ◀─ aggregate ◀─ memory/network sim ◀─ trace ◀───┘
//! ```
//!
//! Stages one to four fail hard with a fixed penalty cost. The area check
//! scales the cost (or aborts, by policy). Trace synthesis and memory
//! co-simulation fall back to a conservative latency instead of failing.

pub mod aggregate;
pub mod pipeline;
pub mod workspace;

pub use aggregate::{area_penalty_factor, combine_latency, masking_alpha, LayerMetrics, LayerTotals};
pub use pipeline::{EvaluationPipeline, Evaluator};
pub use workspace::Workspace;
