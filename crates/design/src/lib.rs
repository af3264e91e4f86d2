//! Shared vocabulary for PIMForge.
//!
//! Everything that more than one layer of the co-design loop needs to agree
//! on lives here: the integer design space and its points, the scheduling
//! modes, the typed configuration tree, the evaluation result handed back
//! by the pipeline and the error taxonomy used by its stages.
//!
//! # Key Components
//!
//! - [`point::DesignSpace`] / [`point::DesignPoint`]: the bounded integer domain
//! - [`config::CodesignConfig`]: the single immutable configuration object
//! - [`result::EvaluationResult`]: value-out of one pipeline evaluation
//! - [`error::StageError`]: failures tagged with the stage that produced them

pub mod config;
pub mod error;
pub mod mode;
pub mod point;
pub mod result;

pub use config::*;
pub use error::*;
pub use mode::*;
pub use point::*;
pub use result::*;
