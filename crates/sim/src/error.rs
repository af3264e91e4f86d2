use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce or read a file-based artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("template not found: {}", .0.display())]
    MissingTemplate(PathBuf),

    #[error("unresolved placeholders: {}", .0.join(", "))]
    Unresolved(Vec<String>),

    #[error("invalid parameter {key}={value}: {reason}")]
    InvalidParameter {
        key: String,
        value: String,
        reason: String,
    },

    #[error("malformed artifact: {0}")]
    Malformed(String),

    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
