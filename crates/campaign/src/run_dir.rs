//! On-disk layout of one campaign run.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, Utc};
use pimforge_design::CodesignConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Written once as `config.yaml` when a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub created_at: DateTime<Utc>,
    pub version: String,
    pub config: CodesignConfig,
}

/// `run_<YYYYmmdd_HHMMSS>/` with the config, log, checkpoint and iteration artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    root: PathBuf,
}

impl RunDirectory {
    /// Create a fresh timestamped run directory under `output_root`.
    pub fn create(output_root: &Path) -> Result<Self> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut root = output_root.join(format!("run_{}", stamp));
        let mut suffix = 1;
        while root.exists() {
            root = output_root.join(format!("run_{}_{}", stamp, suffix));
            suffix += 1;
        }
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create run directory {}", root.display()))?;
        let run = Self { root };
        fs::create_dir_all(run.checkpoint_dir())?;
        fs::create_dir_all(run.iterations_dir())?;
        Ok(run)
    }

    /// Reopen an existing run, e.g. the one owning a checkpoint being resumed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(anyhow!("run directory {} does not exist", root.display()));
        }
        let run = Self { root };
        fs::create_dir_all(run.checkpoint_dir())?;
        fs::create_dir_all(run.iterations_dir())?;
        Ok(run)
    }

    /// The run owning `<run>/checkpoints/<file>`.
    pub fn from_checkpoint(checkpoint: &Path) -> Result<Self> {
        let root = checkpoint
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| anyhow!("checkpoint {} is not inside a run directory", checkpoint.display()))?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join("campaign.jsonl")
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.root.join("checkpoints")
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.checkpoint_dir().join("search_state.json")
    }

    pub fn iterations_dir(&self) -> PathBuf {
        self.root.join("iterations")
    }

    pub fn write_metadata(&self, config: &CodesignConfig) -> Result<()> {
        let metadata = RunMetadata {
            created_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: config.clone(),
        };
        let yaml = serde_yaml::to_string(&metadata)?;
        fs::write(self.config_path(), yaml)
            .with_context(|| format!("failed to write {}", self.config_path().display()))?;
        Ok(())
    }

    pub fn read_metadata(&self) -> Result<RunMetadata> {
        let text = fs::read_to_string(self.config_path())
            .with_context(|| format!("failed to read {}", self.config_path().display()))?;
        Ok(serde_yaml::from_str(&text)?)
    }
}
