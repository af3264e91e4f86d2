//! JSON snapshots of the search state for resuming a campaign.

use crate::sampler::{best_observation, Observation};
use crate::trust_region::{TrustRegionState, Window};
use anyhow::{anyhow, Context, Result};
use pimforge_design::DesignSpace;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCheckpoint {
    pub version: u32,
    pub space: DesignSpace,
    pub state: TrustRegionState,
    pub history: Vec<Observation>,
    pub rng_state: u64,
    pub proposals: usize,
}

impl SearchCheckpoint {
    pub fn new(
        space: DesignSpace,
        state: TrustRegionState,
        history: Vec<Observation>,
        rng_state: u64,
        proposals: usize,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            space,
            state,
            history,
            rng_state,
            proposals,
        }
    }

    pub fn window(&self) -> Window {
        self.state.bounds(&self.space)
    }

    /// Best usable observation in the saved history, whatever the incumbent is.
    pub fn best_found(&self) -> Option<&Observation> {
        best_observation(&self.history)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read checkpoint {}", path.display()))?;
        let checkpoint: Self = serde_json::from_slice(&data)
            .with_context(|| format!("malformed checkpoint {}", path.display()))?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(anyhow!(
                "unsupported checkpoint version {} (expected {})",
                checkpoint.version,
                CHECKPOINT_VERSION
            ));
        }
        Ok(checkpoint)
    }

    /// Written to a sibling temp file, then renamed into place.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let blob = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, path)
            .with_context(|| format!("failed to move checkpoint into {}", path.display()))?;
        Ok(())
    }
}
