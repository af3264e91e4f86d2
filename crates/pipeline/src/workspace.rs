//! Iteration-scoped artifact directories.

use pimforge_design::ScheduleMode;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `<root>/iter_<NNNN>/<mode>/<layer>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iteration_dir(&self, iteration: usize) -> PathBuf {
        self.root.join(format!("iter_{:04}", iteration))
    }

    pub fn mode_dir(&self, iteration: usize, mode: ScheduleMode) -> PathBuf {
        self.iteration_dir(iteration).join(mode.as_str())
    }

    pub fn layer_dir(&self, iteration: usize, mode: ScheduleMode, layer: &str) -> PathBuf {
        self.mode_dir(iteration, mode).join(layer)
    }

    /// Create an empty mode directory, discarding artifacts of an earlier attempt.
    pub fn fresh_mode_dir(&self, iteration: usize, mode: ScheduleMode) -> io::Result<PathBuf> {
        let dir = self.mode_dir(iteration, mode);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let ws = Workspace::new("/runs/a/iterations");
        assert_eq!(
            ws.layer_dir(7, ScheduleMode::Spatial, "conv1"),
            PathBuf::from("/runs/a/iterations/iter_0007/spatial/conv1")
        );
    }

    #[test]
    fn test_fresh_dir_clears_stale_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path());
        let dir = ws.fresh_mode_dir(1, ScheduleMode::Baseline).unwrap();
        fs::write(dir.join("stale.txt"), "old").unwrap();
        let dir = ws.fresh_mode_dir(1, ScheduleMode::Baseline).unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("stale.txt").exists());
    }
}
