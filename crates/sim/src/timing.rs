//! Timing/area simulator adapter.

use crate::error::ArtifactError;
use crate::parser::{parse_area_summary, parse_timing_stats, TimingStats};
use crate::stage::Invocation;
use pimforge_design::{ToolCommand, ToolConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parsed timing/area outputs for one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingReport {
    pub stats: TimingStats,
    pub area_mm2: f64,
}

#[derive(Debug, Clone)]
pub struct TimingSimulator {
    command: ToolCommand,
    components: Vec<PathBuf>,
    stats_file: String,
    area_file: String,
    timeout: Duration,
}

impl TimingSimulator {
    /// Component library files are every `*.yaml` under `component_dir`, sorted.
    pub fn new(tools: &ToolConfig, timeout: Duration) -> Result<Self, ArtifactError> {
        let components = match &tools.component_dir {
            Some(dir) => list_components(dir)?,
            None => Vec::new(),
        };
        Ok(Self {
            command: tools.timing.clone(),
            components,
            stats_file: tools.timing_stats_file.clone(),
            area_file: tools.timing_area_file.clone(),
            timeout,
        })
    }

    pub fn stats_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.stats_file)
    }

    pub fn area_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.area_file)
    }

    /// `<program> <args..> <arch> <workload> <mapping> <components..> -o <out_dir>`
    pub fn invocation(&self, arch: &Path, workload: &Path, mapping: &Path, out_dir: &Path) -> Invocation {
        let mut invocation = Invocation::new(&self.command.program, out_dir, self.timeout)
            .args(self.command.args.iter().cloned())
            .path_arg(arch)
            .path_arg(workload)
            .path_arg(mapping);
        for component in &self.components {
            invocation = invocation.path_arg(component);
        }
        invocation
            .arg("-o")
            .path_arg(out_dir)
            .expect_output(self.stats_path(out_dir))
            .expect_output(self.area_path(out_dir))
            .log_to(out_dir.join("timing.log"))
    }

    /// Read both output artifacts from `out_dir`.
    pub fn read_report(&self, out_dir: &Path) -> Result<TimingReport, ArtifactError> {
        let stats = parse_timing_stats(&fs::read_to_string(self.stats_path(out_dir))?)?;
        let area_mm2 = parse_area_summary(&fs::read_to_string(self.area_path(out_dir))?)?;
        Ok(TimingReport { stats, area_mm2 })
    }
}

fn list_components(dir: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
