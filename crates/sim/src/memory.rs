//! Memory/network co-simulator adapter.

use crate::error::ArtifactError;
use crate::stage::Invocation;
use pimforge_design::{ToolCommand, ToolConfig};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static PACKET_LATENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Packet latency average = ([\d.]+)").expect("Invalid packet latency regex")
});

/// Raw (unscaled) co-simulation results for one synthesised trace.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MemoryStats {
    pub cycles: f64,
    pub avg_network_latency: f64,
    pub noc_energy_pj: f64,
}

#[derive(Debug, Clone)]
pub struct MemorySimulator {
    command: ToolCommand,
    memory_config: PathBuf,
    stats_file: String,
    timeout: Duration,
}

impl MemorySimulator {
    pub fn new(tools: &ToolConfig, timeout: Duration) -> Self {
        Self {
            command: tools.memory.clone(),
            memory_config: tools.memory_config.clone(),
            stats_file: tools.memory_stats_file.clone(),
            timeout,
        }
    }

    pub fn with_memory_config(mut self, path: PathBuf) -> Self {
        self.memory_config = path;
        self
    }

    pub fn stats_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.stats_file)
    }

    /// `<program> <args..> --config <cfg> --stats <out> --trace <trace> [--network-config <noc>]`
    pub fn invocation(&self, trace: &Path, network: Option<&Path>, out_dir: &Path) -> Invocation {
        let stats = self.stats_path(out_dir);
        let mut invocation = Invocation::new(&self.command.program, out_dir, self.timeout)
            .args(self.command.args.iter().cloned())
            .arg("--config")
            .path_arg(&self.memory_config)
            .arg("--stats")
            .path_arg(&stats)
            .arg("--trace")
            .path_arg(trace);
        if let Some(noc) = network {
            invocation = invocation.arg("--network-config").path_arg(noc);
        }
        invocation
            .expect_output(stats)
            .log_to(out_dir.join("memory.log"))
    }

    pub fn read_stats(&self, out_dir: &Path) -> Result<MemoryStats, ArtifactError> {
        parse_memory_stats(&fs::read_to_string(self.stats_path(out_dir))?)
    }
}

fn stat_value(line: &str) -> Option<(&str, f64)> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    let value = parts.next()?.parse::<f64>().ok()?;
    Some((name, value))
}

fn stat_is(name: &str, key: &str) -> bool {
    name == key || name.rsplit('.').next() == Some(key)
}

/// Parse `<prefix>.<stat> <value>` lines.
///
/// `dram_cycles` is preferred over `cpu_cycles`; a missing or non-positive
/// cycle count is an error.
pub fn parse_memory_stats(content: &str) -> Result<MemoryStats, ArtifactError> {
    let mut dram_cycles = None;
    let mut cpu_cycles = None;
    let mut stats = MemoryStats::default();

    for (name, value) in content.lines().filter_map(stat_value) {
        if stat_is(name, "dram_cycles") && dram_cycles.is_none() {
            dram_cycles = Some(value);
        } else if stat_is(name, "cpu_cycles") && cpu_cycles.is_none() {
            cpu_cycles = Some(value);
        } else if stat_is(name, "avg_network_latency") {
            stats.avg_network_latency = value;
        } else if stat_is(name, "noc_energy") || stat_is(name, "power") {
            stats.noc_energy_pj = value;
        }
    }

    if stats.avg_network_latency == 0.0 {
        if let Some(v) = PACKET_LATENCY
            .captures(content)
            .and_then(|c| c[1].parse::<f64>().ok())
        {
            stats.avg_network_latency = v;
        }
    }

    stats.cycles = dram_cycles
        .or(cpu_cycles)
        .filter(|c| *c > 0.0 && c.is_finite())
        .ok_or_else(|| ArtifactError::Parse("memory stats carry no positive cycle count".into()))?;
    Ok(stats)
}
