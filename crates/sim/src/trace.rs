//! Bounded access-trace synthesis.
//!
//! The memory co-simulator is far too slow to replay every off-chip access
//! of a layer, so a capped trace is synthesised and the simulated metrics are
//! extrapolated by `scale_factor = real accesses / synthesised requests`.

use crate::error::ArtifactError;
use crate::parser::TimingStats;
use pimforge_design::{ScheduleMode, TraceConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const BASE_ADDRESS: u64 = 0x10_0000;
const LINE_BYTES: u64 = 64;
const ADDRESS_MASK: u64 = 0xFFFF_FFFF;

/// How many requests to synthesise and how to scale their results back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePlan {
    pub real_accesses: u64,
    pub requests: usize,
    pub scale_factor: f64,
    /// True when the access count was estimated from cycles.
    pub estimated: bool,
}

impl TracePlan {
    pub fn new(real_accesses: u64, max_requests: usize) -> Self {
        let real_accesses = real_accesses.max(1);
        let requests = usize::try_from(real_accesses)
            .unwrap_or(usize::MAX)
            .clamp(1, max_requests.max(1));
        Self {
            real_accesses,
            requests,
            scale_factor: real_accesses as f64 / requests as f64,
            estimated: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRequest {
    pub address: u64,
    pub write: bool,
}

impl TraceRequest {
    pub fn line(&self) -> String {
        format!("0x{:X} {}", self.address, if self.write { 'W' } else { 'R' })
    }
}

#[derive(Debug, Clone)]
pub struct TraceSynthesizer {
    config: TraceConfig,
}

impl TraceSynthesizer {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    /// Real access count from the parsed off-chip traffic, or a cycle-based
    /// estimate when the stats carried none.
    pub fn plan(&self, stats: &TimingStats, mode: ScheduleMode) -> TracePlan {
        let measured = stats.offchip_accesses();
        if measured > 0 {
            return TracePlan::new(measured, self.config.max_requests);
        }
        let probability = match mode {
            ScheduleMode::Spatial => self.config.spatial_access_probability,
            ScheduleMode::Baseline => self.config.baseline_access_probability,
        };
        let estimate = (stats.cycles as f64 * probability).round().max(1.0) as u64;
        TracePlan {
            estimated: true,
            ..TracePlan::new(estimate, self.config.max_requests)
        }
    }

    /// Spatial mode streams through memory one line at a time; baseline
    /// occasionally jumps to a random aligned address.
    pub fn synthesize(&self, plan: &TracePlan, mode: ScheduleMode, seed: u64) -> Vec<TraceRequest> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut address = BASE_ADDRESS;
        (0..plan.requests)
            .map(|_| {
                let write = rng.f64() < self.config.write_ratio;
                let jump = mode == ScheduleMode::Baseline
                    && rng.f64() < self.config.baseline_jump_probability;
                address = if jump {
                    rng.u64(0..=ADDRESS_MASK) & !(LINE_BYTES - 1)
                } else {
                    (address + LINE_BYTES) & ADDRESS_MASK
                };
                TraceRequest { address, write }
            })
            .collect()
    }

    /// Plan, synthesise and write the trace file.
    pub fn write_trace(
        &self,
        stats: &TimingStats,
        mode: ScheduleMode,
        seed: u64,
        path: &Path,
    ) -> Result<TracePlan, ArtifactError> {
        let plan = self.plan(stats, mode);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        for request in self.synthesize(&plan, mode, seed) {
            writeln!(out, "{}", request.line())?;
        }
        out.flush()?;
        Ok(plan)
    }
}

/// Deterministic trace seed for one (iteration, layer, mode).
pub fn trace_seed(base: u64, iteration: usize, layer: usize, mode: ScheduleMode) -> u64 {
    let mut x = base
        ^ (iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (layer as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (mode as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    // splitmix64 finaliser
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
