//! Typed configuration for the co-design loop.
//!
//! A single [`CodesignConfig`] is loaded once (YAML), validated, and then
//! shared read-only by the optimizer, the pipeline and the campaign driver.
//! Unknown keys are rejected so a mis-cased or misspelled knob fails loudly
//! instead of silently falling back to its default.

use crate::mode::ScheduleMode;
use crate::point::{DesignSpace, HardwareParams};
use crate::result::PENALTY_FLOOR;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodesignConfig {
    pub space: DesignSpace,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub hardware_defaults: HardwareDefaults,
    pub tools: ToolConfig,
    pub campaign: CampaignConfig,
}

impl Default for CodesignConfig {
    fn default() -> Self {
        Self {
            space: DesignSpace::pim_default(),
            search: SearchConfig::default(),
            pipeline: PipelineConfig::default(),
            hardware_defaults: HardwareDefaults::default(),
            tools: ToolConfig::default(),
            campaign: CampaignConfig::default(),
        }
    }
}

impl CodesignConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("failed to parse configuration")?;
        config
            .validate()
            .map_err(|e| anyhow!("invalid configuration: {}", e))?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("while loading {}", path.display()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.space.validate()?;
        self.search.validate()?;
        self.pipeline.validate()?;
        self.hardware_defaults.validate()?;
        self.campaign.validate()?;
        Ok(())
    }
}

/// What a trust-region restart does with the incumbent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Reset only the search window; keep best point and value.
    #[default]
    KeepIncumbent,
    /// Reset the window and forget the incumbent.
    ForgetIncumbent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    #[default]
    Tpe,
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub length_init: f64,
    pub length_min: f64,
    pub length_max: f64,
    /// Consecutive improvements before the window doubles.
    pub succ_tol: u32,
    /// Consecutive non-improvements before the window halves.
    pub fail_tol: u32,
    pub restart: RestartPolicy,
    pub seed: u64,
    pub sampler: SamplerKind,
    /// Uniform draws before the Parzen sampler starts modelling.
    pub n_startup: usize,
    pub surrogate: SurrogateConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            length_init: 1.0,
            length_min: 0.5,
            length_max: 2.0,
            succ_tol: 3,
            fail_tol: 5,
            restart: RestartPolicy::KeepIncumbent,
            seed: 42,
            sampler: SamplerKind::Tpe,
            n_startup: 4,
            surrogate: SurrogateConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.length_min > 0.0) {
            return Err("length_min must be > 0".into());
        }
        if self.length_min > self.length_init || self.length_init > self.length_max {
            return Err(format!(
                "Trust region lengths must satisfy min <= init <= max (got {} / {} / {})",
                self.length_min, self.length_init, self.length_max
            ));
        }
        if self.succ_tol == 0 || self.fail_tol == 0 {
            return Err("succ_tol and fail_tol must be > 0".into());
        }
        self.surrogate.validate()
    }
}

/// Inner-loop surrogate ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurrogateConfig {
    pub enabled: bool,
    /// Cheap candidates drawn from the window per outer iteration.
    pub candidates: usize,
    /// Width of the upper confidence bound, in standard deviations.
    pub ucb_z: f64,
    /// RBF length scale on inputs normalised to [0, 1].
    pub length_scale: f64,
    pub noise: f64,
    /// Observations required before the surrogate is consulted.
    pub min_observations: usize,
}

impl Default for SurrogateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            candidates: 256,
            ucb_z: 1.96,
            length_scale: 0.3,
            noise: 1e-4,
            min_observations: 3,
        }
    }
}

impl SurrogateConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.candidates == 0 {
            return Err("surrogate.candidates must be > 0 when enabled".into());
        }
        if !(self.length_scale > 0.0) || !(self.noise > 0.0) {
            return Err("surrogate length_scale and noise must be > 0".into());
        }
        if self.ucb_z < 0.0 {
            return Err("surrogate.ucb_z must be >= 0".into());
        }
        Ok(())
    }
}

/// Policy for designs whose area exceeds the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AreaPolicy {
    /// Keep going and scale cost by `1 + factor * overshoot / limit`.
    Graded { factor: f64 },
    /// Stop after parsing and report the fixed penalty.
    HardAbort,
}

impl Default for AreaPolicy {
    fn default() -> Self {
        AreaPolicy::Graded { factor: 10.0 }
    }
}

/// Latency overlap model used to combine logic and memory cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum AggregationModel {
    /// `max(logic, memory) + network`, with partial overlap credit taken
    /// from the reuse-ratio table when `masking` is set.
    MaxPlusOverlap { masking: bool },
    /// `logic + discount * memory`.
    SerialDiscount { discount: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    pub baseline: AggregationModel,
    pub spatial: AggregationModel,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            baseline: AggregationModel::SerialDiscount { discount: 1.0 },
            spatial: AggregationModel::MaxPlusOverlap { masking: true },
        }
    }
}

impl AggregationConfig {
    pub fn for_mode(&self, mode: ScheduleMode) -> AggregationModel {
        match mode {
            ScheduleMode::Baseline => self.baseline,
            ScheduleMode::Spatial => self.spatial,
        }
    }
}

/// Reuse-ratio lookup for the overlap credit.
///
/// `alphas[i]` applies while `ratio < thresholds[i]`; the last alpha
/// applies above every threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskingTable {
    pub thresholds: Vec<f64>,
    pub alphas: Vec<f64>,
}

impl Default for MaskingTable {
    fn default() -> Self {
        Self {
            thresholds: vec![4.0, 64.0],
            alphas: vec![0.2, 0.6, 0.95],
        }
    }
}

impl MaskingTable {
    pub fn validate(&self) -> Result<(), String> {
        if self.alphas.len() != self.thresholds.len() + 1 {
            return Err(format!(
                "masking table needs {} alphas for {} thresholds, got {}",
                self.thresholds.len() + 1,
                self.thresholds.len(),
                self.alphas.len()
            ));
        }
        if self.thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err("masking thresholds must be strictly increasing".into());
        }
        if self.alphas.iter().any(|a| !(0.0..=1.0).contains(a)) {
            return Err("masking alphas must lie in [0, 1]".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnergyModel {
    pub dram_bank_width_bits: f64,
    pub dram_energy_per_bit_pj: f64,
    /// Background power of the memory stack, in pJ per cycle.
    pub static_power_pj_per_cycle: f64,
    pub noc_energy_weight: f64,
    pub noc_latency_weight: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            dram_bank_width_bits: 128.0,
            dram_energy_per_bit_pj: 1.2,
            static_power_pj_per_cycle: 11.0,
            noc_energy_weight: 0.2,
            noc_latency_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Hard cap on synthesised requests per layer.
    pub max_requests: usize,
    pub write_ratio: f64,
    pub seed: u64,
    /// Per-cycle access probability used when no off-chip counts were parsed.
    pub spatial_access_probability: f64,
    pub baseline_access_probability: f64,
    /// Probability that a baseline access jumps to a random address.
    pub baseline_jump_probability: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_requests: 20_000,
            write_ratio: 0.3,
            seed: 7,
            spatial_access_probability: 0.05,
            baseline_access_probability: 0.15,
            baseline_jump_probability: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub area_limit_mm2: f64,
    pub area_policy: AreaPolicy,
    /// Cost reported for failed evaluations; must be >= `PENALTY_FLOOR`.
    pub penalty_cost: f64,
    pub timing_timeout_s: u64,
    pub memory_timeout_s: u64,
    /// Full-scale memory cycles substituted when co-simulation fails.
    pub memory_fallback_cycles: f64,
    /// Architecture level that spatial mode partitions across nodes.
    pub node_level: String,
    pub trace: TraceConfig,
    pub energy: EnergyModel,
    pub masking: MaskingTable,
    pub aggregation: AggregationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            area_limit_mm2: 48.0,
            area_policy: AreaPolicy::default(),
            penalty_cost: PENALTY_FLOOR,
            timing_timeout_s: 120,
            memory_timeout_s: 120,
            memory_fallback_cycles: 1.0e6,
            node_level: "PIM_Node".into(),
            trace: TraceConfig::default(),
            energy: EnergyModel::default(),
            masking: MaskingTable::default(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn timing_timeout(&self) -> Duration {
        Duration::from_secs(self.timing_timeout_s)
    }

    pub fn memory_timeout(&self) -> Duration {
        Duration::from_secs(self.memory_timeout_s)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.area_limit_mm2 > 0.0) {
            return Err("area_limit_mm2 must be > 0".into());
        }
        if let AreaPolicy::Graded { factor } = self.area_policy {
            if factor < 0.0 {
                return Err("graded area penalty factor must be >= 0".into());
            }
        }
        if !(self.penalty_cost >= PENALTY_FLOOR) {
            return Err(format!(
                "penalty_cost {} is below the penalty floor {}",
                self.penalty_cost, PENALTY_FLOOR
            ));
        }
        if self.timing_timeout_s == 0 || self.memory_timeout_s == 0 {
            return Err("simulator timeouts must be > 0".into());
        }
        if self.trace.max_requests == 0 {
            return Err("trace.max_requests must be > 0".into());
        }
        if !(0.0..=1.0).contains(&self.trace.write_ratio) {
            return Err("trace.write_ratio must lie in [0, 1]".into());
        }
        if let AggregationModel::SerialDiscount { discount } = self.aggregation.baseline {
            if discount < 0.0 {
                return Err("serial discount must be >= 0".into());
            }
        }
        if let AggregationModel::SerialDiscount { discount } = self.aggregation.spatial {
            if discount < 0.0 {
                return Err("serial discount must be >= 0".into());
            }
        }
        self.masking.validate()
    }
}

/// Fixed default parameter table merged under every rendered design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardwareDefaults {
    pub technology: String,
    pub global_cycle_seconds: f64,
    pub word_bits: u32,
    pub accum_bits: u32,
    pub dram_width: u32,
    pub sram_width: u32,
    pub mac_class: String,
    pub sram_depth: u64,
    pub pe_dim_x: u32,
    pub pe_dim_y: u32,
    pub num_nodes: u32,
    /// Additional template variables; keys are upper-cased once.
    pub extra: BTreeMap<String, String>,
}

impl Default for HardwareDefaults {
    fn default() -> Self {
        Self {
            technology: "28nm".into(),
            global_cycle_seconds: 2.5e-9,
            word_bits: 16,
            accum_bits: 32,
            dram_width: 64,
            sram_width: 64,
            mac_class: "intmac".into(),
            sram_depth: 16384,
            pe_dim_x: 14,
            pe_dim_y: 12,
            num_nodes: 1,
            extra: BTreeMap::new(),
        }
    }
}

impl HardwareDefaults {
    /// Apply point-derived overrides on top of the defaults.
    pub fn with_overrides(&self, params: &HardwareParams) -> Self {
        Self {
            num_nodes: params.nodes,
            pe_dim_x: params.pe_dim,
            pe_dim_y: params.pe_dim,
            sram_depth: params.sram_depth(self.word_bits),
            ..self.clone()
        }
    }

    pub fn pe_count(&self) -> u64 {
        u64::from(self.pe_dim_x) * u64::from(self.pe_dim_y)
    }

    /// Flatten into the template variable table.
    ///
    /// Instance ranges `[0..N]` are inclusive, so templates index them with
    /// the `*_LAST` keys.
    pub fn table(&self) -> BTreeMap<String, String> {
        let mut table = BTreeMap::new();
        for (key, value) in &self.extra {
            table.insert(key.to_ascii_uppercase(), value.clone());
        }
        let fixed = [
            ("TECHNOLOGY", self.technology.clone()),
            ("GLOBAL_CYCLE_SECONDS", format!("{:e}", self.global_cycle_seconds)),
            ("WORD_BITS", self.word_bits.to_string()),
            ("ACCUM_BITS", self.accum_bits.to_string()),
            ("DRAM_WIDTH", self.dram_width.to_string()),
            ("SRAM_WIDTH", self.sram_width.to_string()),
            ("MAC_CLASS", self.mac_class.clone()),
            ("SRAM_DEPTH", self.sram_depth.to_string()),
            ("PE_DIM_X", self.pe_dim_x.to_string()),
            ("PE_DIM_Y", self.pe_dim_y.to_string()),
            ("NUM_NODES", self.num_nodes.to_string()),
            ("NUM_NODES_LAST", self.num_nodes.saturating_sub(1).to_string()),
            ("PE_COUNT_LAST", self.pe_count().saturating_sub(1).to_string()),
        ];
        for (key, value) in fixed {
            table.insert(key.to_string(), value);
        }
        table
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.word_bits == 0 || self.word_bits % 8 != 0 {
            return Err(format!("word_bits must be a positive multiple of 8, got {}", self.word_bits));
        }
        let fixed = [
            "TECHNOLOGY",
            "GLOBAL_CYCLE_SECONDS",
            "WORD_BITS",
            "ACCUM_BITS",
            "DRAM_WIDTH",
            "SRAM_WIDTH",
            "MAC_CLASS",
            "SRAM_DEPTH",
            "PE_DIM_X",
            "PE_DIM_Y",
            "NUM_NODES",
            "NUM_NODES_LAST",
            "PE_COUNT_LAST",
        ];
        let mut seen = std::collections::BTreeSet::new();
        for key in self.extra.keys() {
            let upper = key.to_ascii_uppercase();
            if fixed.contains(&upper.as_str()) {
                return Err(format!("extra key '{}' shadows a typed default", key));
            }
            if !seen.insert(upper) {
                return Err(format!("extra key '{}' duplicates another key up to case", key));
            }
        }
        Ok(())
    }
}

/// An external program plus the arguments that always precede the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ToolCommand {
    fn default() -> Self {
        Self {
            program: "true".into(),
            args: Vec::new(),
        }
    }
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub timing: ToolCommand,
    pub memory: ToolCommand,
    /// Architecture template with `{{ KEY }}` placeholders.
    pub template: PathBuf,
    /// Optional mapper YAML merged under the generated mapping.
    pub mapper_template: Option<PathBuf>,
    /// One workload descriptor per layer.
    pub workloads: Vec<PathBuf>,
    pub component_dir: Option<PathBuf>,
    pub memory_config: PathBuf,
    pub timing_stats_file: String,
    pub timing_area_file: String,
    pub memory_stats_file: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            timing: ToolCommand::new("tl", &["mapper"]),
            memory: ToolCommand::new("ramulator", &["--mode=cpu"]),
            template: PathBuf::from("templates/arch.yaml.tmpl"),
            mapper_template: None,
            workloads: vec![PathBuf::from("configs/prob/layer.yaml")],
            component_dir: None,
            memory_config: PathBuf::from("configs/ramulator/LPDDR4-config.cfg"),
            timing_stats_file: "timeloop-mapper.stats.txt".into(),
            timing_area_file: "timeloop-mapper.ART_summary.yaml".into(),
            memory_stats_file: "memory.stats".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CampaignConfig {
    pub iterations: usize,
    /// Mode whose cost drives the optimizer.
    pub objective_mode: ScheduleMode,
    /// Modes evaluated every iteration.
    pub modes: Vec<ScheduleMode>,
    pub parallel_modes: bool,
    pub checkpoint_every: usize,
    pub output_root: PathBuf,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            objective_mode: ScheduleMode::Spatial,
            modes: vec![ScheduleMode::Baseline, ScheduleMode::Spatial],
            parallel_modes: false,
            checkpoint_every: 5,
            output_root: PathBuf::from("results"),
        }
    }
}

impl CampaignConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.modes.contains(&self.objective_mode) {
            return Err(format!(
                "objective_mode {} is not among the evaluated modes",
                self.objective_mode
            ));
        }
        if self.checkpoint_every == 0 {
            return Err("checkpoint_every must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = CodesignConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.succ_tol, 3);
        assert_eq!(config.search.fail_tol, 5);
    }

    #[test]
    fn test_yaml_overrides_merge_with_defaults() {
        let yaml = r#"
search:
  length_init: 1.0
  fail_tol: 4
pipeline:
  area_limit_mm2: 30.0
  area_policy:
    policy: hard_abort
"#;
        let config = CodesignConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.search.fail_tol, 4);
        assert_eq!(config.search.succ_tol, 3);
        assert_eq!(config.pipeline.area_limit_mm2, 30.0);
        assert_eq!(config.pipeline.area_policy, AreaPolicy::HardAbort);
        assert_eq!(config.space, DesignSpace::pim_default());
    }

    #[test]
    fn test_unknown_and_miscased_keys_rejected() {
        assert!(CodesignConfig::from_yaml_str("search:\n  Fail_Tol: 3\n").is_err());
        assert!(CodesignConfig::from_yaml_str("pipeline:\n  AREA_LIMIT_MM2: 3.0\n").is_err());
    }

    #[test]
    fn test_invalid_lengths_rejected() {
        let yaml = "search:\n  length_min: 1.5\n  length_init: 1.0\n";
        assert!(CodesignConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_penalty_below_floor_rejected() {
        let mut config = CodesignConfig::default();
        config.pipeline.penalty_cost = 1.0e9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masking_table_shape_checked() {
        let mut table = MaskingTable::default();
        assert!(table.validate().is_ok());
        table.alphas.pop();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_hardware_table_overrides() {
        let defaults = HardwareDefaults::default();
        let params = HardwareParams {
            nodes: 8,
            pe_dim: 16,
            sram_bytes: 1 << 18,
        };
        let table = defaults.with_overrides(&params).table();
        assert_eq!(table["NUM_NODES"], "8");
        assert_eq!(table["NUM_NODES_LAST"], "7");
        assert_eq!(table["PE_COUNT_LAST"], "255");
        assert_eq!(table["PE_DIM_X"], "16");
        assert_eq!(table["PE_DIM_Y"], "16");
        assert_eq!(table["SRAM_DEPTH"], (1u64 << 17).to_string());
        assert_eq!(table["TECHNOLOGY"], "28nm");
    }

    #[test]
    fn test_extra_keys_cannot_shadow_or_duplicate() {
        let mut defaults = HardwareDefaults::default();
        defaults.extra.insert("word_bits".into(), "8".into());
        assert!(defaults.validate().is_err());

        let mut defaults = HardwareDefaults::default();
        defaults.extra.insert("bank_count".into(), "4".into());
        defaults.extra.insert("BANK_COUNT".into(), "8".into());
        assert!(defaults.validate().is_err());
    }

    #[test]
    fn test_objective_mode_must_be_evaluated() {
        let mut config = CodesignConfig::default();
        config.campaign.modes = vec![ScheduleMode::Baseline];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_and_roundtrip_yaml() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("codesign.yaml");
        let yaml = CodesignConfig::default().to_yaml()?;
        std::fs::File::create(&path)?.write_all(yaml.as_bytes())?;

        let loaded = CodesignConfig::load(&path)?;
        assert_eq!(loaded, CodesignConfig::default());
        Ok(())
    }

    #[test]
    fn test_example_config_parses() -> Result<()> {
        let config = CodesignConfig::from_yaml_str(include_str!("../../../configs/codesign.yaml"))?;
        assert!(config.validate().is_ok());
        assert_eq!(config.tools.workloads.len(), 4);
        assert_eq!(config.pipeline.area_policy, AreaPolicy::Graded { factor: 10.0 });
        Ok(())
    }
}
