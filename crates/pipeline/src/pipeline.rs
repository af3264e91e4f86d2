//! The evaluation pipeline.

use crate::aggregate::{aggregate_layer, area_penalty_factor, edp, LayerMetrics};
use crate::workspace::Workspace;
use anyhow::{anyhow, Context, Result};
use pimforge_design::{
    is_penalty_cost, AreaPolicy, CodesignConfig, DesignPoint, EvaluationResult, HardwareParams,
    Outcome, ScheduleMode, Stage, StageError,
};
use pimforge_sim::mapping::write_mapping;
use pimforge_sim::{
    trace_seed, ArtifactError, DesignRenderer, MemorySimulator, NetworkConfig, ProcessRunner,
    StageRunner, TemplateFile, TimingReport, TimingSimulator, TraceSynthesizer,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Anything that can score a design point. Never fails: failures come back
/// as penalised results.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, point: &DesignPoint, mode: ScheduleMode, iteration: usize) -> EvaluationResult;
}

/// One workload descriptor and the directory name used for its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Layer {
    name: String,
    path: PathBuf,
}

/// Memory-side contribution of one layer, full scale.
#[derive(Debug, Clone, Copy, Default)]
struct MemoryContribution {
    cycles: f64,
    network_cycles: f64,
    network_energy_pj: f64,
    avg_network_latency: f64,
    scale_factor: f64,
    offchip_accesses: f64,
    fallback: bool,
}

pub struct EvaluationPipeline {
    config: Arc<CodesignConfig>,
    workspace: Workspace,
    layers: Vec<Layer>,
    mapper_template: Option<PathBuf>,
    renderer: Box<dyn DesignRenderer>,
    runner: Arc<dyn StageRunner>,
    timing: TimingSimulator,
    memory: MemorySimulator,
    traces: TraceSynthesizer,
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn layer_names(workloads: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(workloads.len());
    for (i, path) in workloads.iter().enumerate() {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("layer{}", i));
        let name = if names.contains(&stem) {
            format!("{}_{}", stem, i)
        } else {
            stem
        };
        names.push(name);
    }
    names
}

/// Map an artifact failure onto the stage taxonomy.
fn stage_error(stage: Stage, err: ArtifactError) -> StageError {
    match err {
        ArtifactError::Io(e) => StageError::io(stage, e),
        ArtifactError::Parse(msg) => StageError::parse(stage, msg),
        ArtifactError::Yaml(e) => StageError::parse(stage, e.to_string()),
        other @ (ArtifactError::MissingTemplate(_)
        | ArtifactError::Unresolved(_)
        | ArtifactError::InvalidParameter { .. }
        | ArtifactError::Malformed(_)) => StageError::config(stage, other.to_string()),
    }
}

impl EvaluationPipeline {
    /// Build a pipeline writing iteration artifacts under `root`, driving the
    /// real simulators.
    pub fn new(config: Arc<CodesignConfig>, root: impl AsRef<Path>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("invalid configuration: {}", e))?;
        if config.tools.workloads.is_empty() {
            return Err(anyhow!("no workloads configured"));
        }

        let mut tools = config.tools.clone();
        tools.template = absolute(&tools.template)?;
        tools.memory_config = absolute(&tools.memory_config)?;
        tools.mapper_template = tools.mapper_template.as_deref().map(absolute).transpose()?;
        tools.component_dir = tools.component_dir.as_deref().map(absolute).transpose()?;
        let workloads = tools
            .workloads
            .iter()
            .map(|p| absolute(p))
            .collect::<Result<Vec<_>>>()?;

        let layers = layer_names(&workloads)
            .into_iter()
            .zip(workloads)
            .map(|(name, path)| Layer { name, path })
            .collect();

        let timing = TimingSimulator::new(&tools, config.pipeline.timing_timeout())
            .with_context(|| "failed to list component library")?;
        let memory = MemorySimulator::new(&tools, config.pipeline.memory_timeout());

        Ok(Self {
            workspace: Workspace::new(absolute(root.as_ref())?),
            layers,
            mapper_template: tools.mapper_template.clone(),
            renderer: Box::new(TemplateFile::new(tools.template.clone())),
            runner: Arc::new(ProcessRunner),
            timing,
            memory,
            traces: TraceSynthesizer::new(config.pipeline.trace.clone()),
            config,
        })
    }

    pub fn with_runner(mut self, runner: Arc<dyn StageRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn DesignRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Run every stage, surfacing the first hard failure with its stage.
    pub fn try_evaluate(
        &self,
        point: &DesignPoint,
        mode: ScheduleMode,
        iteration: usize,
    ) -> Result<EvaluationResult, StageError> {
        let pipeline = &self.config.pipeline;

        // 1. design
        let params = HardwareParams::from_point(&self.config.space, point)
            .map_err(|e| StageError::config(Stage::MaterializeDesign, e))?;
        let dir = self
            .workspace
            .fresh_mode_dir(iteration, mode)
            .map_err(|e| StageError::io(Stage::MaterializeDesign, e))?;
        let table = self.config.hardware_defaults.with_overrides(&params).table();
        let arch = dir.join("arch.yaml");
        self.renderer
            .render_to(&table, &arch)
            .map_err(|e| stage_error(Stage::MaterializeDesign, e))?;

        // 2. mapping
        let mapping = dir.join(format!("mapper_{}.yaml", mode));
        write_mapping(
            self.mapper_template.as_deref(),
            mode,
            params.nodes,
            &pipeline.node_level,
            &mapping,
        )
        .map_err(|e| stage_error(Stage::MaterializeMapping, e))?;

        // 3-4. timing/area per layer
        let mut reports: Vec<(PathBuf, TimingReport)> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let layer_dir = dir.join(&layer.name);
            std::fs::create_dir_all(&layer_dir)
                .map_err(|e| StageError::io(Stage::TimingSimulation, e))?;

            let invocation = self.timing.invocation(&arch, &layer.path, &mapping, &layer_dir);
            let run = self
                .runner
                .run(&invocation)
                .map_err(|e| StageError::simulation(Stage::TimingSimulation, e))?;
            let report = self
                .timing
                .read_report(&layer_dir)
                .map_err(|e| stage_error(Stage::ParseTiming, e))?;
            debug!(
                layer = %layer.name,
                cycles = report.stats.cycles,
                area_mm2 = report.area_mm2,
                elapsed_s = run.elapsed.as_secs_f64(),
                "timing stage done"
            );
            reports.push((layer_dir, report));
        }

        // 5. area budget on the largest layer footprint
        let area = reports.iter().map(|(_, r)| r.area_mm2).fold(0.0, f64::max);
        let limit = pipeline.area_limit_mm2;
        let penalty_factor = match pipeline.area_policy {
            AreaPolicy::Graded { factor } => area_penalty_factor(area, limit, factor),
            AreaPolicy::HardAbort if area > limit => {
                return Err(StageError::constraint(
                    Stage::AreaCheck,
                    format!("area {:.2} mm² exceeds limit {:.2} mm²", area, limit),
                ));
            }
            AreaPolicy::HardAbort => 1.0,
        };
        if penalty_factor > 1.0 {
            warn!(
                point = %point,
                mode = %mode,
                area_mm2 = area,
                limit_mm2 = limit,
                penalty_factor,
                "area budget exceeded"
            );
        }

        // 6-8. trace, memory/network, aggregation per layer
        let model = pipeline.aggregation.for_mode(mode);
        let mut cycles = 0.0;
        let mut energy = 0.0;
        let mut logic_cycles = 0.0;
        let mut memory_cycles = 0.0;
        let mut network_cycles = 0.0;
        let mut latency_sum = 0.0;
        let mut alpha_sum = 0.0;
        let mut scale_max: f64 = 1.0;
        let mut fallbacks = 0usize;

        for (index, (layer_dir, report)) in reports.iter().enumerate() {
            let memory = self.memory_contribution(layer_dir, report, mode, iteration, index, params.nodes);
            let metrics = LayerMetrics {
                logic_cycles: report.stats.cycles as f64,
                logic_energy_pj: report.stats.energy_pj,
                memory_cycles: memory.cycles,
                network_cycles: memory.network_cycles,
                network_energy_pj: memory.network_energy_pj,
                offchip_accesses: memory.offchip_accesses,
                reuse_ratio: report.stats.reuse_ratio(),
            };
            let totals = aggregate_layer(model, &pipeline.masking, &pipeline.energy, &metrics);

            cycles += totals.cycles;
            energy += totals.energy_pj;
            logic_cycles += metrics.logic_cycles;
            memory_cycles += metrics.memory_cycles;
            network_cycles += metrics.network_cycles;
            latency_sum += memory.avg_network_latency;
            alpha_sum += totals.masking_alpha;
            scale_max = scale_max.max(memory.scale_factor);
            fallbacks += usize::from(memory.fallback);
        }

        // 9. cost
        let raw = edp(cycles, energy);
        let cost = raw * penalty_factor;
        if is_penalty_cost(cost) || cost < 0.0 {
            return Err(StageError::constraint(
                Stage::Aggregation,
                format!("cost {:e} is outside the valid range", cost),
            ));
        }

        let layers = reports.len() as f64;
        let outcome = if penalty_factor > 1.0 {
            Outcome::AreaViolation {
                area_mm2: area,
                limit_mm2: limit,
                penalty_factor,
            }
        } else {
            Outcome::Success
        };

        Ok(EvaluationResult {
            cost,
            cycles,
            energy,
            area,
            valid: true,
            detail: BTreeMap::new(),
            outcome,
        }
        .with_detail("layers", layers)
        .with_detail("edp_raw", raw)
        .with_detail("area_penalty", penalty_factor)
        .with_detail("logic_cycles", logic_cycles)
        .with_detail("memory_cycles", memory_cycles)
        .with_detail("network_cycles", network_cycles)
        .with_detail("avg_network_latency", latency_sum / layers.max(1.0))
        .with_detail("masking_alpha", alpha_sum / layers.max(1.0))
        .with_detail("scale_factor", scale_max)
        .with_detail("memory_fallback", fallbacks as f64))
    }

    /// Stages 6 and 7 for one layer. Any failure substitutes the fallback latency.
    fn memory_contribution(
        &self,
        layer_dir: &Path,
        report: &TimingReport,
        mode: ScheduleMode,
        iteration: usize,
        index: usize,
        nodes: u32,
    ) -> MemoryContribution {
        let pipeline = &self.config.pipeline;
        let plan = self.traces.plan(&report.stats, mode);

        match self.simulate_memory(layer_dir, report, mode, iteration, index, nodes) {
            Ok(contribution) => contribution,
            Err(e) => {
                warn!(
                    stage = %e.stage,
                    error = %e.kind,
                    layer = %layer_dir.display(),
                    fallback_cycles = pipeline.memory_fallback_cycles,
                    "memory co-simulation failed; using fallback latency"
                );
                MemoryContribution {
                    cycles: pipeline.memory_fallback_cycles,
                    scale_factor: plan.scale_factor,
                    offchip_accesses: plan.real_accesses as f64,
                    fallback: true,
                    ..MemoryContribution::default()
                }
            }
        }
    }

    fn simulate_memory(
        &self,
        layer_dir: &Path,
        report: &TimingReport,
        mode: ScheduleMode,
        iteration: usize,
        index: usize,
        nodes: u32,
    ) -> Result<MemoryContribution, StageError> {
        let pipeline = &self.config.pipeline;

        // 6. trace
        let trace = layer_dir.join(format!("dram_{}.trace", mode));
        let seed = trace_seed(pipeline.trace.seed, iteration, index, mode);
        let plan = self
            .traces
            .write_trace(&report.stats, mode, seed, &trace)
            .map_err(|e| stage_error(Stage::TraceSynthesis, e))?;

        // 7. memory/network
        let network = if nodes > 1 {
            let path = layer_dir.join("noc_config.cfg");
            NetworkConfig::for_nodes(nodes)
                .write(&path)
                .map_err(|e| StageError::io(Stage::MemorySimulation, e))?;
            Some(path)
        } else {
            None
        };
        let invocation = self.memory.invocation(&trace, network.as_deref(), layer_dir);
        self.runner
            .run(&invocation)
            .map_err(|e| StageError::simulation(Stage::MemorySimulation, e))?;
        let stats = self
            .memory
            .read_stats(layer_dir)
            .map_err(|e| stage_error(Stage::MemorySimulation, e))?;

        let scale = plan.scale_factor;
        let (network_cycles, network_energy_pj) = if nodes > 1 {
            (
                stats.avg_network_latency * pipeline.energy.noc_latency_weight * scale,
                stats.noc_energy_pj * pipeline.energy.noc_energy_weight * scale,
            )
        } else {
            (0.0, 0.0)
        };
        debug!(
            requests = plan.requests,
            scale_factor = scale,
            raw_cycles = stats.cycles,
            "memory stage done"
        );

        Ok(MemoryContribution {
            cycles: stats.cycles * scale,
            network_cycles,
            network_energy_pj,
            avg_network_latency: stats.avg_network_latency,
            scale_factor: scale,
            offchip_accesses: plan.real_accesses as f64,
            fallback: false,
        })
    }
}

impl Evaluator for EvaluationPipeline {
    fn evaluate(&self, point: &DesignPoint, mode: ScheduleMode, iteration: usize) -> EvaluationResult {
        let start = Instant::now();
        let result = match self.try_evaluate(point, mode, iteration) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    iteration,
                    point = %point,
                    mode = %mode,
                    stage = %e.stage,
                    error = %e.kind,
                    "evaluation failed"
                );
                EvaluationResult::from_error(&e, self.config.pipeline.penalty_cost)
            }
        };
        let elapsed = start.elapsed().as_secs_f64();
        info!(
            iteration,
            point = %point,
            mode = %mode,
            outcome = result.outcome.label(),
            cost = result.cost,
            duration_s = elapsed,
            "pipeline evaluation finished"
        );
        result.with_detail("duration_s", elapsed)
    }
}
