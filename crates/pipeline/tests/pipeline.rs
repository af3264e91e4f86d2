//! End-to-end pipeline tests against a scripted stage runner.

use pimforge_design::{
    AreaPolicy, CodesignConfig, DesignPoint, Outcome, ScheduleMode, SimFailure, Stage, ToolCommand,
    PENALTY_FLOOR,
};
use pimforge_pipeline::{EvaluationPipeline, Evaluator};
use pimforge_sim::{Invocation, StageRun, StageRunner};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const TEMPLATE: &str = "architecture:\n  nodes: {{ NUM_NODES }}\n  pe: {{ PE_DIM_X }}x{{ PE_DIM_Y }}\n  sram_depth: {{ SRAM_DEPTH }}\n";

const STATS: &str = "Cycles: 10000\nEnergy: 2.0 uJ\n=== DRAM ===\n    Scalar reads (per-instance) : 40000\n    Scalar updates (per-instance) : 10000\nLevel 2\n=== Node_SRAM ===\n    Scalar reads (per-instance) : 400000\n";

fn area_yaml(mm2: f64) -> String {
    format!(
        "ART_summary:\n  table_summary:\n    - name: System_top_level\n      area: 1.0\n    - name: Chip\n      area: {}\n",
        mm2 * 1e6
    )
}

/// Writes canned artifacts for the timing and memory tools.
struct ScriptedRunner {
    stats: Option<String>,
    area: String,
    /// Area report per layer directory name, overriding `area`.
    layer_areas: BTreeMap<String, String>,
    memory: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedRunner {
    fn new(area_mm2: f64) -> Self {
        Self {
            stats: Some(STATS.to_string()),
            area: area_yaml(area_mm2),
            layer_areas: BTreeMap::new(),
            memory: Some("ramulator.dram_cycles 200\nramulator.avg_network_latency 4.0\nramulator.noc_energy 100\n".into()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl StageRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<StageRun, SimFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let layer = invocation
            .expected_outputs
            .first()
            .and_then(|p| p.parent())
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let area = self.layer_areas.get(&layer).unwrap_or(&self.area);
        let contents: Vec<Option<&str>> = match invocation.program.as_str() {
            "fake-timing" => vec![self.stats.as_deref(), Some(area.as_str())],
            "fake-memory" => vec![self.memory.as_deref()],
            other => panic!("unexpected program {}", other),
        };
        for (path, content) in invocation.expected_outputs.iter().zip(contents) {
            match content {
                Some(text) => fs::write(path, text).unwrap(),
                None => return Err(SimFailure::MissingOutput(path.clone())),
            }
        }
        Ok(StageRun {
            elapsed: Duration::from_millis(1),
            outputs: invocation.expected_outputs.clone(),
        })
    }
}

fn config(dir: &Path) -> CodesignConfig {
    let template = dir.join("arch.yaml.tmpl");
    fs::write(&template, TEMPLATE).unwrap();
    let workload = dir.join("conv1.yaml");
    fs::write(&workload, "problem: {}\n").unwrap();

    let mut config = CodesignConfig::default();
    config.tools.timing = ToolCommand::new("fake-timing", &[]);
    config.tools.memory = ToolCommand::new("fake-memory", &[]);
    config.tools.template = template;
    config.tools.workloads = vec![workload];
    config.tools.memory_config = dir.join("memory.cfg");
    config.pipeline.trace.max_requests = 10_000;
    config
}

/// Every tool call fails the same way before writing anything.
struct FailingRunner(fn() -> SimFailure);

impl StageRunner for FailingRunner {
    fn run(&self, _invocation: &Invocation) -> Result<StageRun, SimFailure> {
        Err((self.0)())
    }
}

fn pipeline(config: CodesignConfig, dir: &Path, runner: Arc<dyn StageRunner>) -> EvaluationPipeline {
    EvaluationPipeline::new(Arc::new(config), dir.join("iterations"))
        .unwrap()
        .with_runner(runner)
}

fn single_node() -> DesignPoint {
    DesignPoint::new(vec![1, 8, 20])
}

#[test]
fn test_successful_evaluation() {
    let tmp = TempDir::new().unwrap();
    let runner = Arc::new(ScriptedRunner::new(20.0));
    let pipe = pipeline(config(tmp.path()), tmp.path(), runner.clone());

    let result = pipe.evaluate(&single_node(), ScheduleMode::Spatial, 1);
    assert!(result.valid);
    assert_eq!(result.outcome, Outcome::Success);
    assert!(result.cost > 0.0 && result.cost < PENALTY_FLOOR);
    assert_eq!(result.detail("area_penalty"), Some(1.0));
    assert_eq!(result.detail("edp_raw"), Some(result.cost));
    assert_eq!(result.detail("memory_fallback"), Some(0.0));
    assert!(result.cycles >= 10_000.0);
    assert_eq!(runner.calls.load(Ordering::SeqCst), 2);

    let layer = tmp.path().join("iterations/iter_0001/spatial/conv1");
    assert!(layer.join("dram_spatial.trace").is_file());
    assert!(!layer.join("noc_config.cfg").exists());
    assert!(tmp.path().join("iterations/iter_0001/spatial/arch.yaml").is_file());
}

#[test]
fn test_memory_cycles_are_extrapolated() {
    let tmp = TempDir::new().unwrap();
    let pipe = pipeline(config(tmp.path()), tmp.path(), Arc::new(ScriptedRunner::new(20.0)));

    // 50000 real accesses capped to 10000 requests: scale 5, 200 cycles -> 1000
    let result = pipe.evaluate(&single_node(), ScheduleMode::Baseline, 1);
    assert_eq!(result.detail("scale_factor"), Some(5.0));
    assert_eq!(result.detail("memory_cycles"), Some(1000.0));
    assert_eq!(result.detail("network_cycles"), Some(0.0));
}

#[test]
fn test_multi_node_writes_network_config() {
    let tmp = TempDir::new().unwrap();
    let pipe = pipeline(config(tmp.path()), tmp.path(), Arc::new(ScriptedRunner::new(20.0)));

    let result = pipe.evaluate(&DesignPoint::new(vec![4, 8, 20]), ScheduleMode::Spatial, 2);
    assert!(result.valid);
    assert!(result.detail("network_cycles").unwrap() > 0.0);
    let layer = tmp.path().join("iterations/iter_0002/spatial/conv1");
    assert!(layer.join("noc_config.cfg").is_file());
    let mapping = fs::read_to_string(tmp.path().join("iterations/iter_0002/spatial/mapper_spatial.yaml")).unwrap();
    assert!(mapping.contains("M=4"));
}

#[test]
fn test_missing_timing_artifact_is_penalised() {
    let tmp = TempDir::new().unwrap();
    let runner = ScriptedRunner {
        stats: None,
        ..ScriptedRunner::new(20.0)
    };
    let pipe = pipeline(config(tmp.path()), tmp.path(), Arc::new(runner));

    let result = pipe.evaluate(&single_node(), ScheduleMode::Spatial, 1);
    assert!(!result.valid);
    assert!(result.cost >= PENALTY_FLOOR);
    match result.outcome {
        Outcome::Failed { stage, .. } => assert_eq!(stage, Stage::TimingSimulation),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_missing_template_is_config_failure() {
    let tmp = TempDir::new().unwrap();
    let mut cfg = config(tmp.path());
    cfg.tools.template = tmp.path().join("missing.tmpl");
    let pipe = pipeline(cfg, tmp.path(), Arc::new(ScriptedRunner::new(20.0)));

    let result = pipe.evaluate(&single_node(), ScheduleMode::Baseline, 1);
    assert!(result.is_penalty());
    assert!(matches!(
        result.outcome,
        Outcome::Failed { stage: Stage::MaterializeDesign, .. }
    ));
}

#[test]
fn test_area_overshoot_scales_cost() {
    let tmp = TempDir::new().unwrap();
    let within = pipeline(config(tmp.path()), tmp.path(), Arc::new(ScriptedRunner::new(20.0)))
        .evaluate(&single_node(), ScheduleMode::Spatial, 1);
    let over = pipeline(config(tmp.path()), tmp.path(), Arc::new(ScriptedRunner::new(60.0)))
        .evaluate(&single_node(), ScheduleMode::Spatial, 2);
    let further = pipeline(config(tmp.path()), tmp.path(), Arc::new(ScriptedRunner::new(72.0)))
        .evaluate(&single_node(), ScheduleMode::Spatial, 3);

    assert!(over.valid);
    match over.outcome {
        Outcome::AreaViolation { penalty_factor, .. } => assert!((penalty_factor - 3.5).abs() < 1e-9),
        ref other => panic!("unexpected outcome {:?}", other),
    }
    let raw = over.detail("edp_raw").unwrap();
    assert!((over.cost - raw * 3.5).abs() <= raw * 1e-9);
    assert!((raw - within.cost).abs() <= raw * 1e-9);
    assert!(further.cost > over.cost);
    assert!(further.cost < PENALTY_FLOOR);
}

#[test]
fn test_hard_abort_area_policy() {
    let tmp = TempDir::new().unwrap();
    let mut cfg = config(tmp.path());
    cfg.pipeline.area_policy = AreaPolicy::HardAbort;
    let runner = Arc::new(ScriptedRunner::new(60.0));
    let pipe = pipeline(cfg, tmp.path(), runner.clone());

    let result = pipe.evaluate(&single_node(), ScheduleMode::Spatial, 1);
    assert!(!result.valid);
    assert!(result.cost >= PENALTY_FLOOR);
    assert!(matches!(result.outcome, Outcome::Failed { stage: Stage::AreaCheck, .. }));
    // memory co-simulation never ran
    assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_memory_failure_uses_fallback() {
    let tmp = TempDir::new().unwrap();
    let runner = ScriptedRunner {
        memory: None,
        ..ScriptedRunner::new(20.0)
    };
    let cfg = config(tmp.path());
    let fallback = cfg.pipeline.memory_fallback_cycles;
    let pipe = pipeline(cfg, tmp.path(), Arc::new(runner));

    let result = pipe.evaluate(&single_node(), ScheduleMode::Spatial, 1);
    assert!(result.valid);
    assert!(result.cost < PENALTY_FLOOR);
    assert_eq!(result.detail("memory_fallback"), Some(1.0));
    assert_eq!(result.detail("memory_cycles"), Some(fallback));
}

#[test]
fn test_rerun_replaces_stale_artifacts() {
    let tmp = TempDir::new().unwrap();
    let pipe = pipeline(config(tmp.path()), tmp.path(), Arc::new(ScriptedRunner::new(20.0)));
    let stale = tmp.path().join("iterations/iter_0005/baseline/stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();

    let result = pipe.evaluate(&single_node(), ScheduleMode::Baseline, 5);
    assert!(result.valid);
    assert!(!stale.exists());
}

#[test]
fn test_unparsable_stats_fail_parse_stage() {
    let tmp = TempDir::new().unwrap();
    let runner = ScriptedRunner {
        stats: Some("Summary Stats\n-------------\nsegfault in mapper\n".into()),
        ..ScriptedRunner::new(20.0)
    };
    let pipe = pipeline(config(tmp.path()), tmp.path(), Arc::new(runner));

    let result = pipe.evaluate(&single_node(), ScheduleMode::Spatial, 1);
    assert!(!result.valid);
    assert!(result.cost >= PENALTY_FLOOR);
    assert!(matches!(result.outcome, Outcome::Failed { stage: Stage::ParseTiming, .. }));
}

#[test]
fn test_timing_tool_failures_are_penalised() {
    let failures: [fn() -> SimFailure; 2] = [
        || SimFailure::Timeout(Duration::from_secs(600)),
        || SimFailure::NonZeroExit {
            code: Some(1),
            tail: "mapper: no valid mappings".into(),
        },
    ];
    for (i, failure) in failures.into_iter().enumerate() {
        let tmp = TempDir::new().unwrap();
        let pipe = pipeline(config(tmp.path()), tmp.path(), Arc::new(FailingRunner(failure)));

        let result = pipe.evaluate(&single_node(), ScheduleMode::Baseline, i + 1);
        assert!(!result.valid);
        assert!(result.cost >= PENALTY_FLOOR);
        assert!(matches!(
            result.outcome,
            Outcome::Failed { stage: Stage::TimingSimulation, .. }
        ));
    }
}

#[test]
fn test_multiple_layers_are_aggregated() {
    let tmp = TempDir::new().unwrap();
    let single = pipeline(config(tmp.path()), tmp.path().join("single").as_path(), Arc::new(ScriptedRunner::new(20.0)))
        .evaluate(&single_node(), ScheduleMode::Spatial, 1);

    let mut cfg = config(tmp.path());
    let other = tmp.path().join("other");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("conv1.yaml"), "problem: {}\n").unwrap();
    cfg.tools.workloads.push(other.join("conv1.yaml"));
    let mut runner = ScriptedRunner::new(20.0);
    runner.layer_areas.insert("conv1_1".into(), area_yaml(60.0));
    let runner = Arc::new(runner);
    let pipe = pipeline(cfg, tmp.path(), runner.clone());
    assert_eq!(pipe.layer_count(), 2);

    let result = pipe.evaluate(&single_node(), ScheduleMode::Spatial, 1);
    assert!(result.valid);
    assert_eq!(result.detail("layers"), Some(2.0));
    assert_eq!(result.area, 60.0);
    assert_eq!(result.detail("logic_cycles"), Some(20_000.0));
    assert!((result.cycles - 2.0 * single.cycles).abs() <= single.cycles * 1e-9);
    assert!((result.energy - 2.0 * single.energy).abs() <= single.energy * 1e-9);
    match result.outcome {
        Outcome::AreaViolation { penalty_factor, .. } => assert!((penalty_factor - 3.5).abs() < 1e-9),
        ref other => panic!("unexpected outcome {:?}", other),
    }
    let raw = result.detail("edp_raw").unwrap();
    assert!((raw - 4.0 * single.cost).abs() <= raw * 1e-9);
    assert!((result.cost - raw * 3.5).abs() <= raw * 1e-9);
    // two timing and two memory runs
    assert_eq!(runner.calls.load(Ordering::SeqCst), 4);

    let mode_dir = tmp.path().join("iterations/iter_0001/spatial");
    assert!(mode_dir.join("conv1/dram_spatial.trace").is_file());
    assert!(mode_dir.join("conv1_1/dram_spatial.trace").is_file());
}
