//! CLI wiring for PIMForge.

use crate::driver::CampaignDriver;
use crate::run_dir::RunDirectory;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use pimforge_design::{CodesignConfig, ScheduleMode};
use pimforge_pipeline::{EvaluationPipeline, Evaluator};
use pimforge_search::SearchCheckpoint;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pimforge", about = "Trust-region hardware/mapping co-design search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run (or resume) a search campaign.
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        iterations: Option<usize>,
        /// Root under which `run_<timestamp>/` is created.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Search state to continue from; the run directory that owns it is reused.
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Evaluate a single design point and print the result as JSON.
    Evaluate {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Comma separated coordinates, e.g. `4,16,20`.
        #[arg(long)]
        point: String,
        #[arg(long, default_value = "spatial")]
        mode: ScheduleMode,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration as YAML.
    ShowConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the trust-region window published by a checkpoint.
    Window {
        #[arg(long)]
        checkpoint: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<CodesignConfig> {
    let config = match path {
        Some(path) => CodesignConfig::load(path)?,
        None => CodesignConfig::default(),
    };
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

pub fn run_cli(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    match cli.command {
        Command::Run {
            config,
            iterations,
            output,
            resume,
        } => {
            let (config, run, checkpoint) = match resume {
                Some(checkpoint_path) => {
                    let run = RunDirectory::from_checkpoint(&checkpoint_path)?;
                    let config = match config {
                        Some(path) => load_config(Some(path.as_path()))?,
                        None => run.read_metadata()?.config,
                    };
                    let checkpoint = SearchCheckpoint::load_from_file(&checkpoint_path)?;
                    (config, run, Some(checkpoint))
                }
                None => {
                    let mut config = load_config(config.as_deref())?;
                    if let Some(output) = output {
                        config.campaign.output_root = output;
                    }
                    let run = RunDirectory::create(&config.campaign.output_root)?;
                    run.write_metadata(&config)?;
                    (config, run, None)
                }
            };

            let iterations = iterations.unwrap_or(config.campaign.iterations);
            let config = Arc::new(config);
            let pipeline = EvaluationPipeline::new(config.clone(), run.iterations_dir())?;
            info!(
                run = %run.root().display(),
                iterations,
                layers = pipeline.layer_count(),
                "starting campaign"
            );

            let mut driver = match checkpoint {
                Some(checkpoint) => CampaignDriver::resume(config, Box::new(pipeline), run, checkpoint)?,
                None => CampaignDriver::new(config, Box::new(pipeline), run)?,
            };
            let summary = driver.run(iterations)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Evaluate {
            config,
            point,
            mode,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let point = config
                .space
                .parse_point(&point)
                .map_err(|e| anyhow!("invalid --point: {}", e))?;
            let root = output.unwrap_or_else(|| config.campaign.output_root.join("evaluate"));
            let pipeline = EvaluationPipeline::new(Arc::new(config), root)?;
            let result = pipeline.evaluate(&point, mode, 0);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::ShowConfig { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_yaml()?);
        }
        Command::Window { checkpoint } => {
            let checkpoint = SearchCheckpoint::load_from_file(&checkpoint)?;
            let window = checkpoint.window();
            println!(
                "length {:.4} (restarts: {}, proposals: {})",
                checkpoint.state.length, checkpoint.state.restart_count, checkpoint.proposals
            );
            match &checkpoint.state.best_point {
                Some(point) => println!("incumbent {} cost {:e}", point, checkpoint.state.best_value),
                None => println!("incumbent none"),
            }
            if let Some(best) = checkpoint.best_found() {
                println!("best found {} cost {:e}", best.point, best.cost);
            }
            for (dim, bound) in checkpoint.space.dimensions.iter().zip(&window.bounds) {
                println!(
                    "{:>12}  [{}, {}]  of [{}, {}]",
                    dim.name, bound.low, bound.high, dim.low, dim.high
                );
            }
        }
    }

    Ok(())
}
