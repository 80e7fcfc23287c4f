//! `run` command implementation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use observability::RunMetricsAggregator;
use orchestrator::{listen_for_signals, Orchestrator, ProcessExecutor, RunReport};
use tracing::{info, warn};

use super::{load_blueprint, ConfigSource};
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::summary::{print_plan, print_run_summary};

/// Execute the `run` command
///
/// Returns the exit code of the last run: the failing stage's code, or the
/// cleanup stage's code when every main stage succeeded.
pub async fn run_pipeline(args: &RunArgs) -> Result<ExitCode> {
    let (mut blueprint, source) = load_blueprint(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(ref dir) = args.working_dir {
        info!(working_dir = %dir.display(), "Overriding working directory from CLI");
        blueprint.pipeline.working_dir = Some(dir.clone());
    }

    if let Some(ref dir) = blueprint.pipeline.working_dir {
        if !dir.is_dir() {
            return Err(CliError::working_dir_not_found(dir).into());
        }
    }

    info!(
        source = %source,
        pipeline = %blueprint.pipeline.name,
        stages = blueprint.stages.len(),
        cleanup = %blueprint.cleanup.name,
        "Configuration loaded"
    );

    // Dry run - just print the plan and exit
    if args.dry_run {
        info!("Dry run mode - nothing will be executed");
        print_plan(&blueprint, &source);
        return Ok(ExitCode::SUCCESS);
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)
            .context("Failed to start metrics endpoint")?;
    }

    let report = execute_runs(&blueprint, &source, args.repeat).await;
    Ok(exit_code(report.exit_code()))
}

/// Run the pipeline up to `repeat` times, stopping after the first failed run
async fn execute_runs(
    blueprint: &PipelineBlueprint,
    source: &ConfigSource,
    repeat: u32,
) -> RunReport {
    let shutdown = listen_for_signals();
    let mut aggregator = RunMetricsAggregator::new();
    let mut report = RunReport::default();

    for iteration in 1..=repeat {
        if repeat > 1 {
            info!(iteration, repeat, "Starting pipeline run");
        }

        let mut executor = ProcessExecutor::new().with_shutdown(shutdown.clone());
        if let Some(ref dir) = blueprint.pipeline.working_dir {
            executor = executor.with_working_dir(dir);
        }

        report = Orchestrator::new(executor).run_blueprint(blueprint).await;
        aggregator.update(&report);

        if let Some(failed) = report.failed_stage() {
            eprintln!("stage '{}' failed: {}", failed.name, failed.status);
            if repeat > 1 {
                warn!(iteration, "Run failed, skipping remaining repetitions");
            }
            break;
        }
    }

    print_run_summary(blueprint, source, &report);
    if repeat > 1 {
        println!("{}", aggregator.summary());
    }

    report
}

/// Map a stage exit code onto a process exit code
fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
