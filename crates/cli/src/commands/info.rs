//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{PipelineBlueprint, StageConfig};
use serde::Serialize;
use tracing::info;

use super::{load_blueprint, ConfigSource};
use crate::cli::InfoArgs;

/// Pipeline info for JSON output
#[derive(Serialize)]
struct PipelineInfo {
    source: String,
    version: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    working_dir: Option<String>,
    stages: Vec<StageInfo>,
    cleanup: StageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    intermediate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_output: Option<String>,
}

#[derive(Serialize)]
struct StageInfo {
    name: String,
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env: Vec<String>,
}

impl From<&StageConfig> for StageInfo {
    fn from(stage: &StageConfig) -> Self {
        let mut env: Vec<String> = stage.env.keys().cloned().collect();
        env.sort();
        Self {
            name: stage.name.clone(),
            command: stage.command_line(),
            timeout_secs: stage.timeout_secs,
            env,
        }
    }
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let (blueprint, source) = load_blueprint(args.config.as_deref())?;
    info!(source = %source, "Loaded pipeline info");

    if args.json {
        let info = build_pipeline_info(&blueprint, &source);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize pipeline info")?;
        println!("{}", json);
    } else {
        print_pipeline_info(&blueprint, &source);
    }

    Ok(())
}

fn build_pipeline_info(blueprint: &PipelineBlueprint, source: &ConfigSource) -> PipelineInfo {
    PipelineInfo {
        source: source.to_string(),
        version: format!("{:?}", blueprint.version),
        name: blueprint.pipeline.name.clone(),
        working_dir: blueprint
            .pipeline
            .working_dir
            .as_ref()
            .map(|d| d.display().to_string()),
        stages: blueprint.stages.iter().map(StageInfo::from).collect(),
        cleanup: StageInfo::from(&blueprint.cleanup),
        intermediate: blueprint
            .artifacts
            .intermediate
            .as_ref()
            .map(|p| p.display().to_string()),
        final_output: blueprint
            .artifacts
            .final_output
            .as_ref()
            .map(|p| p.display().to_string()),
    }
}

fn print_pipeline_info(blueprint: &PipelineBlueprint, source: &ConfigSource) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 renderchain Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Pipeline");
    println!("   ├─ Name: {}", blueprint.pipeline.name);
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Source: {}", source);
    match &blueprint.pipeline.working_dir {
        Some(dir) => println!("   └─ Working dir: {}", dir.display()),
        None => println!("   └─ Working dir: (current directory)"),
    }

    println!("\n🔧 Stages ({})", blueprint.stages.len());
    for (i, stage) in blueprint.stages.iter().enumerate() {
        let prefix = if i == blueprint.stages.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        print_stage(prefix, stage);
    }

    println!("\n🧹 Cleanup (only after full success)");
    print_stage("└─", &blueprint.cleanup);

    let artifacts = &blueprint.artifacts;
    if artifacts.intermediate.is_some() || artifacts.final_output.is_some() {
        println!("\n🖼  Artifacts");
        if let Some(ref path) = artifacts.intermediate {
            println!("   ├─ Intermediate: {}", path.display());
        }
        match artifacts.final_output {
            Some(ref path) => println!("   └─ Final: {}", path.display()),
            None => println!("   └─ Final: (none)"),
        }
    }

    println!();
}

fn print_stage(prefix: &str, stage: &StageConfig) {
    let timeout = stage
        .timeout_secs
        .map(|s| format!(" (timeout {}s)", s))
        .unwrap_or_default();
    println!("   {} {}: {}{}", prefix, stage.name, stage.command_line(), timeout);
}
