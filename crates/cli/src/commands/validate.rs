//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    pipeline: String,
    stage_count: usize,
    cleanup: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    pipeline: blueprint.pipeline.name.clone(),
                    stage_count: blueprint.stages.len(),
                    cleanup: blueprint.cleanup.command_line(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &PipelineBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.stages.is_empty() {
        warnings.push("No stages configured - only the cleanup stage will run".to_string());
    }

    if let Some(ref intermediate) = blueprint.artifacts.intermediate {
        let produced = blueprint
            .stages
            .iter()
            .any(|s| s.stdout.as_ref() == Some(intermediate));
        if !produced {
            warnings.push(format!(
                "No stage redirects its output to the intermediate artifact '{}'",
                intermediate.display()
            ));
        }

        let name = intermediate.to_string_lossy();
        if !blueprint.cleanup.args.iter().any(|a| *a == name) {
            warnings.push(format!(
                "Cleanup stage '{}' does not mention the intermediate artifact '{}'",
                blueprint.cleanup.name, name
            ));
        }
    }

    if let Some(ref final_output) = blueprint.artifacts.final_output {
        for stage in &blueprint.stages {
            if stage.stdout.as_ref() == Some(final_output) {
                warnings.push(format!(
                    "Stage '{}' writes its stdout over the final artifact",
                    stage.name
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Pipeline: {}", summary.pipeline);
            println!("  Stages: {}", summary.stage_count);
            println!("  Cleanup: {}", summary.cleanup);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
