//! Human-readable plan and run summaries.

use contracts::{PipelineBlueprint, RunReport, StagePhase};

use crate::commands::ConfigSource;

/// Print the stage plan (dry run)
pub fn print_plan(blueprint: &PipelineBlueprint, source: &ConfigSource) {
    println!("\n=== Pipeline Plan: {} ===\n", blueprint.pipeline.name);
    println!("Source: {}", source);
    if let Some(ref dir) = blueprint.pipeline.working_dir {
        println!("Working dir: {}", dir.display());
    }

    println!("\nStages ({}):", blueprint.stages.len());
    for (idx, stage) in blueprint.stages.iter().enumerate() {
        println!("  {}. {:<10} {}", idx + 1, stage.name, stage.command_line());
    }
    println!(
        "\nCleanup (only after full success):\n     {:<10} {}",
        blueprint.cleanup.name,
        blueprint.cleanup.command_line()
    );
    println!();
}

/// Print the outcome of a run
pub fn print_run_summary(blueprint: &PipelineBlueprint, source: &ConfigSource, report: &RunReport) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Pipeline Summary                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📊 Overview");
    println!("   ├─ Pipeline: {} ({})", blueprint.pipeline.name, source);
    println!("   ├─ Duration: {:.2}s", report.duration.as_secs_f64());
    println!("   ├─ Stages executed: {}", report.stages.len());
    println!("   └─ Exit code: {}", report.exit_code());

    println!("\n🔧 Stages");
    let skipped: Vec<_> = blueprint
        .all_stages()
        .filter(|stage| report.stage(&stage.name).is_none())
        .map(|stage| stage.name.as_str())
        .collect();

    for (i, stage) in report.stages.iter().enumerate() {
        let is_last = i == report.stages.len() - 1 && skipped.is_empty();
        let prefix = if is_last { "└─" } else { "├─" };
        let marker = if stage.status.is_success() { "✓" } else { "✗" };
        let phase = match stage.phase {
            StagePhase::Main => "",
            StagePhase::Cleanup => " [cleanup]",
        };
        println!(
            "   {} {} {}{}: {} ({:.2}s)",
            prefix,
            marker,
            stage.name,
            phase,
            stage.status,
            stage.duration.as_secs_f64()
        );
    }
    if !skipped.is_empty() {
        println!("   └─ skipped: {}", skipped.join(", "));
    }

    print_artifacts(blueprint);
    println!();
}

fn print_artifacts(blueprint: &PipelineBlueprint) {
    let artifacts = &blueprint.artifacts;
    if artifacts.intermediate.is_none() && artifacts.final_output.is_none() {
        return;
    }

    println!("\n🖼  Artifacts");
    let entries = [
        ("intermediate", artifacts.intermediate.as_ref()),
        ("final", artifacts.final_output.as_ref()),
    ];
    let entries: Vec<_> = entries
        .into_iter()
        .filter_map(|(label, path)| path.map(|p| (label, p)))
        .collect();

    for (i, (label, path)) in entries.iter().enumerate() {
        let prefix = if i == entries.len() - 1 { "└─" } else { "├─" };
        let resolved = blueprint.resolve_path(path);
        let state = match std::fs::metadata(&resolved) {
            Ok(meta) => format!("present, {} bytes", meta.len()),
            Err(_) => "absent".to_string(),
        };
        println!("   {} {}: {} ({})", prefix, label, path.display(), state);
    }
}
