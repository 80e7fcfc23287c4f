//! `init` command implementation.

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use tracing::info;

use crate::cli::InitArgs;
use crate::error::CliError;

/// Execute the `init` command
pub fn run_init(args: &InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(CliError::already_exists(&args.output).into());
    }

    let blueprint = PipelineBlueprint::render_default();
    let content = config_loader::ConfigLoader::serialize_for_path(&blueprint, &args.output)
        .context("Failed to serialize default configuration")?;

    std::fs::write(&args.output, content)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(path = %args.output.display(), "Default configuration written");
    println!("✓ Wrote default pipeline to {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::ConfigLoader;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("renderchain.json");
        run_init(&InitArgs {
            output: output.clone(),
            force: false,
        })
        .unwrap();

        let blueprint = ConfigLoader::load_from_path(&output).unwrap();
        assert_eq!(blueprint.cleanup.program, "rm");
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("renderchain.toml");
        std::fs::write(&output, "# mine").unwrap();

        let args = InitArgs {
            output: output.clone(),
            force: false,
        };
        assert!(run_init(&args).is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "# mine");

        let args = InitArgs {
            output: output.clone(),
            force: true,
        };
        run_init(&args).unwrap();
        assert!(ConfigLoader::load_from_path(&output).is_ok());
    }
}
