//! Command implementations.

mod info;
mod init;
mod run;
mod validate;

pub use info::run_info;
pub use init::run_init;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::{Path, PathBuf};

use contracts::PipelineBlueprint;
use tracing::info;

use crate::error::{CliError, Result};

/// Configuration file picked up from the current directory when `--config` is omitted
pub const DEFAULT_CONFIG_FILE: &str = "renderchain.toml";

/// Where a blueprint came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    BuiltIn,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::BuiltIn => write!(f, "built-in default"),
        }
    }
}

/// Load the blueprint named on the command line, or fall back to
/// `renderchain.toml` in the current directory, or the built-in pipeline.
pub fn load_blueprint(config: Option<&Path>) -> Result<(PipelineBlueprint, ConfigSource)> {
    load_blueprint_in(config, Path::new("."))
}

fn load_blueprint_in(
    config: Option<&Path>,
    cwd: &Path,
) -> Result<(PipelineBlueprint, ConfigSource)> {
    let path = match config {
        Some(path) if !path.exists() => return Err(CliError::config_not_found(path)),
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = cwd.join(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                info!("No configuration file given, using built-in pipeline");
                return Ok((PipelineBlueprint::render_default(), ConfigSource::BuiltIn));
            }
            fallback
        }
    };

    info!(config = %path.display(), "Loading configuration");
    let blueprint = config_loader::ConfigLoader::load_from_path(&path)
        .map_err(|e| CliError::config_load(&path, e))?;
    Ok((blueprint, ConfigSource::File(path)))
}
