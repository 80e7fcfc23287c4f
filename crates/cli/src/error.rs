//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration could not be loaded
    #[error("Failed to load configuration from {}: {source}", path.display())]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: contracts::ContractError,
    },

    /// Working directory does not exist
    #[error("Working directory not found: {}", path.display())]
    WorkingDirNotFound { path: PathBuf },

    /// Refusing to overwrite an existing file
    #[error("{} already exists (use --force to overwrite)", path.display())]
    AlreadyExists { path: PathBuf },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_load(path: impl Into<PathBuf>, source: contracts::ContractError) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            source,
        }
    }

    pub fn working_dir_not_found(path: impl Into<PathBuf>) -> Self {
        Self::WorkingDirNotFound { path: path.into() }
    }

    pub fn already_exists(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
