//! PipelineBlueprint - Config Loader output
//!
//! Describes a complete pipeline: ordered stages, the cleanup stage and the
//! artifacts they hand to each other.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Pipeline-wide settings
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Main stages, in execution order
    #[serde(default)]
    #[validate(nested)]
    pub stages: Vec<StageConfig>,

    /// Runs only after every main stage succeeded
    #[validate(nested)]
    pub cleanup: StageConfig,

    /// Artifact paths (informational, used for reporting and warnings)
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

/// Pipeline-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Display name
    #[serde(default = "default_pipeline_name")]
    pub name: String,

    /// Working directory for every stage; relative stage paths resolve against it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            name: default_pipeline_name(),
            working_dir: None,
        }
    }
}

fn default_pipeline_name() -> String {
    "pipeline".to_string()
}

/// One external command of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StageConfig {
    /// Unique stage name (used in logs, metrics and reports)
    #[validate(length(min = 1, message = "stage name cannot be empty"))]
    pub name: String,

    /// Executable name or path
    #[validate(length(min = 1, message = "program cannot be empty"))]
    pub program: String,

    /// Arguments passed verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Redirect target for the process's standard output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<PathBuf>,

    /// Kill the stage after this many seconds (None = wait indefinitely)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Extra environment variables
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl StageConfig {
    /// Create a stage with no arguments
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            stdout: None,
            timeout_secs: None,
            env: HashMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Human-readable command line, e.g. `convert image.ppm image.png > out`
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Some(ref stdout) = self.stdout {
            line.push_str(" > ");
            line.push_str(&stdout.display().to_string());
        }
        line
    }
}

/// Artifact paths handed between stages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Written by the render stage, removed by cleanup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<PathBuf>,

    /// Written by the convert stage, kept after the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_output: Option<PathBuf>,
}

impl PipelineBlueprint {
    /// Built-in build → render → convert → cleanup pipeline for the raytracer
    pub fn render_default() -> Self {
        Self {
            version: ConfigVersion::V1,
            pipeline: PipelineSettings {
                name: "raytracer".to_string(),
                working_dir: None,
            },
            stages: vec![
                StageConfig::new("build", "cargo").with_args(["build", "--release"]),
                StageConfig::new("render", "./target/release/raytracer").with_stdout("image.ppm"),
                StageConfig::new("convert", "convert").with_args(["image.ppm", "image.png"]),
            ],
            cleanup: StageConfig::new("cleanup", "rm").with_args(["image.ppm"]),
            artifacts: ArtifactConfig {
                intermediate: Some(PathBuf::from("image.ppm")),
                final_output: Some(PathBuf::from("image.png")),
            },
        }
    }

    /// All stages in execution order, cleanup last
    pub fn all_stages(&self) -> impl Iterator<Item = &StageConfig> {
        self.stages.iter().chain(std::iter::once(&self.cleanup))
    }

    /// Resolve a path from the blueprint against the pipeline working directory
    pub fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        match (&self.pipeline.working_dir, path.is_relative()) {
            (Some(dir), true) => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}
