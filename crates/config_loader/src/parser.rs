//! Configuration parsing
//!
//! TOML (primary) and JSON are supported.

use contracts::{ContractError, PipelineBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<PipelineBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<PipelineBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[[stages]]
name = "render"
program = "./raytracer"
stdout = "image.ppm"

[cleanup]
name = "cleanup"
program = "rm"
args = ["image.ppm"]
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.pipeline.name, "pipeline");
        assert_eq!(bp.stages.len(), 1);
        assert_eq!(bp.stages[0].stdout, Some(PathBuf::from("image.ppm")));
        assert!(bp.stages[0].args.is_empty());
        assert_eq!(bp.cleanup.args, vec!["image.ppm"]);
    }

    #[test]
    fn test_parse_toml_without_stages() {
        let content = r#"
[cleanup]
name = "cleanup"
program = "true"
"#;
        let bp = parse_toml(content).unwrap();
        assert!(bp.stages.is_empty());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "pipeline": { "name": "render", "working_dir": "/tmp/out" },
            "stages": [
                { "name": "build", "program": "cargo", "args": ["build", "--release"] },
                { "name": "convert", "program": "convert", "args": ["a.ppm", "a.png"], "timeout_secs": 30 }
            ],
            "cleanup": { "name": "cleanup", "program": "rm", "args": ["a.ppm"] }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.pipeline.working_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(bp.stages[1].timeout_secs, Some(30));
    }

    #[test]
    fn test_parse_toml_missing_cleanup() {
        let content = r#"
[[stages]]
name = "build"
program = "cargo"
"#;
        let err = parse_toml(content).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
        assert!(err.to_string().contains("cleanup"), "got: {err}");
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
