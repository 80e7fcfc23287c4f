//! Configuration validation
//!
//! Rules:
//! - stage name / program non-empty (derive rules on `StageConfig`)
//! - stage names unique across main stages and cleanup
//! - timeout_secs > 0 when set
//! - stdout redirect target non-empty when set
//! - env keys non-empty, without '=' or NUL

use std::collections::HashSet;

use contracts::{ContractError, PipelineBlueprint, StageConfig};
use ::validator::Validate;

/// Validate a PipelineBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_stage_names(blueprint)?;
    for (field, stage) in stage_fields(blueprint) {
        validate_timeout(&field, stage)?;
        validate_stdout(&field, stage)?;
        validate_env(&field, stage)?;
    }
    Ok(())
}

/// Field-level rules declared on the contract types
fn validate_fields(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("stages", e.to_string()))
}

/// Stage names must be unique (cleanup included)
fn validate_stage_names(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (field, stage) in stage_fields(blueprint) {
        if !seen.insert(stage.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("{field}.name"),
                format!("duplicate stage name '{}'", stage.name),
            ));
        }
    }
    Ok(())
}

fn validate_timeout(field: &str, stage: &StageConfig) -> Result<(), ContractError> {
    if stage.timeout_secs == Some(0) {
        return Err(ContractError::config_validation(
            format!("{field}.timeout_secs"),
            "timeout_secs must be > 0",
        ));
    }
    Ok(())
}

fn validate_stdout(field: &str, stage: &StageConfig) -> Result<(), ContractError> {
    if let Some(ref path) = stage.stdout {
        if path.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                format!("{field}.stdout"),
                "stdout redirect target cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_env(field: &str, stage: &StageConfig) -> Result<(), ContractError> {
    for key in stage.env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ContractError::config_validation(
                format!("{field}.env"),
                format!("invalid environment variable name '{key}'"),
            ));
        }
    }
    Ok(())
}

/// (field path, stage) pairs in execution order
fn stage_fields(blueprint: &PipelineBlueprint) -> impl Iterator<Item = (String, &StageConfig)> {
    blueprint
        .stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| (format!("stages[{idx}]"), stage))
        .chain(std::iter::once(("cleanup".to_string(), &blueprint.cleanup)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn minimal_blueprint() -> PipelineBlueprint {
        PipelineBlueprint::render_default()
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_empty_stage_list_is_valid() {
        let mut bp = minimal_blueprint();
        bp.stages.clear();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_duplicate_stage_name() {
        let mut bp = minimal_blueprint();
        bp.stages.push(bp.stages[0].clone());
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate stage name 'build'"), "got: {err}");
        assert!(err.contains("stages[3].name"), "got: {err}");
    }

    #[test]
    fn test_cleanup_name_collides_with_stage() {
        let mut bp = minimal_blueprint();
        bp.cleanup.name = "render".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cleanup.name"), "got: {err}");
    }

    #[test]
    fn test_empty_program() {
        let mut bp = minimal_blueprint();
        bp.cleanup.program = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("program cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_timeout() {
        let mut bp = minimal_blueprint();
        bp.stages[1].timeout_secs = Some(0);
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("stages[1].timeout_secs"), "got: {err}");
    }

    #[test]
    fn test_empty_stdout_target() {
        let mut bp = minimal_blueprint();
        bp.stages[1].stdout = Some(PathBuf::new());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_invalid_env_key() {
        let mut bp = minimal_blueprint();
        bp.stages[0]
            .env
            .insert("RUSTFLAGS=x".into(), "-C target-cpu=native".into());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("invalid environment variable name"), "got: {err}");
    }
}
