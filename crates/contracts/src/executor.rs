//! StageExecutor trait - Orchestrator execution interface
//!
//! Separates the fail-fast run loop from how a stage is actually executed
//! (child processes in production, scripted outcomes in tests).

use crate::{StageConfig, StageStatus};

/// Executes a single stage and reports its outcome
///
/// Implementations must not return until the stage has fully terminated.
#[trait_variant::make(StageExecutor: Send)]
pub trait LocalStageExecutor {
    /// Executor name (used for logging)
    fn name(&self) -> &str;

    /// Run the stage to completion
    async fn execute(&mut self, stage: &StageConfig) -> StageStatus;

    /// Whether a shutdown has been requested; the run loop stops before the
    /// next stage when this returns true
    fn shutdown_requested(&self) -> bool {
        false
    }
}
