//! Scripted executor
//!
//! Test double that returns preconfigured statuses instead of spawning
//! processes, and records every stage it was asked to run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use contracts::{StageConfig, StageExecutor, StageStatus};

use crate::shutdown::Shutdown;

/// Executor returning scripted outcomes per stage name
///
/// Stages without a scripted outcome succeed.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    outcomes: HashMap<String, StageStatus>,
    calls: Arc<Mutex<Vec<String>>>,
    shutdown: Option<Shutdown>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `stage` finish with `status`
    pub fn with_outcome(mut self, stage: impl Into<String>, status: StageStatus) -> Self {
        self.outcomes.insert(stage.into(), status);
        self
    }

    /// Make `stage` exit with `code`
    pub fn failing(self, stage: impl Into<String>, code: i32) -> Self {
        self.with_outcome(stage, StageStatus::Failed { code })
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Names of executed stages, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl StageExecutor for ScriptedExecutor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&mut self, stage: &StageConfig) -> StageStatus {
        self.calls.lock().unwrap().push(stage.name.clone());
        self.outcomes
            .get(&stage.name)
            .cloned()
            .unwrap_or(StageStatus::Succeeded)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(Shutdown::is_triggered)
    }
}
