//! Orchestrator - fail-fast stage loop
//!
//! Runs main stages in order and stops at the first one that does not
//! succeed. The cleanup stage runs only when every main stage succeeded.

use std::time::Instant;

use contracts::{
    PipelineBlueprint, RunReport, StageConfig, StageExecutor, StagePhase, StageReport, StageStatus,
};
use observability::{record_run_completed, record_stage_completed, record_stage_started};
use tracing::{error, info, instrument};

/// Sequential pipeline orchestrator
pub struct Orchestrator<E> {
    executor: E,
}

impl<E: StageExecutor> Orchestrator<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Run the stages and cleanup of a blueprint
    pub async fn run_blueprint(&mut self, blueprint: &PipelineBlueprint) -> RunReport {
        self.run(&blueprint.stages, &blueprint.cleanup).await
    }

    /// Run `stages` in order, then `cleanup` if all of them succeeded
    ///
    /// The report's exit code is that of the first failing stage, or of
    /// cleanup when every main stage succeeded.
    #[instrument(
        name = "orchestrator_run",
        skip(self, stages, cleanup),
        fields(executor = %self.executor.name(), stages = stages.len())
    )]
    pub async fn run(&mut self, stages: &[StageConfig], cleanup: &StageConfig) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::default();

        let main_ok = self.run_main(stages, &mut report).await;
        if main_ok {
            self.run_stage(cleanup, StagePhase::Cleanup, &mut report)
                .await;
        }

        report.duration = started.elapsed();
        record_run_completed(&report);

        info!(
            exit_code = report.exit_code(),
            executed = report.stages.len(),
            cleanup_ran = report.cleanup_ran(),
            duration_secs = report.duration.as_secs_f64(),
            "Pipeline finished"
        );

        report
    }

    /// Returns true when every main stage succeeded
    async fn run_main(&mut self, stages: &[StageConfig], report: &mut RunReport) -> bool {
        for stage in stages {
            if !self.run_stage(stage, StagePhase::Main, report).await {
                return false;
            }
        }
        true
    }

    async fn run_stage(
        &mut self,
        stage: &StageConfig,
        phase: StagePhase,
        report: &mut RunReport,
    ) -> bool {
        let started = Instant::now();

        let status = if self.executor.shutdown_requested() {
            StageStatus::Interrupted
        } else {
            info!(
                stage = %stage.name,
                phase = ?phase,
                command = %stage.command_line(),
                "Starting stage"
            );
            record_stage_started(&stage.name, phase);
            self.executor.execute(stage).await
        };

        let duration = started.elapsed();
        record_stage_completed(&stage.name, phase, &status, duration);

        let succeeded = status.is_success();
        if succeeded {
            info!(
                stage = %stage.name,
                duration_secs = duration.as_secs_f64(),
                "Stage succeeded"
            );
        } else {
            error!(
                stage = %stage.name,
                exit_code = status.exit_code(),
                "stage '{}' failed: {}",
                stage.name,
                status
            );
        }

        report.stages.push(StageReport {
            name: stage.name.clone(),
            phase,
            status,
            duration,
        });

        succeeded
    }
}
