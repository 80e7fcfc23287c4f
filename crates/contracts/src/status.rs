//! Stage and run outcomes
//!
//! A failing stage is data, not an error: the orchestrator records a
//! `StageStatus` for every stage it starts and derives the process exit code
//! from the last one.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Exit code used when a stage could not be started at all
pub const EXIT_SPAWN_FAILURE: i32 = 127;

/// Exit code used when a stage exceeded its timeout
pub const EXIT_TIMED_OUT: i32 = 124;

/// Exit code used when the run was interrupted by a shutdown signal
pub const EXIT_INTERRUPTED: i32 = 130;

/// Base added to a signal number when a child was killed by a signal
pub const EXIT_SIGNAL_BASE: i32 = 128;

/// Outcome of a single stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    /// Process exited with code 0
    Succeeded,

    /// Process exited with a non-zero code
    Failed { code: i32 },

    /// Process could not be started (not found, not executable, redirect failed)
    SpawnFailed { message: String },

    /// Process was terminated by a signal it did not receive from us
    Signaled { signal: i32 },

    /// Process exceeded its configured timeout and was killed
    TimedOut { after_secs: u64 },

    /// Shutdown was requested while the stage was pending or running
    Interrupted,
}

impl StageStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Exit code this status propagates to the orchestrator
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Succeeded => 0,
            Self::Failed { code } => *code,
            Self::SpawnFailed { .. } => EXIT_SPAWN_FAILURE,
            Self::Signaled { signal } => EXIT_SIGNAL_BASE + signal,
            Self::TimedOut { .. } => EXIT_TIMED_OUT,
            Self::Interrupted => EXIT_INTERRUPTED,
        }
    }

    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed { .. } => "failed",
            Self::SpawnFailed { .. } => "spawn_failed",
            Self::Signaled { .. } => "signaled",
            Self::TimedOut { .. } => "timed_out",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed { code } => write!(f, "exit code {code}"),
            Self::SpawnFailed { message } => write!(f, "could not be started: {message}"),
            Self::Signaled { signal } => write!(f, "terminated by signal {signal}"),
            Self::TimedOut { after_secs } => write!(f, "timed out after {after_secs}s"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Which part of the pipeline a stage belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePhase {
    Main,
    Cleanup,
}

/// Record of one executed stage
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub name: String,
    pub phase: StagePhase,
    pub status: StageStatus,
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
}

/// Record of a whole pipeline run
///
/// Stages appear in execution order. Execution stops at the first failure,
/// so only the last entry can be unsuccessful.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
}

impl RunReport {
    /// Exit code of the last executed stage (0 if nothing ran)
    pub fn exit_code(&self) -> i32 {
        self.stages.last().map_or(0, |s| s.status.exit_code())
    }

    pub fn is_success(&self) -> bool {
        self.stages.iter().all(|s| s.status.is_success())
    }

    /// The stage that stopped the run, if any
    pub fn failed_stage(&self) -> Option<&StageReport> {
        self.stages.iter().find(|s| !s.status.is_success())
    }

    pub fn cleanup_ran(&self) -> bool {
        self.stages.iter().any(|s| s.phase == StagePhase::Cleanup)
    }

    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}
