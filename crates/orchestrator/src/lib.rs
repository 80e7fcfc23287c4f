//! # Orchestrator
//!
//! Command-pipeline orchestration.
//!
//! Responsible for:
//! - Running stages strictly in order, stopping at the first failure
//! - Running the cleanup stage only after full success
//! - Executing stages as child processes with optional stdout redirection
//! - Forwarding shutdown requests to the running child

pub mod mock;
pub mod pipeline;
pub mod process;
pub mod shutdown;

pub use contracts::{RunReport, StageExecutor, StageStatus};
pub use mock::ScriptedExecutor;
pub use pipeline::Orchestrator;
pub use process::ProcessExecutor;
pub use shutdown::{listen_for_signals, Shutdown, ShutdownTrigger};
