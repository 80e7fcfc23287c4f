//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace:
//! the pipeline blueprint, stage outcomes and the executor trait.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Exit code model
//! - A run's exit code is the exit code of the last stage it executed
//! - Statuses without a native exit code map to fixed codes (127, 124, 130, 128 + signal)

mod blueprint;
mod error;
mod executor;
mod status;

pub use blueprint::*;
pub use error::*;
pub use executor::{LocalStageExecutor, StageExecutor};
pub use status::*;
