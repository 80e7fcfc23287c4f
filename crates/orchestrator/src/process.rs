//! ProcessExecutor - runs stages as child processes
//!
//! stdin and stderr are inherited so the tool's own diagnostics reach the
//! user unmodified. stdout is inherited too unless the stage redirects it to
//! a file, which is created (truncated) before the program starts.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use contracts::{StageConfig, StageExecutor, StageStatus};
use tokio::process::{Child, Command};
use tracing::{debug, instrument, warn};

use crate::shutdown::Shutdown;

/// How waiting on a child ended
enum Waited {
    Exited(io::Result<ExitStatus>),
    TimedOut(u64),
    Interrupted,
}

/// Executes stages as real processes
#[derive(Debug, Default)]
pub struct ProcessExecutor {
    working_dir: Option<PathBuf>,
    shutdown: Option<Shutdown>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every stage in `dir`; relative program paths and stdout targets resolve against it
    ///
    /// A relative `dir` is made absolute against the current directory, since
    /// the child resolves its program path after changing into `dir`.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.working_dir = Some(std::path::absolute(&dir).unwrap_or(dir));
        self
    }

    /// Kill the running stage and stop when shutdown is requested
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Programs given as relative paths (`./target/release/raytracer`) are
    /// joined to the working directory; bare names are left to PATH lookup.
    fn resolve_program(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        match &self.working_dir {
            Some(dir) if path.is_relative() && path.components().count() > 1 => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn build_command(&self, stage: &StageConfig) -> io::Result<Command> {
        let mut cmd = Command::new(self.resolve_program(&stage.program));
        cmd.args(&stage.args)
            .envs(&stage.env)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        match stage.stdout {
            Some(ref target) => {
                let path = self.resolve_path(target);
                let file = File::create(&path).map_err(|e| {
                    io::Error::new(
                        e.kind(),
                        format!("cannot create stdout target {}: {e}", path.display()),
                    )
                })?;
                cmd.stdout(Stdio::from(file));
            }
            None => {
                cmd.stdout(Stdio::inherit());
            }
        }

        Ok(cmd)
    }

    async fn wait_child(&mut self, child: &mut Child, timeout_secs: Option<u64>) -> Waited {
        let deadline = async {
            match timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async {
            match self.shutdown.as_mut() {
                Some(shutdown) => shutdown.wait().await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            status = child.wait() => Waited::Exited(status),
            _ = deadline => Waited::TimedOut(timeout_secs.unwrap_or_default()),
            _ = cancelled => Waited::Interrupted,
        }
    }
}

impl StageExecutor for ProcessExecutor {
    fn name(&self) -> &str {
        "process"
    }

    #[instrument(
        name = "process_execute",
        skip(self, stage),
        fields(stage = %stage.name, program = %stage.program)
    )]
    async fn execute(&mut self, stage: &StageConfig) -> StageStatus {
        if self.shutdown_requested() {
            return StageStatus::Interrupted;
        }

        let mut cmd = match self.build_command(stage) {
            Ok(cmd) => cmd,
            Err(e) => {
                return StageStatus::SpawnFailed {
                    message: e.to_string(),
                }
            }
        };

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return StageStatus::SpawnFailed {
                    message: format!("{}: {e}", stage.program),
                }
            }
        };

        debug!(pid = ?child.id(), "Stage process spawned");

        match self.wait_child(&mut child, stage.timeout_secs).await {
            Waited::Exited(Ok(status)) => status_from_exit(status),
            Waited::Exited(Err(e)) => {
                warn!(error = %e, "Failed to wait for stage process");
                StageStatus::SpawnFailed {
                    message: format!("failed to wait for process: {e}"),
                }
            }
            Waited::TimedOut(after_secs) => {
                terminate(&mut child).await;
                StageStatus::TimedOut { after_secs }
            }
            Waited::Interrupted => {
                terminate(&mut child).await;
                StageStatus::Interrupted
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(Shutdown::is_triggered)
    }
}

/// Kill the child and reap it
async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(pid = ?child.id(), error = %e, "Failed to kill stage process");
    }
}

fn status_from_exit(status: ExitStatus) -> StageStatus {
    match status.code() {
        Some(0) => StageStatus::Succeeded,
        Some(code) => StageStatus::Failed { code },
        None => signal_status(status),
    }
}

#[cfg(unix)]
fn signal_status(status: ExitStatus) -> StageStatus {
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(signal) => StageStatus::Signaled { signal },
        None => StageStatus::Failed { code: 1 },
    }
}

#[cfg(not(unix))]
fn signal_status(_status: ExitStatus) -> StageStatus {
    StageStatus::Failed { code: 1 }
}
