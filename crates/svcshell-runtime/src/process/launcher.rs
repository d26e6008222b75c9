//! Subprocess launch of the backend service.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use svcshell_core::{ExecutionMode, LaunchSpec, LaunchedService, SupervisorError};

use super::shutdown::DEFAULT_SHUTDOWN_GRACE;
use super::watcher::SpawnedProcess;

/// `tracing` target for lines written by the service.
const SERVICE_LOG_TARGET: &str = "svcshell::service";

/// Spawns the service as a child process.
///
/// The child receives the port and execution-mode variables on top of the
/// inherited environment, a closed stdin, and is killed if its handle is
/// dropped without a shutdown.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    shutdown_grace: Duration,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher {
    pub const fn new() -> Self {
        Self {
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Time allowed between SIGTERM and SIGKILL on shutdown.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Spawn the service described by `spec`.
    ///
    /// Fails with `EntryPointMissing` before spawning anything when the
    /// entry file is absent.
    pub fn spawn(&self, spec: &LaunchSpec) -> Result<LaunchedService, SupervisorError> {
        spec.entry_point.ensure_exists()?;

        let mut cmd = build_command(spec)?;
        let mut child = cmd.spawn().map_err(|e| {
            SupervisorError::Launch(format!(
                "failed to spawn `{}`: {e}",
                spec.entry_point.command_line().join(" ")
            ))
        })?;

        let pid = child.id();
        info!(
            pid = ?pid,
            port = spec.endpoint.port(),
            mode = %spec.execution_mode,
            "Spawned service process"
        );

        if spec.execution_mode.is_production() {
            spawn_log_readers(&mut child, pid);
        }

        let (process, exit) = SpawnedProcess::watch(child, self.shutdown_grace);
        Ok(LaunchedService::spawned(Box::new(process), exit))
    }
}

fn absolute(path: &Path) -> Result<PathBuf, SupervisorError> {
    std::path::absolute(path).map_err(|e| {
        SupervisorError::Launch(format!("cannot resolve {}: {e}", path.display()))
    })
}

fn build_command(spec: &LaunchSpec) -> Result<Command, SupervisorError> {
    let entry = &spec.entry_point;
    let entry_path = absolute(&entry.path)?;

    let mut cmd = match &entry.program {
        Some(program) => {
            let mut cmd = Command::new(program);
            cmd.args(&entry.program_args).arg(&entry_path);
            cmd
        }
        None => Command::new(&entry_path),
    };
    cmd.args(&entry.args);

    if let Some(dir) = entry.working_dir() {
        cmd.current_dir(absolute(dir)?);
    }

    cmd.env(&spec.port_env, spec.endpoint.port().to_string())
        .env(&spec.mode_env, spec.execution_mode.as_str())
        .stdin(Stdio::null())
        .kill_on_drop(true);

    match spec.execution_mode {
        ExecutionMode::Production => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
        ExecutionMode::Development => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
    }

    debug!(
        command = %entry.command_line().join(" "),
        cwd = ?entry.working_dir(),
        "Built service command"
    );
    Ok(cmd)
}

/// Forward the child's output to `tracing`, one event per line.
fn spawn_log_readers(child: &mut Child, pid: Option<u32>) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, pid, false));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, pid, true));
    }
}

async fn forward_lines<R>(stream: R, pid: Option<u32>, is_stderr: bool)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!(target: SERVICE_LOG_TARGET, pid = ?pid, "{line}");
        } else {
            info!(target: SERVICE_LOG_TARGET, pid = ?pid, "{line}");
        }
    }
    debug!(pid = ?pid, stderr = is_stderr, "Service output reader exiting");
}
