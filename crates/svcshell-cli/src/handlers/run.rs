//! Run command handler.
//!
//! Brings the service up (or reuses a running one), then keeps the shell
//! alive until Ctrl-C, SIGTERM, or the service exits on its own.

use std::future::Future;
use std::io;
use std::sync::Arc;

use tracing::{info, warn};

use svcshell_core::{ServiceExit, ServiceSupervisor, StartupOutcome};

use crate::bootstrap::{CliConfig, build_supervisor};
use crate::error::CliError;
use crate::presenter::ConsolePresenter;

/// Execute the run command.
pub async fn execute(config: &CliConfig) -> Result<(), CliError> {
    let presenter = Arc::new(ConsolePresenter::new(config.open_browser));
    let supervisor = build_supervisor(config, presenter)?;
    supervise(&supervisor, config.json, shutdown_signal()).await
}

/// Start the service and hold it until `shutdown` resolves or it exits.
///
/// The owned service is terminated on every path out of this function.
pub async fn supervise<F>(
    supervisor: &ServiceSupervisor,
    json: bool,
    shutdown: F,
) -> Result<(), CliError>
where
    F: Future<Output = io::Result<()>>,
{
    let report = supervisor.start().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let StartupOutcome::Failed(err) = report.outcome {
        if let Err(cleanup) = supervisor.terminate().await {
            warn!(error = %cleanup, "Failed to stop service after startup failure");
        }
        return Err(err.into());
    }

    if report.reused_existing {
        info!(url = %supervisor.endpoint().base_url(), "Attached to running service");
    }

    let mut exits = supervisor.subscribe_exit();
    let waited = tokio::select! {
        signal = shutdown => Waited::Signal(signal),
        exit = async { exits.wait_for(Option::is_some).await.ok().and_then(|exit| *exit) } => {
            Waited::Exited(exit)
        }
    };

    let result = match waited {
        Waited::Signal(Ok(())) => {
            info!("Shutdown requested");
            Ok(())
        }
        Waited::Signal(Err(e)) => Err(CliError::Io(format!("signal handler failed: {e}"))),
        Waited::Exited(Some(exit)) if exit.is_success() => Ok(()),
        Waited::Exited(Some(exit)) => Err(CliError::Crashed(exit.code)),
        Waited::Exited(None) => Ok(()),
    };

    supervisor.terminate().await?;
    result
}

enum Waited {
    Signal(io::Result<()>),
    Exited(Option<ServiceExit>),
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        ctrl_c = tokio::signal::ctrl_c() => ctrl_c,
        _ = term.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}
