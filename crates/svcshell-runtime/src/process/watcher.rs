//! Exit watching for spawned services.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use svcshell_core::{ExitReceiver, ProcessRef, ServiceExit, SupervisorError};

use super::shutdown::shutdown_child;

/// Terminable reference to a child owned by its watcher task.
///
/// The watcher task is the only owner of the `Child`. It reaps the process
/// when it exits on its own, or shuts it down when `terminate` cancels it.
/// Either way exactly one [`ServiceExit`] is sent.
#[derive(Debug)]
pub struct SpawnedProcess {
    pid: Option<u32>,
    cancel: CancellationToken,
    finished: CancellationToken,
    shutdown_error: Arc<OnceLock<String>>,
}

impl SpawnedProcess {
    /// Hand `child` to a watcher task.
    pub(crate) fn watch(child: Child, grace: Duration) -> (Self, ExitReceiver) {
        let (tx, rx) = oneshot::channel();
        let process = Self {
            pid: child.id(),
            cancel: CancellationToken::new(),
            finished: CancellationToken::new(),
            shutdown_error: Arc::new(OnceLock::new()),
        };

        tokio::spawn(run_watcher(
            child,
            grace,
            process.cancel.clone(),
            process.finished.clone(),
            Arc::clone(&process.shutdown_error),
            tx,
        ));

        (process, rx)
    }

    /// True once the child has been reaped.
    pub fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }
}

#[async_trait]
impl ProcessRef for SpawnedProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    async fn terminate(&self) -> Result<(), SupervisorError> {
        self.cancel.cancel();
        self.finished.cancelled().await;
        match self.shutdown_error.get() {
            Some(reason) => Err(SupervisorError::Terminate(reason.clone())),
            None => Ok(()),
        }
    }
}

async fn run_watcher(
    mut child: Child,
    grace: Duration,
    cancel: CancellationToken,
    finished: CancellationToken,
    shutdown_error: Arc<OnceLock<String>>,
    tx: oneshot::Sender<ServiceExit>,
) {
    let pid = child.id();
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        () = cancel.cancelled() => None,
    };

    let status = match exited {
        Some(status) => status,
        None => {
            debug!(?pid, "Stopping service process");
            let status = shutdown_child(&mut child, grace).await;
            if let Err(e) = &status {
                let _ = shutdown_error.set(e.to_string());
            }
            status
        }
    };

    let exit = match status {
        Ok(status) => ServiceExit::from(status),
        Err(e) => {
            error!(?pid, error = %e, "Failed to reap service process");
            ServiceExit::new(None)
        }
    };
    debug!(?pid, code = ?exit.code, "Service process reaped");

    // The receiver is gone when nobody watches for crashes any more.
    let _ = tx.send(exit);
    finished.cancel();
}
