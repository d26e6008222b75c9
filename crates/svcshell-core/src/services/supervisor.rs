//! The supervisor facade held by the shell.
//!
//! One `ServiceSupervisor` is built per run and shared by `Arc` with the
//! shutdown hooks. It owns all supervision state; callers never keep handles
//! or flags of their own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::SupervisorConfig;
use crate::domain::{
    LaunchMode, ServiceEndpoint, ServiceExit, StartupOutcome, StartupReport, StartupState,
};
use crate::error::SupervisorError;
use crate::ports::{ExitReceiver, HealthProbe, LaunchedService, Presenter, ServiceLauncher};

use super::{LifecycleManager, StartupOrchestrator};

/// Detects, starts, monitors and tears down the backend service.
///
/// # Example
///
/// ```ignore
/// let supervisor = Arc::new(ServiceSupervisor::new(config, probe, launcher, presenter));
/// let report = supervisor.start().await;
/// // ... on quit:
/// supervisor.terminate().await?;
/// ```
pub struct ServiceSupervisor {
    config: SupervisorConfig,
    orchestrator: StartupOrchestrator,
    lifecycle: Arc<LifecycleManager>,
    presenter: Arc<dyn Presenter>,
    started: AtomicBool,
}

impl ServiceSupervisor {
    pub fn new(
        config: SupervisorConfig,
        probe: Arc<dyn HealthProbe>,
        launcher: Arc<dyn ServiceLauncher>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let orchestrator = StartupOrchestrator::new(probe, launcher, config.policy);
        let lifecycle = Arc::new(LifecycleManager::new(Arc::clone(&presenter)));
        Self {
            config,
            orchestrator,
            lifecycle,
            presenter,
            started: AtomicBool::new(false),
        }
    }

    /// Run startup once and notify the presenter of the outcome.
    ///
    /// Exactly one of `on_ready` / `on_startup_failed` fires. A second call
    /// returns `Failed(AlreadyStarted)` and notifies nobody. When startup
    /// fails with the child still alive, its later exit is published to
    /// `subscribe_exit` but not reported as a crash.
    pub async fn start(&self) -> StartupReport {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Supervisor already started");
            let mut report = StartupReport::new();
            report.transitions.push(StartupState::Failed);
            report.outcome = StartupOutcome::Failed(SupervisorError::AlreadyStarted);
            return report;
        }

        let spec = self.config.launch_spec();
        let (report, launched) = self.orchestrator.run(self.config.launch_mode, &spec).await;

        // Install even when polling failed, so shutdown still reaps the child.
        if let Some(LaunchedService { handle, exit }) = launched {
            // The failure below is the only report for this service.
            if !report.outcome.is_ready() {
                self.lifecycle.mute_crash_reports();
            }
            self.lifecycle.install(handle);
            if let Some(exit) = exit {
                self.watch_exit(exit);
            }
        }

        match &report.outcome {
            StartupOutcome::Ready => self.presenter.on_ready(&self.config.endpoint.base_url()),
            StartupOutcome::Failed(err) => self.presenter.on_startup_failed(&err.to_string()),
        }
        report
    }

    fn watch_exit(&self, exit: ExitReceiver) {
        let lifecycle = Arc::clone(&self.lifecycle);
        tokio::spawn(async move {
            match exit.await {
                Ok(status) => {
                    lifecycle.on_unexpected_exit(status);
                }
                Err(_) => debug!("Exit watcher closed without a notification"),
            }
        });
    }

    /// Stop the owned service. Safe to call repeatedly and from any shutdown path.
    pub async fn terminate(&self) -> Result<(), SupervisorError> {
        self.lifecycle.terminate().await
    }

    pub const fn endpoint(&self) -> &ServiceEndpoint {
        &self.config.endpoint
    }

    pub const fn launch_mode(&self) -> LaunchMode {
        self.config.launch_mode
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn pid(&self) -> Option<u32> {
        self.lifecycle.pid()
    }

    /// Observe the exit of the owned service.
    pub fn subscribe_exit(&self) -> watch::Receiver<Option<ServiceExit>> {
        self.lifecycle.subscribe_exit()
    }
}
