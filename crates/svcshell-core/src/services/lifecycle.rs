//! Ownership of the running service and crash detection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::ServiceExit;
use crate::error::SupervisorError;
use crate::ports::{Presenter, ServiceHandle};

#[derive(Debug, Default)]
struct LifecycleState {
    handle: ServiceHandle,
    /// Set before a deliberate stop so the resulting exit is not a crash.
    termination_requested: bool,
    /// Startup already reported a failure; a later exit is not a second one.
    crash_reports_muted: bool,
}

/// Holds the single service handle for the lifetime of the shell.
///
/// The lock is never held across an `.await`: `terminate` takes the handle
/// out first, then waits for the process without blocking other callers.
pub struct LifecycleManager {
    state: Mutex<LifecycleState>,
    presenter: Arc<dyn Presenter>,
    exited: watch::Sender<Option<ServiceExit>>,
}

impl LifecycleManager {
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        let (exited, _) = watch::channel(None);
        Self {
            state: Mutex::new(LifecycleState::default()),
            presenter,
            exited,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install the handle of a freshly launched service.
    ///
    /// Returns `false` (and keeps the current handle) when one is already held.
    pub fn install(&self, handle: ServiceHandle) -> bool {
        if handle.is_none() {
            return false;
        }
        let mut state = self.lock();
        if !state.handle.is_none() {
            warn!("A service handle is already installed; ignoring the new one");
            return false;
        }
        debug!(pid = ?handle.pid(), "Service handle installed");
        state.handle = handle;
        true
    }

    /// Stop reporting crashes. Exits are still published to subscribers.
    pub fn mute_crash_reports(&self) {
        self.lock().crash_reports_muted = true;
    }

    /// Stop the owned service, if any.
    ///
    /// Spawned processes are signalled and reaped; embedded services and an
    /// empty handle are left alone. Calling this again is a no-op.
    pub async fn terminate(&self) -> Result<(), SupervisorError> {
        let process = {
            let mut state = self.lock();
            match std::mem::take(&mut state.handle) {
                ServiceHandle::Spawned(process) => {
                    state.termination_requested = true;
                    process
                }
                ServiceHandle::Embedded => {
                    state.handle = ServiceHandle::Embedded;
                    debug!("Embedded service stops with the host process");
                    return Ok(());
                }
                ServiceHandle::None => {
                    debug!("No service to terminate");
                    return Ok(());
                }
            }
        };

        let pid = process.pid();
        info!(?pid, "Terminating service");
        process.terminate().await.inspect_err(|e| {
            error!(?pid, error = %e, "Failed to terminate service");
        })?;
        info!(?pid, "Service terminated");
        Ok(())
    }

    /// Handle an exit notification from the spawned service.
    ///
    /// Returns `true` when a crash was reported to the presenter.
    pub fn on_unexpected_exit(&self, exit: ServiceExit) -> bool {
        let crashed = self.record_exit(exit);
        self.exited.send_replace(Some(exit));
        crashed
    }

    fn record_exit(&self, exit: ServiceExit) -> bool {
        let mut state = self.lock();
        if state.termination_requested {
            debug!(code = ?exit.code, "Service exited after a requested termination");
            return false;
        }
        state.handle = ServiceHandle::None;
        let muted = state.crash_reports_muted;
        drop(state);

        if muted {
            debug!(code = ?exit.code, "Service exited after a failed startup");
            return false;
        }
        if exit.is_success() {
            info!("Service exited cleanly");
            return false;
        }
        error!(code = ?exit.code, "Service crashed");
        self.presenter.on_service_crashed(exit.code);
        true
    }

    pub fn is_running(&self) -> bool {
        !self.lock().handle.is_none()
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock().handle.pid()
    }

    /// Observe the exit of the spawned service (`None` until it exits).
    pub fn subscribe_exit(&self) -> watch::Receiver<Option<ServiceExit>> {
        self.exited.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryPoint, ExecutionMode, LaunchMode, LaunchSpec, ServiceEndpoint};
    use crate::ports::ServiceLauncher;
    use crate::services::mocks::{MockLauncher, MockPresenter};

    async fn spawned_handle(launcher: &MockLauncher) -> ServiceHandle {
        let spec = LaunchSpec {
            entry_point: EntryPoint::new("server.js"),
            endpoint: ServiceEndpoint::default(),
            execution_mode: ExecutionMode::Development,
            port_env: "PORT".into(),
            mode_env: "NODE_ENV".into(),
        };
        launcher
            .launch(LaunchMode::Subprocess, &spec)
            .await
            .unwrap()
            .handle
    }

    #[tokio::test]
    async fn test_terminate_without_handle_is_noop() {
        let manager = LifecycleManager::new(Arc::new(MockPresenter::default()));
        manager.terminate().await.unwrap();
        manager.terminate().await.unwrap();
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn test_terminate_embedded_is_noop() {
        let manager = LifecycleManager::new(Arc::new(MockPresenter::default()));
        assert!(manager.install(ServiceHandle::Embedded));
        manager.terminate().await.unwrap();
        assert!(manager.is_running());
        assert_eq!(manager.pid(), None);
    }

    #[tokio::test]
    async fn test_terminate_signals_once() {
        let launcher = MockLauncher::spawned();
        let manager = LifecycleManager::new(Arc::new(MockPresenter::default()));
        assert!(manager.install(spawned_handle(&launcher).await));
        assert_eq!(manager.pid(), Some(4242));

        manager.terminate().await.unwrap();
        manager.terminate().await.unwrap();

        assert_eq!(launcher.terminations(), 1);
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn test_second_install_is_refused() {
        let launcher = MockLauncher::spawned();
        let manager = LifecycleManager::new(Arc::new(MockPresenter::default()));
        assert!(manager.install(spawned_handle(&launcher).await));
        assert!(!manager.install(ServiceHandle::Embedded));
        assert_eq!(manager.pid(), Some(4242));
    }

    #[tokio::test]
    async fn test_exit_after_terminate_is_not_a_crash() {
        let launcher = MockLauncher::spawned();
        let presenter = Arc::new(MockPresenter::default());
        let manager = LifecycleManager::new(presenter.clone());
        manager.install(spawned_handle(&launcher).await);

        manager.terminate().await.unwrap();
        assert!(!manager.on_unexpected_exit(ServiceExit::new(None)));
        assert!(presenter.crash_codes().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_exit_reports_crash() {
        let launcher = MockLauncher::spawned();
        let presenter = Arc::new(MockPresenter::default());
        let manager = LifecycleManager::new(presenter.clone());
        manager.install(spawned_handle(&launcher).await);
        let exits = manager.subscribe_exit();

        assert!(manager.on_unexpected_exit(ServiceExit::new(Some(137))));
        assert_eq!(presenter.crash_codes(), vec![Some(137)]);
        assert!(!manager.is_running());
        assert_eq!(*exits.borrow(), Some(ServiceExit::new(Some(137))));

        // Handle is gone, nothing left to signal.
        manager.terminate().await.unwrap();
        assert_eq!(launcher.terminations(), 0);
    }

    #[tokio::test]
    async fn test_muted_exit_is_published_not_reported() {
        let launcher = MockLauncher::spawned();
        let presenter = Arc::new(MockPresenter::default());
        let manager = LifecycleManager::new(presenter.clone());
        manager.install(spawned_handle(&launcher).await);
        manager.mute_crash_reports();
        let exits = manager.subscribe_exit();

        assert!(!manager.on_unexpected_exit(ServiceExit::new(Some(1))));
        assert!(presenter.crash_codes().is_empty());
        assert!(!manager.is_running());
        assert_eq!(*exits.borrow(), Some(ServiceExit::new(Some(1))));
    }

    #[tokio::test]
    async fn test_clean_exit_is_not_a_crash() {
        let launcher = MockLauncher::spawned();
        let presenter = Arc::new(MockPresenter::default());
        let manager = LifecycleManager::new(presenter.clone());
        manager.install(spawned_handle(&launcher).await);

        assert!(!manager.on_unexpected_exit(ServiceExit::new(Some(0))));
        assert!(presenter.crash_codes().is_empty());
        assert!(!manager.is_running());
    }
}
