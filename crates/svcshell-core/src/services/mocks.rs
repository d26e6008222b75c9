//! Hand-written port mocks shared by the service unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::domain::{
    LaunchMode, LaunchSpec, ProbeFailure, ProbeResult, ServiceEndpoint, ServiceExit,
};
use crate::error::SupervisorError;
use crate::ports::{HealthProbe, LaunchedService, Presenter, ProcessRef, ServiceLauncher};

/// Probe that becomes reachable once `ready_after` has elapsed since creation.
pub struct MockProbe {
    ready_after: Option<Duration>,
    created: Instant,
    calls: AtomicU32,
}

impl MockProbe {
    pub fn never() -> Self {
        Self {
            ready_after: None,
            created: Instant::now(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn always() -> Self {
        Self::after(Duration::ZERO)
    }

    pub fn after(ready_after: Duration) -> Self {
        Self {
            ready_after: Some(ready_after),
            created: Instant::now(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for MockProbe {
    async fn probe(&self, _endpoint: &ServiceEndpoint, _timeout: Duration) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.ready_after {
            Some(delay) if self.created.elapsed() >= delay => ProbeResult::Reachable,
            _ => ProbeResult::Unreachable(ProbeFailure::Connect("connection refused".into())),
        }
    }
}

type SharedExit = Arc<Mutex<Option<oneshot::Sender<ServiceExit>>>>;

fn send_exit(slot: &SharedExit, exit: ServiceExit) {
    if let Some(tx) = slot.lock().unwrap().take() {
        let _ = tx.send(exit);
    }
}

/// Fake child process; terminating it delivers an exit like a real reaper would.
#[derive(Debug)]
pub struct MockProcess {
    terminations: Arc<AtomicU32>,
    exit: SharedExit,
}

#[async_trait]
impl ProcessRef for MockProcess {
    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    async fn terminate(&self) -> Result<(), SupervisorError> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        send_exit(&self.exit, ServiceExit::new(None));
        Ok(())
    }
}

/// What the mock launcher produces.
pub enum LaunchBehavior {
    Embedded,
    /// Spawned child that optionally exits by itself after a delay.
    Spawned { exit_after: Option<(Duration, Option<i32>)> },
    Fail(SupervisorError),
}

pub struct MockLauncher {
    behavior: LaunchBehavior,
    calls: AtomicU32,
    terminations: Arc<AtomicU32>,
}

impl MockLauncher {
    pub fn new(behavior: LaunchBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU32::new(0),
            terminations: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn spawned() -> Self {
        Self::new(LaunchBehavior::Spawned { exit_after: None })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> u32 {
        self.terminations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceLauncher for MockLauncher {
    async fn launch(
        &self,
        _mode: LaunchMode,
        _spec: &LaunchSpec,
    ) -> Result<LaunchedService, SupervisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            LaunchBehavior::Embedded => Ok(LaunchedService::embedded()),
            LaunchBehavior::Fail(err) => Err(err.clone()),
            LaunchBehavior::Spawned { exit_after } => {
                let (tx, rx) = oneshot::channel();
                let slot: SharedExit = Arc::new(Mutex::new(Some(tx)));
                if let Some((delay, code)) = *exit_after {
                    let slot = Arc::clone(&slot);
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        send_exit(&slot, ServiceExit::new(code));
                    });
                }
                let process = MockProcess {
                    terminations: Arc::clone(&self.terminations),
                    exit: slot,
                };
                Ok(LaunchedService::spawned(Box::new(process), rx))
            }
        }
    }
}

/// Presenter that records every callback.
#[derive(Default)]
pub struct MockPresenter {
    pub ready: Mutex<Vec<String>>,
    pub failures: Mutex<Vec<String>>,
    pub crashes: Mutex<Vec<Option<i32>>>,
}

impl MockPresenter {
    pub fn ready_count(&self) -> usize {
        self.ready.lock().unwrap().len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().unwrap().len()
    }

    pub fn crash_codes(&self) -> Vec<Option<i32>> {
        self.crashes.lock().unwrap().clone()
    }
}

impl Presenter for MockPresenter {
    fn on_ready(&self, url: &str) {
        self.ready.lock().unwrap().push(url.to_string());
    }

    fn on_startup_failed(&self, reason: &str) {
        self.failures.lock().unwrap().push(reason.to_string());
    }

    fn on_service_crashed(&self, code: Option<i32>) {
        self.crashes.lock().unwrap().push(code);
    }
}
