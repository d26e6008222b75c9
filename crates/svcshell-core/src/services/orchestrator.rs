//! Startup orchestration: reuse, launch, poll.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::domain::{
    LaunchMode, LaunchSpec, ProbeFailure, ProbeResult, RetryPolicy, ServiceEndpoint, ServiceExit,
    StartupOutcome, StartupReport, StartupState,
};
use crate::error::SupervisorError;
use crate::ports::{ExitReceiver, HealthProbe, LaunchedService, ServiceLauncher};

/// Drives one startup attempt through the state machine.
///
/// `Idle → ProbingExisting → (Ready | Launching) → PollingHealth → (Ready | Failed)`
///
/// Probes run sequentially on the caller's task and never overlap. An exit
/// notification from a spawned service is raced against every wait after
/// launch, so a service dying early ends the attempt immediately.
pub struct StartupOrchestrator {
    probe: Arc<dyn HealthProbe>,
    launcher: Arc<dyn ServiceLauncher>,
    policy: RetryPolicy,
}

/// Result of racing a wait against the exit notification.
enum Raced<T> {
    Done(T),
    Exited(ServiceExit),
}

impl StartupOrchestrator {
    pub fn new(
        probe: Arc<dyn HealthProbe>,
        launcher: Arc<dyn ServiceLauncher>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            probe,
            launcher,
            policy,
        }
    }

    /// Run one startup attempt.
    ///
    /// Returns the report and, when the launched service may still be
    /// running, its handle and exit receiver. A reused external instance
    /// yields no launched service: it is not ours to terminate.
    pub async fn run(
        &self,
        mode: LaunchMode,
        spec: &LaunchSpec,
    ) -> (StartupReport, Option<LaunchedService>) {
        let mut report = StartupReport::new();
        let endpoint = &spec.endpoint;

        enter(&mut report, StartupState::Idle);
        enter(&mut report, StartupState::ProbingExisting);

        let existing = self
            .probe_once(endpoint, self.policy.existing_probe_timeout)
            .await;
        if existing.is_reachable() {
            info!(
                port = endpoint.port(),
                "Healthy service already listening, reusing it"
            );
            report.reused_existing = true;
            enter(&mut report, StartupState::Ready);
            return (report, None);
        }
        if let ProbeResult::Unreachable(cause) = &existing {
            debug!(%cause, "No existing service");
        }

        enter(&mut report, StartupState::Launching);
        info!(
            mode = %mode,
            port = endpoint.port(),
            entry = %spec.entry_point.path.display(),
            "Launching service"
        );
        let mut launched = match self.launcher.launch(mode, spec).await {
            Ok(launched) => launched,
            Err(err) => {
                error!(error = %err, "Service launch failed");
                return (fail(report, err), None);
            }
        };
        if let Some(pid) = launched.handle.pid() {
            info!(pid, "Service process started");
        }

        enter(&mut report, StartupState::PollingHealth);
        match self
            .poll_until_ready(endpoint, &mut launched.exit, &mut report)
            .await
        {
            Ok(()) => {
                info!(
                    attempts = report.attempts_used,
                    url = %endpoint.base_url(),
                    "Service is ready"
                );
                enter(&mut report, StartupState::Ready);
                (report, Some(launched))
            }
            Err(err @ SupervisorError::UnexpectedExit { .. }) => {
                error!(error = %err, "Service exited during startup");
                (fail(report, err), None)
            }
            Err(err) => {
                error!(error = %err, "Service failed to become healthy");
                (fail(report, err), Some(launched))
            }
        }
    }

    async fn poll_until_ready(
        &self,
        endpoint: &ServiceEndpoint,
        exit: &mut Option<ExitReceiver>,
        report: &mut StartupReport,
    ) -> Result<(), SupervisorError> {
        debug!(
            grace_ms = duration_ms(self.policy.grace_delay),
            "Waiting for service to bind"
        );
        if let Raced::Exited(status) = race(exit, tokio::time::sleep(self.policy.grace_delay)).await
        {
            return Err(unexpected(status));
        }

        let attempts = self.policy.attempts();
        for attempt in 1..=attempts {
            report.attempts_used = attempt;
            match race(exit, self.probe_once(endpoint, self.policy.probe_timeout)).await {
                Raced::Exited(status) => return Err(unexpected(status)),
                Raced::Done(ProbeResult::Reachable) => return Ok(()),
                Raced::Done(ProbeResult::Unreachable(cause)) => {
                    debug!(attempt, max_attempts = attempts, %cause, "Service not ready yet");
                }
            }

            if attempt < attempts {
                if let Raced::Exited(status) =
                    race(exit, tokio::time::sleep(self.policy.poll_interval)).await
                {
                    return Err(unexpected(status));
                }
            }
        }

        Err(SupervisorError::StartupTimeout { attempts })
    }

    /// One probe, bounded here as well so a misbehaving adapter cannot stall polling.
    async fn probe_once(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> ProbeResult {
        match tokio::time::timeout(timeout, self.probe.probe(endpoint, timeout)).await {
            Ok(result) => result,
            Err(_) => timed_out(timeout),
        }
    }
}

/// Wait for `fut` unless the service exits first.
///
/// A closed channel without a notification means the watcher is gone; the
/// wait continues without it.
async fn race<F: Future>(exit: &mut Option<ExitReceiver>, fut: F) -> Raced<F::Output> {
    tokio::pin!(fut);
    loop {
        let Some(rx) = exit.as_mut() else {
            return Raced::Done(fut.await);
        };
        let received = tokio::select! {
            out = &mut fut => return Raced::Done(out),
            received = rx => received,
        };
        // A oneshot must not be polled again once it resolved.
        *exit = None;
        match received {
            Ok(status) => return Raced::Exited(status),
            Err(_) => warn!("Exit channel closed without a notification"),
        }
    }
}

/// A probe that overran its timeout reads as an unreachable service.
fn timed_out(timeout: Duration) -> ProbeResult {
    let err = SupervisorError::ProbeTimeout {
        timeout_ms: duration_ms(timeout),
    };
    debug!(error = %err, "Probe adapter did not answer");
    ProbeResult::Unreachable(ProbeFailure::Timeout)
}

fn enter(report: &mut StartupReport, state: StartupState) {
    debug!(state = %state, "Startup state changed");
    report.transitions.push(state);
}

fn fail(mut report: StartupReport, err: SupervisorError) -> StartupReport {
    enter(&mut report, StartupState::Failed);
    report.outcome = StartupOutcome::Failed(err);
    report
}

const fn unexpected(status: ServiceExit) -> SupervisorError {
    SupervisorError::UnexpectedExit { code: status.code }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
