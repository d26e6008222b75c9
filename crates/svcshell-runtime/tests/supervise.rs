//! Supervisor driven through the real adapters.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use svcshell_core::{
    EntryPoint, LaunchMode, NoopPresenter, RetryPolicy, ServiceEndpoint, ServiceSupervisor,
    StartupOutcome, SupervisorConfig, SupervisorError,
};
use svcshell_runtime::{DefaultLauncher, HttpHealthProbe, ProbeStrictness};

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn fast_policy(mode: LaunchMode) -> RetryPolicy {
    RetryPolicy::for_mode(mode)
        .with_grace_delay(Duration::from_millis(100))
        .with_poll_interval(Duration::from_millis(50))
        .with_probe_timeout(Duration::from_millis(500))
        .with_max_attempts(10)
}

fn supervisor(entry: EntryPoint, mode: LaunchMode, port: u16) -> ServiceSupervisor {
    let config = SupervisorConfig::new(ServiceEndpoint::new("127.0.0.1", port), entry, mode)
        .with_policy(fast_policy(mode));
    ServiceSupervisor::new(
        config,
        Arc::new(HttpHealthProbe::new(ProbeStrictness::SuccessStatus).unwrap()),
        Arc::new(DefaultLauncher::default()),
        Arc::new(NoopPresenter),
    )
}

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn in_process_service_becomes_ready() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(dir.path(), "index.html", "<html></html>");
    let sup = supervisor(EntryPoint::new(&entry), LaunchMode::InProcess, free_port());

    let report = sup.start().await;

    assert_eq!(report.outcome, StartupOutcome::Ready);
    assert!(!report.reused_existing);
    assert!(sup.is_running());
    // Embedded services are not terminable.
    sup.terminate().await.unwrap();
    assert!(sup.is_running());
}

#[tokio::test]
async fn existing_instance_is_reused_without_launching() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(dir.path(), "index.html", "");
    let port = free_port();

    let first = supervisor(EntryPoint::new(&entry), LaunchMode::InProcess, port);
    assert!(first.start().await.outcome.is_ready());

    // Entry point is absent: a launch attempt would fail.
    let second = supervisor(
        EntryPoint::new(dir.path().join("missing.html")),
        LaunchMode::InProcess,
        port,
    );
    let report = second.start().await;

    assert!(report.outcome.is_ready());
    assert!(report.reused_existing);
    assert!(!second.is_running());
}

#[tokio::test]
async fn unroutable_health_path_fails_in_process_launch() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(dir.path(), "index.html", "");
    let port = free_port();
    let config = SupervisorConfig::new(
        ServiceEndpoint::new("127.0.0.1", port).with_health_path("/api/*"),
        EntryPoint::new(&entry),
        LaunchMode::InProcess,
    )
    .with_policy(fast_policy(LaunchMode::InProcess));
    let sup = ServiceSupervisor::new(
        config,
        Arc::new(HttpHealthProbe::new(ProbeStrictness::SuccessStatus).unwrap()),
        Arc::new(DefaultLauncher::default()),
        Arc::new(NoopPresenter),
    );

    let report = sup.start().await;

    assert!(matches!(
        report.outcome,
        StartupOutcome::Failed(SupervisorError::Launch(_))
    ));
    assert!(!sup.is_running());
}

#[cfg(unix)]
#[tokio::test]
async fn crashing_subprocess_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(dir.path(), "server.sh", "exit 2\n");
    let sup = supervisor(
        EntryPoint::new(&entry).with_program("sh"),
        LaunchMode::Subprocess,
        free_port(),
    );

    let report = sup.start().await;

    assert_eq!(
        report.outcome,
        StartupOutcome::Failed(SupervisorError::UnexpectedExit { code: Some(2) })
    );
    assert!(!sup.is_running());
}

#[cfg(unix)]
#[tokio::test]
async fn silent_subprocess_times_out_and_is_reaped() {
    let dir = tempfile::tempdir().unwrap();
    let entry = write(dir.path(), "server.sh", "exec sleep 30\n");
    let sup = supervisor(
        EntryPoint::new(&entry).with_program("sh"),
        LaunchMode::Subprocess,
        free_port(),
    );

    let report = sup.start().await;

    assert_eq!(
        report.outcome,
        StartupOutcome::Failed(SupervisorError::StartupTimeout { attempts: 10 })
    );
    assert!(sup.pid().is_some());

    let mut exits = sup.subscribe_exit();
    sup.terminate().await.unwrap();
    assert!(!sup.is_running());
    let exit = *exits.wait_for(Option::is_some).await.unwrap();
    assert_eq!(exit.map(|e| e.code), Some(None));
}
