#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;
pub mod services;

// Silence unused dev-dependency warnings; these are exercised by tests/
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;

// Re-export commonly used types for convenience
pub use config::{DEFAULT_MODE_ENV, DEFAULT_PORT_ENV, SupervisorConfig};
pub use domain::{
    DEFAULT_HEALTH_PATH, DEFAULT_HOST, DEFAULT_PORT, EntryPoint, ExecutionMode, LaunchMode,
    LaunchSpec, ProbeFailure, ProbeResult, RetryPolicy, ServiceEndpoint, ServiceExit,
    StartupOutcome, StartupReport, StartupState,
};
pub use error::SupervisorError;
pub use paths::{PathError, is_packaged, repo_root, resource_root};
pub use ports::{
    ExitReceiver, HealthProbe, LaunchedService, NoopPresenter, Presenter, ProcessRef,
    ServiceHandle, ServiceLauncher,
};
pub use services::{LifecycleManager, ServiceSupervisor, StartupOrchestrator};
