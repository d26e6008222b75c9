//! Domain types for service supervision.
//!
//! These are pure value types with no infrastructure dependencies.

mod endpoint;
mod launch;
mod policy;
mod probe;
mod startup;

pub use endpoint::{DEFAULT_HEALTH_PATH, DEFAULT_HOST, DEFAULT_PORT, ServiceEndpoint};
pub use launch::{EntryPoint, ExecutionMode, LaunchMode, LaunchSpec, ServiceExit};
pub use policy::RetryPolicy;
pub use probe::{ProbeFailure, ProbeResult};
pub use startup::{StartupOutcome, StartupReport, StartupState};
