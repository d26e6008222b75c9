//! Supervision services built on the ports.
//!
//! - [`StartupOrchestrator`]: probe, launch, poll; one outcome per attempt
//! - [`LifecycleManager`]: owns the service handle and turns exits into crash reports
//! - [`ServiceSupervisor`]: the facade the shell holds for its whole run

mod lifecycle;
mod orchestrator;
mod supervisor;

#[cfg(test)]
pub(crate) mod mocks;

pub use lifecycle::LifecycleManager;
pub use orchestrator::StartupOrchestrator;
pub use supervisor::ServiceSupervisor;
