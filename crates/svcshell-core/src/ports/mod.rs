//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the supervision logic expects from
//! infrastructure. They contain no socket or process implementation details.
//!
//! # Design Rules
//!
//! - Express **intent** (probe, launch, terminate, notify), not mechanism
//! - No `reqwest`, `axum` or `tokio::process` types in any signature
//! - Every port can be replaced by a hand-written mock in tests

mod health_probe;
mod launcher;
mod presenter;

pub use health_probe::HealthProbe;
pub use launcher::{ExitReceiver, LaunchedService, ProcessRef, ServiceHandle, ServiceLauncher};
pub use presenter::{NoopPresenter, Presenter};
