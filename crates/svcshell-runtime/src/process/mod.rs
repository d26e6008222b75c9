//! Child-process management for the subprocess launch mode.
//!
//! - [`ProcessLauncher`] spawns the service with the environment contract
//! - [`SpawnedProcess`] is the terminable reference handed to the core
//! - [`shutdown_child`] stops a child gracefully and reaps it

mod launcher;
mod shutdown;
mod watcher;

pub use launcher::ProcessLauncher;
pub use shutdown::{DEFAULT_SHUTDOWN_GRACE, shutdown_child};
pub use watcher::SpawnedProcess;
