#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod embedded;
mod health;
mod launcher;
pub mod process;

pub use embedded::{EmbeddedError, EmbeddedLauncher, EmbeddedService, StaticSiteService};
pub use health::{HttpHealthProbe, ProbeStrictness};
pub use launcher::DefaultLauncher;
pub use process::{ProcessLauncher, SpawnedProcess, shutdown_child};

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
