#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by main.rs only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presenter;

pub use bootstrap::{CliConfig, HostEnvironment, build_supervisor};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
pub use presenter::ConsolePresenter;
