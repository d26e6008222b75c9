//! Available subcommands.

use clap::Subcommand;

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Supervise the service: reuse or launch it, open the UI, stop it on Ctrl-C
    Run,

    /// Check once whether the service answers its health endpoint
    Probe,
}
