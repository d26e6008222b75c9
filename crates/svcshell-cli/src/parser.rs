//! Main CLI parser and top-level argument handling.
//!
//! All service options are global so they can be given before or after the
//! subcommand, and each one can also come from an `SVCSHELL_*` variable.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, ValueEnum};

use svcshell_core::{DEFAULT_HEALTH_PATH, DEFAULT_HOST, DEFAULT_PORT, RetryPolicy};

use crate::commands::Commands;

/// How the service should be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// In-process when packaged, subprocess in a development checkout
    Auto,
    InProcess,
    Subprocess,
}

/// Execution mode passed to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionModeArg {
    Production,
    Development,
}

/// Where the service lives and how to start it.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    /// Host the service listens on
    #[arg(long, env = "SVCSHELL_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    /// Port reserved for the service
    #[arg(long, env = "SVCSHELL_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Path of the health endpoint
    #[arg(long = "health-path", env = "SVCSHELL_HEALTH_PATH", default_value = DEFAULT_HEALTH_PATH, global = true)]
    pub health_path: String,

    /// Service entry file (default: webui/index.html when packaged, server.js in a checkout)
    #[arg(long, env = "SVCSHELL_ENTRY", global = true)]
    pub entry: Option<String>,

    /// Interpreter that runs the entry file in subprocess mode (empty to execute it directly)
    #[arg(long, env = "SVCSHELL_INTERPRETER", global = true)]
    pub interpreter: Option<String>,

    /// Interpreter command line, e.g. "node --max-old-space-size=4096"; the entry file is appended
    #[arg(long = "service-cmd", env = "SVCSHELL_SERVICE_CMD", global = true)]
    pub service_cmd: Option<String>,

    /// Launch mode
    #[arg(long, env = "SVCSHELL_MODE", value_enum, default_value_t = ModeArg::Auto, global = true)]
    pub mode: ModeArg,

    /// Execution mode passed to the service (default: production when packaged)
    #[arg(long = "execution-mode", env = "SVCSHELL_EXECUTION_MODE", value_enum, global = true)]
    pub execution_mode: Option<ExecutionModeArg>,

    /// Environment variable carrying the port to the service
    #[arg(long = "port-env", env = "SVCSHELL_PORT_ENV", default_value = svcshell_core::DEFAULT_PORT_ENV, global = true)]
    pub port_env: String,

    /// Environment variable carrying the execution mode to the service
    #[arg(long = "mode-env", env = "SVCSHELL_MODE_ENV", default_value = svcshell_core::DEFAULT_MODE_ENV, global = true)]
    pub mode_env: String,

    /// Treat any HTTP answer as healthy, not only 2xx
    #[arg(long = "any-response", env = "SVCSHELL_ANY_RESPONSE", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new(), global = true)]
    pub any_response: bool,

    /// Maximum health polls after launch
    #[arg(long = "max-attempts", env = "SVCSHELL_MAX_ATTEMPTS", default_value_t = RetryPolicy::DEFAULT_MAX_ATTEMPTS, global = true)]
    pub max_attempts: u32,

    /// Pause between health polls, in milliseconds
    #[arg(long = "poll-interval-ms", env = "SVCSHELL_POLL_INTERVAL_MS", default_value_t = 500, global = true)]
    pub poll_interval_ms: u64,

    /// Wait after launch before the first poll (default: 2000 in-process, 3000 subprocess)
    #[arg(long = "grace-ms", env = "SVCSHELL_GRACE_MS", global = true)]
    pub grace_ms: Option<u64>,

    /// Wait between SIGTERM and SIGKILL when stopping a service process, in milliseconds
    #[arg(long = "shutdown-grace-ms", env = "SVCSHELL_SHUTDOWN_GRACE_MS", default_value_t = 5000, global = true)]
    pub shutdown_grace_ms: u64,
}

/// Command-line interface for the local service supervisor.
///
/// Without a subcommand, `run` is assumed.
#[derive(Debug, Parser)]
#[command(name = "svcshell")]
#[command(about = "Start, monitor and stop the local backend service behind a desktop shell")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Do not open the UI in the browser once the service is ready
    #[arg(long = "no-open", env = "SVCSHELL_NO_OPEN", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new(), global = true)]
    pub no_open: bool,

    /// Print the startup report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run, `run` when none was given.
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}
