//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Launch mode, entry point and retry policy resolved from arguments
//! - Health probe and launcher (via svcshell-runtime)
//! - The supervisor facade (via svcshell-core)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use svcshell_core::paths::absolutize;
use svcshell_core::{
    EntryPoint, ExecutionMode, LaunchMode, Presenter, RetryPolicy, ServiceEndpoint,
    ServiceSupervisor, SupervisorConfig,
};
use svcshell_runtime::{
    DefaultLauncher, EmbeddedLauncher, HttpHealthProbe, ProbeStrictness, ProcessLauncher,
};

use crate::error::CliError;
use crate::parser::{Cli, ExecutionModeArg, ModeArg, ServiceArgs};

/// Interpreter for the development entry point.
pub const DEFAULT_INTERPRETER: &str = "node";

/// Development entry, relative to the repository root.
const DEV_ENTRY: &str = "server.js";

/// Packaged entry, relative to the resource root.
const PACKAGED_ENTRY: [&str; 2] = ["webui", "index.html"];

/// Facts about the host that shape the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    /// Running from a packaged distribution rather than a checkout.
    pub packaged: bool,
    /// Execution mode value found in the shell's own environment.
    pub inherited_mode: Option<String>,
}

impl HostEnvironment {
    /// Inspect the current process.
    pub fn detect(mode_env: &str) -> Self {
        Self {
            packaged: svcshell_core::is_packaged(),
            inherited_mode: std::env::var(mode_env).ok(),
        }
    }
}

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub supervisor: SupervisorConfig,
    pub strictness: ProbeStrictness,
    /// SIGTERM to SIGKILL window for spawned services.
    pub shutdown_grace: Duration,
    pub open_browser: bool,
    pub json: bool,
}

impl CliConfig {
    /// Resolve the configuration for this process.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let host = HostEnvironment::detect(&cli.service.mode_env);
        Self::resolve(cli, &host)
    }

    /// Resolve against an explicit host environment.
    pub fn resolve(cli: &Cli, host: &HostEnvironment) -> Result<Self, CliError> {
        let args = &cli.service;
        validate(args)?;

        let launch_mode = match args.mode {
            ModeArg::Auto => LaunchMode::detect(host.packaged),
            ModeArg::InProcess => LaunchMode::InProcess,
            ModeArg::Subprocess => LaunchMode::Subprocess,
        };

        let endpoint =
            ServiceEndpoint::new(args.host.trim(), args.port).with_health_path(&args.health_path);
        let entry_point = resolve_entry(args, launch_mode, host)?;
        let execution_mode = resolve_execution_mode(args.execution_mode, host);

        let mut policy = RetryPolicy::for_mode(launch_mode)
            .with_max_attempts(args.max_attempts)
            .with_poll_interval(Duration::from_millis(args.poll_interval_ms));
        if let Some(grace_ms) = args.grace_ms {
            policy = policy.with_grace_delay(Duration::from_millis(grace_ms));
        }

        let supervisor = SupervisorConfig::new(endpoint, entry_point, launch_mode)
            .with_execution_mode(execution_mode)
            .with_policy(policy)
            .with_port_env(&args.port_env)
            .with_mode_env(&args.mode_env);

        let strictness = if args.any_response {
            ProbeStrictness::AnyResponse
        } else {
            ProbeStrictness::SuccessStatus
        };

        Ok(Self {
            supervisor,
            strictness,
            shutdown_grace: Duration::from_millis(args.shutdown_grace_ms),
            open_browser: !cli.no_open,
            json: cli.json,
        })
    }
}

fn validate(args: &ServiceArgs) -> Result<(), CliError> {
    if args.host.trim().is_empty() {
        return Err(CliError::Arguments("--host must not be empty".into()));
    }
    if args.port == 0 {
        return Err(CliError::Arguments("--port must be a fixed port, not 0".into()));
    }
    if args.port_env.trim().is_empty() || args.mode_env.trim().is_empty() {
        return Err(CliError::Arguments(
            "--port-env and --mode-env must not be empty".into(),
        ));
    }
    Ok(())
}

/// Packaged runs are production; checkouts follow the shell's own environment.
fn resolve_execution_mode(
    explicit: Option<ExecutionModeArg>,
    host: &HostEnvironment,
) -> ExecutionMode {
    match explicit {
        Some(ExecutionModeArg::Production) => ExecutionMode::Production,
        Some(ExecutionModeArg::Development) => ExecutionMode::Development,
        None if host.packaged => ExecutionMode::Production,
        None => host
            .inherited_mode
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default(),
    }
}

fn default_entry_path(
    launch_mode: LaunchMode,
    host: &HostEnvironment,
) -> Result<PathBuf, CliError> {
    match launch_mode {
        LaunchMode::InProcess => {
            let root = svcshell_core::resource_root()?;
            Ok(PACKAGED_ENTRY.iter().fold(root, |path, part| path.join(part)))
        }
        LaunchMode::Subprocess => {
            let root = match svcshell_core::repo_root() {
                Some(repo) if !host.packaged => repo,
                _ => svcshell_core::resource_root()?,
            };
            Ok(root.join(DEV_ENTRY))
        }
    }
}

fn resolve_entry(
    args: &ServiceArgs,
    launch_mode: LaunchMode,
    host: &HostEnvironment,
) -> Result<EntryPoint, CliError> {
    let path = match &args.entry {
        Some(raw) => absolutize(raw)?,
        None => default_entry_path(launch_mode, host)?,
    };
    let entry = EntryPoint::new(path);

    // Embedded services have no interpreter.
    if launch_mode == LaunchMode::InProcess {
        return Ok(entry);
    }

    if let Some(cmd) = &args.service_cmd {
        let mut words = shlex::split(cmd)
            .ok_or_else(|| CliError::Arguments(format!("invalid --service-cmd: {cmd}")))?;
        if words.is_empty() {
            return Err(CliError::Arguments("--service-cmd is empty".into()));
        }
        let program = words.remove(0);
        return Ok(entry.with_program(program).with_program_args(words));
    }

    let interpreter = args
        .interpreter
        .as_deref()
        .unwrap_or(DEFAULT_INTERPRETER)
        .trim();
    if interpreter.is_empty() {
        Ok(entry)
    } else {
        Ok(entry.with_program(interpreter))
    }
}

/// Wire the real adapters into a supervisor.
pub fn build_supervisor(
    config: &CliConfig,
    presenter: Arc<dyn Presenter>,
) -> Result<ServiceSupervisor, CliError> {
    let probe = HttpHealthProbe::new(config.strictness)
        .map_err(|e| CliError::Config(format!("failed to build health probe client: {e}")))?;

    let launcher = DefaultLauncher::new(
        EmbeddedLauncher::default(),
        ProcessLauncher::new().with_shutdown_grace(config.shutdown_grace),
    );

    Ok(ServiceSupervisor::new(
        config.supervisor.clone(),
        Arc::new(probe),
        Arc::new(launcher),
        presenter,
    ))
}

/// Build just the probe, for the `probe` command.
pub fn build_probe(strictness: ProbeStrictness) -> Result<HttpHealthProbe, CliError> {
    HttpHealthProbe::new(strictness)
        .map_err(|e| CliError::Config(format!("failed to build health probe client: {e}")))
}
