//! Supervisor configuration.

use crate::domain::{EntryPoint, ExecutionMode, LaunchMode, LaunchSpec, RetryPolicy, ServiceEndpoint};

/// Environment variable carrying the port to the launched service.
pub const DEFAULT_PORT_ENV: &str = "PORT";

/// Environment variable carrying the execution mode to the launched service.
pub const DEFAULT_MODE_ENV: &str = "NODE_ENV";

/// Configuration for one supervisor run.
///
/// The launch mode is resolved once here; the orchestrator never re-evaluates it.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub endpoint: ServiceEndpoint,
    pub entry_point: EntryPoint,
    pub launch_mode: LaunchMode,
    pub execution_mode: ExecutionMode,
    pub policy: RetryPolicy,
    pub port_env: String,
    pub mode_env: String,
}

impl SupervisorConfig {
    /// Create a configuration with the default policy for `launch_mode`.
    pub fn new(endpoint: ServiceEndpoint, entry_point: EntryPoint, launch_mode: LaunchMode) -> Self {
        Self {
            endpoint,
            entry_point,
            launch_mode,
            execution_mode: ExecutionMode::default(),
            policy: RetryPolicy::for_mode(launch_mode),
            port_env: DEFAULT_PORT_ENV.to_string(),
            mode_env: DEFAULT_MODE_ENV.to_string(),
        }
    }

    #[must_use]
    pub const fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_port_env(mut self, name: impl Into<String>) -> Self {
        self.port_env = name.into();
        self
    }

    #[must_use]
    pub fn with_mode_env(mut self, name: impl Into<String>) -> Self {
        self.mode_env = name.into();
        self
    }

    /// The launch request handed to the launcher.
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            entry_point: self.entry_point.clone(),
            endpoint: self.endpoint.clone(),
            execution_mode: self.execution_mode,
            port_env: self.port_env.clone(),
            mode_env: self.mode_env.clone(),
        }
    }
}
