//! Launch strategy, entry point and exit types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ServiceEndpoint;
use crate::error::SupervisorError;

/// How the backend service is run.
///
/// Resolved once at startup and never re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchMode {
    /// Loaded inside the shell process; shares its lifetime and cannot be
    /// terminated independently.
    InProcess,
    /// Spawned as a child process that can be terminated.
    Subprocess,
}

impl LaunchMode {
    /// Packaged distributions embed the service, development checkouts spawn it.
    pub const fn detect(packaged: bool) -> Self {
        if packaged {
            Self::InProcess
        } else {
            Self::Subprocess
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProcess => "in-process",
            Self::Subprocess => "subprocess",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchMode {
    type Err = SupervisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-process" | "inprocess" | "embedded" => Ok(Self::InProcess),
            "subprocess" | "spawn" | "child" => Ok(Self::Subprocess),
            other => Err(SupervisorError::Configuration(format!(
                "unknown launch mode '{other}'"
            ))),
        }
    }
}

/// Execution-mode flag handed to the launched service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Production,
    #[default]
    Development,
}

impl ExecutionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }

    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = SupervisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(SupervisorError::Configuration(format!(
                "unknown execution mode '{other}'"
            ))),
        }
    }
}

/// The backend service's entry point.
///
/// With a `program` the entry file is passed after the program's own
/// arguments (`node --inspect server.js`); without one the entry file is
/// executed directly. `args` always follow the entry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub path: PathBuf,
    pub program: Option<PathBuf>,
    pub program_args: Vec<String>,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl EntryPoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            program: None,
            program_args: Vec::new(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Run the entry file through an interpreter.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Arguments for the interpreter itself, placed before the entry file.
    #[must_use]
    pub fn with_program_args(mut self, args: Vec<String>) -> Self {
        self.program_args = args;
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Fail fast when the entry file is absent.
    pub fn ensure_exists(&self) -> Result<(), SupervisorError> {
        if self.exists() {
            Ok(())
        } else {
            Err(SupervisorError::EntryPointMissing {
                path: self.path.display().to_string(),
            })
        }
    }

    /// Working directory for the service: explicit `cwd`, else the entry's folder.
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd
            .as_deref()
            .or_else(|| self.path.parent().filter(|p| !p.as_os_str().is_empty()))
    }

    /// Program and argument list, for logging.
    pub fn command_line(&self) -> Vec<String> {
        let mut parts = Vec::with_capacity(self.program_args.len() + self.args.len() + 2);
        if let Some(program) = &self.program {
            parts.push(program.display().to_string());
            parts.extend(self.program_args.iter().cloned());
        }
        parts.push(self.path.display().to_string());
        parts.extend(self.args.iter().cloned());
        parts
    }
}

/// Everything a launcher needs to start the service.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub entry_point: EntryPoint,
    pub endpoint: ServiceEndpoint,
    pub execution_mode: ExecutionMode,
    /// Variable carrying the port to the service.
    pub port_env: String,
    /// Variable carrying the execution mode to the service.
    pub mode_env: String,
}

/// Exit notification for a spawned service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceExit {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ServiceExit {
    pub const fn new(code: Option<i32>) -> Self {
        Self { code }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl From<std::process::ExitStatus> for ServiceExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self::new(status.code())
    }
}
