//! CLI-specific error types and mappings to exit codes.

use thiserror::Error;

use svcshell_core::{PathError, SupervisorError};

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Configuration error (paths, probe client).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service did not come up.
    #[error("Startup failed: {0}")]
    Startup(SupervisorError),

    /// The service died while the shell was running.
    #[error("Service crashed (code: {})", .0.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Crashed(Option<i32>),

    /// The health endpoint did not answer.
    #[error("Service unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// IO error (stdout, signal handlers).
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: Startup failure, crash or unreachable service
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Startup(_) | Self::Crashed(_) | Self::Unreachable { .. } => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::Configuration(msg) => Self::Config(msg),
            SupervisorError::UnexpectedExit { code } => Self::Crashed(code),
            other => Self::Startup(other),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::Startup(SupervisorError::StartupTimeout { attempts: 30 }).exit_code(),
            1
        );
        assert_eq!(CliError::Crashed(None).exit_code(), 1);
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
    }

    #[test]
    fn test_supervisor_error_mapping() {
        let err: CliError = SupervisorError::UnexpectedExit { code: Some(9) }.into();
        assert!(matches!(err, CliError::Crashed(Some(9))));

        let err: CliError = SupervisorError::Configuration("bad mode".into()).into();
        assert_eq!(err.to_string(), "Configuration error: bad mode");
    }

    #[test]
    fn test_crash_message() {
        assert_eq!(
            CliError::Crashed(None).to_string(),
            "Service crashed (code: signal)"
        );
        assert_eq!(
            CliError::Crashed(Some(3)).to_string(),
            "Service crashed (code: 3)"
        );
    }
}
