//! Error taxonomy for service supervision.
//!
//! Payloads are plain strings so errors can be cloned into a
//! [`StartupOutcome`](crate::StartupOutcome) and compared in tests.

use thiserror::Error;

/// Domain-specific errors for supervising the backend service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupervisorError {
    /// The service entry point does not exist; nothing was started.
    #[error("entry point not found: {path}")]
    EntryPointMissing {
        /// Path that was looked up.
        path: String,
    },

    /// The service could not be started (spawn error, in-process load error).
    #[error("failed to launch service: {0}")]
    Launch(String),

    /// A single health probe exceeded its timeout.
    ///
    /// Never surfaced to callers: probes collapse it into `Unreachable`.
    #[error("health probe timed out after {timeout_ms}ms")]
    ProbeTimeout {
        /// Probe timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The service did not become healthy within the polling ceiling.
    #[error("service did not become healthy after {attempts} attempts (timeout)")]
    StartupTimeout {
        /// Number of health polls performed.
        attempts: u32,
    },

    /// The service process exited on its own.
    #[error("service exited unexpectedly (code: {})", display_code(.code))]
    UnexpectedExit {
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
    },

    /// Sending the termination signal failed.
    #[error("failed to terminate service: {0}")]
    Terminate(String),

    /// `start()` was called on a supervisor that already ran its attempt.
    #[error("supervisor has already started")]
    AlreadyStarted,

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SupervisorError {
    /// True for the polling-ceiling failure.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::StartupTimeout { .. })
    }
}

#[allow(clippy::ref_option)]
pub(crate) fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_point_missing_message() {
        let err = SupervisorError::EntryPointMissing {
            path: "/opt/app/server.js".to_string(),
        };
        assert_eq!(err.to_string(), "entry point not found: /opt/app/server.js");
    }

    #[test]
    fn test_unexpected_exit_message() {
        let err = SupervisorError::UnexpectedExit { code: Some(3) };
        assert!(err.to_string().contains("code: 3"));

        let err = SupervisorError::UnexpectedExit { code: None };
        assert!(err.to_string().contains("code: signal"));
    }

    #[test]
    fn test_timeout_classification() {
        assert!(SupervisorError::StartupTimeout { attempts: 30 }.is_timeout());
        assert!(SupervisorError::StartupTimeout { attempts: 30 }
            .to_string()
            .contains("timeout"));
        assert!(!SupervisorError::AlreadyStarted.is_timeout());
    }
}
