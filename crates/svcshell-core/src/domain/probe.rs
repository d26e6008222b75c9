//! Health probe results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a probe did not reach the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum ProbeFailure {
    /// No answer within the probe timeout.
    Timeout,
    /// Connection refused or reset.
    Connect(String),
    /// The endpoint answered with a rejected HTTP status.
    Status(u16),
    /// Any other request error.
    Request(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Connect(msg) => write!(f, "connection failed: {msg}"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
            Self::Request(msg) => write!(f, "request failed: {msg}"),
        }
    }
}

/// Outcome of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "cause", rename_all = "lowercase")]
pub enum ProbeResult {
    Reachable,
    Unreachable(ProbeFailure),
}

impl ProbeResult {
    pub const fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_result_classification() {
        assert!(ProbeResult::Reachable.is_reachable());
        assert!(!ProbeResult::Unreachable(ProbeFailure::Timeout).is_reachable());
    }

    #[test]
    fn test_serialization() {
        let result = ProbeResult::Unreachable(ProbeFailure::Status(503));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"unreachable\""));
        assert!(json.contains("\"kind\":\"status\""));
        assert!(json.contains("503"));
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(ProbeFailure::Status(404).to_string(), "unexpected status 404");
        assert_eq!(ProbeFailure::Timeout.to_string(), "timed out");
    }
}
