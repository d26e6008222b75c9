//! Startup state machine states and the report of one startup attempt.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SupervisorError;

/// States of the startup orchestrator.
///
/// `Idle → ProbingExisting → (Ready | Launching) → PollingHealth → (Ready | Failed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartupState {
    Idle,
    ProbingExisting,
    Launching,
    PollingHealth,
    Ready,
    Failed,
}

impl StartupState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for StartupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ProbingExisting => "probing-existing",
            Self::Launching => "launching",
            Self::PollingHealth => "polling-health",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal result of a startup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    Ready,
    Failed(SupervisorError),
}

impl StartupOutcome {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn failure(&self) -> Option<&SupervisorError> {
        match self {
            Self::Ready => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// Everything that happened during one startup attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupReport {
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: StartupOutcome,
    /// Every state entered, in order, starting with `Idle`.
    pub transitions: Vec<StartupState>,
    /// Health polls performed after launch (the existing-instance probe is not counted).
    pub attempts_used: u32,
    /// True when a pre-existing healthy instance was reused.
    pub reused_existing: bool,
}

impl StartupReport {
    pub(crate) const fn new() -> Self {
        Self {
            outcome: StartupOutcome::Ready,
            transitions: Vec::new(),
            attempts_used: 0,
            reused_existing: false,
        }
    }

    pub fn final_state(&self) -> StartupState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(StartupState::Idle)
    }
}

fn serialize_outcome<S>(outcome: &StartupOutcome, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match outcome {
        StartupOutcome::Ready => serializer.serialize_str("ready"),
        StartupOutcome::Failed(err) => serializer.serialize_str(&format!("failed: {err}")),
    }
}
