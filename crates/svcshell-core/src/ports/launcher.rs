//! Service launcher port and the handle types it produces.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::domain::{LaunchMode, LaunchSpec, ServiceExit};
use crate::error::SupervisorError;

/// Receives the exit notification of a spawned service.
pub type ExitReceiver = oneshot::Receiver<ServiceExit>;

/// Terminable reference to a spawned service process.
#[async_trait]
pub trait ProcessRef: Send + Sync + fmt::Debug {
    /// OS process id, when known.
    fn pid(&self) -> Option<u32>;

    /// Ask the process to stop and wait until it has been reaped.
    async fn terminate(&self) -> Result<(), SupervisorError>;
}

/// The service handle held by the lifecycle manager.
#[derive(Debug, Default)]
pub enum ServiceHandle {
    /// Nothing launched (or already torn down).
    #[default]
    None,
    /// Child process that can be terminated.
    Spawned(Box<dyn ProcessRef>),
    /// Service embedded in the host process; ends when the host exits.
    Embedded,
}

impl ServiceHandle {
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub const fn is_spawned(&self) -> bool {
        matches!(self, Self::Spawned(_))
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Spawned(process) => process.pid(),
            Self::None | Self::Embedded => None,
        }
    }
}

/// Result of a successful launch.
#[derive(Debug)]
pub struct LaunchedService {
    pub handle: ServiceHandle,
    /// Exit notifications; present for spawned services only.
    pub exit: Option<ExitReceiver>,
}

impl LaunchedService {
    pub const fn embedded() -> Self {
        Self {
            handle: ServiceHandle::Embedded,
            exit: None,
        }
    }

    pub fn spawned(process: Box<dyn ProcessRef>, exit: ExitReceiver) -> Self {
        Self {
            handle: ServiceHandle::Spawned(process),
            exit: Some(exit),
        }
    }
}

/// Starts the backend service.
///
/// Implementations must fail with [`SupervisorError::EntryPointMissing`]
/// without starting anything when the entry file is absent, and report any
/// synchronous start failure as [`SupervisorError::Launch`].
#[async_trait]
pub trait ServiceLauncher: Send + Sync {
    async fn launch(
        &self,
        mode: LaunchMode,
        spec: &LaunchSpec,
    ) -> Result<LaunchedService, SupervisorError>;
}
