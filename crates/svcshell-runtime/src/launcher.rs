//! Launch-mode dispatch.

use async_trait::async_trait;

use svcshell_core::{LaunchMode, LaunchSpec, LaunchedService, ServiceLauncher, SupervisorError};

use crate::embedded::EmbeddedLauncher;
use crate::process::ProcessLauncher;

/// The production [`ServiceLauncher`]: embedded for `InProcess`, child process for `Subprocess`.
#[derive(Clone, Default)]
pub struct DefaultLauncher {
    embedded: EmbeddedLauncher,
    process: ProcessLauncher,
}

impl DefaultLauncher {
    pub const fn new(embedded: EmbeddedLauncher, process: ProcessLauncher) -> Self {
        Self { embedded, process }
    }
}

#[async_trait]
impl ServiceLauncher for DefaultLauncher {
    async fn launch(
        &self,
        mode: LaunchMode,
        spec: &LaunchSpec,
    ) -> Result<LaunchedService, SupervisorError> {
        match mode {
            LaunchMode::InProcess => self.embedded.start(spec).await,
            LaunchMode::Subprocess => self.process.spawn(spec),
        }
    }
}
