//! Health probe port.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ProbeResult, ServiceEndpoint};

/// Single-shot health check of the local service.
///
/// Implementations perform exactly one round trip bounded by `timeout` and
/// never retry; retry policy belongs to the caller. Every failure, including
/// a timeout, is reported as [`ProbeResult::Unreachable`].
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> ProbeResult;
}
