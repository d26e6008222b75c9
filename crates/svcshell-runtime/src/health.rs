//! HTTP health probe for the local service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use svcshell_core::{HealthProbe, ProbeFailure, ProbeResult, ServiceEndpoint};

/// Which HTTP answers count as healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeStrictness {
    /// Only 2xx responses.
    #[default]
    SuccessStatus,
    /// Any HTTP response at all; the service is up if it answers.
    AnyResponse,
}

impl ProbeStrictness {
    fn accepts(self, status: reqwest::StatusCode) -> bool {
        match self {
            Self::SuccessStatus => status.is_success(),
            Self::AnyResponse => true,
        }
    }
}

/// One GET per probe, no retries.
///
/// System proxy settings are ignored: the endpoint is always local.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: Client,
    strictness: ProbeStrictness,
}

impl HttpHealthProbe {
    pub fn new(strictness: ProbeStrictness) -> Result<Self, reqwest::Error> {
        let client = Client::builder().no_proxy().build()?;
        Ok(Self { client, strictness })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> ProbeResult {
        let url = endpoint.health_url();

        let result = match self.client.get(&url).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if self.strictness.accepts(status) {
                    ProbeResult::Reachable
                } else {
                    ProbeResult::Unreachable(ProbeFailure::Status(status.as_u16()))
                }
            }
            Err(e) if e.is_timeout() => ProbeResult::Unreachable(ProbeFailure::Timeout),
            Err(e) if e.is_connect() => ProbeResult::Unreachable(ProbeFailure::Connect(e.to_string())),
            Err(e) => ProbeResult::Unreachable(ProbeFailure::Request(e.to_string())),
        };

        debug!(url = %url, reachable = result.is_reachable(), "Health probe");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    async fn serve(status: StatusCode) -> u16 {
        let app = Router::new().route("/api/health", get(move || async move { status }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_ok_is_reachable() {
        let port = serve(StatusCode::OK).await;
        let probe = HttpHealthProbe::new(ProbeStrictness::default()).unwrap();

        let result = probe
            .probe(&ServiceEndpoint::new("127.0.0.1", port), TIMEOUT)
            .await;
        assert_eq!(result, ProbeResult::Reachable);
    }

    #[tokio::test]
    async fn test_error_status_depends_on_strictness() {
        let port = serve(StatusCode::SERVICE_UNAVAILABLE).await;
        let endpoint = ServiceEndpoint::new("127.0.0.1", port);

        let strict = HttpHealthProbe::new(ProbeStrictness::SuccessStatus).unwrap();
        assert_eq!(
            strict.probe(&endpoint, TIMEOUT).await,
            ProbeResult::Unreachable(ProbeFailure::Status(503))
        );

        let lenient = HttpHealthProbe::new(ProbeStrictness::AnyResponse).unwrap();
        assert_eq!(lenient.probe(&endpoint, TIMEOUT).await, ProbeResult::Reachable);
    }

    #[tokio::test]
    async fn test_wrong_path_is_rejected() {
        let port = serve(StatusCode::OK).await;
        let endpoint = ServiceEndpoint::new("127.0.0.1", port).with_health_path("/healthz");
        let probe = HttpHealthProbe::new(ProbeStrictness::SuccessStatus).unwrap();

        assert_eq!(
            probe.probe(&endpoint, TIMEOUT).await,
            ProbeResult::Unreachable(ProbeFailure::Status(404))
        );
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let port = closed_port();
        let probe = HttpHealthProbe::new(ProbeStrictness::AnyResponse).unwrap();

        let result = probe
            .probe(&ServiceEndpoint::new("127.0.0.1", port), TIMEOUT)
            .await;
        assert!(!result.is_reachable());
    }
}
