//! Local service endpoint.

use serde::{Deserialize, Serialize};
use url::Url;

/// Host the backend service listens on.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port reserved for the backend service.
pub const DEFAULT_PORT: u16 = 3000;

/// Path of the health endpoint.
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";

/// Address of the backend service.
///
/// Built once from configuration and shared by the prober and the launcher,
/// so both always agree on the single reserved port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    host: String,
    port: u16,
    health_path: String,
}

impl ServiceEndpoint {
    /// Create an endpoint with the default health path.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    /// Set the health path. A missing leading slash is added.
    #[must_use]
    pub fn with_health_path(mut self, path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim();
        self.health_path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub fn health_path(&self) -> &str {
        &self.health_path
    }

    /// `host:port`, suitable for binding or connecting.
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Root URL of the web UI, e.g. `http://127.0.0.1:3000/`.
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.authority())
    }

    /// Full URL of the health endpoint.
    pub fn health_url(&self) -> String {
        match Url::parse(&self.base_url()).and_then(|base| base.join(&self.health_path)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("http://{}{}", self.authority(), self.health_path),
        }
    }
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let endpoint = ServiceEndpoint::default();
        assert_eq!(endpoint.base_url(), "http://127.0.0.1:3000/");
        assert_eq!(endpoint.health_url(), "http://127.0.0.1:3000/api/health");
    }

    #[test]
    fn test_health_path_normalization() {
        let endpoint = ServiceEndpoint::new("localhost", 8123).with_health_path("healthz");
        assert_eq!(endpoint.health_path(), "/healthz");
        assert_eq!(endpoint.health_url(), "http://localhost:8123/healthz");
    }

    #[test]
    fn test_ipv6_authority() {
        let endpoint = ServiceEndpoint::new("::1", 3000);
        assert_eq!(endpoint.authority(), "[::1]:3000");
        assert_eq!(endpoint.health_url(), "http://[::1]:3000/api/health");
    }
}
