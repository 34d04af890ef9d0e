use std::net::SocketAddr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// HTTP host configuration (`modules.api_ingress`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port`; when absent the server section's host and port are used.
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_docs: false,
            cors_enabled: false,
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ApiIngressConfig {
    pub fn resolve_bind_addr(&self, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
        let raw = match &self.bind_addr {
            Some(addr) => addr.clone(),
            None => format!("{host}:{port}"),
        };
        raw.parse()
            .with_context(|| format!("Invalid bind address '{raw}'"))
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}
