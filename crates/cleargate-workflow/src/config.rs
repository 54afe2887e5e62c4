//! Limits and egress settings for the HTTP request node.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment-level settings for HTTP request nodes.
///
/// Node configurations may ask for shorter timeouts, never longer ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct HttpRequestConfig {
    /// Upper bound for connect timeout, in seconds. Default: 10.
    pub max_connect_timeout_secs: u64,
    /// Upper bound for read timeout, in seconds. Default: 60.
    pub max_read_timeout_secs: u64,
    /// Upper bound for write timeout, in seconds. Default: 20.
    pub max_write_timeout_secs: u64,
    /// Largest text response accepted, in bytes. Default: 1 MiB.
    pub max_text_size: usize,
    /// Largest binary response accepted, in bytes. Default: 10 MiB.
    pub max_binary_size: usize,
    /// Proxy for `http://` egress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssrf_proxy_http_url: Option<String>,
    /// Proxy for `https://` egress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssrf_proxy_https_url: Option<String>,
}

impl Default for HttpRequestConfig {
    fn default() -> Self {
        Self {
            max_connect_timeout_secs: 10,
            max_read_timeout_secs: 60,
            max_write_timeout_secs: 20,
            max_text_size: 1024 * 1024,
            max_binary_size: 10 * 1024 * 1024,
            ssrf_proxy_http_url: None,
            ssrf_proxy_https_url: None,
        }
    }
}

impl HttpRequestConfig {
    /// Defaults overlaid with `HTTP_REQUEST_*` and `SSRF_PROXY_*` env vars.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Values that fail to
    /// parse are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        overlay(&lookup, "HTTP_REQUEST_MAX_CONNECT_TIMEOUT", &mut config.max_connect_timeout_secs);
        overlay(&lookup, "HTTP_REQUEST_MAX_READ_TIMEOUT", &mut config.max_read_timeout_secs);
        overlay(&lookup, "HTTP_REQUEST_MAX_WRITE_TIMEOUT", &mut config.max_write_timeout_secs);
        overlay(&lookup, "HTTP_REQUEST_NODE_MAX_TEXT_SIZE", &mut config.max_text_size);
        overlay(&lookup, "HTTP_REQUEST_NODE_MAX_BINARY_SIZE", &mut config.max_binary_size);
        config.ssrf_proxy_http_url = lookup("SSRF_PROXY_HTTP_URL").filter(|v| !v.is_empty());
        config.ssrf_proxy_https_url = lookup("SSRF_PROXY_HTTPS_URL").filter(|v| !v.is_empty());
        config
    }

    pub fn max_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.max_connect_timeout_secs)
    }

    pub fn max_read_timeout(&self) -> Duration {
        Duration::from_secs(self.max_read_timeout_secs)
    }

    pub fn max_write_timeout(&self) -> Duration {
        Duration::from_secs(self.max_write_timeout_secs)
    }
}

fn overlay<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparsable config value"),
    }
}
