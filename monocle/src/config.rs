//! Client configuration.
//!
//! One immutable struct constructed at startup and passed into each
//! session; nothing in the crate reads the environment after this point,
//! so concurrent sessions (tests, multiple projects) never interfere.

/// Environment variable naming the API server base URL.
const API_URL_VAR: &str = "MONOCLE_API_URL";

/// Local-development default when `MONOCLE_API_URL` is unset.
const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Immutable client configuration shared by the fetch and push paths.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HTTP base URL of the monitoring API, e.g. `http://localhost:3000`.
    pub api_url: String,
    /// Websocket base URL derived from `api_url`, e.g. `ws://localhost:3000`.
    pub ws_url: String,
}

impl ClientConfig {
    /// Build a config from an explicit API base URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        let api_url = api_url.trim_end_matches('/').to_string();
        let ws_url = derive_ws_url(&api_url);
        Self { api_url, ws_url }
    }

    /// Build a config from `MONOCLE_API_URL`, falling back to the
    /// local-development default.
    pub fn from_env() -> Self {
        let api_url =
            std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(api_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Rewrite an HTTP(S) base URL to its websocket equivalent.
fn derive_ws_url(api_url: &str) -> String {
    if let Some(rest) = api_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{api_url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_ws_scheme_from_http() {
        let config = ClientConfig::new("http://localhost:3000");
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.ws_url, "ws://localhost:3000");
    }

    #[test]
    fn derives_wss_scheme_from_https() {
        let config = ClientConfig::new("https://monocle.example.com");
        assert_eq!(config.ws_url, "wss://monocle.example.com");
    }

    #[test]
    fn strips_trailing_slash() {
        let config = ClientConfig::new("http://localhost:3000/");
        assert_eq!(config.api_url, "http://localhost:3000");
    }

    #[test]
    fn bare_host_gets_ws_scheme() {
        let config = ClientConfig::new("localhost:3000");
        assert_eq!(config.ws_url, "ws://localhost:3000");
    }
}
