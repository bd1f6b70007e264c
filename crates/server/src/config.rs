// Server configuration.
//
// Environment-driven, no config files. Base URLs are validated at startup so
// a typo fails the boot instead of the first upstream call. The Mistral
// credential is optional: without it the server still binds and serves the
// non-AI routes, and the AI endpoints fail fast with a 500.

use std::net::SocketAddr;

use anyhow::Context;
use url::Url;

/// Default Mistral chat-completions host.
const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";
/// Default instant-answer search host.
const DEFAULT_SEARCH_BASE_URL: &str = "https://api.duckduckgo.com";

/// Core server configuration.
///
/// Constructed via [`ServerConfig::from_env`] which reads environment
/// variables and falls back to development defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (host:port).
    pub bind_addr: SocketAddr,
    /// Upstream LLM credential. `None` disables the AI endpoints.
    pub mistral_api_key: Option<String>,
    /// Upstream LLM base URL.
    pub mistral_base_url: Url,
    /// Upstream model identifier.
    pub mistral_model: String,
    /// Search API base URL.
    pub search_base_url: Url,
    /// Log filter directive (e.g. `info`, `coauthor_server=debug`).
    pub log_filter: String,
}

impl ServerConfig {
    /// Parse configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `COAUTHOR_BIND_ADDR` | `127.0.0.1:8080` |
    /// | `MISTRAL_API_KEY` | *(none — AI endpoints fail fast)* |
    /// | `MISTRAL_BASE_URL` | `https://api.mistral.ai` |
    /// | `MISTRAL_MODEL` | `mistral-tiny` |
    /// | `COAUTHOR_SEARCH_BASE_URL` | `https://api.duckduckgo.com` |
    /// | `RUST_LOG` | `coauthor_server=info,tower_http=info` |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_env_fn(|key| std::env::var(key))
    }

    /// Testable constructor that accepts an environment lookup function.
    fn from_env_fn<F>(env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let bind_addr = env("COAUTHOR_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".into())
            .parse()
            .context("COAUTHOR_BIND_ADDR is not a valid socket address")?;

        let mistral_api_key = env("MISTRAL_API_KEY").ok().filter(|key| !key.trim().is_empty());

        let mistral_base_url = env("MISTRAL_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_MISTRAL_BASE_URL.into())
            .parse()
            .context("MISTRAL_BASE_URL is not a valid URL")?;

        let mistral_model = env("MISTRAL_MODEL").unwrap_or_else(|_| "mistral-tiny".into());

        let search_base_url = env("COAUTHOR_SEARCH_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SEARCH_BASE_URL.into())
            .parse()
            .context("COAUTHOR_SEARCH_BASE_URL is not a valid URL")?;

        let log_filter =
            env("RUST_LOG").unwrap_or_else(|_| "coauthor_server=info,tower_http=info".into());

        Ok(Self {
            bind_addr,
            mistral_api_key,
            mistral_base_url,
            mistral_model,
            search_base_url,
            log_filter,
        })
    }

    /// True when the AI endpoints can reach the upstream model.
    pub fn ai_enabled(&self) -> bool {
        self.mistral_api_key.is_some()
    }
}
