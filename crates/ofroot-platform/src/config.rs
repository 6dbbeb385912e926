use std::time::Duration;

use anyhow::{Context, Result};

use crate::{auth::DEFAULT_SESSION_COOKIE, client::ApiClientConfig};

const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub http_addr: String,
    /// Unset means the admin service runs against the in-memory sandbox.
    pub api_base_url: Option<String>,
    pub api_timeout: Duration,
    pub session_cookie: String,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(default_http_addr: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let http_addr = non_empty("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let api_base_url = non_empty("OFROOT_API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string());
        let api_timeout = match non_empty("OFROOT_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().with_context(|| {
                    format!("OFROOT_API_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}")
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        };
        let session_cookie =
            non_empty("SESSION_COOKIE").unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());

        Ok(Self {
            http_addr,
            api_base_url,
            api_timeout,
            session_cookie,
        })
    }

    pub fn api_client_config(&self) -> Option<ApiClientConfig> {
        self.api_base_url.as_ref().map(|base_url| ApiClientConfig {
            base_url: base_url.clone(),
            timeout: self.api_timeout,
        })
    }
}
