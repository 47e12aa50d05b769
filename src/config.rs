// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::HeaderValue;

use crate::error::ScrapeError;

pub const DEFAULT_BASE_URL: &str = "https://assist.org/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Settings shared by the blocking and non-blocking fetch clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` disables the request timeout.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Success bodies larger than this are rejected instead of decoded.
    pub max_body_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: default_user_agent(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// The configured user agent as a header value.
    pub fn user_agent_header(&self) -> Result<HeaderValue, ScrapeError> {
        HeaderValue::from_str(&self.user_agent).map_err(|_| {
            ScrapeError::invalid_parameter(
                "user_agent",
                format!("`{}` is not a valid header value", self.user_agent.escape_debug()),
            )
        })
    }

    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("ASSIST_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = parse_duration("ASSIST_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS)?;
        let user_agent = env::var("ASSIST_USER_AGENT").unwrap_or_else(|_| default_user_agent());
        let max_body_bytes = match env::var("ASSIST_MAX_BODY_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context("ASSIST_MAX_BODY_BYTES must be an integer number of bytes")?,
            Err(_) => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            base_url,
            timeout: (!timeout.is_zero()).then_some(timeout),
            user_agent,
            max_body_bytes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub client: ClientConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let listen_addr: SocketAddr = env::var("ASSIST_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("invalid ASSIST_ADDR")?;

        let client = ClientConfig::from_env()?;
        let log_format = log_format_from_env()?;

        Ok(Self {
            listen_addr,
            client,
            log_format,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }
}

pub fn log_format_from_env() -> Result<LogFormat> {
    let raw = env::var("ASSIST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    parse_log_format(&raw)
}

fn parse_log_format(raw: &str) -> Result<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "text" | "" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => anyhow::bail!("ASSIST_LOG_FORMAT must be `text` or `json`, got `{other}`"),
    }
}

fn default_user_agent() -> String {
    format!("assist-scraper/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_duration(env_key: &str, default_secs: u64) -> Result<Duration> {
    let raw = env::var(env_key).unwrap_or_else(|_| default_secs.to_string());
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{env_key} must be an integer number of seconds"))?;

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_config_targets_assist() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://assist.org/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.user_agent.starts_with("assist-scraper/"));
        assert_eq!(config.max_body_bytes, 32 * 1024 * 1024);
        assert!(config.user_agent_header().is_ok());
    }

    #[test]
    fn invalid_user_agent_is_a_parameter_error() {
        let config = ClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..ClientConfig::default()
        };
        let err = config.user_agent_header().unwrap_err();
        assert!(
            matches!(err, ScrapeError::InvalidParameter { ref name, .. } if name == "user_agent"),
            "got {err:?}"
        );
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(parse_log_format("json").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format(" TEXT ").unwrap(), LogFormat::Text);
        assert!(parse_log_format("yaml").is_err());
    }
}
