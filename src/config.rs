// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! Environment-driven configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_TOKEN_URL: &str = "https://www.warcraftlogs.com/oauth/token";
const DEFAULT_API_URL: &str = "https://www.warcraftlogs.com/api/v2/client";

pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub warcraft_logs: WarcraftLogsConfig,
}

/// Credentials and endpoints for the Warcraft Logs v2 API.
#[derive(Clone, Debug)]
pub struct WarcraftLogsConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: String,
    pub api_url: String,
    pub auth_timeout: Duration,
    pub query_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let listen_addr: SocketAddr = match env::var("LISTEN_ADDR") {
            Ok(addr) => addr.parse::<SocketAddr>().context("invalid LISTEN_ADDR")?,
            Err(_) => {
                let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
                format!("0.0.0.0:{port}")
                    .parse::<SocketAddr>()
                    .context("invalid PORT")?
            }
        };

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("../data"));

        Ok(Self {
            listen_addr,
            data_dir,
            warcraft_logs: WarcraftLogsConfig::from_env()?,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }
}

impl WarcraftLogsConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: env::var("WCL_CLIENT_ID").ok(),
            client_secret: env::var("WCL_CLIENT_SECRET").ok(),
            token_url: env::var("WCL_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            api_url: env::var("WCL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            auth_timeout: parse_duration("WCL_AUTH_TIMEOUT_SECS", 10)?,
            query_timeout: parse_duration("WCL_QUERY_TIMEOUT_SECS", 15)?,
        })
    }

    /// Returns the client id and secret when both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().filter(|v| !v.is_empty())?;
        let secret = self.client_secret.as_deref().filter(|v| !v.is_empty())?;
        Some((id, secret))
    }
}

impl Default for WarcraftLogsConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            auth_timeout: Duration::from_secs(10),
            query_timeout: Duration::from_secs(15),
        }
    }
}

fn parse_duration(env_key: &str, default_secs: u64) -> Result<Duration> {
    let raw = env::var(env_key).unwrap_or_else(|_| default_secs.to_string());
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("{env_key} must be an integer number of seconds"))?;

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_values() {
        let mut config = WarcraftLogsConfig {
            client_id: Some("id".into()),
            client_secret: None,
            ..Default::default()
        };
        assert!(config.credentials().is_none());

        config.client_secret = Some(String::new());
        assert!(config.credentials().is_none());

        config.client_secret = Some("secret".into());
        assert_eq!(config.credentials(), Some(("id", "secret")));
    }

    #[test]
    fn default_timeouts_match_upstream_budget() {
        let config = WarcraftLogsConfig::default();
        assert_eq!(config.auth_timeout, Duration::from_secs(10));
        assert_eq!(config.query_timeout, Duration::from_secs(15));
    }
}
