//! Configuration module
//!
//! Loads the service location and transport settings from the environment
//! (and a `.env` file when present).

use anyhow::Context;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatermarkerConfig {
    pub base_url: String,
    /// Total request timeout for the default transport. `None` disables it.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for WatermarkerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            connect_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("watermarker-client/{}", env!("CARGO_PKG_VERSION"))
}

impl WatermarkerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads WATERMARKER_BASE_URL (or WATERMARKER_URL), WATERMARKER_TIMEOUT_SECS,
    /// WATERMARKER_CONNECT_TIMEOUT_SECS and WATERMARKER_USER_AGENT.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("WATERMARKER_BASE_URL")
            .or_else(|| lookup("WATERMARKER_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("WATERMARKER_BASE_URL cannot be empty"));
        }

        let timeout = parse_secs(&lookup, "WATERMARKER_TIMEOUT_SECS")?;
        let connect_timeout = parse_secs(&lookup, "WATERMARKER_CONNECT_TIMEOUT_SECS")?;
        let user_agent = lookup("WATERMARKER_USER_AGENT").unwrap_or_else(default_user_agent);

        Ok(Self {
            base_url,
            timeout,
            connect_timeout,
            user_agent,
        })
    }

    /// Builds the HTTP transport described by this configuration.
    pub fn build_http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        builder.build()
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("{} must be a whole number of seconds", key))
        })
        .transpose()
}
