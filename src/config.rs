//! Service settings: built-in defaults overlaid with environment variables
//! (and a `.env` file, if one is present).

use crate::error::{CopilotError, Result};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

pub const ENV_API_URL: &str = "QUERY_COPILOT_API_URL";
pub const ENV_MOCK_DELAY_MS: &str = "QUERY_COPILOT_MOCK_DELAY_MS";
pub const ENV_BIND: &str = "QUERY_COPILOT_BIND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub mock_delay: Duration,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            mock_delay: DEFAULT_MOCK_DELAY,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_MOCK_DELAY_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                CopilotError::Config(format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    ENV_MOCK_DELAY_MS, raw
                ))
            })?;
            config.mock_delay = Duration::from_millis(millis);
        }

        if let Some(addr) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = addr.trim().to_string();
        }

        Ok(config)
    }
}
