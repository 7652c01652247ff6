//! Runtime settings read from the environment (after `.env` is loaded).

use std::time::Duration;

use anyhow::{Context, Result};

use crate::infra::air4thai::client::DEFAULT_BASE_URL;

pub const DEFAULT_LOG_FILE: &str = "logs/air_quality.log";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `LOG_FILE_PATH`: JSON log file; rolled daily.
    pub log_file_path: String,
    /// `AIR4THAI_BASE_URL`: station history endpoint.
    pub history_base_url: String,
    /// `HTTP_TIMEOUT_SECS`: per-request timeout for history fetches.
    pub http_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; unset keys use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let http_timeout_secs = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECS must be whole seconds, got '{raw}'"))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            log_file_path: lookup("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            history_base_url: lookup("AIR4THAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}
