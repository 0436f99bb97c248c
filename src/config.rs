//! read client configuration from a file or the environment

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Error;
use crate::retry::RetryPlan;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_MAX_ATTEMPTS: u8 = 5;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

pub enum ConfigLocation {
    File(String),
    Env,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Per-attempt timeout; an attempt that exceeds it is not retried.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_max_attempts() -> u8 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl Config {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: default_api_url(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            request_timeout_secs: None,
            user_agent: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_retry(mut self, max_attempts: u8, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay_ms = retry_delay.as_millis() as u64;
        self
    }

    pub fn load(loc: ConfigLocation) -> Result<Self, Error> {
        match loc {
            ConfigLocation::File(path) => Self::from_file(path),
            ConfigLocation::Env => Self::from_env(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// # ENV Vars
    /// * `GITHUB_TOKEN` - API token (required)
    /// * `GITHUB_API_URL` - API base URL, for GitHub Enterprise
    /// * `GITHUB_MAX_RETRIES` - attempts per logical call
    /// * `GITHUB_RETRY_DELAY_MS` - base backoff delay
    /// * `GITHUB_REQUEST_TIMEOUT_SECS` - per-attempt timeout
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading each variable through `get`.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let token = get("GITHUB_TOKEN")
            .ok_or_else(|| Error::Config("Missing GITHUB_TOKEN env var".to_string()))?;
        let mut config = Self::new(token);
        if let Some(url) = get("GITHUB_API_URL") {
            config.api_url = url;
        }
        if let Some(attempts) = parse_var(&get, "GITHUB_MAX_RETRIES")? {
            config.max_attempts = attempts;
        }
        if let Some(delay) = parse_var(&get, "GITHUB_RETRY_DELAY_MS")? {
            config.retry_delay_ms = delay;
        }
        config.request_timeout_secs = parse_var(&get, "GITHUB_REQUEST_TIMEOUT_SECS")?;
        Ok(config)
    }

    pub fn retry_plan(&self) -> Result<RetryPlan, Error> {
        RetryPlan::new(
            self.max_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Base URL without a trailing slash, validated before any network call.
    pub fn base_url(&self) -> Result<String, Error> {
        let base = self.api_url.trim_end_matches('/');
        reqwest::Url::parse(base)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", base, e)))?;
        Ok(base.to_string())
    }
}

fn parse_var<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, Error> {
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {}: '{}'", name, raw))),
        None => Ok(None),
    }
}
