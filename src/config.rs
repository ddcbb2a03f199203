use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Notification service
    pub api_base_url: Url,
    pub api_token: Option<String>,
    pub request_timeout_seconds: u64,

    // Polling
    pub poll_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));

        // Notification service
        let api_base_url = env::var("NOTIFICATIONS_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let api_base_url =
            Url::parse(&api_base_url).context("NOTIFICATIONS_API_URL must be a valid URL")?;
        let api_token = env::var("NOTIFICATIONS_API_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let request_timeout_seconds = env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // Polling
        let poll_interval_ms: u64 = env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(5000);

        Ok(Settings {
            env,
            api_base_url,
            api_token,
            request_timeout_seconds,
            poll_interval: Duration::from_millis(poll_interval_ms),
        })
    }
}
