use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable holding the remote-service credential.
///
/// The key is read from the environment only, never from a config file.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Model identifier used for both the transcription and formatting calls
    pub model: String,

    /// Base URL of the generateContent API
    pub endpoint: String,

    /// Client-side timeout for each remote call, in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from an optional TOML file layered over defaults
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.model", "gemini-2.5-flash")?
            .set_default(
                "service.endpoint",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("service.request_timeout_secs", 60)?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Remote-service credential from the process environment, if configured
    pub fn api_key() -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                model: "gemini-2.5-flash".to_string(),
                endpoint: "https://generativelanguage.googleapis.com".to_string(),
                request_timeout_secs: 60,
            },
        }
    }
}
