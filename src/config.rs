use std::time::Duration;

use lambda_runtime::tracing;

use crate::error::ConfigError;

pub const DEFAULT_BUCKET: &str = "ad-astra-bucket";
pub const DEFAULT_APOD_URL: &str = "https://api.nasa.gov/planetary/apod";
pub const DEFAULT_ROVER_URL: &str =
    "https://api.nasa.gov/mars-photos/api/v1/rovers/curiosity/latest_photos";
const DEMO_KEY: &str = "DEMO_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub bucket: String,
    pub timeout: Duration,
    pub apod_endpoint: String,
    pub rover_endpoint: String,
    /// Also check `data.json` before skipping an archive key.
    pub probe_metadata: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = match lookup("API_KEY").or_else(|| lookup("api_key")) {
            Some(key) if !key.is_empty() => key,
            _ => {
                tracing::warn!("no API_KEY set, falling back to {DEMO_KEY}");
                DEMO_KEY.to_string()
            }
        };

        let timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let probe_metadata = match lookup("PROBE_METADATA") {
            Some(raw) => parse_flag("PROBE_METADATA", &raw)?,
            None => false,
        };

        Ok(Self {
            api_key,
            bucket: lookup("BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            timeout,
            apod_endpoint: lookup("APOD_URL").unwrap_or_else(|| DEFAULT_APOD_URL.to_string()),
            rover_endpoint: lookup("ROVER_URL").unwrap_or_else(|| DEFAULT_ROVER_URL.to_string()),
            probe_metadata,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: "HTTP_TIMEOUT_SECS",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(invalid(&e.to_string())),
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
