use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_VISION_API_URL: &str = "https://vision.googleapis.com/v1/images:annotate";
const DEFAULT_MAX_RESULTS: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub vision_api_key: String,
    pub vision_api_url: String,
    pub vision_max_results: u32,
    pub vision_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vision_api_key = lookup("GOOGLE_VISION_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("GOOGLE_VISION_API_KEY must be set in .env file")?;

        let vision_api_url =
            lookup("VISION_API_URL").unwrap_or_else(|| DEFAULT_VISION_API_URL.to_string());
        let vision_max_results = parse_or(&lookup, "VISION_MAX_RESULTS", DEFAULT_MAX_RESULTS)?;
        let timeout_secs = parse_or(&lookup, "VISION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        Ok(Self {
            vision_api_key,
            vision_api_url,
            vision_max_results,
            vision_timeout: Duration::from_secs(timeout_secs),
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
