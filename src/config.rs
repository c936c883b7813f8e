use std::env;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::services::session_store::DEFAULT_SESSION_TTL_MINUTES;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const RECOMMENDATION_SERVICE_URL: &str = "http://localhost:5000/api/recommend";
const ITINERARY_SERVICE_URL: &str = "http://localhost:5000/api/generate-itinerary";
// Itinerary generation goes through an LLM and is slow.
const UPSTREAM_TIMEOUT_SECS: u64 = 30;
const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "https://driftlane.vercel.app"];

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    InvalidUrl { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{} must be a positive number (got '{}')", key, value)
            }
            ConfigError::InvalidUrl { key, value } => {
                write!(f, "{} must be an http(s) URL (got '{}')", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub recommendation_url: Url,
    pub itinerary_url: Url,
    pub upstream_timeout: Duration,
    pub session_ttl: chrono::Duration,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
        let port = number_var("PORT", PORT)?;
        let recommendation_url = url_var("RECOMMENDATION_SERVICE_URL", RECOMMENDATION_SERVICE_URL)?;
        let itinerary_url = url_var("ITINERARY_SERVICE_URL", ITINERARY_SERVICE_URL)?;
        let timeout_secs: u64 = number_var("UPSTREAM_TIMEOUT_SECS", UPSTREAM_TIMEOUT_SECS)?;
        let ttl_minutes: i64 = number_var("SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?;
        let session_ttl = chrono::Duration::try_minutes(ttl_minutes).ok_or_else(|| {
            ConfigError::InvalidNumber {
                key: "SESSION_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            }
        })?;

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host,
            port,
            recommendation_url,
            itinerary_url,
            upstream_timeout: Duration::from_secs(timeout_secs),
            session_ttl,
            allowed_origins,
        })
    }
}

fn number_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match env::var(key) {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) if parsed > T::default() => Ok(parsed),
            _ => Err(ConfigError::InvalidNumber { key, value }),
        },
        Err(_) => Ok(default),
    }
}

fn url_var(key: &'static str, default: &str) -> Result<Url, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    match Url::parse(value.trim()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(url),
        _ => Err(ConfigError::InvalidUrl { key, value }),
    }
}
