use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_DEBOUNCE_MS: u64 = 250;
const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub page_size: usize,
    pub debounce: Duration,
    pub requests_per_second: u32,
    pub timeout: Duration,
    pub history_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` feeds it the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("RIFT_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let page_size = positive(&lookup, "RIFT_PAGE_SIZE", DEFAULT_PAGE_SIZE as u64)? as usize;
        let debounce_ms = match lookup("RIFT_DEBOUNCE_MS") {
            Some(raw) => parse_number("RIFT_DEBOUNCE_MS", &raw)?,
            None => DEFAULT_DEBOUNCE_MS,
        };
        let requests_per_second = positive(
            &lookup,
            "RIFT_REQUESTS_PER_SECOND",
            DEFAULT_REQUESTS_PER_SECOND as u64,
        )?;
        let requests_per_second = u32::try_from(requests_per_second).map_err(|_| {
            AppError::ConfigError("RIFT_REQUESTS_PER_SECOND is too large".to_string())
        })?;
        let timeout_secs = positive(&lookup, "RIFT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        let history_path = lookup("RIFT_HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_history_path);

        Ok(Config {
            api_url,
            page_size,
            debounce: Duration::from_millis(debounce_ms),
            requests_per_second,
            timeout: Duration::from_secs(timeout_secs),
            history_path,
        })
    }
}

fn default_history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rift_stats")
        .join("search_history.json")
}

fn parse_number(key: &str, raw: &str) -> Result<u64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::ConfigError(format!("{} must be a number, got '{}'", key, raw)))
}

fn positive<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(raw) => parse_number(key, &raw)?,
        None => default,
    };
    if value == 0 {
        return Err(AppError::ConfigError(format!("{} must be greater than zero", key)));
    }
    Ok(value)
}
