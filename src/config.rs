use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, AppResult};

const DEV_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_API_PATH: &str = "/api";
const DEFAULT_ORIGIN: &str = "http://localhost";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_origin: String,
    pub list_watchdog: Duration,
    pub summary_timeout: Duration,
    pub settings_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let development = lookup("APP_ENV").as_deref() == Some("development");
        let api_base_url = lookup("API_BASE_URL").unwrap_or_else(|| {
            if development {
                DEV_API_URL.to_string()
            } else {
                DEFAULT_API_PATH.to_string()
            }
        });

        Config {
            api_base_url,
            api_origin: lookup("API_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            list_watchdog: Duration::from_millis(
                lookup("LIST_WATCHDOG_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3000),
            ),
            summary_timeout: Duration::from_millis(
                lookup("SUMMARY_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5000),
            ),
            settings_path: lookup("SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("settings.json")),
        }
    }

    /// Absolute API URL; a relative base is joined onto `api_origin`.
    pub fn resolved_api_url(&self) -> AppResult<Url> {
        resolve_api_url(&self.api_base_url, &self.api_origin)
    }
}

pub fn resolve_api_url(base: &str, origin: &str) -> AppResult<Url> {
    match Url::parse(base) {
        Ok(url) => Ok(url),
        Err(_) => {
            let origin = Url::parse(origin)
                .map_err(|e| AppError::Config(format!("invalid API origin {}: {}", origin, e)))?;
            origin
                .join(base)
                .map_err(|e| AppError::Config(format!("invalid API base {}: {}", base, e)))
        }
    }
}
