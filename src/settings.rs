//! User settings, read once at startup and written back on every change.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{resolve_api_url, Config};
use crate::error::{AppError, AppResult};
use crate::http_client::ApiClient;
use crate::models::LOW_STOCK_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Overrides `API_BASE_URL` when set.
    pub api_url: Option<String>,
    pub theme: Theme,
    pub low_stock_threshold: i64,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            theme: Theme::default(),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            notifications: true,
        }
    }
}

impl Settings {
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Settings(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Settings(e.to_string()))?;
        fs::write(path, raw)?;
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    current: Settings,
}

impl SettingsStore {
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let current = Settings::load(&path)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(Self { path, current })
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    /// Applies `change` and persists it. Nothing is written when the settings did not change.
    pub fn update<F>(&mut self, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut Settings),
    {
        let mut next = self.current.clone();
        change(&mut next);
        if next == self.current {
            return Ok(());
        }
        next.save(&self.path)?;
        self.current = next;
        Ok(())
    }

    /// The API URL requests should use: the settings override, else the configured one.
    pub fn api_url(&self, config: &Config) -> AppResult<Url> {
        match &self.current.api_url {
            Some(url) => resolve_api_url(url, &config.api_origin),
            None => config.resolved_api_url(),
        }
    }

    /// Saves a new API URL override and points `client` at it for subsequent requests.
    pub async fn set_api_url(
        &mut self,
        url: Option<String>,
        config: &Config,
        client: &ApiClient,
    ) -> AppResult<()> {
        let resolved = match &url {
            Some(raw) => resolve_api_url(raw, &config.api_origin)?,
            None => config.resolved_api_url()?,
        };
        self.update(|s| s.api_url = url)?;
        client.set_base_url(resolved).await;
        Ok(())
    }
}
