//! Fetch-with-fallback: a failed or stalled read degrades to sample data.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::http_client::ApiClient;
use crate::models::AnalyticsSummary;
use crate::resource::Resource;
use crate::samples;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
    /// Aborts the request itself.
    pub request_timeout: Option<Duration>,
    /// Outer ceiling on the whole load, however the request is doing.
    pub watchdog: Option<Duration>,
}

impl LoadPolicy {
    /// List views: the request may take as long as it likes, but the view gives up at `watchdog`.
    pub fn list(watchdog: Duration) -> Self {
        Self {
            request_timeout: None,
            watchdog: Some(watchdog),
        }
    }

    /// Dashboard summary: the request is aborted after `timeout`.
    pub fn summary(timeout: Duration) -> Self {
        Self {
            request_timeout: Some(timeout),
            watchdog: None,
        }
    }
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self::list(Duration::from_millis(3000))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub source: Source,
    /// Degraded-mode message for the banner; `None` on a live load.
    pub warning: Option<String>,
}

impl<T> Loaded<T> {
    fn live(data: T) -> Self {
        Self {
            data,
            source: Source::Live,
            warning: None,
        }
    }

    fn fallback(data: T, warning: String) -> Self {
        Self {
            data,
            source: Source::Fallback,
            warning: Some(warning),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == Source::Fallback
    }
}

/// Runs `request` under the policy's per-request timeout and outer watchdog.
pub async fn guarded<T, F>(policy: LoadPolicy, request: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let timed = async {
        match policy.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(result) => result,
                Err(_) => Err(AppError::Timeout(limit.as_millis())),
            },
            None => request.await,
        }
    };

    match policy.watchdog {
        Some(ceiling) => match tokio::time::timeout(ceiling, timed).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Watchdog(ceiling.as_millis())),
        },
        None => timed.await,
    }
}

pub async fn load<R: Resource>(client: &ApiClient, policy: LoadPolicy) -> Loaded<Vec<R>> {
    match guarded(policy, client.list::<R>()).await {
        Ok(records) => {
            tracing::info!("Loaded {} {}s", records.len(), R::LABEL);
            Loaded::live(records)
        }
        Err(e) => {
            tracing::warn!("Falling back to sample {}s: {}", R::LABEL, e);
            Loaded::fallback(
                R::samples(),
                format!(
                    "Could not load {}s from the server ({}). Showing sample data.",
                    R::LABEL,
                    e
                ),
            )
        }
    }
}

pub async fn load_summary(client: &ApiClient, policy: LoadPolicy) -> Loaded<AnalyticsSummary> {
    match guarded(policy, client.get_json::<AnalyticsSummary>("analytics")).await {
        Ok(summary) => {
            tracing::info!("Loaded analytics summary");
            Loaded::live(summary)
        }
        Err(e) => {
            tracing::warn!("Falling back to sample analytics: {}", e);
            Loaded::fallback(
                samples::analytics(),
                format!("Could not load dashboard data ({}). Showing sample figures.", e),
            )
        }
    }
}
