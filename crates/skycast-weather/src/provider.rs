//! Weather data sources.
//!
//! Two backends expose the same capabilities: the remote HTTP API and a local
//! JSON snapshot for offline/demo use. Which one is used depends only on
//! whether an API key is configured.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{CurrentConditions, ForecastDay, Query};

pub mod remote;
pub mod snapshot;

pub use remote::RemoteWeatherSource;
pub use snapshot::LocalSnapshotSource;

pub const DEFAULT_FORECAST_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Remote,
    LocalSnapshot,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::LocalSnapshot => "local-snapshot",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    fn kind(&self) -> BackendKind;

    async fn current_conditions(&self, query: &Query) -> Result<CurrentConditions, FetchError>;

    /// Forecast days in ascending date order.
    async fn forecast(&self, query: &Query, days: u32) -> Result<Vec<ForecastDay>, FetchError>;
}

/// Everything needed to build either backend.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub snapshot_path: PathBuf,
    pub timeout: Duration,
}

/// Remote when a non-blank API key is configured, local snapshot otherwise.
pub fn backend_for(api_key: Option<&str>) -> BackendKind {
    match api_key {
        Some(key) if !key.trim().is_empty() => BackendKind::Remote,
        _ => BackendKind::LocalSnapshot,
    }
}

/// Build the weather source chosen by [`backend_for`].
///
/// If the HTTP client cannot be constructed the snapshot backend is used.
pub fn select_source(settings: &SourceSettings) -> Arc<dyn WeatherSource> {
    let snapshot = || -> Arc<dyn WeatherSource> {
        Arc::new(LocalSnapshotSource::new(settings.snapshot_path.clone()))
    };

    match (backend_for(settings.api_key.as_deref()), settings.api_key.as_deref()) {
        (BackendKind::Remote, Some(key)) => {
            match RemoteWeatherSource::new(key.trim(), &settings.api_base_url, settings.timeout) {
                Ok(source) => {
                    tracing::info!("Using remote weather backend at {}", settings.api_base_url);
                    Arc::new(source)
                }
                Err(e) => {
                    tracing::error!("Failed to create weather client, using snapshot: {}", e);
                    snapshot()
                }
            }
        }
        _ => {
            tracing::info!(
                "No API key configured; using offline snapshot {}",
                settings.snapshot_path.display()
            );
            snapshot()
        }
    }
}

/// Prefix protocol-relative icon URLs with `https:`; leave everything else alone.
pub fn normalize_icon_url(url: Option<String>) -> Option<String> {
    url.map(|u| {
        if u.starts_with("//") {
            format!("https:{}", u)
        } else {
            u
        }
    })
}
