//! Application container: owns the tokio runtime and wires the dashboard
//! from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use skycast_core::{Config, FileLineStore, FilePreferenceStore, PreferenceStore, PREF_API_KEY};
use skycast_weather::{select_source, GeocoderSettings, PlaceSuggestionService, SourceSettings};

use crate::orchestrator::{Dashboard, DashboardDeps};
use crate::view::DashboardView;

/// Environment variable consulted when no API key preference is stored.
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct App {
    // Declared first so it drops before the runtime its tasks run on
    dashboard: Dashboard,
    runtime: tokio::runtime::Runtime,
}

impl App {
    pub fn new(config: &Config, view: Box<dyn DashboardView>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("skycast-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let preferences: Arc<dyn PreferenceStore> =
            Arc::new(FilePreferenceStore::open(config.preferences_path()));
        let api_key = resolve_api_key(preferences.as_ref(), std::env::var(API_KEY_ENV).ok());

        if api_key.is_none() {
            config
                .install_bundled_snapshot()
                .context("Failed to install offline snapshot")?;
        }

        let snapshot_path = config.snapshot_path();
        if api_key.is_none() && !snapshot_path.exists() {
            tracing::warn!(
                "No API key and no snapshot at {}; searches will fail",
                snapshot_path.display()
            );
        }

        let source = select_source(&SourceSettings {
            api_key: api_key.clone(),
            api_base_url: config.weather.api_base_url.clone(),
            snapshot_path,
            timeout: Duration::from_secs(config.weather.request_timeout_secs),
        });

        let suggestions = PlaceSuggestionService::from_settings(&GeocoderSettings {
            api_key,
            primary_base_url: config.geocoding.primary_base_url.clone(),
            fallback_base_url: config.geocoding.fallback_base_url.clone(),
            timeout: Duration::from_secs(config.geocoding.timeout_secs),
            user_agent: config.geocoding.user_agent.clone(),
        })
        .context("Failed to create place suggestion service")?;

        let mut deps = DashboardDeps::new(
            runtime.handle().clone(),
            source,
            Arc::new(suggestions),
            preferences,
            Arc::new(FileLineStore::new(config.favorites_path())),
            Arc::new(FileLineStore::new(config.last_query_path())),
        );
        deps.forecast_days = config.weather.forecast_days;

        let dashboard = Dashboard::new(deps, view);
        tracing::info!("SkyCast dashboard ready ({} backend)", dashboard.source().kind());

        Ok(Self { dashboard, runtime })
    }

    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    /// Stop background work and give in-flight requests a moment to finish.
    pub fn shutdown(mut self) {
        tracing::info!("SkyCast shutdown initiated");
        self.dashboard.shutdown();
        let Self { dashboard, runtime } = self;
        drop(dashboard);
        runtime.shutdown_timeout(SHUTDOWN_GRACE);
        tracing::info!("SkyCast shutdown complete");
    }
}

/// The stored key when non-blank, otherwise the environment value when non-blank.
pub fn resolve_api_key(preferences: &dyn PreferenceStore, env_value: Option<String>) -> Option<String> {
    let stored = preferences.get(PREF_API_KEY, "");
    if !stored.trim().is_empty() {
        return Some(stored.trim().to_string());
    }
    env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
