pub mod config;
pub mod error;
pub mod prefs;
pub mod store;

pub use config::{Config, GeocodingConfig, StorageConfig, ValidationResult, WeatherConfig};
pub use error::StoreError;
pub use prefs::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, PREF_API_KEY, PREF_AUTO_REFRESH,
    PREF_REFRESH_INTERVAL_SECS,
};
pub use store::{FileLineStore, LineStore, MemoryLineStore};

/// Initialize tracing for the application.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    tracing::info!("SkyCast core initialized");
}
