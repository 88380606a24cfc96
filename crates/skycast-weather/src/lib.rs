//! Weather data for SkyCast
//!
//! Fetches current conditions and multi-day forecasts from a remote API or an
//! offline snapshot, suggests places for free-text input, and turns forecast
//! data into chart series.

pub mod chart;
pub mod error;
pub mod geocode;
pub mod provider;
pub mod summary;
pub mod types;

pub use chart::{daily_series, hourly_series, ChartData, Series, HOURLY_BAND_DELTA};
pub use error::{FetchError, GeocodeError};
pub use geocode::{
    FallbackGeocoder, Geocoder, GeocoderSettings, PlaceSuggestionService, PrimaryGeocoder,
    MAX_SUGGESTIONS,
};
pub use provider::{
    backend_for, select_source, BackendKind, LocalSnapshotSource, RemoteWeatherSource,
    SourceSettings, WeatherSource, DEFAULT_FORECAST_DAYS,
};
pub use summary::{detail_paragraph, quick_summary};
pub use types::*;
