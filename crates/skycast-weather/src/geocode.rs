//! Place suggestions: free-text fragment to candidate places.
//!
//! The primary geocoder is the weather API's structured `search.json`
//! endpoint and needs an API key. The fallback is Nominatim (OpenStreetMap),
//! free and keyless, which only returns a display string plus coordinates.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use crate::error::GeocodeError;
use crate::provider::{backend_for, BackendKind};
use crate::types::Place;

pub const MAX_SUGGESTIONS: usize = 10;

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct GeocoderSettings {
    pub api_key: Option<String>,
    pub primary_base_url: String,
    pub fallback_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

fn build_client(settings: &GeocoderSettings) -> Result<Client, GeocodeError> {
    Client::builder()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(|e| GeocodeError::Transport(format!("Failed to create HTTP client: {}", e)))
}

/// GET `url` and decode a JSON array, skipping elements that do not fit `T`.
async fn fetch_array<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
) -> Result<Vec<T>, GeocodeError> {
    let response = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|e| GeocodeError::Transport(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(GeocodeError::Response(format!("status {}", status)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| GeocodeError::Transport(e.to_string()))?;

    let items: Vec<serde_json::Value> =
        serde_json::from_str(&body).map_err(|e| GeocodeError::Response(e.to_string()))?;

    Ok(items
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

/// Coordinates arrive as numbers from one service and as strings from the other.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

fn coordinate(value: Option<Coordinate>) -> f64 {
    match value {
        Some(Coordinate::Number(n)) => n,
        Some(Coordinate::Text(s)) => s.trim().parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

// ---- primary ----

#[derive(Debug, Clone)]
pub struct PrimaryGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PrimaryPlace {
    name: Option<String>,
    region: Option<String>,
    country: Option<String>,
    lat: Option<Coordinate>,
    lon: Option<Coordinate>,
}

impl PrimaryGeocoder {
    pub fn new(api_key: &str, settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: build_client(settings)?,
            api_key: api_key.to_string(),
            base_url: settings.primary_base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// "name, region, country" when a region is known, else "name, country", else the name.
fn primary_label(name: Option<&str>, region: Option<&str>, country: Option<&str>) -> String {
    let name = name.unwrap_or_default();
    if non_blank(region) {
        format!(
            "{}, {}, {}",
            name,
            region.unwrap_or_default(),
            country.unwrap_or_default()
        )
    } else if non_blank(country) {
        format!("{}, {}", name, country.unwrap_or_default())
    } else {
        name.to_string()
    }
}

#[async_trait]
impl Geocoder for PrimaryGeocoder {
    fn name(&self) -> &'static str {
        "weatherapi"
    }

    #[instrument(skip(self), level = "debug")]
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let url = format!("{}/search.json", self.base_url);
        let items: Vec<PrimaryPlace> = fetch_array(
            &self.client,
            &url,
            &[("key", self.api_key.as_str()), ("q", query)],
        )
        .await?;

        Ok(items
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|p| Place {
                label: primary_label(p.name.as_deref(), p.region.as_deref(), p.country.as_deref()),
                name: p.name,
                region: p.region,
                country: p.country,
                lat: coordinate(p.lat),
                lon: coordinate(p.lon),
            })
            .collect())
    }
}

// ---- fallback ----

#[derive(Debug, Clone)]
pub struct FallbackGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: Option<String>,
    lat: Option<Coordinate>,
    lon: Option<Coordinate>,
}

impl FallbackGeocoder {
    pub fn new(settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: build_client(settings)?,
            base_url: settings.fallback_base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Split a display string on commas: first token is the name; with two or
/// more tokens the second-to-last is the region and the last the country.
fn split_display_name(display: &str) -> (Option<String>, Option<String>, Option<String>) {
    let parts: Vec<&str> = display
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let name = parts.first().map(|s| s.to_string());
    if parts.len() < 2 {
        return (name, None, None);
    }
    let region = parts.get(parts.len() - 2).map(|s| s.to_string());
    let country = parts.last().map(|s| s.to_string());
    (name, region, country)
}

#[async_trait]
impl Geocoder for FallbackGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    #[instrument(skip(self), level = "debug")]
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let limit = MAX_SUGGESTIONS.to_string();
        let items: Vec<NominatimPlace> = fetch_array(
            &self.client,
            &url,
            &[("format", "json"), ("limit", limit.as_str()), ("q", query)],
        )
        .await?;

        Ok(items
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|p| {
                let label = p.display_name.unwrap_or_default();
                let (name, region, country) = split_display_name(&label);
                Place {
                    label,
                    name,
                    region,
                    country,
                    lat: coordinate(p.lat),
                    lon: coordinate(p.lon),
                }
            })
            .collect())
    }
}

// ---- service ----

/// Chooses between the geocoders and applies the failure policy.
#[derive(Debug, Clone)]
pub struct PlaceSuggestionService {
    primary: Option<Arc<dyn Geocoder>>,
    fallback: Arc<dyn Geocoder>,
}

impl PlaceSuggestionService {
    pub fn new(primary: Option<Arc<dyn Geocoder>>, fallback: Arc<dyn Geocoder>) -> Self {
        Self { primary, fallback }
    }

    /// Primary geocoder only when an API key is configured.
    pub fn from_settings(settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        let fallback: Arc<dyn Geocoder> = Arc::new(FallbackGeocoder::new(settings)?);

        let primary: Option<Arc<dyn Geocoder>> =
            match (backend_for(settings.api_key.as_deref()), settings.api_key.as_deref()) {
                (BackendKind::Remote, Some(key)) => {
                    Some(Arc::new(PrimaryGeocoder::new(key.trim(), settings)?))
                }
                _ => None,
            };

        tracing::info!(
            "Place suggestions via {}",
            primary.as_ref().map_or(fallback.name(), |p| p.name())
        );
        Ok(Self::new(primary, fallback))
    }

    pub fn uses_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// At most [`MAX_SUGGESTIONS`] places in backend order.
    ///
    /// A blank query returns nothing without a request. A transport failure of
    /// the primary geocoder gets one fallback attempt; if that fails too the
    /// primary's error is returned. Response failures yield an empty list.
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let result = match &self.primary {
            Some(primary) => match primary.search(query).await {
                Err(e) if e.is_transport() => {
                    tracing::warn!("{} unreachable ({}), trying {}", primary.name(), e, self.fallback.name());
                    match self.fallback.search(query).await {
                        Ok(places) => Ok(places),
                        Err(fallback_err) if fallback_err.is_transport() => {
                            tracing::warn!("{} failed too: {}", self.fallback.name(), fallback_err);
                            Err(e)
                        }
                        Err(fallback_err) => Err(fallback_err),
                    }
                }
                other => other,
            },
            None => self.fallback.search(query).await,
        };

        match result {
            Ok(mut places) => {
                places.truncate(MAX_SUGGESTIONS);
                Ok(places)
            }
            Err(GeocodeError::Response(msg)) => {
                tracing::debug!("Discarding unusable geocoder response: {}", msg);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
