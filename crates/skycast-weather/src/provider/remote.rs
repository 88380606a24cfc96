//! Remote weather API (weatherapi.com wire format).

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use super::{normalize_icon_url, BackendKind, WeatherSource};
use crate::error::FetchError;
use crate::types::{CurrentConditions, ForecastDay, HourlySample, HourlyTemperature, Query};

#[derive(Debug, Clone)]
pub struct RemoteWeatherSource {
    client: Client,
    api_key: String,
    base_url: String,
}

impl RemoteWeatherSource {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                FetchError::from_reqwest(&format!("Network error while fetching {}", what), &e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            FetchError::from_reqwest(&format!("Network error while reading {}", what), &e)
        })?;

        if !status.is_success() {
            tracing::warn!("Weather API returned {} for {}", status, endpoint);
            return Err(api_error(&body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!("Failed to parse {} body: {}", what, e);
            FetchError::Parse(format!("Failed to parse {}", what))
        })
    }
}

#[async_trait]
impl WeatherSource for RemoteWeatherSource {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    #[instrument(skip(self), level = "info")]
    async fn current_conditions(&self, query: &Query) -> Result<CurrentConditions, FetchError> {
        let params = [
            ("key", self.api_key.clone()),
            ("q", query.as_param()),
            ("aqi", "yes".to_string()),
        ];
        let body: WireCurrentResponse = self
            .get_json("current.json", &params, "current weather")
            .await?;
        current_from_wire(body)
    }

    #[instrument(skip(self), level = "info")]
    async fn forecast(&self, query: &Query, days: u32) -> Result<Vec<ForecastDay>, FetchError> {
        let params = [
            ("key", self.api_key.clone()),
            ("q", query.as_param()),
            ("days", days.to_string()),
            ("aqi", "yes".to_string()),
            ("alerts", "no".to_string()),
        ];
        let body: WireForecastResponse = self
            .get_json("forecast.json", &params, "forecast")
            .await?;
        forecast_from_wire(body)
    }
}

/// Map an error body to `ApiError`, using `{"error":{"message":M}}` when present.
fn api_error(body: &str) -> FetchError {
    let message = serde_json::from_str::<WireErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message);

    match message {
        Some(m) => FetchError::Api(format!("API error: {}", m)),
        None => FetchError::Api("API returned error or invalid response".to_string()),
    }
}

// ---- wire format ----

#[derive(Debug, Deserialize)]
struct WireErrorResponse {
    error: Option<WireErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCurrentResponse {
    location: Option<WireLocation>,
    current: Option<WireCurrent>,
}

#[derive(Debug, Default, Deserialize)]
struct WireLocation {
    name: Option<String>,
    region: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    tz_id: Option<String>,
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCurrent {
    temp_c: Option<f64>,
    feelslike_c: Option<f64>,
    humidity: Option<f64>,
    wind_kph: Option<f64>,
    pressure_mb: Option<f64>,
    vis_km: Option<f64>,
    uv: Option<f64>,
    cloud: Option<f64>,
    condition: Option<WireCondition>,
    air_quality: Option<WireAirQuality>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCondition {
    text: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAirQuality {
    pm2_5: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireForecastResponse {
    forecast: Option<WireForecast>,
}

#[derive(Debug, Deserialize)]
struct WireForecast {
    forecastday: Option<Vec<WireForecastDay>>,
}

#[derive(Debug, Deserialize)]
struct WireForecastDay {
    date: Option<String>,
    day: Option<WireDay>,
    astro: Option<WireAstro>,
    hour: Option<Vec<WireHour>>,
}

#[derive(Debug, Deserialize)]
struct WireDay {
    mintemp_c: Option<f64>,
    maxtemp_c: Option<f64>,
    avghumidity: Option<f64>,
    /// Outer `None` means the key was absent, `Some(None)` an explicit null.
    #[serde(default, deserialize_with = "present")]
    daily_chance_of_rain: Option<Option<f64>>,
    daily_chance_of_snow: Option<f64>,
    condition: Option<WireCondition>,
}

#[derive(Debug, Deserialize)]
struct WireAstro {
    sunrise: Option<String>,
    sunset: Option<String>,
    moon_phase: Option<String>,
    moon_illumination: Option<TextOrNumber>,
}

#[derive(Debug, Deserialize)]
struct WireHour {
    time: Option<String>,
    temp_c: Option<f64>,
    mintemp_c: Option<f64>,
    maxtemp_c: Option<f64>,
    feelslike_c: Option<f64>,
    humidity: Option<f64>,
    wind_kph: Option<f64>,
    precip_mm: Option<f64>,
    chance_of_rain: Option<f64>,
    condition: Option<WireCondition>,
}

/// Older API plans send some numbers as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(f64),
}

impl TextOrNumber {
    fn into_text(self) -> String {
        match self {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

fn float_or_nan(v: Option<f64>) -> f64 {
    v.unwrap_or(f64::NAN)
}

fn int_or(v: Option<f64>, fallback: i32) -> i32 {
    v.filter(|x| x.is_finite()).map(|x| x as i32).unwrap_or(fallback)
}

/// Three-letter English weekday for an ISO date; the raw string if it does not parse.
pub(crate) fn weekday_label(date: Option<&str>) -> String {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(|nd| nd.format("%a").to_string())
            .unwrap_or_else(|_| d.to_string()),
        None => "Day".to_string(),
    }
}

fn current_from_wire(body: WireCurrentResponse) -> Result<CurrentConditions, FetchError> {
    let current = body
        .current
        .ok_or_else(|| FetchError::Parse("Invalid API response (missing current)".to_string()))?;
    let location = body.location.unwrap_or_default();
    let condition = current.condition.unwrap_or_default();

    let humidity = int_or(current.humidity, -1);

    Ok(CurrentConditions {
        temperature: float_or_nan(current.temp_c),
        feels_like: float_or_nan(current.feelslike_c),
        humidity: humidity.max(0),
        condition: condition.text,
        wind_speed: float_or_nan(current.wind_kph),
        pressure_mb: float_or_nan(current.pressure_mb),
        visibility_km: float_or_nan(current.vis_km),
        uv: float_or_nan(current.uv),
        cloud: int_or(current.cloud, -1),
        location_name: location.name,
        region: location.region,
        country: location.country,
        latitude: float_or_nan(location.lat),
        longitude: float_or_nan(location.lon),
        timezone: location.tz_id,
        local_time: location.localtime,
        pm2_5: float_or_nan(current.air_quality.and_then(|aq| aq.pm2_5)),
        icon_url: normalize_icon_url(condition.icon),
    })
}

fn forecast_from_wire(body: WireForecastResponse) -> Result<Vec<ForecastDay>, FetchError> {
    let days = body
        .forecast
        .and_then(|f| f.forecastday)
        .ok_or_else(|| FetchError::Parse("Invalid API response (missing forecast)".to_string()))?;

    Ok(days.into_iter().map(day_from_wire).collect())
}

fn day_from_wire(wire: WireForecastDay) -> ForecastDay {
    let mut day = ForecastDay::new(weekday_label(wire.date.as_deref()), f64::NAN, f64::NAN);

    if let Some(d) = wire.day {
        day.min_temp = float_or_nan(d.mintemp_c);
        day.max_temp = float_or_nan(d.maxtemp_c);
        day.avg_humidity = int_or(d.avghumidity, -1);
        let chance = match d.daily_chance_of_rain {
            Some(rain) => rain,
            None => d.daily_chance_of_snow,
        };
        day.chance_of_precipitation = int_or(chance, -1);
        let condition = d.condition.unwrap_or_default();
        day.condition = condition.text;
        day.icon_url = normalize_icon_url(condition.icon);
    }

    if let Some(astro) = wire.astro {
        day.sunrise = astro.sunrise;
        day.sunset = astro.sunset;
        day.moon_phase = astro.moon_phase;
        day.moon_illumination = astro.moon_illumination.map(TextOrNumber::into_text);
    }

    day.hourly = wire
        .hour
        .unwrap_or_default()
        .into_iter()
        .map(hour_from_wire)
        .collect();

    day
}

fn hour_from_wire(wire: WireHour) -> HourlySample {
    let temperature = match (wire.mintemp_c, wire.maxtemp_c) {
        (Some(min), Some(max)) => HourlyTemperature::Range { min, max },
        _ => HourlyTemperature::Instantaneous {
            temp: float_or_nan(wire.temp_c),
        },
    };
    let condition = wire.condition.unwrap_or_default();

    HourlySample {
        time: wire.time,
        temperature,
        feels_like: float_or_nan(wire.feelslike_c),
        humidity: int_or(wire.humidity, -1),
        wind_speed: float_or_nan(wire.wind_kph),
        precipitation_mm: float_or_nan(wire.precip_mm),
        chance_of_rain: int_or(wire.chance_of_rain, -1),
        condition: condition.text,
        icon_url: normalize_icon_url(condition.icon),
    }
}
