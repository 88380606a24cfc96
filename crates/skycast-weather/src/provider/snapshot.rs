//! Offline backend reading a hand-authored JSON snapshot.
//!
//! ```json
//! {
//!   "current": { "temperature": 24.0, "feelsLike": 25.1, "humidity": 60,
//!                "condition": "Sunny", "windSpeed": 9.5 },
//!   "forecast": [ { "day": "Mon", "minTemp": 18.0, "maxTemp": 27.0, "condition": "Sunny" } ]
//! }
//! ```
//!
//! Values are copied as written. The query is ignored: every location gets the
//! same snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::{normalize_icon_url, BackendKind, WeatherSource};
use crate::error::FetchError;
use crate::types::{CurrentConditions, ForecastDay, HourlySample, HourlyTemperature, Query};

#[derive(Debug, Clone)]
pub struct LocalSnapshotSource {
    path: PathBuf,
}

impl LocalSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SnapshotFile, FetchError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tracing::warn!("Cannot read snapshot {}: {}", self.path.display(), e);
            FetchError::Network("Cannot read weather file!".to_string())
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            tracing::warn!("Malformed snapshot {}: {}", self.path.display(), e);
            FetchError::Parse(format!("Malformed weather file: {}", e))
        })
    }
}

#[async_trait]
impl WeatherSource for LocalSnapshotSource {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalSnapshot
    }

    async fn current_conditions(&self, query: &Query) -> Result<CurrentConditions, FetchError> {
        tracing::debug!("Serving current conditions for {} from snapshot", query);
        let current = self
            .read()
            .await?
            .current
            .ok_or_else(|| FetchError::Parse("Weather file has no current section".to_string()))?;
        Ok(current.into())
    }

    /// Returns every entry in file order; `days` is not applied.
    async fn forecast(&self, query: &Query, _days: u32) -> Result<Vec<ForecastDay>, FetchError> {
        tracing::debug!("Serving forecast for {} from snapshot", query);
        let forecast = self
            .read()
            .await?
            .forecast
            .ok_or_else(|| FetchError::Parse("Cannot load forecast data!".to_string()))?;
        Ok(forecast.into_iter().map(ForecastDay::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    current: Option<SnapshotCurrent>,
    forecast: Option<Vec<SnapshotDay>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotCurrent {
    temperature: f64,
    feels_like: f64,
    humidity: i32,
    condition: String,
    wind_speed: f64,
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default)]
    icon_url: Option<String>,
}

impl From<SnapshotCurrent> for CurrentConditions {
    fn from(s: SnapshotCurrent) -> Self {
        CurrentConditions {
            temperature: s.temperature,
            feels_like: s.feels_like,
            humidity: s.humidity,
            condition: Some(s.condition),
            wind_speed: s.wind_speed,
            location_name: s.location_name,
            icon_url: normalize_icon_url(s.icon_url),
            ..CurrentConditions::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDay {
    day: String,
    min_temp: f64,
    max_temp: f64,
    condition: String,
    #[serde(default)]
    hourly: Vec<SnapshotHour>,
}

impl From<SnapshotDay> for ForecastDay {
    fn from(s: SnapshotDay) -> Self {
        let mut day = ForecastDay::new(s.day, s.min_temp, s.max_temp);
        day.condition = Some(s.condition);
        day.hourly = s.hourly.into_iter().map(HourlySample::from).collect();
        day
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotHour {
    time: String,
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    condition: Option<String>,
}

impl From<SnapshotHour> for HourlySample {
    fn from(s: SnapshotHour) -> Self {
        let mut sample = HourlySample::instantaneous(s.time, s.temp.unwrap_or(f64::NAN));
        if let (Some(min), Some(max)) = (s.temp_min, s.temp_max) {
            sample.temperature = HourlyTemperature::Range { min, max };
        }
        sample.condition = s.condition;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../../tests/fixtures/sample-snapshot.json");

    fn write_snapshot(contents: &str) -> (tempfile::TempDir, LocalSnapshotSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather-snapshot.json");
        std::fs::write(&path, contents).unwrap();
        (dir, LocalSnapshotSource::new(path))
    }

    #[tokio::test]
    async fn test_current_conditions_copied_verbatim() {
        let (_dir, source) = write_snapshot(FIXTURE);

        let current = source
            .current_conditions(&Query::Text("anywhere".into()))
            .await
            .unwrap();

        assert_eq!(current.temperature, 24.0);
        assert_eq!(current.feels_like, 25.1);
        assert_eq!(current.humidity, 60);
        assert_eq!(current.condition.as_deref(), Some("Partly cloudy"));
        assert_eq!(current.wind_speed, 9.5);
        assert_eq!(current.cloud, -1);
        assert!(current.pressure_mb.is_nan());
    }

    #[tokio::test]
    async fn test_three_entry_forecast_in_file_order() {
        let (_dir, source) = write_snapshot(FIXTURE);

        let days = source
            .forecast(&Query::Text("anywhere".into()), 7)
            .await
            .unwrap();

        assert_eq!(days.len(), 3);
        let labels: Vec<&str> = days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed"]);
        assert_eq!(days[1].min_temp, 17.5);
        assert_eq!(days[1].max_temp, 26.0);
        assert_eq!(days[1].condition.as_deref(), Some("Light rain"));
        assert_eq!(days[0].hourly.len(), 2);
        assert_eq!(
            days[0].hourly[1].temperature,
            HourlyTemperature::Range { min: 19.0, max: 21.5 }
        );
        assert!(days[2].hourly.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalSnapshotSource::new(dir.path().join("absent.json"));

        let err = source
            .current_conditions(&Query::Text("x".into()))
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.to_string(), "Cannot read weather file!");
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let (_dir, source) = write_snapshot("{ \"current\": ");

        let err = source
            .forecast(&Query::Text("x".into()), 7)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_forecast_section_is_parse_error() {
        let (_dir, source) = write_snapshot(
            r#"{"current":{"temperature":1,"feelsLike":1,"humidity":1,"condition":"Fog","windSpeed":1}}"#,
        );

        assert!(source
            .current_conditions(&Query::Text("x".into()))
            .await
            .is_ok());
        assert!(matches!(
            source.forecast(&Query::Text("x".into()), 7).await,
            Err(FetchError::Parse(_))
        ));
    }
}
