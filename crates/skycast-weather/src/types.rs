use serde::Serialize;

/// What is sent to the weather backend for one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Query {
    /// Free-text place name as typed
    Text(String),
    /// Coordinates of a picked suggestion
    Coordinates { lat: f64, lon: f64 },
}

impl Query {
    /// Coordinates when a place was picked, otherwise the trimmed text.
    pub fn resolve(raw_input: &str, place: Option<&Place>) -> Self {
        match place {
            Some(p) => Query::Coordinates {
                lat: p.lat,
                lon: p.lon,
            },
            None => Query::Text(raw_input.trim().to_string()),
        }
    }

    /// Value for the `q` request parameter.
    pub fn as_param(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Text(s) => f.write_str(s),
            Query::Coordinates { lat, lon } => write!(f, "{},{}", lat, lon),
        }
    }
}

/// Current conditions for a location.
///
/// Unknown fractional values are NaN. Humidity is clamped to 0 when unknown
/// while cloud cover keeps -1; consumers rely on both.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i32,
    pub condition: Option<String>,
    /// km/h
    pub wind_speed: f64,
    pub pressure_mb: f64,
    pub visibility_km: f64,
    pub uv: f64,
    pub cloud: i32,
    pub location_name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub local_time: Option<String>,
    /// PM2.5 in µg/m³
    pub pm2_5: f64,
    pub icon_url: Option<String>,
}

impl Default for CurrentConditions {
    fn default() -> Self {
        Self {
            temperature: f64::NAN,
            feels_like: f64::NAN,
            humidity: 0,
            condition: None,
            wind_speed: f64::NAN,
            pressure_mb: f64::NAN,
            visibility_km: f64::NAN,
            uv: f64::NAN,
            cloud: -1,
            location_name: None,
            region: None,
            country: None,
            latitude: f64::NAN,
            longitude: f64::NAN,
            timezone: None,
            local_time: None,
            pm2_5: f64::NAN,
            icon_url: None,
        }
    }
}

impl CurrentConditions {
    pub fn has_coordinates(&self) -> bool {
        !self.latitude.is_nan() && !self.longitude.is_nan()
    }
}

/// One forecast day. `hourly` keeps the order the backend sent.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastDay {
    /// Short weekday label, e.g. "Fri"
    pub label: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub condition: Option<String>,
    /// -1 when unknown
    pub avg_humidity: i32,
    /// -1 when unknown
    pub chance_of_precipitation: i32,
    pub icon_url: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub moon_phase: Option<String>,
    pub moon_illumination: Option<String>,
    pub hourly: Vec<HourlySample>,
}

impl ForecastDay {
    pub fn new(label: impl Into<String>, min_temp: f64, max_temp: f64) -> Self {
        Self {
            label: label.into(),
            min_temp,
            max_temp,
            condition: None,
            avg_humidity: -1,
            chance_of_precipitation: -1,
            icon_url: None,
            sunrise: None,
            sunset: None,
            moon_phase: None,
            moon_illumination: None,
            hourly: Vec::new(),
        }
    }
}

/// Temperature reading carried by an hourly sample, decided at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HourlyTemperature {
    Instantaneous { temp: f64 },
    Range { min: f64, max: f64 },
}

/// One hourly reading.
#[derive(Debug, Clone, Serialize)]
pub struct HourlySample {
    /// e.g. "2025-11-28 14:00"
    pub time: Option<String>,
    pub temperature: HourlyTemperature,
    pub feels_like: f64,
    pub humidity: i32,
    pub wind_speed: f64,
    pub precipitation_mm: f64,
    pub chance_of_rain: i32,
    pub condition: Option<String>,
    pub icon_url: Option<String>,
}

impl HourlySample {
    pub fn instantaneous(time: impl Into<String>, temp: f64) -> Self {
        Self {
            time: Some(time.into()),
            temperature: HourlyTemperature::Instantaneous { temp },
            feels_like: f64::NAN,
            humidity: -1,
            wind_speed: f64::NAN,
            precipitation_mm: f64::NAN,
            chance_of_rain: -1,
            condition: None,
            icon_url: None,
        }
    }
}

/// A place suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub label: String,
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}
