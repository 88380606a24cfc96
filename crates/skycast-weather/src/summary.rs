//! Plain-text descriptions of the current conditions.

use std::fmt::Write;

use crate::types::{CurrentConditions, ForecastDay};

/// PM2.5 level (µg/m³) above which sensitive groups are warned.
const PM25_WARNING_THRESHOLD: f64 = 35.0;

/// One-line headline keyed on the condition text.
pub fn quick_summary(current: &CurrentConditions) -> &'static str {
    let c = current
        .condition
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    if c.contains("rain") || c.contains("shower") || c.contains("drizzle") {
        "Rain expected. Carry an umbrella."
    } else if c.contains("snow") {
        "Snow or wintry conditions expected."
    } else if c.contains("cloud") || c.contains("overcast") {
        "Mostly cloudy with occasional sun."
    } else if c.contains("mist") || c.contains("fog") {
        "Low visibility due to mist or fog."
    } else if c.contains("clear") || c.contains("sun") {
        "Clear skies and sunny."
    } else {
        "Typical weather conditions."
    }
}

/// Paragraph listing every known field; unknown ones are left out.
pub fn detail_paragraph(current: &CurrentConditions, today: Option<&ForecastDay>) -> String {
    let mut s = String::new();

    // Writing to a String cannot fail
    let _ = write!(
        s,
        "Temperature {:.1}°C (feels like {:.1}°C). ",
        current.temperature, current.feels_like
    );
    if let Some(condition) = &current.condition {
        let _ = write!(s, "{}. ", condition);
    }
    if current.humidity >= 0 {
        let _ = write!(s, "Humidity {}%. ", current.humidity);
    }
    if !current.wind_speed.is_nan() {
        let _ = write!(s, "Wind {:.1} km/h. ", current.wind_speed);
    }
    if !current.visibility_km.is_nan() {
        let _ = write!(s, "Visibility {:.1} km. ", current.visibility_km);
    }
    if !current.pressure_mb.is_nan() {
        let _ = write!(s, "Pressure {:.0} mb. ", current.pressure_mb);
    }
    if !current.uv.is_nan() {
        let _ = write!(s, "UV index {:.1}. ", current.uv);
    }
    if current.cloud >= 0 {
        let _ = write!(s, "Cloud cover {}%. ", current.cloud);
    }

    if let Some(day) = today {
        if let Some(sunrise) = &day.sunrise {
            let _ = write!(s, "Sunrise: {}. ", sunrise);
        }
        if let Some(sunset) = &day.sunset {
            let _ = write!(s, "Sunset: {}. ", sunset);
        }
        if let Some(moon) = &day.moon_phase {
            let _ = write!(s, "Moon: {}. ", moon);
        }
    }

    if !current.pm2_5.is_nan() {
        let _ = write!(s, "Air quality (PM2.5) {:.1} µg/m³. ", current.pm2_5);
        if current.pm2_5 > PM25_WARNING_THRESHOLD {
            s.push_str("Air quality is moderate or poor; sensitive groups should take care. ");
        }
    }

    s.trim_end().to_string()
}
