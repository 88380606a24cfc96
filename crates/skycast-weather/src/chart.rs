//! Min/max temperature series for the daily and hourly charts.
//!
//! Missing points are NaN so every series stays aligned with its categories.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{ForecastDay, HourlySample, HourlyTemperature};

/// Half-width of the band drawn around an instantaneous hourly reading.
pub const HOURLY_BAND_DELTA: f64 = 1.5;

const HOURS_PER_DAY: u32 = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::with_capacity(capacity),
        }
    }
}

/// Category labels plus one "Min" and one "Max" series of the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub min: Series,
    pub max: Series,
}

impl ChartData {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            categories: Vec::with_capacity(capacity),
            min: Series::new("Min", capacity),
            max: Series::new("Max", capacity),
        }
    }

    fn push(&mut self, category: String, min: f64, max: f64) {
        self.categories.push(category);
        self.min.values.push(min);
        self.max.values.push(max);
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// One point per forecast day, in day order.
pub fn daily_series(days: &[ForecastDay]) -> ChartData {
    let mut chart = ChartData::with_capacity(days.len());
    for day in days {
        chart.push(day.label.clone(), day.min_temp, day.max_temp);
    }
    chart
}

/// Always 24 categories `"00:00"`..`"23:00"`; hours with no sample are NaN in both series.
pub fn hourly_series(samples: &[HourlySample]) -> ChartData {
    let mut by_hour: HashMap<String, &HourlySample> = HashMap::new();
    for sample in samples {
        // Later samples for the same hour replace earlier ones
        by_hour.insert(hour_key(sample.time.as_deref()), sample);
    }

    let mut chart = ChartData::with_capacity(HOURS_PER_DAY as usize);
    for hour in 0..HOURS_PER_DAY {
        let category = format!("{:02}:00", hour);
        let (min, max) = match by_hour.get(&category) {
            Some(sample) => band(sample.temperature),
            None => (f64::NAN, f64::NAN),
        };
        chart.push(category, min, max);
    }
    chart
}

fn band(temperature: HourlyTemperature) -> (f64, f64) {
    match temperature {
        HourlyTemperature::Range { min, max } => (min, max),
        HourlyTemperature::Instantaneous { temp } => {
            (temp - HOURLY_BAND_DELTA, temp + HOURLY_BAND_DELTA)
        }
    }
}

/// Time-of-day part of a timestamp ("2025-11-28 9:00" -> "09:00").
fn hour_key(time: Option<&str>) -> String {
    let Some(time) = time else {
        return String::new();
    };
    let tail = match time.rfind(' ') {
        Some(idx) => &time[idx + 1..],
        None => time,
    };

    let mut chars = tail.chars();
    let single_digit_hour = matches!(
        (chars.next(), chars.next()),
        (Some(h), Some(':')) if h.is_ascii_digit()
    );
    if single_digit_hour {
        format!("0{}", tail)
    } else {
        tail.to_string()
    }
}
