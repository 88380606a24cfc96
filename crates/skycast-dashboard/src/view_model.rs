use chrono::{DateTime, Local};
use serde::Serialize;

use skycast_weather::{
    daily_series, detail_paragraph, hourly_series, quick_summary, ChartData, CurrentConditions,
    ForecastDay,
};

/// Everything the dashboard shows for one successful search.
///
/// Built off the interactive thread and handed over whole; never mutated
/// after construction.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    /// Input text the search was started from
    pub query: String,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastDay>,
    pub daily_chart: ChartData,
    /// Hourly band for the first forecast day
    pub hourly_chart: ChartData,
    pub summary: String,
    pub details: String,
    pub fetched_at: DateTime<Local>,
}

impl ViewModel {
    pub fn build(
        query: impl Into<String>,
        current: CurrentConditions,
        forecast: Vec<ForecastDay>,
    ) -> Self {
        let daily_chart = daily_series(&forecast);
        let today = forecast.first();
        let hourly_chart = hourly_series(today.map(|d| d.hourly.as_slice()).unwrap_or_default());
        let summary = quick_summary(&current).to_string();
        let details = detail_paragraph(&current, today);

        Self {
            query: query.into(),
            current,
            forecast,
            daily_chart,
            hourly_chart,
            summary,
            details,
            fetched_at: Local::now(),
        }
    }

    pub fn today(&self) -> Option<&ForecastDay> {
        self.forecast.first()
    }

    /// Hourly chart for another forecast day, e.g. when the user picks one.
    pub fn hourly_chart_for(&self, day_index: usize) -> Option<ChartData> {
        self.forecast
            .get(day_index)
            .map(|day| hourly_series(&day.hourly))
    }
}
