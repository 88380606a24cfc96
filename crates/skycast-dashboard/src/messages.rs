//! Background work and the messages it sends back.
//!
//! Fetches run on the tokio runtime; results are sent over an mpsc channel
//! and applied by the interactive thread.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use tokio::runtime::Handle;

use skycast_weather::{FetchError, GeocodeError, Place, Query, WeatherSource};

use crate::view_model::ViewModel;

/// Messages sent from async operations back to the interactive thread
#[derive(Debug)]
pub enum DashboardMessage {
    /// Result of one search, stamped with the sequence number it was started with
    SearchDone {
        seq: u64,
        raw_input: String,
        result: Result<ViewModel, FetchError>,
    },
    /// Geocoder answer for a debounced input
    SuggestionsReady {
        query: String,
        result: Result<Vec<Place>, GeocodeError>,
    },
    /// The refresh scheduler fired
    RefreshTick,
}

/// Fetch current conditions and forecast concurrently and build a view model.
/// Sends `SearchDone` on the channel when both finish or either fails.
pub fn request_search(
    runtime: &Handle,
    tx: &Sender<DashboardMessage>,
    source: Arc<dyn WeatherSource>,
    forecast_days: u32,
    seq: u64,
    raw_input: String,
    query: Query,
) {
    let tx = tx.clone();

    runtime.spawn(async move {
        tracing::info!("Search #{} for {} via {}", seq, query, source.kind());

        let result = tokio::try_join!(
            source.current_conditions(&query),
            source.forecast(&query, forecast_days),
        )
        .map(|(current, forecast)| ViewModel::build(raw_input.clone(), current, forecast));

        if let Err(e) = &result {
            tracing::warn!("Search #{} failed: {}", seq, e);
        }

        if tx
            .send(DashboardMessage::SearchDone {
                seq,
                raw_input,
                result,
            })
            .is_err()
        {
            tracing::debug!("Dashboard gone before search #{} finished", seq);
        }
    });
}
