//! Debounced place suggestions.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use skycast_weather::{Place, PlaceSuggestionService};

use crate::messages::DashboardMessage;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Current suggestions keyed by display label.
///
/// Rebuilt wholesale for every geocoder answer. Duplicate labels get a
/// numeric suffix: `"X"`, `"X [1]"`, `"X [2]"`.
#[derive(Debug, Default)]
pub struct SuggestionList {
    entries: Vec<(String, Place)>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, places: Vec<Place>) {
        self.entries.clear();
        for place in places {
            let label = self.unique_label(&place.label);
            self.entries.push((label, place));
        }
    }

    fn unique_label(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{} [{}]", base, n);
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|(l, _)| l == label)
    }

    pub fn get(&self, label: &str) -> Option<&Place> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, place)| place)
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Holds back geocoder calls until the input has been quiet for the delay.
///
/// Each `schedule` cancels the pending timer. Once a timer has fired the
/// geocoder call runs to completion even if newer input arrives.
#[derive(Debug)]
pub struct Debouncer {
    runtime: Handle,
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(runtime: Handle, delay: Duration) -> Self {
        Self {
            runtime,
            delay,
            pending: None,
        }
    }

    pub fn schedule(
        &mut self,
        text: String,
        service: Arc<PlaceSuggestionService>,
        tx: &Sender<DashboardMessage>,
    ) {
        self.cancel();

        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        let delay = self.delay;
        let tx = tx.clone();

        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            let result = service.search(&text).await;
            if let Err(e) = &result {
                tracing::warn!("Suggestions for {:?} failed: {}", text, e);
            }
            let query = text.clone();
            if tx
                .send(DashboardMessage::SuggestionsReady {
                    query: text,
                    result,
                })
                .is_err()
            {
                tracing::debug!("Dashboard gone before suggestions for {:?} arrived", query);
            }
        });
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
