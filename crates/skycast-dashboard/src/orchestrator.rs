//! Dashboard state and the interactive-thread side of every operation.
//!
//! `Dashboard` is the only owner of the view model, recents, favorites, the
//! current input and the picked place. Background tasks never touch it; they
//! send a `DashboardMessage` that `process_messages`/`process_next` apply.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use skycast_core::{LineStore, PreferenceStore, PREF_AUTO_REFRESH};
use skycast_weather::{
    FetchError, GeocodeError, Place, PlaceSuggestionService, Query, WeatherSource,
    DEFAULT_FORECAST_DAYS,
};

use crate::messages::{request_search, DashboardMessage};
use crate::scheduler::RefreshScheduler;
use crate::suggestions::{Debouncer, SuggestionList, DEBOUNCE_DELAY};
use crate::view::DashboardView;
use crate::view_model::ViewModel;

/// Collaborators injected into the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardDeps {
    pub runtime: Handle,
    pub source: Arc<dyn WeatherSource>,
    pub suggestions: Arc<PlaceSuggestionService>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub favorites: Arc<dyn LineStore>,
    pub last_query: Arc<dyn LineStore>,
    pub forecast_days: u32,
    pub debounce_delay: Duration,
}

impl DashboardDeps {
    pub fn new(
        runtime: Handle,
        source: Arc<dyn WeatherSource>,
        suggestions: Arc<PlaceSuggestionService>,
        preferences: Arc<dyn PreferenceStore>,
        favorites: Arc<dyn LineStore>,
        last_query: Arc<dyn LineStore>,
    ) -> Self {
        Self {
            runtime,
            source,
            suggestions,
            preferences,
            favorites,
            last_query,
            forecast_days: DEFAULT_FORECAST_DAYS,
            debounce_delay: DEBOUNCE_DELAY,
        }
    }
}

pub struct Dashboard {
    runtime: Handle,
    source: Arc<dyn WeatherSource>,
    suggestion_service: Arc<PlaceSuggestionService>,
    preferences: Arc<dyn PreferenceStore>,
    favorites_store: Arc<dyn LineStore>,
    last_query_store: Arc<dyn LineStore>,
    forecast_days: u32,
    view: Box<dyn DashboardView>,

    tx: Sender<DashboardMessage>,
    rx: Receiver<DashboardMessage>,
    debouncer: Debouncer,
    scheduler: RefreshScheduler,

    input: String,
    selected_place: Option<Place>,
    suggestions: SuggestionList,
    view_model: Option<ViewModel>,
    recents: Vec<String>,
    favorites: Vec<String>,

    /// Sequence number handed to the most recent search
    last_started: u64,
    /// Sequence number of the newest search whose outcome was applied
    last_applied: u64,
    in_flight: usize,
}

impl Dashboard {
    pub fn new(deps: DashboardDeps, view: Box<dyn DashboardView>) -> Self {
        let (tx, rx) = mpsc::channel();
        let debouncer = Debouncer::new(deps.runtime.clone(), deps.debounce_delay);
        let scheduler =
            RefreshScheduler::new(deps.runtime.clone(), tx.clone(), deps.preferences.clone());

        Self {
            runtime: deps.runtime,
            source: deps.source,
            suggestion_service: deps.suggestions,
            preferences: deps.preferences,
            favorites_store: deps.favorites,
            last_query_store: deps.last_query,
            forecast_days: deps.forecast_days,
            view,
            tx,
            rx,
            debouncer,
            scheduler,
            input: String::new(),
            selected_place: None,
            suggestions: SuggestionList::new(),
            view_model: None,
            recents: Vec::new(),
            favorites: Vec::new(),
            last_started: 0,
            last_applied: 0,
            in_flight: 0,
        }
    }

    /// Load favorites and the last query, search it, and resume auto-refresh.
    pub fn restore(&mut self) {
        self.favorites = match self.favorites_store.load() {
            Ok(favorites) => favorites,
            Err(e) => {
                tracing::warn!("Failed to load favorites: {}", e);
                Vec::new()
            }
        };

        let last = match self.last_query_store.load_single() {
            Ok(last) => last,
            Err(e) => {
                tracing::warn!("Failed to load last query: {}", e);
                String::new()
            }
        };

        self.recents = self.favorites.clone();
        if !last.trim().is_empty() && !self.recents.contains(&last) {
            self.recents.insert(0, last.clone());
        }
        self.view.show_favorites(&self.favorites);
        self.view.show_recents(&self.recents);

        if !last.trim().is_empty() {
            tracing::info!("Restoring last query {:?}", last);
            self.input = last;
            self.search();
        }

        if self.auto_refresh_enabled() {
            self.scheduler.start();
        }
    }

    // ---- input and suggestions ----

    /// New input text. Clears any picked place and debounces a suggestion lookup.
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.selected_place = None;

        if text.trim().is_empty() {
            self.debouncer.cancel();
            self.suggestions.clear();
            self.view.clear_suggestions();
            return;
        }

        self.debouncer.schedule(
            text.to_string(),
            self.suggestion_service.clone(),
            &self.tx,
        );
    }

    /// Pick a suggestion by its label and search its coordinates.
    ///
    /// Returns false if the label is not in the current list.
    pub fn pick_suggestion(&mut self, label: &str) -> bool {
        let Some(place) = self.suggestions.get(label).cloned() else {
            tracing::debug!("Unknown suggestion {:?}", label);
            return false;
        };

        self.debouncer.cancel();
        self.input = label.to_string();
        self.selected_place = Some(place);
        self.suggestions.clear();
        self.view.clear_suggestions();
        self.search();
        true
    }

    // ---- search ----

    /// Search the current input, using the picked place if there is one.
    pub fn search(&mut self) -> Option<u64> {
        let raw_input = self.input.clone();
        let place = self.selected_place.clone();
        self.search_with(&raw_input, place.as_ref())
    }

    /// Start a search; returns its sequence number, or `None` for blank input.
    pub fn search_with(&mut self, raw_input: &str, place: Option<&Place>) -> Option<u64> {
        let raw_input = raw_input.trim();
        if raw_input.is_empty() {
            return None;
        }

        let query = Query::resolve(raw_input, place);
        self.last_started += 1;
        let seq = self.last_started;

        self.in_flight += 1;
        self.view.set_busy(true);

        request_search(
            &self.runtime,
            &self.tx,
            self.source.clone(),
            self.forecast_days,
            seq,
            raw_input.to_string(),
            query,
        );
        Some(seq)
    }

    // ---- message pump ----

    /// Apply every message already waiting. Never blocks.
    pub fn process_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle(message);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for one message and apply it.
    pub fn process_next(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => {
                self.handle(message);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            // Unreachable while self.tx is alive
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn handle(&mut self, message: DashboardMessage) {
        match message {
            DashboardMessage::SearchDone {
                seq,
                raw_input,
                result,
            } => self.apply_search(seq, raw_input, result),
            DashboardMessage::SuggestionsReady { query, result } => {
                self.apply_suggestions(&query, result)
            }
            DashboardMessage::RefreshTick => {
                if self.input.trim().is_empty() {
                    tracing::debug!("Refresh tick with no query");
                } else {
                    tracing::debug!("Refreshing {:?}", self.input);
                    self.search();
                }
            }
        }
    }

    fn apply_search(&mut self, seq: u64, raw_input: String, result: Result<ViewModel, FetchError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.view.set_busy(false);
        }

        if seq < self.last_applied {
            tracing::debug!(
                "Dropping search #{} for {:?}; #{} already applied",
                seq,
                raw_input,
                self.last_applied
            );
            return;
        }
        self.last_applied = seq;

        match result {
            Ok(view_model) => {
                self.view.render(&view_model);
                self.view_model = Some(view_model);

                if !self.recents.contains(&raw_input) {
                    self.recents.insert(0, raw_input.clone());
                    self.view.show_recents(&self.recents);
                }

                if let Err(e) = self.last_query_store.save_single(&raw_input) {
                    tracing::warn!("Failed to save last query: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!("Keeping previous data after failed search: {}", e);
                self.view.show_error(&e.to_string());
            }
        }
    }

    fn apply_suggestions(&mut self, query: &str, result: Result<Vec<Place>, GeocodeError>) {
        match result {
            Ok(places) => {
                tracing::debug!("{} suggestions for {:?}", places.len(), query);
                self.suggestions.replace(places);
                if self.suggestions.is_empty() {
                    self.view.clear_suggestions();
                } else {
                    self.view.show_suggestions(&self.suggestions.labels());
                }
            }
            Err(_) => {
                self.suggestions.clear();
                self.view.clear_suggestions();
            }
        }
    }

    // ---- favorites ----

    /// Add the current input to favorites. Returns false if blank or already present.
    pub fn add_favorite(&mut self) -> bool {
        let name = self.input.trim().to_string();
        if name.is_empty() || self.favorites.contains(&name) {
            return false;
        }
        self.favorites.push(name);
        self.save_favorites();
        true
    }

    pub fn remove_favorite(&mut self, name: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|f| f != name);
        if self.favorites.len() == before {
            return false;
        }
        self.save_favorites();
        true
    }

    fn save_favorites(&mut self) {
        if let Err(e) = self.favorites_store.save(&self.favorites) {
            tracing::warn!("Failed to save favorites: {}", e);
        }
        self.view.show_favorites(&self.favorites);
    }

    // ---- auto-refresh ----

    pub fn auto_refresh_enabled(&self) -> bool {
        self.preferences
            .get(PREF_AUTO_REFRESH, "false")
            .trim()
            .eq_ignore_ascii_case("true")
    }

    /// Persist the flag and start or stop the scheduler.
    pub fn set_auto_refresh(&mut self, enabled: bool) {
        if let Err(e) = self.preferences.put(PREF_AUTO_REFRESH, &enabled.to_string()) {
            tracing::warn!("Failed to persist auto-refresh flag: {}", e);
        }
        if enabled {
            self.scheduler.start();
        } else {
            self.scheduler.stop();
        }
    }

    /// Returns the interval actually applied after clamping.
    pub fn set_refresh_interval(&mut self, secs: u64) -> u64 {
        self.scheduler.set_interval_secs(secs)
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        self.scheduler.interval_secs()
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Stop the scheduler and drop any pending suggestion lookup.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        self.debouncer.cancel();
        tracing::info!("Dashboard shut down");
    }

    // ---- accessors ----

    pub fn view_model(&self) -> Option<&ViewModel> {
        self.view_model.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected_place(&self) -> Option<&Place> {
        self.selected_place.as_ref()
    }

    pub fn suggestion_labels(&self) -> Vec<String> {
        self.suggestions.labels()
    }

    pub fn recents(&self) -> &[String] {
        &self.recents
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn source(&self) -> &Arc<dyn WeatherSource> {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Instant;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use skycast_core::{MemoryLineStore, MemoryPreferenceStore, StoreError, PREF_REFRESH_INTERVAL_SECS};
    use skycast_weather::{
        BackendKind, CurrentConditions, ForecastDay, Geocoder, HourlySample,
    };

    // ---- fakes ----

    #[derive(Debug, Default)]
    struct FakeSource {
        queries: Mutex<Vec<String>>,
        forecast_error: Mutex<Option<FetchError>>,
        delays: Mutex<HashMap<String, Duration>>,
    }

    impl FakeSource {
        async fn pause_for(&self, query: &Query) {
            let delay = self.delays.lock().get(&query.to_string()).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        fn kind(&self) -> BackendKind {
            BackendKind::LocalSnapshot
        }

        async fn current_conditions(&self, query: &Query) -> Result<CurrentConditions, FetchError> {
            self.queries.lock().push(query.to_string());
            self.pause_for(query).await;
            Ok(CurrentConditions {
                temperature: 21.0,
                feels_like: 22.0,
                condition: Some("Sunny".into()),
                location_name: Some(query.to_string()),
                ..CurrentConditions::default()
            })
        }

        async fn forecast(&self, query: &Query, days: u32) -> Result<Vec<ForecastDay>, FetchError> {
            self.pause_for(query).await;
            if let Some(e) = self.forecast_error.lock().clone() {
                return Err(e);
            }
            let mut today = ForecastDay::new("Fri", 15.0, 25.0);
            today.hourly = vec![HourlySample::instantaneous("2025-11-28 09:00", 18.0)];
            let mut days_out = vec![today];
            days_out.extend((1..days).map(|i| ForecastDay::new(format!("D{}", i), 14.0, 24.0)));
            Ok(days_out)
        }
    }

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        calls: Mutex<Vec<(String, Instant)>>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
            self.calls.lock().push((query.to_string(), Instant::now()));
            let place = |label: &str, lat: f64| Place {
                label: label.to_string(),
                name: Some(query.to_string()),
                region: None,
                country: None,
                lat,
                lon: 72.83,
            };
            Ok(vec![
                place(&format!("{}, India", query), 21.17),
                place(&format!("{}, India", query), 21.5),
            ])
        }
    }

    #[derive(Debug)]
    struct FailingLineStore;

    impl LineStore for FailingLineStore {
        fn load(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Format {
                path: "broken".into(),
                message: "unreadable".into(),
            })
        }

        fn save(&self, _lines: &[String]) -> Result<(), StoreError> {
            Err(StoreError::Format {
                path: "broken".into(),
                message: "read-only".into(),
            })
        }
    }

    #[derive(Debug, Default)]
    struct Recorded {
        rendered: Vec<String>,
        errors: Vec<String>,
        suggestions: Vec<Vec<String>>,
        cleared: usize,
        busy: Vec<bool>,
        favorites: Vec<Vec<String>>,
    }

    struct RecordingView(Arc<Mutex<Recorded>>);

    impl DashboardView for RecordingView {
        fn render(&mut self, view_model: &ViewModel) {
            self.0.lock().rendered.push(view_model.query.clone());
        }

        fn show_error(&mut self, message: &str) {
            self.0.lock().errors.push(message.to_string());
        }

        fn show_suggestions(&mut self, labels: &[String]) {
            self.0.lock().suggestions.push(labels.to_vec());
        }

        fn clear_suggestions(&mut self) {
            self.0.lock().cleared += 1;
        }

        fn set_busy(&mut self, busy: bool) {
            self.0.lock().busy.push(busy);
        }

        fn show_favorites(&mut self, favorites: &[String]) {
            self.0.lock().favorites.push(favorites.to_vec());
        }
    }

    // ---- harness ----

    // Field order matters: the dashboard must drop before the runtime
    struct Harness {
        dashboard: Dashboard,
        view: Arc<Mutex<Recorded>>,
        source: Arc<FakeSource>,
        geocoder: Arc<FakeGeocoder>,
        preferences: Arc<MemoryPreferenceStore>,
        favorites: Arc<MemoryLineStore>,
        _rt: tokio::runtime::Runtime,
    }

    struct Stores {
        preferences: Arc<MemoryPreferenceStore>,
        favorites: Arc<MemoryLineStore>,
        last_query: Arc<dyn LineStore>,
    }

    impl Default for Stores {
        fn default() -> Self {
            Self {
                preferences: Arc::new(MemoryPreferenceStore::new()),
                favorites: Arc::new(MemoryLineStore::new()),
                last_query: Arc::new(MemoryLineStore::new()),
            }
        }
    }

    fn harness_with(stores: Stores) -> Harness {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let source = Arc::new(FakeSource::default());
        let geocoder = Arc::new(FakeGeocoder::default());
        let suggestions = Arc::new(PlaceSuggestionService::new(None, geocoder.clone()));
        let view = Arc::new(Mutex::new(Recorded::default()));

        let mut deps = DashboardDeps::new(
            rt.handle().clone(),
            source.clone(),
            suggestions,
            stores.preferences.clone(),
            stores.favorites.clone(),
            stores.last_query,
        );
        deps.forecast_days = 3;
        deps.debounce_delay = Duration::from_millis(100);

        Harness {
            dashboard: Dashboard::new(deps, Box::new(RecordingView(view.clone()))),
            view,
            source,
            geocoder,
            preferences: stores.preferences,
            favorites: stores.favorites,
            _rt: rt,
        }
    }

    fn harness() -> Harness {
        harness_with(Stores::default())
    }

    /// Pump messages until `done` holds or two seconds pass.
    fn pump_until(dashboard: &mut Dashboard, done: impl Fn(&Dashboard) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if done(dashboard) {
                return true;
            }
            dashboard.process_next(Duration::from_millis(20));
        }
        done(dashboard)
    }

    fn settle(dashboard: &mut Dashboard) {
        assert!(pump_until(dashboard, |d| !d.is_busy()));
    }

    // ---- search ----

    #[test]
    fn test_successful_search_updates_state() {
        let last_query = Arc::new(MemoryLineStore::new());
        let mut h = harness_with(Stores {
            last_query: last_query.clone(),
            ..Stores::default()
        });

        h.dashboard.set_input("  Surat ");
        let seq = h.dashboard.search();
        assert_eq!(seq, Some(1));
        assert!(h.dashboard.is_busy());
        settle(&mut h.dashboard);

        let vm = h.dashboard.view_model().unwrap();
        assert_eq!(vm.query, "Surat");
        assert_eq!(vm.current.location_name.as_deref(), Some("Surat"));
        assert_eq!(vm.forecast.len(), 3);
        assert_eq!(vm.daily_chart.len(), 3);
        assert_eq!(vm.hourly_chart.max.values[9], 19.5);

        assert_eq!(h.source.queries.lock().as_slice(), ["Surat".to_string()]);
        assert_eq!(h.dashboard.recents(), ["Surat".to_string()]);
        assert_eq!(last_query.load_single().unwrap(), "Surat");

        let view = h.view.lock();
        assert_eq!(view.rendered, vec!["Surat"]);
        assert_eq!(view.busy, vec![true, false]);
    }

    #[test]
    fn test_blank_search_is_noop() {
        let mut h = harness();
        assert_eq!(h.dashboard.search_with("   ", None), None);
        assert_eq!(h.dashboard.search(), None);
        assert!(!h.dashboard.is_busy());
        assert!(h.source.queries.lock().is_empty());
        assert!(h.view.lock().busy.is_empty());
    }

    #[test]
    fn test_failed_search_keeps_previous_view_model() {
        let mut h = harness();

        h.dashboard.search_with("London", None);
        settle(&mut h.dashboard);
        let fetched_at = h.dashboard.view_model().unwrap().fetched_at;

        *h.source.forecast_error.lock() = Some(FetchError::Api("API error: boom".into()));
        h.dashboard.search_with("Paris", None);
        settle(&mut h.dashboard);

        let vm = h.dashboard.view_model().unwrap();
        assert_eq!(vm.query, "London");
        assert_eq!(vm.fetched_at, fetched_at);
        assert_eq!(h.dashboard.recents(), ["London".to_string()]);

        let view = h.view.lock();
        assert_eq!(view.errors, vec!["API error: boom"]);
        assert_eq!(view.rendered, vec!["London"]);
    }

    #[test]
    fn test_recents_are_deduplicated_newest_first() {
        let mut h = harness();
        for city in ["A", "B", "A", "C"] {
            h.dashboard.search_with(city, None);
            settle(&mut h.dashboard);
        }
        assert_eq!(h.dashboard.recents(), ["C", "B", "A"].map(String::from));
    }

    #[test]
    fn test_recents_match_restored_last_query_despite_padding() {
        let last_query = Arc::new(MemoryLineStore::new());
        let mut h = harness_with(Stores {
            last_query: last_query.clone(),
            ..Stores::default()
        });

        h.dashboard.search_with("  Surat ", None);
        settle(&mut h.dashboard);
        h.dashboard.search_with("Surat", None);
        settle(&mut h.dashboard);

        assert_eq!(h.dashboard.recents(), ["Surat".to_string()]);
        assert_eq!(last_query.load_single().unwrap(), "Surat");
    }

    #[test]
    fn test_newer_search_supersedes_slower_older_one() {
        let mut h = harness();
        h.source
            .delays
            .lock()
            .insert("Old".into(), Duration::from_millis(300));

        let old = h.dashboard.search_with("Old", None).unwrap();
        let new = h.dashboard.search_with("New", None).unwrap();
        assert!(new > old);

        settle(&mut h.dashboard);

        assert_eq!(h.dashboard.view_model().unwrap().query, "New");
        assert_eq!(h.view.lock().rendered, vec!["New"]);
        assert!(!h.dashboard.recents().contains(&"Old".to_string()));
    }

    #[test]
    fn test_last_query_persistence_failure_is_swallowed() {
        let mut h = harness_with(Stores {
            last_query: Arc::new(FailingLineStore),
            ..Stores::default()
        });

        h.dashboard.search_with("Surat", None);
        settle(&mut h.dashboard);

        assert_eq!(h.dashboard.view_model().unwrap().query, "Surat");
        assert!(h.view.lock().errors.is_empty());
    }

    // ---- suggestions ----

    #[test]
    fn test_burst_of_edits_issues_one_lookup_for_final_text() {
        let mut h = harness();

        for text in ["S", "Su", "Sur", "Sura", "Surat"] {
            h.dashboard.set_input(text);
            std::thread::sleep(Duration::from_millis(20));
        }

        assert!(pump_until(&mut h.dashboard, |d| !d.suggestion_labels().is_empty()));
        // Give a stray timer the chance to fire if cancellation were broken
        std::thread::sleep(Duration::from_millis(250));
        h.dashboard.process_messages();

        let calls = h.geocoder.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Surat");

        assert_eq!(
            h.dashboard.suggestion_labels(),
            vec!["Surat, India", "Surat, India [1]"]
        );
        assert_eq!(
            h.view.lock().suggestions.last().cloned().unwrap_or_default(),
            vec!["Surat, India", "Surat, India [1]"]
        );
    }

    #[test]
    fn test_blank_input_clears_suggestions_without_lookup() {
        let mut h = harness();

        h.dashboard.set_input("Surat");
        h.dashboard.set_input("   ");
        std::thread::sleep(Duration::from_millis(250));
        h.dashboard.process_messages();

        assert!(h.geocoder.calls.lock().is_empty());
        assert!(h.dashboard.suggestion_labels().is_empty());
        assert_eq!(h.view.lock().cleared, 1);
    }

    #[test]
    fn test_picking_suggestion_searches_coordinates() {
        let mut h = harness();

        h.dashboard.set_input("Surat");
        assert!(pump_until(&mut h.dashboard, |d| !d.suggestion_labels().is_empty()));

        assert!(!h.dashboard.pick_suggestion("Nowhere"));
        assert!(h.dashboard.pick_suggestion("Surat, India [1]"));
        assert_eq!(h.dashboard.input(), "Surat, India [1]");
        assert_eq!(h.dashboard.selected_place().map(|p| p.lat), Some(21.5));
        assert!(h.dashboard.suggestion_labels().is_empty());

        settle(&mut h.dashboard);
        assert_eq!(h.source.queries.lock().as_slice(), ["21.5,72.83".to_string()]);
        assert_eq!(h.dashboard.recents(), ["Surat, India [1]".to_string()]);

        // Typing again forgets the picked place
        h.dashboard.set_input("Surat, India [1]x");
        assert!(h.dashboard.selected_place().is_none());
    }

    // ---- refresh ----

    #[test]
    fn test_refresh_tick_searches_current_input() {
        let mut h = harness();

        h.dashboard.tx.send(DashboardMessage::RefreshTick).unwrap();
        h.dashboard.process_messages();
        assert!(!h.dashboard.is_busy());

        h.dashboard.set_input("Oslo");
        h.dashboard.tx.send(DashboardMessage::RefreshTick).unwrap();
        assert!(h.dashboard.process_next(Duration::from_millis(500)));
        settle(&mut h.dashboard);

        assert_eq!(h.dashboard.view_model().unwrap().query, "Oslo");
    }

    #[test]
    fn test_auto_refresh_toggle_is_persisted() {
        let mut h = harness();
        assert!(!h.dashboard.auto_refresh_enabled());

        h.dashboard.set_auto_refresh(true);
        assert!(h.dashboard.is_auto_refreshing());
        assert_eq!(h.preferences.get(PREF_AUTO_REFRESH, ""), "true");

        h.dashboard.set_auto_refresh(false);
        assert!(!h.dashboard.is_auto_refreshing());
        assert_eq!(h.preferences.get(PREF_AUTO_REFRESH, ""), "false");
    }

    #[test]
    fn test_refresh_interval_is_clamped_and_persisted() {
        let mut h = harness();
        assert_eq!(h.dashboard.refresh_interval_secs(), 600);

        h.dashboard.set_auto_refresh(true);
        assert_eq!(h.dashboard.set_refresh_interval(5), 30);
        assert_eq!(h.dashboard.refresh_interval_secs(), 30);
        assert!(h.dashboard.is_auto_refreshing());
        assert_eq!(h.preferences.get(PREF_REFRESH_INTERVAL_SECS, ""), "30");
    }

    // ---- startup and favorites ----

    #[test]
    fn test_restore_seeds_recents_and_resumes() {
        let stores = Stores {
            preferences: Arc::new(MemoryPreferenceStore::with_values([(PREF_AUTO_REFRESH, "true")])),
            favorites: Arc::new(MemoryLineStore::with_lines(["Paris", "Tokyo"])),
            last_query: Arc::new(MemoryLineStore::with_lines(["Lima"])),
        };
        let mut h = harness_with(stores);

        h.dashboard.restore();

        assert_eq!(h.dashboard.favorites(), ["Paris", "Tokyo"].map(String::from));
        assert_eq!(h.dashboard.recents(), ["Lima", "Paris", "Tokyo"].map(String::from));
        assert_eq!(h.dashboard.input(), "Lima");
        assert!(h.dashboard.is_auto_refreshing());

        settle(&mut h.dashboard);
        assert_eq!(h.dashboard.view_model().unwrap().query, "Lima");
        // Already in recents, not duplicated
        assert_eq!(h.dashboard.recents().len(), 3);
    }

    #[test]
    fn test_restore_with_last_query_already_a_favorite() {
        let mut h = harness_with(Stores {
            favorites: Arc::new(MemoryLineStore::with_lines(["Paris", "Lima"])),
            last_query: Arc::new(MemoryLineStore::with_lines(["Lima"])),
            ..Stores::default()
        });

        h.dashboard.restore();
        assert_eq!(h.dashboard.recents(), ["Paris", "Lima"].map(String::from));
        assert!(!h.dashboard.is_auto_refreshing());
    }

    #[test]
    fn test_restore_with_nothing_saved_does_not_search() {
        let mut h = harness_with(Stores {
            favorites: Arc::new(MemoryLineStore::new()),
            last_query: Arc::new(FailingLineStore),
            ..Stores::default()
        });

        h.dashboard.restore();
        assert!(h.dashboard.recents().is_empty());
        assert!(!h.dashboard.is_busy());
    }

    #[test]
    fn test_favorites_add_and_remove() {
        let mut h = harness();

        h.dashboard.set_input("  Surat ");
        assert!(h.dashboard.add_favorite());
        assert!(!h.dashboard.add_favorite());
        h.dashboard.set_input("Delhi");
        assert!(h.dashboard.add_favorite());
        assert_eq!(h.favorites.load().unwrap(), vec!["Surat", "Delhi"]);

        assert!(h.dashboard.remove_favorite("Surat"));
        assert!(!h.dashboard.remove_favorite("Surat"));
        assert_eq!(h.favorites.load().unwrap(), vec!["Delhi"]);
        assert_eq!(h.view.lock().favorites.last().cloned(), Some(vec!["Delhi".to_string()]));

        h.dashboard.set_input(" ");
        assert!(!h.dashboard.add_favorite());
    }

    #[test]
    fn test_favorite_persistence_failure_is_swallowed() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let deps = DashboardDeps::new(
            rt.handle().clone(),
            Arc::new(FakeSource::default()),
            Arc::new(PlaceSuggestionService::new(None, Arc::new(FakeGeocoder::default()))),
            Arc::new(MemoryPreferenceStore::new()),
            Arc::new(FailingLineStore),
            Arc::new(MemoryLineStore::new()),
        );
        let mut dashboard = Dashboard::new(deps, Box::new(crate::view::LogView));

        dashboard.restore();
        dashboard.set_input("Surat");
        assert!(dashboard.add_favorite());
        assert_eq!(dashboard.favorites(), ["Surat".to_string()]);
        dashboard.shutdown();
    }

    #[test]
    fn test_shutdown_stops_scheduler_and_pending_lookup() {
        let mut h = harness();
        h.dashboard.set_auto_refresh(true);
        h.dashboard.set_input("Surat");

        h.dashboard.shutdown();
        std::thread::sleep(Duration::from_millis(250));
        h.dashboard.process_messages();

        assert!(!h.dashboard.is_auto_refreshing());
        assert!(h.geocoder.calls.lock().is_empty());
        // Shutdown does not clear the persisted preference
        assert_eq!(h.preferences.get(PREF_AUTO_REFRESH, ""), "true");
    }
}
