//! SkyCast dashboard core
//!
//! Resolves searches into concurrent backend fetches, debounces place
//! suggestions, runs the auto-refresh scheduler, and hands finished view
//! models to a presentation shell. All shared state is owned by
//! [`Dashboard`] on the interactive thread; background work reports back
//! through [`DashboardMessage`].

pub mod app;
pub mod messages;
pub mod orchestrator;
pub mod scheduler;
pub mod suggestions;
pub mod view;
pub mod view_model;

pub use app::{resolve_api_key, App, API_KEY_ENV};
pub use messages::DashboardMessage;
pub use orchestrator::{Dashboard, DashboardDeps};
pub use scheduler::{
    clamp_interval_secs, RefreshScheduler, DEFAULT_REFRESH_SECS, MAX_REFRESH_SECS,
    MIN_REFRESH_SECS,
};
pub use suggestions::{Debouncer, SuggestionList, DEBOUNCE_DELAY};
pub use view::{DashboardView, LogView};
pub use view_model::ViewModel;
