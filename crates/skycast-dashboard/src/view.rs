//! Presentation shell interface.
//!
//! The dashboard calls these from the interactive thread only.

use crate::view_model::ViewModel;

pub trait DashboardView {
    /// Replace everything on screen with a newly fetched view model.
    fn render(&mut self, view_model: &ViewModel);

    /// A search failed; whatever was rendered before stays on screen.
    fn show_error(&mut self, message: &str);

    fn show_suggestions(&mut self, labels: &[String]);

    fn clear_suggestions(&mut self);

    fn set_busy(&mut self, busy: bool);

    fn show_recents(&mut self, _recents: &[String]) {}

    fn show_favorites(&mut self, _favorites: &[String]) {}
}

/// Writes every update to the log. Used when no shell is attached.
#[derive(Debug, Default)]
pub struct LogView;

impl DashboardView for LogView {
    fn render(&mut self, view_model: &ViewModel) {
        tracing::info!(
            "{}: {:.1}°C, {} ({} forecast days)",
            view_model.query,
            view_model.current.temperature,
            view_model.summary,
            view_model.forecast.len()
        );
    }

    fn show_error(&mut self, message: &str) {
        tracing::warn!("Search failed: {}", message);
    }

    fn show_suggestions(&mut self, labels: &[String]) {
        tracing::debug!("{} suggestions", labels.len());
    }

    fn clear_suggestions(&mut self) {}

    fn set_busy(&mut self, busy: bool) {
        tracing::trace!("busy = {}", busy);
    }
}
