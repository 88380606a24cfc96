//! Periodic auto-refresh.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use skycast_core::{PreferenceStore, PREF_REFRESH_INTERVAL_SECS};

use crate::messages::DashboardMessage;

pub const DEFAULT_REFRESH_SECS: u64 = 600;
pub const MIN_REFRESH_SECS: u64 = 30;
pub const MAX_REFRESH_SECS: u64 = 3600;

pub fn clamp_interval_secs(secs: u64) -> u64 {
    secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
}

/// Sends a `RefreshTick` every interval while running.
///
/// Ticks do not wait for the search started by the previous tick.
#[derive(Debug)]
pub struct RefreshScheduler {
    runtime: Handle,
    tx: Sender<DashboardMessage>,
    preferences: Arc<dyn PreferenceStore>,
    interval: Duration,
    timer: Option<CancellationToken>,
}

impl RefreshScheduler {
    /// Interval comes from the preference store, clamped; unparsable values use the default.
    pub fn new(
        runtime: Handle,
        tx: Sender<DashboardMessage>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let stored = preferences.get(
            PREF_REFRESH_INTERVAL_SECS,
            &DEFAULT_REFRESH_SECS.to_string(),
        );
        let secs = match stored.trim().parse::<u64>() {
            Ok(secs) => clamp_interval_secs(secs),
            Err(_) => {
                tracing::warn!("Ignoring invalid refresh interval {:?}", stored);
                DEFAULT_REFRESH_SECS
            }
        };

        Self {
            runtime,
            tx,
            preferences,
            interval: Duration::from_secs(secs),
            timer: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval.as_secs()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Cancel any running timer and arm a new one.
    pub fn start(&mut self) {
        self.stop();

        let token = CancellationToken::new();
        self.timer = Some(token.clone());
        let interval = self.interval;
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        if tx.send(DashboardMessage::RefreshTick).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        tracing::info!("Auto-refresh every {:?}", interval);
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
            tracing::info!("Auto-refresh stopped");
        }
    }

    /// Clamp, persist, and re-arm if running. Returns the interval actually applied.
    pub fn set_interval_secs(&mut self, secs: u64) -> u64 {
        let clamped = clamp_interval_secs(secs);
        if clamped != secs {
            tracing::debug!("Refresh interval {}s clamped to {}s", secs, clamped);
        }
        self.interval = Duration::from_secs(clamped);

        if let Err(e) = self
            .preferences
            .put(PREF_REFRESH_INTERVAL_SECS, &clamped.to_string())
        {
            tracing::warn!("Failed to persist refresh interval: {}", e);
        }

        if self.is_running() {
            self.start();
        }
        clamped
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}
