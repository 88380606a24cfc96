//! Weather and geocoding error types.

use thiserror::Error;

/// Failure of a weather backend call.
///
/// The display string is the human-readable message shown to the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Timeout, refused connection, cancelled request, unreadable snapshot
    #[error("{0}")]
    Network(String),

    /// Non-success status or structured error payload
    #[error("{0}")]
    Api(String),

    /// Body did not have the expected shape
    #[error("{0}")]
    Parse(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(context: &str, err: &reqwest::Error) -> Self {
        tracing::debug!("{}: {}", context, err);
        if err.is_timeout() {
            FetchError::Network(format!("{} (timed out)", context))
        } else {
            FetchError::Network(context.to_string())
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Unable to reach the weather service. Check your connection.",
            FetchError::Api(_) => "The weather service rejected the request.",
            FetchError::Parse(_) => "Received an unexpected response from the weather service.",
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

/// Failure of a geocoder call.
///
/// Only `Transport` is ever surfaced by the suggestion service; `Response`
/// failures degrade to an empty suggestion list.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeocodeError {
    #[error("Geocoder unreachable: {0}")]
    Transport(String),

    #[error("Unusable geocoder response: {0}")]
    Response(String),
}

impl GeocodeError {
    pub fn is_transport(&self) -> bool {
        matches!(self, GeocodeError::Transport(_))
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodeError::Transport(_) => "Place suggestions are unavailable right now.",
            GeocodeError::Response(_) => "No places found.",
        }
    }
}
