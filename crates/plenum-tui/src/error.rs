//! Failure taxonomy of a monitoring session.
//!
//! Everything except [`FetchError`] is fatal: it ends the session and the
//! supervisor starts a fresh one after its cooldown. A `FetchError` buys one
//! reconnect-and-retry inside the current poll cycle.

use plenum_proto::transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not connect to '{host}': {source}")]
    Transport {
        host: String,
        #[source]
        source: TransportError,
    },
    #[error("could not connect to '{host}': password command failed: {source}")]
    Auth {
        host: String,
        #[source]
        source: TransportError,
    },
}

/// Fetching the current track or status failed.
#[derive(Debug, Error)]
#[error("fetch failed: {0}")]
pub struct FetchError(#[from] pub TransportError);

#[derive(Debug, Error)]
pub enum PollError {
    #[error("reconnecting failed: {0}")]
    Reconnect(#[source] ConnectError),
    #[error("couldn't retrieve state after reconnect: {0}")]
    Retry(#[source] FetchError),
    #[error("display update failed: {0}")]
    Render(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error("could not set up display: {0}")]
    Display(#[source] std::io::Error),
    #[error("session panicked: {0}")]
    Panicked(String),
}

impl SessionError {
    /// Part of the poller's own taxonomy, as opposed to something unforeseen.
    pub fn is_poller_error(&self) -> bool {
        matches!(self, SessionError::Connect(_) | SessionError::Poll(_))
    }
}
