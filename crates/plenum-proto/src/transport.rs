//! The request/response seam between the tools and the daemon.

use thiserror::Error;

use crate::protocol::{Ack, PlaybackStatus, TrackInfo};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no reply within {0:?}")]
    Timeout(std::time::Duration),
    #[error("connection closed by daemon")]
    Closed,
    #[error("not connected")]
    NotConnected,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("command failed: {0}")]
    Command(Ack),
}

impl TransportError {
    /// The daemon answered but refused the command.
    pub fn is_command(&self) -> bool {
        matches!(self, TransportError::Command(_))
    }

    /// The link itself failed; the handle should not be trusted any more.
    pub fn is_transport(&self) -> bool {
        !self.is_command()
    }
}

/// A handle to one daemon connection.
///
/// Handles start out unconnected. Every operation other than `connect`
/// fails with [`TransportError::NotConnected`] until `connect` succeeds.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError>;

    async fn authenticate(&mut self, password: &str) -> Result<(), TransportError>;

    async fn current_track(&mut self) -> Result<TrackInfo, TransportError>;

    async fn status(&mut self) -> Result<PlaybackStatus, TransportError>;

    /// Every song in the daemon's database.
    async fn list_all(&mut self) -> Result<Vec<TrackInfo>, TransportError>;

    /// Politely tell the daemon we are leaving.
    async fn close_notify(&mut self) -> Result<(), TransportError>;

    /// Drop the underlying link.
    async fn teardown(&mut self) -> Result<(), TransportError>;

    /// A new, unconnected handle of the same kind.
    fn fresh(&self) -> Self
    where
        Self: Sized;
}
