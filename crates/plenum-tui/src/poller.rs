//! Poller: one session's fetch → diff → render loop.
//!
//! Each cycle walks a small state machine:
//!
//! ```text
//!   Fetch ──ok──────────────────────────────▶ Diff ──▶ Render ──▶ Commit
//!     │                                         ▲
//!     └─err─▶ Reconnect ──ok──▶ Retry ──ok──────┘
//!                │                 │
//!                └─err─▶ fatal     └─err─▶ fatal
//! ```
//!
//! A cycle gets at most one reconnect; anything that survives it ends the
//! session.

use std::time::Duration;

use ratatui::backend::Backend;
use tracing::{debug, error, warn};

use plenum_proto::protocol::{PlaybackStatus, TrackInfo};
use plenum_proto::transport::Transport;

use crate::connection::Connection;
use crate::differ::SnapshotDiffer;
use crate::error::PollError;
use crate::render::Renderer;

#[derive(Clone, Copy)]
enum Attempt {
    First,
    AfterReconnect,
}

pub struct Poller<T, B: Backend> {
    connection: Connection<T>,
    differ: SnapshotDiffer,
    renderer: Renderer<B>,
    interval: Duration,
}

impl<T: Transport, B: Backend> Poller<T, B> {
    pub fn new(connection: Connection<T>, renderer: Renderer<B>, interval: Duration) -> Self {
        Self {
            connection,
            differ: SnapshotDiffer::new(),
            renderer,
            interval,
        }
    }

    /// Poll until something fatal happens. The connection is shut down
    /// before the error is handed back.
    pub async fn run(mut self) -> PollError {
        loop {
            if let Err(e) = self.cycle().await {
                error!("poller: {} (connection {:?})", e, self.connection.state());
                self.connection.disconnect().await;
                return e;
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    pub async fn cycle(&mut self) -> Result<(), PollError> {
        let (track, status) = self.fetch_with_retry().await?;

        let changes = self.differ.diff(&track, &status);
        if changes.is_empty() {
            return Ok(());
        }
        debug!(
            "poller: track changed={} status changed={}",
            changes.track.is_some(),
            changes.status.is_some()
        );
        self.renderer.render(&changes).map_err(PollError::Render)?;
        self.differ.commit(changes);
        Ok(())
    }

    async fn fetch_with_retry(&mut self) -> Result<(TrackInfo, PlaybackStatus), PollError> {
        let mut attempt = Attempt::First;
        loop {
            match (self.connection.fetch().await, attempt) {
                (Ok(fetched), _) => return Ok(fetched),
                (Err(e), Attempt::First) => {
                    warn!("poller: {}, reconnecting", e);
                    self.connection.reconnect().await?;
                    attempt = Attempt::AfterReconnect;
                }
                (Err(e), Attempt::AfterReconnect) => return Err(PollError::Retry(e)),
            }
        }
    }

    #[cfg(test)]
    pub fn differ(&self) -> &SnapshotDiffer {
        &self.differ
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &Renderer<B> {
        &self.renderer
    }

    #[cfg(test)]
    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }
}
