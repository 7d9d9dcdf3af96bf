//! Connection: owns the daemon handle for one session.
//!
//! Lifecycle:
//!
//! ```text
//!   Disconnected ──connect()──▶ Connected
//!        ▲                          │
//!        └──── disconnect() / any transport failure
//! ```
//!
//! `connect` either succeeds or returns a fatal [`ConnectError`]; there is no
//! observable in-between state. `disconnect` never fails: if the handle
//! cannot be torn down cleanly it is thrown away and replaced with a fresh
//! one, so the next `connect` never reuses a possibly broken handle.

use plenum_proto::protocol::{PlaybackStatus, TrackInfo};
use plenum_proto::transport::Transport;
use tracing::{debug, info, warn};

use crate::error::{ConnectError, FetchError, PollError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Daemon address and credential, read once per session.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

pub struct Connection<T> {
    transport: T,
    endpoint: Endpoint,
    state: ConnectionState,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T, endpoint: Endpoint) -> Self {
        Self {
            transport,
            endpoint,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn connect(&mut self) -> Result<(), ConnectError> {
        let host = self.endpoint.host.clone();
        info!("connection: connecting to {}:{}", host, self.endpoint.port);

        if let Err(source) = self.transport.connect(&host, self.endpoint.port).await {
            self.state = ConnectionState::Disconnected;
            return Err(ConnectError::Transport { host, source });
        }

        if let Some(password) = self.endpoint.password.as_deref() {
            if let Err(source) = self.transport.authenticate(password).await {
                self.state = ConnectionState::Disconnected;
                return Err(ConnectError::Auth { host, source });
            }
        }

        self.state = ConnectionState::Connected;
        info!("connection: connected");
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;

        if let Err(e) = self.transport.close_notify().await {
            debug!("connection: close notification failed: {}", e);
        }
        if let Err(e) = self.transport.teardown().await {
            warn!("connection: teardown failed ({}), replacing handle", e);
            self.transport = self.transport.fresh();
        }
    }

    pub async fn reconnect(&mut self) -> Result<(), PollError> {
        info!("connection: reconnecting");
        self.disconnect().await;
        self.connect().await.map_err(PollError::Reconnect)
    }

    /// Fetch the current track and playback status.
    ///
    /// Any failure marks the connection `Disconnected` before returning.
    pub async fn fetch(&mut self) -> Result<(TrackInfo, PlaybackStatus), FetchError> {
        let fetched = async {
            let track = self.transport.current_track().await?;
            let status = self.transport.status().await?;
            Ok::<_, FetchError>((track, status))
        }
        .await;

        if fetched.is_err() {
            self.state = ConnectionState::Disconnected;
        }
        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{endpoint, Failure, ScriptedTransport};

    #[tokio::test]
    async fn test_connect_and_authenticate() {
        let transport = ScriptedTransport::new();
        let script = transport.script();
        let mut conn = Connection::new(
            transport,
            Endpoint {
                password: Some("secret".into()),
                ..endpoint()
            },
        );

        conn.connect().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(script.lock().unwrap().passwords, vec!["secret".to_string()]);
    }

    #[tokio::test]
    async fn test_connect_failure_is_connect_error() {
        let transport = ScriptedTransport::new();
        transport.script().lock().unwrap().connect_failures = 1;
        let mut conn = Connection::new(transport, endpoint());

        let err = conn.connect().await.unwrap_err();
        assert!(matches!(err, ConnectError::Transport { .. }));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_rejected_password_is_auth_error() {
        let transport = ScriptedTransport::new();
        transport.script().lock().unwrap().reject_password = true;
        let mut conn = Connection::new(
            transport,
            Endpoint {
                password: Some("wrong".into()),
                ..endpoint()
            },
        );

        let err = conn.connect().await.unwrap_err();
        assert!(matches!(err, ConnectError::Auth { .. }));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_no_password_skips_authentication() {
        let transport = ScriptedTransport::new();
        let script = transport.script();
        let mut conn = Connection::new(transport, endpoint());

        conn.connect().await.unwrap();
        assert!(script.lock().unwrap().passwords.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_replaces_handle_when_teardown_fails() {
        let transport = ScriptedTransport::new();
        let script = transport.script();
        {
            let mut s = script.lock().unwrap();
            s.close_fails = true;
            s.teardown_fails = true;
        }
        let mut conn = Connection::new(transport, endpoint());
        conn.connect().await.unwrap();
        let before = conn.transport().id();

        conn.disconnect().await;

        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_ne!(conn.transport().id(), before);
        assert!(!conn.transport().is_connected());
        // Teardown was attempted exactly once, not retried.
        assert_eq!(script.lock().unwrap().teardowns, 1);
    }

    #[tokio::test]
    async fn test_disconnect_keeps_handle_when_teardown_succeeds() {
        let transport = ScriptedTransport::new();
        let mut conn = Connection::new(transport, endpoint());
        conn.connect().await.unwrap();
        let before = conn.transport().id();

        conn.disconnect().await;

        assert_eq!(conn.transport().id(), before);
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_disconnected() {
        let transport = ScriptedTransport::new();
        transport
            .script()
            .lock()
            .unwrap()
            .fetch_failures
            .push_back(Failure::Io);
        let mut conn = Connection::new(transport, endpoint());
        conn.connect().await.unwrap();

        assert!(conn.fetch().await.is_err());
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_reconnect_failure_is_wrapped() {
        let transport = ScriptedTransport::new();
        let script = transport.script();
        let mut conn = Connection::new(transport, endpoint());
        conn.connect().await.unwrap();
        script.lock().unwrap().connect_failures = 1;

        let err = conn.reconnect().await.unwrap_err();
        assert!(matches!(err, PollError::Reconnect(ConnectError::Transport { .. })));
        assert!(err.to_string().starts_with("reconnecting failed"));
    }
}
