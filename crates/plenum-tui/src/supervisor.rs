//! Supervisor: restarts the whole session whenever it dies.
//!
//! A session is: open a display surface, build a connection around a new
//! transport handle, connect, poll until fatal. Nothing survives from one
//! session to the next; the surface and the handle are dropped (and the
//! terminal restored) before the error is reported and the cooldown starts.

use std::any::Any;
use std::io::{self, Stdout};
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{error, info};

use plenum_proto::client::MpdClient;
use plenum_proto::transport::Transport;

use crate::connection::{Connection, Endpoint};
use crate::error::SessionError;
use crate::poller::Poller;
use crate::render::Renderer;
use crate::surface::DisplaySurface;

/// Hands out the per-session resources.
pub trait SessionFactory {
    type Transport: Transport;
    type Backend: Backend;

    fn open_surface(&mut self) -> io::Result<DisplaySurface<Self::Backend>>;

    fn new_transport(&mut self) -> Self::Transport;
}

/// The real thing: the controlling terminal and a TCP connection to MPD.
pub struct TerminalSessions {
    pub io_timeout: Duration,
}

impl SessionFactory for TerminalSessions {
    type Transport = MpdClient;
    type Backend = CrosstermBackend<Stdout>;

    fn open_surface(&mut self) -> io::Result<DisplaySurface<Self::Backend>> {
        DisplaySurface::open()
    }

    fn new_transport(&mut self) -> MpdClient {
        MpdClient::new(self.io_timeout)
    }
}

pub struct Supervisor<F> {
    factory: F,
    endpoint: Endpoint,
    interval: Duration,
    cooldown: Duration,
    sessions: u64,
}

impl<F: SessionFactory> Supervisor<F> {
    pub fn new(factory: F, endpoint: Endpoint, interval: Duration, cooldown: Duration) -> Self {
        Self {
            factory,
            endpoint,
            interval,
            cooldown,
            sessions: 0,
        }
    }

    /// Run sessions forever.
    pub async fn run(mut self) {
        loop {
            let err = self.run_once().await;
            report(&err);
            tokio::time::sleep(self.cooldown).await;
        }
    }

    /// Run one session to its end and return why it ended.
    pub async fn run_once(&mut self) -> SessionError {
        self.sessions += 1;
        info!("supervisor: starting session {}", self.sessions);
        match AssertUnwindSafe(self.session()).catch_unwind().await {
            Ok(err) => err,
            Err(payload) => SessionError::Panicked(panic_message(payload.as_ref())),
        }
    }

    async fn session(&mut self) -> SessionError {
        let surface = match self.factory.open_surface() {
            Ok(surface) => surface,
            Err(e) => return SessionError::Display(e),
        };
        let renderer = match Renderer::new(surface) {
            Ok(renderer) => renderer,
            Err(e) => return SessionError::Display(e),
        };

        let mut connection = Connection::new(self.factory.new_transport(), self.endpoint.clone());
        if let Err(e) = connection.connect().await {
            return e.into();
        }

        Poller::new(connection, renderer, self.interval)
            .run()
            .await
            .into()
    }

    #[cfg(test)]
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

/// Send a session's cause of death to the log and to stderr.
fn report(err: &SessionError) {
    if err.is_poller_error() {
        error!("supervisor: fatal poller error: {}", err);
        eprintln!("Fatal poller error: {}", err);
    } else {
        error!("supervisor: unexpected error: {}", err);
        eprintln!("Unexpected error: {}", err);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
