//! In-memory daemon used by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use plenum_proto::protocol::{Ack, PlaybackStatus, TrackInfo};
use plenum_proto::transport::{Transport, TransportError};

use crate::connection::Endpoint;

static NEXT_HANDLE_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Io,
    Ack,
}

impl Failure {
    fn error(self) -> TransportError {
        match self {
            Failure::Io => TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
            Failure::Ack => TransportError::Command(Ack {
                code: 5,
                index: 0,
                command: "status".into(),
                message: "scripted failure".into(),
            }),
        }
    }
}

/// Behaviour and bookkeeping shared by every handle cut from the same script.
#[derive(Debug, Default)]
pub struct Script {
    pub track: TrackInfo,
    pub status: PlaybackStatus,
    /// The next N `connect` calls fail.
    pub connect_failures: usize,
    pub panic_on_connect: bool,
    pub reject_password: bool,
    pub close_fails: bool,
    pub teardown_fails: bool,
    /// Popped once per `currentsong`; `None` means it succeeds.
    pub fetch_failures: VecDeque<Failure>,
    /// Same for `status`, which only runs after `currentsong` succeeded.
    pub status_failures: VecDeque<Failure>,

    pub connects: usize,
    pub passwords: Vec<String>,
    pub teardowns: usize,
    pub fetches: usize,
    pub status_fetches: usize,
}

pub struct ScriptedTransport {
    id: usize,
    connected: bool,
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::with_script(Arc::new(Mutex::new(Script::default())))
    }

    pub fn with_script(script: Arc<Mutex<Script>>) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            connected: false,
            script,
        }
    }

    pub fn script(&self) -> Arc<Mutex<Script>> {
        Arc::clone(&self.script)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn require_connected(&self) -> Result<(), TransportError> {
        if self.connected {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

impl Transport for ScriptedTransport {
    async fn connect(&mut self, _host: &str, _port: u16) -> Result<(), TransportError> {
        let panic_now = {
            let mut script = self.script.lock().unwrap();
            script.connects += 1;
            if script.connect_failures > 0 {
                script.connect_failures -= 1;
                return Err(Failure::Io.error());
            }
            script.panic_on_connect
        };
        if panic_now {
            panic!("scripted panic during connect");
        }
        self.connected = true;
        Ok(())
    }

    async fn authenticate(&mut self, password: &str) -> Result<(), TransportError> {
        self.require_connected()?;
        let mut script = self.script.lock().unwrap();
        script.passwords.push(password.to_string());
        if script.reject_password {
            return Err(TransportError::Command(Ack {
                code: 3,
                index: 0,
                command: "password".into(),
                message: "incorrect password".into(),
            }));
        }
        Ok(())
    }

    async fn current_track(&mut self) -> Result<TrackInfo, TransportError> {
        self.require_connected()?;
        let mut script = self.script.lock().unwrap();
        script.fetches += 1;
        if let Some(failure) = script.fetch_failures.pop_front() {
            drop(script);
            self.connected = false;
            return Err(failure.error());
        }
        Ok(script.track.clone())
    }

    async fn status(&mut self) -> Result<PlaybackStatus, TransportError> {
        self.require_connected()?;
        let mut script = self.script.lock().unwrap();
        script.status_fetches += 1;
        if let Some(failure) = script.status_failures.pop_front() {
            drop(script);
            self.connected = false;
            return Err(failure.error());
        }
        Ok(script.status.clone())
    }

    async fn list_all(&mut self) -> Result<Vec<TrackInfo>, TransportError> {
        self.require_connected()?;
        Ok(vec![self.script.lock().unwrap().track.clone()])
    }

    async fn close_notify(&mut self) -> Result<(), TransportError> {
        if self.script.lock().unwrap().close_fails {
            return Err(Failure::Io.error());
        }
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), TransportError> {
        let mut script = self.script.lock().unwrap();
        script.teardowns += 1;
        if script.teardown_fails {
            return Err(Failure::Io.error());
        }
        self.connected = false;
        Ok(())
    }

    fn fresh(&self) -> Self {
        Self::with_script(self.script())
    }
}

pub fn endpoint() -> Endpoint {
    Endpoint {
        host: "guanaco".into(),
        port: 6600,
        password: None,
    }
}
