//! `MpdClient`: the TCP [`Transport`] speaking MPD's text protocol.
//!
//! One request is in flight at a time: write the command line, then read
//! `key: value` lines until `OK` or `ACK`. Each round trip is bounded by
//! `timeout` so a wedged daemon surfaces as [`TransportError::Timeout`]
//! instead of hanging the caller.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, trace};

use crate::protocol::{
    parse_greeting, parse_reply_line, quote, split_song_records, PlaybackStatus, ReplyLine,
    TrackInfo,
};
use crate::transport::{Transport, TransportError};

pub struct MpdClient {
    stream: Option<BufReader<TcpStream>>,
    timeout: Duration,
    version: Option<String>,
}

impl MpdClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            stream: None,
            timeout,
            version: None,
        }
    }

    /// Protocol version announced by the daemon on connect.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn command(&mut self, line: &str) -> Result<Vec<(String, String)>, TransportError> {
        let timeout = self.timeout;
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        trace!("mpd: > {}", redact(line));
        tokio::time::timeout(timeout, round_trip(stream, line))
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
    }
}

async fn round_trip(
    stream: &mut BufReader<TcpStream>,
    line: &str,
) -> Result<Vec<(String, String)>, TransportError> {
    let mut request = String::with_capacity(line.len() + 1);
    request.push_str(line);
    request.push('\n');
    stream.get_mut().write_all(request.as_bytes()).await?;

    let mut pairs = Vec::new();
    loop {
        let reply = read_line(stream).await?;
        match parse_reply_line(&reply) {
            Some(ReplyLine::Pair(key, value)) => pairs.push((key, value)),
            Some(ReplyLine::Ok) => return Ok(pairs),
            Some(ReplyLine::Ack(ack)) => return Err(TransportError::Command(ack)),
            None => {
                return Err(TransportError::Protocol(format!(
                    "unexpected reply line '{}'",
                    reply
                )))
            }
        }
    }
}

async fn read_line(stream: &mut BufReader<TcpStream>) -> Result<String, TransportError> {
    let mut line = String::new();
    if stream.read_line(&mut line).await? == 0 {
        return Err(TransportError::Closed);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

// Keep credentials out of trace logs.
fn redact(line: &str) -> &str {
    if line.starts_with("password ") {
        "password ***"
    } else {
        line
    }
}

impl Transport for MpdClient {
    async fn connect(&mut self, host: &str, port: u16) -> Result<(), TransportError> {
        let timeout = self.timeout;
        let handshake = async {
            let stream = TcpStream::connect((host, port)).await?;
            let mut stream = BufReader::new(stream);
            let greeting = read_line(&mut stream).await?;
            let version = parse_greeting(&greeting)
                .ok_or_else(|| {
                    TransportError::Protocol(format!("unexpected greeting '{}'", greeting))
                })?
                .to_string();
            Ok::<_, TransportError>((stream, version))
        };
        let (stream, version) = tokio::time::timeout(timeout, handshake)
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;

        info!("mpd: connected to {}:{} (protocol {})", host, port, version);
        self.stream = Some(stream);
        self.version = Some(version);
        Ok(())
    }

    async fn authenticate(&mut self, password: &str) -> Result<(), TransportError> {
        self.command(&format!("password {}", quote(password)))
            .await
            .map(|_| ())
    }

    async fn current_track(&mut self) -> Result<TrackInfo, TransportError> {
        let pairs = self.command("currentsong").await?;
        Ok(TrackInfo::from_pairs(&pairs))
    }

    async fn status(&mut self) -> Result<PlaybackStatus, TransportError> {
        let pairs = self.command("status").await?;
        Ok(PlaybackStatus::from_pairs(&pairs))
    }

    async fn list_all(&mut self) -> Result<Vec<TrackInfo>, TransportError> {
        let pairs = self.command("listallinfo").await?;
        let records = split_song_records(pairs);
        debug!("mpd: listallinfo returned {} songs", records.len());
        Ok(records
            .iter()
            .map(|record| TrackInfo::from_pairs(record))
            .collect())
    }

    async fn close_notify(&mut self) -> Result<(), TransportError> {
        // The daemon hangs up on `close` without replying.
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream.get_mut().write_all(b"close\n").await?;
        stream.get_mut().flush().await?;
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), TransportError> {
        self.version = None;
        match self.stream.take() {
            Some(mut stream) => {
                stream.get_mut().shutdown().await?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn fresh(&self) -> Self {
        Self::new(self.timeout)
    }
}
