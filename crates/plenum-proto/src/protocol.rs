//! MPD data model and the pieces of the line protocol the tools speak.
//!
//! A reply to any command is a run of `key: value` lines closed by either
//! `OK` or `ACK [code@index] {command} message`. Tags may repeat within one
//! record (a track with two artists yields two `Artist:` lines); those are
//! collected into a [`TagValue::Multi`] and flattened with [`TAG_SEPARATOR`]
//! before anything downstream sees them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Joins the values of a multi-valued tag into one display string.
pub const TAG_SEPARATOR: &str = " - ";

/// First line the daemon sends on a fresh connection, e.g. `OK MPD 0.23.5`.
pub const GREETING_PREFIX: &str = "OK MPD ";

/// A tag as reported by the daemon: either a single value or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Scalar(String),
    Multi(Vec<String>),
}

impl TagValue {
    /// Add another occurrence of the same tag.
    pub fn push(self, value: String) -> Self {
        match self {
            TagValue::Scalar(first) => TagValue::Multi(vec![first, value]),
            TagValue::Multi(mut values) => {
                values.push(value);
                TagValue::Multi(values)
            }
        }
    }

    pub fn flatten(&self) -> String {
        match self {
            TagValue::Scalar(value) => value.clone(),
            TagValue::Multi(values) => values.join(TAG_SEPARATOR),
        }
    }
}

/// Tags of one record keyed by lower-cased tag name.
pub type Tags = HashMap<String, TagValue>;

pub fn collect_tags(pairs: &[(String, String)]) -> Tags {
    let mut tags = Tags::new();
    for (key, value) in pairs {
        let key = key.to_ascii_lowercase();
        let merged = match tags.remove(&key) {
            Some(existing) => existing.push(value.clone()),
            None => TagValue::Scalar(value.clone()),
        };
        tags.insert(key, merged);
    }
    tags
}

/// Metadata of the current (or a listed) track, already flattened.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
}

impl TrackInfo {
    pub fn from_tags(tags: &Tags) -> Self {
        let get = |key: &str| tags.get(key).map(TagValue::flatten);
        Self {
            artist: get("artist"),
            album: get("album"),
            title: get("title"),
        }
    }

    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self::from_tags(&collect_tags(pairs))
    }

    /// Present fields in display order: artist, album, title.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        [&self.artist, &self.album, &self.title]
            .into_iter()
            .filter_map(|field| field.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.lines().next().is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Play,
    Pause,
    Stop,
}

impl PlayState {
    /// Short label for the border badge.
    pub fn label(&self) -> &'static str {
        match self {
            PlayState::Play => "PLAY",
            PlayState::Pause => "PAUSE",
            PlayState::Stop => "STOP",
        }
    }
}

impl FromStr for PlayState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(PlayState::Play),
            "pause" => Ok(PlayState::Pause),
            "stop" => Ok(PlayState::Stop),
            other => Err(format!("unknown play state '{}'", other)),
        }
    }
}

/// The subset of `status` the display cares about.
///
/// `time` is MPD's `"<elapsed>:<total>"` field in whole seconds and is absent
/// while nothing is playing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub state: Option<PlayState>,
    pub time: Option<String>,
}

impl PlaybackStatus {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut status = Self::default();
        for (key, value) in pairs {
            match key.to_ascii_lowercase().as_str() {
                "state" => match value.parse() {
                    Ok(state) => status.state = Some(state),
                    Err(e) => warn!("status: {}", e),
                },
                "time" => status.time = Some(value.clone()),
                _ => {}
            }
        }
        status
    }

    /// Elapsed and total seconds, or `None` when absent or malformed.
    pub fn elapsed_total(&self) -> Option<(u64, u64)> {
        let time = self.time.as_deref()?;
        let parsed = time.split_once(':').and_then(|(elapsed, total)| {
            Some((elapsed.trim().parse().ok()?, total.trim().parse().ok()?))
        });
        if parsed.is_none() {
            warn!("status: malformed time field '{}'", time);
        }
        parsed
    }
}

/// An `ACK` reply: the daemon understood the request and refused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub code: u32,
    pub index: u32,
    pub command: String,
    pub message: String,
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}@{}] {{{}}} {}",
            self.code, self.index, self.command, self.message
        )
    }
}

/// One line of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyLine {
    Pair(String, String),
    Ok,
    Ack(Ack),
}

/// Classify a reply line (without its trailing newline).
pub fn parse_reply_line(line: &str) -> Option<ReplyLine> {
    if line == "OK" {
        return Some(ReplyLine::Ok);
    }
    if let Some(rest) = line.strip_prefix("ACK ") {
        return parse_ack(rest).map(ReplyLine::Ack);
    }
    let (key, value) = line.split_once(": ")?;
    if key.is_empty() {
        return None;
    }
    Some(ReplyLine::Pair(key.to_string(), value.to_string()))
}

// `[50@0] {play} song doesn't exist: "10"`
fn parse_ack(rest: &str) -> Option<Ack> {
    let rest = rest.strip_prefix('[')?;
    let (position, rest) = rest.split_once(']')?;
    let (code, index) = position.split_once('@')?;
    let rest = rest.trim_start().strip_prefix('{')?;
    let (command, message) = rest.split_once('}')?;
    Some(Ack {
        code: code.parse().ok()?,
        index: index.parse().ok()?,
        command: command.to_string(),
        message: message.trim().to_string(),
    })
}

/// Protocol version from the greeting, e.g. `0.23.5`.
pub fn parse_greeting(line: &str) -> Option<&str> {
    line.strip_prefix(GREETING_PREFIX).map(str::trim)
}

/// Quote a command argument, escaping `"` and `\`.
pub fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Split a `listallinfo` reply into per-song records.
///
/// A record starts at each `file:` key. `directory:` and `playlist:` entries
/// start records too but are dropped.
pub fn split_song_records(pairs: Vec<(String, String)>) -> Vec<Vec<(String, String)>> {
    let mut records = Vec::new();
    let mut current: Option<Vec<(String, String)>> = None;
    for (key, value) in pairs {
        match key.as_str() {
            "file" => {
                records.extend(current.take());
                current = Some(vec![(key, value)]);
            }
            "directory" | "playlist" => {
                records.extend(current.take());
            }
            _ => {
                if let Some(record) = current.as_mut() {
                    record.push((key, value));
                }
            }
        }
    }
    records.extend(current);
    records
}
