//! Shared pieces of the plenum tools: configuration, platform paths, the MPD
//! data model and wire codec, and the transport used to talk to the daemon.

pub mod client;
pub mod config;
pub mod platform;
pub mod protocol;
pub mod transport;
