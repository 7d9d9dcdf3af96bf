mod connection;
mod differ;
mod error;
mod poller;
mod render;
mod supervisor;
mod surface;
mod theme;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use clap::Parser;

use plenum_proto::config::Config;
use plenum_proto::platform;

use crate::connection::Endpoint;
use crate::supervisor::{Supervisor, TerminalSessions};

/// Show what MPD is playing, and for how long, in the terminal.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// MPD host.
    #[arg(short = 'H', long, env = "MPD_HOST")]
    host: Option<String>,

    /// MPD port.
    #[arg(short, long, env = "MPD_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// MPD password.
    #[arg(long, env = "MPD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Config file (default: ~/.config/plenum/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.mpd.host = host;
        }
        if let Some(port) = self.port {
            config.mpd.port = port;
        }
        if self.password.is_some() {
            config.mpd.password = self.password;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("plenum.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Logs go to a file; the screen belongs to the status view.
    eprintln!("plenum log: {}", log_path.display());

    // Panics are reported by the supervisor once the terminal is restored;
    // the default hook would scribble over the alternate screen.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {}", info);
    }));

    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    args.apply(&mut config);

    tracing::info!(
        "plenum starting: mpd at {}:{}, polling every {:?}",
        config.mpd.host,
        config.mpd.port,
        config.poll.interval()
    );

    let endpoint = Endpoint {
        host: config.mpd.host.clone(),
        port: config.mpd.port,
        password: config.mpd.password.clone(),
    };
    let sessions = TerminalSessions {
        io_timeout: config.mpd.timeout(),
    };
    Supervisor::new(
        sessions,
        endpoint,
        config.poll.interval(),
        config.poll.cooldown(),
    )
    .run()
    .await;

    Ok(())
}
