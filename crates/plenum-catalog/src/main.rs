mod catalog;
mod db;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use plenum_proto::client::MpdClient;
use plenum_proto::config::Config;
use plenum_proto::protocol::TrackInfo;
use plenum_proto::transport::Transport;

use crate::catalog::Catalog;
use crate::db::CatalogDb;

/// Keep an SQLite catalog of the artists and albums in MPD's database.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// MPD host.
    #[arg(short = 'H', long, global = true, env = "MPD_HOST")]
    host: Option<String>,

    /// MPD port.
    #[arg(short, long, global = true, env = "MPD_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// MPD password.
    #[arg(long, global = true, env = "MPD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Catalog database (default: ~/.local/share/plenum/album_art.sqlite3).
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Config file (default: ~/.config/plenum/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the tables and fill them from MPD.
    Build,
    /// Add whatever MPD knows about that the catalog lacks.
    Update,
}

impl Args {
    fn apply(&mut self, config: &mut Config) {
        if let Some(host) = self.host.take() {
            config.mpd.host = host;
        }
        if let Some(port) = self.port {
            config.mpd.port = port;
        }
        if self.password.is_some() {
            config.mpd.password = self.password.take();
        }
        if let Some(database) = self.database.take() {
            config.catalog.database = database;
        }
    }
}

async fn fetch_listing(config: &Config) -> anyhow::Result<Vec<TrackInfo>> {
    let mpd = &config.mpd;
    let mut client = MpdClient::new(mpd.timeout());
    client
        .connect(&mpd.host, mpd.port)
        .await
        .with_context(|| format!("could not connect to '{}'", mpd.host))?;
    if let Some(password) = &mpd.password {
        client
            .authenticate(password)
            .await
            .context("password command failed")?;
    }

    let listing = client.list_all().await.context("listallinfo failed")?;
    info!("catalog: daemon lists {} songs", listing.len());

    if let Err(e) = client.close_notify().await {
        tracing::debug!("catalog: close failed: {}", e);
    }
    client.teardown().await?;
    Ok(listing)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter.as_str())
        .init();

    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    args.apply(&mut config);

    let listing = Catalog::from_tracks(&fetch_listing(&config).await?);

    let path = &config.catalog.database;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut db = CatalogDb::open(path)
        .with_context(|| format!("could not open catalog {}", path.display()))?;

    match args.command {
        Command::Build => {
            db.build(&listing)
                .with_context(|| format!("building {} failed", path.display()))?;
        }
        Command::Update => {
            let added = db
                .update(&listing)
                .with_context(|| format!("updating {} failed", path.display()))?;
            info!(
                "catalog: added {} artists, {} albums, {} contributions",
                added.artists.len(),
                added.albums.len(),
                added.contributions.len()
            );
        }
    }

    Ok(())
}
