//! SQLite storage for the album catalog.
//!
//! Three tables: `artists(name)`, `albums(title, cover_format, cover_image)`
//! and `contributions(artist, album)` holding the row ids of the other two.
//! The cover columns belong to whatever fills in album art and are never
//! written here beyond their initial NULLs.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::catalog::Catalog;

const SCHEMA: &str = "
    CREATE TABLE artists ( name text );
    CREATE TABLE albums ( title text, cover_format text, cover_image blob );
    CREATE TABLE contributions ( artist integer, album integer );
";

pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        debug!("catalog: opening {}", path.display());
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create the tables and fill them from `catalog`. Fails if the tables
    /// already exist.
    pub fn build(&mut self, catalog: &Catalog) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        insert_all(&tx, catalog)?;
        tx.commit()?;
        info!(
            "catalog: built with {} artists, {} albums, {} contributions",
            catalog.artists.len(),
            catalog.albums.len(),
            catalog.contributions.len()
        );
        Ok(())
    }

    /// Add whatever `listing` has that the database lacks; returns what was added.
    pub fn update(&mut self, listing: &Catalog) -> rusqlite::Result<Catalog> {
        let existing = self.load()?;
        let missing = listing.missing_from(&existing);

        for artist in &missing.artists {
            info!("catalog: did not find artist: {}", artist);
        }
        for album in &missing.albums {
            info!("catalog: did not find album: {}", album);
        }
        for (artist, album) in &missing.contributions {
            info!("catalog: did not find contribution: {} / {}", artist, album);
        }

        let tx = self.conn.transaction()?;
        insert_all(&tx, &missing)?;
        tx.commit()?;
        Ok(missing)
    }

    pub fn load(&self) -> rusqlite::Result<Catalog> {
        let mut catalog = Catalog::default();

        let mut stmt = self.conn.prepare("SELECT name FROM artists")?;
        for name in stmt.query_map([], |row| row.get::<_, String>(0))? {
            catalog.artists.insert(name?);
        }

        let mut stmt = self.conn.prepare("SELECT title FROM albums")?;
        for title in stmt.query_map([], |row| row.get::<_, String>(0))? {
            catalog.albums.insert(title?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT artists.name, albums.title FROM artists, albums, contributions
             WHERE contributions.artist = artists.ROWID AND contributions.album = albums.ROWID",
        )?;
        let pairs = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for pair in pairs {
            catalog.contributions.insert(pair?);
        }

        Ok(catalog)
    }
}

// Artists and albums go in first so contributions can resolve their row ids.
fn insert_all(conn: &Connection, catalog: &Catalog) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("INSERT INTO artists VALUES (?1)")?;
    for artist in &catalog.artists {
        stmt.execute(params![artist])?;
    }

    let mut stmt = conn.prepare("INSERT INTO albums VALUES (?1, NULL, NULL)")?;
    for album in &catalog.albums {
        stmt.execute(params![album])?;
    }

    let mut stmt = conn.prepare(
        "INSERT INTO contributions SELECT artists.ROWID, albums.ROWID FROM artists, albums
         WHERE artists.name = ?1 AND albums.title = ?2",
    )?;
    for (artist, album) in &catalog.contributions {
        stmt.execute(params![artist, album])?;
    }
    Ok(())
}
