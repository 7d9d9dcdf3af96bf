//! The catalog as plain sets: artists, albums, and who contributed to what.

use std::collections::BTreeSet;

use plenum_proto::protocol::TrackInfo;

/// Stand-in for a missing artist or album tag.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub artists: BTreeSet<String>,
    pub albums: BTreeSet<String>,
    /// (artist, album) pairs.
    pub contributions: BTreeSet<(String, String)>,
}

impl Catalog {
    pub fn from_tracks<'a>(tracks: impl IntoIterator<Item = &'a TrackInfo>) -> Self {
        let mut catalog = Self::default();
        for track in tracks {
            let (artist, album) = contribution_of(track);
            catalog.add(artist, album);
        }
        catalog
    }

    pub fn add(&mut self, artist: String, album: String) {
        self.artists.insert(artist.clone());
        self.albums.insert(album.clone());
        self.contributions.insert((artist, album));
    }

    /// Everything in `self` that `existing` does not have yet.
    pub fn missing_from(&self, existing: &Catalog) -> Catalog {
        Catalog {
            artists: self.artists.difference(&existing.artists).cloned().collect(),
            albums: self.albums.difference(&existing.albums).cloned().collect(),
            contributions: self
                .contributions
                .difference(&existing.contributions)
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.albums.is_empty() && self.contributions.is_empty()
    }
}

/// The (artist, album) key of a track, with missing tags as [`UNKNOWN`].
pub fn contribution_of(track: &TrackInfo) -> (String, String) {
    let or_unknown = |field: &Option<String>| field.clone().unwrap_or_else(|| UNKNOWN.to_string());
    (or_unknown(&track.artist), or_unknown(&track.album))
}
