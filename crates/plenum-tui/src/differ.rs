//! Snapshot differ: decides what, if anything, needs redrawing.

use plenum_proto::protocol::{PlaybackStatus, TrackInfo};

/// The last (track, status) pair that made it onto the display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub track: TrackInfo,
    pub status: PlaybackStatus,
}

/// What changed since the snapshot. Each field is set independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub track: Option<TrackInfo>,
    pub status: Option<PlaybackStatus>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.track.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Default)]
pub struct SnapshotDiffer {
    snapshot: Snapshot,
}

impl SnapshotDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn diff(&self, track: &TrackInfo, status: &PlaybackStatus) -> Changes {
        Changes {
            track: (*track != self.snapshot.track).then(|| track.clone()),
            status: (*status != self.snapshot.status).then(|| status.clone()),
        }
    }

    /// Record changes that have been rendered.
    pub fn commit(&mut self, changes: Changes) {
        if let Some(track) = changes.track {
            self.snapshot.track = track;
        }
        if let Some(status) = changes.status {
            self.snapshot.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_proto::protocol::PlayState;

    fn track(artist: &str, title: &str) -> TrackInfo {
        TrackInfo {
            artist: Some(artist.into()),
            album: None,
            title: Some(title.into()),
        }
    }

    fn playing(time: &str) -> PlaybackStatus {
        PlaybackStatus {
            state: Some(PlayState::Play),
            time: Some(time.into()),
        }
    }

    #[test]
    fn test_same_track_twice_signals_once() {
        let mut differ = SnapshotDiffer::new();
        let t = track("Artist", "Title");
        let s = playing("1:200");

        let first = differ.diff(&t, &s);
        assert_eq!(first.track.as_ref(), Some(&t));
        assert_eq!(first.status.as_ref(), Some(&s));
        differ.commit(first);

        assert!(differ.diff(&t, &s).is_empty());
    }

    #[test]
    fn test_any_field_difference_is_a_track_change() {
        let mut differ = SnapshotDiffer::new();
        let base = TrackInfo {
            artist: Some("A".into()),
            album: Some("B".into()),
            title: Some("C".into()),
        };
        differ.commit(differ.diff(&base, &PlaybackStatus::default()));

        let variants = [
            TrackInfo { artist: None, ..base.clone() },
            TrackInfo { album: Some("B2".into()), ..base.clone() },
            TrackInfo { title: Some("C2".into()), ..base.clone() },
        ];
        for variant in variants {
            let changes = differ.diff(&variant, &PlaybackStatus::default());
            assert_eq!(changes.track, Some(variant));
            assert!(changes.status.is_none());
        }
    }

    #[test]
    fn test_signals_are_independent() {
        let mut differ = SnapshotDiffer::new();
        let t = track("Artist", "Title");
        differ.commit(differ.diff(&t, &playing("1:200")));

        let changes = differ.diff(&t, &playing("2:200"));
        assert!(changes.track.is_none());
        assert_eq!(changes.status, Some(playing("2:200")));

        let changes = differ.diff(&track("Other", "Song"), &playing("1:200"));
        assert!(changes.track.is_some());
        assert!(changes.status.is_none());
    }

    #[test]
    fn test_snapshot_untouched_without_commit() {
        let differ = SnapshotDiffer::new();
        let _ = differ.diff(&track("Artist", "Title"), &playing("1:200"));
        assert_eq!(differ.snapshot(), &Snapshot::default());
    }

    #[test]
    fn test_initial_empty_state_is_not_a_change() {
        let differ = SnapshotDiffer::new();
        assert!(differ
            .diff(&TrackInfo::default(), &PlaybackStatus::default())
            .is_empty());
    }
}
