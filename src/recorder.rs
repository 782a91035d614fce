//! # Listening History Recorder
//!
//! Sits between the playback-event source and the [`HistoryProjection`].
//! Deciding whether a track played long enough to count is up to the caller;
//! the recorder only filters what reaches the history:
//!
//! - nothing is recorded while history is disabled
//! - updates without a song id are ignored
//! - the same song reported twice in a row is recorded once

use crate::db::FilterKey;
use crate::entry::ListeningHistoryEntry;
use crate::error::Result;
use crate::projection::HistoryProjection;
use log::{debug, info};

#[derive(Debug)]
pub struct Recorder {
    projection: HistoryProjection,
    enabled: bool,
    last: Option<ListeningHistoryEntry>,
}

impl Recorder {
    #[must_use]
    pub fn new(projection: HistoryProjection, enabled: bool) -> Self {
        Self {
            projection,
            enabled,
            last: None,
        }
    }

    /// Load the stored history into the view.
    pub fn initialize(&mut self) {
        self.projection.initialize();
        self.last = self.projection.get(0).cloned();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Listening history {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a now-playing update. Returns the stored entry, or `None` when
    /// the update was filtered out.
    pub fn on_now_playing(&mut self, entry: ListeningHistoryEntry) -> Option<ListeningHistoryEntry> {
        if !self.enabled {
            return None;
        }
        if entry.song_unique_id.is_empty() {
            debug!("Ignoring now-playing update without a song id");
            return None;
        }
        if self.last.as_ref().is_some_and(|last| last.is_same_song(&entry)) {
            debug!("Ignoring repeated now-playing update for {}", entry.song_unique_id);
            return None;
        }

        let stored = self.projection.on_entry_added(entry);
        self.last = Some(stored.clone());
        Some(stored)
    }

    /// Delete the entry with `id` from the store and the view.
    ///
    /// The stored row is deleted even when the view does not show it. The
    /// returned flag only tells whether a row left the view.
    pub fn remove_by_id(&mut self, id: i64) -> Result<bool> {
        let removed = self.projection.remove_where(FilterKey::Id, &id.to_string())?;
        Ok(removed > 0)
    }

    /// Delete every entry played on `service_name`.
    pub fn remove_by_service(&mut self, service_name: &str) -> Result<usize> {
        self.projection.remove_where(FilterKey::ServiceName, service_name)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.projection.clear()?;
        self.last = None;
        Ok(())
    }

    #[must_use]
    pub fn projection(&self) -> &HistoryProjection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut HistoryProjection {
        &mut self.projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::HistoryStore;

    fn entry(song: &str, service: &str) -> ListeningHistoryEntry {
        ListeningHistoryEntry::new(song, "Title", "Artist", "Album", "", service, "2024-01-01T10:00:00Z")
    }

    fn recorder() -> Recorder {
        let mut recorder = Recorder::new(HistoryProjection::new(HistoryStore::in_memory().unwrap()), true);
        recorder.initialize();
        recorder
    }

    #[test]
    fn test_repeated_song_recorded_once() {
        let mut recorder = recorder();

        assert!(recorder.on_now_playing(entry("a", "Spotify")).is_some());
        assert!(recorder.on_now_playing(entry("a", "Spotify")).is_none());
        assert!(recorder.on_now_playing(entry("b", "Spotify")).is_some());
        assert!(recorder.on_now_playing(entry("a", "Spotify")).is_some());

        assert_eq!(recorder.projection().len(), 3);
    }

    #[test]
    fn test_same_id_on_other_service_is_recorded() {
        let mut recorder = recorder();

        recorder.on_now_playing(entry("a", "Spotify"));
        recorder.on_now_playing(entry("a", "Deezer"));

        assert_eq!(recorder.projection().len(), 2);
    }

    #[test]
    fn test_disabled_records_nothing() {
        let mut recorder = recorder();
        recorder.set_enabled(false);

        assert!(recorder.on_now_playing(entry("a", "Spotify")).is_none());
        assert!(recorder.projection().is_empty());

        recorder.set_enabled(true);
        assert!(recorder.on_now_playing(entry("a", "Spotify")).is_some());
    }

    #[test]
    fn test_empty_song_id_ignored() {
        let mut recorder = recorder();
        assert!(recorder.on_now_playing(entry("", "Spotify")).is_none());
    }

    #[test]
    fn test_duplicate_filter_survives_restart() {
        let store = HistoryStore::in_memory().unwrap();
        store.add(&entry("a", "Spotify")).unwrap();
        let mut recorder = Recorder::new(HistoryProjection::new(store), true);
        recorder.initialize();

        assert!(recorder.on_now_playing(entry("a", "Spotify")).is_none());
    }

    #[test]
    fn test_remove_by_id_and_service() {
        let mut recorder = recorder();
        let a = recorder.on_now_playing(entry("a", "Spotify")).unwrap();
        recorder.on_now_playing(entry("b", "Deezer"));
        recorder.on_now_playing(entry("c", "Spotify"));

        assert!(recorder.remove_by_id(a.id.unwrap()).unwrap());
        assert!(!recorder.remove_by_id(a.id.unwrap()).unwrap());
        assert_eq!(recorder.remove_by_service("Spotify").unwrap(), 1);

        let left = recorder.projection().store().get_all().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].song_unique_id, "b");
    }

    #[test]
    fn test_remove_by_id_deletes_rows_not_shown() {
        let mut recorder = recorder();
        let hidden = recorder
            .projection()
            .store()
            .add(&entry("a", "Spotify"))
            .unwrap();

        assert!(!recorder.remove_by_id(hidden).unwrap());
        assert_eq!(recorder.projection().store().count().unwrap(), 0);
    }

    #[test]
    fn test_clear_resets_duplicate_filter() {
        let mut recorder = recorder();
        recorder.on_now_playing(entry("a", "Spotify"));

        recorder.clear().unwrap();

        assert!(recorder.projection().is_empty());
        assert!(recorder.on_now_playing(entry("a", "Spotify")).is_some());
    }
}
