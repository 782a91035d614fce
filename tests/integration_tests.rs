//! # Integration Tests for Listenlog
//!
//! End-to-end scenarios through the public API, on a database file in a
//! temporary directory so reopening behaves as it does across restarts.

use anyhow::Result;
use listenlog::{
    FilterKey, HistoryError, HistoryProjection, HistoryStore, ListChange, ListeningHistoryEntry,
};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use tempfile::TempDir;

/// Test helper: a fresh database path inside its own temporary directory.
fn create_test_database() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("history.db");
    (temp_dir, db_path)
}

fn play(song: &str, service: &str, time: &str) -> ListeningHistoryEntry {
    ListeningHistoryEntry::new(song, format!("{song} title"), "Artist", "Album", "", service, time)
}

fn drain(rx: &Receiver<ListChange>) -> Vec<ListChange> {
    rx.try_iter().collect()
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn test_round_trip_across_reopen() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let original = ListeningHistoryEntry::new(
            "abc", "Foo", "Bar", "Baz", "https://img/cover.png", "Spotify", "2024-01-01T10:00:00Z",
        );

        let id = {
            let store = HistoryStore::open_at(&db_path);
            store.add(&original)?
        };

        let store = HistoryStore::open_at(&db_path);
        assert_eq!(store.get_all()?, vec![original.with_id(id)]);
        Ok(())
    }

    #[test]
    fn test_get_all_keeps_insertion_order() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let store = HistoryStore::open_at(&db_path);

        let ids: Vec<i64> = ["e1", "e2", "e3"]
            .into_iter()
            .map(|song| store.add(&play(song, "Spotify", "t")))
            .collect::<std::result::Result<_, _>>()?;

        let all = store.get_all()?;
        let songs: Vec<&str> = all.iter().map(|e| e.song_unique_id.as_str()).collect();
        assert_eq!(songs, ["e1", "e2", "e3"]);
        assert_eq!(all.iter().map(|e| e.id.unwrap()).collect::<Vec<_>>(), ids);
        Ok(())
    }

    #[test]
    fn test_reopen_keeps_rows() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        {
            let store = HistoryStore::open_at(&db_path);
            store.add(&play("a", "Spotify", "t1"))?;
            store.add(&play("a", "Spotify", "t2"))?;
        }

        for _ in 0..2 {
            let store = HistoryStore::open_at(&db_path);
            assert_eq!(store.count()?, 2);
        }
        Ok(())
    }

    #[test]
    fn test_open_existing_table_is_noop() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let conn = listenlog::db::open(&db_path)?;
        conn.execute(
            "INSERT INTO song (songUniqueId, serviceName, time) VALUES ('x', 'Deezer', 't')",
            [],
        )?;
        listenlog::db::ensure_schema(&conn)?;
        listenlog::db::ensure_schema(&conn)?;
        drop(conn);

        let store = HistoryStore::open_at(&db_path);
        let all = store.get_all()?;
        assert_eq!(all.len(), 1);
        // NULL columns read back as empty strings.
        assert_eq!(all[0].song_title, "");
        Ok(())
    }

    #[test]
    fn test_filter_key_allow_list() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let store = HistoryStore::open_at(&db_path);
        store.add(&play("a", "Spotify", "t"))?;
        store.add(&play("b", "Deezer", "t"))?;
        store.add(&play("c", "Spotify", "t"))?;

        assert_eq!(store.remove_by_name("serviceName", "Spotify")?, 2);
        let left = store.get_all()?;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].service_name, "Deezer");

        let rejected = store.remove_by_name("rowid", "x");
        assert!(matches!(rejected, Err(HistoryError::InvalidFilterKey(ref k)) if k == "rowid"));
        assert_eq!(store.count()?, 1);
        Ok(())
    }

    #[test]
    fn test_remove_value_is_not_interpreted() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let store = HistoryStore::open_at(&db_path);
        store.add(&play("a", "Spotify", "t"))?;

        assert_eq!(store.remove(FilterKey::Artist, "' OR '1'='1")?, 0);
        assert_eq!(store.count()?, 1);
        Ok(())
    }

    #[test]
    fn test_clear_then_get_all_is_empty() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let store = HistoryStore::open_at(&db_path);
        store.add(&play("a", "Spotify", "t"))?;
        store.add(&play("b", "Spotify", "t"))?;

        assert_eq!(store.clear()?, 2);
        assert!(store.get_all()?.is_empty());
        Ok(())
    }
}

#[cfg(test)]
mod projection_tests {
    use super::*;

    #[test]
    fn test_display_order_is_newest_first() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let mut projection = HistoryProjection::new(HistoryStore::open_at(&db_path));
        projection.initialize();

        for song in ["e1", "e2", "e3"] {
            projection.on_entry_added(play(song, "Spotify", "t"));
        }

        let shown: Vec<&str> = projection.iter().map(|e| e.song_unique_id.as_str()).collect();
        assert_eq!(shown, ["e3", "e2", "e1"]);

        let stored: Vec<String> = projection
            .store()
            .get_all()?
            .into_iter()
            .map(|e| e.song_unique_id)
            .collect();
        assert_eq!(stored, ["e1", "e2", "e3"]);

        // Cold start shows the same order.
        drop(projection);
        let mut restarted = HistoryProjection::new(HistoryStore::open_at(&db_path));
        restarted.initialize();
        let shown: Vec<&str> = restarted.iter().map(|e| e.song_unique_id.as_str()).collect();
        assert_eq!(shown, ["e3", "e2", "e1"]);
        Ok(())
    }

    #[test]
    fn test_clear_emits_single_reset() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let mut projection = HistoryProjection::new(HistoryStore::open_at(&db_path));
        projection.initialize();
        for song in ["a", "b", "c"] {
            projection.on_entry_added(play(song, "Spotify", "t"));
        }
        let rx = projection.subscribe();

        projection.clear()?;

        assert_eq!(projection.len(), 0);
        assert!(projection.store().get_all()?.is_empty());
        assert_eq!(drain(&rx), [ListChange::Reset]);
        Ok(())
    }

    #[test]
    fn test_index_bounds() {
        let (_temp_dir, db_path) = create_test_database();
        let mut projection = HistoryProjection::new(HistoryStore::open_at(&db_path));
        projection.initialize();
        projection.on_entry_added(play("a", "Spotify", "t"));
        projection.on_entry_added(play("b", "Spotify", "t"));
        let rx = projection.subscribe();
        let before = projection.entries().to_vec();

        let len = projection.len() as isize;
        for index in [-1, len] {
            assert!(matches!(
                projection.on_entry_removed(index),
                Err(HistoryError::InvalidIndex { .. })
            ));
        }

        assert_eq!(projection.entries(), before.as_slice());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (_temp_dir, db_path) = create_test_database();
        let mut projection = HistoryProjection::new(HistoryStore::open_at(&db_path));
        projection.initialize();
        assert_eq!(projection.len(), 0);

        let rx = projection.subscribe();
        let played = ListeningHistoryEntry::new(
            "abc", "Foo", "Bar", "Baz", "", "Spotify", "2024-01-01T10:00:00Z",
        );
        projection.on_entry_added(played.clone());

        assert_eq!(projection.len(), 1);
        let shown = projection.get(0).unwrap();
        let id = shown.id.expect("entry should have been persisted");
        assert_eq!(shown, &played.with_id(id));
        assert_eq!(drain(&rx), [ListChange::Inserted(0)]);

        projection.on_entries_cleared();
        assert_eq!(projection.len(), 0);
        assert_eq!(drain(&rx), [ListChange::Reset]);
    }

    #[test]
    fn test_unreachable_database_degrades() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened as a database file.
        let mut projection = HistoryProjection::new(HistoryStore::open_at(temp_dir.path()));
        projection.initialize();
        assert!(projection.is_empty());

        let shown = projection.on_entry_added(play("a", "Spotify", "t"));
        assert_eq!(shown.id, None);
        assert_eq!(projection.len(), 1);
        assert!(projection.clear().is_err());
    }
}

#[cfg(test)]
mod recorder_tests {
    use super::*;
    use listenlog::Recorder;

    #[test]
    fn test_recorder_session() -> Result<()> {
        let (_temp_dir, db_path) = create_test_database();
        let mut recorder = Recorder::new(HistoryProjection::new(HistoryStore::open_at(&db_path)), true);
        recorder.initialize();
        let rx = recorder.projection_mut().subscribe();

        recorder.on_now_playing(play("a", "Spotify", "t1"));
        recorder.on_now_playing(play("a", "Spotify", "t2"));
        recorder.on_now_playing(play("b", "Deezer", "t3"));

        assert_eq!(recorder.projection().len(), 2);
        assert_eq!(drain(&rx), [ListChange::Inserted(0), ListChange::Inserted(0)]);

        assert_eq!(recorder.remove_by_service("Deezer")?, 1);
        assert_eq!(drain(&rx), [ListChange::Removed(0)]);
        assert_eq!(recorder.projection().store().count()?, 1);
        Ok(())
    }
}
