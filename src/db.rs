//! # Listening History Store
//!
//! Durable add/query/delete over the single `song` table. Every play event is
//! one row; rows are never updated.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE song (
//!     id           INTEGER PRIMARY KEY AUTOINCREMENT,
//!     songUniqueId TEXT,
//!     songTitle    TEXT,
//!     artist       TEXT,
//!     album        TEXT,
//!     artUrl       TEXT,
//!     serviceName  TEXT,
//!     time         TEXT
//! )
//! ```
//!
//! `AUTOINCREMENT` keeps ids from being reused after the newest rows are
//! deleted.
//!
//! ## Failure handling
//!
//! Storage failures are logged at `warn` level and handed back as
//! [`HistoryError`]. A store whose connection could not be opened is still
//! usable: every operation returns [`HistoryError::NotConnected`].

use crate::config;
use crate::entry::ListeningHistoryEntry;
use crate::error::{HistoryError, Result};
use log::{debug, info, warn};
use rusqlite::{params, Connection, Row};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const SELECT_ALL: &str = "SELECT id, songUniqueId, songTitle, artist, album, artUrl, serviceName, time
     FROM song ORDER BY id";

/// Columns that rows can be filtered on when removing.
///
/// Column names end up in the query text, so only these are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Id,
    SongUniqueId,
    SongTitle,
    Artist,
    Album,
    ArtUrl,
    ServiceName,
    Time,
}

impl FilterKey {
    pub const ALL: [FilterKey; 8] = [
        FilterKey::Id,
        FilterKey::SongUniqueId,
        FilterKey::SongTitle,
        FilterKey::Artist,
        FilterKey::Album,
        FilterKey::ArtUrl,
        FilterKey::ServiceName,
        FilterKey::Time,
    ];

    /// Literal column identifier in the `song` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            FilterKey::Id => "id",
            FilterKey::SongUniqueId => "songUniqueId",
            FilterKey::SongTitle => "songTitle",
            FilterKey::Artist => "artist",
            FilterKey::Album => "album",
            FilterKey::ArtUrl => "artUrl",
            FilterKey::ServiceName => "serviceName",
            FilterKey::Time => "time",
        }
    }

    /// Row id named by `value`, for [`FilterKey::Id`] filters.
    pub fn parse_id(value: &str) -> Result<i64> {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| HistoryError::InvalidFilterValue {
                key: FilterKey::Id.column(),
                value: value.to_string(),
            })
    }

    /// Whether `entry` holds `value` in this column, by the same rule the
    /// store deletes with: ids compare as numbers, missing text as `""`.
    #[must_use]
    pub fn matches(self, entry: &ListeningHistoryEntry, value: &str) -> bool {
        match self {
            FilterKey::Id => match Self::parse_id(value) {
                Ok(id) => entry.id == Some(id),
                Err(_) => false,
            },
            FilterKey::SongUniqueId => entry.song_unique_id == value,
            FilterKey::SongTitle => entry.song_title == value,
            FilterKey::Artist => entry.artist == value,
            FilterKey::Album => entry.album == value,
            FilterKey::ArtUrl => entry.art_url == value,
            FilterKey::ServiceName => entry.service_name == value,
            FilterKey::Time => entry.time == value,
        }
    }
}

impl FromStr for FilterKey {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.column() == s)
            .ok_or_else(|| HistoryError::InvalidFilterKey(s.to_string()))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Open the history database at `path`, creating the file (and its parent
/// directory) if absent, and make sure the `song` table exists.
pub fn open(path: &Path) -> Result<Connection> {
    debug!("Opening listening history db: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path).map_err(|source| HistoryError::Connection {
        path: path.to_path_buf(),
        source,
    })?;
    ensure_schema(&conn)?;

    info!("Connected to database: {}", path.display());
    Ok(conn)
}

/// Create the `song` table if it is missing. Never touches existing rows.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'song')",
            [],
            |row| row.get(0),
        )
        .map_err(HistoryError::Schema)?;

    if exists {
        debug!("Database already initialized");
        return Ok(());
    }

    debug!("Initializing empty database");
    conn.execute(
        "CREATE TABLE IF NOT EXISTS song (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            songUniqueId TEXT,
            songTitle    TEXT,
            artist       TEXT,
            album        TEXT,
            artUrl       TEXT,
            serviceName  TEXT,
            time         TEXT
        )",
        (),
    )
    .map_err(|e| {
        warn!("Failed to create song table: {e}");
        HistoryError::Schema(e)
    })?;

    Ok(())
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ListeningHistoryEntry> {
    Ok(ListeningHistoryEntry {
        id: Some(row.get(0)?),
        song_unique_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        song_title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        artist: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        album: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        art_url: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        service_name: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        time: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
    })
}

/// Owner of the single long-lived history connection.
#[derive(Debug)]
pub struct HistoryStore {
    conn: Option<Connection>,
}

impl HistoryStore {
    /// Wrap an already opened connection, or `None` for a store that fails
    /// every operation with [`HistoryError::NotConnected`].
    #[must_use]
    pub fn new(conn: Option<Connection>) -> Self {
        Self { conn }
    }

    /// Open the database at `path`. A failure is logged, not returned.
    #[must_use]
    pub fn open_at(path: &Path) -> Self {
        match open(path) {
            Ok(conn) => Self::new(Some(conn)),
            Err(e) => {
                warn!("Connection with database failed: {}: {e}", path.display());
                Self::new(None)
            }
        }
    }

    /// Open the database at the fixed platform location.
    #[must_use]
    pub fn open_default() -> Self {
        match config::get_db_path() {
            Ok(path) => Self::open_at(&path),
            Err(e) => {
                warn!("No location for the history database: {e:#}");
                Self::new(None)
            }
        }
    }

    /// Store backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| HistoryError::Connection {
            path: ":memory:".into(),
            source,
        })?;
        ensure_schema(&conn)?;
        Ok(Self::new(Some(conn)))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            debug!("History operation skipped, database is not open");
            HistoryError::NotConnected
        })
    }

    /// Insert one entry and return the id the database assigned to it.
    pub fn add(&self, entry: &ListeningHistoryEntry) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO song (songUniqueId, songTitle, artist, album, artUrl, serviceName, time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.song_unique_id,
                entry.song_title,
                entry.artist,
                entry.album,
                entry.art_url,
                entry.service_name,
                entry.time,
            ],
        )
        .map_err(|e| {
            warn!("Failed to add listening history entry to db: {e}");
            HistoryError::Write(e)
        })?;

        Ok(conn.last_insert_rowid())
    }

    /// Delete every row whose `key` column equals `value`. Returns the number
    /// of deleted rows.
    ///
    /// An `id` filter must be an integer, anything else is rejected with
    /// [`HistoryError::InvalidFilterValue`]. NULL text columns read back as
    /// `""`, so they match an empty `value`.
    pub fn remove(&self, key: FilterKey, value: &str) -> Result<usize> {
        if key == FilterKey::Id {
            return self.remove_by_id(FilterKey::parse_id(value)?);
        }

        let conn = self.conn()?;
        let sql = format!("DELETE FROM song WHERE IFNULL({}, '') = ?1", key.column());
        conn.execute(&sql, [value]).map_err(|e| {
            warn!("Failed to remove listening history entries where {key} = {value:?}: {e}");
            HistoryError::Write(e)
        })
    }

    /// Like [`HistoryStore::remove`], with the column given by name.
    /// Unknown columns are rejected before anything is deleted.
    pub fn remove_by_name(&self, key: &str, value: &str) -> Result<usize> {
        let key = key.parse::<FilterKey>()?;
        self.remove(key, value)
    }

    pub fn remove_by_id(&self, id: i64) -> Result<usize> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM song WHERE id = ?1", [id]).map_err(|e| {
            warn!("Failed to remove listening history entry {id}: {e}");
            HistoryError::Write(e)
        })
    }

    /// Delete all rows.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM song", ()).map_err(|e| {
            warn!("Failed to clear listening history: {e}");
            HistoryError::Write(e)
        })
    }

    /// Every entry, oldest first.
    pub fn get_all(&self) -> Result<Vec<ListeningHistoryEntry>> {
        let conn = self.conn()?;
        let read_err = |e: rusqlite::Error| {
            warn!("Failed to read listening history: {e}");
            HistoryError::Read(e)
        };

        let mut stmt = conn.prepare(SELECT_ALL).map_err(read_err)?;
        let rows = stmt.query_map([], entry_from_row).map_err(read_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(read_err)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM song", [], |row| row.get::<_, i64>(0))
            .map(|n| usize::try_from(n).unwrap_or_default())
            .map_err(|e| {
                warn!("Failed to count listening history: {e}");
                HistoryError::Read(e)
            })
    }
}
