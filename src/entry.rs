use serde::{Deserialize, Serialize};

/// One play event: a track that played long enough to count as history.
///
/// Entries are never mutated once persisted. Repeat plays of the same track
/// are distinct entries with distinct ids.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningHistoryEntry {
    /// Assigned by the store on insert. `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Identifies the track within its streaming service.
    pub song_unique_id: String,
    pub song_title: String,
    pub artist: String,
    pub album: String,
    /// Cover image reference, may be empty.
    pub art_url: String,
    /// Streaming service the track was played on.
    pub service_name: String,
    /// Timestamp of the play event, stored as text.
    pub time: String,
}

impl ListeningHistoryEntry {
    /// Build an unpersisted entry from the now-playing tuple.
    #[must_use]
    pub fn new(
        song_unique_id: impl Into<String>,
        song_title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        art_url: impl Into<String>,
        service_name: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            song_unique_id: song_unique_id.into(),
            song_title: song_title.into(),
            artist: artist.into(),
            album: album.into(),
            art_url: art_url.into(),
            service_name: service_name.into(),
            time: time.into(),
        }
    }

    #[must_use]
    pub fn with_id(self, id: i64) -> Self {
        Self { id: Some(id), ..self }
    }

    /// Same track on the same service, regardless of when it played.
    #[must_use]
    pub fn is_same_song(&self, other: &Self) -> bool {
        self.song_unique_id == other.song_unique_id && self.service_name == other.service_name
    }
}
