//! Error type shared by the history store, projection and recorder.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    /// The database file could not be opened.
    #[error("connection with history database failed: {path}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// The store was constructed without a usable connection.
    #[error("history database is not open")]
    NotConnected,
    #[error("failed to create song table")]
    Schema(#[source] rusqlite::Error),
    #[error("failed to write listening history")]
    Write(#[source] rusqlite::Error),
    #[error("failed to read listening history")]
    Read(#[source] rusqlite::Error),
    #[error("index {index} out of range for history of length {len}")]
    InvalidIndex { index: isize, len: usize },
    #[error("unknown history column: `{0}`")]
    InvalidFilterKey(String),
    #[error("`{value}` is not a valid value for column `{key}`")]
    InvalidFilterValue { key: &'static str, value: String },
    #[error("failed to create data directory {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, HistoryError>;
