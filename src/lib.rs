//! Listening history for a multi-service music player.
//!
//! Core modules:
//! - [`db`] - SQLite-backed history store
//! - [`projection`] - Newest-first observable view over the store
//! - [`recorder`] - Filters now-playing updates into the history
//!
//! ### Supporting Modules
//!
//! - [`config`] - Data directory and runtime settings
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use listenlog::{HistoryProjection, HistoryStore, ListChange, ListeningHistoryEntry};
//!
//! let store = HistoryStore::open_default();
//! let mut history = HistoryProjection::new(store);
//! let changes = history.subscribe();
//! history.initialize();
//!
//! history.on_entry_added(ListeningHistoryEntry::new(
//!     "abc", "Foo", "Bar", "Baz", "", "Spotify", "2024-01-01T10:00:00Z",
//! ));
//!
//! for change in changes.try_iter() {
//!     match change {
//!         ListChange::Inserted(row) => println!("row {row} inserted"),
//!         ListChange::Removed(row) => println!("row {row} removed"),
//!         ListChange::Reset => println!("reload"),
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`error::Result`]. Storage failures are also
//! logged through the `log` facade, so the projection and recorder can carry
//! on with a partial or empty history instead of failing.

pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod entry;
pub mod error;
pub mod projection;
pub mod recorder;

pub use db::{FilterKey, HistoryStore};
pub use entry::ListeningHistoryEntry;
pub use error::{HistoryError, Result};
pub use projection::{HistoryProjection, ListChange};
pub use recorder::Recorder;
