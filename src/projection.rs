//! # History Projection
//!
//! Newest-first, in-memory view over the [`HistoryStore`], meant to back a
//! list widget. Every change to the view is announced to subscribers as a
//! [`ListChange`] so the presentation layer can update incrementally instead
//! of redrawing the whole list.
//!
//! The view is a cache: if persisting a new entry fails the entry still shows
//! up for the rest of the session, it just has no id.

use crate::db::{FilterKey, HistoryStore};
use crate::entry::ListeningHistoryEntry;
use crate::error::{HistoryError, Result};
use log::{debug, warn};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Positional change to the ordered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// A row now exists at this index; rows at and after it moved down by one.
    Inserted(usize),
    /// The row at this index is gone; later rows moved up by one.
    Removed(usize),
    /// The whole view was replaced.
    Reset,
}

#[derive(Debug)]
pub struct HistoryProjection {
    store: HistoryStore,
    /// Newest entry at index 0.
    entries: Vec<ListeningHistoryEntry>,
    subscribers: Vec<Sender<ListChange>>,
}

impl HistoryProjection {
    #[must_use]
    pub fn new(store: HistoryStore) -> Self {
        Self {
            store,
            entries: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Receive every future change, in the order they are applied.
    pub fn subscribe(&mut self) -> Receiver<ListChange> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, change: ListChange) {
        // A failed send means the receiver was dropped.
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    /// Replace the view with the store's contents.
    pub fn initialize(&mut self) {
        let mut entries = self.store.get_all().unwrap_or_else(|e| {
            warn!("Starting with an empty listening history: {e}");
            Vec::new()
        });
        entries.reverse();
        debug!("Loaded {} listening history entries", entries.len());

        self.entries = entries;
        self.emit(ListChange::Reset);
    }

    /// Persist a new play event and show it at the top of the view.
    pub fn on_entry_added(&mut self, entry: ListeningHistoryEntry) -> ListeningHistoryEntry {
        let entry = match self.store.add(&entry) {
            Ok(id) => entry.with_id(id),
            Err(e) => {
                warn!("Listening history entry kept for this session only: {e}");
                entry
            }
        };

        self.entries.insert(0, entry.clone());
        self.emit(ListChange::Inserted(0));
        entry
    }

    fn checked_index(&self, index: isize) -> Result<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.entries.len())
            .ok_or(HistoryError::InvalidIndex {
                index,
                len: self.entries.len(),
            })
    }

    /// Drop the row at `index` from the view. The store is not touched.
    pub fn on_entry_removed(&mut self, index: isize) -> Result<ListeningHistoryEntry> {
        let index = self.checked_index(index)?;
        let removed = self.entries.remove(index);
        self.emit(ListChange::Removed(index));
        Ok(removed)
    }

    /// Empty the view. The store is not touched.
    pub fn on_entries_cleared(&mut self) {
        self.entries.clear();
        self.emit(ListChange::Reset);
    }

    /// Delete the entry at `index` from the store, then from the view.
    ///
    /// An entry that was never persisted only leaves the view.
    pub fn remove_at(&mut self, index: isize) -> Result<ListeningHistoryEntry> {
        let checked = self.checked_index(index)?;
        if let Some(id) = self.entries[checked].id {
            self.store.remove_by_id(id)?;
        }
        self.on_entry_removed(index)
    }

    /// Delete every entry whose `key` column equals `value`, from the store
    /// and then from the view. Returns how many rows left the view.
    pub fn remove_where(&mut self, key: FilterKey, value: &str) -> Result<usize> {
        self.store.remove(key, value)?;

        let matching: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| key.matches(entry, value))
            .map(|(i, _)| i)
            .collect();

        // Back to front so the remaining indices stay valid.
        for &i in matching.iter().rev() {
            self.entries.remove(i);
            self.emit(ListChange::Removed(i));
        }
        Ok(matching.len())
    }

    /// Delete the whole history, from the store and then from the view.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.on_entries_cleared();
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ListeningHistoryEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[ListeningHistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListeningHistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }
}
