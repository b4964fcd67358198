//! The note collection: in-memory CRUD and search over a persisted record.

use crate::core::geometry::{Point, Viewport};
use crate::core::storage::{KeyValueStore, NoteStore};
use crate::{Note, NotePatch, Result, StickItError};

/// Where a note lands when no position is requested.
pub const DEFAULT_POSITION: Point = Point::new(100.0, 100.0);

/// The authoritative collection of notes on one board.
///
/// `Board` owns the in-memory notes and writes through to its [`NoteStore`]
/// on every durable mutation. Persistence is best-effort: when a write fails
/// the in-memory change is kept and the failure is returned as
/// [`StickItError::Persist`], so memory and backend may differ until the next
/// successful write.
pub struct Board<S> {
    store: NoteStore<S>,
    notes: Vec<Note>,
    next_z_index: u32,
    viewport: Viewport,
}

impl<S: KeyValueStore> Board<S> {
    /// Creates an empty board over `backend` without reading it.
    pub fn new(backend: S, viewport: Viewport) -> Self {
        Self {
            store: NoteStore::new(backend),
            notes: Vec::new(),
            next_z_index: 1,
            viewport,
        }
    }

    /// Creates a board over `backend` and loads whatever it holds.
    ///
    /// # Errors
    ///
    /// Returns [`StickItError::Storage`] when the backend itself cannot be
    /// read. Corrupt records are not an error; they load as an empty board.
    pub fn open(backend: S, viewport: Viewport) -> Result<Self> {
        let mut board = Self::new(backend, viewport);
        board.load_all()?;
        Ok(board)
    }

    /// Replaces the in-memory collection with the stored record and resets
    /// the stacking counter past the highest restored value.
    ///
    /// Restored stacking orders that leave no room above them are renumbered
    /// from 1, keeping their relative order.
    pub fn load_all(&mut self) -> Result<&[Note]> {
        self.notes = self.store.load_all()?;
        for note in &mut self.notes {
            if note.modified < note.created {
                note.modified = note.created;
            }
        }
        if self.max_z_index() == u32::MAX {
            self.compact_stacking();
        }
        self.next_z_index = self.max_z_index() + 1;
        log::info!("loaded {} notes", self.notes.len());
        Ok(&self.notes)
    }

    /// Renumbers stacking orders 1..=n in their current order and writes the
    /// result through. A failed write is logged; memory keeps the new values.
    fn compact_stacking(&mut self) {
        let mut order: Vec<usize> = (0..self.notes.len()).collect();
        order.sort_by_key(|&i| self.notes[i].z_index);
        for (rank, index) in order.into_iter().enumerate() {
            self.notes[index].z_index = u32::try_from(rank + 1).unwrap_or(u32::MAX);
        }
        self.next_z_index = self.max_z_index().saturating_add(1);
        log::warn!("stacking orders exhausted; renumbered {} notes", self.notes.len());

        if let Err(e) = self.store.save_all(&self.notes) {
            log::error!("failed to persist renumbered stacking orders: {e}");
        }
    }

    /// Creates a note at `position` (clamped into the board) and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`StickItError::Persist`] naming the new note if it could not
    /// be written; the note still exists in memory.
    pub fn create(&mut self, position: Option<Point>) -> Result<Note> {
        let position = self
            .viewport
            .clamp_new_note(position.unwrap_or(DEFAULT_POSITION));
        if !position.is_finite() {
            return Err(StickItError::InvalidGeometry(format!(
                "new note position {position:?} on board {:?}",
                self.viewport
            )));
        }
        if self.next_z_index == u32::MAX {
            self.compact_stacking();
        }
        let note = Note::new(position, self.next_z_index);
        self.next_z_index = self.next_z_index.saturating_add(1);
        self.notes.push(note.clone());
        log::info!("created note {} at ({}, {})", note.id, note.x, note.y);

        self.store
            .save(&note)
            .map_err(|e| StickItError::persist(Some(&note.id), e))?;
        Ok(note)
    }

    /// Applies `patch` to the note with `id`, refreshes `modified`, and persists.
    ///
    /// Returns `Ok(false)` when no such note exists.
    ///
    /// # Errors
    ///
    /// Returns [`StickItError::Persist`] when the write fails; the patch stays
    /// applied in memory.
    ///
    /// Returns [`StickItError::InvalidGeometry`] without touching anything when
    /// the patch carries a non-finite coordinate or size.
    pub fn update(&mut self, id: &str, patch: NotePatch) -> Result<bool> {
        if !patch.is_finite() {
            return Err(StickItError::InvalidGeometry(format!("{patch:?}")));
        }
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            log::debug!("update ignored for unknown note {id}");
            return Ok(false);
        };
        patch.apply_to(note);
        note.touch();
        if note.z_index >= self.next_z_index {
            self.next_z_index = note.z_index.saturating_add(1);
        }

        let snapshot = note.clone();
        self.store
            .save(&snapshot)
            .map_err(|e| StickItError::persist(Some(id), e))?;
        Ok(true)
    }

    /// Removes the note with `id` from memory and the backend.
    ///
    /// Returns `Ok(false)` when no such note exists.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            return Ok(false);
        };
        self.notes.remove(index);
        log::info!("deleted note {id}");

        self.store
            .delete(id)
            .map_err(|e| StickItError::persist(Some(id), e))?;
        Ok(true)
    }

    /// Writes the whole in-memory collection, e.g. to retry after a failed write.
    pub fn save_all(&mut self) -> Result<()> {
        self.store
            .save_all(&self.notes)
            .map_err(|e| StickItError::persist(None, e))
    }

    /// Returns a copy of every note, in creation order.
    pub fn get_all(&self) -> Vec<Note> {
        self.notes.clone()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Case-insensitive substring search over titles and contents.
    ///
    /// A blank query returns the whole collection.
    pub fn search(&self, query: &str) -> Vec<Note> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.get_all();
        }
        self.notes
            .iter()
            .filter(|n| n.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Highest stacking order on the board, or 0 when empty.
    pub fn max_z_index(&self) -> u32 {
        self.notes.iter().map(|n| n.z_index).max().unwrap_or(0)
    }

    /// The stacking order the next created note will receive.
    pub fn next_z_index(&self) -> u32 {
        self.next_z_index
    }

    /// Raises the note above every other one in memory and returns its new
    /// stacking order. Not persisted; the gesture that raised it persists on
    /// release.
    pub fn bring_to_front(&mut self, id: &str) -> Option<u32> {
        self.get(id)?;
        if self.max_z_index() == u32::MAX {
            self.compact_stacking();
        }
        let z = self.max_z_index() + 1;
        let note = self.notes.iter_mut().find(|n| n.id == id)?;
        note.z_index = z;
        self.next_z_index = self.next_z_index.max(z.saturating_add(1));
        Some(z)
    }

    /// Applies `patch` in memory only, leaving `modified` and the backend
    /// untouched. Used for in-progress drag and resize frames.
    pub(crate) fn preview(&mut self, id: &str, patch: NotePatch) -> bool {
        if !patch.is_finite() {
            return false;
        }
        match self.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                patch.apply_to(note);
                true
            }
            None => false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut NoteStore<S> {
        &mut self.store
    }
}
