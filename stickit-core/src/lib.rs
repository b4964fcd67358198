//! Core library for StickIt, a board of draggable sticky notes.
//!
//! The primary entry point is [`StickItApp`], which owns a [`Board`] of notes
//! together with the gesture and search state a front end drives. Handlers
//! never draw anything themselves; they return [`Effect`]s for the host to
//! apply.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    app::StickItApp,
    board::Board,
    color::NoteColor,
    effect::{Effect, Visibility},
    error::{Result, StickItError, StorageError},
    geometry::{Point, Size, Viewport},
    interaction::{HitTarget, InputSource, InteractionController, NoteMode, PointerButton, PointerCapture},
    note::{Note, NotePatch},
    search::{SearchCoordinator, SearchState},
    storage::{KeyValueStore, MemoryStore, NoteStore, SqliteStore},
    timer::Millis,
};
