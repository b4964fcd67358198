//! Internal domain modules for the StickIt core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod app;
pub mod board;
pub mod color;
pub mod effect;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod note;
pub mod search;
pub mod storage;
pub mod timer;

#[doc(inline)]
pub use app::StickItApp;
#[doc(inline)]
pub use board::Board;
#[doc(inline)]
pub use color::NoteColor;
#[doc(inline)]
pub use effect::{Effect, Visibility};
#[doc(inline)]
pub use error::{Result, StickItError, StorageError};
#[doc(inline)]
pub use geometry::{Point, Size, Viewport};
#[doc(inline)]
pub use interaction::{HitTarget, InteractionController, NoteMode, PointerButton};
#[doc(inline)]
pub use note::{Note, NotePatch};
#[doc(inline)]
pub use search::SearchCoordinator;
#[doc(inline)]
pub use storage::{KeyValueStore, MemoryStore, NoteStore, SqliteStore};
