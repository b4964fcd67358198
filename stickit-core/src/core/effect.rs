//! Render instructions returned to the host.
//!
//! The core never touches a DOM. Every handler returns the list of visual
//! changes the front end must apply, in order. Effects serialize as tagged
//! camelCase objects (`{"type": "move", "id": "...", "x": 10, "y": 20}`) so a
//! web front end can consume them directly.

use crate::core::geometry::Point;
use crate::{Note, NoteColor};
use serde::Serialize;

/// How a note is shown while a search is, or is not, active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    /// No search is active.
    Normal,
    /// Matches the active search; shown and highlighted.
    Match,
    /// Does not match the active search.
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Effect {
    /// Draw a note that was not on screen before (initial load or creation).
    ShowNote { note: Note, appearing: bool },
    Move { id: String, x: f64, y: f64 },
    Resize { id: String, width: f64, height: f64 },
    Raise { id: String, z_index: u32 },
    SetDragging { id: String, active: bool },
    SetResizing { id: String, active: bool },
    /// Enter edit mode: fields editable, title focused with text selected.
    BeginEditing { id: String },
    FocusContent { id: String },
    /// Leave edit mode: fields read-only again.
    EndEditing { id: String },
    /// Show these texts in the note's fields.
    SetText { id: String, title: String, content: String },
    ShowColorPicker { id: String, anchor: Point, selected: NoteColor },
    HideColorPicker,
    Recolor { id: String, color: NoteColor },
    /// Ask the user to confirm deleting the note.
    ConfirmDelete { id: String },
    /// Start the exit transition of a deleted note.
    FadeOut { id: String },
    /// Remove the note's visual after its exit transition.
    RemoveNote { id: String },
    /// Short vibration on devices that support it.
    Haptic,
    SetVisibility { id: String, visibility: Visibility },
    /// The "X of Y notes" label; `None` hides it.
    SearchStats { label: Option<String> },
    /// Show or hide the "no notes found" indicator.
    NoResults { visible: bool },
    /// Blocking notice, used for storage failures.
    Notice { message: String },
}
