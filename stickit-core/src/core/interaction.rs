//! Pointer and touch gestures on notes.
//!
//! Each note is in exactly one [`NoteMode`]. Drag and resize are pointer
//! gestures: starting one creates a [`PointerCapture`], the explicit
//! subscription through which move and release events are routed, and the
//! capture is dropped on every release or cancel. At most one capture exists
//! on the board. Editing, the color picker overlay, touch long-press and
//! double-tap detection, and delete confirmation live here as well.
//!
//! Movement frames only change the in-memory note; the final geometry is
//! persisted through [`Board::update`] once, on release.

use crate::core::effect::Effect;
use crate::core::geometry::{Point, Size, Viewport};
use crate::core::storage::KeyValueStore;
use crate::core::timer::{Deadline, DeadlineSet, Millis};
use crate::{Board, Note, NoteColor, NotePatch};
use std::collections::HashMap;

/// How long a touch must be held to open the color picker.
pub const LONG_PRESS_MS: Millis = 500;
/// Touch movement beyond this many pixels cancels a pending long-press.
pub const LONG_PRESS_TOLERANCE_PX: f64 = 10.0;
/// Touches shorter than this count as taps.
pub const TAP_MAX_MS: Millis = 300;
/// Two taps closer than this are treated as one bounce.
pub const DOUBLE_TAP_MIN_MS: Millis = 50;
/// Two taps further apart than this are separate taps.
pub const DOUBLE_TAP_MAX_MS: Millis = 500;
/// Duration of a deleted note's exit transition.
pub const EXIT_TRANSITION_MS: Millis = 300;
/// Title used when an edit leaves the title blank.
pub const UNTITLED: &str = "Untitled";

const PICKER_WIDTH: f64 = 120.0;
const PICKER_HEIGHT: f64 = 80.0;
const PICKER_GAP: f64 = 10.0;
const PICKER_MIN_OFFSET: f64 = 10.0;

/// The part of a note a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Body,
    Title,
    Content,
    ColorButton,
    DeleteButton,
    ResizeHandle,
}

impl HitTarget {
    /// Double-clicks on these enter edit mode; controls never do.
    fn starts_edit(self) -> bool {
        matches!(self, Self::Body | Self::Title | Self::Content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteMode {
    Idle,
    Dragging,
    Resizing,
    Editing,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Drag {
        offset: Point,
        origin: Point,
        original_z: u32,
        z_index: u32,
    },
    Resize { start_pointer: Point, start_size: Size },
}

/// An active drag or resize subscription on one note.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerCapture {
    note_id: String,
    source: InputSource,
    gesture: Gesture,
}

impl PointerCapture {
    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    pub fn source(&self) -> InputSource {
        self.source
    }

    pub fn mode(&self) -> NoteMode {
        match self.gesture {
            Gesture::Drag { .. } => NoteMode::Dragging,
            Gesture::Resize { .. } => NoteMode::Resizing,
        }
    }
}

#[derive(Debug, Clone)]
struct EditSession {
    note_id: String,
    original_title: String,
    original_content: String,
    draft_title: String,
    draft_content: String,
}

#[derive(Debug, Clone)]
struct TouchTrack {
    note_id: String,
    start: Point,
    started_at: Millis,
    moved: bool,
    long_pressed: bool,
}

#[derive(Debug, Clone)]
struct ColorPicker {
    note_id: String,
}

/// Gesture state for every note on a board.
#[derive(Debug, Default)]
pub struct InteractionController {
    capture: Option<PointerCapture>,
    editing: Option<EditSession>,
    picker: Option<ColorPicker>,
    touch: Option<TouchTrack>,
    long_press: Deadline<String>,
    last_tap: HashMap<String, Millis>,
    pending_delete: Option<String>,
    leaving: DeadlineSet<String>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self, id: &str) -> NoteMode {
        if let Some(capture) = self.capture.as_ref().filter(|c| c.note_id == id) {
            return capture.mode();
        }
        if self.editing.as_ref().is_some_and(|e| e.note_id == id) {
            return NoteMode::Editing;
        }
        NoteMode::Idle
    }

    pub fn capture(&self) -> Option<&PointerCapture> {
        self.capture.as_ref()
    }

    pub fn has_capture(&self) -> bool {
        self.capture.is_some()
    }

    pub fn editing_note(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.note_id.as_str())
    }

    pub fn color_picker_note(&self) -> Option<&str> {
        self.picker.as_ref().map(|p| p.note_id.as_str())
    }

    pub fn is_leaving(&self, id: &str) -> bool {
        self.leaving.contains(&id.to_string())
    }

    // ── Pointer ───────────────────────────────────────────────────

    /// A mouse button went down on `target` of note `id`.
    pub fn pointer_down<S: KeyValueStore>(
        &mut self,
        board: &mut Board<S>,
        id: &str,
        target: HitTarget,
        button: PointerButton,
        point: Point,
    ) -> Vec<Effect> {
        match (button, target) {
            (PointerButton::Secondary, _) => self.open_color_picker(board, id),
            (PointerButton::Primary, HitTarget::ResizeHandle) => {
                self.begin_resize(board, id, point, InputSource::Mouse)
            }
            (PointerButton::Primary, HitTarget::Body) => {
                self.begin_drag(board, id, point, InputSource::Mouse)
            }
            _ => Vec::new(),
        }
    }

    /// The captured pointer moved. Ignored without a capture or when the
    /// point is not finite.
    pub fn pointer_move<S: KeyValueStore>(&mut self, board: &mut Board<S>, point: Point) -> Vec<Effect> {
        if !point.is_finite() {
            return Vec::new();
        }
        let Some(capture) = self.capture.as_ref() else {
            return Vec::new();
        };
        let id = capture.note_id.clone();
        let Some(note) = board.get(&id) else {
            return Vec::new();
        };
        let viewport = board.viewport();

        match capture.gesture {
            Gesture::Drag { offset, .. } => {
                let requested = Point::new(point.x - offset.x, point.y - offset.y);
                let p = viewport.clamp_drag(requested, note.size());
                board.preview(&id, NotePatch::position(p));
                vec![Effect::Move { id, x: p.x, y: p.y }]
            }
            Gesture::Resize {
                start_pointer,
                start_size,
            } => {
                let requested = Size::new(
                    start_size.width + (point.x - start_pointer.x),
                    start_size.height + (point.y - start_pointer.y),
                );
                let size = viewport.clamp_resize(note.position(), requested);
                board.preview(&id, NotePatch::size(size));
                vec![Effect::Resize {
                    id,
                    width: size.width,
                    height: size.height,
                }]
            }
        }
    }

    /// The captured pointer was released: persist the gesture's result and
    /// drop the capture.
    pub fn pointer_up<S: KeyValueStore>(&mut self, board: &mut Board<S>) -> Vec<Effect> {
        let Some(capture) = self.capture.take() else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        let id = capture.note_id;
        let Some(note) = board.get(&id) else {
            return effects;
        };

        match capture.gesture {
            Gesture::Drag { z_index, .. } => {
                let patch = NotePatch::position(note.position()).with_z_index(z_index);
                log::debug!("drag of {id} ended at ({}, {})", note.x, note.y);
                effects.push(Effect::SetDragging {
                    id: id.clone(),
                    active: false,
                });
                persist(board, &id, patch, &mut effects);
            }
            Gesture::Resize { .. } => {
                let patch = NotePatch::size(note.size());
                log::debug!("resize of {id} ended at {}x{}", note.width, note.height);
                effects.push(Effect::SetResizing {
                    id: id.clone(),
                    active: false,
                });
                persist(board, &id, patch, &mut effects);
            }
        }
        effects
    }

    /// Abandons the active gesture without persisting, restoring the note's
    /// geometry from before the gesture.
    pub fn cancel_gesture<S: KeyValueStore>(&mut self, board: &mut Board<S>) -> Vec<Effect> {
        let Some(capture) = self.capture.take() else {
            return Vec::new();
        };
        self.long_press.cancel();
        let id = capture.note_id;
        if board.get(&id).is_none() {
            return Vec::new();
        }

        match capture.gesture {
            Gesture::Drag {
                origin, original_z, ..
            } => {
                board.preview(&id, NotePatch::position(origin).with_z_index(original_z));
                vec![
                    Effect::Move {
                        id: id.clone(),
                        x: origin.x,
                        y: origin.y,
                    },
                    Effect::Raise {
                        id: id.clone(),
                        z_index: original_z,
                    },
                    Effect::SetDragging { id, active: false },
                ]
            }
            Gesture::Resize { start_size, .. } => {
                board.preview(&id, NotePatch::size(start_size));
                vec![
                    Effect::Resize {
                        id: id.clone(),
                        width: start_size.width,
                        height: start_size.height,
                    },
                    Effect::SetResizing { id, active: false },
                ]
            }
        }
    }

    fn begin_drag<S: KeyValueStore>(
        &mut self,
        board: &mut Board<S>,
        id: &str,
        point: Point,
        source: InputSource,
    ) -> Vec<Effect> {
        if self.capture.is_some() || self.mode(id) != NoteMode::Idle || !point.is_finite() {
            return Vec::new();
        }
        let Some((origin, original_z)) = board.get(id).map(|n| (n.position(), n.z_index)) else {
            return Vec::new();
        };
        let Some(z_index) = board.bring_to_front(id) else {
            return Vec::new();
        };
        log::debug!("drag of {id} started");

        self.capture = Some(PointerCapture {
            note_id: id.to_string(),
            source,
            gesture: Gesture::Drag {
                offset: Point::new(point.x - origin.x, point.y - origin.y),
                origin,
                original_z,
                z_index,
            },
        });
        vec![
            Effect::SetDragging {
                id: id.to_string(),
                active: true,
            },
            Effect::Raise {
                id: id.to_string(),
                z_index,
            },
        ]
    }

    fn begin_resize<S: KeyValueStore>(
        &mut self,
        board: &Board<S>,
        id: &str,
        point: Point,
        source: InputSource,
    ) -> Vec<Effect> {
        if self.capture.is_some() || !point.is_finite() {
            return Vec::new();
        }
        let Some(note) = board.get(id) else {
            return Vec::new();
        };
        log::debug!("resize of {id} started");

        self.capture = Some(PointerCapture {
            note_id: id.to_string(),
            source,
            gesture: Gesture::Resize {
                start_pointer: point,
                start_size: note.size(),
            },
        });
        vec![Effect::SetResizing {
            id: id.to_string(),
            active: true,
        }]
    }

    // ── Touch ─────────────────────────────────────────────────────

    pub fn touch_start<S: KeyValueStore>(
        &mut self,
        board: &mut Board<S>,
        id: &str,
        target: HitTarget,
        point: Point,
        now: Millis,
    ) -> Vec<Effect> {
        match target {
            HitTarget::ResizeHandle => self.begin_resize(board, id, point, InputSource::Touch),
            HitTarget::Body => {
                if self.mode(id) != NoteMode::Idle || board.get(id).is_none() || !point.is_finite() {
                    return Vec::new();
                }
                self.touch = Some(TouchTrack {
                    note_id: id.to_string(),
                    start: point,
                    started_at: now,
                    moved: false,
                    long_pressed: false,
                });
                self.long_press.schedule(now, LONG_PRESS_MS, id.to_string());
                self.begin_drag(board, id, point, InputSource::Touch)
            }
            _ => Vec::new(),
        }
    }

    pub fn touch_move<S: KeyValueStore>(&mut self, board: &mut Board<S>, point: Point) -> Vec<Effect> {
        if !point.is_finite() {
            return Vec::new();
        }
        if let Some(touch) = self.touch.as_mut() {
            if touch.start.distance_to(point) > LONG_PRESS_TOLERANCE_PX {
                touch.moved = true;
                self.long_press.cancel();
            }
        }
        self.pointer_move(board, point)
    }

    pub fn touch_end<S: KeyValueStore>(&mut self, board: &mut Board<S>, now: Millis) -> Vec<Effect> {
        self.long_press.cancel();
        let mut effects = self.pointer_up(board);

        let Some(touch) = self.touch.take() else {
            return effects;
        };
        let is_tap = !touch.moved
            && !touch.long_pressed
            && now.saturating_sub(touch.started_at) < TAP_MAX_MS;
        if !is_tap {
            return effects;
        }

        let id = touch.note_id;
        let since_last = self
            .last_tap
            .get(&id)
            .map(|last| now.saturating_sub(*last));
        match since_last {
            Some(gap) if gap > DOUBLE_TAP_MIN_MS && gap < DOUBLE_TAP_MAX_MS => {
                self.last_tap.remove(&id);
                effects.extend(self.enter_edit(board, &id));
            }
            _ => {
                self.last_tap.insert(id, now);
            }
        }
        effects
    }

    // ── Editing ───────────────────────────────────────────────────

    /// A double-click landed on note `id`.
    pub fn double_click<S: KeyValueStore>(
        &mut self,
        board: &mut Board<S>,
        id: &str,
        target: HitTarget,
    ) -> Vec<Effect> {
        if !target.starts_edit() {
            return Vec::new();
        }
        self.enter_edit(board, id)
    }

    /// Puts note `id` into edit mode, committing any other note being edited.
    pub fn enter_edit<S: KeyValueStore>(&mut self, board: &mut Board<S>, id: &str) -> Vec<Effect> {
        if self.capture.as_ref().is_some_and(|c| c.note_id == id) {
            return Vec::new();
        }
        if self.editing_note() == Some(id) {
            return Vec::new();
        }
        let Some(note) = board.get(id) else {
            return Vec::new();
        };
        let session = EditSession {
            note_id: id.to_string(),
            original_title: note.title.clone(),
            original_content: note.content.clone(),
            draft_title: note.title.clone(),
            draft_content: note.content.clone(),
        };

        let mut effects = Vec::new();
        if let Some(other) = self.editing_note().map(str::to_string) {
            effects.extend(self.commit_edit(board, &other));
        }
        self.editing = Some(session);
        log::debug!("editing {id}");
        effects.push(Effect::BeginEditing { id: id.to_string() });
        effects
    }

    fn take_session(&mut self, id: &str) -> Option<EditSession> {
        if self.editing_note() != Some(id) {
            return None;
        }
        self.editing.take()
    }

    /// Records what the user has typed so far.
    pub fn edit_input(&mut self, id: &str, title: &str, content: &str) {
        if let Some(session) = self.editing.as_mut().filter(|e| e.note_id == id) {
            session.draft_title = title.to_string();
            session.draft_content = content.to_string();
        }
    }

    /// Enter in the title field moves focus to the content field.
    pub fn title_enter(&self, id: &str) -> Vec<Effect> {
        if self.editing_note() != Some(id) {
            return Vec::new();
        }
        vec![Effect::FocusContent { id: id.to_string() }]
    }

    /// Leaves edit mode keeping the draft. The title is trimmed, a blank title
    /// becomes "Untitled", and the note is persisted only if something changed.
    pub fn commit_edit<S: KeyValueStore>(&mut self, board: &mut Board<S>, id: &str) -> Vec<Effect> {
        let Some(session) = self.take_session(id) else {
            return Vec::new();
        };
        let title = match session.draft_title.trim() {
            "" => UNTITLED.to_string(),
            trimmed => trimmed.to_string(),
        };
        let content = session.draft_content;

        let mut effects = vec![Effect::EndEditing { id: id.to_string() }];
        if title == session.original_title && content == session.original_content {
            return effects;
        }
        effects.push(Effect::SetText {
            id: id.to_string(),
            title: title.clone(),
            content: content.clone(),
        });
        persist(board, id, NotePatch::text(title, content), &mut effects);
        effects
    }

    /// Leaves edit mode restoring the texts the note had when editing began.
    pub fn cancel_edit(&mut self, id: &str) -> Vec<Effect> {
        let Some(session) = self.take_session(id) else {
            return Vec::new();
        };
        vec![
            Effect::SetText {
                id: id.to_string(),
                title: session.original_title,
                content: session.original_content,
            },
            Effect::EndEditing { id: id.to_string() },
        ]
    }

    /// A click anywhere on the page. `inside_note` names the note the click
    /// landed in, if any. Dismisses the color picker and commits an edit when
    /// the click fell outside the edited note.
    pub fn document_click<S: KeyValueStore>(
        &mut self,
        board: &mut Board<S>,
        inside_note: Option<&str>,
    ) -> Vec<Effect> {
        let mut effects = self.dismiss_color_picker();
        if let Some(editing) = self.editing_note().map(str::to_string) {
            if inside_note != Some(editing.as_str()) {
                effects.extend(self.commit_edit(board, &editing));
            }
        }
        effects
    }

    // ── Color picker ──────────────────────────────────────────────

    /// Opens the palette next to note `id`, replacing any open picker.
    pub fn open_color_picker<S: KeyValueStore>(&mut self, board: &Board<S>, id: &str) -> Vec<Effect> {
        let Some(note) = board.get(id) else {
            return Vec::new();
        };
        let mut effects = self.dismiss_color_picker();
        effects.push(Effect::ShowColorPicker {
            id: id.to_string(),
            anchor: picker_anchor(note, board.viewport()),
            selected: note.color,
        });
        self.picker = Some(ColorPicker {
            note_id: id.to_string(),
        });
        effects
    }

    /// Applies `color` to the note the picker was opened for.
    pub fn select_color<S: KeyValueStore>(&mut self, board: &mut Board<S>, color: NoteColor) -> Vec<Effect> {
        let Some(picker) = self.picker.take() else {
            return Vec::new();
        };
        let id = picker.note_id;
        let mut effects = vec![Effect::HideColorPicker];
        if board.get(&id).is_none() {
            return effects;
        }
        effects.push(Effect::Recolor {
            id: id.clone(),
            color,
        });
        persist(board, &id, NotePatch::color(color), &mut effects);
        effects
    }

    pub fn dismiss_color_picker(&mut self) -> Vec<Effect> {
        match self.picker.take() {
            Some(_) => vec![Effect::HideColorPicker],
            None => Vec::new(),
        }
    }

    // ── Delete ────────────────────────────────────────────────────

    /// The delete button was pressed; asks for confirmation.
    pub fn request_delete<S: KeyValueStore>(&mut self, board: &Board<S>, id: &str) -> Vec<Effect> {
        if board.get(id).is_none() {
            return Vec::new();
        }
        self.pending_delete = Some(id.to_string());
        vec![Effect::ConfirmDelete { id: id.to_string() }]
    }

    /// The user answered the confirmation prompt.
    ///
    /// On confirm the note leaves the board immediately and its visual is
    /// removed after [`EXIT_TRANSITION_MS`].
    pub fn resolve_delete<S: KeyValueStore>(
        &mut self,
        board: &mut Board<S>,
        confirmed: bool,
        now: Millis,
    ) -> Vec<Effect> {
        let Some(id) = self.pending_delete.take() else {
            return Vec::new();
        };
        if !confirmed {
            return Vec::new();
        }
        self.forget(&id);

        let mut effects = Vec::new();
        match board.delete(&id) {
            Ok(false) => return effects,
            Ok(true) => {}
            Err(e) => {
                log::error!("failed to persist deletion of {id}: {e}");
                effects.push(Effect::Notice {
                    message: e.user_message(),
                });
            }
        }
        effects.insert(0, Effect::FadeOut { id: id.clone() });
        self.leaving.schedule(now, EXIT_TRANSITION_MS, id);
        effects
    }

    /// Drops every piece of gesture state held for note `id`.
    fn forget(&mut self, id: &str) {
        if self.capture.as_ref().is_some_and(|c| c.note_id == id) {
            self.capture = None;
        }
        if self.editing_note() == Some(id) {
            self.editing = None;
        }
        if self.color_picker_note() == Some(id) {
            self.picker = None;
        }
        if self.touch.as_ref().is_some_and(|t| t.note_id == id) {
            self.touch = None;
            self.long_press.cancel();
        }
        self.last_tap.remove(id);
    }

    // ── Timers ────────────────────────────────────────────────────

    /// Fires whatever timers are due: the touch long-press and the end of
    /// delete transitions.
    ///
    /// A long press replaces the drag its touch started: the drag is
    /// abandoned without persisting before the color picker opens.
    pub fn tick<S: KeyValueStore>(&mut self, board: &mut Board<S>, now: Millis) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(id) = self.long_press.fire(now) {
            let still_down = self.touch.as_mut().filter(|t| t.note_id == id);
            if let Some(touch) = still_down {
                touch.long_pressed = true;
                effects.push(Effect::Haptic);
                if self.capture.as_ref().is_some_and(|c| c.note_id == id) {
                    effects.extend(self.cancel_gesture(board));
                }
                effects.extend(self.open_color_picker(board, &id));
            }
        }

        effects.extend(
            self.leaving
                .fire(now)
                .into_iter()
                .map(|id| Effect::RemoveNote { id }),
        );
        effects
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Millis> {
        match (self.long_press.due_at(), self.leaving.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn persist<S: KeyValueStore>(board: &mut Board<S>, id: &str, patch: NotePatch, effects: &mut Vec<Effect>) {
    if let Err(e) = board.update(id, patch) {
        log::error!("failed to persist note {id}: {e}");
        effects.push(Effect::Notice {
            message: e.user_message(),
        });
    }
}

/// Places the color picker right of the note, flipping left or up when it
/// would leave the board.
fn picker_anchor(note: &Note, viewport: Viewport) -> Point {
    let mut x = note.x + note.width + PICKER_GAP;
    let mut y = note.y;
    if x + PICKER_WIDTH > viewport.width {
        x = note.x - PICKER_WIDTH - PICKER_GAP;
    }
    if y + PICKER_HEIGHT > viewport.height {
        y = note.y + note.height - PICKER_HEIGHT;
    }
    Point::new(x.max(PICKER_MIN_OFFSET), y.max(PICKER_MIN_OFFSET))
}
