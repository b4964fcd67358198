//! Top-level wiring of a board, its gestures, and its search box.
//!
//! [`StickItApp`] is what a front end holds. It owns the [`Board`], the
//! [`InteractionController`], and the [`SearchCoordinator`], handles the
//! board-level events itself (add-note button, board double-click, search
//! box, clock ticks) and forwards per-note events to the controller.

use crate::core::effect::Effect;
use crate::core::geometry::{Point, Viewport};
use crate::core::interaction::{HitTarget, InteractionController, PointerButton};
use crate::core::search::SearchCoordinator;
use crate::core::storage::KeyValueStore;
use crate::core::timer::Millis;
use crate::{Board, NoteColor, Result, StickItError};

/// Where the add-note button places the first note.
pub const BUTTON_NOTE_ORIGIN: Point = Point::new(100.0, 150.0);
/// Each further note from the button is shifted by this much on both axes.
pub const BUTTON_NOTE_CASCADE: f64 = 20.0;

pub struct StickItApp<S> {
    board: Board<S>,
    interaction: InteractionController,
    search: SearchCoordinator,
}

impl<S: KeyValueStore> StickItApp<S> {
    /// Loads the board stored in `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`StickItError::Storage`] if the backend cannot be read.
    pub fn open(backend: S, viewport: Viewport) -> Result<Self> {
        let board = Board::open(backend, viewport)?;
        log::info!("StickIt board opened with {} notes", board.len());
        Ok(Self {
            board,
            interaction: InteractionController::new(),
            search: SearchCoordinator::new(),
        })
    }

    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    /// Effects drawing every note, for the first paint.
    pub fn render_all(&self) -> Vec<Effect> {
        self.board
            .notes()
            .iter()
            .map(|note| Effect::ShowNote {
                note: note.clone(),
                appearing: false,
            })
            .collect()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.board.set_viewport(viewport);
    }

    // ── Board-level events ────────────────────────────────────────

    /// The toolbar button: cascades new notes down and right from a fixed origin.
    pub fn add_note_clicked(&mut self) -> Vec<Effect> {
        let offset = self.board.len() as f64 * BUTTON_NOTE_CASCADE;
        let position = Point::new(BUTTON_NOTE_ORIGIN.x + offset, BUTTON_NOTE_ORIGIN.y + offset);
        self.create_note(position)
    }

    /// A double-click on empty board space creates a note there.
    pub fn board_double_clicked(&mut self, point: Point) -> Vec<Effect> {
        self.create_note(point)
    }

    fn create_note(&mut self, position: Point) -> Vec<Effect> {
        let mut effects = Vec::new();
        let id = match self.board.create(Some(position)) {
            Ok(note) => note.id,
            Err(e) => {
                log::error!("failed to persist new note: {e}");
                effects.push(Effect::Notice {
                    message: e.user_message(),
                });
                match e {
                    StickItError::Persist {
                        note_id: Some(id), ..
                    } => id,
                    _ => return effects,
                }
            }
        };
        let Some(note) = self.board.get(&id) else {
            return effects;
        };
        effects.insert(
            0,
            Effect::ShowNote {
                note: note.clone(),
                appearing: true,
            },
        );
        effects.extend(self.interaction.enter_edit(&mut self.board, &id));
        effects.extend(self.search.refresh(&self.board));
        effects
    }

    pub fn search_input(&mut self, text: &str, now: Millis) -> Vec<Effect> {
        self.search.input(&self.board, text, now)
    }

    pub fn search_escape(&mut self) -> Vec<Effect> {
        self.search.escape(&self.board)
    }

    /// Advances every timer: search debounce, touch long-press, delete transitions.
    pub fn tick(&mut self, now: Millis) -> Vec<Effect> {
        let mut effects = self.interaction.tick(&mut self.board, now);
        effects.extend(self.search.poll(&self.board, now));
        effects
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Millis> {
        [self.interaction.next_deadline(), self.search.next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// A click anywhere on the page, `inside_note` naming the note it hit.
    pub fn document_click(&mut self, inside_note: Option<&str>) -> Vec<Effect> {
        self.interaction.document_click(&mut self.board, inside_note)
    }

    // ── Per-note events ───────────────────────────────────────────

    pub fn pointer_down(&mut self, id: &str, target: HitTarget, button: PointerButton, point: Point) -> Vec<Effect> {
        self.interaction
            .pointer_down(&mut self.board, id, target, button, point)
    }

    pub fn pointer_move(&mut self, point: Point) -> Vec<Effect> {
        self.interaction.pointer_move(&mut self.board, point)
    }

    pub fn pointer_up(&mut self) -> Vec<Effect> {
        self.interaction.pointer_up(&mut self.board)
    }

    pub fn cancel_gesture(&mut self) -> Vec<Effect> {
        self.interaction.cancel_gesture(&mut self.board)
    }

    pub fn touch_start(&mut self, id: &str, target: HitTarget, point: Point, now: Millis) -> Vec<Effect> {
        self.interaction
            .touch_start(&mut self.board, id, target, point, now)
    }

    pub fn touch_move(&mut self, point: Point) -> Vec<Effect> {
        self.interaction.touch_move(&mut self.board, point)
    }

    pub fn touch_end(&mut self, now: Millis) -> Vec<Effect> {
        self.interaction.touch_end(&mut self.board, now)
    }

    pub fn double_click(&mut self, id: &str, target: HitTarget) -> Vec<Effect> {
        self.interaction.double_click(&mut self.board, id, target)
    }

    pub fn edit_input(&mut self, id: &str, title: &str, content: &str) {
        self.interaction.edit_input(id, title, content);
    }

    pub fn title_enter(&self, id: &str) -> Vec<Effect> {
        self.interaction.title_enter(id)
    }

    /// The edited note's fields lost focus.
    pub fn edit_blur(&mut self, id: &str) -> Vec<Effect> {
        let mut effects = self.interaction.commit_edit(&mut self.board, id);
        effects.extend(self.search.refresh(&self.board));
        effects
    }

    pub fn edit_escape(&mut self, id: &str) -> Vec<Effect> {
        self.interaction.cancel_edit(id)
    }

    pub fn color_button_clicked(&mut self, id: &str) -> Vec<Effect> {
        self.interaction.open_color_picker(&self.board, id)
    }

    pub fn color_selected(&mut self, color: NoteColor) -> Vec<Effect> {
        self.interaction.select_color(&mut self.board, color)
    }

    pub fn delete_clicked(&mut self, id: &str) -> Vec<Effect> {
        self.interaction.request_delete(&self.board, id)
    }

    /// Answer to the delete confirmation prompt.
    pub fn delete_confirmed(&mut self, confirmed: bool, now: Millis) -> Vec<Effect> {
        let mut effects = self
            .interaction
            .resolve_delete(&mut self.board, confirmed, now);
        if confirmed {
            effects.extend(self.search.refresh(&self.board));
        }
        effects
    }
}
