//! Board geometry: points, sizes, and the clamping rules that keep notes on
//! the visible board.

use serde::{Deserialize, Serialize};

/// Smallest width a note may be resized to.
pub const MIN_NOTE_WIDTH: f64 = 150.0;
/// Smallest height a note may be resized to.
pub const MIN_NOTE_HEIGHT: f64 = 100.0;
/// Width given to newly created notes.
pub const DEFAULT_NOTE_WIDTH: f64 = 200.0;
/// Height given to newly created notes.
pub const DEFAULT_NOTE_HEIGHT: f64 = 150.0;
/// Minimum left margin for a newly created note.
pub const CREATE_MARGIN_X: f64 = 50.0;
/// Minimum top margin for a newly created note; leaves room for the header.
pub const CREATE_MARGIN_Y: f64 = 100.0;

/// A position in board pixels, origin at the board's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_finite(self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// The visible board area notes live in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A usable board has finite, positive dimensions. The clamps below only
    /// guarantee finite results on such a board.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Places a new note's origin at least `CREATE_MARGIN_X`/`CREATE_MARGIN_Y`
    /// from the top-left and no further right/down than a default-sized note
    /// allows. On a board too small for both, the margins win.
    pub fn clamp_new_note(&self, requested: Point) -> Point {
        let max_x = self.width - DEFAULT_NOTE_WIDTH;
        let max_y = self.height - DEFAULT_NOTE_HEIGHT;
        Point::new(
            requested.x.min(max_x).max(CREATE_MARGIN_X),
            requested.y.min(max_y).max(CREATE_MARGIN_Y),
        )
    }

    /// Keeps a note of `size` fully inside the board while it is dragged.
    ///
    /// When the note is larger than the board the origin is pinned to zero.
    /// A NaN coordinate lands on zero.
    pub fn clamp_drag(&self, requested: Point, size: Size) -> Point {
        let max_x = (self.width - size.width).max(0.0);
        let max_y = (self.height - size.height).max(0.0);
        // f64::max/min drop a NaN operand, where f64::clamp would return it.
        Point::new(
            requested.x.max(0.0).min(max_x),
            requested.y.max(0.0).min(max_y),
        )
    }

    /// Bounds a resize from `origin`: never below the minimum note size, never
    /// past the board edge unless the minimum itself does not fit.
    pub fn clamp_resize(&self, origin: Point, requested: Size) -> Size {
        let max_width = self.width - origin.x;
        let max_height = self.height - origin.y;
        Size::new(
            requested.width.min(max_width).max(MIN_NOTE_WIDTH),
            requested.height.min(max_height).max(MIN_NOTE_HEIGHT),
        )
    }
}
