use crate::core::board::DEFAULT_POSITION;
use crate::core::geometry::{Point, Size, DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH};
use crate::NoteColor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a freshly created note.
pub const DEFAULT_TITLE: &str = "New Note";

/// A single sticky note on the board.
///
/// Serialises in camelCase (`zIndex`), the stored record format. Fields
/// missing from a stored record take the values of [`Note::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: NoteColor,
    pub z_index: u32,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Note {
    /// Creates a default-sized, default-colored note at `position`.
    pub fn new(position: Point, z_index: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            x: position.x,
            y: position.y,
            width: DEFAULT_NOTE_WIDTH,
            height: DEFAULT_NOTE_HEIGHT,
            color: NoteColor::default(),
            z_index,
            created: now,
            modified: now,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Case-insensitive substring match on title or content.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// Stamps `modified`, never letting it fall behind `created`.
    pub(crate) fn touch(&mut self) {
        self.modified = Utc::now().max(self.created);
    }
}

/// A fresh note at the default position with stacking order 1.
impl Default for Note {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION, 1)
    }
}

/// A partial update to a note. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<NoteColor>,
    pub z_index: Option<u32>,
}

impl NotePatch {
    pub fn position(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Default::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
            ..Default::default()
        }
    }

    pub fn color(color: NoteColor) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_z_index(mut self, z_index: u32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `false` when any coordinate or size in the patch is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .into_iter()
            .flatten()
            .all(f64::is_finite)
    }

    pub(crate) fn apply_to(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(x) = self.x {
            note.x = x;
        }
        if let Some(y) = self.y {
            note.y = y;
        }
        if let Some(width) = self.width {
            note.width = width;
        }
        if let Some(height) = self.height {
            note.height = height;
        }
        if let Some(color) = self.color {
            note.color = color;
        }
        if let Some(z_index) = self.z_index {
            note.z_index = z_index;
        }
    }
}
