//! The fixed note palette.
//!
//! Colors serialize as their lowercase hex string (`"#ffeb3b"`), which is the
//! stored form in the notes record. A stored value outside the palette reads
//! back as [`NoteColor::Yellow`] so one bad field never discards the board.

use crate::StickItError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight colors a note can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
    Orange,
    Purple,
    Red,
    Teal,
}

impl NoteColor {
    /// Palette in display order; the first entry is the default for new notes.
    pub const PALETTE: [NoteColor; 8] = [
        NoteColor::Yellow,
        NoteColor::Pink,
        NoteColor::Blue,
        NoteColor::Green,
        NoteColor::Orange,
        NoteColor::Purple,
        NoteColor::Red,
        NoteColor::Teal,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            Self::Yellow => "#ffeb3b",
            Self::Pink => "#ff9ff3",
            Self::Blue => "#45b7d1",
            Self::Green => "#96ceb4",
            Self::Orange => "#feca57",
            Self::Purple => "#a55eea",
            Self::Red => "#ff6b6b",
            Self::Teal => "#4ecdc4",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Red => "red",
            Self::Teal => "teal",
        }
    }

    /// Looks a color up by hex value, case-insensitively.
    pub fn from_hex(hex: &str) -> Option<Self> {
        Self::PALETTE
            .into_iter()
            .find(|c| c.hex().eq_ignore_ascii_case(hex.trim()))
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

/// Accepts either a palette name (`"teal"`) or a hex value (`"#4ecdc4"`).
impl FromStr for NoteColor {
    type Err = StickItError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_hex(trimmed)
            .or_else(|| {
                Self::PALETTE
                    .into_iter()
                    .find(|c| c.name().eq_ignore_ascii_case(trimmed))
            })
            .ok_or_else(|| StickItError::InvalidColor(s.to_string()))
    }
}

impl From<NoteColor> for String {
    fn from(color: NoteColor) -> Self {
        color.hex().to_string()
    }
}

impl From<String> for NoteColor {
    fn from(value: String) -> Self {
        Self::from_hex(&value).unwrap_or_else(|| {
            log::warn!("stored note color {value:?} is not in the palette, using default");
            Self::default()
        })
    }
}
