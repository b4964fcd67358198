//! The operations behind each `stickit` subcommand.
//!
//! Every command works on a [`Board`] and writes its report to `out`, so the
//! same code runs against the SQLite store in `main` and a memory store in
//! tests.

use std::io::{BufRead, Write};
use std::str::FromStr;

use stickit_core::core::board::DEFAULT_POSITION;
use stickit_core::core::interaction::UNTITLED;
use stickit_core::{Board, KeyValueStore, Note, NoteColor, NotePatch, Point, Size, StickItError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] StickItError),

    #[error("No note matches id {0:?}")]
    NoSuchNote(String),

    #[error("Id {0:?} matches more than one note")]
    AmbiguousId(String),

    #[error("{0} must be a finite number")]
    InvalidNumber(&'static str),

    #[error("Board size {0}x{1} must be positive and finite")]
    InvalidBoardSize(f64, f64),

    #[error("Deletion cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Text shown to the user; core errors use their own user-facing message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;

/// Resolves a full id or a unique prefix of one.
pub fn resolve_id<S: KeyValueStore>(board: &Board<S>, prefix: &str) -> CliResult<String> {
    let prefix = prefix.trim();
    if let Some(note) = board.get(prefix) {
        return Ok(note.id.clone());
    }
    let mut candidates = board
        .notes()
        .iter()
        .filter(|n| !prefix.is_empty() && n.id.starts_with(prefix));
    match (candidates.next(), candidates.next()) {
        (Some(note), None) => Ok(note.id.clone()),
        (Some(_), Some(_)) => Err(CliError::AmbiguousId(prefix.to_string())),
        (None, _) => Err(CliError::NoSuchNote(prefix.to_string())),
    }
}

fn finite(name: &'static str, value: f64) -> CliResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CliError::InvalidNumber(name))
    }
}

fn normalize_title(title: &str) -> String {
    match title.trim() {
        "" => UNTITLED.to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn write_notes(notes: &[Note], json: bool, out: &mut impl Write) -> CliResult<()> {
    if json {
        let body = serde_json::to_string_pretty(notes).map_err(StickItError::from)?;
        writeln!(out, "{body}")?;
        return Ok(());
    }
    for note in notes {
        writeln!(
            out,
            "{}  {:<6}  z{:<3}  ({:.0}, {:.0})  {:.0}x{:.0}  {}",
            note.id,
            note.color.name(),
            note.z_index,
            note.x,
            note.y,
            note.width,
            note.height,
            note.title
        )?;
    }
    Ok(())
}

/// Prints every note in stacking order, bottom first.
pub fn list<S: KeyValueStore>(board: &Board<S>, json: bool, out: &mut impl Write) -> CliResult<()> {
    let mut notes = board.get_all();
    notes.sort_by_key(|n| n.z_index);
    write_notes(&notes, json, out)
}

pub fn add<S: KeyValueStore>(
    board: &mut Board<S>,
    x: Option<f64>,
    y: Option<f64>,
    title: Option<&str>,
    content: Option<&str>,
    out: &mut impl Write,
) -> CliResult<Note> {
    let x = x.map(|v| finite("x", v)).transpose()?;
    let y = y.map(|v| finite("y", v)).transpose()?;
    let position = match (x, y) {
        (None, None) => None,
        (x, y) => Some(Point::new(
            x.unwrap_or(DEFAULT_POSITION.x),
            y.unwrap_or(DEFAULT_POSITION.y),
        )),
    };
    let note = board.create(position)?;
    if title.is_some() || content.is_some() {
        let title = title.map_or_else(|| note.title.clone(), normalize_title);
        let content = content.unwrap_or_default();
        board.update(&note.id, NotePatch::text(title, content))?;
    }
    let note = board.get(&note.id).cloned().unwrap_or(note);
    writeln!(out, "{}", note.id)?;
    Ok(note)
}

pub fn edit<S: KeyValueStore>(
    board: &mut Board<S>,
    id: &str,
    title: Option<&str>,
    content: Option<&str>,
) -> CliResult<Note> {
    let id = resolve_id(board, id)?;
    let Some(note) = board.get(&id) else {
        return Err(CliError::NoSuchNote(id));
    };
    let title = title.map_or_else(|| note.title.clone(), normalize_title);
    let content = content.map_or_else(|| note.content.clone(), str::to_string);
    if title != note.title || content != note.content {
        board.update(&id, NotePatch::text(title, content))?;
    }
    fetch(board, id)
}

/// Moves a note as a drag would: clamped to the board and raised to the front.
pub fn move_note<S: KeyValueStore>(board: &mut Board<S>, id: &str, x: f64, y: f64) -> CliResult<Note> {
    let (x, y) = (finite("x", x)?, finite("y", y)?);
    let id = resolve_id(board, id)?;
    let Some(note) = board.get(&id) else {
        return Err(CliError::NoSuchNote(id));
    };
    let position = board.viewport().clamp_drag(Point::new(x, y), note.size());
    let mut patch = NotePatch::position(position);
    if let Some(z_index) = board.bring_to_front(&id) {
        patch = patch.with_z_index(z_index);
    }
    board.update(&id, patch)?;
    fetch(board, id)
}

pub fn resize<S: KeyValueStore>(board: &mut Board<S>, id: &str, width: f64, height: f64) -> CliResult<Note> {
    let size = Size::new(finite("width", width)?, finite("height", height)?);
    let id = resolve_id(board, id)?;
    let Some(note) = board.get(&id) else {
        return Err(CliError::NoSuchNote(id));
    };
    let size = board.viewport().clamp_resize(note.position(), size);
    board.update(&id, NotePatch::size(size))?;
    fetch(board, id)
}

pub fn color<S: KeyValueStore>(board: &mut Board<S>, id: &str, color: &str) -> CliResult<Note> {
    let id = resolve_id(board, id)?;
    let color = NoteColor::from_str(color)?;
    board.update(&id, NotePatch::color(color))?;
    fetch(board, id)
}

/// Deletes a note, asking on `input` first unless `assume_yes`.
pub fn delete<S: KeyValueStore>(
    board: &mut Board<S>,
    id: &str,
    assume_yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> CliResult<()> {
    let id = resolve_id(board, id)?;
    if !assume_yes {
        let title = board.get(&id).map(|n| n.title.clone()).unwrap_or_default();
        write!(out, "Delete note \"{title}\"? [y/N] ")?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            return Err(CliError::Cancelled);
        }
    }
    board.delete(&id)?;
    writeln!(out, "Deleted {id}")?;
    Ok(())
}

/// Prints the matching notes followed by the "X of Y notes" summary.
pub fn search<S: KeyValueStore>(board: &Board<S>, query: &str, json: bool, out: &mut impl Write) -> CliResult<()> {
    let mut found = board.search(query);
    found.sort_by_key(|n| n.z_index);
    write_notes(&found, json, out)?;
    if !json {
        if found.is_empty() {
            writeln!(out, "No notes found")?;
        }
        writeln!(out, "{} of {} notes", found.len(), board.len())?;
    }
    Ok(())
}

pub fn palette(out: &mut impl Write) -> CliResult<()> {
    for color in NoteColor::PALETTE {
        writeln!(out, "{:<6}  {}", color.name(), color.hex())?;
    }
    Ok(())
}

fn fetch<S: KeyValueStore>(board: &Board<S>, id: String) -> CliResult<Note> {
    board.get(&id).cloned().ok_or(CliError::NoSuchNote(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stickit_core::{MemoryStore, StorageError, Viewport};

    fn board() -> Board<MemoryStore> {
        Board::new(MemoryStore::new(), Viewport::new(800.0, 600.0))
    }

    fn reloaded(board: &Board<MemoryStore>) -> Board<MemoryStore> {
        Board::open(board.store().backend().clone(), board.viewport()).unwrap()
    }

    #[test]
    fn test_add_with_text_and_position() {
        let mut board = board();
        let mut out = Vec::new();
        let note = add(&mut board, Some(300.0), None, Some("  Groceries "), Some("milk"), &mut out).unwrap();

        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk");
        assert_eq!(note.position(), Point::new(300.0, DEFAULT_POSITION.y));
        assert_eq!(String::from_utf8(out).unwrap().trim(), note.id);
        assert_eq!(reloaded(&board).get(&note.id).unwrap().title, "Groceries");
    }

    #[test]
    fn test_add_clamps_into_margins() {
        let mut board = board();
        let note = add(&mut board, Some(0.0), Some(0.0), None, None, &mut Vec::new()).unwrap();
        assert_eq!(note.position(), Point::new(50.0, 100.0));
        assert_eq!(note.title, "New Note");
    }

    #[test]
    fn test_resolve_id_prefix() {
        let mut board = board();
        let a = board.create(None).unwrap().id;
        let b = board.create(None).unwrap().id;

        assert_eq!(resolve_id(&board, &a[..8]).unwrap(), a);
        assert_eq!(resolve_id(&board, &b).unwrap(), b);
        assert!(matches!(resolve_id(&board, "zzz"), Err(CliError::NoSuchNote(_))));
        assert!(matches!(resolve_id(&board, ""), Err(CliError::NoSuchNote(_))));
    }

    #[test]
    fn test_edit_blank_title_becomes_untitled() {
        let mut board = board();
        let id = board.create(None).unwrap().id;

        let note = edit(&mut board, &id, Some("   "), Some("body")).unwrap();
        assert_eq!(note.title, UNTITLED);
        assert_eq!(note.content, "body");

        let note = edit(&mut board, &id, None, Some("changed")).unwrap();
        assert_eq!(note.title, UNTITLED);
        assert_eq!(reloaded(&board).get(&id).unwrap().content, "changed");
    }

    #[test]
    fn test_move_clamps_and_raises() {
        let mut board = board();
        let a = board.create(None).unwrap().id;
        board.create(None).unwrap();

        let note = move_note(&mut board, &a, 10_000.0, -50.0).unwrap();
        assert_eq!(note.position(), Point::new(600.0, 0.0));
        assert_eq!(note.z_index, 3);
        assert_eq!(reloaded(&board).get(&a).unwrap().z_index, 3);
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let mut board = board();
        let a = board.create(None).unwrap().id;
        board.create(None).unwrap();

        assert!(matches!(
            move_note(&mut board, &a, f64::NAN, 40.0),
            Err(CliError::InvalidNumber("x"))
        ));
        assert!(matches!(
            resize(&mut board, &a, 300.0, f64::INFINITY),
            Err(CliError::InvalidNumber("height"))
        ));
        assert!(matches!(
            add(&mut board, None, Some(f64::NAN), None, None, &mut Vec::new()),
            Err(CliError::InvalidNumber("y"))
        ));

        let reopened = reloaded(&board);
        assert_eq!(reopened.notes().len(), 2);
        let note = reopened.get(&a).unwrap();
        assert_eq!(note.position(), DEFAULT_POSITION);
        assert_eq!(note.z_index, 1);
    }

    #[test]
    fn test_resize_respects_minimum() {
        let mut board = board();
        let id = board.create(None).unwrap().id;
        let note = resize(&mut board, &id, 20.0, 20.0).unwrap();
        assert_eq!(note.size(), Size::new(150.0, 100.0));
    }

    #[test]
    fn test_color_by_name_and_unknown() {
        let mut board = board();
        let id = board.create(None).unwrap().id;
        assert_eq!(color(&mut board, &id, "Teal").unwrap().color, NoteColor::Teal);
        assert!(matches!(
            color(&mut board, &id, "mauve"),
            Err(CliError::Core(StickItError::InvalidColor(_)))
        ));
    }

    #[test]
    fn test_delete_prompts() {
        let mut board = board();
        let id = board.create(None).unwrap().id;

        let mut input = "n\n".as_bytes();
        let result = delete(&mut board, &id, false, &mut input, &mut Vec::new());
        assert!(matches!(result, Err(CliError::Cancelled)));
        assert_eq!(board.len(), 1);

        let mut input = "yes\n".as_bytes();
        delete(&mut board, &id, false, &mut input, &mut Vec::new()).unwrap();
        assert!(board.is_empty());
        assert!(reloaded(&board).is_empty());
    }

    #[test]
    fn test_delete_with_yes_skips_prompt() {
        let mut board = board();
        let id = board.create(None).unwrap().id;
        let mut input = "".as_bytes();
        delete(&mut board, &id, true, &mut input, &mut Vec::new()).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_search_report() {
        let mut board = board();
        add(&mut board, None, None, Some("Apple"), None, &mut Vec::new()).unwrap();
        add(&mut board, None, None, Some("Pear"), None, &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        search(&board, "APP", false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Apple"));
        assert!(!text.contains("Pear"));
        assert!(text.ends_with("1 of 2 notes\n"));

        let mut out = Vec::new();
        search(&board, "kiwi", false, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No notes found"));
    }

    #[test]
    fn test_list_json() {
        let mut board = board();
        board.create(None).unwrap();
        let mut out = Vec::new();
        list(&board, true, &mut out).unwrap();

        let parsed: Vec<Note> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, board.get_all());
    }

    #[test]
    fn test_quota_error_message() {
        let mut board = Board::new(MemoryStore::with_quota(16), Viewport::default());
        let err = add(&mut board, None, None, None, None, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            &err,
            CliError::Core(StickItError::Persist {
                source: StorageError::QuotaExceeded,
                ..
            })
        ));
        assert_eq!(
            err.user_message(),
            "Storage quota exceeded. Please delete some notes to continue."
        );
    }

    #[test]
    fn test_palette_lists_all_colors() {
        let mut out = Vec::new();
        palette(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 8);
        assert!(text.starts_with("yellow  #ffeb3b"));
    }
}
