//! stickit: command-line access to a StickIt notes board.

mod commands;
mod settings;

use clap::{Parser, Subcommand};
use commands::{CliError, CliResult};
use settings::AppSettings;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use stickit_core::{Board, SqliteStore, StickItError};

#[derive(Parser)]
#[command(name = "stickit")]
#[command(author, version, about = "Sticky notes on a board, from the terminal")]
#[command(propagate_version = true)]
struct Cli {
    /// Notes file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Board width used to keep notes on screen
    #[arg(long, global = true)]
    width: Option<f64>,

    /// Board height used to keep notes on screen
    #[arg(long, global = true)]
    height: Option<f64>,

    /// Print notes as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every note, bottom of the stack first
    List,

    /// Create a note
    Add {
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Change a note's title or content
    Edit {
        /// Note id or a unique prefix of it
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Move a note and bring it to the front
    Move {
        id: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Resize a note
    Resize {
        id: String,
        #[arg(value_name = "WIDTH")]
        new_width: f64,
        #[arg(value_name = "HEIGHT")]
        new_height: f64,
    },

    /// Recolor a note by palette name or hex value
    Color { id: String, color: String },

    /// Delete a note
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Find notes whose title or content contains the query
    Search { query: String },

    /// Show the available note colors
    Palette,

    /// Show the settings, saving any of --store/--width/--height given
    Config,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Layers the command-line overrides on top of the saved settings.
fn effective_settings(cli: &Cli, mut settings: AppSettings) -> AppSettings {
    if let Some(store) = &cli.store {
        settings.store_path = store.to_string_lossy().to_string();
    }
    if let Some(width) = cli.width {
        settings.board_width = width;
    }
    if let Some(height) = cli.height {
        settings.board_height = height;
    }
    settings
}

fn open_board(settings: &AppSettings) -> CliResult<Board<SqliteStore>> {
    if !settings.viewport().is_valid() {
        return Err(CliError::InvalidBoardSize(settings.board_width, settings.board_height));
    }
    let path = PathBuf::from(&settings.store_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let store = SqliteStore::open_or_create(&path).map_err(StickItError::from)?;
    log::info!("using notes file {}", path.display());
    Ok(Board::open(store, settings.viewport())?)
}

fn run(cli: Cli) -> CliResult<()> {
    let settings = effective_settings(&cli, settings::load_settings());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Commands::Palette = cli.command {
        return commands::palette(&mut out);
    }
    if let Commands::Config = cli.command {
        if cli.store.is_some() || cli.width.is_some() || cli.height.is_some() {
            settings::save_settings(&settings)?;
        }
        let json = serde_json::to_string_pretty(&settings).map_err(StickItError::from)?;
        writeln!(out, "{json}")?;
        return Ok(());
    }

    let mut board = open_board(&settings)?;
    let json = cli.json;
    match cli.command {
        Commands::List => commands::list(&board, json, &mut out)?,
        Commands::Add {
            x,
            y,
            title,
            content,
        } => {
            commands::add(&mut board, x, y, title.as_deref(), content.as_deref(), &mut out)?;
        }
        Commands::Edit { id, title, content } => {
            let note = commands::edit(&mut board, &id, title.as_deref(), content.as_deref())?;
            writeln!(out, "Updated {}", note.id)?;
        }
        Commands::Move { id, x, y } => {
            let note = commands::move_note(&mut board, &id, x, y)?;
            writeln!(out, "Moved {} to ({:.0}, {:.0})", note.id, note.x, note.y)?;
        }
        Commands::Resize {
            id,
            new_width,
            new_height,
        } => {
            let note = commands::resize(&mut board, &id, new_width, new_height)?;
            writeln!(out, "Resized {} to {:.0}x{:.0}", note.id, note.width, note.height)?;
        }
        Commands::Color { id, color } => {
            let note = commands::color(&mut board, &id, &color)?;
            writeln!(out, "Colored {} {}", note.id, note.color.name())?;
        }
        Commands::Delete { id, yes } => {
            let stdin = io::stdin();
            commands::delete(&mut board, &id, yes, &mut stdin.lock(), &mut out)?;
        }
        Commands::Search { query } => commands::search(&board, &query, json, &mut out)?,
        Commands::Palette | Commands::Config => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use stickit_core::Viewport;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from(["stickit", "--width", "640", "--store", "/tmp/x.sqlite", "list"]);
        let settings = effective_settings(&cli, AppSettings::default());
        assert_eq!(settings.board_width, 640.0);
        assert_eq!(settings.board_height, 800.0);
        assert_eq!(settings.store_path, "/tmp/x.sqlite");
        assert_eq!(settings.viewport(), Viewport::new(640.0, 800.0));
    }

    #[test]
    fn test_parses_negative_move() {
        let cli = Cli::parse_from(["stickit", "move", "abc", "-20", "40"]);
        match cli.command {
            Commands::Move { id, x, y } => {
                assert_eq!(id, "abc");
                assert_eq!(x, -20.0);
                assert_eq!(y, 40.0);
            }
            _ => panic!("expected move"),
        }
    }

    #[test]
    fn test_open_board_creates_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = AppSettings {
            store_path: dir
                .path()
                .join("data")
                .join("notes.sqlite")
                .to_string_lossy()
                .to_string(),
            ..AppSettings::default()
        };

        let mut board = open_board(&settings).unwrap();
        let id = board.create(None).unwrap().id;
        drop(board);

        let board = open_board(&settings).unwrap();
        assert!(board.get(&id).is_some());
    }

    #[test]
    fn test_open_board_rejects_bad_size() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.sqlite");
        for (width, height) in [(f64::NAN, 600.0), (800.0, 0.0), (f64::INFINITY, 600.0)] {
            let settings = AppSettings {
                store_path: path.to_string_lossy().to_string(),
                board_width: width,
                board_height: height,
            };
            assert!(matches!(
                open_board(&settings),
                Err(CliError::InvalidBoardSize(..))
            ));
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_user_message_for_missing_note() {
        let err = CliError::NoSuchNote("abc".to_string());
        assert_eq!(err.user_message(), "No note matches id \"abc\"");
    }
}
