//! Visual novel player TUI.
//!
//! Plays JSON scene scripts from a content directory in a terminal:
//! a stage strip, a dialogue box with a typewriter reveal, and
//! choice-driven branching, with a single autosave slot.
//!
//! ```bash
//! novella --content ./content --saves ./saves
//! ```

mod app;
mod events;
mod ui;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use novella_core::{Engine, EngineError, FileStore, FsScriptStore, NullAudio};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use app::{App, Screen};
use events::{handle_event, AppAction};
use ui::render::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let content_dir = arg_value(&args, "--content").unwrap_or_else(|| PathBuf::from("content"));
    let save_dir = arg_value(&args, "--saves").unwrap_or_else(|| PathBuf::from("saves"));

    // Composition root: concrete collaborators are constructed here and
    // injected; nothing below main knows about the filesystem.
    let scripts = FsScriptStore::open(&content_dir).await;
    let engine = Engine::new(
        Arc::new(scripts),
        Arc::new(NullAudio),
        Arc::new(FileStore::new(&save_dir)),
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(engine)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    app.engine.initialize().await;
    app.has_save = app.engine.has_save().await;

    loop {
        terminal.draw(|f| render(f, &app))?;

        // Poll for events with a timeout that doubles as the animation tick
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            let action = handle_event(&mut app, ev);
            perform(&mut app, action).await;
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Carry out an engine-touching action requested by input handling.
async fn perform(app: &mut App, action: AppAction) {
    match action {
        AppAction::None => {}

        AppAction::Quit => {
            app.should_quit = true;
        }

        AppAction::StartNewGame => {
            app.clear_status();
            match app.engine.start_new_game().await {
                Ok(()) => app.screen = Screen::Playing,
                Err(e) => app.set_status(format!("Failed to start: {e}")),
            }
        }

        AppAction::ContinueGame => {
            app.clear_status();
            match app.engine.continue_game().await {
                Ok(()) => app.screen = Screen::Playing,
                Err(EngineError::NoSave) => app.set_status("No save file found"),
                Err(e) => app.set_status(format!("Failed to continue: {e}")),
            }
        }

        AppAction::Advance => {
            app.clear_status();
            app.engine.next_event().await;
        }

        AppAction::Choose(id) => {
            app.clear_status();
            if let Err(e) = app.engine.make_choice(&id).await {
                app.set_status(format!("Choice failed: {e}"));
            }
            app.choice_selected = 0;
        }

        AppAction::Pause => {
            app.engine.pause().await;
        }

        AppAction::Resume => {
            app.engine.resume().await;
        }

        AppAction::Save => {
            if app.engine.save_game().await {
                app.has_save = true;
                app.set_status("Game saved");
            } else {
                app.set_status("Save failed");
            }
        }

        AppAction::Load => {
            match app.engine.continue_game().await {
                Ok(()) => {
                    app.close_overlay();
                    app.screen = Screen::Playing;
                    app.set_status("Game loaded");
                }
                Err(EngineError::NoSave) => app.set_status("No save file found"),
                Err(e) => app.set_status(format!("Load failed: {e}")),
            }
        }

        AppAction::ApplySettings(settings) => {
            if app.engine.update_settings(settings).await {
                app.set_status("Settings saved");
            } else {
                app.set_status("Failed to save settings");
            }
        }

        AppAction::BackToMenu => {
            app.engine.pause().await;
            app.has_save = app.engine.has_save().await;
            app.screen = Screen::MainMenu;
            app.clear_status();
        }
    }

    app.sync();
}

fn arg_value(args: &[String], name: &str) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn print_help() {
    println!("novella - visual novel player");
    println!();
    println!("USAGE:");
    println!("  novella [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help         Show this help message");
    println!("  --content <DIR>    Scene content directory (default: content)");
    println!("  --saves <DIR>      Save file directory (default: saves)");
    println!();
    println!("KEYS:");
    println!("  Space/Enter        Advance dialogue / confirm");
    println!("  1-9, j/k           Pick a choice");
    println!("  Esc                Pause menu");
    println!("  s / l              Quick save / load");
}
