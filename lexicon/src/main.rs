//! Lexicon: a vocabulary RPG in the terminal.
//!
//! Fights are won with words. Every sentence typed in combat is graded by a
//! language model, and the grade decides how hard it hits.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripting:
//!
//! ```bash
//! cargo run -p lexicon -- --headless
//! ```

mod events;
mod headless;
mod ui;

use std::fs::File;
use std::io::{self, stdout};
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lexicon_core::{config::default_config_path, run_assessment, Config, Effect, Event, Game, GameContext};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ui::render::render;
use ui::theme::GameTheme;

const LOG_ENV: &str = "LEXICON_LOG";
const DEFAULT_LOG_FILTER: &str = "lexicon=info,lexicon_core=info";
const LOG_FILE: &str = "lexicon.log";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let headless = args.iter().any(|a| a == "--headless");
    init_tracing(headless)?;

    let config_path = default_config_path();
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %config_path.display(), error = %e, "unreadable config, using defaults");
            Config::default()
        }
    }
    .with_env_overrides();

    let game = Game::new(GameContext::new(config, config_path));

    if headless {
        return headless::run_headless(game).await.map_err(|e| e.into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, game).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "terminal loop failed");
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// The terminal owns stdout, so interactive sessions log to a file.
fn init_tracing(headless: bool) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        let file = File::create(LOG_FILE)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut game: Game,
) -> io::Result<()> {
    let theme = GameTheme::default();
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let size = terminal.size()?;
    let mut effects = game.handle(Event::Resize {
        width: size.width,
        height: size.height,
    });
    effects.extend(game.start());
    if dispatch(&game, effects, &tx) {
        return Ok(());
    }

    loop {
        terminal.draw(|f| render(f, &game, &theme))?;

        // Finished assessments come back as events
        while let Ok(completion) = rx.try_recv() {
            let effects = game.handle(completion);
            if dispatch(&game, effects, &tx) {
                return Ok(());
            }
        }

        // Poll for events with timeout for animations
        let effects = if event::poll(Duration::from_millis(100))? {
            match events::translate(event::read()?) {
                Some(ev) => game.handle(ev),
                None => continue,
            }
        } else {
            game.handle(Event::Tick)
        };

        if dispatch(&game, effects, &tx) {
            return Ok(());
        }
    }
}

/// Start background work for each effect. Returns `true` on quit.
fn dispatch(game: &Game, effects: Vec<Effect>, tx: &mpsc::UnboundedSender<Event>) -> bool {
    for effect in effects {
        match effect {
            Effect::Quit => return true,
            Effect::Assess(request) => {
                let client = game.context().client().clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let completion = run_assessment(client, request).await;
                    // The receiver is gone only after the loop exits
                    let _ = tx.send(completion);
                });
            }
        }
    }
    false
}

fn print_help() {
    println!("Lexicon - a vocabulary RPG graded by a language model");
    println!();
    println!("USAGE:");
    println!("  lexicon [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  --headless    Line-oriented mode on stdin/stdout");
    println!("  -h, --help    Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  ANTHROPIC_API_KEY    Cloud provider key, used when none is saved");
    println!("  LEXICON_LOCAL_URL    Base URL of the local backend");
    println!("  LEXICON_CLOUD_MODEL  Model used by the cloud backend");
    println!("  LEXICON_LOG          Log filter (default: {DEFAULT_LOG_FILTER})");
    println!();
    println!("CONTROLS:");
    println!("  Up/Down, j/k    Move selection");
    println!("  Enter           Confirm or submit");
    println!("  Esc             Back / flee");
    println!("  Ctrl+S          Provider settings");
    println!("  Ctrl+C          Quit");
    println!();
    println!("Logs are written to {LOG_FILE} in the working directory.");
}
