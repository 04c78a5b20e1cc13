//! Headless mode for Lexicon.
//!
//! A line-oriented interface over stdin/stdout for scripting and automated
//! play. Assessments are awaited inline, so every printed screen is settled.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use lexicon_core::{run_assessment, Effect, Event, Game, Key};

const HELP: &str = "\
Commands:
  <text>     - Type the text and press Enter
  <empty>    - Press Enter
  #up        - Move selection up
  #down      - Move selection down
  #esc       - Press Escape
  #settings  - Open provider settings
  #quit      - Exit the game
  #help      - Show this help";

/// What one input line turns into.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Keys(Vec<Key>),
    Help,
    Unknown(String),
}

fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if let Some(command) = line.strip_prefix('#') {
        return match command.trim() {
            "up" => Command::Keys(vec![Key::Up]),
            "down" => Command::Keys(vec![Key::Down]),
            "esc" => Command::Keys(vec![Key::Esc]),
            "settings" => Command::Keys(vec![Key::Settings]),
            "quit" | "exit" => Command::Keys(vec![Key::Interrupt]),
            "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        };
    }

    let mut keys: Vec<Key> = line.chars().map(Key::Char).collect();
    keys.push(Key::Enter);
    Command::Keys(keys)
}

/// Feed one event and run the resulting effects to completion.
/// Returns `true` once the game asked to quit.
async fn drive(game: &mut Game, event: Event) -> bool {
    let mut queue: VecDeque<Effect> = game.handle(event).into();
    run_effects(game, &mut queue).await
}

async fn run_effects(game: &mut Game, queue: &mut VecDeque<Effect>) -> bool {
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Quit => return true,
            Effect::Assess(request) => {
                let client = game.context().client().clone();
                let completion = run_assessment(client, request).await;
                queue.extend(game.handle(completion));
            }
        }
    }
    false
}

/// Run the game in headless mode.
pub async fn run_headless(mut game: Game) -> io::Result<()> {
    println!("=== Lexicon Headless Mode ===");
    println!("Provider: {}", game.context().provider_name());
    if let Some(notice) = &game.context().notice {
        println!("[NOTICE] {notice}");
    }
    println!("{HELP}");
    println!();

    let mut initial: VecDeque<Effect> = game.start().into();
    if run_effects(&mut game, &mut initial).await {
        return Ok(());
    }
    print!("{}", game.render().to_plain_text());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let keys = match parse_line(&line) {
            Command::Keys(keys) => keys,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Unknown(other) => {
                println!("[ERROR] Unknown command: #{other} (try #help)");
                continue;
            }
        };

        for key in keys {
            if drive(&mut game, Event::Key(key)).await {
                println!("Goodbye!");
                return Ok(());
            }
        }
        println!();
        print!("{}", game.render().to_plain_text());
    }

    Ok(())
}
