//! Grammar-graded dungeon crawler engine.
//!
//! This crate provides:
//! - A closed state machine of game screens (menu, combat, crossroads, free adventure)
//! - An assessment client that asks a language model to grade the player's English
//! - Interchangeable providers (local llama.cpp-style server, Claude in the cloud)
//! - The game rules that turn grades into damage, healing and rewards
//!
//! The engine never performs I/O on its own. [`Game::handle`] consumes one
//! [`Event`] and returns [`Effect`]s; the host runs assessments concurrently
//! with [`run_assessment`] and feeds the completions back as events.
//!
//! # Quick Start
//!
//! ```ignore
//! use lexicon_core::{config, Event, Game, GameContext, Key};
//!
//! let config = config::Config::load_from(&config::default_config_path())?;
//! let mut game = Game::new(GameContext::new(config, config::default_config_path()));
//! game.start();
//!
//! for effect in game.handle(Event::Key(Key::Enter)) {
//!     // spawn Effect::Assess with run_assessment, stop on Effect::Quit
//! }
//! println!("{}", game.render().to_plain_text());
//! ```

pub mod assessment;
pub mod catalog;
pub mod config;
pub mod context;
pub mod event;
pub mod game;
pub mod input;
pub mod provider;
pub mod screen;
pub mod state;
pub mod testing;

// Primary public API
pub use assessment::{AssessmentClient, AssessmentError, AssessmentKind, AssessmentResult};
pub use config::{Config, ConfigError, ProviderKind};
pub use context::{GameContext, PlayerStats, Viewport};
pub use event::{AssessmentRequest, Completion, Effect, Event, RequestId};
pub use game::{run_assessment, Game};
pub use input::Key;
pub use provider::{ConversationTurn, Provider, ProviderError, TurnRole};
pub use screen::{Line, Screen, Segment, Tone};
pub use state::GameState;
