//! The closed set of screens and the rules for moving between them.
//!
//! Every variant supports the same three operations:
//! - `enter` runs once when the variant becomes current and may request an
//!   assessment,
//! - `handle_event` consumes one event and may name the next variant,
//! - `render` describes the screen.
//!
//! Returning a [`Step`] with `next` set is the only way to change screens.

mod adventure;
mod combat;
mod menu;
mod path;

pub use adventure::{ActionInputState, ActionResultState, NarrativeState, ProcessingState};
pub use combat::{
    CombatProcessingState, CombatResultState, CombatState, GameOverState, VictoryState,
};
pub use menu::{CredentialInputState, MenuState, ProviderSetupState};
pub use path::{PathChoiceState, PathProcessingState, PathResultState};

use crate::context::GameContext;
use crate::event::{Effect, Event, RequestId};
use crate::screen::Screen;

/// What a handler decided: an optional next screen and an optional effect.
#[derive(Debug, Default)]
pub struct Step {
    pub next: Option<GameState>,
    pub effect: Option<Effect>,
}

impl Step {
    pub fn stay() -> Self {
        Self::default()
    }

    pub fn to(state: impl Into<GameState>) -> Self {
        Self {
            next: Some(state.into()),
            effect: None,
        }
    }

    pub fn quit() -> Self {
        Self {
            next: None,
            effect: Some(Effect::Quit),
        }
    }
}

#[derive(Debug)]
pub enum GameState {
    Menu(MenuState),
    ProviderSetup(ProviderSetupState),
    CredentialInput(CredentialInputState),
    Combat(CombatState),
    CombatProcessing(CombatProcessingState),
    CombatResult(CombatResultState),
    Victory(VictoryState),
    GameOver(GameOverState),
    PathChoice(PathChoiceState),
    PathProcessing(PathProcessingState),
    PathResult(PathResultState),
    Narrative(NarrativeState),
    ActionInput(ActionInputState),
    Processing(ProcessingState),
    ActionResult(ActionResultState),
}

macro_rules! state_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for GameState {
                fn from(state: $ty) -> Self {
                    GameState::$variant(state)
                }
            }
        )*

        impl GameState {
            pub fn name(&self) -> &'static str {
                match self {
                    $(GameState::$variant(_) => stringify!($variant),)*
                }
            }

            pub fn enter(&mut self, ctx: &mut GameContext) -> Option<Effect> {
                match self {
                    $(GameState::$variant(s) => s.enter(ctx),)*
                }
            }

            pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
                match self {
                    $(GameState::$variant(s) => s.handle_event(event, ctx),)*
                }
            }

            pub fn render(&self, ctx: &GameContext) -> Screen {
                match self {
                    $(GameState::$variant(s) => s.render(ctx),)*
                }
            }
        }
    };
}

state_from! {
    Menu(MenuState),
    ProviderSetup(ProviderSetupState),
    CredentialInput(CredentialInputState),
    Combat(CombatState),
    CombatProcessing(CombatProcessingState),
    CombatResult(CombatResultState),
    Victory(VictoryState),
    GameOver(GameOverState),
    PathChoice(PathChoiceState),
    PathProcessing(PathProcessingState),
    PathResult(PathResultState),
    Narrative(NarrativeState),
    ActionInput(ActionInputState),
    Processing(ProcessingState),
    ActionResult(ActionResultState),
}

impl GameState {
    /// Waiting on one assessment; no user interaction.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GameState::CombatProcessing(_) | GameState::PathProcessing(_) | GameState::Processing(_)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::GameOver(_))
    }

    /// States during which an active enemy must exist.
    pub fn is_combat_family(&self) -> bool {
        matches!(
            self,
            GameState::Combat(_) | GameState::CombatProcessing(_) | GameState::CombatResult(_)
        )
    }

    /// The request a processing state is waiting on, once entered.
    pub fn pending_request(&self) -> Option<RequestId> {
        match self {
            GameState::CombatProcessing(s) => s.request(),
            GameState::PathProcessing(s) => s.request(),
            GameState::Processing(s) => s.request(),
            _ => None,
        }
    }
}

/// Move a list cursor for up/down keys (and vi-style `k`/`j`).
pub(crate) fn move_cursor(cursor: &mut usize, len: usize, key: crate::input::Key) -> bool {
    use crate::input::Key;
    match key {
        Key::Up | Key::Char('k') => {
            *cursor = cursor.saturating_sub(1);
            true
        }
        Key::Down | Key::Char('j') => {
            if *cursor + 1 < len {
                *cursor += 1;
            }
            true
        }
        _ => false,
    }
}
