//! The orchestration loop: one current state, one context, one event at a time.

use crate::assessment::AssessmentClient;
use crate::context::{GameContext, Viewport};
use crate::event::{AssessmentRequest, Completion, Effect, Event};
use crate::input::Key;
use crate::screen::Screen;
use crate::state::{GameState, MenuState, ProviderSetupState, Step};

#[derive(Debug)]
pub struct Game {
    state: GameState,
    ctx: GameContext,
}

impl Game {
    /// Start at the title menu. Call [`Game::start`] before the first event.
    pub fn new(ctx: GameContext) -> Self {
        Self::with_state(ctx, MenuState::new())
    }

    /// Start at an arbitrary state. It is entered by [`Game::start`].
    pub fn with_state(ctx: GameContext, state: impl Into<GameState>) -> Self {
        Self {
            state: state.into(),
            ctx,
        }
    }

    /// Run the initial state's `enter` and return its effects.
    pub fn start(&mut self) -> Vec<Effect> {
        let effect = self.state.enter(&mut self.ctx);
        self.sync_enemy();
        effect.into_iter().collect()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn render(&self) -> Screen {
        self.state.render(&self.ctx)
    }

    /// Process exactly one event and return the effects the host must run.
    ///
    /// Global rules are applied before the state sees the event:
    /// - interrupt quits from anywhere,
    /// - the settings shortcut opens provider setup unless the current state
    ///   is transient or terminal,
    /// - resize updates the viewport,
    /// - a completion that does not belong to the current state is dropped.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match &event {
            Event::Key(Key::Interrupt) => {
                tracing::info!(state = self.state.name(), "interrupted");
                return vec![Effect::Quit];
            }
            Event::Key(Key::Settings) => {
                if self.state.is_transient() || self.state.is_terminal() {
                    return Vec::new();
                }
                return self.transition(ProviderSetupState::new().into());
            }
            Event::Resize { width, height } => {
                self.ctx.viewport = Viewport {
                    width: *width,
                    height: *height,
                };
            }
            Event::AssessmentCompleted(Completion { id, .. }) => {
                if self.state.pending_request() != Some(*id) {
                    tracing::debug!(request = %id, state = self.state.name(), "discarding stale assessment");
                    return Vec::new();
                }
                tracing::debug!(request = %id, "assessment completed");
            }
            _ => {}
        }

        let Step { next, effect } = self.state.handle_event(event, &mut self.ctx);
        let mut effects: Vec<Effect> = effect.into_iter().collect();
        if let Some(next) = next {
            effects.extend(self.transition(next));
        }
        effects
    }

    pub(crate) fn transition(&mut self, next: GameState) -> Vec<Effect> {
        tracing::debug!(from = self.state.name(), to = next.name(), "state transition");
        self.state = next;
        let effect = self.state.enter(&mut self.ctx);
        self.sync_enemy();
        effect.into_iter().collect()
    }

    /// An enemy only exists while fighting.
    fn sync_enemy(&mut self) {
        if !self.state.is_combat_family() && self.ctx.enemy.is_some() {
            tracing::debug!(state = self.state.name(), "clearing active enemy");
            self.ctx.enemy = None;
        }
    }
}

/// Perform one assessment and wrap the outcome as an event for [`Game::handle`].
pub async fn run_assessment(client: AssessmentClient, request: AssessmentRequest) -> Event {
    let AssessmentRequest { id, kind } = request;
    tracing::debug!(request = %id, mode = kind.mode(), "assessment started");
    let outcome = client.assess(&kind).await;
    if let Err(e) = &outcome {
        tracing::debug!(request = %id, error = %e, "assessment returned an error");
    }
    Event::AssessmentCompleted(Completion { id, outcome })
}
