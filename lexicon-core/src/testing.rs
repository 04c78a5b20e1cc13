//! Testing utilities for the game engine.
//!
//! This module provides tools for integration testing:
//! - `ScriptedProvider` for deterministic assessments without network calls
//! - `TestHarness` for driving a `Game` through scripted scenarios
//! - Assertion helpers for verifying game state

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::Enemy;
use crate::config::{Config, ProviderKind};
use crate::context::{GameContext, PlayerStats};
use crate::event::{AssessmentRequest, Effect, Event};
use crate::game::{run_assessment, Game};
use crate::input::Key;
use crate::provider::{ConversationTurn, Provider, ProviderError, ProviderSelection};
use crate::state::GameState;

/// One scripted provider outcome.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Raw reply text, decoded by the assessment client as usual.
    Text(String),
    /// The call fails at the transport level.
    Failure(String),
}

/// A provider that answers from a queue and records what it was asked.
///
/// An exhausted queue behaves like an unreachable backend.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    conversations: Mutex<Vec<Vec<ConversationTurn>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue reply text.
    pub fn reply(&self, text: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(ScriptedReply::Text(text.into()));
        self
    }

    /// Queue a JSON payload as reply text.
    pub fn reply_json(&self, value: serde_json::Value) -> &Self {
        self.reply(value.to_string())
    }

    /// Queue a transport failure.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(ScriptedReply::Failure(message.into()));
        self
    }

    /// Every conversation received so far, oldest first.
    pub fn conversations(&self) -> Vec<Vec<ConversationTurn>> {
        lock(&self.conversations).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.conversations).len()
    }

    pub fn pending_replies(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String, ProviderError> {
        lock(&self.conversations).push(conversation.to_vec());
        match lock(&self.replies).pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(message)) => Err(ProviderError::Transport(message)),
            None => Err(ProviderError::Transport(
                "no scripted reply left".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Test harness for running game scenarios.
///
/// Assessment effects are executed inline by default so every call returns
/// with the game settled. With [`TestHarness::hold_responses`] they are kept
/// back instead and delivered later, which simulates slow backends.
pub struct TestHarness {
    pub game: Game,
    pub provider: Arc<ScriptedProvider>,
    held: Vec<AssessmentRequest>,
    holding: bool,
    quit: bool,
}

impl TestHarness {
    /// A harness with the local provider configured and a fixed seed.
    pub fn new() -> Self {
        let config = Config {
            provider: ProviderKind::Local,
            ..Config::default()
        };
        Self::with_config(config, 42)
    }

    /// A harness with a custom configuration and seed. Every provider the
    /// context builds, including after a reload, is the scripted one.
    pub fn with_config(config: Config, seed: u64) -> Self {
        let provider = ScriptedProvider::new();
        let shared = Arc::clone(&provider);
        let ctx = GameContext::with_factory(
            config,
            None,
            Box::new(move |_: &Config| ProviderSelection {
                provider: shared.clone(),
                notice: None,
            }),
            StdRng::seed_from_u64(seed),
        );

        let mut game = Game::new(ctx);
        game.start();

        Self {
            game,
            provider,
            held: Vec::new(),
            holding: false,
            quit: false,
        }
    }

    /// Replace the current state and enter it.
    pub async fn jump_to(&mut self, state: impl Into<GameState>) {
        let effects = self.game.transition(state.into());
        self.run_effects(effects).await;
    }

    /// Keep assessment requests back instead of running them.
    pub fn hold_responses(&mut self, hold: bool) {
        self.holding = hold;
    }

    pub fn held_requests(&self) -> &[AssessmentRequest] {
        &self.held
    }

    /// Run every held request now and deliver the completions, oldest first.
    pub async fn release_held(&mut self) {
        let held = std::mem::take(&mut self.held);
        for request in held {
            let event = run_assessment(self.game.context().client().clone(), request).await;
            let effects = self.game.handle(event);
            self.run_effects(effects).await;
        }
    }

    pub async fn send(&mut self, event: Event) {
        let effects = self.game.handle(event);
        self.run_effects(effects).await;
    }

    pub async fn key(&mut self, key: Key) {
        self.send(Event::Key(key)).await;
    }

    pub async fn enter(&mut self) {
        self.key(Key::Enter).await;
    }

    /// Type `text` character by character, without confirming.
    pub async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(Key::Char(c)).await;
        }
    }

    /// Type `text` and confirm it.
    pub async fn submit(&mut self, text: &str) {
        self.type_text(text).await;
        self.enter().await;
    }

    async fn run_effects(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Quit => self.quit = true,
                Effect::Assess(request) if self.holding => self.held.push(request),
                Effect::Assess(request) => {
                    let client = self.game.context().client().clone();
                    let event = run_assessment(client, request).await;
                    queue.extend(self.game.handle(event));
                }
            }
        }
    }

    pub fn state_name(&self) -> &'static str {
        self.game.state().name()
    }

    pub fn ctx(&self) -> &GameContext {
        self.game.context()
    }

    pub fn ctx_mut(&mut self) -> &mut GameContext {
        self.game.context_mut()
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.ctx().stats
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.ctx().enemy.as_ref()
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// The rendered screen as plain text.
    pub fn screen_text(&self) -> String {
        self.game.render().to_plain_text()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the game is in the named state.
#[track_caller]
pub fn assert_state(harness: &TestHarness, expected: &str) {
    assert_eq!(
        harness.state_name(),
        expected,
        "Expected state {expected}, got {}",
        harness.state_name()
    );
}

/// Assert player HP.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, expected: i32) {
    let actual = harness.stats().hp;
    assert_eq!(actual, expected, "Expected HP {expected}, got {actual}");
}

/// Assert an enemy is active exactly when the state is combat-family.
#[track_caller]
pub fn assert_enemy_invariant(harness: &TestHarness) {
    let fighting = harness.game.state().is_combat_family();
    assert_eq!(
        harness.enemy().is_some(),
        fighting,
        "Enemy presence does not match state {}",
        harness.state_name()
    );
}
