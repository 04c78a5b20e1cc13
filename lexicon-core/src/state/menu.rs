//! Title menu and provider configuration screens.

use crate::config::ProviderKind;
use crate::context::GameContext;
use crate::event::{Effect, Event};
use crate::input::{Key, TextInput};
use crate::screen::{menu_item, Line, Screen, Tone};

use super::{move_cursor, CombatState, NarrativeState, Step};

const MENU_CHOICES: &[&str] = &["Start Game", "Free Adventure", "Settings"];

/// Route to setup when the provider is not usable yet.
fn provider_gate(ctx: &GameContext) -> Option<Step> {
    if ctx.config.provider == ProviderKind::Unset {
        return Some(Step::to(ProviderSetupState::new()));
    }
    if ctx.config.needs_credential() {
        return Some(Step::to(CredentialInputState::new()));
    }
    None
}

#[derive(Debug, Default)]
pub struct MenuState {
    cursor: usize,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        let Event::Key(key) = event else {
            return Step::stay();
        };

        if move_cursor(&mut self.cursor, MENU_CHOICES.len(), key) {
            return Step::stay();
        }

        match key {
            Key::Char('q') => Step::quit(),
            Key::Enter => match self.cursor {
                0 => provider_gate(ctx).unwrap_or_else(|| {
                    ctx.start_new_run();
                    let intro = ctx
                        .enemy
                        .as_ref()
                        .map(|e| {
                            format!(
                                "You enter the Kingdom of Lexicon, where words have power. A {} blocks your path! {}",
                                e.name, e.description
                            )
                        })
                        .unwrap_or_default();
                    ctx.narrative = intro;
                    tracing::info!(provider = ctx.provider_name(), "new run started");
                    Step::to(CombatState::new())
                }),
                1 => provider_gate(ctx).unwrap_or_else(|| {
                    ctx.stats.reset();
                    ctx.last_error = None;
                    Step::to(NarrativeState::new(
                        "You stand at the gates of the Kingdom of Lexicon. Mist curls around \
                         the towers, and somewhere a dragon is mispronouncing things. What do you do?",
                    ))
                }),
                _ => Step::to(ProviderSetupState::new()),
            },
            _ => Step::stay(),
        }
    }

    pub fn render(&self, _ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("⚔ LEXICON ⚔");
        screen
            .line(Line::styled("Welcome to Lexicon", Tone::Heading))
            .blank()
            .line(Line::plain("A grammar-powered dungeon crawler where"))
            .line(Line::plain("your English skills are your weapon!"))
            .blank();
        for (i, choice) in MENU_CHOICES.iter().enumerate() {
            screen.line(menu_item(choice, i == self.cursor));
        }
        screen.blank().line(Line::styled(
            "(Use ↑/↓ to move, Enter to select, q to quit)",
            Tone::Help,
        ));
        screen
    }
}

const SETUP_CHOICES: &[&str] = &[
    "Use local model (llama.cpp)",
    "Use Claude (cloud)",
    "Update cloud API key",
    "Back",
];

#[derive(Debug, Default)]
pub struct ProviderSetupState {
    cursor: usize,
}

impl ProviderSetupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    fn select(&self, kind: ProviderKind, ctx: &mut GameContext) {
        ctx.config.provider = kind;
        ctx.save_config();
        ctx.reload_provider();
        tracing::info!(provider = kind.label(), "provider selected");
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        let Event::Key(key) = event else {
            return Step::stay();
        };

        if move_cursor(&mut self.cursor, SETUP_CHOICES.len(), key) {
            return Step::stay();
        }

        match key {
            Key::Char('q') => Step::quit(),
            Key::Esc => Step::to(MenuState::new()),
            Key::Enter => match self.cursor {
                0 => {
                    self.select(ProviderKind::Local, ctx);
                    Step::to(MenuState::new())
                }
                1 if ctx.config.effective_api_key().is_empty() => {
                    Step::to(CredentialInputState::new())
                }
                1 => {
                    self.select(ProviderKind::Cloud, ctx);
                    Step::to(MenuState::new())
                }
                2 => Step::to(CredentialInputState::new()),
                _ => Step::to(MenuState::new()),
            },
            _ => Step::stay(),
        }
    }

    pub fn render(&self, ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("SETTINGS");
        screen
            .line(Line::styled("Select your Intelligence Provider", Tone::Heading))
            .line(
                Line::styled("Current: ", Tone::Muted)
                    .push(ctx.config.provider.label(), Tone::Highlight),
            )
            .blank();
        for (i, choice) in SETUP_CHOICES.iter().enumerate() {
            screen.line(menu_item(choice, i == self.cursor));
        }
        screen.blank().line(Line::styled(
            "(Use ↑/↓ to move, Enter to select, Esc to go back, q to quit)",
            Tone::Help,
        ));
        screen
    }
}

#[derive(Debug)]
pub struct CredentialInputState {
    input: TextInput,
}

impl Default for CredentialInputState {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialInputState {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("sk-ant-...").masked(),
        }
    }

    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        let Event::Key(key) = event else {
            return Step::stay();
        };

        match key {
            Key::Esc => Step::to(ProviderSetupState::new()),
            Key::Enter => match self.input.submit() {
                Some(api_key) => {
                    ctx.config.cloud_api_key = api_key;
                    ctx.config.provider = ProviderKind::Cloud;
                    ctx.save_config();
                    ctx.reload_provider();
                    tracing::info!("cloud credential updated");
                    Step::to(ProviderSetupState::new())
                }
                None => Step::stay(),
            },
            other => {
                self.input.handle_key(other);
                Step::stay()
            }
        }
    }

    pub fn render(&self, _ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("CLOUD SETUP");
        screen
            .line(Line::plain("To use the cloud model we need an Anthropic API key."))
            .line(Line::plain("It will be saved locally."))
            .blank()
            .line(Line::styled(self.input.display(), Tone::Input))
            .blank()
            .line(Line::styled("(Enter to save, Esc to cancel)", Tone::Help));
        screen
    }
}
