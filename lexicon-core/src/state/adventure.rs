//! Free adventure: narrate, act, get judged. No stats change here.

use crate::assessment::{AssessmentKind, AssessmentResult, GeneralAssessment};
use crate::context::GameContext;
use crate::event::{AssessmentRequest, Effect, Event, RequestId};
use crate::input::{Key, TextInput};
use crate::screen::{score_tone, spinner_frame, Line, Screen, Tone};

use super::{MenuState, Step};

#[derive(Debug)]
pub struct NarrativeState {
    content: String,
}

impl NarrativeState {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn enter(&mut self, ctx: &mut GameContext) -> Option<Effect> {
        ctx.narrative = self.content.clone();
        None
    }

    pub fn handle_event(&mut self, event: Event, _ctx: &mut GameContext) -> Step {
        match event {
            Event::Key(Key::Enter) => Step::to(ActionInputState::new()),
            Event::Key(Key::Esc) => Step::to(MenuState::new()),
            _ => Step::stay(),
        }
    }

    pub fn render(&self, _ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("DUNGEON MASTER");
        screen.paragraph(&self.content, Tone::Plain).blank().line(Line::styled(
            "Press [Enter] to take action... (Ctrl+S for Settings, Esc for menu)",
            Tone::Help,
        ));
        screen
    }
}

#[derive(Debug)]
pub struct ActionInputState {
    input: TextInput,
}

impl Default for ActionInputState {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionInputState {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("What do you do?"),
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
            Key::Esc => Step::to(MenuState::new()),
            Key::Enter => match self.input.submit() {
                Some(text) => {
                    ctx.last_input = text;
                    Step::to(ProcessingState::new())
                }
                None => Step::stay(),
            },
            other => {
                self.input.handle_key(other);
                Step::stay()
            }
        }
    }

    pub fn render(&self, ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("YOUR ACTION");
        if !ctx.narrative.is_empty() {
            screen.paragraph(&ctx.narrative, Tone::Muted).blank();
        }
        screen
            .line(Line::plain("Describe your action in English:"))
            .blank()
            .line(Line::styled(self.input.display(), Tone::Input));
        screen
    }
}

#[derive(Debug, Default)]
pub struct ProcessingState {
    request: Option<RequestId>,
    tick: usize,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> Option<RequestId> {
        self.request
    }

    pub fn enter(&mut self, ctx: &mut GameContext) -> Option<Effect> {
        let id = ctx.issue_request_id();
        self.request = Some(id);
        tracing::debug!(request = %id, "general assessment requested");

        Some(Effect::Assess(AssessmentRequest {
            id,
            kind: AssessmentKind::General {
                text: ctx.last_input.clone(),
            },
        }))
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        match event {
            Event::Tick => {
                self.tick = self.tick.wrapping_add(1);
                Step::stay()
            }
            Event::AssessmentCompleted(completion) if Some(completion.id) == self.request => {
                let assessment = match completion.outcome {
                    Ok(AssessmentResult::General(a)) => {
                        ctx.clear_failure();
                        a
                    }
                    Ok(_) => {
                        tracing::warn!(request = %completion.id, "assessment of the wrong mode, using fallback");
                        ctx.record_failure("unexpected assessment mode");
                        GeneralAssessment::fallback(&ctx.last_input)
                    }
                    Err(e) => {
                        tracing::warn!(request = %completion.id, error = %e, "assessment failed, using fallback");
                        ctx.record_failure(&e);
                        GeneralAssessment::fallback(&ctx.last_input)
                    }
                };
                ctx.last_assessment = Some(AssessmentResult::General(assessment));
                Step::to(ActionResultState)
            }
            _ => Step::stay(),
        }
    }

    pub fn render(&self, _ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("THINKING...");
        screen.line(Line::styled(
            format!(
                "{} The Dungeon Master is judging your grammar...",
                spinner_frame(self.tick)
            ),
            Tone::Highlight,
        ));
        screen
    }
}

#[derive(Debug, Default)]
pub struct ActionResultState;

impl ActionResultState {
    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        if !matches!(event, Event::Key(Key::Enter)) {
            return Step::stay();
        }
        let outcome = match &ctx.last_assessment {
            Some(AssessmentResult::General(a)) => a.outcome.clone(),
            _ => String::new(),
        };
        Step::to(NarrativeState::new(outcome))
    }

    pub fn render(&self, ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("ASSESSMENT");
        let Some(AssessmentResult::General(a)) = &ctx.last_assessment else {
            return screen;
        };

        screen.paragraph(&a.outcome, Tone::Plain).blank();
        if !a.corrected.is_empty() && a.corrected != ctx.last_input {
            screen.line(Line::styled(format!("Corrected: {}", a.corrected), Tone::Success));
        }
        screen
            .line(
                Line::plain("Score: ")
                    .push(format!("{}/10", a.score), score_tone(a.score))
                    .push(format!("  |  Damage: {}", a.damage), Tone::Plain),
            )
            .paragraph(&a.dm_comment, Tone::Muted);
        if let Some(error) = &ctx.last_error {
            screen.line(Line::styled(format!("(LLM error: {error})"), Tone::Muted));
        }
        screen
            .blank()
            .line(Line::styled("Press [Enter] to continue...", Tone::Help));
        screen
    }
}
