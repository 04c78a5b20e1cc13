//! The crossroads between fights: pick a path, get judged, heal.

use rand::Rng;

use crate::assessment::{AssessmentKind, AssessmentResult, PathAssessment};
use crate::catalog::{choose_paths, format_path_options, PathOption};
use crate::context::{GameContext, MAX_PLAYER_HP};
use crate::event::{AssessmentRequest, Effect, Event, RequestId};
use crate::input::{Key, TextInput};
use crate::screen::{divider, score_tone, spinner_frame, status_bar, Line, Screen, Tone};

use super::{CombatState, Step};

/// Upper bound on healing from one path choice.
pub const MAX_PATH_HEALING: i32 = 20;

const PATHS_OFFERED: usize = 3;

#[derive(Debug)]
pub struct PathChoiceState {
    paths: Vec<PathOption>,
    input: TextInput,
}

impl PathChoiceState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            paths: choose_paths(rng, PATHS_OFFERED),
            input: TextInput::new("Describe which path you take..."),
        }
    }

    pub fn paths(&self) -> &[PathOption] {
        &self.paths
    }

    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        let Event::Key(key) = event else {
            return Step::stay();
        };

        match key {
            Key::Enter => match self.input.submit() {
                Some(text) => {
                    ctx.last_input = text;
                    Step::to(PathProcessingState::new(format_path_options(&self.paths)))
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
        let mut screen = Screen::new("CROSSROADS");
        screen
            .line(status_bar(
                ctx.stats.hp,
                MAX_PLAYER_HP,
                ctx.stats.gold,
                ctx.stats.xp,
            ))
            .blank()
            .line(Line::styled("You come to a crossroads...", Tone::Heading))
            .blank()
            .line(Line::plain("Choose your path:"));
        for (i, path) in self.paths.iter().enumerate() {
            screen
                .line(
                    Line::plain(format!("  {}. ", i + 1)).push(path.name, Tone::Highlight),
                )
                .line(Line::styled(format!("     {}", path.description), Tone::Muted));
        }
        screen
            .blank()
            .line(divider())
            .line(Line::plain("Describe your choice in a complete sentence:"))
            .line(Line::styled(format!("> {}", self.input.display()), Tone::Input))
            .blank()
            .line(Line::styled("(Better grammar = more healing!)", Tone::Help));
        screen
    }
}

#[derive(Debug)]
pub struct PathProcessingState {
    options: String,
    request: Option<RequestId>,
    tick: usize,
}

impl PathProcessingState {
    pub fn new(options: String) -> Self {
        Self {
            options,
            request: None,
            tick: 0,
        }
    }

    pub fn request(&self) -> Option<RequestId> {
        self.request
    }

    pub fn enter(&mut self, ctx: &mut GameContext) -> Option<Effect> {
        let id = ctx.issue_request_id();
        self.request = Some(id);
        tracing::debug!(request = %id, "path assessment requested");

        Some(Effect::Assess(AssessmentRequest {
            id,
            kind: AssessmentKind::PathChoice {
                text: ctx.last_input.clone(),
                options: self.options.clone(),
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
                    Ok(AssessmentResult::PathChoice(a)) => {
                        ctx.clear_failure();
                        a
                    }
                    Ok(_) => {
                        tracing::warn!(request = %completion.id, "assessment of the wrong mode, using fallback");
                        ctx.record_failure("unexpected assessment mode");
                        PathAssessment::fallback(&ctx.last_input)
                    }
                    Err(e) => {
                        tracing::warn!(request = %completion.id, error = %e, "path assessment failed, using fallback");
                        ctx.record_failure(&e);
                        PathAssessment::fallback(&ctx.last_input)
                    }
                };

                let healing = assessment.healing.clamp(0, MAX_PATH_HEALING);
                ctx.stats.heal(healing);
                ctx.last_assessment = Some(AssessmentResult::PathChoice(assessment));
                Step::to(PathResultState::new(healing))
            }
            _ => Step::stay(),
        }
    }

    pub fn render(&self, _ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("🛤 CROSSROADS 🛤");
        screen.line(Line::styled(
            format!(
                "{} The Dungeon Master considers your path...",
                spinner_frame(self.tick)
            ),
            Tone::Highlight,
        ));
        screen
    }
}

fn score_stars(score: i32) -> &'static str {
    match score {
        s if s >= 9 => "★★★",
        s if s >= 7 => "★★☆",
        s if s >= 5 => "★☆☆",
        _ => "☆☆☆",
    }
}

#[derive(Debug)]
pub struct PathResultState {
    healing: i32,
}

impl PathResultState {
    pub fn new(healing: i32) -> Self {
        Self { healing }
    }

    /// Health actually restored, after the per-choice cap.
    pub fn healing(&self) -> i32 {
        self.healing
    }

    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        if !matches!(event, Event::Key(Key::Enter)) {
            return Step::stay();
        }

        let enemy = ctx.spawn_enemy();
        let narrative = format!(
            "As you travel, a {} blocks your path! {}",
            enemy.name, enemy.description
        );
        ctx.narrative = narrative;
        Step::to(CombatState::new())
    }

    pub fn render(&self, ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("PATH RESULT");
        let Some(AssessmentResult::PathChoice(a)) = &ctx.last_assessment else {
            screen.line(Line::styled("The road is quiet.", Tone::Muted));
            return screen;
        };

        let corrected = if a.corrected.is_empty() {
            ctx.last_input.as_str()
        } else {
            a.corrected.as_str()
        };
        let tone = score_tone(a.score);

        screen
            .line(Line::styled("YOUR CHOICE:", Tone::Heading))
            .line(Line::plain(format!("> {corrected}")))
            .blank()
            .line(divider())
            .paragraph(&a.outcome, Tone::Plain)
            .blank()
            .line(
                Line::plain("Score: ")
                    .push(format!("{}/10 {}", a.score, score_stars(a.score)), tone)
                    .push("  |  Health Restored: ", Tone::Plain)
                    .push(format!("+{}", self.healing), Tone::Success),
            )
            .blank()
            .line(Line::styled("DM: ", Tone::Heading).push(a.dm_comment.as_str(), Tone::Plain));
        if !a.is_relevant {
            screen.line(Line::styled(
                "(The road does not care for off-topic musings.)",
                Tone::Warning,
            ));
        }
        if let Some(error) = &ctx.last_error {
            screen.line(Line::styled(format!("(LLM error: {error})"), Tone::Muted));
        }
        screen
            .blank()
            .line(status_bar(
                ctx.stats.hp,
                MAX_PLAYER_HP,
                ctx.stats.gold,
                ctx.stats.xp,
            ))
            .blank()
            .line(Line::styled("Press [Enter] to continue...", Tone::Help));
        screen
    }
}
