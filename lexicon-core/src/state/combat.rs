//! The combat loop: attack, judgement, result, and the two ways it ends.

use rand::Rng;

use crate::assessment::{AssessmentKind, AssessmentResult, CombatAssessment};
use crate::catalog::Enemy;
use crate::context::{GameContext, MAX_PLAYER_HP};
use crate::event::{AssessmentRequest, Completion, Effect, Event, RequestId};
use crate::input::{Key, TextInput};
use crate::screen::{divider, hp_bar, score_tone, spinner_frame, status_bar, Line, Screen, Tone};

use super::{MenuState, PathChoiceState, Step};

/// Gold for defeating an enemy of `tier`: `tier*5` plus a bonus in `0..=tier*3`.
pub fn victory_gold<R: Rng + ?Sized>(tier: u8, rng: &mut R) -> u32 {
    let tier = u32::from(tier.max(1));
    tier * 5 + rng.gen_range(0..=tier * 3)
}

pub const VICTORY_XP: u32 = 10;

#[derive(Debug)]
pub struct CombatState {
    input: TextInput,
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatState {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("Describe your attack..."),
        }
    }

    pub fn enter(&mut self, ctx: &mut GameContext) -> Option<Effect> {
        if ctx.enemy.is_none() {
            ctx.spawn_enemy();
        }
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
                    Step::to(CombatProcessingState::new())
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
        let mut screen = Screen::new("⚔ COMBAT ⚔");
        let Some(enemy) = ctx.enemy.as_ref() else {
            screen.line(Line::styled("No enemy found!", Tone::Danger));
            return screen;
        };

        screen
            .line(
                Line::styled("LOCATION: ", Tone::Muted)
                    .push(enemy.location.as_str(), Tone::Highlight)
                    .push("    ENEMY: ", Tone::Muted)
                    .push(enemy.name.as_str(), Tone::Danger),
            )
            .blank()
            .line(Line::styled(format!("DM: {}", enemy.description), Tone::Heading))
            .blank()
            .line(hp_bar(&format!("{} HP", enemy.name), enemy.hp, enemy.max_hp, 20))
            .line(hp_bar("Your HP", ctx.stats.hp, MAX_PLAYER_HP, 20))
            .blank();

        if !ctx.narrative.is_empty() {
            screen.paragraph(&ctx.narrative, Tone::Plain).blank();
        }

        screen
            .line(divider())
            .blank()
            .line(Line::plain("YOUR ACTION:"))
            .line(Line::styled(self.input.display(), Tone::Input))
            .blank()
            .line(Line::styled(
                "(Type your combat action and press Enter, Esc to flee)",
                Tone::Help,
            ));
        screen
    }
}

#[derive(Debug, Default)]
pub struct CombatProcessingState {
    request: Option<RequestId>,
    tick: usize,
}

impl CombatProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> Option<RequestId> {
        self.request
    }

    pub fn enter(&mut self, ctx: &mut GameContext) -> Option<Effect> {
        let (enemy_name, location) = ctx
            .enemy
            .as_ref()
            .map(|e| (e.name.clone(), e.location.clone()))
            .unwrap_or_default();

        let id = ctx.issue_request_id();
        self.request = Some(id);
        tracing::debug!(request = %id, enemy = %enemy_name, "combat assessment requested");

        Some(Effect::Assess(AssessmentRequest {
            id,
            kind: AssessmentKind::Combat {
                text: ctx.last_input.clone(),
                enemy_name,
                location,
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
                let assessment = resolve(completion, ctx);
                if let Some(enemy) = ctx.enemy.as_mut() {
                    enemy.take_damage(assessment.damage_dealt);
                }
                ctx.stats.take_damage(assessment.damage_received);
                ctx.last_assessment = Some(AssessmentResult::Combat(assessment));
                Step::to(CombatResultState)
            }
            _ => Step::stay(),
        }
    }

    pub fn render(&self, _ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("⚔ COMBAT ⚔");
        screen.line(Line::styled(
            format!(
                "{} The Dungeon Master is judging your attack...",
                spinner_frame(self.tick)
            ),
            Tone::Highlight,
        ));
        screen
    }
}

/// The combat result carried by a completion, or the fixed fallback.
fn resolve(completion: Completion, ctx: &mut GameContext) -> CombatAssessment {
    match completion.outcome {
        Ok(AssessmentResult::Combat(assessment)) => {
            ctx.clear_failure();
            assessment
        }
        Ok(other) => {
            tracing::warn!(request = %completion.id, score = other.score(), "assessment of the wrong mode, using fallback");
            ctx.record_failure("unexpected assessment mode");
            CombatAssessment::fallback(&ctx.last_input)
        }
        Err(e) => {
            tracing::warn!(request = %completion.id, error = %e, "combat assessment failed, using fallback");
            ctx.record_failure(&e);
            CombatAssessment::fallback(&ctx.last_input)
        }
    }
}

#[derive(Debug, Default)]
pub struct CombatResultState;

impl CombatResultState {
    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        if !matches!(event, Event::Key(Key::Enter)) {
            return Step::stay();
        }

        if ctx.stats.is_dead() {
            tracing::info!(xp = ctx.stats.xp, gold = ctx.stats.gold, "player defeated");
            return Step::to(GameOverState);
        }

        if ctx.enemy.as_ref().is_some_and(Enemy::is_defeated) {
            if let Some(enemy) = ctx.enemy.take() {
                tracing::info!(enemy = %enemy.name, "enemy defeated");
                return Step::to(VictoryState::new(enemy));
            }
        }

        if let Some(AssessmentResult::Combat(a)) = &ctx.last_assessment {
            ctx.narrative = a.outcome.clone();
        }
        Step::to(CombatState::new())
    }

    pub fn render(&self, ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("⚔ COMBAT RESULT ⚔");
        let Some(AssessmentResult::Combat(a)) = &ctx.last_assessment else {
            screen.line(Line::styled("Nothing happened.", Tone::Muted));
            return screen;
        };

        screen
            .line(Line::styled("YOU SAID:", Tone::Heading))
            .line(Line::plain(format!("> {}", ctx.last_input)));
        if !a.corrected.is_empty() && a.corrected != ctx.last_input {
            screen
                .blank()
                .line(Line::styled("CORRECTED:", Tone::Heading))
                .line(Line::styled(format!("> {}", a.corrected), Tone::Success));
        }

        screen
            .blank()
            .line(divider())
            .line(Line::styled("RESULT:", Tone::Heading))
            .paragraph(&a.outcome, Tone::Plain);
        if !a.is_relevant {
            screen.line(Line::styled(
                "(That had little to do with the fight.)",
                Tone::Warning,
            ));
        }

        screen
            .blank()
            .line(
                Line::plain("Grammar Score: ").push(format!("{}/10", a.score), score_tone(a.score)),
            )
            .line(
                Line::plain("Damage Dealt: ")
                    .push(format!("-{}", a.damage_dealt), Tone::Success)
                    .push("    Damage Received: ", Tone::Plain)
                    .push(format!("-{}", a.damage_received), Tone::Danger),
            )
            .blank()
            .line(Line::styled("DM: ", Tone::Heading).push(a.dm_comment.as_str(), Tone::Plain))
            .blank();

        if let Some(enemy) = &ctx.enemy {
            screen.line(hp_bar(&enemy.name, enemy.hp, enemy.max_hp, 15));
        }
        screen
            .line(hp_bar("You", ctx.stats.hp, MAX_PLAYER_HP, 15))
            .blank();

        if let Some(error) = &ctx.last_error {
            screen
                .line(Line::styled(format!("(LLM error: {error})"), Tone::Muted))
                .blank();
        }
        screen.line(Line::styled("Press [Enter] to continue...", Tone::Help));
        screen
    }
}

/// Reward screen. Owns the defeated enemy; the gold is rolled on entry and
/// committed on confirm.
#[derive(Debug)]
pub struct VictoryState {
    defeated: Enemy,
    gold: u32,
}

impl VictoryState {
    pub fn new(defeated: Enemy) -> Self {
        Self { defeated, gold: 0 }
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn defeated(&self) -> &Enemy {
        &self.defeated
    }

    pub fn enter(&mut self, ctx: &mut GameContext) -> Option<Effect> {
        self.gold = victory_gold(self.defeated.tier, &mut ctx.rng);
        None
    }

    pub fn handle_event(&mut self, event: Event, ctx: &mut GameContext) -> Step {
        if !matches!(event, Event::Key(Key::Enter)) {
            return Step::stay();
        }

        ctx.stats.xp += VICTORY_XP;
        ctx.stats.gold += self.gold;
        tracing::info!(gold = self.gold, xp = VICTORY_XP, "victory reward committed");

        if ctx.rng.gen_bool(0.5) {
            let enemy = ctx.spawn_enemy();
            let narrative = format!("A {} appears! {}", enemy.name, enemy.description);
            ctx.narrative = narrative;
            Step::to(CombatState::new())
        } else {
            Step::to(PathChoiceState::new(&mut ctx.rng))
        }
    }

    pub fn render(&self, ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("VICTORY");
        screen
            .line(Line::styled("V I C T O R Y !", Tone::Success))
            .blank()
            .line(Line::plain(format!(
                "You have defeated the {}!",
                self.defeated.name
            )))
            .line(Line::plain("Your mastery of grammar prevails."))
            .blank()
            .line(
                Line::styled(format!("+{VICTORY_XP} XP    "), Tone::Plain)
                    .push(format!("+{} Gold", self.gold), Tone::Highlight),
            )
            .blank()
            .line(divider())
            .line(status_bar(
                ctx.stats.hp,
                MAX_PLAYER_HP,
                ctx.stats.gold + self.gold,
                ctx.stats.xp + VICTORY_XP,
            ))
            .blank()
            .line(Line::styled(
                "Press [Enter] to continue your journey...",
                Tone::Help,
            ));
        screen
    }
}

/// Terminal screen. Only confirm or `q` does anything, and both end the session.
#[derive(Debug, Default)]
pub struct GameOverState;

impl GameOverState {
    pub fn enter(&mut self, _ctx: &mut GameContext) -> Option<Effect> {
        None
    }

    pub fn handle_event(&mut self, event: Event, _ctx: &mut GameContext) -> Step {
        match event {
            Event::Key(Key::Enter | Key::Char('q' | 'Q')) => Step::quit(),
            _ => Step::stay(),
        }
    }

    pub fn render(&self, ctx: &GameContext) -> Screen {
        let mut screen = Screen::new("💀 DEFEAT 💀");
        screen
            .line(Line::styled("G A M E   O V E R", Tone::Danger))
            .blank()
            .line(Line::plain("Your grammar failed you..."))
            .line(Line::plain("The Kingdom of Lexicon mourns."))
            .blank()
            .line(
                Line::styled("Gold: ", Tone::Muted)
                    .push(ctx.stats.gold.to_string(), Tone::Highlight)
                    .push("  XP: ", Tone::Muted)
                    .push(ctx.stats.xp.to_string(), Tone::Plain),
            )
            .blank()
            .line(Line::styled("Press [Enter] or [Q] to exit.", Tone::Help));
        screen
    }
}
