//! Grammar assessment: prompt building, provider invocation and decoding of
//! the structured reply into typed results.
//!
//! The client never panics or retries. Every failure comes back as an
//! [`AssessmentError`] and the issuing state decides on a fallback.

pub mod prompts;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::{ConversationTurn, Provider, ProviderError};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

#[derive(Debug, Error)]
pub enum AssessmentError {
    /// The provider call itself failed.
    #[error(transparent)]
    Transport(#[from] ProviderError),

    /// A reply arrived but did not match the expected shape.
    #[error("Could not decode assessment: {0}")]
    Decode(String),
}

fn default_relevant() -> bool {
    true
}

/// Result of a free-form action in adventure mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralAssessment {
    #[serde(default)]
    pub corrected: String,
    pub score: i32,
    pub damage: i32,
    #[serde(default)]
    pub dm_comment: String,
    #[serde(default)]
    pub outcome: String,
}

impl GeneralAssessment {
    pub fn fallback(input: &str) -> Self {
        Self {
            corrected: input.to_string(),
            score: 5,
            damage: 7,
            dm_comment: "The Dungeon Master squints at your words and shrugs.".to_string(),
            outcome: "Your action happens, more or less as intended.".to_string(),
        }
    }

    fn clamped(mut self) -> Self {
        self.score = self.score.clamp(MIN_SCORE, MAX_SCORE);
        self.damage = self.damage.max(0);
        self
    }
}

/// Result of an attack against the current enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAssessment {
    #[serde(default)]
    pub corrected: String,
    pub score: i32,
    pub damage_dealt: i32,
    pub damage_received: i32,
    #[serde(default)]
    pub dm_comment: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(default = "default_relevant")]
    pub is_relevant: bool,
}

impl CombatAssessment {
    pub fn fallback(input: &str) -> Self {
        Self {
            corrected: input.to_string(),
            score: 5,
            damage_dealt: 7,
            damage_received: 5,
            dm_comment: "The Dungeon Master is momentarily distracted...".to_string(),
            outcome: "Your attack connects, but so does the enemy's!".to_string(),
            is_relevant: true,
        }
    }

    fn clamped(mut self) -> Self {
        self.score = self.score.clamp(MIN_SCORE, MAX_SCORE);
        self.damage_dealt = self.damage_dealt.max(0);
        self.damage_received = self.damage_received.max(0);
        self
    }
}

/// Result of choosing a path between encounters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAssessment {
    #[serde(default)]
    pub corrected: String,
    pub score: i32,
    pub healing: i32,
    #[serde(default)]
    pub dm_comment: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(default = "default_relevant")]
    pub is_relevant: bool,
}

impl PathAssessment {
    pub fn fallback(input: &str) -> Self {
        Self {
            corrected: input.to_string(),
            score: 5,
            healing: 10,
            dm_comment: "The narrator lost their notes.".to_string(),
            outcome: "You find a peaceful spot to rest...".to_string(),
            is_relevant: true,
        }
    }

    fn clamped(mut self) -> Self {
        self.score = self.score.clamp(MIN_SCORE, MAX_SCORE);
        self.healing = self.healing.max(0);
        self
    }
}

/// A decoded assessment of any mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentResult {
    General(GeneralAssessment),
    Combat(CombatAssessment),
    PathChoice(PathAssessment),
}

impl AssessmentResult {
    pub fn score(&self) -> i32 {
        match self {
            AssessmentResult::General(a) => a.score,
            AssessmentResult::Combat(a) => a.score,
            AssessmentResult::PathChoice(a) => a.score,
        }
    }
}

/// What to assess, with the context each mode's prompt needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentKind {
    General {
        text: String,
    },
    Combat {
        text: String,
        enemy_name: String,
        location: String,
    },
    PathChoice {
        text: String,
        options: String,
    },
}

impl AssessmentKind {
    pub fn mode(&self) -> &'static str {
        match self {
            AssessmentKind::General { .. } => "general",
            AssessmentKind::Combat { .. } => "combat",
            AssessmentKind::PathChoice { .. } => "path_choice",
        }
    }
}

/// Locate the outermost `{...}` span so replies wrapped in prose or code
/// fences still decode.
fn json_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn decode<T: DeserializeOwned>(reply: &str) -> Result<T, AssessmentError> {
    let span = json_span(reply)
        .ok_or_else(|| AssessmentError::Decode("reply contains no JSON object".to_string()))?;
    serde_json::from_str(span).map_err(|e| AssessmentError::Decode(e.to_string()))
}

pub fn decode_general(reply: &str) -> Result<GeneralAssessment, AssessmentError> {
    decode::<GeneralAssessment>(reply).map(GeneralAssessment::clamped)
}

pub fn decode_combat(reply: &str) -> Result<CombatAssessment, AssessmentError> {
    decode::<CombatAssessment>(reply).map(CombatAssessment::clamped)
}

pub fn decode_path(reply: &str) -> Result<PathAssessment, AssessmentError> {
    decode::<PathAssessment>(reply).map(PathAssessment::clamped)
}

/// Builds prompts, asks the provider and decodes the reply.
#[derive(Clone)]
pub struct AssessmentClient {
    provider: Arc<dyn Provider>,
}

impl AssessmentClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn ask(&self, system: &str, text: &str) -> Result<String, AssessmentError> {
        let conversation = [ConversationTurn::system(system), ConversationTurn::user(text)];
        Ok(self.provider.complete(&conversation).await?)
    }

    pub async fn assess_general(&self, text: &str) -> Result<GeneralAssessment, AssessmentError> {
        let reply = self.ask(prompts::GENERAL_PROMPT, text).await?;
        decode_general(&reply)
    }

    pub async fn assess_combat(
        &self,
        text: &str,
        enemy_name: &str,
        location: &str,
    ) -> Result<CombatAssessment, AssessmentError> {
        let system = prompts::combat_prompt(enemy_name, location);
        let reply = self.ask(&system, text).await?;
        decode_combat(&reply)
    }

    pub async fn assess_path_choice(
        &self,
        text: &str,
        options: &str,
    ) -> Result<PathAssessment, AssessmentError> {
        let system = prompts::path_choice_prompt(options);
        let reply = self.ask(&system, text).await?;
        decode_path(&reply)
    }

    /// Dispatch on the request kind.
    pub async fn assess(&self, kind: &AssessmentKind) -> Result<AssessmentResult, AssessmentError> {
        match kind {
            AssessmentKind::General { text } => {
                self.assess_general(text).await.map(AssessmentResult::General)
            }
            AssessmentKind::Combat {
                text,
                enemy_name,
                location,
            } => self
                .assess_combat(text, enemy_name, location)
                .await
                .map(AssessmentResult::Combat),
            AssessmentKind::PathChoice { text, options } => self
                .assess_path_choice(text, options)
                .await
                .map(AssessmentResult::PathChoice),
        }
    }
}
