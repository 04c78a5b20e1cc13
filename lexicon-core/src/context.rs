//! Shared game context: player stats, the active enemy, the last assessment
//! and the collaborators states need (assessment client, config, randomness).
//!
//! Owned by [`Game`](crate::Game) and passed by `&mut` into every state
//! operation; only the current state mutates it.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assessment::{AssessmentClient, AssessmentResult};
use crate::catalog::{self, Enemy};
use crate::config::Config;
use crate::event::RequestId;
use crate::provider::{build_provider, ProviderSelection};

pub const MAX_PLAYER_HP: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStats {
    pub hp: i32,
    pub xp: u32,
    pub gold: u32,
    /// Words the player has used well. Not consulted by the rules yet.
    pub vocabulary: BTreeSet<String>,
    /// Recurring grammar problems. Not consulted by the rules yet.
    pub weaknesses: BTreeSet<String>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            hp: MAX_PLAYER_HP,
            xp: 0,
            gold: 0,
            vocabulary: BTreeSet::new(),
            weaknesses: BTreeSet::new(),
        }
    }
}

impl PlayerStats {
    /// Negative amounts count as zero. Health never drops below 0.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).clamp(0, MAX_PLAYER_HP);
    }

    /// Negative amounts count as zero. Health never exceeds the cap.
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).clamp(0, MAX_PLAYER_HP);
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

/// Turns a configuration into a provider. Swapped out in tests.
pub type ProviderFactory = Box<dyn Fn(&Config) -> ProviderSelection + Send + Sync>;

pub struct GameContext {
    pub stats: PlayerStats,
    pub enemy: Option<Enemy>,
    pub last_input: String,
    pub last_assessment: Option<AssessmentResult>,
    /// Story text carried into the next combat or adventure screen.
    pub narrative: String,
    /// Text of the most recent assessment failure, cleared on success.
    pub last_error: Option<String>,
    /// One-off message for the footer (provider fallback, save failure).
    pub notice: Option<String>,
    pub viewport: Viewport,
    pub config: Config,
    pub rng: StdRng,
    config_path: Option<PathBuf>,
    client: AssessmentClient,
    factory: ProviderFactory,
    next_request: u64,
}

impl fmt::Debug for GameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameContext")
            .field("stats", &self.stats)
            .field("enemy", &self.enemy)
            .field("provider", &self.client.provider_name())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl GameContext {
    /// Context for a real session: providers come from [`build_provider`] and
    /// config changes are written to `config_path`.
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        Self::with_factory(
            config,
            Some(config_path),
            Box::new(build_provider),
            StdRng::from_entropy(),
        )
    }

    pub fn with_factory(
        config: Config,
        config_path: Option<PathBuf>,
        factory: ProviderFactory,
        rng: StdRng,
    ) -> Self {
        let ProviderSelection { provider, notice } = factory(&config);
        Self {
            stats: PlayerStats::default(),
            enemy: None,
            last_input: String::new(),
            last_assessment: None,
            narrative: String::new(),
            last_error: None,
            notice,
            viewport: Viewport::default(),
            config,
            rng,
            config_path,
            client: AssessmentClient::new(provider),
            factory,
            next_request: 0,
        }
    }

    pub fn client(&self) -> &AssessmentClient {
        &self.client
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn issue_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    /// Rebuild the assessment client after the provider choice changed.
    pub fn reload_provider(&mut self) {
        let ProviderSelection { provider, notice } = (self.factory)(&self.config);
        self.client = AssessmentClient::new(provider);
        self.notice = notice;
        tracing::info!(provider = self.client.provider_name(), "assessment provider reloaded");
    }

    /// Persist the current config. Failures are logged and shown, never fatal.
    pub fn save_config(&mut self) {
        let Some(path) = self.config_path.as_deref() else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            tracing::warn!(error = %e, path = %path.display(), "failed to save config");
            self.notice = Some(format!("Could not save settings: {e}"));
        }
    }

    /// Fresh stats and a new random enemy.
    pub fn start_new_run(&mut self) {
        self.stats.reset();
        self.last_assessment = None;
        self.last_error = None;
        self.spawn_enemy();
    }

    pub fn spawn_enemy(&mut self) -> &Enemy {
        let enemy = catalog::random_enemy(&mut self.rng);
        tracing::debug!(enemy = %enemy.name, tier = enemy.tier, "enemy spawned");
        self.enemy.insert(enemy)
    }

    pub fn record_failure(&mut self, error: impl fmt::Display) {
        self.last_error = Some(error.to_string());
    }

    pub fn clear_failure(&mut self) {
        self.last_error = None;
    }
}
