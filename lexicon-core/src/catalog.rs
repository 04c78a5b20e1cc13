//! Static content: the enemy roster and the paths offered between fights.

use rand::seq::SliceRandom;
use rand::Rng;

/// A catalog entry. Instances are spawned from it at full health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub name: &'static str,
    pub max_hp: i32,
    pub location: &'static str,
    pub description: &'static str,
    /// Difficulty rank 1..=4, scales victory rewards.
    pub tier: u8,
}

pub const ENEMIES: &[EnemyTemplate] = &[
    EnemyTemplate {
        name: "Goblin",
        max_hp: 30,
        location: "The Murky Swamp",
        description: "A sneaky goblin with a rusty dagger, muttering broken sentences.",
        tier: 1,
    },
    EnemyTemplate {
        name: "Syntax Spider",
        max_hp: 35,
        location: "The Web of Words",
        description: "A giant spider that weaves webs of confusing clauses.",
        tier: 1,
    },
    EnemyTemplate {
        name: "Skeleton",
        max_hp: 40,
        location: "The Crypt of Conjugations",
        description: "A rattling skeleton that speaks only in past tense.",
        tier: 2,
    },
    EnemyTemplate {
        name: "Dark Wizard",
        max_hp: 60,
        location: "The Tower of Tenses",
        description: "A hooded figure casting spells with perfectly structured incantations.",
        tier: 3,
    },
    EnemyTemplate {
        name: "Troll",
        max_hp: 80,
        location: "The Whispering Woods",
        description: "A massive troll with a wooden club. He mocks your grammar mistakes.",
        tier: 3,
    },
    EnemyTemplate {
        name: "Grammar Golem",
        max_hp: 100,
        location: "The Lexicon Library",
        description: "A towering construct made of ancient dictionaries and thesauri.",
        tier: 4,
    },
];

/// The enemy currently being fought.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub location: String,
    pub description: String,
    pub tier: u8,
}

impl Enemy {
    pub fn spawn(template: &EnemyTemplate) -> Self {
        Self {
            name: template.name.to_string(),
            hp: template.max_hp,
            max_hp: template.max_hp,
            location: template.location.to_string(),
            description: template.description.to_string(),
            tier: template.tier,
        }
    }

    /// Subtract `amount` (negative amounts count as zero), clamping to [0, max].
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp);
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }
}

/// Uniform draw from the roster.
pub fn random_enemy<R: Rng + ?Sized>(rng: &mut R) -> Enemy {
    let template = ENEMIES.choose(rng).unwrap_or(&ENEMIES[0]);
    Enemy::spawn(template)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOption {
    pub name: &'static str,
    pub description: &'static str,
}

pub const PATHS: &[PathOption] = &[
    PathOption {
        name: "The Misty Forest",
        description: "A winding path through ancient trees shrouded in fog.",
    },
    PathOption {
        name: "The Crystal Cave",
        description: "A glittering cavern with echoing whispers.",
    },
    PathOption {
        name: "The Old Bridge",
        description: "A creaky wooden bridge over a rushing river.",
    },
    PathOption {
        name: "The Abandoned Tower",
        description: "A crumbling tower that once housed great scholars.",
    },
    PathOption {
        name: "The Meadow of Echoes",
        description: "A peaceful meadow where your words linger.",
    },
];

/// Draw `count` distinct paths (fewer if the roster is smaller).
pub fn choose_paths<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<PathOption> {
    PATHS.choose_multiple(rng, count).copied().collect()
}

/// Numbered list as shown to the player and embedded in the path prompt.
pub fn format_path_options(paths: &[PathOption]) -> String {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {} - {}\n", i + 1, p.name, p.description))
        .collect()
}
