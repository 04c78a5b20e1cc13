//! Crossroads, victory rewards and the free adventure flow.

use lexicon_core::assessment::AssessmentResult;
use lexicon_core::catalog::{Enemy, ENEMIES};
use lexicon_core::state::{GameState, PathChoiceState, VictoryState};
use lexicon_core::testing::{assert_enemy_invariant, assert_hp, assert_state, TestHarness};
use lexicon_core::{Key, TurnRole};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

fn path_reply(score: i32, healing: i32) -> serde_json::Value {
    json!({
        "corrected": "I take the old bridge.",
        "score": score,
        "healing": healing,
        "dm_comment": "Brave.",
        "outcome": "The planks hold.",
        "is_relevant": true
    })
}

async fn at_crossroads(seed: u64) -> TestHarness {
    let mut harness = TestHarness::new();
    let mut rng = StdRng::seed_from_u64(seed);
    harness.jump_to(PathChoiceState::new(&mut rng)).await;
    assert_state(&harness, "PathChoice");
    harness
}

#[tokio::test]
async fn test_path_choice_heals_and_leads_to_combat() {
    let mut harness = at_crossroads(1).await;
    harness.ctx_mut().stats.hp = 50;
    harness.provider.reply_json(path_reply(7, 14));

    harness.submit("I take the old bridge.").await;
    assert_state(&harness, "PathResult");
    assert_hp(&harness, 64);
    assert!(harness.enemy().is_none());

    harness.enter().await;
    assert_state(&harness, "Combat");
    assert_enemy_invariant(&harness);
    assert!(harness.ctx().narrative.starts_with("As you travel, a "));
}

#[tokio::test]
async fn test_path_prompt_lists_three_offered_paths() {
    let mut harness = at_crossroads(2).await;
    let offered: Vec<&str> = match harness.game.state() {
        GameState::PathChoice(s) => s.paths().iter().map(|p| p.name).collect(),
        other => panic!("expected path choice, got {}", other.name()),
    };
    assert_eq!(offered.len(), 3);
    harness.provider.reply_json(path_reply(7, 14));

    harness.submit("I go left.").await;

    let turns = &harness.provider.conversations()[0];
    assert_eq!(turns[0].role, TurnRole::System);
    for (i, name) in offered.iter().enumerate() {
        assert!(turns[0].content.contains(&format!("{}. {name} - ", i + 1)));
    }
}

#[tokio::test]
async fn test_healing_is_capped() {
    for (start, reported, expected_hp, expected_applied) in
        [(50, 45, 70, 20), (95, 20, 100, 20), (40, -5, 40, 0), (10, 12, 22, 12)]
    {
        let mut harness = at_crossroads(3).await;
        harness.ctx_mut().stats.hp = start;
        harness.provider.reply_json(path_reply(9, reported));

        harness.submit("I walk into the meadow.").await;

        assert_hp(&harness, expected_hp);
        match harness.game.state() {
            GameState::PathResult(s) => assert_eq!(s.healing(), expected_applied),
            other => panic!("expected path result, got {}", other.name()),
        }
    }
}

#[tokio::test]
async fn test_path_failure_heals_fallback_amount() {
    let mut harness = at_crossroads(4).await;
    harness.ctx_mut().stats.hp = 30;
    harness.provider.fail("timeout");

    harness.submit("I choose the cave.").await;

    assert_state(&harness, "PathResult");
    assert_hp(&harness, 40);
    assert!(harness.ctx().last_error.is_some());
    match &harness.ctx().last_assessment {
        Some(AssessmentResult::PathChoice(a)) => {
            assert_eq!(a.outcome, "You find a peaceful spot to rest...");
            assert_eq!(a.score, 5);
        }
        other => panic!("expected path fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn test_victory_gold_range_per_tier() {
    for template in ENEMIES {
        let tier = u32::from(template.tier);
        for _ in 0..25 {
            let mut harness = TestHarness::new();
            let mut defeated = Enemy::spawn(template);
            defeated.hp = 0;
            harness.jump_to(VictoryState::new(defeated)).await;

            harness.enter().await;

            let gold = harness.stats().gold;
            assert!(
                gold >= tier * 5 && gold <= tier * 5 + tier * 3,
                "{}: {gold}",
                template.name
            );
            assert_eq!(harness.stats().xp, 10);
        }
    }
}

#[tokio::test]
async fn test_victory_branches_over_many_seeds() {
    let mut saw_combat = false;
    let mut saw_path = false;
    for seed in 0..40 {
        let mut harness = TestHarness::with_config(
            lexicon_core::Config {
                provider: lexicon_core::ProviderKind::Local,
                ..Default::default()
            },
            seed,
        );
        harness
            .jump_to(VictoryState::new(Enemy::spawn(&ENEMIES[2])))
            .await;
        harness.enter().await;

        match harness.state_name() {
            "Combat" => {
                saw_combat = true;
                assert!(harness.ctx().narrative.contains(" appears! "));
            }
            "PathChoice" => saw_path = true,
            other => panic!("unexpected state after victory: {other}"),
        }
        assert_enemy_invariant(&harness);
    }
    assert!(saw_combat && saw_path);
}

#[tokio::test]
async fn test_free_adventure_round_trip() {
    let mut harness = TestHarness::new();
    harness.ctx_mut().stats.hp = 100;
    harness.key(Key::Down).await;
    harness.enter().await;
    assert_state(&harness, "Narrative");

    harness.enter().await;
    assert_state(&harness, "ActionInput");

    harness.provider.reply_json(json!({
        "corrected": "I open the gate.",
        "score": 8,
        "damage": 12,
        "dm_comment": "Acceptable.",
        "outcome": "The gate creaks open."
    }));
    harness.submit("I opens the gate.").await;
    assert_state(&harness, "ActionResult");
    assert!(harness.screen_text().contains("Corrected: I open the gate."));
    assert_hp(&harness, 100);

    harness.enter().await;
    assert_state(&harness, "Narrative");
    assert_eq!(harness.ctx().narrative, "The gate creaks open.");
    assert!(harness.enemy().is_none());
}

#[tokio::test]
async fn test_free_adventure_failure_and_escape() {
    let mut harness = TestHarness::new();
    harness.key(Key::Down).await;
    harness.enter().await;
    harness.enter().await;
    harness.provider.fail("backend offline");

    harness.submit("I look around.").await;
    assert_state(&harness, "ActionResult");
    assert!(harness
        .screen_text()
        .contains("(LLM error: Request failed: backend offline)"));

    harness.enter().await;
    harness.key(Key::Esc).await;
    assert_state(&harness, "Menu");
}
