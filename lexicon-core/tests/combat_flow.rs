//! Combat scenarios driven through the full state machine with a scripted provider.

use lexicon_core::assessment::AssessmentResult;
use lexicon_core::catalog::{Enemy, ENEMIES};
use lexicon_core::testing::{assert_enemy_invariant, assert_hp, assert_state, TestHarness};
use lexicon_core::{Event, GameState, Key, TurnRole};
use serde_json::json;

fn combat_reply(score: i32, dealt: i32, received: i32) -> serde_json::Value {
    json!({
        "corrected": "I attack the goblin with my sword.",
        "score": score,
        "damage_dealt": dealt,
        "damage_received": received,
        "dm_comment": "Adequate.",
        "outcome": "Steel meets goblin.",
        "is_relevant": true
    })
}

/// Start a run and replace the random enemy with a goblin at `hp`.
async fn fighting_goblin(hp: i32) -> TestHarness {
    let mut harness = TestHarness::new();
    harness.enter().await;
    assert_state(&harness, "Combat");

    let mut goblin = Enemy::spawn(&ENEMIES[0]);
    goblin.hp = hp;
    harness.ctx_mut().enemy = Some(goblin);
    harness
}

#[tokio::test]
async fn test_menu_start_resets_and_spawns() {
    let mut harness = TestHarness::new();
    harness.ctx_mut().stats.hp = 12;
    harness.ctx_mut().stats.gold = 40;

    harness.enter().await;

    assert_state(&harness, "Combat");
    assert_hp(&harness, 100);
    assert_eq!(harness.stats().gold, 0);
    assert_eq!(harness.stats().xp, 0);
    let enemy = harness.enemy().expect("combat needs an enemy");
    assert_eq!(enemy.hp, enemy.max_hp);
    assert!(harness
        .ctx()
        .narrative
        .starts_with("You enter the Kingdom of Lexicon, where words have power."));
}

#[tokio::test]
async fn test_attack_applies_damage_both_ways() {
    let mut harness = fighting_goblin(20).await;
    harness.provider.reply_json(combat_reply(9, 13, 3));

    harness.submit("I attack the goblin with my sword.").await;

    assert_state(&harness, "CombatResult");
    assert_eq!(harness.enemy().map(|e| e.hp), Some(7));
    assert_hp(&harness, 97);
    assert!(harness.ctx().last_error.is_none());
    match &harness.ctx().last_assessment {
        Some(AssessmentResult::Combat(a)) => assert_eq!(a.score, 9),
        other => panic!("expected combat assessment, got {other:?}"),
    }
}

#[tokio::test]
async fn test_combat_prompt_carries_enemy_context() {
    let mut harness = fighting_goblin(20).await;
    harness.provider.reply_json(combat_reply(7, 10, 6));

    harness.submit("I stab the goblin.").await;

    let conversations = harness.provider.conversations();
    assert_eq!(conversations.len(), 1);
    let turns = &conversations[0];
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::System);
    assert!(turns[0].content.contains("Goblin at The Murky Swamp"));
    assert_eq!(turns[1].role, TurnRole::User);
    assert_eq!(turns[1].content, "I stab the goblin.");
}

#[tokio::test]
async fn test_exchange_continues_with_outcome_as_narrative() {
    let mut harness = fighting_goblin(30).await;
    harness.provider.reply_json(combat_reply(6, 5, 8));

    harness.submit("I poke it.").await;
    harness.enter().await;

    assert_state(&harness, "Combat");
    assert_eq!(harness.ctx().narrative, "Steel meets goblin.");
    assert_eq!(harness.enemy().map(|e| e.hp), Some(25));
    assert!(harness.screen_text().contains("Steel meets goblin."));
}

#[tokio::test]
async fn test_victory_reward_for_tier_one() {
    let mut harness = fighting_goblin(5).await;
    harness.provider.reply_json(combat_reply(9, 13, 3));

    harness.submit("I attack the goblin with my sword.").await;
    assert_eq!(harness.enemy().map(|e| e.hp), Some(0));

    harness.enter().await;
    assert_state(&harness, "Victory");
    assert!(harness.enemy().is_none(), "victory consumes the enemy");

    let pending_gold = match harness.game.state() {
        GameState::Victory(v) => v.gold(),
        other => panic!("expected victory, got {}", other.name()),
    };
    assert!((5..=8).contains(&pending_gold));
    // Nothing is committed until confirm.
    assert_eq!(harness.stats().gold, 0);

    harness.enter().await;
    assert_eq!(harness.stats().xp, 10);
    assert_eq!(harness.stats().gold, pending_gold);
    assert!(matches!(harness.state_name(), "Combat" | "PathChoice"));
    assert_enemy_invariant(&harness);
}

#[tokio::test]
async fn test_transport_failure_uses_fallback() {
    let mut harness = fighting_goblin(30).await;
    harness.provider.fail("connection refused");

    harness.submit("I swing wildly.").await;

    assert_state(&harness, "CombatResult");
    let error = harness.ctx().last_error.clone().unwrap_or_default();
    assert!(!error.is_empty());
    assert!(error.contains("connection refused"));
    match &harness.ctx().last_assessment {
        Some(AssessmentResult::Combat(a)) => {
            assert_eq!((a.score, a.damage_dealt, a.damage_received), (5, 7, 5));
            assert_eq!(a.corrected, "I swing wildly.");
        }
        other => panic!("expected fallback combat assessment, got {other:?}"),
    }
    assert_eq!(harness.enemy().map(|e| e.hp), Some(23));
    assert_hp(&harness, 95);
}

#[tokio::test]
async fn test_decode_failure_uses_fallback_then_clears_error() {
    let mut harness = fighting_goblin(30).await;
    harness.provider.reply("The goblin is unimpressed by your syntax.");
    harness.provider.reply_json(combat_reply(8, 12, 4));

    harness.submit("I hits it.").await;
    assert_state(&harness, "CombatResult");
    assert!(harness.ctx().last_error.is_some());

    harness.enter().await;
    harness.submit("I hit it.").await;
    assert_state(&harness, "CombatResult");
    assert!(harness.ctx().last_error.is_none());
}

#[tokio::test]
async fn test_defeat_is_terminal() {
    let mut harness = fighting_goblin(30).await;
    harness.ctx_mut().stats.hp = 3;
    harness.provider.reply_json(combat_reply(2, 1, 15));

    harness.submit("me hit").await;
    assert_hp(&harness, 0);

    harness.enter().await;
    assert_state(&harness, "GameOver");
    assert!(harness.enemy().is_none());

    for key in [
        Key::Char('x'),
        Key::Esc,
        Key::Up,
        Key::Settings,
        Key::Backspace,
    ] {
        harness.key(key).await;
        assert_state(&harness, "GameOver");
    }
    harness.send(Event::Tick).await;
    assert_state(&harness, "GameOver");
    assert!(!harness.has_quit());

    harness.enter().await;
    assert!(harness.has_quit());
}

#[tokio::test]
async fn test_defeat_takes_priority_over_victory() {
    let mut harness = fighting_goblin(4).await;
    harness.ctx_mut().stats.hp = 2;
    harness.provider.reply_json(combat_reply(5, 10, 10));

    harness.submit("We both fall.").await;
    harness.enter().await;

    assert_state(&harness, "GameOver");
}

#[tokio::test]
async fn test_empty_submission_is_rejected_in_place() {
    let mut harness = fighting_goblin(30).await;

    harness.enter().await;
    harness.submit("    ").await;

    assert_state(&harness, "Combat");
    assert_eq!(harness.provider.calls(), 0);
}

#[tokio::test]
async fn test_escape_flees_to_menu() {
    let mut harness = fighting_goblin(30).await;

    harness.key(Key::Esc).await;

    assert_state(&harness, "Menu");
    assert!(harness.enemy().is_none());
}

#[tokio::test]
async fn test_health_stays_in_bounds_for_any_reply() {
    let mut harness = TestHarness::new();
    harness.enter().await;

    for (dealt, received) in [(-40, -40), (0, 250), (999, 0), (3, -1)] {
        harness.ctx_mut().stats.hp = 60;
        harness.ctx_mut().enemy = Some(Enemy::spawn(&ENEMIES[5]));
        harness.provider.reply_json(combat_reply(5, dealt, received));

        harness.submit("I act.").await;

        let hp = harness.stats().hp;
        assert!((0..=100).contains(&hp), "player hp {hp}");
        let enemy = harness.enemy().expect("still fighting");
        assert!((0..=enemy.max_hp).contains(&enemy.hp), "enemy hp {}", enemy.hp);

        harness.jump_to(lexicon_core::state::CombatState::new()).await;
    }
}
