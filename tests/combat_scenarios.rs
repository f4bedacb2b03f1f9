//! Full-encounter combat tests.
//!
//! Scripted dice make whole fights hand-computable; a seeded RNG sweep
//! checks that arbitrary fights still reach a terminal outcome.

use gridfall::{
    BonusKind, CombatOutcome, CombatState, Command, Damageable, DecisionSource, Encounter, Enemy,
    NullDecisions, Player, Position, SequenceDice,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Decision source that says yes to every prompt and never uses bonuses.
struct AcceptPrompts;

impl DecisionSource for AcceptPrompts {
    fn next_command(&mut self) -> Command {
        Command::Quit
    }

    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }

    fn choose_bonus(&mut self, _available: &[BonusKind]) -> Option<BonusKind> {
        None
    }
}

#[test]
fn scripted_rat_fight_is_fully_accounted_for() {
    // Level 1: player 165 hp with a fist (rolls up to 20), rat 110 hp
    // rolling up to 16. Rolls alternate player / rat; the player always
    // rolls 20, the rat always 10, so the rat dies on the sixth swing.
    let mut player = Player::new(1, Position::origin());
    let rat = Enemy::rat(1, Position::new(0, 1));
    let mut dice = SequenceDice::new().with_rolls([20, 10, 20, 10, 20, 10, 20, 10, 20, 10, 20]);

    let encounter = Encounter::new(rat);
    let (outcome, events) = encounter.run(&mut player, &mut NullDecisions, &mut dice);

    assert_eq!(outcome, CombatOutcome::Victory { reward: 200 });
    assert_eq!(player.coins(), 200);
    assert_eq!(player.hp(), 165.0 - 5.0 * 10.0);
    assert!(!player.in_fight());

    let hits = events
        .iter()
        .filter(|e| matches!(e, gridfall::CombatEvent::PlayerHit { .. }))
        .count();
    let returns = events
        .iter()
        .filter(|e| matches!(e, gridfall::CombatEvent::EnemyHit { .. }))
        .count();
    assert_eq!(hits, 6);
    assert_eq!(returns, 5);
}

#[test]
fn defeated_skeleton_hands_over_its_revolver() {
    let mut player = Player::new(1, Position::origin());
    // kind roll 3 -> revolver, ammo roll 8
    let mut setup = SequenceDice::new().with_rolls([3, 8]);
    let skeleton = Enemy::skeleton(1, Position::new(0, 1), &mut setup);

    // the skeleton never lands a hit; the player kills it on swing six
    let mut dice = SequenceDice::new().with_rolls([20, 0, 20, 0, 20, 0, 20, 0, 20, 0, 20]);
    let encounter = Encounter::new(skeleton);
    let (outcome, _) = encounter.run(&mut player, &mut AcceptPrompts, &mut dice);

    assert_eq!(outcome, CombatOutcome::Victory { reward: 150 });
    assert_eq!(player.weapon().name(), "Revolver");
    assert_eq!(player.weapon().ammo(), Some(8));
    assert_eq!(player.coins(), 150);
    assert_eq!(player.hp(), 165.0);
}

#[test]
fn infection_keeps_draining_between_swings() {
    let mut player = Player::new(1, Position::origin());
    let rat = Enemy::rat(1, Position::new(0, 1));

    // Round 1: player rolls 12, rat infects (chance true), rat rolls 0.
    // Round 2 opens with an infection tick of 5.0 scaled to 5.5.
    let mut dice = SequenceDice::new()
        .with_rolls([12, 0, 12, 0])
        .with_chances([true, false]);

    let mut encounter = Encounter::new(rat);
    encounter.engage(&mut player);
    encounter.round(&mut player, &mut NullDecisions, &mut dice);
    assert_eq!(player.statuses()["infection"].turns_left, 3);

    encounter.round(&mut player, &mut NullDecisions, &mut dice);
    assert!((player.hp() - (165.0 - 5.5)).abs() < 1e-9);
    assert_eq!(player.statuses()["infection"].turns_left, 2);
    assert_eq!(encounter.state(), CombatState::InCombat);
}

#[test]
fn random_fights_always_terminate() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut player = Player::new(1, Position::origin());
        let rat = Enemy::rat(1, Position::new(0, 1));

        let mut encounter = Encounter::new(rat);
        encounter.engage(&mut player);
        for _ in 0..10_000 {
            encounter.round(&mut player, &mut NullDecisions, &mut rng);
            if encounter.outcome().is_some() {
                break;
            }
        }

        let outcome = encounter
            .outcome()
            .unwrap_or_else(|| panic!("fight with seed {seed} never resolved"));
        assert!(!player.in_fight());
        if let CombatOutcome::Victory { reward } = outcome {
            assert_eq!(reward, 200);
            assert_eq!(player.coins(), 200);
        }
    }
}
