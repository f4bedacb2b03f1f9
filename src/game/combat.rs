//! # Combat Module
//!
//! Turn-resolution state machine between the player and one active enemy.
//!
//! An [`Encounter`] moves through `NotFighting -> InCombat ->
//! Resolved(Victory | Defeat | Fled)`. Each round follows a fixed protocol:
//! status ticks, the player's resource step, the player's attack, the
//! enemy's pre-turn hook, the enemy's attack, with terminal checks woven
//! in between. Every observable step is reported as a [`CombatEvent`] so the
//! display collaborator can narrate the fight.

use crate::game::bonuses::{BonusKind, BonusOutcome};
use crate::game::dice::Dice;
use crate::game::enemies::{Enemy, EnemyAction};
use crate::game::player::Player;
use crate::game::{Attacker, Damageable};
use crate::input::DecisionSource;
use log::info;
use std::fmt;

/// Terminal result of an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// The enemy died; its reward was credited to the player.
    Victory { reward: u32 },
    /// The player died.
    Defeat,
    /// The enemy fled; the player keeps the board cell.
    Fled,
}

/// Where an encounter currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatState {
    NotFighting,
    InCombat,
    Resolved(CombatOutcome),
}

/// One observable step of a combat round, for display purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// Active statuses dealt this much damage at the start of the round.
    StatusTick { total_damage: f64 },
    /// A status ran out of turns.
    StatusExpired { name: String },
    /// The enemy inflicted a new status on the player.
    StatusInflicted { name: String, turns: u32 },
    /// The player used a stored bonus.
    BonusUsed { kind: BonusKind, outcome: BonusOutcome },
    /// The player auto-bought ammo for a dry ranged weapon.
    AmmoPurchased { kind: BonusKind, outcome: BonusOutcome },
    /// The player's attack landed (possibly for zero).
    PlayerHit { damage: f64, enemy_hp: f64 },
    /// The enemy's attack landed.
    EnemyHit { damage: f64, player_hp: f64 },
    /// The enemy fled.
    EnemyFled { name: String },
    /// The spider called for help. Nothing actually spawns.
    ReinforcementsCalled { name: String },
    /// The player took the defeated enemy's weapon.
    WeaponLooted { name: String },
    /// The enemy died and the reward was credited.
    Victory { reward: u32 },
    /// The player died.
    Defeat,
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::StatusTick { total_damage } => {
                write!(f, "Statuses deal {total_damage:.1} damage")
            }
            CombatEvent::StatusExpired { name } => write!(f, "Status {name} wore off"),
            CombatEvent::StatusInflicted { name, turns } => {
                write!(f, "You are afflicted with {name} for {turns} turns")
            }
            CombatEvent::BonusUsed { kind, outcome } => write!(f, "Used {kind}: {outcome}"),
            CombatEvent::AmmoPurchased { kind, outcome } => {
                write!(f, "Bought {kind}: {outcome}")
            }
            CombatEvent::PlayerHit { damage, enemy_hp } => {
                write!(f, "You hit for {damage:.1} (enemy at {enemy_hp:.1} HP)")
            }
            CombatEvent::EnemyHit { damage, player_hp } => {
                write!(f, "Enemy hits for {damage:.1} (you at {player_hp:.1} HP)")
            }
            CombatEvent::EnemyFled { name } => write!(f, "The {name} fled!"),
            CombatEvent::ReinforcementsCalled { name } => {
                write!(f, "The {name} calls for reinforcements!")
            }
            CombatEvent::WeaponLooted { name } => write!(f, "You take the {name}"),
            CombatEvent::Victory { reward } => write!(f, "Victory! +{reward} coins"),
            CombatEvent::Defeat => write!(f, "You died."),
        }
    }
}

/// A fight between the player and one enemy.
pub struct Encounter {
    enemy: Enemy,
    state: CombatState,
}

impl Encounter {
    /// Wraps an enemy without starting the fight yet.
    pub fn new(enemy: Enemy) -> Self {
        Self {
            enemy,
            state: CombatState::NotFighting,
        }
    }

    /// Starts the fight, raising the player's fight flag.
    pub fn engage(&mut self, player: &mut Player) {
        if self.state == CombatState::NotFighting {
            player.begin_fight();
            self.state = CombatState::InCombat;
            info!("combat started against {}", self.enemy.name());
        }
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    /// The terminal outcome, once resolved.
    pub fn outcome(&self) -> Option<CombatOutcome> {
        match self.state {
            CombatState::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Plays one full round. Does nothing unless the encounter is in combat.
    pub fn round(
        &mut self,
        player: &mut Player,
        decisions: &mut dyn DecisionSource,
        dice: &mut dyn Dice,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        if self.state != CombatState::InCombat {
            return events;
        }

        // 1. Pending status ticks.
        if player.has_statuses() {
            let tick = player.tick_statuses();
            events.push(CombatEvent::StatusTick {
                total_damage: tick.total_damage,
            });
            for name in tick.expired {
                events.push(CombatEvent::StatusExpired { name });
            }
            if !player.is_alive() {
                self.resolve_defeat(player, &mut events);
                return events;
            }
        }

        // 2. Resource step: offer stored bonuses, then auto-buy ammo for a
        // dry ranged weapon if the balance covers it.
        let stored = player.stored_kinds();
        if !stored.is_empty() {
            if let Some(kind) = decisions.choose_bonus(&stored) {
                if let Some(outcome) = player.use_bonus(kind) {
                    events.push(CombatEvent::BonusUsed { kind, outcome });
                }
            }
        }
        if !player.weapon().is_available() {
            if let Some(kind) = BonusKind::ammo_for(player.weapon().kind()) {
                if let Some(outcome) = player.buy_bonus(kind, dice) {
                    events.push(CombatEvent::AmmoPurchased { kind, outcome });
                }
            }
        }

        // 3. Player attacks.
        let damage = player.attack(&mut self.enemy, dice);
        events.push(CombatEvent::PlayerHit {
            damage,
            enemy_hp: self.enemy.hp(),
        });

        // 4. Victory check.
        if !self.enemy.is_alive() {
            self.resolve_victory(player, decisions, &mut events);
            return events;
        }

        // 5. Enemy pre-turn hook.
        for action in self.enemy.before_turn(player, dice) {
            match action {
                EnemyAction::InflictedStatus { name, turns } => {
                    events.push(CombatEvent::StatusInflicted {
                        name: name.to_string(),
                        turns,
                    });
                }
                EnemyAction::Fled => events.push(CombatEvent::EnemyFled {
                    name: self.enemy.name().to_string(),
                }),
                EnemyAction::CalledReinforcements => {
                    events.push(CombatEvent::ReinforcementsCalled {
                        name: self.enemy.name().to_string(),
                    });
                }
            }
        }
        if !player.in_fight() {
            // the flee path lowered the flag already
            self.state = CombatState::Resolved(CombatOutcome::Fled);
            return events;
        }

        // 6. Enemy attacks.
        let damage = self.enemy.attack(player, dice);
        events.push(CombatEvent::EnemyHit {
            damage,
            player_hp: player.hp(),
        });

        // 7. Defeat check.
        if !player.is_alive() {
            self.resolve_defeat(player, &mut events);
        }
        events
    }

    /// Runs the fight to a terminal outcome.
    ///
    /// Both sides' roll ranges include zero, so indefinitely long fights are
    /// possible in principle but occur with probability zero; callers that
    /// need a hard bound should step [`round`](Self::round) themselves.
    pub fn run(
        mut self,
        player: &mut Player,
        decisions: &mut dyn DecisionSource,
        dice: &mut dyn Dice,
    ) -> (CombatOutcome, Vec<CombatEvent>) {
        self.engage(player);
        let mut events = Vec::new();
        loop {
            events.extend(self.round(player, decisions, dice));
            if let CombatState::Resolved(outcome) = self.state {
                return (outcome, events);
            }
        }
    }

    fn resolve_victory(
        &mut self,
        player: &mut Player,
        decisions: &mut dyn DecisionSource,
        events: &mut Vec<CombatEvent>,
    ) {
        let reward = self.enemy.reward_coins();
        player.credit_coins(reward);
        events.push(CombatEvent::Victory { reward });
        if let Some(loot) = self.enemy.drop_loot() {
            let prompt = format!("Found weapon: {}. Replace yours?", loot.name());
            if decisions.confirm(&prompt) {
                events.push(CombatEvent::WeaponLooted {
                    name: loot.name().to_string(),
                });
                player.equip_weapon(loot);
            }
        }
        player.end_fight();
        self.state = CombatState::Resolved(CombatOutcome::Victory { reward });
        info!("combat won against {}, +{reward} coins", self.enemy.name());
    }

    fn resolve_defeat(&mut self, player: &mut Player, events: &mut Vec<CombatEvent>) {
        player.end_fight();
        events.push(CombatEvent::Defeat);
        self.state = CombatState::Resolved(CombatOutcome::Defeat);
        info!("player defeated by {}", self.enemy.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dice::SequenceDice;
    use crate::game::Position;
    use crate::input::NullDecisions;

    fn player() -> Player {
        Player::new(1, Position::origin())
    }

    #[test]
    fn test_engage_sets_fight_flag_and_state() {
        let mut p = player();
        let mut encounter = Encounter::new(Enemy::rat(1, Position::new(1, 1)));
        assert_eq!(encounter.state(), CombatState::NotFighting);
        encounter.engage(&mut p);
        assert_eq!(encounter.state(), CombatState::InCombat);
        assert!(p.in_fight());
    }

    #[test]
    fn test_round_is_noop_before_engage() {
        let mut p = player();
        let mut encounter = Encounter::new(Enemy::rat(1, Position::new(1, 1)));
        let mut dice = SequenceDice::new();
        assert!(encounter
            .round(&mut p, &mut NullDecisions, &mut dice)
            .is_empty());
    }

    #[test]
    fn test_victory_credits_reward_and_clears_flag() {
        let mut p = player();
        let mut enemy = Enemy::rat(1, Position::new(1, 1));
        enemy.take_damage(100.0); // 10 HP left

        // player fist roll 20 kills; no chance checks reached
        let mut dice = SequenceDice::new().with_rolls([20]);
        let (outcome, events) =
            Encounter::new(enemy).run(&mut p, &mut NullDecisions, &mut dice);
        assert_eq!(outcome, CombatOutcome::Victory { reward: 200 });
        assert!(!p.in_fight());
        assert_eq!(p.coins(), 200);
        assert!(events.contains(&CombatEvent::Victory { reward: 200 }));
    }

    #[test]
    fn test_flee_resolves_without_enemy_attack() {
        let mut p = player();
        let mut enemy = Enemy::rat(1, Position::new(1, 1));
        enemy.take_damage(95.0); // 15 HP

        // round: player rolls 5 (enemy at 10, fraction 10/110 < 0.15),
        // infection check false, flee check true
        let mut dice = SequenceDice::new()
            .with_rolls([5])
            .with_chances([false, true]);
        let (outcome, events) =
            Encounter::new(enemy).run(&mut p, &mut NullDecisions, &mut dice);
        assert_eq!(outcome, CombatOutcome::Fled);
        assert!(!p.in_fight());
        assert_eq!(p.hp(), p.max_hp()); // fled before its attack
        assert!(events.contains(&CombatEvent::EnemyFled {
            name: "Rat".to_string()
        }));
    }

    #[test]
    fn test_defeat_from_enemy_attacks() {
        let mut p = player();
        p.take_damage(150.0); // 15 HP left
        let enemy = Enemy::spider(1, Position::new(1, 1));

        // player roll 0, poison check false, low-hp branch not reached,
        // spider roll 22 (clamped) kills
        let mut dice = SequenceDice::new()
            .with_rolls([0, 99])
            .with_chances([false]);
        let (outcome, events) =
            Encounter::new(enemy).run(&mut p, &mut NullDecisions, &mut dice);
        assert_eq!(outcome, CombatOutcome::Defeat);
        assert!(!p.is_alive());
        assert!(!p.in_fight());
        assert_eq!(*events.last().unwrap(), CombatEvent::Defeat);
    }

    #[test]
    fn test_status_tick_opens_the_round() {
        let mut p = player();
        p.apply_status("poison", 15.0, 1);
        let mut enemy = Enemy::rat(1, Position::new(1, 1));
        enemy.take_damage(100.0);

        let mut dice = SequenceDice::new().with_rolls([20]);
        let (_, events) = Encounter::new(enemy).run(&mut p, &mut NullDecisions, &mut dice);
        assert_eq!(
            events[0],
            CombatEvent::StatusTick { total_damage: 16.5 } // 15 * 1.1
        );
        assert_eq!(
            events[1],
            CombatEvent::StatusExpired {
                name: "poison".to_string()
            }
        );
    }

    #[test]
    fn test_dry_revolver_triggers_ammo_auto_purchase() {
        let mut p = player();
        p.credit_coins(50);
        let mut ctor_dice = SequenceDice::new().with_rolls([5]);
        let mut revolver = crate::game::weapons::Weapon::revolver(
            Position::origin(),
            &mut ctor_dice,
        );
        revolver.set_ammo(0);
        p.equip_weapon(revolver);

        let mut enemy = Enemy::rat(1, Position::new(1, 1));
        enemy.take_damage(105.0); // 5 HP left

        // round: bullets amount 6, revolver shot roll 20 -> kills the rat
        let mut dice = SequenceDice::new().with_rolls([6, 20]);
        let (outcome, events) =
            Encounter::new(enemy).run(&mut p, &mut NullDecisions, &mut dice);
        assert_eq!(outcome, CombatOutcome::Victory { reward: 200 });
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::AmmoPurchased {
                kind: BonusKind::Bullets,
                ..
            }
        )));
        assert_eq!(p.coins(), 10 + 200); // 50 - 40 price + reward
        assert_eq!(p.weapon().ammo(), Some(4)); // 6 bought, 2 spent
    }

    #[test]
    fn test_revolver_below_shot_cost_also_triggers_purchase() {
        // one bullet in a revolver that costs two per shot would dry-fire
        // forever; the resource step must treat it as unavailable and buy
        let mut p = player();
        p.credit_coins(50);
        let mut ctor_dice = SequenceDice::new().with_rolls([5]);
        let mut revolver = crate::game::weapons::Weapon::revolver(
            Position::origin(),
            &mut ctor_dice,
        );
        revolver.set_ammo(1);
        p.equip_weapon(revolver);

        let mut enemy = Enemy::rat(1, Position::new(1, 1));
        enemy.take_damage(105.0); // 5 HP left

        // round: bullets amount 6 (ammo 1 -> 7), shot roll 20 kills the rat
        let mut dice = SequenceDice::new().with_rolls([6, 20]);
        let (outcome, events) =
            Encounter::new(enemy).run(&mut p, &mut NullDecisions, &mut dice);
        assert_eq!(outcome, CombatOutcome::Victory { reward: 200 });
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::AmmoPurchased {
                kind: BonusKind::Bullets,
                ..
            }
        )));
        assert_eq!(p.weapon().ammo(), Some(5)); // 1 held + 6 bought - 2 spent
        assert_eq!(p.coins(), 10 + 200);
    }
}
