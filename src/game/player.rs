//! # Player Module
//!
//! The player character: the long-lived aggregate that carries hit points,
//! the equipped weapon, the bonus inventory, coins, the rage/accuracy
//! accumulators and any active damage-over-time statuses.
//!
//! Other entities never reach into the player's fields; everything mutates
//! through explicit operations (`credit_coins`, `queue_bonus`,
//! `refill_equipped_ammo`, ...).

use crate::config::PLAYER_BASE_HP;
use crate::game::board::Board;
use crate::game::bonuses::{Bonus, BonusKind, BonusOutcome};
use crate::game::dice::Dice;
use crate::game::weapons::Weapon;
use crate::game::{scale_by_level, Attacker, Damageable, Direction, Position};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

/// A damage-over-time effect. Ticks once per combat round for
/// `turns_left` rounds, each tick dealing `damage` scaled by the player's
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub damage: f64,
    pub turns_left: u32,
}

/// Result of applying one round of status ticks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusTick {
    /// Total damage actually taken this round.
    pub total_damage: f64,
    /// Names of statuses that expired this round.
    pub expired: Vec<String>,
}

/// What came of a player's attempt to step one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The move was out of bounds; nothing changed.
    Blocked,
    /// The player entered the goal cell, which ends the level no matter
    /// what else occupies it. The occupant is left untouched.
    GoalReached,
    /// The player entered an ordinary cell; any occupant is the caller's
    /// to resolve.
    Moved,
}

/// The player character.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    position: Position,
    level: u32,
    hp: f64,
    max_hp: f64,
    weapon: Weapon,
    inventory: HashMap<BonusKind, Vec<Bonus>>,
    coins: u32,
    rage: f64,
    accuracy: f64,
    statuses: HashMap<String, StatusEffect>,
    fight: bool,
}

impl Player {
    /// Creates a level-`level` player at `position`, at full health and
    /// armed with a fist.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridfall::{Damageable, Player, Position};
    ///
    /// let player = Player::new(1, Position::origin());
    /// assert_eq!(player.max_hp(), 165.0);
    /// assert_eq!(player.weapon().name(), "Fist");
    /// ```
    pub fn new(level: u32, position: Position) -> Self {
        let max_hp = scale_by_level(PLAYER_BASE_HP, level);
        Self {
            position,
            level,
            hp: max_hp,
            max_hp,
            weapon: Weapon::fist(position),
            inventory: BonusKind::STORABLE.iter().map(|k| (*k, Vec::new())).collect(),
            coins: 0,
            rage: 1.0,
            accuracy: 1.0,
            statuses: HashMap::new(),
            fight: false,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn rage(&self) -> f64 {
        self.rage
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// The currently equipped weapon.
    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    /// Whether combat is currently in progress.
    pub fn in_fight(&self) -> bool {
        self.fight
    }

    pub fn begin_fight(&mut self) {
        self.fight = true;
    }

    pub fn end_fight(&mut self) {
        self.fight = false;
    }

    /// Attempts a one-cell step in `direction`. Out-of-bounds moves are
    /// rejected with no state change.
    pub fn move_by(&mut self, direction: Direction, board: &Board) -> bool {
        let (d_row, d_col) = direction.delta();
        let target = self.position.offset(d_row, d_col);
        if !board.in_bounds(target) {
            debug!("move rejected: {:?} is out of bounds", target);
            return false;
        }
        self.position = target;
        true
    }

    /// Takes one step in `direction`, revealing the entered cell.
    ///
    /// The goal check comes before any look at the cell's contents, so
    /// reaching the goal ends the level even if something occupies it.
    pub fn step(&mut self, direction: Direction, board: &mut Board) -> StepOutcome {
        if !self.move_by(direction, board) {
            return StepOutcome::Blocked;
        }
        board.reveal(self.position);
        if self.position == board.goal() {
            return StepOutcome::GoalReached;
        }
        StepOutcome::Moved
    }

    /// Starts the next level at `position`: bumps the level, rescales max
    /// HP to the new level and restores it to full. Weapon, coins and
    /// inventory carry over.
    pub fn enter_level(&mut self, position: Position) {
        self.level += 1;
        self.max_hp = scale_by_level(PLAYER_BASE_HP, self.level);
        self.hp = self.max_hp;
        self.position = position;
        self.weapon.set_position(position);
        debug!("entered level {} with {} max hp", self.level, self.max_hp);
    }

    /// Replaces the equipped weapon.
    pub fn equip_weapon(&mut self, mut weapon: Weapon) {
        weapon.set_position(self.position);
        self.weapon = weapon;
    }

    /// Adds ammo to the equipped weapon; a no-op for melee weapons.
    pub fn refill_equipped_ammo(&mut self, amount: u32) {
        self.weapon.refill_ammo(amount);
    }

    /// Credits coins to the balance.
    pub fn credit_coins(&mut self, amount: u32) {
        self.coins += amount;
    }

    /// Deducts `cost` coins if the balance covers it. Returns whether the
    /// payment went through; an uncovered cost changes nothing.
    pub fn spend_coins(&mut self, cost: u32) -> bool {
        if self.coins < cost {
            return false;
        }
        self.coins -= cost;
        true
    }

    /// Queues a bonus that could not take effect immediately.
    pub fn queue_bonus(&mut self, bonus: Bonus) {
        self.inventory.entry(bonus.kind()).or_default().push(bonus);
    }

    /// Number of stored bonuses of the given kind.
    pub fn stored_count(&self, kind: BonusKind) -> usize {
        self.inventory.get(&kind).map_or(0, |v| v.len())
    }

    /// Kinds that currently have at least one stored bonus, in display order.
    pub fn stored_kinds(&self) -> Vec<BonusKind> {
        BonusKind::STORABLE
            .iter()
            .copied()
            .filter(|k| self.stored_count(*k) > 0)
            .collect()
    }

    /// Pops the most recently stored bonus of `kind` and applies it.
    /// Returns `None` when nothing of that kind is stored.
    pub fn use_bonus(&mut self, kind: BonusKind) -> Option<BonusOutcome> {
        let bonus = self.inventory.get_mut(&kind)?.pop()?;
        Some(bonus.apply(self))
    }

    /// Buys a fresh bonus of `kind` and applies it immediately.
    ///
    /// Returns `None` when the kind is not purchasable or the balance does
    /// not cover the price; nothing changes in that case.
    pub fn buy_bonus(&mut self, kind: BonusKind, dice: &mut dyn Dice) -> Option<BonusOutcome> {
        let price = kind.price()?;
        if !self.spend_coins(price) {
            debug!("cannot afford {kind}: price {price}, balance {}", self.coins);
            return None;
        }
        let bonus = Bonus::of_kind(kind, self.position, dice);
        Some(bonus.apply(self))
    }

    /// Inflicts or refreshes a damage-over-time status.
    pub fn apply_status(&mut self, name: &str, damage: f64, turns: u32) {
        self.statuses
            .insert(name.to_string(), StatusEffect { damage, turns_left: turns });
    }

    /// Whether any status is active.
    pub fn has_statuses(&self) -> bool {
        !self.statuses.is_empty()
    }

    /// Active statuses by name.
    pub fn statuses(&self) -> &HashMap<String, StatusEffect> {
        &self.statuses
    }

    /// Applies one round of status damage.
    ///
    /// Each active status deals its base damage scaled by the player's
    /// level, then loses one remaining turn; statuses at zero are removed.
    pub fn tick_statuses(&mut self) -> StatusTick {
        let mut tick = StatusTick::default();
        let names: Vec<String> = self.statuses.keys().cloned().collect();
        for name in names {
            let effect = self.statuses[&name];
            let scaled = scale_by_level(effect.damage, self.level);
            tick.total_damage += self.take_damage(scaled);
            if effect.turns_left <= 1 {
                self.statuses.remove(&name);
                tick.expired.push(name);
            } else {
                self.statuses.insert(
                    name,
                    StatusEffect {
                        damage: effect.damage,
                        turns_left: effect.turns_left - 1,
                    },
                );
            }
        }
        tick
    }

    /// One-line status summary for the display collaborator.
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "pos ({}, {})  hp {:.1}/{:.0}  coins {}  weapon {}",
            self.position.row, self.position.col, self.hp, self.max_hp, self.coins,
            self.weapon.name(),
        );
        if let Some(ammo) = self.weapon.ammo() {
            let _ = write!(line, " (ammo {ammo})");
        } else if let Some(durability) = self.weapon.durability() {
            let _ = write!(line, " (durability {durability})");
        }
        let _ = write!(line, "  rage {:.1}  accuracy {:.1}", self.rage, self.accuracy);
        if self.has_statuses() {
            let mut names: Vec<&str> = self.statuses.keys().map(String::as_str).collect();
            names.sort_unstable();
            let _ = write!(line, "  statuses [{}]", names.join(", "));
        }
        line
    }

    pub(crate) fn raise_rage(&mut self, amount: f64) {
        self.rage += amount;
    }

    pub(crate) fn raise_accuracy(&mut self, amount: f64) {
        self.accuracy += amount;
    }

    // Restore path for the persistence layer: overwrite the fields the
    // randomized constructor already gave valid defaults for.
    pub(crate) fn set_coins(&mut self, coins: u32) {
        self.coins = coins;
    }

    pub(crate) fn set_rage(&mut self, rage: f64) {
        self.rage = rage;
    }

    pub(crate) fn set_accuracy(&mut self, accuracy: f64) {
        self.accuracy = accuracy;
    }

    pub(crate) fn set_fight(&mut self, fight: bool) {
        self.fight = fight;
    }

    pub(crate) fn set_max_hp(&mut self, max_hp: f64) {
        self.max_hp = max_hp;
    }

    pub(crate) fn set_statuses(&mut self, statuses: HashMap<String, StatusEffect>) {
        self.statuses = statuses;
    }
}

impl Damageable for Player {
    fn hp(&self) -> f64 {
        self.hp
    }

    fn max_hp(&self) -> f64 {
        self.max_hp
    }

    fn set_hp(&mut self, hp: f64) {
        self.hp = hp;
    }
}

impl Attacker for Player {
    /// Damage dispatch follows the runtime family of the equipped weapon:
    /// melee scales by rage, ranged by accuracy (and may dry-fire to zero).
    fn attack(&mut self, target: &mut dyn Damageable, dice: &mut dyn Dice) -> f64 {
        let damage = self.weapon.attack_damage(dice, self.rage, self.accuracy);
        target.take_damage(damage);
        damage
    }
}
