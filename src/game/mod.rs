//! # Game Module
//!
//! Core building blocks of the Gridfall board game:
//! - Grid positions and movement directions
//! - Capability traits shared by combatants ([`Damageable`], [`Attacker`])
//! - The entity taxonomy (weapons, bonuses, structures, enemies, player)
//! - The combat engine and the fog-of-war board

pub mod board;
pub mod bonuses;
pub mod combat;
pub mod dice;
pub mod enemies;
pub mod entities;
pub mod player;
pub mod weapons;

use dice::Dice;
use serde::{Deserialize, Serialize};

/// A 2D coordinate on the game board, in (row, column) order.
///
/// Positions are pure values with no ownership semantics; entities carry
/// them by copy.
///
/// # Examples
///
/// ```
/// use gridfall::Position;
///
/// let pos = Position::new(2, 3);
/// assert_eq!(pos.row, 2);
/// assert_eq!(pos.col, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the origin position (0, 0), where every run starts.
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Returns the position offset by the given row/column deltas.
    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }

    /// Calculates the Chebyshev (chessboard) distance to another position.
    ///
    /// This is the metric used for area reveals such as the watchtower's.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridfall::Position;
    ///
    /// let a = Position::new(0, 0);
    /// let b = Position::new(2, 1);
    /// assert_eq!(a.chebyshev_distance(b), 2);
    /// ```
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.row - other.row).abs().max((self.col - other.col).abs()) as u32
    }
}

/// Cardinal movement directions; the game is strictly 4-directional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a (row, column) delta.
    ///
    /// North decreases the row index, matching top-down rendering.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }
}

/// Scales a base value by `1 + level/10`, the factor applied to hit points,
/// damage and status ticks. Multiplying before dividing keeps common values
/// (150 at level 1 -> 165) exact in floating point.
pub(crate) fn scale_by_level(base: f64, level: u32) -> f64 {
    base * (10 + level) as f64 / 10.0
}

/// Capability of anything that has hit points and can be hurt or healed.
///
/// Both mutators clamp to the available headroom and report the amount
/// *actually* applied, which is never more than what was available.
pub trait Damageable {
    /// Current hit points, always in `0.0..=max_hp()`.
    fn hp(&self) -> f64;

    /// Maximum hit points.
    fn max_hp(&self) -> f64;

    /// Directly overwrites current hit points. Callers are expected to go
    /// through [`heal`](Damageable::heal) / [`take_damage`](Damageable::take_damage);
    /// this exists for the persistence layer's restore path.
    fn set_hp(&mut self, hp: f64);

    /// Whether this combatant is still alive.
    fn is_alive(&self) -> bool {
        self.hp() > 0.0
    }

    /// Restores up to `amount` hit points, clamped to `max_hp - hp`.
    /// Returns the amount actually restored.
    fn heal(&mut self, amount: f64) -> f64 {
        let regen = amount.min(self.max_hp() - self.hp()).max(0.0);
        self.set_hp(self.hp() + regen);
        regen
    }

    /// Removes up to `amount` hit points, clamped to the current total.
    /// Returns the amount actually removed.
    fn take_damage(&mut self, amount: f64) -> f64 {
        let damage = amount.min(self.hp()).max(0.0);
        self.set_hp(self.hp() - damage);
        damage
    }
}

/// Capability of anything that can deal damage to a [`Damageable`] target.
pub trait Attacker {
    /// Rolls damage against `target`, applies it via the target's
    /// `take_damage`, and returns the damage dealt.
    fn attack(&mut self, target: &mut dyn Damageable, dice: &mut dyn Dice) -> f64;
}
