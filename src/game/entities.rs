//! # Entities Module
//!
//! The closed sum type over everything that can occupy a board cell, plus
//! the watchtower structure. The player is tracked separately by the session
//! and never sits in a cell.

use crate::game::board::Board;
use crate::game::bonuses::Bonus;
use crate::game::enemies::Enemy;
use crate::game::weapons::Weapon;
use crate::game::Position;
use log::info;

/// A structure that reveals the board around itself when interacted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tower {
    position: Position,
}

impl Tower {
    /// Chebyshev radius of the reveal.
    pub const REVEAL_RADIUS: i32 = 2;

    pub fn new(position: Position) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Reveals every in-bounds cell within Chebyshev distance
    /// [`REVEAL_RADIUS`](Self::REVEAL_RADIUS) of the tower. Idempotent:
    /// already-revealed cells stay revealed.
    pub fn interact(&self, board: &mut Board) {
        for d_row in -Self::REVEAL_RADIUS..=Self::REVEAL_RADIUS {
            for d_col in -Self::REVEAL_RADIUS..=Self::REVEAL_RADIUS {
                board.reveal(self.position.offset(d_row, d_col));
            }
        }
        info!("tower at {:?} revealed its surroundings", self.position);
    }
}

/// Anything that can occupy a board cell.
///
/// Adding a variant is a compile-time obligation at every dispatch site:
/// the render symbol, the session's cell resolution and the serialization
/// records all match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Weapon(Weapon),
    Bonus(Bonus),
    Tower(Tower),
    Enemy(Enemy),
}

impl Entity {
    /// Single-character marker used when rendering a revealed cell.
    pub fn symbol(&self) -> char {
        match self {
            Entity::Weapon(_) => 'W',
            Entity::Bonus(_) => 'B',
            Entity::Tower(_) => 'T',
            Entity::Enemy(_) => 'E',
        }
    }

    /// Board position of the occupant.
    pub fn position(&self) -> Position {
        match self {
            Entity::Weapon(weapon) => weapon.position(),
            Entity::Bonus(bonus) => bonus.position(),
            Entity::Tower(tower) => tower.position(),
            Entity::Enemy(enemy) => enemy.position(),
        }
    }
}
