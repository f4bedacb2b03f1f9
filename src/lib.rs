//! # Gridfall
//!
//! A single-player, turn-based exploration and combat game on a 2D grid.
//!
//! ## Architecture Overview
//!
//! The crate is organized around a handful of cooperating subsystems:
//!
//! - **Entity Taxonomy**: weapons, bonuses, structures, enemies and the player,
//!   modeled as closed sum types with capability traits at the seams
//! - **Combat Engine**: turn-by-turn resolution between the player and one
//!   active enemy, driven by an injectable randomness source
//! - **Board Model**: fog-of-war grid storage with bounds-tolerant access
//! - **Persistence**: plain-data records tagged with a discriminator, able to
//!   reconstruct arbitrary entities (including nested ones) from a save file
//!
//! Everything is strictly turn-sequential and single-actor: no operation
//! suspends mid-turn and there is no background activity. External decisions
//! (movement, prompts) arrive through the [`input::DecisionSource`] seam.

pub mod game;
pub mod generation;
pub mod input;
pub mod persistence;

pub use game::{
    board::Board,
    bonuses::{Bonus, BonusEffect, BonusKind, BonusOutcome},
    combat::{CombatEvent, CombatOutcome, CombatState, Encounter},
    dice::{Dice, SequenceDice},
    enemies::{Enemy, EnemyKind},
    entities::{Entity, Tower},
    player::{Player, StatusEffect, StatusTick, StepOutcome},
    weapons::{Weapon, WeaponKind},
    Attacker, Damageable, Direction, Position,
};

pub use generation::{Difficulty, GenerationConfig};
pub use input::{Command, DecisionSource, NullDecisions, StdinDecisions};
pub use persistence::{
    BoardRecord, CellRecord, EntityRecord, PlayerRecord, SaveRecord, ScoreRecord,
};

/// Core error type for the Gridfall game engine.
///
/// Nothing in the game core itself is fatal: bad moves are rejected in place,
/// unknown save data decodes to "no entity", and a dead player is a normal
/// terminal game state. Errors only surface at the I/O edges.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Gridfall codebase.
pub type GameResult<T> = Result<T, GameError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default board height in cells
    pub const DEFAULT_ROWS: usize = 5;

    /// Default board width in cells
    pub const DEFAULT_COLS: usize = 5;

    /// Base player hit points before level scaling
    pub const PLAYER_BASE_HP: f64 = 150.0;

    /// Base enemy hit points before level scaling
    pub const ENEMY_BASE_HP: f64 = 100.0;
}
