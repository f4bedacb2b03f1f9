//! # Generation Module
//!
//! Populates a fresh board for one level: a watchtower or two, weapons,
//! bonuses and enemies on distinct random cells. The start cell is revealed
//! and the goal cell is always left empty (the rules end the level there
//! regardless of contents, but an empty goal keeps runs fair to read).

use crate::game::board::Board;
use crate::game::bonuses::Bonus;
use crate::game::dice::Dice;
use crate::game::enemies::Enemy;
use crate::game::entities::{Entity, Tower};
use crate::game::weapons::Weapon;
use crate::game::Position;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session difficulty. Scales how many enemies a level holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Enemy count for a board with the given free-cell area.
    fn enemy_count(self, area: usize) -> usize {
        match self {
            Difficulty::Easy => (area / 12).max(1),
            Difficulty::Normal => (area / 8).max(2),
            Difficulty::Hard => (area / 6).max(3),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Parameters for generating one level's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationConfig {
    pub rows: usize,
    pub cols: usize,
    pub difficulty: Difficulty,
    /// Current level; enemies spawn at this level.
    pub level: u32,
}

impl GenerationConfig {
    pub fn new(rows: usize, cols: usize, difficulty: Difficulty, level: u32) -> Self {
        Self {
            rows,
            cols,
            difficulty,
            level,
        }
    }
}

/// Generates a populated board for the configured level.
///
/// Entities land on distinct cells, never on the start or goal. Placement
/// reveals the occupied cells (the board contract); everything else starts
/// hidden except the start cell.
pub fn generate(config: &GenerationConfig, dice: &mut dyn Dice) -> Board {
    let mut board = Board::new(config.rows, config.cols);
    board.reveal(board.start());

    let mut free: Vec<Position> = (0..config.rows as i32)
        .flat_map(|row| (0..config.cols as i32).map(move |col| Position::new(row, col)))
        .filter(|pos| *pos != board.start() && *pos != board.goal())
        .collect();
    let area = free.len();

    let towers = 1 + area / 40;
    let weapons = 1 + area / 20;
    let bonuses = 2 + area / 10;
    let enemies = config.difficulty.enemy_count(area);
    debug!(
        "generating {}x{} level {} ({}): {towers} towers, {weapons} weapons, {bonuses} bonuses, {enemies} enemies",
        config.rows, config.cols, config.level, config.difficulty
    );

    for _ in 0..towers {
        let Some(pos) = pick_free(&mut free, dice) else { break };
        board.place(Entity::Tower(Tower::new(pos)), pos);
    }
    for _ in 0..weapons {
        let Some(pos) = pick_free(&mut free, dice) else { break };
        board.place(Entity::Weapon(random_board_weapon(pos, dice)), pos);
    }
    for _ in 0..bonuses {
        let Some(pos) = pick_free(&mut free, dice) else { break };
        board.place(Entity::Bonus(Bonus::random(pos, dice)), pos);
    }
    for _ in 0..enemies {
        let Some(pos) = pick_free(&mut free, dice) else { break };
        board.place(Entity::Enemy(Enemy::random(config.level, pos, dice)), pos);
    }

    board
}

/// Removes and returns a uniformly chosen free cell.
fn pick_free(free: &mut Vec<Position>, dice: &mut dyn Dice) -> Option<Position> {
    if free.is_empty() {
        return None;
    }
    let index = dice.roll(free.len() as u32 - 1) as usize;
    Some(free.swap_remove(index))
}

/// Weapons worth placing on the board. A found fist would be pointless, so
/// board pickups are drawn from the other three kinds.
fn random_board_weapon(pos: Position, dice: &mut dyn Dice) -> Weapon {
    match dice.roll(2) {
        0 => Weapon::stick(pos, dice),
        1 => Weapon::bow(pos, dice),
        _ => Weapon::revolver(pos, dice),
    }
}
