//! # Input Module
//!
//! The collaborator seam the game core consumes: a source of movement
//! commands, yes/no confirmations and inventory selections. The core never
//! reads stdin itself; it asks a [`DecisionSource`] at well-defined decision
//! points.

use crate::game::bonuses::BonusKind;
use crate::game::Direction;
use std::io::{self, BufRead, Write};

/// A top-level player intent outside of combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Step one cell in the given direction.
    Move(Direction),
    /// Use a stored bonus from the inventory.
    UseBonus,
    /// Show the player status line.
    Status,
    /// Persist the current session.
    Save,
    /// Save and leave.
    Quit,
}

/// Supplier of external decisions.
///
/// The game blocks on these calls; they are the only "waiting" the engine
/// ever does.
pub trait DecisionSource {
    /// The next top-level command.
    fn next_command(&mut self) -> Command;

    /// A yes/no prompt, e.g. for weapon replacement.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Picks one of the offered bonus kinds, or `None` to decline.
    fn choose_bonus(&mut self, available: &[BonusKind]) -> Option<BonusKind>;
}

/// A decision source that never engages: quits, declines prompts and skips
/// bonuses. Useful for tests and non-interactive combat resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDecisions;

impl DecisionSource for NullDecisions {
    fn next_command(&mut self) -> Command {
        Command::Quit
    }

    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }

    fn choose_bonus(&mut self, _available: &[BonusKind]) -> Option<BonusKind> {
        None
    }
}

/// Interactive decision source reading line-based commands from stdin.
///
/// Movement uses `w`/`a`/`s`/`d` (or full direction words); `use`, `status`,
/// `save` and `quit` map to the remaining commands. EOF reads as quit /
/// decline.
#[derive(Debug, Default)]
pub struct StdinDecisions;

impl StdinDecisions {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_lowercase()),
        }
    }
}

impl DecisionSource for StdinDecisions {
    fn next_command(&mut self) -> Command {
        loop {
            let Some(line) = self.read_line("> ") else {
                return Command::Quit;
            };
            match parse_command(&line) {
                Some(command) => return command,
                None => println!("Commands: w/a/s/d to move, use, status, save, quit"),
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        match self.read_line(&format!("{prompt} (y/n) ")) {
            Some(line) => line.starts_with('y'),
            None => false,
        }
    }

    fn choose_bonus(&mut self, available: &[BonusKind]) -> Option<BonusKind> {
        let names: Vec<&str> = available.iter().map(|k| k.name()).collect();
        let line = self.read_line(&format!(
            "Choose a bonus [{}] or press enter to skip: ",
            names.join(", ")
        ))?;
        if line.is_empty() {
            return None;
        }
        match line.parse::<BonusKind>() {
            Ok(kind) if available.contains(&kind) => Some(kind),
            _ => {
                println!("No such bonus.");
                None
            }
        }
    }
}

/// Parses a single command line; `None` for anything unrecognized.
fn parse_command(line: &str) -> Option<Command> {
    match line {
        "w" | "n" | "north" | "up" => Some(Command::Move(Direction::North)),
        "s" | "south" | "down" => Some(Command::Move(Direction::South)),
        "a" | "west" | "left" => Some(Command::Move(Direction::West)),
        "d" | "e" | "east" | "right" => Some(Command::Move(Direction::East)),
        "u" | "use" => Some(Command::UseBonus),
        "t" | "status" => Some(Command::Status),
        "v" | "save" => Some(Command::Save),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}
