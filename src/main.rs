//! # Gridfall Main Entry Point
//!
//! Parses command line options, restores or starts a session and runs the
//! interactive exploration loop on stdin/stdout.

use clap::Parser;
use gridfall::persistence::{
    clear_save, load_save, update_score, write_save, BoardRecord, PlayerRecord, SaveRecord,
};
use gridfall::{
    Board, Bonus, Command, DecisionSource, Dice, Difficulty, Encounter, Entity, GameResult,
    GenerationConfig, Player, StdinDecisions, StepOutcome,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Command line arguments for gridfall.
#[derive(Parser, Debug)]
#[command(name = "gridfall")]
#[command(about = "A turn-based grid exploration game with fog of war")]
#[command(version)]
struct Args {
    /// Board rows
    #[arg(long, default_value_t = gridfall::config::DEFAULT_ROWS)]
    rows: usize,

    /// Board columns
    #[arg(long, default_value_t = gridfall::config::DEFAULT_COLS)]
    cols: usize,

    /// Difficulty (easy, normal, hard)
    #[arg(short, long, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// Random seed for level generation and combat rolls
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path of the save file
    #[arg(long, default_value = "save.json")]
    save: PathBuf,

    /// Path of the best-run record file
    #[arg(long, default_value = "record.json")]
    record: PathBuf,

    /// Discard any existing save and start over
    #[arg(long)]
    new: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// How the session came to an end.
enum SessionEnd {
    Quit,
    Died,
}

/// One play session: the player, the current level's board and the options
/// it was started with.
struct Session {
    args: Args,
    difficulty: Difficulty,
    player: Player,
    board: Option<Board>,
}

impl Session {
    /// Restores the saved session, or starts a fresh one when no usable
    /// save exists.
    fn start(args: Args, dice: &mut dyn Dice) -> GameResult<Self> {
        if args.new {
            clear_save(&args.save)?;
        }
        if let Some(record) = load_save(&args.save) {
            info!("resuming level {}", record.current_level);
            println!("Welcome back. Resuming level {}.", record.current_level);
            return Ok(Self {
                difficulty: record.difficulty,
                player: record.player.into_player(dice),
                board: record.board.map(|board| board.into_board(dice)),
                args,
            });
        }
        info!("starting a new {} session", args.difficulty);
        println!("Starting a new game on {} difficulty.", args.difficulty);
        let board = Self::generate_level(&args, args.difficulty, 1, dice);
        let player = Player::new(1, board.start());
        Ok(Self {
            difficulty: args.difficulty,
            player,
            board: Some(board),
            args,
        })
    }

    fn generate_level(args: &Args, difficulty: Difficulty, level: u32, dice: &mut dyn Dice) -> Board {
        let config = GenerationConfig::new(args.rows, args.cols, difficulty, level);
        gridfall::generation::generate(&config, dice)
    }

    fn save(&self) -> GameResult<()> {
        let record = SaveRecord {
            difficulty: self.difficulty,
            current_level: self.player.level(),
            player: PlayerRecord::from_player(&self.player),
            board: self.board.as_ref().map(BoardRecord::from_board),
        };
        write_save(&self.args.save, &record)
    }

    /// Runs the session until the player quits or dies. Either way the best
    /// run on record is updated; death additionally discards the save.
    fn run(mut self, decisions: &mut dyn DecisionSource, dice: &mut dyn Dice) -> GameResult<()> {
        let end = self.play(decisions, dice)?;
        match end {
            SessionEnd::Quit => {
                self.save()?;
                println!("Saved. See you next time.");
            }
            SessionEnd::Died => {
                clear_save(&self.args.save)?;
                println!("Game over on level {}.", self.player.level());
            }
        }
        if update_score(&self.args.record, self.player.level(), self.player.coins())? {
            println!(
                "New best run: level {} with {} coins.",
                self.player.level(),
                self.player.coins()
            );
        }
        Ok(())
    }

    fn play(
        &mut self,
        decisions: &mut dyn DecisionSource,
        dice: &mut dyn Dice,
    ) -> GameResult<SessionEnd> {
        loop {
            if self.board.is_none() {
                println!("Level {}. Find the exit.", self.player.level());
                self.board = Some(Self::generate_level(
                    &self.args,
                    self.difficulty,
                    self.player.level(),
                    dice,
                ));
            }
            self.render();

            match decisions.next_command() {
                Command::Move(direction) => {
                    let Some(board) = self.board.as_mut() else {
                        continue;
                    };
                    match self.player.step(direction, board) {
                        StepOutcome::Blocked => {
                            println!("You bump into the edge of the map.");
                        }
                        StepOutcome::GoalReached => {
                            println!("You reach the exit of level {}.", self.player.level());
                            self.player.enter_level(board.start());
                            self.board = None;
                        }
                        StepOutcome::Moved => {
                            if let Some(SessionEnd::Died) = self.resolve_cell(decisions, dice) {
                                return Ok(SessionEnd::Died);
                            }
                        }
                    }
                }
                Command::UseBonus => self.use_stored_bonus(decisions),
                Command::Status => println!("{}", self.player.status_line()),
                Command::Save => {
                    self.save()?;
                    println!("Saved.");
                }
                Command::Quit => return Ok(SessionEnd::Quit),
            }
        }
    }

    fn render(&self) {
        if let Some(board) = &self.board {
            for line in board.render_lines(self.player.position()) {
                println!("{line}");
            }
        }
    }

    /// Resolves whatever occupies the player's cell after a step.
    fn resolve_cell(
        &mut self,
        decisions: &mut dyn DecisionSource,
        dice: &mut dyn Dice,
    ) -> Option<SessionEnd> {
        let board = self.board.as_mut()?;
        let pos = self.player.position();
        match board.entity_at(pos).cloned()? {
            Entity::Tower(tower) => {
                println!("You climb the watchtower and survey the surroundings.");
                tower.interact(board);
            }
            Entity::Weapon(weapon) => {
                let prompt = format!("Found weapon: {}. Replace yours?", weapon.name());
                if decisions.confirm(&prompt) {
                    board.take_entity(pos);
                    self.player.equip_weapon(weapon);
                    println!("Equipped the {}.", self.player.weapon().name());
                }
            }
            Entity::Bonus(_) => {
                if let Some(Entity::Bonus(bonus)) = board.take_entity(pos) {
                    self.apply_bonus(bonus);
                }
            }
            Entity::Enemy(_) => {
                let Some(Entity::Enemy(enemy)) = board.take_entity(pos) else {
                    return None;
                };
                println!("A {} blocks your way!", enemy.name());
                let encounter = Encounter::new(enemy);
                let (outcome, events) = encounter.run(&mut self.player, decisions, dice);
                for event in events {
                    println!("{event}");
                }
                if let gridfall::CombatOutcome::Defeat = outcome {
                    return Some(SessionEnd::Died);
                }
            }
        }
        None
    }

    fn apply_bonus(&mut self, bonus: Bonus) {
        let outcome = bonus.apply(&mut self.player);
        println!("{outcome}");
    }

    fn use_stored_bonus(&mut self, decisions: &mut dyn DecisionSource) {
        let stored = self.player.stored_kinds();
        if stored.is_empty() {
            println!("Your inventory is empty.");
            return;
        }
        if let Some(kind) = decisions.choose_bonus(&stored) {
            match self.player.use_bonus(kind) {
                Some(outcome) => println!("{outcome}"),
                None => println!("No {kind} left."),
            }
        }
    }
}

fn main() -> GameResult<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    info!("starting gridfall v{}", gridfall::VERSION);
    let mut rng: StdRng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut decisions = StdinDecisions::new();

    let session = Session::start(args, &mut rng)?;
    session.run(&mut decisions, &mut rng)
}
