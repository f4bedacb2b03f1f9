//! # Dice Module
//!
//! The single seam through which the game draws randomness.
//!
//! Every damage roll, loot pick and status-effect check goes through the
//! [`Dice`] trait. Production code hands in any [`rand::Rng`] (the blanket
//! impl covers them all); tests hand in a [`SequenceDice`] with scripted
//! outcomes so combat rounds become hand-computable.

use rand::Rng;
use std::collections::VecDeque;

/// Injectable source of uniform draws and Bernoulli trials.
///
/// Draws are independent per call; the game requires no seeding or
/// determinism contract beyond "uniformly distributed, regenerated each
/// call".
pub trait Dice {
    /// Uniform integer draw in `[0, max]`, both ends inclusive.
    fn roll(&mut self, max: u32) -> u32;

    /// Uniform integer draw in `[lo, hi]`, both ends inclusive.
    fn range(&mut self, lo: u32, hi: u32) -> u32;

    /// Independent Bernoulli trial with success probability `p`.
    fn chance(&mut self, p: f64) -> bool;

    /// Uniform real draw in `[0, 1)`.
    fn fraction(&mut self) -> f64;
}

impl<R: Rng + ?Sized> Dice for R {
    fn roll(&mut self, max: u32) -> u32 {
        self.gen_range(0..=max)
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        self.gen_range(lo..=hi)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.gen_bool(p.clamp(0.0, 1.0))
    }

    fn fraction(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Deterministic [`Dice`] that replays queued outcomes.
///
/// Integer draws pop from the roll queue (clamped into the requested range),
/// chance checks pop from the chance queue, and fractional draws pop from the
/// fraction queue. Exhausted queues fall back to the lowest value / `false`,
/// so a short script still yields a defined outcome.
///
/// # Examples
///
/// ```
/// use gridfall::{Dice, SequenceDice};
///
/// let mut dice = SequenceDice::new().with_rolls([7, 99]).with_chances([true]);
/// assert_eq!(dice.roll(10), 7);
/// assert_eq!(dice.roll(10), 10); // clamped
/// assert!(dice.chance(0.5));
/// assert!(!dice.chance(0.5)); // queue exhausted
/// ```
#[derive(Debug, Default, Clone)]
pub struct SequenceDice {
    rolls: VecDeque<u32>,
    chances: VecDeque<bool>,
    fractions: VecDeque<f64>,
}

impl SequenceDice {
    /// Creates a dice with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues integer outcomes for `roll` and `range`.
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    /// Queues outcomes for `chance`.
    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    /// Queues outcomes for `fraction`.
    pub fn with_fractions(mut self, fractions: impl IntoIterator<Item = f64>) -> Self {
        self.fractions.extend(fractions);
        self
    }
}

impl Dice for SequenceDice {
    fn roll(&mut self, max: u32) -> u32 {
        self.rolls.pop_front().map(|v| v.min(max)).unwrap_or(0)
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        self.rolls
            .pop_front()
            .map(|v| v.clamp(lo, hi))
            .unwrap_or(lo)
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn fraction(&mut self) -> f64 {
        self.fractions.pop_front().unwrap_or(0.0).clamp(0.0, 1.0)
    }
}
