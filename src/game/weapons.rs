//! # Weapons Module
//!
//! The closed set of weapons a combatant can wield.
//!
//! Two families exist: melee weapons scale their damage roll by the wielder's
//! rage multiplier, ranged weapons by the accuracy multiplier. Each swing is
//! an independent uniform roll in `[0, max_damage]`; callers must never
//! assume a non-zero result.

use crate::game::dice::Dice;
use crate::game::Position;

/// Concrete weapon variants with their mutable resource state.
///
/// Adding a variant here is a compile-time obligation at every dispatch
/// site (damage formula, availability, serialization).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    /// Bare hands. Always available, never wears out.
    Fist,
    /// Melee weapon that loses one durability per swing.
    Stick { durability: u32 },
    /// Ranged weapon consuming one arrow per shot.
    Bow { ammo: u32 },
    /// Ranged weapon consuming two bullets per shot.
    Revolver { ammo: u32 },
}

/// A weapon entity: a kind plus the board position it occupies (or was
/// picked up from).
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    kind: WeaponKind,
    position: Position,
}

impl Weapon {
    /// Creates a fist. The fallback weapon every player starts with.
    pub fn fist(position: Position) -> Self {
        Self {
            kind: WeaponKind::Fist,
            position,
        }
    }

    /// Creates a stick with durability drawn uniformly from `[10, 20]`.
    pub fn stick(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            kind: WeaponKind::Stick {
                durability: dice.range(10, 20),
            },
            position,
        }
    }

    /// Creates a bow with ammo drawn uniformly from `[10, 15]`.
    pub fn bow(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            kind: WeaponKind::Bow {
                ammo: dice.range(10, 15),
            },
            position,
        }
    }

    /// Creates a revolver with ammo drawn uniformly from `[5, 10]`.
    pub fn revolver(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            kind: WeaponKind::Revolver {
                ammo: dice.range(5, 10),
            },
            position,
        }
    }

    /// Picks one of the four kinds uniformly. Used to arm skeletons.
    pub fn random(position: Position, dice: &mut dyn Dice) -> Self {
        match dice.roll(3) {
            0 => Self::fist(position),
            1 => Self::stick(position, dice),
            2 => Self::bow(position, dice),
            _ => Self::revolver(position, dice),
        }
    }

    /// Display name of this weapon.
    pub fn name(&self) -> &'static str {
        match self.kind {
            WeaponKind::Fist => "Fist",
            WeaponKind::Stick { .. } => "Stick",
            WeaponKind::Bow { .. } => "Bow",
            WeaponKind::Revolver { .. } => "Revolver",
        }
    }

    /// Upper bound of the damage roll.
    pub fn max_damage(&self) -> u32 {
        match self.kind {
            WeaponKind::Fist => 20,
            WeaponKind::Stick { .. } => 25,
            WeaponKind::Bow { .. } => 35,
            WeaponKind::Revolver { .. } => 45,
        }
    }

    /// Ammo consumed per shot, `None` for melee weapons.
    pub fn ammo_consumption(&self) -> Option<u32> {
        match self.kind {
            WeaponKind::Bow { .. } => Some(1),
            WeaponKind::Revolver { .. } => Some(2),
            _ => None,
        }
    }

    /// Whether the weapon can currently deal damage: fists always, sticks
    /// while durability remains, ranged weapons while they can pay their
    /// per-shot ammo cost (a revolver holding a single bullet cannot).
    pub fn is_available(&self) -> bool {
        match self.kind {
            WeaponKind::Fist => true,
            WeaponKind::Stick { durability } => durability > 0,
            WeaponKind::Bow { ammo } => ammo >= 1,
            WeaponKind::Revolver { ammo } => ammo >= 2,
        }
    }

    /// Remaining ammo for ranged weapons.
    pub fn ammo(&self) -> Option<u32> {
        match self.kind {
            WeaponKind::Bow { ammo } | WeaponKind::Revolver { ammo } => Some(ammo),
            _ => None,
        }
    }

    /// Remaining durability for the stick.
    pub fn durability(&self) -> Option<u32> {
        match self.kind {
            WeaponKind::Stick { durability } => Some(durability),
            _ => None,
        }
    }

    /// The kind discriminant, with resource state.
    pub fn kind(&self) -> WeaponKind {
        self.kind
    }

    /// Board position this weapon occupies.
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Restores a persisted durability value. Only meaningful for sticks.
    pub(crate) fn set_durability(&mut self, durability: u32) {
        if let WeaponKind::Stick { durability: d } = &mut self.kind {
            *d = durability;
        }
    }

    /// Restores a persisted ammo count. Only meaningful for ranged weapons.
    pub(crate) fn set_ammo(&mut self, count: u32) {
        if let WeaponKind::Bow { ammo } | WeaponKind::Revolver { ammo } = &mut self.kind {
            *ammo = count;
        }
    }

    /// Adds ammo to a ranged weapon; melee weapons ignore refills.
    pub fn refill_ammo(&mut self, amount: u32) {
        if let WeaponKind::Bow { ammo } | WeaponKind::Revolver { ammo } = &mut self.kind {
            *ammo += amount;
        }
    }

    /// Raw uniform damage roll in `[0, max_damage]`, no multipliers and no
    /// resource consumption. Skeletons attack with this directly.
    pub fn roll_damage(&self, dice: &mut dyn Dice) -> u32 {
        dice.roll(self.max_damage())
    }

    /// Tries to consume `n` units of ammo; returns whether the shot is paid
    /// for. Ammo is left untouched when it cannot cover the cost.
    fn consume_ammo(&mut self, n: u32) -> bool {
        match &mut self.kind {
            WeaponKind::Bow { ammo } | WeaponKind::Revolver { ammo } => {
                if *ammo >= n {
                    *ammo -= n;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Resolves one attack with this weapon.
    ///
    /// Melee damage is `roll * rage` (the stick additionally spends one
    /// durability, and deals nothing once worn out). Ranged damage is
    /// `roll * accuracy` if the ammo cost can be paid, otherwise `0.0` with
    /// ammo unchanged.
    pub fn attack_damage(&mut self, dice: &mut dyn Dice, rage: f64, accuracy: f64) -> f64 {
        match self.kind {
            WeaponKind::Fist => self.roll_damage(dice) as f64 * rage,
            WeaponKind::Stick { durability } => {
                if durability == 0 {
                    return 0.0;
                }
                self.kind = WeaponKind::Stick {
                    durability: durability - 1,
                };
                self.roll_damage(dice) as f64 * rage
            }
            WeaponKind::Bow { .. } => {
                if self.consume_ammo(1) {
                    self.roll_damage(dice) as f64 * accuracy
                } else {
                    0.0
                }
            }
            WeaponKind::Revolver { .. } => {
                if self.consume_ammo(2) {
                    self.roll_damage(dice) as f64 * accuracy
                } else {
                    0.0
                }
            }
        }
    }
}
