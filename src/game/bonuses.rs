//! # Bonuses Module
//!
//! One-shot pickups. Every bonus fixes its random magnitude at creation
//! time; applying it either takes effect immediately or queues the bonus in
//! the player's per-kind inventory for later manual use.
//!
//! Coins are the exception: they always credit immediately and are never
//! stored.

use crate::game::dice::Dice;
use crate::game::player::Player;
use crate::game::weapons::WeaponKind;
use crate::game::{Damageable, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bonus discriminants, used as inventory keys and shop entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BonusKind {
    Medkit,
    Rage,
    Accuracy,
    Arrows,
    Bullets,
    Coins,
}

impl BonusKind {
    /// All kinds, in display order.
    pub const ALL: [BonusKind; 6] = [
        BonusKind::Medkit,
        BonusKind::Rage,
        BonusKind::Accuracy,
        BonusKind::Arrows,
        BonusKind::Bullets,
        BonusKind::Coins,
    ];

    /// Kinds that can sit in the inventory. Coins never do.
    pub const STORABLE: [BonusKind; 5] = [
        BonusKind::Medkit,
        BonusKind::Rage,
        BonusKind::Accuracy,
        BonusKind::Arrows,
        BonusKind::Bullets,
    ];

    /// Display name, also accepted back by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            BonusKind::Medkit => "Medkit",
            BonusKind::Rage => "Rage",
            BonusKind::Accuracy => "Accuracy",
            BonusKind::Arrows => "Arrows",
            BonusKind::Bullets => "Bullets",
            BonusKind::Coins => "Coins",
        }
    }

    /// Shop price in coins, `None` for kinds that cannot be bought.
    pub fn price(self) -> Option<u32> {
        match self {
            BonusKind::Medkit => Some(75),
            BonusKind::Rage => Some(50),
            BonusKind::Accuracy => Some(50),
            BonusKind::Arrows => Some(25),
            BonusKind::Bullets => Some(40),
            BonusKind::Coins => None,
        }
    }

    /// The ammo kind that refills the given weapon, if any.
    pub fn ammo_for(weapon: WeaponKind) -> Option<BonusKind> {
        match weapon {
            WeaponKind::Bow { .. } => Some(BonusKind::Arrows),
            WeaponKind::Revolver { .. } => Some(BonusKind::Bullets),
            _ => None,
        }
    }
}

impl fmt::Display for BonusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BonusKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BonusKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Magnitude payload of a bonus, fixed when the bonus is created.
#[derive(Debug, Clone, PartialEq)]
pub enum BonusEffect {
    /// Heals the player in combat, power drawn from `[10, 40]`.
    Medkit { power: u32 },
    /// Adds to the rage accumulator, drawn from `1.0 + U(0,1)`.
    Rage { multiplier: f64 },
    /// Adds to the accuracy accumulator, drawn from `0.1 + 0.9 * U(0,1)`.
    Accuracy { multiplier: f64 },
    /// Refills a bow, amount drawn from `[1, 20]`.
    Arrows { amount: u32 },
    /// Refills a revolver, amount drawn from `[1, 10]`.
    Bullets { amount: u32 },
    /// Credits the coin balance, amount drawn from `[50, 100]`.
    Coins { amount: u32 },
}

/// What happened when a bonus was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum BonusOutcome {
    Healed(f64),
    RageRaised(f64),
    AccuracyRaised(f64),
    AmmoRefilled(u32),
    CoinsCredited(u32),
    /// The bonus could not take effect right now and went to the inventory.
    Stored(BonusKind),
}

impl fmt::Display for BonusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusOutcome::Healed(hp) => write!(f, "+{hp:.0} HP from medkit"),
            BonusOutcome::RageRaised(m) => write!(f, "Rage raised by {m:.1}"),
            BonusOutcome::AccuracyRaised(m) => write!(f, "Accuracy raised by {m:.1}"),
            BonusOutcome::AmmoRefilled(n) => write!(f, "+{n} ammo"),
            BonusOutcome::CoinsCredited(n) => write!(f, "+{n} coins"),
            BonusOutcome::Stored(kind) => write!(f, "{kind} stored in inventory"),
        }
    }
}

/// A one-shot pickup lying on the board or queued in the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct Bonus {
    effect: BonusEffect,
    position: Position,
}

impl Bonus {
    pub fn medkit(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            effect: BonusEffect::Medkit {
                power: dice.range(10, 40),
            },
            position,
        }
    }

    pub fn rage(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            effect: BonusEffect::Rage {
                multiplier: 1.0 + dice.fraction(),
            },
            position,
        }
    }

    pub fn accuracy(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            effect: BonusEffect::Accuracy {
                multiplier: 0.1 + 0.9 * dice.fraction(),
            },
            position,
        }
    }

    pub fn arrows(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            effect: BonusEffect::Arrows {
                amount: dice.range(1, 20),
            },
            position,
        }
    }

    pub fn bullets(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            effect: BonusEffect::Bullets {
                amount: dice.range(1, 10),
            },
            position,
        }
    }

    pub fn coins(position: Position, dice: &mut dyn Dice) -> Self {
        Self {
            effect: BonusEffect::Coins {
                amount: dice.range(50, 100),
            },
            position,
        }
    }

    /// Creates a bonus of the given kind with a freshly drawn magnitude.
    pub fn of_kind(kind: BonusKind, position: Position, dice: &mut dyn Dice) -> Self {
        match kind {
            BonusKind::Medkit => Self::medkit(position, dice),
            BonusKind::Rage => Self::rage(position, dice),
            BonusKind::Accuracy => Self::accuracy(position, dice),
            BonusKind::Arrows => Self::arrows(position, dice),
            BonusKind::Bullets => Self::bullets(position, dice),
            BonusKind::Coins => Self::coins(position, dice),
        }
    }

    /// Picks a kind uniformly and creates it. Used by level generation.
    pub fn random(position: Position, dice: &mut dyn Dice) -> Self {
        let kind = BonusKind::ALL[dice.roll(BonusKind::ALL.len() as u32 - 1) as usize];
        Self::of_kind(kind, position, dice)
    }

    /// The discriminant of this bonus.
    pub fn kind(&self) -> BonusKind {
        match self.effect {
            BonusEffect::Medkit { .. } => BonusKind::Medkit,
            BonusEffect::Rage { .. } => BonusKind::Rage,
            BonusEffect::Accuracy { .. } => BonusKind::Accuracy,
            BonusEffect::Arrows { .. } => BonusKind::Arrows,
            BonusEffect::Bullets { .. } => BonusKind::Bullets,
            BonusEffect::Coins { .. } => BonusKind::Coins,
        }
    }

    /// The fixed magnitude payload.
    pub fn effect(&self) -> &BonusEffect {
        &self.effect
    }

    /// Board position of the pickup.
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn from_parts(effect: BonusEffect, position: Position) -> Self {
        Self { effect, position }
    }

    /// Applies the bonus to the player, consuming it.
    ///
    /// Medkit, rage and accuracy take effect only while the player is in
    /// combat; arrows and bullets only while the matching weapon is equipped.
    /// Anything that cannot take effect right now is queued into the
    /// inventory instead. Coins always credit immediately.
    pub fn apply(self, player: &mut Player) -> BonusOutcome {
        match self.effect {
            BonusEffect::Medkit { power } => {
                if player.in_fight() {
                    BonusOutcome::Healed(player.heal(power as f64))
                } else {
                    self.store(player)
                }
            }
            BonusEffect::Rage { multiplier } => {
                if player.in_fight() {
                    player.raise_rage(multiplier);
                    BonusOutcome::RageRaised(multiplier)
                } else {
                    self.store(player)
                }
            }
            BonusEffect::Accuracy { multiplier } => {
                if player.in_fight() {
                    player.raise_accuracy(multiplier);
                    BonusOutcome::AccuracyRaised(multiplier)
                } else {
                    self.store(player)
                }
            }
            BonusEffect::Arrows { amount } => {
                if matches!(player.weapon().kind(), WeaponKind::Bow { .. }) {
                    player.refill_equipped_ammo(amount);
                    BonusOutcome::AmmoRefilled(amount)
                } else {
                    self.store(player)
                }
            }
            BonusEffect::Bullets { amount } => {
                if matches!(player.weapon().kind(), WeaponKind::Revolver { .. }) {
                    player.refill_equipped_ammo(amount);
                    BonusOutcome::AmmoRefilled(amount)
                } else {
                    self.store(player)
                }
            }
            BonusEffect::Coins { amount } => {
                player.credit_coins(amount);
                BonusOutcome::CoinsCredited(amount)
            }
        }
    }

    fn store(self, player: &mut Player) -> BonusOutcome {
        let kind = self.kind();
        player.queue_bonus(self);
        BonusOutcome::Stored(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dice::SequenceDice;
    use crate::game::weapons::Weapon;

    fn pos() -> Position {
        Position::new(0, 0)
    }

    #[test]
    fn test_medkit_heals_only_in_combat() {
        let mut player = Player::new(1, pos());
        player.begin_fight();
        let before = player.hp();
        player.take_damage(50.0);

        let mut dice = SequenceDice::new().with_rolls([30]);
        let medkit = Bonus::medkit(pos(), &mut dice);
        assert_eq!(medkit.apply(&mut player), BonusOutcome::Healed(30.0));
        assert_eq!(player.hp(), before - 20.0);
    }

    #[test]
    fn test_medkit_stored_out_of_combat() {
        let mut player = Player::new(1, pos());
        let mut dice = SequenceDice::new().with_rolls([30]);
        let medkit = Bonus::medkit(pos(), &mut dice);
        assert_eq!(
            medkit.apply(&mut player),
            BonusOutcome::Stored(BonusKind::Medkit)
        );
        assert_eq!(player.stored_count(BonusKind::Medkit), 1);
    }

    #[test]
    fn test_rage_accumulates_in_combat() {
        let mut player = Player::new(1, pos());
        player.begin_fight();
        let mut dice = SequenceDice::new().with_fractions([0.5]);
        let rage = Bonus::rage(pos(), &mut dice);
        assert_eq!(rage.apply(&mut player), BonusOutcome::RageRaised(1.5));
        assert_eq!(player.rage(), 2.5);
    }

    #[test]
    fn test_arrows_refill_equipped_bow_regardless_of_combat() {
        let mut player = Player::new(1, pos());
        let mut dice = SequenceDice::new().with_rolls([10]);
        player.equip_weapon(Weapon::bow(pos(), &mut dice));

        let mut dice = SequenceDice::new().with_rolls([8]);
        let arrows = Bonus::arrows(pos(), &mut dice);
        assert_eq!(arrows.apply(&mut player), BonusOutcome::AmmoRefilled(8));
        assert_eq!(player.weapon().ammo(), Some(18));
    }

    #[test]
    fn test_bullets_stored_without_revolver() {
        let mut player = Player::new(1, pos());
        let mut dice = SequenceDice::new().with_rolls([5]);
        let bullets = Bonus::bullets(pos(), &mut dice);
        assert_eq!(
            bullets.apply(&mut player),
            BonusOutcome::Stored(BonusKind::Bullets)
        );
    }

    #[test]
    fn test_coins_always_credit_immediately() {
        let mut player = Player::new(1, pos());
        let mut dice = SequenceDice::new().with_rolls([75]);
        let coins = Bonus::coins(pos(), &mut dice);
        assert_eq!(coins.apply(&mut player), BonusOutcome::CoinsCredited(75));
        assert_eq!(player.coins(), 75);
        assert_eq!(player.stored_count(BonusKind::Coins), 0);
    }

    #[test]
    fn test_prices() {
        assert_eq!(BonusKind::Medkit.price(), Some(75));
        assert_eq!(BonusKind::Rage.price(), Some(50));
        assert_eq!(BonusKind::Accuracy.price(), Some(50));
        assert_eq!(BonusKind::Coins.price(), None);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("medkit".parse::<BonusKind>(), Ok(BonusKind::Medkit));
        assert_eq!(" Arrows ".parse::<BonusKind>(), Ok(BonusKind::Arrows));
        assert!("sword".parse::<BonusKind>().is_err());
    }

    #[test]
    fn test_ammo_for_weapon_kind() {
        assert_eq!(
            BonusKind::ammo_for(WeaponKind::Bow { ammo: 0 }),
            Some(BonusKind::Arrows)
        );
        assert_eq!(
            BonusKind::ammo_for(WeaponKind::Revolver { ammo: 0 }),
            Some(BonusKind::Bullets)
        );
        assert_eq!(BonusKind::ammo_for(WeaponKind::Fist), None);
    }
}
