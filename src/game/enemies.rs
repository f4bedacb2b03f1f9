//! # Enemies Module
//!
//! Hostile board entities. All enemies share the same hit-point scaling and
//! differ in their base damage, coin reward and pre-turn behavior:
//!
//! - **Rat**: may infect the player each round, and may flee when badly hurt
//! - **Spider**: may poison the player, and may "call reinforcements" when
//!   badly hurt (a message with no mechanical effect)
//! - **Skeleton**: armed with a randomly chosen weapon it attacks with and
//!   drops on defeat

use crate::config::ENEMY_BASE_HP;
use crate::game::dice::Dice;
use crate::game::player::Player;
use crate::game::weapons::{Weapon, WeaponKind};
use crate::game::{scale_by_level, Attacker, Damageable, Position};

/// Hit-point fraction below which rats consider fleeing and spiders
/// consider calling for help.
const LOW_HP_THRESHOLD: f64 = 0.15;

/// Concrete enemy variants.
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyKind {
    Rat,
    Spider,
    Skeleton { weapon: Weapon },
}

/// Something an enemy did during its pre-turn hook.
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyAction {
    /// A damage-over-time status was inflicted on the player.
    InflictedStatus { name: &'static str, turns: u32 },
    /// The enemy fled, ending combat immediately.
    Fled,
    /// The spider called for reinforcements. Narrative only; nothing spawns.
    CalledReinforcements,
}

/// A hostile entity occupying a board cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    kind: EnemyKind,
    level: u32,
    hp: f64,
    max_hp: f64,
    max_damage: f64,
    reward_coins: u32,
    position: Position,
}

impl Enemy {
    fn with_kind(
        kind: EnemyKind,
        level: u32,
        base_damage: f64,
        reward_coins: u32,
        position: Position,
    ) -> Self {
        let max_hp = scale_by_level(ENEMY_BASE_HP, level);
        Self {
            kind,
            level,
            hp: max_hp,
            max_hp,
            max_damage: scale_by_level(base_damage, level),
            reward_coins,
            position,
        }
    }

    /// Creates a rat. Base damage 15, reward 200 coins.
    pub fn rat(level: u32, position: Position) -> Self {
        Self::with_kind(EnemyKind::Rat, level, 15.0, 200, position)
    }

    /// Creates a spider. Base damage 20, reward 250 coins.
    pub fn spider(level: u32, position: Position) -> Self {
        Self::with_kind(EnemyKind::Spider, level, 20.0, 250, position)
    }

    /// Creates a skeleton armed with a uniformly chosen weapon.
    /// Base damage 10, reward 150 coins.
    pub fn skeleton(level: u32, position: Position, dice: &mut dyn Dice) -> Self {
        let weapon = Weapon::random(position, dice);
        Self::with_kind(EnemyKind::Skeleton { weapon }, level, 10.0, 150, position)
    }

    /// Picks an enemy variant uniformly. Used by level generation.
    pub fn random(level: u32, position: Position, dice: &mut dyn Dice) -> Self {
        match dice.roll(2) {
            0 => Self::rat(level, position),
            1 => Self::spider(level, position),
            _ => Self::skeleton(level, position, dice),
        }
    }

    pub fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    /// Display name of the variant.
    pub fn name(&self) -> &'static str {
        match self.kind {
            EnemyKind::Rat => "Rat",
            EnemyKind::Spider => "Spider",
            EnemyKind::Skeleton { .. } => "Skeleton",
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Upper bound of this enemy's damage roll (already level-scaled).
    pub fn max_damage(&self) -> f64 {
        self.max_damage
    }

    /// Coins credited to the player on defeat.
    pub fn reward_coins(&self) -> u32 {
        self.reward_coins
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Pre-turn hook, fired after the player's attack and before the enemy's
    /// own. May inflict a status, flee (ending combat via the player's fight
    /// flag) or emit a narrative-only reinforcement call.
    pub fn before_turn(&self, player: &mut Player, dice: &mut dyn Dice) -> Vec<EnemyAction> {
        let mut actions = Vec::new();
        match self.kind {
            EnemyKind::Rat => {
                if dice.chance(0.25) {
                    player.apply_status("infection", 5.0, 3);
                    actions.push(EnemyAction::InflictedStatus {
                        name: "infection",
                        turns: 3,
                    });
                }
                if self.hp / self.max_hp < LOW_HP_THRESHOLD && dice.chance(0.10) {
                    player.end_fight();
                    actions.push(EnemyAction::Fled);
                }
            }
            EnemyKind::Spider => {
                if dice.chance(0.10) {
                    player.apply_status("poison", 15.0, 2);
                    actions.push(EnemyAction::InflictedStatus {
                        name: "poison",
                        turns: 2,
                    });
                }
                if self.hp / self.max_hp < LOW_HP_THRESHOLD && dice.chance(0.10) {
                    actions.push(EnemyAction::CalledReinforcements);
                }
            }
            EnemyKind::Skeleton { .. } => {}
        }
        actions
    }

    /// The weapon this enemy would drop on defeat. Skeletons drop their
    /// weapon unless it is a fist; other enemies drop nothing.
    pub fn drop_loot(&self) -> Option<Weapon> {
        match &self.kind {
            EnemyKind::Skeleton { weapon } if !matches!(weapon.kind(), WeaponKind::Fist) => {
                Some(weapon.clone())
            }
            _ => None,
        }
    }

    /// Restores a persisted weapon onto a skeleton. No-op for other kinds.
    pub(crate) fn replace_weapon(&mut self, new_weapon: Weapon) {
        if let EnemyKind::Skeleton { weapon } = &mut self.kind {
            *weapon = new_weapon;
        }
    }
}

impl Damageable for Enemy {
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

impl Attacker for Enemy {
    /// Skeletons swing their held weapon's raw damage roll (no multipliers,
    /// no resource consumption); everything else rolls `[0, max_damage]`.
    fn attack(&mut self, target: &mut dyn Damageable, dice: &mut dyn Dice) -> f64 {
        let damage = match &self.kind {
            EnemyKind::Skeleton { weapon } => weapon.roll_damage(dice) as f64,
            _ => dice.roll(self.max_damage as u32) as f64,
        };
        target.take_damage(damage);
        damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dice::SequenceDice;

    fn pos() -> Position {
        Position::new(2, 2)
    }

    #[test]
    fn test_stat_scaling() {
        let rat = Enemy::rat(1, pos());
        assert_eq!(rat.max_hp(), 110.0);
        assert!((rat.max_damage() - 16.5).abs() < 1e-9);
        assert_eq!(rat.reward_coins(), 200);

        let spider = Enemy::spider(0, pos());
        assert_eq!(spider.max_hp(), 100.0);
        assert_eq!(spider.max_damage(), 20.0);
        assert_eq!(spider.reward_coins(), 250);
    }

    #[test]
    fn test_rat_infects_player() {
        let rat = Enemy::rat(1, pos());
        let mut player = Player::new(1, Position::origin());
        player.begin_fight();

        let mut dice = SequenceDice::new().with_chances([true]);
        let actions = rat.before_turn(&mut player, &mut dice);
        assert_eq!(
            actions,
            vec![EnemyAction::InflictedStatus {
                name: "infection",
                turns: 3
            }]
        );
        assert!(player.statuses().contains_key("infection"));
        assert!(player.in_fight()); // healthy rat never flees
    }

    #[test]
    fn test_rat_flees_only_when_badly_hurt() {
        let mut rat = Enemy::rat(1, pos());
        let mut player = Player::new(1, Position::origin());
        player.begin_fight();

        // infection check fails, flee check succeeds, but hp is full
        let mut dice = SequenceDice::new().with_chances([false, true]);
        assert!(rat.before_turn(&mut player, &mut dice).is_empty());
        assert!(player.in_fight());

        rat.take_damage(100.0); // 10/110 left, below the 0.15 threshold
        let mut dice = SequenceDice::new().with_chances([false, true]);
        let actions = rat.before_turn(&mut player, &mut dice);
        assert_eq!(actions, vec![EnemyAction::Fled]);
        assert!(!player.in_fight());
    }

    #[test]
    fn test_spider_reinforcements_are_narrative_only() {
        let mut spider = Enemy::spider(1, pos());
        spider.take_damage(100.0);
        let mut player = Player::new(1, Position::origin());
        player.begin_fight();

        let mut dice = SequenceDice::new().with_chances([false, true]);
        let actions = spider.before_turn(&mut player, &mut dice);
        assert_eq!(actions, vec![EnemyAction::CalledReinforcements]);
        // combat goes on and nothing new exists
        assert!(player.in_fight());
    }

    #[test]
    fn test_skeleton_attacks_with_held_weapon() {
        // kind roll 2 -> bow, ammo roll 10
        let mut dice = SequenceDice::new().with_rolls([2, 10]);
        let mut skeleton = Enemy::skeleton(1, pos(), &mut dice);
        let mut player = Player::new(1, Position::origin());
        let hp_before = player.hp();

        // raw bow roll, clamped to the bow's max of 35; no ammo spent
        let mut attack_dice = SequenceDice::new().with_rolls([99]);
        let damage = skeleton.attack(&mut player, &mut attack_dice);
        assert_eq!(damage, 35.0);
        assert_eq!(player.hp(), hp_before - 35.0);
        if let EnemyKind::Skeleton { weapon } = skeleton.kind() {
            assert_eq!(weapon.ammo(), Some(10));
        } else {
            panic!("expected a skeleton");
        }
    }

    #[test]
    fn test_skeleton_loot_excludes_fist() {
        let mut dice = SequenceDice::new().with_rolls([0]); // fist
        let skeleton = Enemy::skeleton(1, pos(), &mut dice);
        assert!(skeleton.drop_loot().is_none());

        let mut dice = SequenceDice::new().with_rolls([3, 8]); // revolver, ammo 8
        let skeleton = Enemy::skeleton(1, pos(), &mut dice);
        let loot = skeleton.drop_loot().expect("revolver should drop");
        assert_eq!(loot.name(), "Revolver");
        assert_eq!(loot.ammo(), Some(8));
    }

    #[test]
    fn test_generic_enemy_attack_rolls_max_damage() {
        let mut spider = Enemy::spider(1, pos());
        let mut player = Player::new(1, Position::origin());

        // spider max damage 22.0 at level 1; roll clamps there
        let mut dice = SequenceDice::new().with_rolls([50]);
        let damage = spider.attack(&mut player, &mut dice);
        assert_eq!(damage, 22.0);
    }
}
