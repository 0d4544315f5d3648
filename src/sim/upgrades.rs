//! Permanent upgrades chosen at level-up
//!
//! Each category keeps an additive accumulator of per-pick increments. Derived
//! stats are pure functions of the accumulators and the base stats passed in,
//! so application order never matters and history is never rewritten.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::str::FromStr;

use crate::error::{GameError, Result};

/// Half-angle of the multishot fan (22.5°)
pub const MULTISHOT_HALF_ARC: f32 = PI / 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Damage,
    FireRate,
    Speed,
    Health,
    MultiShot,
    Piercing,
    Explosive,
    Lifesteal,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 8] = [
        UpgradeKind::Damage,
        UpgradeKind::FireRate,
        UpgradeKind::Speed,
        UpgradeKind::Health,
        UpgradeKind::MultiShot,
        UpgradeKind::Piercing,
        UpgradeKind::Explosive,
        UpgradeKind::Lifesteal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Damage => "damage",
            UpgradeKind::FireRate => "fireRate",
            UpgradeKind::Speed => "speed",
            UpgradeKind::Health => "health",
            UpgradeKind::MultiShot => "multiShot",
            UpgradeKind::Piercing => "piercing",
            UpgradeKind::Explosive => "explosive",
            UpgradeKind::Lifesteal => "lifesteal",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for UpgradeKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        UpgradeKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownUpgrade(s.to_string()))
    }
}

/// One entry of the level-up catalog
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeChoice {
    pub kind: UpgradeKind,
    /// Increment added to the category accumulator
    pub amount: f32,
    pub name: &'static str,
    pub description: &'static str,
}

/// The fixed upgrade catalog offered at level-up
pub fn catalog() -> [UpgradeChoice; 8] {
    let entry = |kind, amount, name, description| UpgradeChoice {
        kind,
        amount,
        name,
        description,
    };
    [
        entry(UpgradeKind::Damage, 0.25, "Damage Up", "Damage +25%"),
        entry(UpgradeKind::FireRate, 0.20, "Fire Rate Up", "Fire rate +20%"),
        entry(UpgradeKind::Speed, 0.15, "Speed Up", "Movement speed +15%"),
        entry(UpgradeKind::Health, 1.0, "Max Health Up", "Max health +1"),
        entry(UpgradeKind::MultiShot, 1.0, "Multishot", "One more projectile per shot"),
        entry(UpgradeKind::Piercing, 1.0, "Piercing", "Shots pass through enemies"),
        entry(UpgradeKind::Explosive, 1.0, "Explosive", "Shots explode on impact"),
        entry(UpgradeKind::Lifesteal, 1.0, "Lifesteal", "Heal when a shot kills"),
    ]
}

/// Inputs to player stat composition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub damage: f32,
    pub fire_rate: f32,
    pub speed: f32,
    pub max_health: i32,
}

/// Player stats after upgrades
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub damage: f32,
    pub fire_rate: f32,
    pub speed: f32,
    pub max_health: i32,
    pub multi_shot: u32,
    pub piercing: bool,
    pub explosive: bool,
    pub lifesteal: bool,
}

/// Explosion attached to a projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosive {
    pub radius: f32,
    pub damage: f32,
}

/// Projectile stats before/after upgrades
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BulletStats {
    pub damage: f32,
    pub speed: f32,
    pub piercing: bool,
    /// Piercing level granted by upgrades (0 = none)
    pub pierce_count: u32,
    pub explosive: Option<Explosive>,
}

/// Per-run accumulated upgrade levels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermanentUpgrades {
    levels: [f32; 8],
}

impl PermanentUpgrades {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, kind: UpgradeKind) -> f32 {
        self.levels[kind.index()]
    }

    /// Add a pick's increment to its category
    pub fn apply_upgrade(&mut self, pick: &UpgradeChoice) -> Result<()> {
        self.add(pick.kind, pick.amount)
    }

    /// Apply an increment to a category named by string id
    pub fn apply_named(&mut self, kind: &str, amount: f32) -> Result<()> {
        let kind = kind.parse::<UpgradeKind>().inspect_err(|e| {
            log::warn!("{e}");
        })?;
        self.add(kind, amount)
    }

    fn add(&mut self, kind: UpgradeKind, amount: f32) -> Result<()> {
        if amount < 0.0 || !amount.is_finite() {
            return Err(GameError::NegativeUpgrade { kind, amount });
        }
        self.levels[kind.index()] += amount;
        Ok(())
    }

    pub fn player_stats(&self, base: &BaseStats) -> PlayerStats {
        PlayerStats {
            damage: base.damage * (1.0 + self.level(UpgradeKind::Damage)),
            fire_rate: base.fire_rate * (1.0 + self.level(UpgradeKind::FireRate)),
            speed: base.speed * (1.0 + self.level(UpgradeKind::Speed)),
            max_health: base.max_health + self.level(UpgradeKind::Health) as i32,
            multi_shot: self.multi_shot_count(),
            piercing: self.level(UpgradeKind::Piercing) > 0.0,
            explosive: self.level(UpgradeKind::Explosive) > 0.0,
            lifesteal: self.level(UpgradeKind::Lifesteal) > 0.0,
        }
    }

    pub fn bullet_stats(&self, base: &BulletStats) -> BulletStats {
        let mut stats = *base;
        stats.damage *= 1.0 + self.level(UpgradeKind::Damage);

        let piercing = self.level(UpgradeKind::Piercing);
        if piercing > 0.0 {
            stats.piercing = true;
            stats.pierce_count = piercing as u32;
        }

        let explosive = self.level(UpgradeKind::Explosive);
        if explosive > 0.0 {
            stats.explosive = Some(Explosive {
                radius: 30.0 + explosive * 10.0,
                damage: stats.damage * 0.5,
            });
        }
        stats
    }

    pub fn multi_shot_count(&self) -> u32 {
        1 + self.level(UpgradeKind::MultiShot) as u32
    }

    /// Fan `1 + multishot` angles symmetrically across ±22.5° of `base_angle`
    pub fn multi_shot_angles(&self, base_angle: f32) -> Vec<f32> {
        let count = self.multi_shot_count();
        if count == 1 {
            return vec![base_angle];
        }
        let step = MULTISHOT_HALF_ARC * 2.0 / (count - 1) as f32;
        (0..count)
            .map(|i| base_angle - MULTISHOT_HALF_ARC + step * i as f32)
            .collect()
    }

    /// Healing owed for `damage_dealt`: max(1, floor(dmg × 0.1 × level)), or 0
    pub fn lifesteal_heal(&self, damage_dealt: f32) -> i32 {
        let level = self.level(UpgradeKind::Lifesteal);
        if level <= 0.0 {
            return 0;
        }
        ((damage_dealt * 0.1 * level).floor() as i32).max(1)
    }

    /// Heal the player for a killing blow; returns the amount healed
    pub fn process_lifesteal(&self, player: &mut super::player::Player, damage_dealt: f32) -> i32 {
        let amount = self.lifesteal_heal(damage_dealt);
        if amount > 0 {
            player.heal(amount);
        }
        amount
    }

    /// Zero every category (new run)
    pub fn reset(&mut self) {
        self.levels = [0.0; 8];
    }

    /// Compact "kind:level" summary of non-zero categories
    pub fn summary(&self) -> String {
        let active: Vec<String> = UpgradeKind::ALL
            .iter()
            .filter(|k| self.level(**k) > 0.0)
            .map(|k| format!("{}:{}", k.as_str(), self.level(*k)))
            .collect();
        if active.is_empty() {
            "No upgrades".to_string()
        } else {
            active.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> BaseStats {
        BaseStats {
            damage: 1.0,
            fire_rate: 8.0,
            speed: 200.0,
            max_health: 3,
        }
    }

    fn pick(kind: UpgradeKind) -> UpgradeChoice {
        catalog().into_iter().find(|c| c.kind == kind).unwrap()
    }

    #[test]
    fn test_damage_stacks_additively() {
        let mut up = PermanentUpgrades::new();
        up.apply_upgrade(&pick(UpgradeKind::Damage)).unwrap();
        up.apply_upgrade(&pick(UpgradeKind::Damage)).unwrap();
        let stats = up.player_stats(&base());
        assert!((stats.damage - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_player_stats_composition() {
        let mut up = PermanentUpgrades::new();
        for kind in [
            UpgradeKind::FireRate,
            UpgradeKind::Speed,
            UpgradeKind::Health,
            UpgradeKind::MultiShot,
            UpgradeKind::Lifesteal,
        ] {
            up.apply_upgrade(&pick(kind)).unwrap();
        }
        let stats = up.player_stats(&base());
        assert!((stats.fire_rate - 9.6).abs() < 1e-4);
        assert!((stats.speed - 230.0).abs() < 1e-3);
        assert_eq!(stats.max_health, 4);
        assert_eq!(stats.multi_shot, 2);
        assert!(stats.lifesteal);
        assert!(!stats.piercing);
        assert!(!stats.explosive);
    }

    #[test]
    fn test_explosive_level_two_bullet_stats() {
        let mut up = PermanentUpgrades::new();
        up.apply_named("explosive", 2.0).unwrap();
        let stats = up.bullet_stats(&BulletStats {
            damage: 3.0,
            speed: 350.0,
            ..Default::default()
        });
        let boom = stats.explosive.unwrap();
        assert!((boom.radius - 50.0).abs() < 1e-6);
        assert!((boom.damage - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_piercing_attaches_count() {
        let mut up = PermanentUpgrades::new();
        up.apply_upgrade(&pick(UpgradeKind::Piercing)).unwrap();
        let stats = up.bullet_stats(&BulletStats::default());
        assert!(stats.piercing);
        assert_eq!(stats.pierce_count, 1);
        assert!(stats.explosive.is_none());
    }

    #[test]
    fn test_multishot_angles() {
        let mut up = PermanentUpgrades::new();
        assert_eq!(up.multi_shot_angles(0.3), vec![0.3]);

        up.apply_upgrade(&pick(UpgradeKind::MultiShot)).unwrap();
        up.apply_upgrade(&pick(UpgradeKind::MultiShot)).unwrap();
        let angles = up.multi_shot_angles(0.0);
        assert_eq!(angles.len(), 3);
        assert!((angles[0] + MULTISHOT_HALF_ARC).abs() < 1e-6);
        assert!(angles[1].abs() < 1e-6);
        assert!((angles[2] - MULTISHOT_HALF_ARC).abs() < 1e-6);
    }

    #[test]
    fn test_lifesteal_minimum_one() {
        let mut up = PermanentUpgrades::new();
        assert_eq!(up.lifesteal_heal(50.0), 0);
        up.apply_upgrade(&pick(UpgradeKind::Lifesteal)).unwrap();
        assert_eq!(up.lifesteal_heal(1.0), 1);
        assert_eq!(up.lifesteal_heal(25.0), 2);
    }

    #[test]
    fn test_unknown_and_negative_are_rejected() {
        let mut up = PermanentUpgrades::new();
        assert_eq!(
            up.apply_named("teleport", 1.0),
            Err(GameError::UnknownUpgrade("teleport".to_string()))
        );
        assert!(up.apply_named("damage", -0.25).is_err());
        assert_eq!(up, PermanentUpgrades::new());
        assert_eq!(up.summary(), "No upgrades");
    }

    #[test]
    fn test_reset() {
        let mut up = PermanentUpgrades::new();
        up.apply_upgrade(&pick(UpgradeKind::Speed)).unwrap();
        assert_eq!(up.summary(), "speed:0.15");
        up.reset();
        assert_eq!(up.level(UpgradeKind::Speed), 0.0);
    }

    proptest! {
        #[test]
        fn composition_is_order_independent(
            picks in proptest::collection::vec(0usize..8, 0..12),
        ) {
            let table = catalog();
            let mut forward = PermanentUpgrades::new();
            let mut backward = PermanentUpgrades::new();
            for &i in &picks {
                forward.apply_upgrade(&table[i]).unwrap();
            }
            for &i in picks.iter().rev() {
                backward.apply_upgrade(&table[i]).unwrap();
            }
            let a = forward.player_stats(&base());
            let b = backward.player_stats(&base());
            prop_assert!((a.damage - b.damage).abs() < 1e-4);
            prop_assert!((a.speed - b.speed).abs() < 1e-3);
            prop_assert_eq!(a.max_health, b.max_health);
            prop_assert_eq!(a.multi_shot, b.multi_shot);
        }
    }
}
