//! Weapon table and firing
//!
//! One weapon is active at a time. Timed pickups switch to another weapon and
//! a countdown reverts to the default. Firing produces projectile descriptors;
//! the caller inserts them into the live entity set.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::upgrades::{BulletStats, Explosive, PermanentUpgrades};
use crate::consts::{BULLET_LIFETIME, LASER_LIFETIME};
use crate::error::GameError;

/// Default duration of a weapon pickup (seconds)
pub const WEAPON_DURATION: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Normal,
    Spread,
    Power,
    Rapid,
    Laser,
}

/// Projectile class, which decides size, lifetime and innate piercing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletKind {
    Normal,
    Spread,
    Power,
    Laser,
}

impl BulletKind {
    pub fn radius(&self) -> f32 {
        match self {
            BulletKind::Normal | BulletKind::Laser => 4.0,
            BulletKind::Spread => 3.0,
            BulletKind::Power => 6.0,
        }
    }

    /// Render footprint (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self {
            BulletKind::Normal => (8.0, 4.0),
            BulletKind::Spread => (6.0, 3.0),
            BulletKind::Power => (12.0, 8.0),
            BulletKind::Laser => (20.0, 2.0),
        }
    }

    pub fn lifetime(&self) -> f32 {
        match self {
            BulletKind::Laser => LASER_LIFETIME,
            _ => BULLET_LIFETIME,
        }
    }

    pub fn innately_piercing(&self) -> bool {
        matches!(self, BulletKind::Power)
    }
}

/// Firing parameters of a weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub name: &'static str,
    /// Shots per second
    pub fire_rate: f32,
    pub damage: f32,
    pub speed: f32,
    /// Full cone angle (radians)
    pub spread: f32,
    pub bullet_count: u32,
    pub bullet: BulletKind,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::Normal,
        WeaponKind::Spread,
        WeaponKind::Power,
        WeaponKind::Rapid,
        WeaponKind::Laser,
    ];

    pub fn spec(&self) -> WeaponSpec {
        match self {
            WeaponKind::Normal => WeaponSpec {
                name: "Normal",
                fire_rate: 8.0,
                damage: 1.0,
                speed: 500.0,
                spread: 0.0,
                bullet_count: 1,
                bullet: BulletKind::Normal,
            },
            WeaponKind::Spread => WeaponSpec {
                name: "Spread",
                fire_rate: 6.0,
                damage: 0.75,
                speed: 400.0,
                spread: 0.3,
                bullet_count: 5,
                bullet: BulletKind::Spread,
            },
            WeaponKind::Power => WeaponSpec {
                name: "Power",
                fire_rate: 3.0,
                damage: 3.0,
                speed: 350.0,
                spread: 0.0,
                bullet_count: 1,
                bullet: BulletKind::Power,
            },
            WeaponKind::Rapid => WeaponSpec {
                name: "Rapid",
                fire_rate: 15.0,
                damage: 0.5,
                speed: 600.0,
                spread: 0.1,
                bullet_count: 1,
                bullet: BulletKind::Normal,
            },
            WeaponKind::Laser => WeaponSpec {
                name: "Laser",
                fire_rate: 20.0,
                damage: 0.5,
                speed: 800.0,
                spread: 0.0,
                bullet_count: 1,
                bullet: BulletKind::Laser,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Normal => "normal",
            WeaponKind::Spread => "spread",
            WeaponKind::Power => "power",
            WeaponKind::Rapid => "rapid",
            WeaponKind::Laser => "laser",
        }
    }
}

impl FromStr for WeaponKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeaponKind::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownWeapon(s.to_string()))
    }
}

/// A projectile ready to be inserted into the world
#[derive(Debug, Clone, PartialEq)]
pub struct BulletSpec {
    pub kind: BulletKind,
    pub pos: Vec2,
    /// Travel direction (radians)
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
    pub piercing: bool,
    pub pierce_count: u32,
    pub explosive: Option<Explosive>,
}

#[derive(Debug, Clone)]
pub struct WeaponSystem {
    current: WeaponKind,
    default: WeaponKind,
    /// Seconds until reverting to the default weapon
    timer: f32,
}

impl Default for WeaponSystem {
    fn default() -> Self {
        Self::new(WeaponKind::Normal)
    }
}

impl WeaponSystem {
    pub fn new(default: WeaponKind) -> Self {
        Self {
            current: default,
            default,
            timer: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.current = self.default;
        self.timer = 0.0;
    }

    /// Count down and revert to the default weapon when the timer lapses
    pub fn update(&mut self, dt: f32) {
        if self.current != self.default && self.timer > 0.0 {
            self.timer -= dt;
            if self.timer <= 0.0 {
                log::debug!("{} expired, back to {}", self.current.as_str(), self.default.as_str());
                self.current = self.default;
            }
        }
    }

    /// Switch weapon and (re)start its countdown
    pub fn set_weapon(&mut self, weapon: WeaponKind, duration: Option<f32>) {
        self.current = weapon;
        self.timer = duration.unwrap_or(WEAPON_DURATION);
    }

    /// Switch weapon by id; unknown ids are logged and ignored
    pub fn set_weapon_named(&mut self, id: &str, duration: Option<f32>) -> bool {
        match id.parse::<WeaponKind>() {
            Ok(weapon) => {
                self.set_weapon(weapon, duration);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn current(&self) -> WeaponKind {
        self.current
    }

    pub fn spec(&self) -> WeaponSpec {
        self.current.spec()
    }

    pub fn fire_rate(&self) -> f32 {
        self.current.spec().fire_rate
    }

    pub fn time_remaining(&self) -> f32 {
        self.timer.max(0.0)
    }

    /// Fire from `pos` toward `direction`.
    ///
    /// Multishot fans the aim across ±22.5°; each fanned angle then gets the
    /// weapon's own pattern (random jitter for single shots, even spacing
    /// across the cone for multi-bullet weapons). Upgrade modifiers are applied
    /// on top of the weapon's base damage and speed.
    pub fn fire(
        &self,
        pos: Vec2,
        direction: f32,
        upgrades: Option<&PermanentUpgrades>,
        rng: &mut impl Rng,
    ) -> Vec<BulletSpec> {
        let weapon = self.spec();
        let aims = match upgrades {
            Some(up) => up.multi_shot_angles(direction),
            None => vec![direction],
        };

        let base = BulletStats {
            damage: weapon.damage,
            speed: weapon.speed,
            piercing: weapon.bullet.innately_piercing(),
            pierce_count: 0,
            explosive: None,
        };
        let stats = match upgrades {
            Some(up) => up.bullet_stats(&base),
            None => base,
        };

        let mut bullets = Vec::with_capacity(aims.len() * weapon.bullet_count as usize);
        for aim in aims {
            if weapon.bullet_count <= 1 {
                let jitter = (rng.random::<f32>() - 0.5) * weapon.spread;
                bullets.push(Self::make(&weapon, &stats, pos, aim + jitter));
            } else {
                let step = weapon.spread / (weapon.bullet_count - 1) as f32;
                let start = aim - weapon.spread / 2.0;
                for i in 0..weapon.bullet_count {
                    bullets.push(Self::make(&weapon, &stats, pos, start + step * i as f32));
                }
            }
        }
        bullets
    }

    fn make(weapon: &WeaponSpec, stats: &BulletStats, pos: Vec2, angle: f32) -> BulletSpec {
        BulletSpec {
            kind: weapon.bullet,
            pos,
            angle,
            speed: stats.speed,
            damage: stats.damage,
            piercing: stats.piercing,
            pierce_count: stats.pierce_count,
            explosive: stats.explosive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::upgrades::UpgradeKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spread_fans_evenly() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ws = WeaponSystem::default();
        ws.set_weapon(WeaponKind::Spread, None);
        let shots = ws.fire(Vec2::ZERO, 0.0, None, &mut rng);

        assert_eq!(shots.len(), 5);
        let expected = [-0.15, -0.075, 0.0, 0.075, 0.15];
        for (shot, want) in shots.iter().zip(expected) {
            assert!((shot.angle - want).abs() < 1e-6, "{} vs {}", shot.angle, want);
            assert_eq!(shot.kind, BulletKind::Spread);
            assert!((shot.damage - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_single_shot_jitter_within_cone() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ws = WeaponSystem::default();
        ws.set_weapon(WeaponKind::Rapid, Some(3.0));
        for _ in 0..200 {
            let shots = ws.fire(Vec2::ZERO, 1.0, None, &mut rng);
            assert_eq!(shots.len(), 1);
            assert!((shots[0].angle - 1.0).abs() <= 0.05 + 1e-6);
        }

        ws.reset();
        let shots = ws.fire(Vec2::ZERO, 1.0, None, &mut rng);
        assert_eq!(shots[0].angle, 1.0);
    }

    #[test]
    fn test_timer_reverts_to_default() {
        let mut ws = WeaponSystem::default();
        ws.set_weapon(WeaponKind::Laser, Some(1.0));
        ws.update(0.6);
        assert_eq!(ws.current(), WeaponKind::Laser);
        ws.update(0.6);
        assert_eq!(ws.current(), WeaponKind::Normal);

        // Re-arming restarts the countdown
        ws.set_weapon(WeaponKind::Power, None);
        ws.update(9.0);
        ws.set_weapon(WeaponKind::Power, None);
        ws.update(9.0);
        assert_eq!(ws.current(), WeaponKind::Power);
        assert!((ws.time_remaining() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_weapon_is_ignored() {
        let mut ws = WeaponSystem::default();
        assert!(!ws.set_weapon_named("railgun", None));
        assert_eq!(ws.current(), WeaponKind::Normal);
        assert!(ws.set_weapon_named("LASER", Some(2.0)));
        assert_eq!(ws.current(), WeaponKind::Laser);
    }

    #[test]
    fn test_multishot_with_spread_weapon() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut up = PermanentUpgrades::new();
        up.apply_named("multiShot", 2.0).unwrap();
        up.apply_named("damage", 0.5).unwrap();

        let mut ws = WeaponSystem::default();
        ws.set_weapon(WeaponKind::Spread, None);
        let shots = ws.fire(Vec2::ZERO, 0.0, Some(&up), &mut rng);
        assert_eq!(shots.len(), 15);
        assert!(shots.iter().all(|s| (s.damage - 1.125).abs() < 1e-6));
        assert_eq!(up.level(UpgradeKind::MultiShot), 2.0);
    }

    #[test]
    fn test_power_pierces_and_upgrades_attach_payload() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut up = PermanentUpgrades::new();
        up.apply_named("explosive", 1.0).unwrap();

        let mut ws = WeaponSystem::default();
        ws.set_weapon(WeaponKind::Power, None);
        let shot = &ws.fire(Vec2::new(5.0, 5.0), 0.0, Some(&up), &mut rng)[0];
        assert!(shot.piercing);
        assert_eq!(shot.pos, Vec2::new(5.0, 5.0));
        let boom = shot.explosive.unwrap();
        assert!((boom.radius - 40.0).abs() < 1e-6);
        assert!((boom.damage - 1.5).abs() < 1e-6);
    }
}
