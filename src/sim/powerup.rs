//! Collectible power-ups
//!
//! Effects are a closed enum dispatched in [`PowerUp::apply_to`]. A power-up
//! fires its effect at most once.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::entity::Body;
use super::player::Player;
use super::weapons::{WeaponKind, WeaponSystem};
use crate::consts::{POWERUP_LIFETIME, POWERUP_MAGNET_RANGE, POWERUP_MAGNET_SPEED};
use crate::error::GameError;

/// Opacity starts fading this many seconds before expiry
const FADE_WINDOW: f32 = 2.0;
/// Velocity damping outside magnet range
const DRIFT_DAMPING: f32 = 0.9;
const SPIN_SPEED: f32 = 2.0;

const BOOST_DURATION: f32 = 5.0;
const WEAPON_GRANT_DURATION: f32 = 10.0;
const SHIELD_DURATION: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Speed,
    FireRate,
    WeaponSpread,
    WeaponPower,
    WeaponRapid,
    WeaponLaser,
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 8] = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::FireRate,
        PowerUpKind::WeaponSpread,
        PowerUpKind::WeaponPower,
        PowerUpKind::WeaponRapid,
        PowerUpKind::WeaponLaser,
        PowerUpKind::Shield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Health => "health",
            PowerUpKind::Speed => "speed",
            PowerUpKind::FireRate => "fireRate",
            PowerUpKind::WeaponSpread => "weaponSpread",
            PowerUpKind::WeaponPower => "weaponPower",
            PowerUpKind::WeaponRapid => "weaponRapid",
            PowerUpKind::WeaponLaser => "weaponLaser",
            PowerUpKind::Shield => "shield",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PowerUpKind::Health => "Restore 1 health",
            PowerUpKind::Speed => "Speed boost for 5 seconds",
            PowerUpKind::FireRate => "Fire rate boost for 5 seconds",
            PowerUpKind::WeaponSpread => "Spread weapon for 10 seconds",
            PowerUpKind::WeaponPower => "Power weapon for 10 seconds",
            PowerUpKind::WeaponRapid => "Rapid weapon for 10 seconds",
            PowerUpKind::WeaponLaser => "Laser weapon for 10 seconds",
            PowerUpKind::Shield => "Shield for 3 seconds",
        }
    }

    /// Render tint (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::Health => 0x00ff00,
            PowerUpKind::Speed | PowerUpKind::WeaponLaser => 0x00ffff,
            PowerUpKind::FireRate => 0xff00ff,
            PowerUpKind::WeaponSpread => 0xffff00,
            PowerUpKind::WeaponPower => 0xff8800,
            PowerUpKind::WeaponRapid => 0xff0088,
            PowerUpKind::Shield => 0x8888ff,
        }
    }

    fn weapon(&self) -> Option<WeaponKind> {
        match self {
            PowerUpKind::WeaponSpread => Some(WeaponKind::Spread),
            PowerUpKind::WeaponPower => Some(WeaponKind::Power),
            PowerUpKind::WeaponRapid => Some(WeaponKind::Rapid),
            PowerUpKind::WeaponLaser => Some(WeaponKind::Laser),
            _ => None,
        }
    }
}

impl FromStr for PowerUpKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PowerUpKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownPowerUp(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Seconds until expiry
    pub lifetime: f32,
    pub collected: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind) -> Self {
        Self {
            kind,
            lifetime: POWERUP_LIFETIME,
            collected: false,
        }
    }

    /// Age, spin and drift toward a nearby live player
    pub fn update(&mut self, body: &mut Body, dt: f32, player: Option<&Body>) {
        body.update(dt);

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            body.destroy();
            return;
        }
        body.rotation += SPIN_SPEED * dt;

        let Some(player) = player.filter(|p| p.alive) else {
            return;
        };
        let distance = body.distance_to(player);
        if distance < POWERUP_MAGNET_RANGE {
            // Pull weakens linearly with distance
            let strength = (1.0 - distance / POWERUP_MAGNET_RANGE) * POWERUP_MAGNET_SPEED;
            body.vel = crate::heading(body.angle_to(player)) * strength;
        } else {
            body.vel *= DRIFT_DAMPING;
        }
    }

    /// 1 until the final seconds, then a linear fade to 0
    pub fn opacity(&self) -> f32 {
        if self.lifetime < FADE_WINDOW {
            (self.lifetime / FADE_WINDOW).max(0.0)
        } else {
            1.0
        }
    }

    /// Apply the effect once. Returns the description on the first call, None after.
    pub fn apply_to(
        &mut self,
        player: &mut Player,
        weapons: &mut WeaponSystem,
    ) -> Option<&'static str> {
        if self.collected {
            return None;
        }
        self.collected = true;

        match self.kind {
            PowerUpKind::Health => player.heal(1),
            PowerUpKind::Speed => player.apply_speed_boost(1.5, BOOST_DURATION),
            PowerUpKind::FireRate => player.apply_fire_rate_boost(2.0, BOOST_DURATION),
            PowerUpKind::Shield => player.invulnerable_time = SHIELD_DURATION,
            weapon_grant => {
                if let Some(weapon) = weapon_grant.weapon() {
                    weapons.set_weapon(weapon, Some(WEAPON_GRANT_DURATION));
                }
            }
        }
        Some(self.kind.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use glam::Vec2;

    fn body_at(pos: Vec2) -> Body {
        Body::new(9, EntityKind::PowerUp, pos, 12.0)
    }

    #[test]
    fn test_second_apply_is_a_noop() {
        let mut player = Player::new(1, Vec2::ZERO);
        let mut weapons = WeaponSystem::default();
        player.take_damage(2);
        player.invulnerable_time = 0.0;

        let mut pu = PowerUp::new(PowerUpKind::Health);
        assert_eq!(pu.apply_to(&mut player, &mut weapons), Some("Restore 1 health"));
        assert_eq!(player.health, 2);

        assert_eq!(pu.apply_to(&mut player, &mut weapons), None);
        assert_eq!(player.health, 2);
    }

    #[test]
    fn test_weapon_grant_and_shield() {
        let mut player = Player::new(1, Vec2::ZERO);
        let mut weapons = WeaponSystem::default();

        PowerUp::new(PowerUpKind::WeaponLaser).apply_to(&mut player, &mut weapons);
        assert_eq!(weapons.current(), WeaponKind::Laser);
        assert!((weapons.time_remaining() - 10.0).abs() < 1e-6);

        PowerUp::new(PowerUpKind::Shield).apply_to(&mut player, &mut weapons);
        assert!(player.is_invulnerable());
        assert!(!player.take_damage(3));
        assert_eq!(player.health, 3);
    }

    #[test]
    fn test_magnet_pull_and_expiry() {
        let player = body_at(Vec2::ZERO);
        let mut pu = PowerUp::new(PowerUpKind::Speed);

        let mut body = body_at(Vec2::new(50.0, 0.0));
        pu.update(&mut body, 0.0, Some(&player));
        assert!((body.vel.x + 150.0).abs() < 1e-3);

        let mut far = body_at(Vec2::new(200.0, 0.0));
        far.vel = Vec2::new(10.0, 0.0);
        pu.update(&mut far, 0.0, Some(&player));
        assert!((far.vel.x - 9.0).abs() < 1e-4);

        pu.update(&mut far, 9.0, None);
        assert!((pu.opacity() - 0.5).abs() < 1e-4);
        pu.update(&mut far, 1.5, None);
        assert!(!far.alive);
    }

    #[test]
    fn test_parse() {
        assert_eq!("fireRate".parse::<PowerUpKind>(), Ok(PowerUpKind::FireRate));
        assert!("nuke".parse::<PowerUpKind>().is_err());
    }
}
