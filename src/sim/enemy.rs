//! Enemy variants and steering behaviors
//!
//! Variants differ only in their stat row and behavior tag; all of them share
//! one [`Enemy`] record and are driven by [`Enemy::update`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::str::FromStr;

use super::entity::Body;
use super::weapons::{BulletKind, BulletSpec};
use crate::consts::{ENEMY_BOUNDARY_RADIUS, ENEMY_BULLET_DAMAGE, ENEMY_BULLET_SPEED};
use crate::error::GameError;

/// Orbiters approach beyond this distance
const ORBIT_FAR: f32 = 150.0;
/// Orbiters back off inside this distance
const ORBIT_NEAR: f32 = 100.0;
/// Snipers close in until this distance, then hold and shoot
const SNIPER_RANGE: f32 = 200.0;
const SNIPER_DAMPING: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
    Sniper,
    Orbit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Chase,
    Orbit,
    Sniper,
    Wander,
}

/// Stat row of an enemy variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpec {
    pub health: f32,
    pub speed: f32,
    /// Damage dealt to the player on contact
    pub damage: i32,
    pub score: u64,
    pub exp: u64,
    pub radius: f32,
    pub width: f32,
    pub height: f32,
    pub drop_chance: f32,
    pub behavior: Behavior,
    /// First wave this variant can appear in
    pub unlock_wave: u32,
    /// Relative spawn weight among unlocked variants
    pub weight: u32,
    pub shoot_interval: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Sniper,
        EnemyKind::Orbit,
    ];

    pub fn spec(&self) -> EnemySpec {
        let basic = EnemySpec {
            health: 1.0,
            speed: 100.0,
            damage: 1,
            score: 10,
            exp: 10,
            radius: 10.0,
            width: 20.0,
            height: 20.0,
            drop_chance: 0.1,
            behavior: Behavior::Chase,
            unlock_wave: 0,
            weight: 5,
            shoot_interval: 2.0,
        };
        match self {
            EnemyKind::Basic => basic,
            EnemyKind::Fast => EnemySpec {
                speed: 180.0,
                score: 15,
                radius: 8.0,
                width: 16.0,
                height: 16.0,
                drop_chance: 0.15,
                unlock_wave: 2,
                weight: 3,
                ..basic
            },
            EnemyKind::Tank => EnemySpec {
                health: 5.0,
                speed: 50.0,
                damage: 2,
                score: 30,
                radius: 15.0,
                width: 30.0,
                height: 30.0,
                drop_chance: 0.25,
                unlock_wave: 4,
                weight: 2,
                ..basic
            },
            EnemyKind::Sniper => EnemySpec {
                health: 2.0,
                speed: 70.0,
                score: 25,
                radius: 12.0,
                width: 24.0,
                height: 18.0,
                drop_chance: 0.2,
                behavior: Behavior::Sniper,
                unlock_wave: 3,
                weight: 2,
                shoot_interval: 1.5,
                ..basic
            },
            EnemyKind::Orbit => EnemySpec {
                health: 2.0,
                speed: 120.0,
                score: 20,
                drop_chance: 0.15,
                behavior: Behavior::Orbit,
                unlock_wave: 5,
                weight: 2,
                ..basic
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Sniper => "sniper",
            EnemyKind::Orbit => "orbit",
        }
    }
}

impl FromStr for EnemyKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnemyKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GameError::UnknownEnemy(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub damage: i32,
    pub score_value: u64,
    pub exp_value: u64,
    pub behavior: Behavior,
    pub drop_chance: f32,
    shoot_cooldown: f32,
    shoot_interval: f32,
    wander_angle: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, rng: &mut impl Rng) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            health: spec.health,
            max_health: spec.health,
            speed: spec.speed,
            damage: spec.damage,
            score_value: spec.score,
            exp_value: spec.exp,
            behavior: spec.behavior,
            drop_chance: spec.drop_chance,
            shoot_cooldown: 0.0,
            shoot_interval: spec.shoot_interval,
            wander_angle: rng.random::<f32>() * TAU,
        }
    }

    /// Scale health and score for the wave the enemy spawns in
    pub fn scale_for_wave(&mut self, wave: u32) {
        let health_mult = 1.0 + (wave.max(1) - 1) as f32 * 0.1;
        self.health *= health_mult;
        self.max_health *= health_mult;
        self.score_value = (self.score_value as f32 * (1.0 + wave as f32 * 0.2)).floor() as u64;
    }

    /// Apply damage; returns true when this hit killed the enemy
    pub fn take_damage(&mut self, body: &mut Body, amount: f32) -> bool {
        if !body.alive {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            body.destroy();
            return true;
        }
        false
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Integrate, steer and clamp to the enemy boundary.
    ///
    /// Without a live player every variant wanders. Returns a shot when a
    /// sniper's cooldown elapses.
    pub fn update(
        &mut self,
        body: &mut Body,
        dt: f32,
        player: Option<&Body>,
        rng: &mut impl Rng,
    ) -> Option<BulletSpec> {
        body.update(dt);

        let target = player.filter(|p| p.alive);
        let shot = match (target, self.behavior) {
            (None, _) | (_, Behavior::Wander) => {
                self.wander(body, dt, rng);
                None
            }
            (Some(p), Behavior::Chase) => {
                let angle = body.angle_to(p);
                body.vel = crate::heading(angle) * self.speed;
                body.rotation = angle;
                None
            }
            (Some(p), Behavior::Orbit) => {
                self.orbit(body, p);
                None
            }
            (Some(p), Behavior::Sniper) => self.snipe(body, dt, p),
        };

        body.constrain_to_area(Vec2::ZERO, ENEMY_BOUNDARY_RADIUS);
        shot
    }

    fn orbit(&self, body: &mut Body, player: &Body) {
        let distance = body.distance_to(player);
        let angle = body.angle_to(player);
        let dir = if distance > ORBIT_FAR {
            angle
        } else if distance < ORBIT_NEAR {
            angle + std::f32::consts::PI
        } else {
            angle + FRAC_PI_2
        };
        body.vel = crate::heading(dir) * self.speed;
        body.rotation = body.vel.y.atan2(body.vel.x);
    }

    fn snipe(&mut self, body: &mut Body, dt: f32, player: &Body) -> Option<BulletSpec> {
        let distance = body.distance_to(player);
        let angle = body.angle_to(player);
        body.rotation = angle;

        if distance > SNIPER_RANGE {
            body.vel = crate::heading(angle) * self.speed * 0.5;
            return None;
        }

        body.vel *= SNIPER_DAMPING;
        self.shoot_cooldown -= dt;
        if self.shoot_cooldown > 0.0 {
            return None;
        }
        self.shoot_cooldown = self.shoot_interval;
        Some(BulletSpec {
            kind: BulletKind::Normal,
            pos: body.pos,
            angle,
            speed: ENEMY_BULLET_SPEED,
            damage: ENEMY_BULLET_DAMAGE,
            piercing: false,
            pierce_count: 0,
            explosive: None,
        })
    }

    fn wander(&mut self, body: &mut Body, dt: f32, rng: &mut impl Rng) {
        self.wander_angle += (rng.random::<f32>() - 0.5) * 2.0 * dt;
        body.vel = crate::heading(self.wander_angle) * self.speed * 0.5;
        body.rotation = self.wander_angle;
    }
}
