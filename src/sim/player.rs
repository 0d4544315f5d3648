//! The player ship
//!
//! Transient buffs are countdown fields decremented by the tick; nothing here
//! schedules deferred work.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityKind};
use super::upgrades::{BaseStats, PlayerStats};
use crate::consts::*;

/// A multiplier that lapses back to 1 after a countdown
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Boost {
    pub multiplier: f32,
    pub remaining: f32,
}

impl Boost {
    pub fn factor(&self) -> f32 {
        if self.remaining > 0.0 {
            self.multiplier
        } else {
            1.0
        }
    }

    pub fn start(&mut self, multiplier: f32, duration: f32) {
        self.multiplier = multiplier;
        self.remaining = duration;
    }

    fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    /// Movement speed after upgrades (px/s)
    pub speed: f32,
    /// Shots per second after upgrades
    pub fire_rate: f32,
    pub damage: f32,
    /// Inputs to upgrade composition
    pub base: BaseStats,
    pub invulnerable_time: f32,
    pub speed_boost: Boost,
    pub fire_rate_boost: Boost,
    pub multi_shot: u32,
    pub piercing: bool,
    pub explosive: bool,
    pub lifesteal: bool,
    /// Seconds since the last shot
    last_shot: f32,
}

impl Player {
    pub fn new(id: u32, pos: Vec2) -> Self {
        let base = BaseStats {
            damage: PLAYER_BASE_DAMAGE,
            fire_rate: PLAYER_BASE_FIRE_RATE,
            speed: PLAYER_BASE_SPEED,
            max_health: PLAYER_BASE_HEALTH,
        };
        Self {
            body: Body::new(id, EntityKind::Player, pos, PLAYER_RADIUS)
                .with_size(PLAYER_SIZE, PLAYER_SIZE),
            health: base.max_health,
            max_health: base.max_health,
            speed: base.speed,
            fire_rate: base.fire_rate,
            damage: base.damage,
            base,
            invulnerable_time: 0.0,
            speed_boost: Boost::default(),
            fire_rate_boost: Boost::default(),
            multi_shot: 1,
            piercing: false,
            explosive: false,
            lifesteal: false,
            // Ready to fire on the first tick
            last_shot: f32::MAX,
        }
    }

    /// Steer from a movement vector (normalized here) and integrate
    pub fn update(&mut self, movement: Vec2, dt: f32) {
        self.body.update(dt);

        if self.invulnerable_time > 0.0 {
            self.invulnerable_time -= dt;
        }
        self.speed_boost.tick(dt);
        self.fire_rate_boost.tick(dt);

        let dir = movement.normalize_or_zero();
        self.body.vel = dir * self.speed * self.speed_boost.factor();
        if dir != Vec2::ZERO {
            self.body.rotation = dir.y.atan2(dir.x);
        }
    }

    /// Seconds between shots for a weapon firing `weapon_rate` shots/s
    pub fn fire_interval(&self, weapon_rate: f32) -> f32 {
        let upgrade_factor = self.fire_rate / self.base.fire_rate;
        1.0 / (weapon_rate * upgrade_factor * self.fire_rate_boost.factor())
    }

    /// Advance the shot timer; true when a shot should be fired this tick
    pub fn try_fire(&mut self, dt: f32, weapon_rate: f32, trigger_held: bool) -> bool {
        self.last_shot += dt;
        if trigger_held && self.last_shot >= self.fire_interval(weapon_rate) {
            self.last_shot = 0.0;
            return true;
        }
        false
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_time > 0.0
    }

    /// Take contact damage. Ignored while invulnerable. Returns true on death.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_invulnerable() || !self.body.alive {
            return false;
        }
        self.health -= amount;
        self.invulnerable_time = PLAYER_INVULNERABLE_SECS;
        if self.health <= 0 {
            self.body.destroy();
            return true;
        }
        false
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn apply_speed_boost(&mut self, multiplier: f32, duration: f32) {
        self.speed_boost.start(multiplier, duration);
    }

    pub fn apply_fire_rate_boost(&mut self, multiplier: f32, duration: f32) {
        self.fire_rate_boost.start(multiplier, duration);
    }

    /// Adopt freshly composed stats; a max-health increase heals by the same amount
    pub fn apply_stats(&mut self, stats: &PlayerStats) {
        let gained = stats.max_health - self.max_health;
        self.max_health = stats.max_health;
        if gained > 0 {
            self.health += gained;
        }
        self.health = self.health.min(self.max_health);

        self.damage = stats.damage;
        self.fire_rate = stats.fire_rate;
        self.speed = stats.speed;
        self.multi_shot = stats.multi_shot;
        self.piercing = stats.piercing;
        self.explosive = stats.explosive;
        self.lifesteal = stats.lifesteal;
    }
}
