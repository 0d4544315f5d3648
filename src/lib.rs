//! Space Survivor - A top-down arena survival shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, waves, weapons, upgrades)
//! - `platform`: Collaborator interfaces (input, audio, notifications, rendering)
//! - `persistence`: Best-effort save data with default merging
//! - `settings`: Player preferences and quality presets

pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta the tick accepts (tab-resume stalls get clamped)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena boundary radius (player and bullets)
    pub const ARENA_RADIUS: f32 = 300.0;
    /// Enemies are kept slightly inside the arena wall
    pub const ENEMY_BOUNDARY_RADIUS: f32 = 290.0;
    /// Enemies appear on this ring around the arena center
    pub const SPAWN_RING_RADIUS: f32 = 280.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 16.0;
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_BASE_SPEED: f32 = 200.0;
    pub const PLAYER_BASE_HEALTH: i32 = 3;
    pub const PLAYER_BASE_FIRE_RATE: f32 = 8.0;
    pub const PLAYER_BASE_DAMAGE: f32 = 1.0;
    /// Invulnerability window after taking a hit (seconds)
    pub const PLAYER_INVULNERABLE_SECS: f32 = 1.5;

    /// Bullet defaults
    pub const BULLET_LIFETIME: f32 = 2.0;
    pub const LASER_LIFETIME: f32 = 0.5;
    pub const ENEMY_BULLET_SPEED: f32 = 300.0;
    pub const ENEMY_BULLET_DAMAGE: f32 = 1.0;

    /// Power-up defaults
    pub const POWERUP_LIFETIME: f32 = 10.0;
    pub const POWERUP_MAGNET_RANGE: f32 = 100.0;
    pub const POWERUP_MAGNET_SPEED: f32 = 300.0;
    pub const POWERUP_RADIUS: f32 = 12.0;

    /// Default particle population cap
    pub const MAX_PARTICLES: usize = 500;
    /// Duration of the particle fade when leaving the level-up screen
    pub const LEVEL_UP_FADE_SECS: f32 = 0.2;
    /// Virtual screen size used for full-screen particle effects
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector pointing along `theta`
#[inline]
pub fn heading(theta: f32) -> Vec2 {
    polar_to_cartesian(1.0, theta)
}
