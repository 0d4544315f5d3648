//! Visual particle effects: explosions, hit sparks, trails, confetti, petals
//!
//! Particles are pure visual physics with no gameplay effect. They live in a
//! [`Pool`] sized to the population cap, so steady-state emission recycles
//! slots instead of allocating.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use super::pool::{Pool, PoolHandle, Poolable};
use crate::consts::MAX_PARTICLES;

/// Particle silhouette for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleShape {
    #[default]
    Square,
    Circle,
    Confetti,
}

/// Fade curve retrofitted onto a live particle, timed separately from its lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    /// Seconds since the fade began
    pub elapsed: f32,
    pub duration: f32,
}

/// Horizontal sway for falling petals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sway {
    pub amplitude: f32,
    /// Oscillations per second
    pub frequency: f32,
    /// Drifting center the sway oscillates around
    pub base_x: f32,
    pub time_alive: f32,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0xRRGGBB
    pub color: u32,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub size: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Velocity multiplier applied every update
    pub friction: f32,
    /// Added to vertical velocity (per second)
    pub gravity: f32,
    pub shape: ParticleShape,
    pub fade_out: bool,
    pub scale_out: bool,
    pub fade: Option<Fade>,
    pub sway: Option<Sway>,
}

/// Initial state handed to a pooled particle
#[derive(Debug, Clone, Copy)]
pub struct ParticleInit {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub lifetime: f32,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl Poolable for Particle {
    type Args = ParticleInit;

    fn create() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            color: 0xffffff,
            lifetime: 0.0,
            max_lifetime: 0.0,
            size: 2.0,
            width: 2.0,
            height: 2.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            friction: 0.98,
            gravity: 0.0,
            shape: ParticleShape::Square,
            fade_out: true,
            scale_out: true,
            fade: None,
            sway: None,
        }
    }

    fn reset(&mut self, init: ParticleInit) {
        *self = Self {
            pos: init.pos,
            vel: init.vel,
            color: init.color,
            lifetime: init.lifetime,
            max_lifetime: init.lifetime,
            size: init.size,
            width: init.size,
            height: init.size,
            rotation: init.rotation,
            rotation_speed: init.rotation_speed,
            ..Self::create()
        };
    }
}

impl Particle {
    /// Advance physics; returns false once the particle has expired
    pub fn update(&mut self, dt: f32) -> bool {
        self.lifetime -= dt;

        self.vel *= self.friction;
        self.vel.y += self.gravity * dt;
        self.pos += self.vel * dt;
        self.rotation += self.rotation_speed * dt;

        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
        }

        if let Some(sway) = self.sway.as_mut() {
            sway.time_alive += dt;
            sway.base_x += self.vel.x * dt;
            self.pos.x =
                sway.base_x + (sway.time_alive * sway.frequency * TAU).sin() * sway.amplitude;
        }

        self.lifetime > 0.0
    }

    fn life_ratio(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            return 0.0;
        }
        (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }

    /// Render opacity in [0, 1]
    pub fn alpha(&self) -> f32 {
        let mut alpha = if self.fade_out { self.life_ratio() } else { 1.0 };
        if let Some(fade) = self.fade.filter(|f| f.duration > 0.0) {
            alpha *= 1.0 - (fade.elapsed / fade.duration).clamp(0.0, 1.0);
        }
        alpha
    }

    /// Render scale factor
    pub fn scale(&self) -> f32 {
        if self.scale_out {
            0.5 + self.life_ratio() * 0.5
        } else {
            1.0
        }
    }
}

/// Explosion burst options
#[derive(Debug, Clone)]
pub struct ExplosionParams {
    pub count: usize,
    pub speed: f32,
    pub speed_variance: f32,
    pub lifetime: f32,
    pub lifetime_variance: f32,
    pub colors: Vec<u32>,
    pub size: f32,
    pub size_variance: f32,
}

impl Default for ExplosionParams {
    fn default() -> Self {
        Self {
            count: 20,
            speed: 200.0,
            speed_variance: 100.0,
            lifetime: 1.0,
            lifetime_variance: 0.5,
            colors: vec![0xff0000, 0xff8800, 0xffff00],
            size: 4.0,
            size_variance: 2.0,
        }
    }
}

/// Directional impact splash options
#[derive(Debug, Clone)]
pub struct HitParams {
    pub count: usize,
    pub spread: f32,
    pub speed: f32,
    pub lifetime: f32,
    pub color: u32,
    pub size: f32,
}

impl Default for HitParams {
    fn default() -> Self {
        Self {
            count: 10,
            spread: PI / 4.0,
            speed: 150.0,
            lifetime: 0.5,
            color: 0xffff00,
            size: 3.0,
        }
    }
}

/// Power-up pickup ring options
#[derive(Debug, Clone)]
pub struct PowerUpBurstParams {
    pub count: usize,
    pub speed: f32,
    pub lifetime: f32,
    pub colors: Vec<u32>,
    pub size: f32,
}

impl Default for PowerUpBurstParams {
    fn default() -> Self {
        Self {
            count: 15,
            speed: 100.0,
            lifetime: 1.5,
            colors: vec![0x00ff00, 0x00ffff, 0xffffff],
            size: 3.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrailParams {
    pub count: usize,
    pub spread: f32,
    pub lifetime: f32,
    pub color: u32,
    pub size: f32,
}

impl Default for TrailParams {
    fn default() -> Self {
        Self {
            count: 1,
            spread: 10.0,
            lifetime: 0.3,
            color: 0xffff00,
            size: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SparkParams {
    pub count: usize,
    pub speed: f32,
    pub lifetime: f32,
    pub color: u32,
    pub size: f32,
}

impl Default for SparkParams {
    fn default() -> Self {
        Self {
            count: 5,
            speed: 300.0,
            lifetime: 0.3,
            color: 0xffffff,
            size: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PetalParams {
    pub count: usize,
    pub colors: Vec<u32>,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for PetalParams {
    fn default() -> Self {
        Self {
            count: 2,
            colors: vec![0xff69b4, 0xffb6c1, 0xffc0cb, 0xffdbec, 0xfff0f5],
            min_speed: 20.0,
            max_speed: 50.0,
        }
    }
}

/// Celebration palette
const CONFETTI_COLORS: [u32; 16] = [
    0xff1744, 0xe91e63, 0x9c27b0, 0x673ab7, 0x3f51b5, 0x2196f3, 0x03a9f4, 0x00bcd4, 0x009688,
    0x4caf50, 0x8bc34a, 0xcddc39, 0xffeb3b, 0xffc107, 0xff9800, 0xff5722,
];

fn pick_color(colors: &[u32], rng: &mut impl Rng) -> u32 {
    colors.choose(rng).copied().unwrap_or(0xffffff)
}

/// Uniform in [-0.5, 0.5)
#[inline]
fn centered(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>() - 0.5
}

/// Population-capped particle manager
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pool: Pool<Particle>,
    /// Live particles in emission order
    live: Vec<PoolHandle>,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(MAX_PARTICLES)
    }
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            pool: Pool::new(max_particles / 5, max_particles),
            live: Vec::with_capacity(max_particles),
        }
    }

    pub fn max_particles(&self) -> usize {
        self.pool.max_size()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Read-only view for the renderer
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.live.iter().filter_map(|&h| self.pool.get(h))
    }

    /// Add a particle; silently dropped once the cap is reached.
    /// `configure` adjusts the freshly reset particle (shape, physics).
    pub fn add_particle(
        &mut self,
        init: ParticleInit,
        configure: impl FnOnce(&mut Particle),
    ) -> bool {
        if self.pool.is_exhausted() {
            return false;
        }
        let Ok(handle) = self.pool.acquire(init) else {
            return false;
        };
        if let Some(p) = self.pool.get_mut(handle) {
            configure(p);
        }
        self.live.push(handle);
        true
    }

    /// Advance every particle, retiring the expired ones this same call
    pub fn update(&mut self, dt: f32) {
        let pool = &mut self.pool;
        self.live.retain(|&handle| {
            let alive = pool.get_mut(handle).is_some_and(|p| p.update(dt));
            if !alive {
                if let Err(e) = pool.release(handle) {
                    log::warn!("Particle handle out of sync with pool: {e}");
                }
            }
            alive
        });
    }

    /// Retrofit a fade onto every live particle without resetting its
    /// physics; lifetime is extended so the fade always completes
    pub fn fade_out_all(&mut self, duration: f32) {
        for &handle in &self.live {
            let Some(p) = self.pool.get_mut(handle) else {
                continue;
            };
            if p.fade.is_none() {
                p.fade = Some(Fade {
                    elapsed: 0.0,
                    duration,
                });
                p.lifetime = p.lifetime.max(duration);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pool.release_all();
        self.live.clear();
    }

    fn random_spin(rng: &mut impl Rng) -> (f32, f32) {
        (rng.random::<f32>() * TAU, centered(rng) * 10.0)
    }

    /// Radial burst with gravity (enemy deaths)
    pub fn create_explosion(&mut self, pos: Vec2, params: &ExplosionParams, rng: &mut impl Rng) {
        for i in 0..params.count {
            let angle = TAU * i as f32 / params.count as f32 + centered(rng) * 0.5;
            let speed = params.speed + centered(rng) * params.speed_variance;
            let color = pick_color(&params.colors, rng);
            let lifetime = params.lifetime + centered(rng) * params.lifetime_variance;
            let size = params.size + centered(rng) * params.size_variance;
            let (rotation, rotation_speed) = Self::random_spin(rng);

            let init = ParticleInit {
                pos,
                vel: crate::polar_to_cartesian(speed, angle),
                color,
                lifetime,
                size,
                rotation,
                rotation_speed,
            };
            self.add_particle(init, |p| {
                p.friction = 0.95;
                p.gravity = 50.0;
            });
        }
    }

    /// Splash thrown back against `direction` (bullet impacts)
    pub fn create_hit(&mut self, pos: Vec2, direction: f32, params: &HitParams, rng: &mut impl Rng) {
        for _ in 0..params.count {
            let angle = direction + PI + centered(rng) * params.spread;
            let speed = params.speed * (0.5 + rng.random::<f32>() * 0.5);
            let lifetime = params.lifetime * (0.5 + rng.random::<f32>() * 0.5);
            let (rotation, rotation_speed) = Self::random_spin(rng);

            let init = ParticleInit {
                pos,
                vel: crate::polar_to_cartesian(speed, angle),
                color: params.color,
                lifetime,
                size: params.size,
                rotation,
                rotation_speed,
            };
            self.add_particle(init, |p| p.friction = 0.9);
        }
    }

    /// Even ring on pickup
    pub fn create_power_up(&mut self, pos: Vec2, params: &PowerUpBurstParams, rng: &mut impl Rng) {
        for i in 0..params.count {
            let angle = TAU * i as f32 / params.count as f32;
            let color = pick_color(&params.colors, rng);
            let (rotation, rotation_speed) = Self::random_spin(rng);

            let init = ParticleInit {
                pos,
                vel: crate::polar_to_cartesian(params.speed, angle),
                color,
                lifetime: params.lifetime,
                size: params.size,
                rotation,
                rotation_speed,
            };
            self.add_particle(init, |p| {
                p.friction = 0.92;
                p.fade_out = true;
                p.scale_out = false;
            });
        }
    }

    /// Short-lived exhaust behind a moving object
    pub fn create_trail(&mut self, pos: Vec2, vel: Vec2, params: &TrailParams, rng: &mut impl Rng) {
        for _ in 0..params.count {
            let jitter = Vec2::new(centered(rng), centered(rng)) * params.spread;
            let (rotation, rotation_speed) = Self::random_spin(rng);

            let init = ParticleInit {
                pos,
                vel: -vel * 0.1 + jitter,
                color: params.color,
                lifetime: params.lifetime,
                size: params.size,
                rotation,
                rotation_speed,
            };
            self.add_particle(init, |p| {
                p.fade_out = true;
                p.friction = 0.8;
            });
        }
    }

    /// Fast sparks that fall under heavy gravity
    pub fn create_spark(&mut self, pos: Vec2, params: &SparkParams, rng: &mut impl Rng) {
        for _ in 0..params.count {
            let angle = rng.random::<f32>() * TAU;
            let speed = params.speed * (0.5 + rng.random::<f32>() * 0.5);
            let (rotation, rotation_speed) = Self::random_spin(rng);

            let init = ParticleInit {
                pos,
                vel: crate::polar_to_cartesian(speed, angle),
                color: params.color,
                lifetime: params.lifetime,
                size: params.size,
                rotation,
                rotation_speed,
            };
            self.add_particle(init, |p| {
                p.friction = 0.85;
                p.gravity = 200.0;
            });
        }
    }

    /// Confetti cannons along the top of the screen plus a central burst
    pub fn create_level_up_celebration(
        &mut self,
        width: f32,
        height: f32,
        count: usize,
        rng: &mut impl Rng,
    ) {
        let shoot_points = [
            Vec2::new(width * 0.1, height * 0.1),
            Vec2::new(width * 0.3, height * 0.05),
            Vec2::new(width * 0.7, height * 0.05),
            Vec2::new(width * 0.9, height * 0.1),
        ];

        for point in shoot_points {
            for _ in 0..count / 4 {
                // Aimed mostly downward
                let angle = PI / 2.0 + centered(rng) * PI / 3.0;
                let speed = 200.0 + rng.random::<f32>() * 300.0;
                let color = pick_color(&CONFETTI_COLORS, rng);
                let lifetime = 2.0 + rng.random::<f32>() * 2.0;
                let piece_w = 3.0 + rng.random::<f32>() * 4.0;
                let piece_h = 8.0 + rng.random::<f32>() * 6.0;
                let rotation_speed = centered(rng) * 15.0;
                let gravity = 150.0 + rng.random::<f32>() * 100.0;

                let init = ParticleInit {
                    pos: point,
                    vel: crate::polar_to_cartesian(speed, angle),
                    color,
                    lifetime,
                    size: 2.0,
                    rotation: rng.random::<f32>() * TAU,
                    rotation_speed,
                };
                self.add_particle(init, |p| {
                    p.shape = ParticleShape::Confetti;
                    p.width = piece_w;
                    p.height = piece_h;
                    p.gravity = gravity;
                    p.friction = 0.98;
                    p.fade_out = true;
                    p.scale_out = false;
                });
            }
        }

        let center = Vec2::new(width / 2.0, height / 2.0);
        for i in 0..40 {
            let angle = TAU * i as f32 / 40.0 + centered(rng) * 0.3;
            let speed = 150.0 + rng.random::<f32>() * 200.0;
            let color = pick_color(&CONFETTI_COLORS, rng);
            let lifetime = 1.5 + rng.random::<f32>() * 1.5;
            let circle = rng.random::<f32>() > 0.7;
            let piece_w = 2.0 + rng.random::<f32>() * 3.0;
            let piece_h = 6.0 + rng.random::<f32>() * 4.0;
            let rotation_speed = centered(rng) * 12.0;
            let gravity = 100.0 + rng.random::<f32>() * 50.0;

            let init = ParticleInit {
                pos: center,
                vel: crate::polar_to_cartesian(speed, angle),
                color,
                lifetime,
                size: 2.0,
                rotation: rng.random::<f32>() * TAU,
                rotation_speed,
            };
            self.add_particle(init, |p| {
                if circle {
                    p.shape = ParticleShape::Circle;
                } else {
                    p.shape = ParticleShape::Confetti;
                    p.width = piece_w;
                    p.height = piece_h;
                }
                p.gravity = gravity;
                p.friction = 0.97;
                p.fade_out = true;
                p.scale_out = false;
            });
        }
    }

    /// Petals drifting down from above the screen, swaying side to side
    pub fn create_petals(&mut self, width: f32, height: f32, params: &PetalParams, rng: &mut impl Rng) {
        for _ in 0..params.count {
            let x = rng.random::<f32>() * width;
            let base_vx = centered(rng) * 30.0;
            let vy = params.min_speed + rng.random::<f32>() * (params.max_speed - params.min_speed);
            let color = pick_color(&params.colors, rng);
            // Long enough to fall off the bottom edge
            let lifetime = (height + 40.0) / vy;
            let petal_w = 8.0 + rng.random::<f32>() * 6.0;
            let petal_h = 10.0 + rng.random::<f32>() * 8.0;
            let rotation_speed = centered(rng) * 5.0;
            let amplitude = 20.0 + rng.random::<f32>() * 30.0;
            let frequency = 0.5 + rng.random::<f32>();

            let init = ParticleInit {
                pos: Vec2::new(x, -20.0),
                vel: Vec2::new(base_vx, vy),
                color,
                lifetime,
                size: 2.0,
                rotation: rng.random::<f32>() * TAU,
                rotation_speed,
            };
            self.add_particle(init, |p| {
                p.shape = ParticleShape::Confetti;
                p.width = petal_w;
                p.height = petal_h;
                p.gravity = 0.0;
                p.friction = 1.0;
                p.fade_out = false;
                p.scale_out = false;
                p.sway = Some(Sway {
                    amplitude,
                    frequency,
                    base_x: x,
                    time_alive: 0.0,
                });
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn init_at(pos: Vec2, lifetime: f32) -> ParticleInit {
        ParticleInit {
            pos,
            vel: Vec2::ZERO,
            color: 0xffffff,
            lifetime,
            size: 2.0,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }

    #[test]
    fn test_cap_drops_excess_silently() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ps = ParticleSystem::new(500);
        let params = ExplosionParams {
            count: 1000,
            ..Default::default()
        };
        ps.create_explosion(Vec2::ZERO, &params, &mut rng);
        assert_eq!(ps.len(), 500);
        assert!(!ps.add_particle(init_at(Vec2::ZERO, 1.0), |_| {}));
    }

    #[test]
    fn test_expired_particles_removed_same_update() {
        let mut ps = ParticleSystem::new(10);
        ps.add_particle(init_at(Vec2::ZERO, 0.05), |_| {});
        ps.add_particle(init_at(Vec2::ZERO, 1.0), |_| {});
        ps.update(0.1);
        assert_eq!(ps.len(), 1);
        // Freed slot is reusable
        for _ in 0..9 {
            assert!(ps.add_particle(init_at(Vec2::ZERO, 1.0), |_| {}));
        }
        assert_eq!(ps.len(), 10);
    }

    #[test]
    fn test_friction_and_gravity() {
        let mut ps = ParticleSystem::new(4);
        let init = ParticleInit {
            vel: Vec2::new(100.0, 0.0),
            ..init_at(Vec2::ZERO, 5.0)
        };
        ps.add_particle(init, |p| {
            p.friction = 0.5;
            p.gravity = 10.0;
        });
        ps.update(1.0);
        let p = ps.iter().next().unwrap();
        assert!((p.vel.x - 50.0).abs() < 1e-4);
        assert!((p.vel.y - 10.0).abs() < 1e-4);
        assert!((p.pos.x - 50.0).abs() < 1e-4);
        assert!((p.lifetime - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_fade_out_all_completes_before_removal() {
        let mut ps = ParticleSystem::new(4);
        ps.add_particle(init_at(Vec2::ZERO, 1.0), |p| p.fade_out = false);
        ps.update(0.95);
        ps.fade_out_all(0.2);

        let p = ps.iter().next().unwrap();
        // Lifetime stretched to cover the fade, physics age untouched
        assert!((p.lifetime - 0.2).abs() < 1e-4);
        assert!((p.alpha() - 1.0).abs() < 1e-4);

        ps.update(0.1);
        let mid = ps.iter().next().unwrap().alpha();
        assert!((mid - 0.5).abs() < 1e-3);

        ps.update(0.11);
        assert!(ps.is_empty());
    }

    #[test]
    fn test_fade_out_all_is_not_restarted() {
        let mut ps = ParticleSystem::new(4);
        ps.add_particle(init_at(Vec2::ZERO, 2.0), |_| {});
        ps.fade_out_all(0.5);
        ps.update(0.25);
        ps.fade_out_all(0.5);
        let fade = ps.iter().next().unwrap().fade.unwrap();
        assert!((fade.elapsed - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_petals_sway_around_drifting_base() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ps = ParticleSystem::new(8);
        ps.create_petals(800.0, 600.0, &PetalParams::default(), &mut rng);
        assert_eq!(ps.len(), 2);

        for _ in 0..30 {
            ps.update(1.0 / 60.0);
        }
        for p in ps.iter() {
            let sway = p.sway.unwrap();
            assert!((p.pos.x - sway.base_x).abs() <= sway.amplitude + 1e-3);
            assert!(p.pos.y > -20.0);
        }
    }

    #[test]
    fn test_celebration_shapes() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ps = ParticleSystem::new(500);
        ps.create_level_up_celebration(800.0, 600.0, 80, &mut rng);
        assert_eq!(ps.len(), 120);
        assert!(ps.iter().all(|p| p.shape != ParticleShape::Square));
    }

    proptest! {
        #[test]
        fn population_never_exceeds_cap(cap in 1usize..300, burst in 0usize..1200, seed: u64) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut ps = ParticleSystem::new(cap);
            let params = ExplosionParams { count: burst, ..Default::default() };
            ps.create_explosion(Vec2::ZERO, &params, &mut rng);
            ps.create_spark(Vec2::ZERO, &SparkParams::default(), &mut rng);
            prop_assert!(ps.len() <= cap);
            prop_assert_eq!(ps.len(), (burst + 5).min(cap));
        }
    }
}
