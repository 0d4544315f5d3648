//! Wave progression and enemy spawning
//!
//! Wave size is a pure function of the wave number. Composition is a weighted
//! draw over the variants unlocked by the current wave, shuffled once per wave
//! and dequeued on a cadence that tightens as waves go on.

use glam::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::VecDeque;

use super::enemy::{Enemy, EnemyKind};
use super::powerup::PowerUpKind;
use crate::consts::SPAWN_RING_RADIUS;

/// Rest between waves (seconds)
pub const BETWEEN_WAVE_DELAY: f32 = 5.0;
/// Fastest spawn cadence (seconds)
pub const MIN_SPAWN_DELAY: f32 = 0.3;
pub const BASE_DROP_CHANCE: f32 = 0.1;
pub const DROP_CHANCE_PER_WAVE: f32 = 0.02;
pub const MAX_DROP_CHANCE: f32 = 0.5;

/// Enemies in `wave`: floor(5 + 2w + w^1.5)
pub fn enemies_in_wave(wave: u32) -> u32 {
    let w = wave as f64;
    (5.0 + 2.0 * w + w.powf(1.5)).floor() as u32
}

/// Seconds between spawns in `wave`
pub fn spawn_delay(wave: u32) -> f32 {
    (2.0 - wave as f32 * 0.1).max(MIN_SPAWN_DELAY)
}

/// Power-up drop probability in `wave`
pub fn drop_chance(wave: u32) -> f32 {
    (BASE_DROP_CHANCE + wave as f32 * DROP_CHANCE_PER_WAVE).min(MAX_DROP_CHANCE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPhase {
    Spawning,
    BetweenWaves,
}

/// An enemy due to enter the arena
#[derive(Debug, Clone)]
pub struct SpawnedEnemy {
    pub enemy: Enemy,
    pub pos: Vec2,
}

/// Result of one spawn-system step
#[derive(Debug, Clone, Default)]
pub struct SpawnStep {
    pub enemies: Vec<SpawnedEnemy>,
    /// Set on the step a new wave begins
    pub wave_started: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SpawnSystem {
    wave: u32,
    enemies_spawned: u32,
    enemies_in_wave: u32,
    time_since_last_spawn: f32,
    phase: SpawnPhase,
    queue: VecDeque<EnemyKind>,
    center: Vec2,
    spawn_radius: f32,
}

impl Default for SpawnSystem {
    fn default() -> Self {
        Self::new(Vec2::ZERO, SPAWN_RING_RADIUS)
    }
}

impl SpawnSystem {
    pub fn new(center: Vec2, spawn_radius: f32) -> Self {
        Self {
            wave: 0,
            enemies_spawned: 0,
            enemies_in_wave: 0,
            time_since_last_spawn: 0.0,
            phase: SpawnPhase::Spawning,
            queue: VecDeque::new(),
            center,
            spawn_radius,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.center, self.spawn_radius);
    }

    /// Advance timers; returns enemies due this step.
    ///
    /// A fresh system has wave 0 with nothing queued, so the first step moves
    /// straight to the between-wave rest before wave 1.
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) -> SpawnStep {
        let mut step = SpawnStep::default();
        self.time_since_last_spawn += dt;

        if self.phase == SpawnPhase::BetweenWaves {
            if self.time_since_last_spawn >= BETWEEN_WAVE_DELAY {
                self.start_new_wave(rng);
                self.phase = SpawnPhase::Spawning;
                step.wave_started = Some(self.wave);
            }
            return step;
        }

        if self.enemies_spawned >= self.enemies_in_wave && self.queue.is_empty() {
            self.phase = SpawnPhase::BetweenWaves;
            self.time_since_last_spawn = 0.0;
            return step;
        }

        if self.time_since_last_spawn >= spawn_delay(self.wave)
            && self.enemies_spawned < self.enemies_in_wave
        {
            if let Some(spawned) = self.spawn_enemy(rng) {
                step.enemies.push(spawned);
            }
            self.time_since_last_spawn = 0.0;
        }
        step
    }

    fn start_new_wave(&mut self, rng: &mut impl Rng) {
        self.wave += 1;
        self.enemies_spawned = 0;
        self.enemies_in_wave = enemies_in_wave(self.wave);

        let unlocked: Vec<EnemyKind> = EnemyKind::ALL
            .into_iter()
            .filter(|k| k.spec().unlock_wave <= self.wave)
            .collect();

        let mut picks: Vec<EnemyKind> = (0..self.enemies_in_wave)
            .map(|_| {
                unlocked
                    .choose_weighted(rng, |k| k.spec().weight)
                    .copied()
                    .unwrap_or(EnemyKind::Basic)
            })
            .collect();
        picks.shuffle(rng);
        self.queue = picks.into();

        log::info!(
            "Wave {}: {} enemies, one every {:.2}s",
            self.wave,
            self.enemies_in_wave,
            spawn_delay(self.wave)
        );
    }

    fn spawn_enemy(&mut self, rng: &mut impl Rng) -> Option<SpawnedEnemy> {
        let kind = self.queue.pop_front()?;
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let pos = self.center + crate::polar_to_cartesian(self.spawn_radius, angle);

        let mut enemy = Enemy::new(kind, rng);
        enemy.scale_for_wave(self.wave);
        self.enemies_spawned += 1;
        log::trace!("Spawned {} at ({:.0}, {:.0})", kind.as_str(), pos.x, pos.y);

        Some(SpawnedEnemy { enemy, pos })
    }

    /// Roll the wave's drop chance; on success pick a uniformly random power-up
    pub fn try_spawn_power_up(&self, rng: &mut impl Rng) -> Option<PowerUpKind> {
        if rng.random::<f32>() >= drop_chance(self.wave) {
            return None;
        }
        PowerUpKind::ALL.choose(rng).copied()
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn phase(&self) -> SpawnPhase {
        self.phase
    }

    pub fn is_between_waves(&self) -> bool {
        self.phase == SpawnPhase::BetweenWaves
    }

    pub fn enemies_remaining(&self) -> u32 {
        self.enemies_in_wave.saturating_sub(self.enemies_spawned)
    }

    /// Jump to a specific wave (tests and debugging)
    pub fn set_wave(&mut self, wave: u32) {
        self.wave = wave;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wave_sizes() {
        assert_eq!(enemies_in_wave(1), 8);
        assert_eq!(enemies_in_wave(2), 11);
        assert_eq!(enemies_in_wave(4), 21);
        assert_eq!(enemies_in_wave(10), 56);
    }

    #[test]
    fn test_cadence_floor() {
        assert!((spawn_delay(1) - 1.9).abs() < 1e-6);
        assert_eq!(spawn_delay(17), MIN_SPAWN_DELAY);
        assert_eq!(spawn_delay(40), MIN_SPAWN_DELAY);
    }

    #[test]
    fn test_first_wave_after_rest() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut spawns = SpawnSystem::default();
        let dt = 0.1;

        // Rest, then wave 1 starts
        let mut started = None;
        for _ in 0..60 {
            let step = spawns.update(dt, &mut rng);
            assert!(step.enemies.is_empty());
            if step.wave_started.is_some() {
                started = step.wave_started;
                break;
            }
        }
        assert_eq!(started, Some(1));
        assert_eq!(spawns.enemies_remaining(), 8);

        // Wave 1 only has basic enemies, all on the spawn ring
        let mut total = 0;
        for _ in 0..300 {
            for spawned in spawns.update(dt, &mut rng).enemies {
                assert_eq!(spawned.enemy.kind, EnemyKind::Basic);
                assert!((spawned.pos.length() - SPAWN_RING_RADIUS).abs() < 1e-2);
                total += 1;
            }
            if spawns.is_between_waves() {
                break;
            }
        }
        assert_eq!(total, 8);
        assert!(spawns.is_between_waves());
        assert_eq!(spawns.wave(), 1);
    }

    #[test]
    fn test_composition_respects_unlocks() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut spawns = SpawnSystem::default();
        spawns.set_wave(2);
        spawns.start_new_wave(&mut rng);
        assert_eq!(spawns.wave(), 3);
        assert_eq!(spawns.queue.len(), enemies_in_wave(3) as usize);
        assert!(
            spawns
                .queue
                .iter()
                .all(|k| k.spec().unlock_wave <= 3)
        );
    }

    #[test]
    fn test_drop_rate_at_wave_ten() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut spawns = SpawnSystem::default();
        spawns.set_wave(10);
        assert!((drop_chance(10) - 0.3).abs() < 1e-6);

        let trials = 10_000;
        let drops = (0..trials)
            .filter(|_| spawns.try_spawn_power_up(&mut rng).is_some())
            .count();
        let rate = drops as f32 / trials as f32;
        assert!((rate - 0.3).abs() < 0.02, "rate {rate}");

        spawns.set_wave(100);
        assert_eq!(drop_chance(100), MAX_DROP_CHANCE);
    }

    #[test]
    fn test_reset() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut spawns = SpawnSystem::default();
        spawns.set_wave(4);
        spawns.start_new_wave(&mut rng);
        spawns.reset();
        assert_eq!(spawns.wave(), 0);
        assert_eq!(spawns.enemies_remaining(), 0);
        assert!(spawns.queue.is_empty());
    }

    proptest! {
        #[test]
        fn wave_size_is_deterministic(wave in 1u32..500) {
            let w = wave as f64;
            let expected = (5.0 + 2.0 * w + w * w.sqrt()).floor() as u32;
            prop_assert_eq!(enemies_in_wave(wave), expected);
            prop_assert_eq!(enemies_in_wave(wave), enemies_in_wave(wave));
            prop_assert!(enemies_in_wave(wave + 1) > enemies_in_wave(wave));
        }
    }
}
