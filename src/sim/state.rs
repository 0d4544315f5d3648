//! Game state and core simulation types
//!
//! [`GameState`] is the explicit session context: it owns the RNG, every
//! subsystem and the live entity set. Nothing in the simulation reaches for
//! global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};
use super::entity::{Body, EntityKind};
use super::leveling::LevelingSystem;
use super::particles::ParticleSystem;
use super::player::Player;
use super::powerup::{PowerUp, PowerUpKind};
use super::spawn::SpawnSystem;
use super::upgrades::{Explosive, PermanentUpgrades};
use super::weapons::{BulletKind, BulletSpec, WeaponSystem};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for confirm
    Menu,
    /// Active gameplay
    Playing,
    Paused,
    /// Gameplay frozen while an upgrade card is chosen
    LevelUp,
    /// Run ended
    GameOver,
}

/// Sound cues for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    Shoot,
    Hit,
    Explosion,
    PowerUp,
    HighScore,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Shoot => "shoot",
            Sound::Hit => "hit",
            Sound::Explosion => "explosion",
            Sound::PowerUp => "powerup",
            Sound::HighScore => "highscore",
        }
    }
}

/// Totals of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub wave: u32,
    /// Seconds of gameplay
    pub play_time: f32,
    pub enemies_killed: u32,
    pub power_ups_collected: u32,
    pub level: u32,
}

/// Outbound notifications queued by the tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Sound(Sound),
    Notify { text: String, seconds: f32 },
    LevelUp { level: u32 },
    WaveStarted { wave: u32 },
    GameOver(RunSummary),
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub kind: BulletKind,
    pub damage: f32,
    pub piercing: bool,
    pub pierce_count: u32,
    pub explosive: Option<Explosive>,
    /// Seconds until expiry
    pub lifetime: f32,
}

impl Bullet {
    /// Integrate and expire on lifetime or when leaving the arena disk
    pub fn update(&mut self, body: &mut Body, dt: f32, arena_radius: f32) {
        body.update(dt);
        self.lifetime -= dt;
        if self.lifetime <= 0.0 || body.pos.length() > arena_radius {
            body.destroy();
        }
    }
}

/// Per-kind data of a non-player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Role {
    Enemy(Enemy),
    Bullet(Bullet),
    PowerUp(PowerUp),
}

/// A live non-player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub body: Body,
    pub role: Role,
}

impl Entity {
    pub fn as_enemy(&self) -> Option<&Enemy> {
        match &self.role {
            Role::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    /// Live non-player entities, in insertion (id) order
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub weapons: WeaponSystem,
    pub upgrades: PermanentUpgrades,
    pub leveling: LevelingSystem,
    pub spawns: SpawnSystem,
    pub score: u64,
    /// Seconds of gameplay this run
    pub game_time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub enemies_killed: u32,
    pub power_ups_collected: u32,
    pub arena_radius: f32,
    /// Confetti pieces on level-up
    pub celebration_particles: usize,
    /// Countdown to the next petal batch on the level-up screen
    pub petal_timer: f32,
    pub(crate) events: Vec<SimEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session in the menu with the given seed and default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, &Settings::default())
    }

    pub fn with_settings(seed: u64, settings: &Settings) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            player: Player::new(0, Vec2::ZERO),
            entities: Vec::new(),
            particles: ParticleSystem::new(settings.max_particles()),
            weapons: WeaponSystem::default(),
            upgrades: PermanentUpgrades::new(),
            leveling: LevelingSystem::new(),
            spawns: SpawnSystem::default(),
            score: 0,
            game_time: 0.0,
            time_ticks: 0,
            enemies_killed: 0,
            power_ups_collected: 0,
            arena_radius: settings.arena_radius,
            celebration_particles: settings.celebration_particles(),
            petal_timer: 0.0,
            events: Vec::new(),
            next_id: 1,
        };
        state.player = Player::new(state.next_entity_id(), Vec2::ZERO);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset every subsystem and begin a new run
    pub fn start_run(&mut self) {
        self.entities.clear();
        self.particles.clear();
        self.weapons.reset();
        self.upgrades.reset();
        self.leveling.reset();
        self.spawns.reset();
        self.score = 0;
        self.game_time = 0.0;
        self.enemies_killed = 0;
        self.power_ups_collected = 0;
        self.petal_timer = 0.0;
        let id = self.next_entity_id();
        self.player = Player::new(id, Vec2::ZERO);
        self.phase = GamePhase::Playing;
        log::info!("New run started (seed {})", self.seed);
    }

    pub fn spawn_enemy(&mut self, enemy: Enemy, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let spec = enemy.kind.spec();
        let body = Body::new(id, EntityKind::Enemy, pos, spec.radius).with_size(spec.width, spec.height);
        self.entities.push(Entity {
            body,
            role: Role::Enemy(enemy),
        });
        id
    }

    /// Spawn an enemy by variant id, scaled for the current wave.
    /// Unknown ids are logged and ignored.
    pub fn spawn_enemy_named(&mut self, name: &str, pos: Vec2) -> Option<u32> {
        let kind = match name.parse::<EnemyKind>() {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!("{e}");
                return None;
            }
        };
        let mut enemy = Enemy::new(kind, &mut self.rng);
        enemy.scale_for_wave(self.spawns.wave());
        Some(self.spawn_enemy(enemy, pos))
    }

    /// Insert a projectile; `kind` is `Bullet` for player shots, `EnemyBullet` otherwise
    pub fn spawn_bullet(&mut self, spec: &BulletSpec, kind: EntityKind) -> u32 {
        let id = self.next_entity_id();
        let (w, h) = spec.kind.size();
        let mut body = Body::new(id, kind, spec.pos, spec.kind.radius()).with_size(w, h);
        body.vel = crate::heading(spec.angle) * spec.speed;
        body.rotation = spec.angle;
        self.entities.push(Entity {
            body,
            role: Role::Bullet(Bullet {
                kind: spec.kind,
                damage: spec.damage,
                piercing: spec.piercing,
                pierce_count: spec.pierce_count,
                explosive: spec.explosive,
                lifetime: spec.kind.lifetime(),
            }),
        });
        id
    }

    pub fn spawn_power_up(&mut self, kind: PowerUpKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let body = Body::new(id, EntityKind::PowerUp, pos, POWERUP_RADIUS);
        self.entities.push(Entity {
            body,
            role: Role::PowerUp(PowerUp::new(kind)),
        });
        id
    }

    pub fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Drain queued events (frame loop)
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn live_enemies(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.body.alive && e.body.kind == EntityKind::Enemy)
            .count()
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.body.kind == kind).count()
    }

    pub fn run_summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            wave: self.spawns.wave(),
            play_time: self.game_time,
            enemies_killed: self.enemies_killed,
            power_ups_collected: self.power_ups_collected,
            level: self.leveling.level(),
        }
    }
}
