//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped frame delta, countdown timers instead of scheduled callbacks
//! - Seeded RNG owned by the session only
//! - Stable iteration order (entity insertion order)
//! - No rendering, audio or storage; outbound effects are queued as events

pub mod collision;
pub mod enemy;
pub mod entity;
pub mod leveling;
pub mod particles;
pub mod player;
pub mod pool;
pub mod powerup;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod weapons;

pub use collision::{CollisionReport, resolve_collisions};
pub use enemy::{Behavior, Enemy, EnemyKind};
pub use entity::{Body, EntityKind};
pub use leveling::LevelingSystem;
pub use particles::{Particle, ParticleShape, ParticleSystem};
pub use player::Player;
pub use pool::{Pool, PoolHandle, PoolStats, Poolable};
pub use powerup::{PowerUp, PowerUpKind};
pub use spawn::{SpawnSystem, enemies_in_wave};
pub use state::{Bullet, Entity, GamePhase, GameState, Role, RunSummary, SimEvent, Sound};
pub use tick::{TickInput, tick};
pub use upgrades::{PermanentUpgrades, UpgradeChoice, UpgradeKind};
pub use weapons::{BulletKind, BulletSpec, WeaponKind, WeaponSystem};
