//! Pairwise collision detection and resolution
//!
//! One O(n²) pass over the live set. The player is tested against every
//! entity, then every unordered entity pair is tested exactly once. List
//! membership is frozen for the whole pass: hits only flip `alive` flags, and
//! explosion area damage is queued and applied after the sweep.

use glam::Vec2;
use rand::Rng;

use super::entity::EntityKind;
use super::particles::{ExplosionParams, HitParams, ParticleSystem, PowerUpBurstParams};
use super::player::Player;
use super::state::{Entity, GamePhase, GameState, Role, SimEvent, Sound};
use super::upgrades::PermanentUpgrades;
use super::weapons::WeaponSystem;

/// Seconds a pickup notification stays on screen
pub const NOTIFY_SECS: f32 = 3.0;

/// What one collision pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Contacts that reached the player (enemy bodies and enemy shots)
    pub player_hits: u32,
    /// Bullet impacts on enemies
    pub bullet_hits: u32,
    /// Enemies killed by bullets or blasts
    pub kills: u32,
    pub pickups: u32,
    pub player_died: bool,
}

/// Explosion queued during the sweep
#[derive(Debug, Clone, Copy)]
struct Blast {
    pos: Vec2,
    radius: f32,
    damage: f32,
    /// Enemy that took the direct hit
    source: u32,
}

/// Borrowed subsystems a pair resolution may touch
struct Resolver<'a, R: Rng> {
    player: &'a mut Player,
    upgrades: &'a PermanentUpgrades,
    particles: &'a mut ParticleSystem,
    rng: &'a mut R,
    events: &'a mut Vec<SimEvent>,
    blasts: Vec<Blast>,
    report: CollisionReport,
}

/// Run the collision pass over `state` and apply every consequence
pub fn resolve_collisions(state: &mut GameState) -> CollisionReport {
    let GameState {
        player,
        entities,
        particles,
        weapons,
        upgrades,
        rng,
        events,
        power_ups_collected,
        ..
    } = state;

    let mut resolver = Resolver {
        player,
        upgrades,
        particles,
        rng,
        events,
        blasts: Vec::new(),
        report: CollisionReport::default(),
    };

    for entity in entities.iter_mut() {
        if resolver.player.body.collides_with(&entity.body) {
            resolver.player_contact(entity, weapons);
        }
    }
    *power_ups_collected += resolver.report.pickups;

    for i in 0..entities.len() {
        let (head, tail) = entities.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if !a.body.collides_with(&b.body) {
                continue;
            }
            match (a.body.kind, b.body.kind) {
                (EntityKind::Bullet, EntityKind::Enemy) => resolver.bullet_hit(a, b),
                (EntityKind::Enemy, EntityKind::Bullet) => resolver.bullet_hit(b, a),
                _ => {}
            }
        }
    }

    let blasts = std::mem::take(&mut resolver.blasts);
    for blast in blasts {
        resolver.detonate(&blast, entities);
    }

    let report = resolver.report;
    if report.player_died {
        state.phase = GamePhase::GameOver;
    }
    report
}

impl<R: Rng> Resolver<'_, R> {
    fn player_contact(&mut self, other: &mut Entity, weapons: &mut WeaponSystem) {
        match &mut other.role {
            Role::Enemy(enemy) => {
                self.damage_player(enemy.damage);
                other.body.destroy();
            }
            Role::Bullet(shot) if other.body.kind == EntityKind::EnemyBullet => {
                self.damage_player(shot.damage.ceil() as i32);
                other.body.destroy();
            }
            Role::PowerUp(power_up) => {
                if let Some(text) = power_up.apply_to(self.player, weapons) {
                    self.report.pickups += 1;
                    self.events.push(SimEvent::Notify {
                        text: text.to_string(),
                        seconds: NOTIFY_SECS,
                    });
                    self.events.push(SimEvent::Sound(Sound::PowerUp));
                    let burst = PowerUpBurstParams {
                        colors: vec![power_up.kind.color(), 0xffffff],
                        ..Default::default()
                    };
                    self.particles.create_power_up(other.body.pos, &burst, self.rng);
                }
                other.body.destroy();
            }
            // Player shots pass through the ship
            Role::Bullet(_) => {}
        }
    }

    fn damage_player(&mut self, amount: i32) {
        self.report.player_hits += 1;
        self.events.push(SimEvent::Sound(Sound::Hit));
        if self.player.take_damage(amount) {
            self.report.player_died = true;
        }
    }

    fn bullet_hit(&mut self, bullet: &mut Entity, target: &mut Entity) {
        let (Role::Bullet(shot), Role::Enemy(enemy)) = (&bullet.role, &mut target.role) else {
            return;
        };
        self.report.bullet_hits += 1;

        let killed = enemy.take_damage(&mut target.body, shot.damage);
        if !shot.piercing {
            bullet.body.destroy();
        }
        self.particles.create_hit(
            target.body.pos,
            bullet.body.rotation,
            &HitParams::default(),
            self.rng,
        );

        if let Some(payload) = shot.explosive {
            self.blasts.push(Blast {
                pos: target.body.pos,
                radius: payload.radius,
                damage: payload.damage,
                source: target.body.id,
            });
        }

        if killed {
            self.report.kills += 1;
            self.particles
                .create_explosion(target.body.pos, &ExplosionParams::default(), self.rng);
            self.upgrades.process_lifesteal(self.player, shot.damage);
        }
    }

    /// Damage every other live enemy inside the blast radius
    fn detonate(&mut self, blast: &Blast, entities: &mut [Entity]) {
        self.events.push(SimEvent::Sound(Sound::Explosion));
        let ring = ExplosionParams {
            count: 12,
            speed: blast.radius * 3.0,
            lifetime: 0.4,
            ..Default::default()
        };
        self.particles.create_explosion(blast.pos, &ring, self.rng);

        for entity in entities.iter_mut() {
            if entity.body.id == blast.source || !entity.body.alive {
                continue;
            }
            let Role::Enemy(enemy) = &mut entity.role else {
                continue;
            };
            if entity.body.pos.distance(blast.pos) > blast.radius {
                continue;
            }
            if enemy.take_damage(&mut entity.body, blast.damage) {
                self.report.kills += 1;
                self.particles
                    .create_explosion(entity.body.pos, &ExplosionParams::default(), self.rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::powerup::PowerUpKind;
    use crate::sim::upgrades::Explosive;
    use crate::sim::weapons::{BulletKind, BulletSpec};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing_state() -> GameState {
        let mut state = GameState::new(42);
        state.start_run();
        state
    }

    fn shot_at(pos: Vec2) -> BulletSpec {
        BulletSpec {
            kind: BulletKind::Normal,
            pos,
            angle: 0.0,
            speed: 0.0,
            damage: 1.0,
            piercing: false,
            pierce_count: 0,
            explosive: None,
        }
    }

    fn enemy(kind: EnemyKind, wave: u32) -> Enemy {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut e = Enemy::new(kind, &mut rng);
        e.scale_for_wave(wave);
        e
    }

    #[test]
    fn test_tank_takes_five_hits() {
        let mut state = playing_state();
        let target = Vec2::new(100.0, 0.0);
        state.spawn_enemy(enemy(EnemyKind::Tank, 1), target);
        for _ in 0..5 {
            state.spawn_bullet(&shot_at(target), EntityKind::Bullet);
        }

        let report = resolve_collisions(&mut state);
        assert_eq!(report.bullet_hits, 5);
        assert_eq!(report.kills, 1);
        assert!(!state.entities[0].body.alive);
        assert!(state.entities[1..].iter().all(|e| !e.body.alive));
    }

    #[test]
    fn test_tank_survives_four_hits() {
        let mut state = playing_state();
        let target = Vec2::new(100.0, 0.0);
        state.spawn_enemy(enemy(EnemyKind::Tank, 1), target);
        for _ in 0..4 {
            state.spawn_bullet(&shot_at(target), EntityKind::Bullet);
        }
        let report = resolve_collisions(&mut state);
        assert_eq!(report.kills, 0);
        assert!(state.entities[0].body.alive);
        let health = state.entities[0].as_enemy().map(|e| e.health);
        assert_eq!(health, Some(1.0));
    }

    #[test]
    fn test_piercing_shot_survives() {
        let mut state = playing_state();
        state.spawn_enemy(enemy(EnemyKind::Basic, 1), Vec2::new(100.0, 0.0));
        state.spawn_enemy(enemy(EnemyKind::Basic, 1), Vec2::new(104.0, 0.0));
        let spec = BulletSpec {
            piercing: true,
            ..shot_at(Vec2::new(102.0, 0.0))
        };
        state.spawn_bullet(&spec, EntityKind::Bullet);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.kills, 2);
        assert!(state.entities[2].body.alive);
    }

    #[test]
    fn test_player_contact_with_enemy() {
        let mut state = playing_state();
        state.spawn_enemy(enemy(EnemyKind::Tank, 1), Vec2::new(5.0, 0.0));
        let report = resolve_collisions(&mut state);
        assert_eq!(report.player_hits, 1);
        assert_eq!(state.player.health, 1);
        assert!(!state.entities[0].body.alive);
        assert!(state.take_events().contains(&SimEvent::Sound(Sound::Hit)));
    }

    #[test]
    fn test_enemy_shot_hurts_player_and_player_shot_does_not() {
        let mut state = playing_state();
        state.spawn_bullet(&shot_at(Vec2::new(3.0, 0.0)), EntityKind::Bullet);
        state.spawn_bullet(&shot_at(Vec2::new(-3.0, 0.0)), EntityKind::EnemyBullet);
        let report = resolve_collisions(&mut state);
        assert_eq!(report.player_hits, 1);
        assert_eq!(state.player.health, 2);
        assert!(state.entities[0].body.alive);
        assert!(!state.entities[1].body.alive);
    }

    #[test]
    fn test_lethal_contact_ends_run() {
        let mut state = playing_state();
        state.player.health = 1;
        state.spawn_enemy(enemy(EnemyKind::Basic, 1), Vec2::ZERO);
        let report = resolve_collisions(&mut state);
        assert!(report.player_died);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_pickup_applies_once() {
        let mut state = playing_state();
        state.spawn_power_up(PowerUpKind::WeaponSpread, Vec2::new(4.0, 0.0));
        let report = resolve_collisions(&mut state);
        assert_eq!(report.pickups, 1);
        assert_eq!(state.power_ups_collected, 1);
        assert_eq!(
            state.weapons.current(),
            crate::sim::weapons::WeaponKind::Spread
        );

        let events = state.take_events();
        assert!(events.contains(&SimEvent::Sound(Sound::PowerUp)));
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::Notify { text, .. } if text == "Spread weapon for 10 seconds"
        )));

        // Destroyed pickup is excluded from further passes
        let again = resolve_collisions(&mut state);
        assert_eq!(again.pickups, 0);
    }

    #[test]
    fn test_explosive_splash_damages_neighbors() {
        let mut state = playing_state();
        let hit = Vec2::new(100.0, 0.0);
        state.spawn_enemy(enemy(EnemyKind::Tank, 1), hit);
        state.spawn_enemy(enemy(EnemyKind::Basic, 1), Vec2::new(130.0, 0.0));
        state.spawn_enemy(enemy(EnemyKind::Basic, 1), Vec2::new(200.0, 0.0));
        let spec = BulletSpec {
            damage: 2.0,
            explosive: Some(Explosive {
                radius: 40.0,
                damage: 1.0,
            }),
            ..shot_at(hit)
        };
        state.spawn_bullet(&spec, EntityKind::Bullet);

        let report = resolve_collisions(&mut state);
        // Direct hit is not splashed a second time
        assert_eq!(state.entities[0].as_enemy().map(|e| e.health), Some(3.0));
        assert!(!state.entities[1].body.alive);
        assert!(state.entities[2].body.alive);
        assert_eq!(report.kills, 1);
    }

    #[test]
    fn test_hit_splash_sprays_back_toward_shooter() {
        let mut state = playing_state();
        let target = Vec2::new(100.0, 0.0);
        state.spawn_enemy(enemy(EnemyKind::Tank, 1), target);
        // Travelling along +x
        state.spawn_bullet(&shot_at(target), EntityKind::Bullet);

        let report = resolve_collisions(&mut state);
        assert_eq!(report.kills, 0);
        assert!(!state.particles.is_empty());
        assert!(state.particles.iter().all(|p| p.vel.x < 0.0));
    }

    #[test]
    fn test_lifesteal_on_kill() {
        let mut state = playing_state();
        state.upgrades.apply_named("lifesteal", 1.0).unwrap();
        state.player.health = 1;
        let target = Vec2::new(100.0, 0.0);
        state.spawn_enemy(enemy(EnemyKind::Basic, 1), target);
        state.spawn_bullet(&shot_at(target), EntityKind::Bullet);
        resolve_collisions(&mut state);
        assert_eq!(state.player.health, 2);
    }
}
