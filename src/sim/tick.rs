//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session. Each playing tick runs, in
//! order: player, spawns, entity updates, dead-entity sweep, collisions,
//! weapon and particle timers. A level-up only cuts the sweep short.

use glam::Vec2;

use super::collision::{NOTIFY_SECS, resolve_collisions};
use super::entity::EntityKind;
use super::particles::{ExplosionParams, PetalParams, SparkParams, TrailParams};
use super::state::{GamePhase, GameState, Role, SimEvent, Sound};
use crate::consts::*;

/// Seconds between petal batches on the level-up screen
const PETAL_INTERVAL: f32 = 0.15;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement vector (any length; normalized by the player)
    pub movement: Vec2,
    /// World-space aim point; the ship's facing when absent
    pub aim: Option<Vec2>,
    /// Primary action held
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Menu confirm (start run, leave game over)
    pub confirm: bool,
    /// Upgrade card picked on the level-up screen (0-based)
    pub upgrade_choice: Option<usize>,
}

/// Advance the game state by one step of `dt` seconds (clamped to 0.1)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    state.time_ticks += 1;

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Menu => {
            if input.confirm {
                state.start_run();
            }
        }
        GamePhase::Paused => {}
        GamePhase::GameOver => {
            state.particles.update(dt);
            if input.confirm {
                state.phase = GamePhase::Menu;
            }
        }
        GamePhase::LevelUp => tick_level_up(state, input, dt),
        GamePhase::Playing => tick_playing(state, input, dt),
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    state.game_time += dt;

    state.player.update(input.movement, dt);
    state
        .player
        .body
        .constrain_to_area(Vec2::ZERO, state.arena_radius);
    if state.player.body.vel != Vec2::ZERO {
        state.particles.create_trail(
            state.player.body.pos,
            state.player.body.vel,
            &TrailParams::default(),
            &mut state.rng,
        );
    }
    fire_player_weapon(state, input, dt);

    let step = state.spawns.update(dt, &mut state.rng);
    if let Some(wave) = step.wave_started {
        state.push_event(SimEvent::WaveStarted { wave });
        state.push_event(SimEvent::Notify {
            text: format!("Wave {wave}"),
            seconds: NOTIFY_SECS,
        });
    }
    for spawned in step.enemies {
        state.spawn_enemy(spawned.enemy, spawned.pos);
    }

    advance_entities(state, dt);

    // A level-up cuts the sweep short; the rest of the frame still runs and
    // gameplay freezes from the next tick on
    if sweep_dead(state) {
        enter_level_up(state);
    }

    let report = resolve_collisions(state);
    if report.player_died {
        end_run(state);
    }

    state.weapons.update(dt);
    state.particles.update(dt);
}

fn fire_player_weapon(state: &mut GameState, input: &TickInput, dt: f32) {
    let weapon_rate = state.weapons.fire_rate();
    if !state.player.try_fire(dt, weapon_rate, input.fire) || !state.player.body.alive {
        return;
    }

    let origin = state.player.body.pos;
    let direction = input
        .aim
        .map(|target| {
            let d = target - origin;
            d.y.atan2(d.x)
        })
        .unwrap_or(state.player.body.rotation);

    let shots = state
        .weapons
        .fire(origin, direction, Some(&state.upgrades), &mut state.rng);
    for shot in &shots {
        state.spawn_bullet(shot, EntityKind::Bullet);
    }
    state.push_event(SimEvent::Sound(Sound::Shoot));
}

/// Advance every live non-player entity
fn advance_entities(state: &mut GameState, dt: f32) {
    let GameState {
        player,
        entities,
        particles,
        rng,
        arena_radius,
        ..
    } = state;
    let target = player.body.alive.then_some(&player.body);

    let mut enemy_shots = Vec::new();
    for entity in entities.iter_mut().filter(|e| e.body.alive) {
        match &mut entity.role {
            Role::Enemy(enemy) => {
                if let Some(shot) = enemy.update(&mut entity.body, dt, target, rng) {
                    particles.create_spark(shot.pos, &SparkParams::default(), rng);
                    enemy_shots.push(shot);
                }
            }
            Role::Bullet(bullet) => bullet.update(&mut entity.body, dt, *arena_radius),
            Role::PowerUp(power_up) => power_up.update(&mut entity.body, dt, target),
        }
    }

    for shot in &enemy_shots {
        state.spawn_bullet(shot, EntityKind::EnemyBullet);
    }
}

/// Remove dead entities, crediting enemy deaths.
///
/// Returns true when a kill leveled the player up. The sweep stops there: the
/// triggering enemy is removed without a drop roll, and any other dead
/// entities stay in the list (excluded from collisions) until the next
/// playing tick. Collisions and timers for the frame still run.
fn sweep_dead(state: &mut GameState) -> bool {
    let GameState {
        entities,
        leveling,
        spawns,
        particles,
        rng,
        events,
        score,
        enemies_killed,
        ..
    } = state;

    let mut leveled = false;
    let mut drops = Vec::new();
    entities.retain(|entity| {
        if leveled || entity.body.alive {
            return true;
        }
        let Role::Enemy(enemy) = &entity.role else {
            return false;
        };

        *score += enemy.score_value;
        *enemies_killed += 1;
        events.push(SimEvent::Sound(Sound::Explosion));
        particles.create_explosion(entity.body.pos, &ExplosionParams::default(), rng);

        if leveling.add_experience(enemy.exp_value, rng) {
            leveled = true;
            return false;
        }
        if let Some(kind) = spawns.try_spawn_power_up(rng) {
            drops.push((kind, entity.body.pos));
        }
        false
    });

    for (kind, pos) in drops {
        state.spawn_power_up(kind, pos);
    }
    leveled
}

fn enter_level_up(state: &mut GameState) {
    state.phase = GamePhase::LevelUp;
    let level = state.leveling.level();
    state.push_event(SimEvent::LevelUp { level });
    if state.celebration_particles > 0 {
        state.particles.create_level_up_celebration(
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            state.celebration_particles,
            &mut state.rng,
        );
    }
    state.petal_timer = 0.0;
}

fn tick_level_up(state: &mut GameState, input: &TickInput, dt: f32) {
    state.particles.update(dt);
    if state.celebration_particles > 0 {
        state.petal_timer -= dt;
        if state.petal_timer <= 0.0 {
            state.particles.create_petals(
                SCREEN_WIDTH,
                SCREEN_HEIGHT,
                &PetalParams::default(),
                &mut state.rng,
            );
            state.petal_timer = PETAL_INTERVAL;
        }
    }

    let Some(index) = input.upgrade_choice else {
        return;
    };
    let choice = match state.leveling.select_upgrade(index) {
        Ok(choice) => choice,
        Err(e) => {
            log::debug!("Ignored upgrade pick: {e}");
            return;
        }
    };
    if let Err(e) = state.upgrades.apply_upgrade(&choice) {
        log::warn!("{e}");
    }
    let stats = state.upgrades.player_stats(&state.player.base);
    state.player.apply_stats(&stats);
    state.particles.fade_out_all(LEVEL_UP_FADE_SECS);
    state.phase = GamePhase::Playing;

    log::info!("Picked {} ({})", choice.name, state.upgrades.summary());
    state.push_event(SimEvent::Notify {
        text: format!("{}: {}", choice.name, choice.description),
        seconds: NOTIFY_SECS,
    });
}

fn end_run(state: &mut GameState) {
    let summary = state.run_summary();
    log::info!(
        "Game over: score {} on wave {} (level {}, {} kills, {:.1}s)",
        summary.score,
        summary.wave,
        summary.level,
        summary.enemies_killed,
        summary.play_time
    );
    state.push_event(SimEvent::GameOver(summary));
}
