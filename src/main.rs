//! Space Survivor headless entry point
//!
//! Runs a seeded session driven by a scripted autopilot and logs what the
//! audio, notification and render collaborators would receive.
//!
//! Usage: `space-survivor [--seconds N] [--seed N] [--settings PATH] [--save PATH]`

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;

use space_survivor::consts::SIM_DT;
use space_survivor::persistence::{self, JsonFileStore, SaveStore};
use space_survivor::platform::{AudioSink, InputSource, Notifier, Renderer, dispatch, poll_input};
use space_survivor::sim::{EntityKind, GamePhase, GameState, SimEvent, Sound, tick};
use space_survivor::{Settings, normalize_angle, polar_to_cartesian};

/// Radius the autopilot circles at
const PATROL_RADIUS: f32 = 120.0;
/// Angular speed of the patrol (rad/s)
const PATROL_SPEED: f32 = 0.8;
/// Seconds between HUD lines
const HUD_INTERVAL: f32 = 5.0;

/// Headless Space Survivor session driven by an autopilot
#[derive(Debug, Parser)]
#[command(name = "space-survivor", version, about)]
struct Options {
    /// Simulated seconds to run before stopping
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,
    /// Settings file (JSON)
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
    /// Save data file (JSON)
    #[arg(long, default_value = "save.json")]
    save: PathBuf,
}

/// Scripted player: circles the arena, aims at the nearest enemy, always
/// fires and takes the first upgrade card
#[derive(Default)]
struct Autopilot {
    phase: Option<GamePhase>,
    player_pos: Vec2,
    target: Option<Vec2>,
    patrol_angle: f32,
}

impl Autopilot {
    fn observe(&mut self, state: &GameState) {
        self.phase = Some(state.phase);
        self.player_pos = state.player.body.pos;
        let pos = self.player_pos;
        self.target = state
            .entities
            .iter()
            .filter(|e| e.body.alive && e.body.kind == EntityKind::Enemy)
            .map(|e| e.body.pos)
            .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));
        self.patrol_angle = normalize_angle(self.patrol_angle + PATROL_SPEED * SIM_DT);
    }
}

impl InputSource for Autopilot {
    fn movement(&mut self) -> Vec2 {
        let waypoint = polar_to_cartesian(PATROL_RADIUS, self.patrol_angle);
        waypoint - self.player_pos
    }

    fn aim(&mut self) -> Option<Vec2> {
        self.target
    }

    fn primary_held(&mut self) -> bool {
        true
    }

    fn pause_pressed(&mut self) -> bool {
        false
    }

    fn confirm_pressed(&mut self) -> bool {
        self.phase == Some(GamePhase::Menu)
    }

    fn upgrade_key(&mut self) -> Option<usize> {
        (self.phase == Some(GamePhase::LevelUp)).then_some(0)
    }
}

/// Audio collaborator that counts shots and logs the other cues at their
/// effective volume
struct LogAudio {
    volume: f32,
    shots: u64,
}

impl LogAudio {
    fn new(settings: &Settings) -> Self {
        Self {
            volume: settings.effective_sfx_volume(),
            shots: 0,
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, sound: Sound) {
        if self.volume <= 0.0 {
            return;
        }
        match sound {
            Sound::Shoot => self.shots += 1,
            other => log::trace!("sound: {} @ {:.2}", other.as_str(), self.volume),
        }
    }
}

struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, text: &str, seconds: f32) {
        log::info!("[{seconds:.0}s] {text}");
    }
}

/// Text HUD, printed every few simulated seconds
#[derive(Default)]
struct HudLog {
    next_line: f32,
}

impl Renderer for HudLog {
    fn render(&mut self, state: &GameState) {
        if state.game_time < self.next_line {
            return;
        }
        self.next_line = state.game_time + HUD_INTERVAL;
        let wounded = state
            .entities
            .iter()
            .filter(|e| e.body.alive)
            .filter_map(|e| e.as_enemy())
            .filter(|enemy| enemy.health_fraction() < 1.0)
            .count();
        log::info!(
            "t={:>5.1}s wave {} lvl {} hp {}/{} score {} enemies {} ({} wounded) particles {} weapon {}",
            state.game_time,
            state.spawns.wave(),
            state.leveling.level(),
            state.player.health,
            state.player.max_health,
            state.score,
            state.live_enemies(),
            wounded,
            state.particles.len(),
            state.weapons.current().as_str(),
        );
    }
}

fn main() {
    env_logger::init();
    let opts = Options::parse();
    log::info!("Space Survivor (headless) starting...");

    let settings = Settings::load(&opts.settings);
    let seed = opts.seed.or(settings.seed).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    log::info!(
        "Audio: sfx {:.2}, music {:.2}",
        settings.effective_sfx_volume(),
        settings.effective_music_volume()
    );

    let mut state = GameState::with_settings(seed, &settings);
    let mut store = JsonFileStore::new(&opts.save);
    let best = store.load().high_score;

    let mut pilot = Autopilot::default();
    let mut audio = LogAudio::new(&settings);
    let mut notifier = LogNotifier;
    let mut hud = HudLog::default();

    let max_ticks = (opts.seconds / SIM_DT).ceil() as u64;
    let mut recorded = false;
    for _ in 0..max_ticks {
        pilot.observe(&state);
        let input = poll_input(&mut pilot);
        tick(&mut state, &input, SIM_DT);

        let events = state.take_events();
        recorded |= events
            .iter()
            .any(|e| matches!(e, SimEvent::GameOver(_)));
        dispatch(events, &mut audio, &mut notifier, &mut store);
        hud.render(&state);

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    // Time limit reached mid-run: still fold the run into the save
    let summary = state.run_summary();
    if !recorded && persistence::record_run(&mut store, &summary) {
        audio.play(Sound::HighScore);
    }

    println!("Seed:        {seed}");
    println!("Score:       {} (previous best {best})", summary.score);
    println!("Wave:        {}", summary.wave);
    println!("Level:       {}", summary.level);
    println!("Kills:       {}", summary.enemies_killed);
    println!("Power-ups:   {}", summary.power_ups_collected);
    println!("Shots fired: {}", audio.shots);
    println!("Play time:   {:.1}s", summary.play_time);
    println!("Upgrades:    {}", state.upgrades.summary());
}
