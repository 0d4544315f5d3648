//! Platform abstraction layer
//!
//! Collaborator interfaces the frame loop talks to: input is polled once per
//! tick, and queued simulation events fan out to audio, notifications and
//! persistence. Rendering gets read-only access to the session.

use glam::Vec2;

use crate::persistence::{self, SaveStore};
use crate::sim::{GameState, SimEvent, Sound, TickInput};

/// Polled input, sampled once per tick
pub trait InputSource {
    /// Movement vector (any length)
    fn movement(&mut self) -> Vec2;
    /// World-space aim point, if the device has one
    fn aim(&mut self) -> Option<Vec2>;
    /// Primary action held
    fn primary_held(&mut self) -> bool;
    fn pause_pressed(&mut self) -> bool;
    fn confirm_pressed(&mut self) -> bool;
    /// Upgrade card key (1-3) pressed this frame, as a 0-based index
    fn upgrade_key(&mut self) -> Option<usize>;
}

/// Fire-and-forget sound playback
pub trait AudioSink {
    fn play(&mut self, sound: Sound);
}

/// Transient on-screen text
pub trait Notifier {
    fn notify(&mut self, text: &str, seconds: f32);
}

/// Draws a frame; never mutates the simulation
pub trait Renderer {
    fn render(&mut self, state: &GameState);
}

/// Sample every input query into one tick's commands
pub fn poll_input(source: &mut impl InputSource) -> TickInput {
    TickInput {
        movement: source.movement(),
        aim: source.aim(),
        fire: source.primary_held(),
        pause: source.pause_pressed(),
        confirm: source.confirm_pressed(),
        upgrade_choice: source.upgrade_key(),
    }
}

/// Forward drained events to the collaborators.
///
/// A game-over summary is folded into the save store; a new high score plays
/// the `highscore` cue. Returns true when that happened.
pub fn dispatch(
    events: Vec<SimEvent>,
    audio: &mut impl AudioSink,
    notifier: &mut impl Notifier,
    store: &mut impl SaveStore,
) -> bool {
    let mut new_high = false;
    for event in events {
        match event {
            SimEvent::Sound(sound) => audio.play(sound),
            SimEvent::Notify { text, seconds } => notifier.notify(&text, seconds),
            SimEvent::LevelUp { level } => notifier.notify(&format!("Level {level}!"), 2.0),
            SimEvent::WaveStarted { wave } => log::debug!("Wave {wave} started"),
            SimEvent::GameOver(summary) => {
                if persistence::record_run(store, &summary) {
                    audio.play(Sound::HighScore);
                    notifier.notify("New high score!", 3.0);
                    new_high = true;
                }
            }
        }
    }
    new_high
}
