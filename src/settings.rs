//! Game settings and preferences
//!
//! Stored as JSON next to the save file. Missing or malformed files fall back
//! to defaults; missing keys take their default values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::consts::ARENA_RADIUS;
use crate::error::{GameError, Result};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Confetti pieces in the level-up celebration
    pub fn celebration_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 120,
            QualityPreset::High => 200,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            _ => Err(GameError::Persistence(format!("unknown quality preset `{s}`"))),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (explosions, sparks, confetti)
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no celebration confetti or petals)
    pub reduced_motion: bool,

    // === Simulation ===
    /// Fixed RNG seed; a fresh seed per run when unset
    pub seed: Option<u64>,
    /// Arena boundary radius for the player and bullets
    pub arena_radius: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            reduced_motion: false,
            seed: None,
            arena_radius: ARENA_RADIUS,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Default::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective celebration size (respects reduced_motion)
    pub fn celebration_particles(&self) -> usize {
        if self.reduced_motion {
            0
        } else {
            self.quality.celebration_particles()
        }
    }

    /// Volume a sound effect should play at
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Volume background music should play at
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings in {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| GameError::Persistence(e.to_string()))?;
        std::fs::write(path.as_ref(), json).map_err(|e| GameError::Persistence(e.to_string()))?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_caps() {
        assert_eq!(Settings::default().max_particles(), 500);
        assert_eq!(Settings::from_preset(QualityPreset::High).max_particles(), 2000);
        let off = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(off.max_particles(), 0);
        assert_eq!("LOW".parse::<QualityPreset>(), Ok(QualityPreset::Low));
    }

    #[test]
    fn test_effective_volumes() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.8,
            music_volume: 0.4,
            ..Default::default()
        };
        assert!((settings.effective_sfx_volume() - 0.4).abs() < 1e-6);
        assert!((settings.effective_music_volume() - 0.2).abs() < 1e-6);

        let muted = Settings {
            muted: true,
            ..settings
        };
        assert_eq!(muted.effective_sfx_volume(), 0.0);
        assert_eq!(muted.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"High","seed":42}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.arena_radius, ARENA_RADIUS);
        assert!(settings.particles);
    }

    #[test]
    fn test_load_missing_or_malformed_falls_back() {
        let dir = std::env::temp_dir().join(format!("space-survivor-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        assert_eq!(Settings::load(dir.join("absent.json")), Settings::default());

        let bad = dir.join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(Settings::load(&bad), Settings::default());

        let good = dir.join("good.json");
        let custom = Settings {
            muted: true,
            seed: Some(7),
            ..Default::default()
        };
        custom.save(&good).unwrap();
        assert_eq!(Settings::load(&good), custom);
        assert_eq!(custom.effective_sfx_volume(), 0.0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
