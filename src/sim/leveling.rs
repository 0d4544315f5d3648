//! Experience, levels and level-up upgrade offers

use rand::Rng;
use rand::seq::IndexedRandom;

use super::upgrades::{UpgradeChoice, catalog};
use crate::error::{GameError, Result};

/// Highest reachable level
pub const MAX_LEVEL: u32 = 100;
/// Experience needed to go from level 1 to 2
pub const BASE_LEVEL_EXP: u64 = 100;
/// Cards offered per level-up
pub const CHOICES_PER_LEVEL: usize = 3;

#[derive(Debug, Clone)]
pub struct LevelingSystem {
    experience: u64,
    level: u32,
    offered: Vec<UpgradeChoice>,
    /// Threshold to reach level `i + 2`
    exp_table: Vec<u64>,
}

impl Default for LevelingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelingSystem {
    pub fn new() -> Self {
        Self {
            experience: 0,
            level: 1,
            offered: Vec::new(),
            exp_table: Self::exp_table(),
        }
    }

    /// Each threshold is floor(previous × 1.4), starting at 100
    fn exp_table() -> Vec<u64> {
        let mut table = Vec::with_capacity(MAX_LEVEL as usize);
        let mut exp = BASE_LEVEL_EXP;
        for _ in 0..MAX_LEVEL {
            table.push(exp);
            exp = exp * 7 / 5;
        }
        table
    }

    /// Total experience needed to be at `level`
    pub fn required_exp_for_level(&self, level: u32) -> u64 {
        if level <= 1 {
            return 0;
        }
        let idx = (level - 2) as usize;
        self.exp_table
            .get(idx)
            .or_else(|| self.exp_table.last())
            .copied()
            .unwrap_or(0)
    }

    /// Add experience; returns true when this call crossed a level threshold.
    /// At most one level is gained per call.
    pub fn add_experience(&mut self, amount: u64, rng: &mut impl Rng) -> bool {
        self.experience += amount;
        self.check_level_up(rng)
    }

    fn check_level_up(&mut self, rng: &mut impl Rng) -> bool {
        if self.level >= MAX_LEVEL {
            return false;
        }
        if self.experience >= self.required_exp_for_level(self.level + 1) {
            self.level += 1;
            self.generate_choices(rng);
            log::info!("Level up! Now level {}", self.level);
            return true;
        }
        false
    }

    /// Sample three distinct catalog entries
    fn generate_choices(&mut self, rng: &mut impl Rng) {
        let all = catalog();
        self.offered = all
            .choose_multiple(rng, CHOICES_PER_LEVEL)
            .cloned()
            .collect();
    }

    /// Take the offered card at `index`, clearing the offer
    pub fn select_upgrade(&mut self, index: usize) -> Result<UpgradeChoice> {
        if index >= self.offered.len() {
            return Err(GameError::InvalidSelection {
                index,
                offered: self.offered.len(),
            });
        }
        let choice = self.offered.swap_remove(index);
        self.offered.clear();
        Ok(choice)
    }

    /// Progress toward the next level in [0, 1]
    pub fn level_progress(&self) -> f32 {
        let current = self.required_exp_for_level(self.level);
        let next = self.required_exp_for_level(self.level + 1);
        if next <= current {
            return 1.0;
        }
        let progress = self.experience.saturating_sub(current) as f32 / (next - current) as f32;
        progress.min(1.0)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn offered(&self) -> &[UpgradeChoice] {
        &self.offered
    }

    pub fn has_offer(&self) -> bool {
        !self.offered.is_empty()
    }

    pub fn reset(&mut self) {
        self.experience = 0;
        self.level = 1;
        self.offered.clear();
    }
}
