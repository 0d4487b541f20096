//! Engine configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::GridSize;

/// Charges spent by one impulse
pub const IMPULSE_COST: u32 = 3;

/// Seconds the AI waits before acting
pub const AI_DELAY_SECS: f32 = 1.0;

/// Share of the board needed to win
pub const WIN_PERCENTAGE: u32 = 45;

/// Odds of the AI picking Attack over Speed when it can afford an impulse
pub const ATTACK_PROBABILITY: f64 = 0.5;

/// Tunable rules, fixed for the lifetime of a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub impulse_cost: u32,
    pub ai_delay_secs: f32,
    pub win_percentage: u32,
    pub attack_probability: f64,
    pub default_grid: GridSize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            impulse_cost: IMPULSE_COST,
            ai_delay_secs: AI_DELAY_SECS,
            win_percentage: WIN_PERCENTAGE,
            attack_probability: ATTACK_PROBABILITY,
            default_grid: GridSize::Medium,
        }
    }
}

impl EngineConfig {
    /// Check every field is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.impulse_cost == 0 {
            return Err(ConfigError::ZeroImpulseCost);
        }
        if !self.ai_delay_secs.is_finite() || self.ai_delay_secs < 0.0 {
            return Err(ConfigError::InvalidAiDelay(self.ai_delay_secs));
        }
        if !(1..=100).contains(&self.win_percentage) {
            return Err(ConfigError::InvalidWinPercentage(self.win_percentage));
        }
        if !(0.0..=1.0).contains(&self.attack_probability) {
            return Err(ConfigError::InvalidAttackProbability(self.attack_probability));
        }
        Ok(())
    }

    /// Cells a side must own to win: ceil(total * pct / 100)
    pub fn target_cells(&self, size: GridSize) -> usize {
        let total = size.total_cells();
        (total * self.win_percentage as usize).div_ceil(100)
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
