use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::state::Position;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TandemConfig {
    pub grid: GridConfig,
    pub navigation: ArousalConfig,
    pub social: ArousalConfig,
    pub integration: IntegrationStrategy,
}

impl TandemConfig {
    /// Read a TOML experiment file. Omitted sections and fields keep their
    /// defaults; `TANDEM_*` variables win over the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: TandemConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing or malformed file yields the
    /// default layout (still subject to `TANDEM_*` overrides).
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("No usable experiment config ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Grid-level knobs that sweeps vary from the shell. Unparseable values are
    /// skipped.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TANDEM_SEED") {
            if let Ok(n) = v.parse() {
                self.grid.seed = Some(n);
            }
        }
        if let Ok(v) = std::env::var("TANDEM_MAX_STEPS") {
            if let Ok(n) = v.parse() {
                self.grid.max_steps = n;
            }
        }
        if let Ok(v) = std::env::var("TANDEM_GRID_SIZE") {
            if let Ok(n) = v.parse() {
                self.grid.size = n;
            }
        }
        if let Ok(v) = std::env::var("TANDEM_MOOD_CHANGE_FREQUENCY") {
            if let Ok(n) = v.parse() {
                self.grid.mood_change_frequency = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Layout and episode limits for the social gridworld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side length of the square grid.
    pub size: u32,
    /// Fixed NPC location. Placed so that most shortest paths pass near it.
    pub npc_position: Position,
    /// Fixed goal location.
    pub goal_position: Position,
    /// Episodes between NPC mood draws.
    pub mood_change_frequency: u64,
    /// Steps per episode before timeout.
    pub max_steps: u32,
    /// Seed for the environment's random source. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 5,
            npc_position: Position::new(2, 2),
            goal_position: Position::new(4, 4),
            mood_change_frequency: 75,
            max_steps: 50,
            seed: None,
        }
    }
}

impl GridConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Tuning for one domain's arousal monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArousalConfig {
    /// Resting arousal level; also the value reported before any update.
    pub base_arousal: f32,
    /// Gain on |prediction error|.
    pub surprise_sensitivity: f32,
    /// Gain on |reward|.
    pub salience_sensitivity: f32,
    /// Raw arousal above this is damped (inverted-U).
    pub stress_threshold: f32,
    /// Gain on the elapsed fraction of the episode.
    pub time_pressure_factor: f32,
}

impl Default for ArousalConfig {
    fn default() -> Self {
        Self {
            base_arousal: 0.3,
            surprise_sensitivity: 0.5,
            salience_sensitivity: 0.3,
            stress_threshold: 0.8,
            time_pressure_factor: 0.2,
        }
    }
}

/// How two domain arousal values are turned into attention weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStrategy {
    /// Softmax over the two arousal values.
    Weighted { temperature: f32 },
    /// Winner-take-all with an equal-split dead zone.
    Gated { threshold: f32 },
}

impl Default for IntegrationStrategy {
    fn default() -> Self {
        IntegrationStrategy::Weighted { temperature: 1.0 }
    }
}

// ============================================================================
// Tests
// ============================================================================
