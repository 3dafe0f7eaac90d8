//! Game configuration and difficulty presets
//!
//! Stored as JSON (LocalStorage on web, a file on native). Every field has a
//! default so partial documents load.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Configuration rejected during load or validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("{low} ({low_value}) must not exceed {high} ({high_value})")]
    InvertedRange {
        low: &'static str,
        high: &'static str,
        low_value: f32,
        high_value: f32,
    },
}

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Casual,
    #[default]
    Standard,
    Gauntlet,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Casual => "Casual",
            Difficulty::Standard => "Standard",
            Difficulty::Gauntlet => "Gauntlet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(Difficulty::Casual),
            "standard" | "normal" => Some(Difficulty::Standard),
            "gauntlet" | "hard" => Some(Difficulty::Gauntlet),
            _ => None,
        }
    }

    /// Chance that a generated platform carries an obstacle
    pub fn obstacle_chance(&self) -> f64 {
        match self {
            Difficulty::Casual => 0.25,
            Difficulty::Standard => 0.5,
            Difficulty::Gauntlet => 1.0,
        }
    }

    /// Widest gap between consecutive platforms
    pub fn max_gap(&self) -> f32 {
        match self {
            Difficulty::Casual => 300.0,
            Difficulty::Standard => 400.0,
            Difficulty::Gauntlet => 450.0,
        }
    }
}

/// Visible area of the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

/// Procedural platform/obstacle/key placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Generate while the frontier is closer than this to the camera's right edge
    pub lookahead: f32,
    /// Horizontal gap between consecutive platforms
    pub min_gap: f32,
    pub max_gap: f32,
    /// Vertical band for platform centers, as fractions of viewport height
    pub band_top: f32,
    pub band_bottom: f32,
    /// Horizontal scale range for generated platforms
    pub min_scale: f32,
    pub max_scale: f32,
    pub obstacle_chance: f64,
    pub key_chance: f64,
    /// Key height above the obstacle slot
    pub key_lift: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            lookahead: 600.0,
            min_gap: 200.0,
            max_gap: 400.0,
            band_top: 0.35,
            band_bottom: 0.85,
            min_scale: 0.5,
            max_scale: 1.0,
            obstacle_chance: 0.5,
            key_chance: 0.5,
            key_lift: 64.0,
        }
    }
}

impl GenerationConfig {
    /// Platform center band in world units for a given viewport height
    pub fn band(&self, viewport_height: f32) -> (f32, f32) {
        (self.band_top * viewport_height, self.band_bottom * viewport_height)
    }
}

/// Removal behind the camera
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CullConfig {
    /// Distance behind the camera's left edge before entities are dropped
    pub margin: f32,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self { margin: 400.0 }
    }
}

/// Parameters for the reference arcade integrator and player control
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity (pixels/s², y grows downward)
    pub gravity: f32,
    /// Extra gravity applied to the player only
    pub player_gravity: f32,
    pub player_bounce: f32,
    pub run_speed: f32,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 1000.0,
            player_gravity: 300.0,
            player_bounce: 0.2,
            run_speed: 160.0,
            jump_velocity: -500.0,
        }
    }
}

/// What the continue action does when an info panel is dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContinueAction {
    /// Return to the running level
    #[default]
    Resume,
    /// Rebuild the session from scratch
    Restart,
}

/// Scoring and info panel rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub key_value: u64,
    /// Show the résumé entry for every collected key
    pub info_on_each_key: bool,
    /// Show the completion panel once no active keys remain
    pub info_when_all_collected: bool,
    pub continue_action: ContinueAction,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            key_value: KEY_SCORE,
            info_on_each_key: false,
            info_when_all_collected: true,
            continue_action: ContinueAction::Resume,
        }
    }
}

/// Timer-driven spawns
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Drop a key from above the right edge every N ticks
    pub key_drop_every_ticks: Option<u32>,
}

/// A platform placed before generation starts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StarterPlatform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// Hand-placed opening layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarterLayout {
    pub platforms: Vec<StarterPlatform>,
    /// Row of keys dropped from the top at spawn
    pub key_count: u32,
    pub key_start_x: f32,
    pub key_step_x: f32,
    pub key_y: f32,
    pub player_x: f32,
    pub player_y: f32,
}

impl Default for StarterLayout {
    fn default() -> Self {
        let platform = |x, y, scale| StarterPlatform { x, y, scale };
        Self {
            platforms: vec![
                platform(400.0, 568.0, 2.0),
                platform(600.0, 400.0, 1.0),
                platform(50.0, 250.0, 1.0),
                platform(750.0, 220.0, 1.0),
            ],
            key_count: 12,
            key_start_x: 12.0,
            key_step_x: 70.0,
            key_y: 0.0,
            player_x: 100.0,
            player_y: 450.0,
        }
    }
}

/// Complete tunable set for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub viewport: Viewport,
    pub generation: GenerationConfig,
    pub cull: CullConfig,
    pub physics: PhysicsConfig,
    pub scoring: ScoringConfig,
    pub timers: TimerConfig,
    pub starter: StarterLayout,
}

impl GameConfig {
    /// Create a config from a difficulty preset (applies preset values)
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut config = Self::default();
        config.apply_preset(difficulty);
        config
    }

    /// Apply a difficulty preset (updates difficulty-dependent values)
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.generation.obstacle_chance = difficulty.obstacle_chance();
        self.generation.max_gap = difficulty.max_gap();
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the generator or integrator cannot sample from
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generation;

        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        positive("generation.min_gap", g.min_gap)?;
        positive("generation.min_scale", g.min_scale)?;
        ordered("generation.min_gap", "generation.max_gap", g.min_gap, g.max_gap)?;
        ordered("generation.band_top", "generation.band_bottom", g.band_top, g.band_bottom)?;
        ordered("generation.min_scale", "generation.max_scale", g.min_scale, g.max_scale)?;
        non_negative("generation.lookahead", g.lookahead)?;
        non_negative("cull.margin", self.cull.margin)?;
        probability("generation.obstacle_chance", g.obstacle_chance)?;
        probability("generation.key_chance", g.key_chance)?;

        if !(0.0..=1.0).contains(&g.band_top) || !(0.0..=1.0).contains(&g.band_bottom) {
            return Err(ConfigError::OutOfRange {
                field: "generation.band",
                expected: "within [0, 1] of viewport height",
                value: if (0.0..=1.0).contains(&g.band_top) { g.band_bottom } else { g.band_top },
            });
        }
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "key_runner_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Stored config rejected, using defaults: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Load config from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected: "greater than zero", value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected: "zero or more", value })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "a probability in [0, 1]",
            value: value as f32,
        })
    }
}

fn ordered(low: &'static str, high: &'static str, low_value: f32, high_value: f32) -> Result<(), ConfigError> {
    if low_value <= high_value {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { low, high, low_value, high_value })
    }
}
