//! Key Runner - An endless-runner level core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, culling, scoring, session state)
//! - `config`: Data-driven tunables and difficulty presets
//! - `web`: wasm bindings driven by the host engine's frame loop

pub mod config;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, Difficulty, GameConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the host engine's arcade physics)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Default viewport (canvas size)
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Sprite sizes in world units (unscaled)
    pub const PLATFORM_WIDTH: f32 = 400.0;
    pub const PLATFORM_HEIGHT: f32 = 32.0;
    pub const OBSTACLE_SIZE: f32 = 32.0;
    pub const KEY_SIZE: f32 = 24.0;
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;

    /// Score awarded per collected key
    pub const KEY_SCORE: u64 = 10;

    /// Key bounce coefficient range (drawn per key)
    pub const KEY_BOUNCE_MIN: f32 = 0.4;
    pub const KEY_BOUNCE_MAX: f32 = 0.8;
}

/// Uniform draw that tolerates a degenerate range (`lo == hi`)
#[inline]
pub fn sample_range<R: rand::Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// Horizontal distance between two points
#[inline]
pub fn horizontal_gap(a: Vec2, b: Vec2) -> f32 {
    (b.x - a.x).abs()
}
