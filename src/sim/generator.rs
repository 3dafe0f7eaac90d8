//! Procedural level generation ahead of the camera
//!
//! The level is a one-way scroll: each segment consumes random draws, so
//! earlier stretches are never re-derived. One call places at most one
//! platform plus an optional obstacle and key.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, Platform, World};
use crate::config::GenerationConfig;
use crate::consts::*;
use crate::sample_range;

/// X of the rightmost live platform, tracked as platforms spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frontier(f32);

impl Frontier {
    pub fn new(x: f32) -> Self {
        Self(x)
    }

    /// Seed from a set of platforms (max x; ties are interchangeable).
    /// An empty set starts the frontier at the origin.
    pub fn from_platforms(platforms: &[Platform]) -> Self {
        Self(platforms.iter().map(|p| p.pos.x).reduce(f32::max).unwrap_or(0.0))
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.0
    }

    fn advance(&mut self, x: f32) {
        debug_assert!(x >= self.0, "frontier moved backward: {} -> {}", self.0, x);
        self.0 = self.0.max(x);
    }
}

/// What a generation step placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub platform: EntityId,
    pub platform_pos: Vec2,
    pub obstacle: Option<EntityId>,
    pub key: Option<EntityId>,
}

/// Whether the frontier is close enough to the camera to need a new segment
#[inline]
pub fn needs_segment(frontier_x: f32, camera_right: f32, lookahead: f32) -> bool {
    frontier_x < camera_right + lookahead
}

/// Pick the next platform placement without touching the world
pub fn next_platform<R: Rng + ?Sized>(
    frontier_x: f32,
    viewport_height: f32,
    config: &GenerationConfig,
    rng: &mut R,
) -> (Vec2, f32) {
    let gap = sample_range(rng, config.min_gap, config.max_gap);
    let (y_min, y_max) = config.band(viewport_height);
    let y = sample_range(rng, y_min, y_max);
    let scale = sample_range(rng, config.min_scale, config.max_scale);
    (Vec2::new(frontier_x + gap, y), scale)
}

/// Generate one segment if the trigger condition holds.
///
/// Returns the placed segment, or `None` when the frontier is already far
/// enough ahead.
pub fn generate<R: Rng + ?Sized>(
    world: &mut World,
    frontier: &mut Frontier,
    config: &GenerationConfig,
    rng: &mut R,
) -> Option<Segment> {
    let camera = world.camera;
    if !needs_segment(frontier.x(), camera.right(), config.lookahead) {
        return None;
    }

    let (pos, scale) = next_platform(frontier.x(), camera.height, config, rng);
    let platform = world.spawn_platform(pos, scale);
    frontier.advance(pos.x);

    // Obstacle sits directly on the platform top
    let slot = Vec2::new(pos.x, pos.y - PLATFORM_HEIGHT / 2.0 - OBSTACLE_SIZE / 2.0);

    let obstacle = rng
        .random_bool(config.obstacle_chance)
        .then(|| world.spawn_obstacle(slot));

    // Key floats above the obstacle slot so it has to be cleared first
    let key = if rng.random_bool(config.key_chance) {
        let bounce = sample_range(rng, KEY_BOUNCE_MIN, KEY_BOUNCE_MAX);
        Some(world.spawn_key(Vec2::new(slot.x, slot.y - config.key_lift), bounce))
    } else {
        None
    };

    log::debug!(
        "Segment at ({:.0}, {:.0}) scale {:.2}: obstacle={} key={}",
        pos.x,
        pos.y,
        scale,
        obstacle.is_some(),
        key.is_some()
    );

    Some(Segment {
        platform,
        platform_pos: pos,
        obstacle,
        key,
    })
}
