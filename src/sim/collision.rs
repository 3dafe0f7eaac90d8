//! Collision queries for axis-aligned sprites
//!
//! Everything here is a pure query: "do these two boxes overlap?" and
//! "did this body land on that surface during this step?". Responses
//! (bouncing, grounding) are applied by the engine.

use glam::Vec2;

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Horizontal spans intersect
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }
}

/// Result of a landing check
#[derive(Debug, Clone)]
pub struct LandingResult {
    /// Whether the body came to rest on the surface this step
    pub hit: bool,
    /// Y the body's center must be moved to so it sits on the surface
    pub resting_y: f32,
}

impl LandingResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            resting_y: 0.0,
        }
    }
}

/// Check whether a falling body crossed the top of `surface` between
/// `prev_bottom` and its current position.
///
/// Only downward motion lands; bodies rising through a platform pass
/// through it (one-way surfaces, as arcade platforms behave).
pub fn land_on_top(body: &Aabb, prev_bottom: f32, vel_y: f32, surface: &Aabb) -> LandingResult {
    if vel_y < 0.0 || !body.overlaps_x(surface) {
        return LandingResult::miss();
    }

    let top = surface.min.y;
    if prev_bottom <= top && body.max.y >= top {
        return LandingResult {
            hit: true,
            resting_y: top - body.height() / 2.0,
        };
    }

    LandingResult::miss()
}

/// Reflect vertical speed off a surface, keeping `bounce` of it.
/// Returns zero once the rebound is too small to be visible.
pub fn bounce_velocity(vel_y: f32, bounce: f32, rest_threshold: f32) -> f32 {
    let rebound = -vel_y * bounce;
    if rebound.abs() < rest_threshold { 0.0 } else { rebound }
}
