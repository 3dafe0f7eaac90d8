//! Removal of entities left behind the camera

use super::state::World;

/// How many entities one cull pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullReport {
    pub platforms: usize,
    pub obstacles: usize,
    pub keys: usize,
}

impl CullReport {
    pub fn total(&self) -> usize {
        self.platforms + self.obstacles + self.keys
    }
}

/// Cutoff x: anything left of it is unreachable
#[inline]
pub fn cutoff(camera_left: f32, margin: f32) -> f32 {
    camera_left - margin
}

/// Drop every platform, obstacle and key whose x is more than `margin`
/// behind `camera_left`. Running it twice in a row removes nothing the
/// second time.
pub fn cull(world: &mut World, camera_left: f32, margin: f32) -> CullReport {
    let limit = cutoff(camera_left, margin);

    let report = CullReport {
        platforms: retain_ahead(&mut world.platforms, limit, |p| p.pos.x),
        obstacles: retain_ahead(&mut world.obstacles, limit, |o| o.pos.x),
        keys: retain_ahead(&mut world.keys, limit, |k| k.pos.x),
    };

    if report.total() > 0 {
        log::debug!(
            "Culled behind x={:.0}: {} platforms, {} obstacles, {} keys",
            limit,
            report.platforms,
            report.obstacles,
            report.keys
        );
    }

    report
}

fn retain_ahead<T>(items: &mut Vec<T>, limit: f32, x_of: impl Fn(&T) -> f32) -> usize {
    let before = items.len();
    items.retain(|item| x_of(item) >= limit);
    before - items.len()
}
