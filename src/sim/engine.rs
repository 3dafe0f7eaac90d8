//! Engine seam: physics integration and overlap queries
//!
//! The host engine owns physics. The core only needs it to move bodies and
//! to report which pairs overlap after the move. `ArcadeEngine` is a small
//! stand-in with the same arcade semantics, used for headless runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, bounce_velocity, land_on_top};
use super::state::{EntityId, Obstacle, Platform, World};
use crate::config::{GameConfig, PhysicsConfig};
use crate::consts::*;

/// Rebound speed below which bodies settle instead of bouncing
const REST_SPEED: f32 = 30.0;

/// Overlap notification, keyed by entity-pair kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlap {
    /// Player touched an obstacle
    PlayerObstacle(EntityId),
    /// Player touched a key
    PlayerKey(EntityId),
}

/// Physics collaborator driven once per tick
pub trait Engine {
    /// Advance positions/velocities by `dt` and refresh `grounded`
    fn integrate(&mut self, world: &mut World, dt: f32);

    /// Overlapping player pairs after integration, obstacles first
    fn overlaps(&self, world: &World) -> Vec<Overlap>;
}

/// Pure overlap query shared by engines that don't report contacts themselves
pub fn player_overlaps(world: &World) -> Vec<Overlap> {
    let player = world.player.bounds();
    let obstacles = world
        .obstacles
        .iter()
        .filter(|o| player.overlaps(&o.bounds()))
        .map(|o| Overlap::PlayerObstacle(o.id));
    let keys = world
        .keys
        .iter()
        .filter(|k| player.overlaps(&k.bounds()))
        .map(|k| Overlap::PlayerKey(k.id));
    obstacles.chain(keys).collect()
}

/// Minimal arcade integrator: gravity, one-way platform tops, a world floor
#[derive(Debug, Clone)]
pub struct ArcadeEngine {
    pub physics: PhysicsConfig,
    /// World bottom (y); bodies rest on it
    pub floor: f32,
}

impl ArcadeEngine {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            physics: config.physics,
            floor: config.viewport.height,
        }
    }

    fn integrate_player(&self, world: &mut World, dt: f32) {
        let platforms = &world.platforms;
        let player = &mut world.player;
        let half = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT) / 2.0;

        let prev_bottom = player.pos.y + half.y;
        player.vel.y += (self.physics.gravity + self.physics.player_gravity) * dt;
        player.pos += player.vel * dt;
        player.grounded = false;

        let surfaces = platforms.iter().map(Platform::bounds);
        if let Some(resting_y) = landing(surfaces, player.bounds(), prev_bottom, player.vel.y) {
            player.pos.y = resting_y;
            player.vel.y = bounce_velocity(player.vel.y, self.physics.player_bounce, REST_SPEED);
            player.grounded = true;
        }

        if player.pos.y + half.y >= self.floor {
            player.pos.y = self.floor - half.y;
            player.vel.y = bounce_velocity(player.vel.y.max(0.0), self.physics.player_bounce, REST_SPEED);
            player.grounded = true;
        }

        // Left world bound
        if player.pos.x < half.x {
            player.pos.x = half.x;
            player.vel.x = player.vel.x.max(0.0);
        }
    }

    /// Keys rest on platform and obstacle tops alike
    fn integrate_keys(&self, world: &mut World, dt: f32) {
        let (platforms, obstacles) = (&world.platforms, &world.obstacles);
        let half = KEY_SIZE / 2.0;

        for key in &mut world.keys {
            let prev_bottom = key.pos.y + half;
            key.vel.y += self.physics.gravity * dt;
            key.pos += key.vel * dt;

            let surfaces = platforms
                .iter()
                .map(Platform::bounds)
                .chain(obstacles.iter().map(Obstacle::bounds));
            if let Some(resting_y) = landing(surfaces, key.bounds(), prev_bottom, key.vel.y) {
                key.pos.y = resting_y;
                key.vel.y = bounce_velocity(key.vel.y, key.bounce, REST_SPEED);
            } else if key.pos.y + half >= self.floor {
                key.pos.y = self.floor - half;
                key.vel.y = bounce_velocity(key.vel.y.max(0.0), key.bounce, REST_SPEED);
            }
        }
    }
}

/// Highest surface top the body crossed this step, as a resting center y
fn landing(
    surfaces: impl Iterator<Item = Aabb>,
    body: Aabb,
    prev_bottom: f32,
    vel_y: f32,
) -> Option<f32> {
    surfaces
        .map(|surface| land_on_top(&body, prev_bottom, vel_y, &surface))
        .filter(|r| r.hit)
        .map(|r| r.resting_y)
        .reduce(f32::min)
}

impl Engine for ArcadeEngine {
    fn integrate(&mut self, world: &mut World, dt: f32) {
        self.integrate_player(world, dt);
        self.integrate_keys(world, dt);
    }

    fn overlaps(&self, world: &World) -> Vec<Overlap> {
        player_overlaps(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::generator::{Frontier, generate};
    use crate::sim::state::{Camera, Player};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world_with_player(pos: Vec2) -> World {
        World::new(
            Player::new(pos),
            Camera { scroll_x: 0.0, width: 800.0, height: 600.0 },
        )
    }

    #[test]
    fn test_player_lands_and_is_grounded() {
        let config = GameConfig::default();
        let mut engine = ArcadeEngine::new(&config);
        let mut world = world_with_player(Vec2::new(400.0, 300.0));
        // Platform top at 484
        world.spawn_platform(Vec2::new(400.0, 500.0), 1.0);

        for _ in 0..240 {
            engine.integrate(&mut world, SIM_DT);
        }

        assert!(world.player.grounded);
        assert!((world.player.pos.y - (484.0 - PLAYER_HEIGHT / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_player_rests_on_floor_without_platforms() {
        let config = GameConfig::default();
        let mut engine = ArcadeEngine::new(&config);
        let mut world = world_with_player(Vec2::new(400.0, 100.0));

        for _ in 0..240 {
            engine.integrate(&mut world, SIM_DT);
        }
        assert!(world.player.grounded);
        assert_eq!(world.player.pos.y, 600.0 - PLAYER_HEIGHT / 2.0);
    }

    #[test]
    fn test_key_bounces_on_platform() {
        let config = GameConfig::default();
        let mut engine = ArcadeEngine::new(&config);
        let mut world = world_with_player(Vec2::new(32.0, 576.0));
        world.spawn_platform(Vec2::new(400.0, 500.0), 1.0);
        world.spawn_key(Vec2::new(400.0, 100.0), 0.8);

        let mut bounced = false;
        for _ in 0..120 {
            engine.integrate(&mut world, SIM_DT);
            if world.keys[0].vel.y < 0.0 {
                bounced = true;
            }
        }
        assert!(bounced);
        // Never falls through the platform top (484)
        assert!(world.keys[0].pos.y <= 484.0 - KEY_SIZE / 2.0 + 1e-3);
    }

    #[test]
    fn test_guarded_key_rests_on_obstacle_top() {
        let mut config = GameConfig::default();
        config.generation.obstacle_chance = 1.0;
        config.generation.key_chance = 1.0;
        let mut engine = ArcadeEngine::new(&config);
        let mut world = world_with_player(Vec2::new(32.0, 576.0));
        let mut frontier = Frontier::new(0.0);
        let mut rng = Pcg32::seed_from_u64(9);

        let segment = generate(&mut world, &mut frontier, &config.generation, &mut rng).unwrap();
        assert!(segment.obstacle.is_some() && segment.key.is_some());

        for _ in 0..600 {
            engine.integrate(&mut world, SIM_DT);
        }

        let obstacle = world.obstacles[0].bounds();
        let key = world.keys[0].bounds();
        assert!(!key.overlaps(&obstacle), "key {:?} inside obstacle {:?}", key, obstacle);
        assert!((key.max.y - obstacle.min.y).abs() < 1e-3);
        assert!(key.overlaps_x(&obstacle));
    }

    #[test]
    fn test_overlaps_report_obstacles_first() {
        let mut world = world_with_player(Vec2::new(100.0, 100.0));
        let key = world.spawn_key(Vec2::new(100.0, 100.0), 0.5);
        let obstacle = world.spawn_obstacle(Vec2::new(110.0, 100.0));
        world.spawn_key(Vec2::new(500.0, 100.0), 0.5);

        assert_eq!(
            player_overlaps(&world),
            vec![Overlap::PlayerObstacle(obstacle), Overlap::PlayerKey(key)]
        );
    }
}
