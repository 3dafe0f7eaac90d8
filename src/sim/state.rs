//! Game state and core simulation types
//!
//! Everything a session mutates lives here: the entity collections, the player,
//! the camera, score and phase.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::generator::Frontier;
use crate::config::GameConfig;
use crate::consts::*;
use crate::sample_range;

/// Entity identity, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Why the info panel is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoPanel {
    /// Every active key has been collected
    AllKeysCollected,
    /// Résumé entry unlocked by the n-th key (1-based)
    ResumeEntry(u32),
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Simulation paused behind an info panel until Continue
    ShowingInfo(InfoPanel),
    /// Player hit an obstacle; only a restart leaves this phase
    GameOver,
}

impl GamePhase {
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Running)
    }
}

/// Static collidable surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: EntityId,
    pub pos: Vec2,
    /// Horizontal scale factor applied to the platform sprite
    pub scale: f32,
}

impl Platform {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(PLATFORM_WIDTH * self.scale, PLATFORM_HEIGHT))
    }

    /// Y coordinate of the walkable top surface
    pub fn top(&self) -> f32 {
        self.pos.y - PLATFORM_HEIGHT / 2.0
    }
}

/// Immovable hazard sitting on a platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub pos: Vec2,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(OBSTACLE_SIZE))
    }
}

/// Collectible that falls and bounces on platforms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fraction of vertical speed kept on a platform bounce
    pub bounce: f32,
}

impl Key {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(KEY_SIZE))
    }
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Standing on a supporting surface (gates jumping)
    pub grounded: bool,
    pub score: u64,
    pub keys_collected: u32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            grounded: false,
            score: 0,
            keys_collected: 0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }
}

/// Horizontal-scrolling camera
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub scroll_x: f32,
    pub width: f32,
    pub height: f32,
}

impl Camera {
    pub fn left(&self) -> f32 {
        self.scroll_x
    }

    pub fn right(&self) -> f32 {
        self.scroll_x + self.width
    }

    /// Center the camera on `x`, never scrolling left of the world origin
    pub fn follow(&mut self, x: f32) {
        self.scroll_x = (x - self.width / 2.0).max(0.0);
    }
}

/// Reference to a live entity of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Platform(EntityId),
    Obstacle(EntityId),
    Key(EntityId),
}

/// Live entity collections plus the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub obstacles: Vec<Obstacle>,
    pub keys: Vec<Key>,
    pub camera: Camera,
    /// Next entity ID
    next_id: u32,
}

impl World {
    pub fn new(player: Player, camera: Camera) -> Self {
        Self {
            player,
            platforms: Vec::new(),
            obstacles: Vec::new(),
            keys: Vec::new(),
            camera,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn_platform(&mut self, pos: Vec2, scale: f32) -> EntityId {
        let id = self.next_entity_id();
        self.platforms.push(Platform { id, pos, scale });
        id
    }

    pub fn spawn_obstacle(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle { id, pos });
        id
    }

    pub fn spawn_key(&mut self, pos: Vec2, bounce: f32) -> EntityId {
        let id = self.next_entity_id();
        self.keys.push(Key {
            id,
            pos,
            vel: Vec2::ZERO,
            bounce,
        });
        id
    }

    /// Remove an entity. Returns false (and does nothing) if it is already gone.
    pub fn remove(&mut self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Platform(id) => remove_by_id(&mut self.platforms, id, |p| p.id),
            EntityRef::Obstacle(id) => remove_by_id(&mut self.obstacles, id, |o| o.id),
            EntityRef::Key(id) => remove_by_id(&mut self.keys, id, |k| k.id),
        }
    }

    /// Active (uncollected, unculled) key count
    pub fn active_keys(&self) -> usize {
        self.keys.len()
    }

    /// Rightmost live platform x by full scan (the tracked frontier should match)
    pub fn rightmost_platform_x(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.pos.x).reduce(f32::max)
    }

    /// Collections stay in ID order: spawns append fresh IDs and removals
    /// preserve the order of what remains
    pub fn is_id_ordered(&self) -> bool {
        self.platforms.is_sorted_by_key(|p| p.id)
            && self.obstacles.is_sorted_by_key(|o| o.id)
            && self.keys.is_sorted_by_key(|k| k.id)
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: EntityId, id_of: impl Fn(&T) -> EntityId) -> bool {
    match items.iter().position(|item| id_of(item) == id) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

/// Notifications for the host (audio, HUD, dialogs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A key was picked up; `score` is the new total
    KeyCollected { id: EntityId, score: u64, remaining: usize },
    /// An info panel opened and the simulation paused
    InfoShown(InfoPanel),
    /// The info panel was dismissed and play resumed
    Resumed,
    /// Player hit an obstacle
    GameOver { obstacle: EntityId, score: u64 },
    /// A new session replaced the previous one
    Restarted { epoch: u64 },
    /// A platform segment was generated ahead of the camera
    SegmentSpawned { platform: EntityId, obstacle: Option<EntityId>, key: Option<EntityId> },
    /// A timer dropped a key from above
    KeyDropped { id: EntityId },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session counter; bumped on every restart
    pub epoch: u64,
    pub rng: Pcg32,
    pub config: GameConfig,
    pub phase: GamePhase,
    pub world: World,
    /// Rightmost platform x, maintained on every spawn
    pub frontier: Frontier,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Furthest x the player reached
    pub distance: f32,
    /// Events raised since the host last drained them
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh session from the starter layout
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_epoch(config, seed, 0)
    }

    pub(crate) fn with_epoch(config: GameConfig, seed: u64, epoch: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let starter = &config.starter;
        let camera = Camera {
            scroll_x: 0.0,
            width: config.viewport.width,
            height: config.viewport.height,
        };
        let mut world = World::new(Player::new(Vec2::new(starter.player_x, starter.player_y)), camera);

        for p in &starter.platforms {
            world.spawn_platform(Vec2::new(p.x, p.y), p.scale);
        }
        for i in 0..starter.key_count {
            let x = starter.key_start_x + i as f32 * starter.key_step_x;
            let bounce = sample_range(&mut rng, KEY_BOUNCE_MIN, KEY_BOUNCE_MAX);
            world.spawn_key(Vec2::new(x, starter.key_y), bounce);
        }

        let frontier = Frontier::from_platforms(&world.platforms);
        let distance = world.player.pos.x;

        Self {
            seed,
            epoch,
            rng,
            config,
            phase: GamePhase::Running,
            world,
            frontier,
            time_ticks: 0,
            distance,
            events: Vec::new(),
        }
    }

    /// Derive the seed for the session that replaces this one
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn score(&self) -> u64 {
        self.world.player.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_layout() {
        let state = GameState::new(GameConfig::default(), 7);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.world.platforms.len(), 4);
        assert_eq!(state.world.active_keys(), 12);
        assert_eq!(state.frontier.x(), 750.0);
        assert_eq!(state.world.keys[11].pos.x, 12.0 + 11.0 * 70.0);
        for key in &state.world.keys {
            assert!((KEY_BOUNCE_MIN..=KEY_BOUNCE_MAX).contains(&key.bounce));
        }
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut state = GameState::new(GameConfig::default(), 1);
        let id = state.world.spawn_obstacle(Vec2::new(10.0, 10.0));
        assert!(state.world.remove(EntityRef::Obstacle(id)));
        let next = state.world.spawn_obstacle(Vec2::new(10.0, 10.0));
        assert!(next > id);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut state = GameState::new(GameConfig::default(), 1);
        let id = state.world.keys[0].id;
        assert!(state.world.remove(EntityRef::Key(id)));
        assert!(!state.world.remove(EntityRef::Key(id)));
        assert_eq!(state.world.active_keys(), 11);
    }

    #[test]
    fn test_removals_keep_id_order() {
        let mut state = GameState::new(GameConfig::default(), 1);
        let world = &mut state.world;
        let middle = world.keys[5].id;
        world.remove(EntityRef::Key(middle));
        world.spawn_key(Vec2::new(900.0, 0.0), 0.5);
        world.keys.retain(|k| k.pos.x > 100.0);
        world.spawn_obstacle(Vec2::new(950.0, 300.0));
        assert!(world.is_id_ordered());

        world.keys.swap(0, 1);
        assert!(!world.is_id_ordered());
    }

    #[test]
    fn test_camera_follow_clamps_at_origin() {
        let mut camera = Camera { scroll_x: 0.0, width: 800.0, height: 600.0 };
        camera.follow(100.0);
        assert_eq!(camera.left(), 0.0);
        camera.follow(1500.0);
        assert_eq!(camera.left(), 1100.0);
        assert_eq!(camera.right(), 1900.0);
    }
}
