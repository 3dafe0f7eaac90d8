//! Per-tick game logic
//!
//! Order within a running tick: input, engine integration, camera follow,
//! overlap dispatch, generation (one segment at most), culling.

use glam::Vec2;

use super::cull::cull;
use super::engine::{Engine, Overlap};
use super::generator::generate;
use super::state::{EntityId, EntityRef, GameEvent, GamePhase, GameState, InfoPanel, Player};
use crate::config::PhysicsConfig;

/// Input intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move left (held)
    pub left: bool,
    /// Move right (held)
    pub right: bool,
    /// Jump (held: up arrow / space / W)
    pub jump: bool,
    /// Pointer/tap pressed this frame (jumps as well)
    pub tap: bool,
}

/// Translate input into player velocity commands
pub fn apply_input(player: &mut Player, physics: &PhysicsConfig, input: &TickInput) {
    player.vel.x = if input.left {
        -physics.run_speed
    } else if input.right {
        physics.run_speed
    } else {
        0.0
    };

    if (input.jump || input.tap) && player.grounded {
        player.vel.y = physics.jump_velocity;
        player.grounded = false;
    }
}

/// Advance the session by one tick. Outside `Running` nothing moves.
pub fn tick<E: Engine + ?Sized>(state: &mut GameState, engine: &mut E, input: &TickInput, dt: f32) {
    if !state.phase.is_running() {
        return;
    }

    state.time_ticks += 1;

    apply_input(&mut state.world.player, &state.config.physics, input);
    engine.integrate(&mut state.world, dt);

    let player_x = state.world.player.pos.x;
    state.world.camera.follow(player_x);
    state.distance = state.distance.max(player_x);

    for overlap in engine.overlaps(&state.world) {
        match overlap {
            Overlap::PlayerObstacle(id) => hit_obstacle(state, id),
            Overlap::PlayerKey(id) => {
                collect_key(state, id);
            }
        }
        if !state.phase.is_running() {
            break;
        }
    }

    if state.phase.is_running() {
        let GameState { world, frontier, config, rng, .. } = state;
        let platforms_before = world.platforms.len();
        let spawned = generate(world, frontier, &config.generation, rng);
        assert!(
            world.platforms.len() <= platforms_before + 1,
            "more than one segment generated in a tick"
        );
        if let Some(segment) = spawned {
            state.emit(GameEvent::SegmentSpawned {
                platform: segment.platform,
                obstacle: segment.obstacle,
                key: segment.key,
            });
        }
    }

    let camera_left = state.world.camera.left();
    cull(&mut state.world, camera_left, state.config.cull.margin);

    debug_assert!(state.world.is_id_ordered());
}

/// Collect a live key: remove it and award score.
///
/// Returns false if the key no longer exists (already collected or culled).
pub fn collect_key(state: &mut GameState, id: EntityId) -> bool {
    if !state.world.remove(EntityRef::Key(id)) {
        return false;
    }

    let scoring = state.config.scoring;
    let player = &mut state.world.player;
    player.score += scoring.key_value;
    player.keys_collected += 1;
    let (score, collected) = (player.score, player.keys_collected);
    let remaining = state.world.active_keys();

    log::debug!("Key {:?} collected: score={} remaining={}", id, score, remaining);
    state.emit(GameEvent::KeyCollected { id, score, remaining });

    if scoring.info_on_each_key {
        show_info(state, InfoPanel::ResumeEntry(collected));
    } else if scoring.info_when_all_collected && remaining == 0 {
        show_info(state, InfoPanel::AllKeysCollected);
    }
    true
}

/// Pause behind an info panel
pub fn show_info(state: &mut GameState, panel: InfoPanel) {
    if !state.phase.is_running() {
        return;
    }
    log::info!("Showing info panel: {:?}", panel);
    state.phase = GamePhase::ShowingInfo(panel);
    state.emit(GameEvent::InfoShown(panel));
}

/// Leave the info panel and continue the level
pub fn resume(state: &mut GameState) -> bool {
    if !matches!(state.phase, GamePhase::ShowingInfo(_)) {
        return false;
    }
    state.phase = GamePhase::Running;
    state.emit(GameEvent::Resumed);
    true
}

fn hit_obstacle(state: &mut GameState, obstacle: EntityId) {
    if !state.phase.is_running() {
        return;
    }
    let score = state.score();
    log::info!("Game over: hit obstacle {:?} with score {}", obstacle, score);
    state.phase = GamePhase::GameOver;
    state.world.player.vel = Vec2::ZERO;
    state.emit(GameEvent::GameOver { obstacle, score });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::{PLAYER_HEIGHT, SIM_DT};
    use crate::sim::engine::ArcadeEngine;
    use crate::sim::state::World;
    use proptest::prelude::*;

    /// Engine double: no movement, scripted overlaps
    #[derive(Default)]
    struct ScriptedEngine {
        overlaps: Vec<Overlap>,
    }

    impl Engine for ScriptedEngine {
        fn integrate(&mut self, _world: &mut World, _dt: f32) {}

        fn overlaps(&self, _world: &World) -> Vec<Overlap> {
            self.overlaps.clone()
        }
    }

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.scoring.info_when_all_collected = false;
        config
    }

    #[test]
    fn test_fifth_key_of_twelve() {
        let mut state = GameState::new(GameConfig::default(), 5);
        let keys: Vec<_> = state.world.keys.iter().map(|k| k.id).collect();
        assert_eq!(keys.len(), 12);

        for &id in &keys[..5] {
            assert!(collect_key(&mut state, id));
        }

        assert_eq!(state.score(), 50);
        assert_eq!(state.world.active_keys(), 7);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(!state.events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_collecting_twice_scores_once() {
        let mut state = GameState::new(GameConfig::default(), 5);
        let id = state.world.keys[0].id;
        assert!(collect_key(&mut state, id));
        assert!(!collect_key(&mut state, id));
        assert_eq!(state.score(), 10);
    }

    #[test]
    fn test_last_key_opens_completion_panel() {
        let mut state = GameState::new(GameConfig::default(), 5);
        let keys: Vec<_> = state.world.keys.iter().map(|k| k.id).collect();
        for id in keys {
            collect_key(&mut state, id);
        }
        assert_eq!(state.phase, GamePhase::ShowingInfo(InfoPanel::AllKeysCollected));
        assert!(state.events.contains(&GameEvent::InfoShown(InfoPanel::AllKeysCollected)));
    }

    #[test]
    fn test_resume_entry_per_key() {
        let mut config = GameConfig::default();
        config.scoring.info_on_each_key = true;
        let mut state = GameState::new(config, 5);

        let first = state.world.keys[0].id;
        collect_key(&mut state, first);
        assert_eq!(state.phase, GamePhase::ShowingInfo(InfoPanel::ResumeEntry(1)));

        assert!(resume(&mut state));
        assert_eq!(state.phase, GamePhase::Running);
        assert!(!resume(&mut state));
    }

    #[test]
    fn test_obstacle_hit_freezes_input() {
        let mut state = GameState::new(quiet_config(), 5);
        let obstacle = state.world.spawn_obstacle(Vec2::new(120.0, 450.0));
        let mut engine = ScriptedEngine {
            overlaps: vec![Overlap::PlayerObstacle(obstacle)],
        };

        tick(&mut state, &mut engine, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        let frozen_at = state.time_ticks;
        let vel = state.world.player.vel;
        let right = TickInput { right: true, jump: true, ..Default::default() };
        for _ in 0..10 {
            tick(&mut state, &mut engine, &right, SIM_DT);
        }
        assert_eq!(state.world.player.vel, vel);
        assert_eq!(state.time_ticks, frozen_at);
    }

    #[test]
    fn test_game_over_stops_key_dispatch() {
        let mut state = GameState::new(quiet_config(), 5);
        let obstacle = state.world.spawn_obstacle(Vec2::new(120.0, 450.0));
        let key = state.world.keys[0].id;
        let mut engine = ScriptedEngine {
            overlaps: vec![Overlap::PlayerObstacle(obstacle), Overlap::PlayerKey(key)],
        };

        tick(&mut state, &mut engine, &TickInput::default(), SIM_DT);
        assert_eq!(state.score(), 0);
        assert_eq!(state.world.active_keys(), 12);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let physics = PhysicsConfig::default();
        let mut player = Player::new(Vec2::ZERO);
        let jump = TickInput { jump: true, ..Default::default() };

        apply_input(&mut player, &physics, &jump);
        assert_eq!(player.vel.y, 0.0);

        player.grounded = true;
        apply_input(&mut player, &physics, &jump);
        assert_eq!(player.vel.y, physics.jump_velocity);
        assert!(!player.grounded);
    }

    #[test]
    fn test_running_right_generates_and_culls() {
        let mut config = quiet_config();
        config.generation.obstacle_chance = 0.0;
        let mut state = GameState::new(config, 11);
        let mut engine = ArcadeEngine::new(&state.config);
        let right = TickInput { right: true, ..Default::default() };

        let mut spawned = 0;
        for _ in 0..60 * 30 {
            tick(&mut state, &mut engine, &right, SIM_DT);
            let events = state.drain_events();
            let new = events
                .iter()
                .filter(|e| matches!(e, GameEvent::SegmentSpawned { .. }))
                .count();
            assert!(new <= 1);
            spawned += new;

            let limit = state.world.camera.left() - state.config.cull.margin;
            assert!(state.world.platforms.iter().all(|p| p.pos.x >= limit));
            assert!(state.world.keys.iter().all(|k| k.pos.x >= limit));
            assert!(state.frontier.x() >= state.world.camera.right());
        }

        assert!(spawned > 0);
        assert!(state.distance > 1000.0);
        // Starter platforms are long gone
        assert!(state.world.platforms.iter().all(|p| p.pos.x > 750.0));
    }

    #[test]
    fn test_generated_key_is_collected_over_its_obstacle() {
        let mut config = quiet_config();
        config.generation.obstacle_chance = 1.0;
        config.generation.key_chance = 1.0;
        let mut state = GameState::new(config, 21);
        let mut engine = ArcadeEngine::new(&state.config);

        let segment = {
            let GameState { world, frontier, config, rng, .. } = &mut state;
            generate(world, frontier, &config.generation, rng).unwrap()
        };
        let key_id = segment.key.unwrap();
        for _ in 0..600 {
            engine.integrate(&mut state.world, SIM_DT);
        }

        // Hover just above the obstacle, inside the key's box
        let obstacle = state.world.obstacles[0].bounds();
        let key_pos = state.world.keys.iter().find(|k| k.id == key_id).unwrap().pos;
        let player = &mut state.world.player;
        player.pos = Vec2::new(key_pos.x, obstacle.min.y - PLAYER_HEIGHT / 2.0 - 4.0);
        player.vel = Vec2::ZERO;

        tick(&mut state, &mut engine, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score(), 10);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::KeyCollected { id, .. } if *id == key_id)));
        assert!(state.world.keys.iter().all(|k| k.id != key_id));
    }

    proptest! {
        #[test]
        fn prop_score_is_count_times_value(
            order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle(),
            take in 0usize..=12,
        ) {
            let mut state = GameState::new(quiet_config(), 3);
            let ids: Vec<_> = state.world.keys.iter().map(|k| k.id).collect();
            for &i in order.iter().take(take) {
                collect_key(&mut state, ids[i]);
            }
            prop_assert_eq!(state.score(), take as u64 * 10);
            prop_assert_eq!(state.world.active_keys(), 12 - take);
        }
    }
}
