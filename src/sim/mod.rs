//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod cull;
pub mod engine;
pub mod generator;
pub mod schedule;
pub mod session;
pub mod state;
pub mod tick;

pub use collision::{Aabb, LandingResult, land_on_top};
pub use cull::{CullReport, cull};
pub use engine::{ArcadeEngine, Engine, Overlap, player_overlaps};
pub use generator::{Frontier, Segment, generate, needs_segment};
pub use schedule::{Command, CommandQueue, Scheduler};
pub use session::{Session, SessionToken};
pub use state::{
    Camera, EntityId, EntityRef, GameEvent, GamePhase, GameState, InfoPanel, Key, Obstacle,
    Platform, Player, World,
};
pub use tick::{TickInput, collect_key, tick};
