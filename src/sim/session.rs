//! Session ownership: state, timers and the command queue
//!
//! The host loop owns a `Session` and calls `tick` once per simulation step.
//! Anything deferred (button presses, timers) goes through the command queue
//! stamped with the epoch of the session that issued it, so work queued for a
//! torn-down session is dropped instead of mutating its replacement.

use glam::Vec2;

use super::engine::Engine;
use super::schedule::{Command, CommandQueue, Scheduler};
use super::state::{GameEvent, GamePhase, GameState};
use super::tick::{TickInput, resume, tick};
use crate::config::{ConfigError, ContinueAction, GameConfig};
use crate::consts::*;
use crate::sample_range;

/// Handle that identifies the session a deferred command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken {
    epoch: u64,
}

/// A running game session and its deferred work
#[derive(Debug)]
pub struct Session {
    state: GameState,
    scheduler: Scheduler,
    commands: CommandQueue,
}

impl Session {
    /// Validate `config` and build the first session
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            state: GameState::new(config, seed),
            scheduler: Scheduler::new(),
            commands: CommandQueue::new(),
        };
        session.arm_timers();
        log::info!("Session started with seed {}", seed);
        Ok(session)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn epoch(&self) -> u64 {
        self.state.epoch
    }

    /// Pending timers (zero once the session is over)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Token for handlers that may outlive this session
    pub fn token(&self) -> SessionToken {
        SessionToken { epoch: self.state.epoch }
    }

    /// Whether `token` still refers to the live session
    pub fn is_current(&self, token: SessionToken) -> bool {
        token.epoch == self.state.epoch
    }

    /// Queue a command for the current session
    pub fn submit(&mut self, command: Command) {
        self.commands.push(self.state.epoch, command);
    }

    /// Queue a command on behalf of `token`; ignored at drain time if stale
    pub fn submit_with(&mut self, token: SessionToken, command: Command) {
        self.commands.push(token.epoch, command);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Advance one simulation step
    pub fn tick<E: Engine + ?Sized>(&mut self, engine: &mut E, input: &TickInput, dt: f32) {
        self.apply_commands();

        tick(&mut self.state, engine, input, dt);

        match self.state.phase {
            GamePhase::GameOver => {
                let cancelled = self.scheduler.cancel_all();
                if cancelled > 0 {
                    log::debug!("Cancelled {} timers on game over", cancelled);
                }
            }
            GamePhase::Running => {
                self.scheduler.advance(self.state.time_ticks, &mut self.commands);
            }
            GamePhase::ShowingInfo(_) => {}
        }
    }

    /// Replace the session with a fresh one built from the same config
    pub fn restart(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        let seed = self.state.next_seed();
        let epoch = self.state.epoch + 1;
        let config = self.state.config.clone();

        self.state = GameState::with_epoch(config, seed, epoch);
        self.arm_timers();

        log::info!(
            "Session restarted (epoch {}, seed {}, {} timers cancelled)",
            epoch,
            seed,
            cancelled
        );
        self.state.emit(GameEvent::Restarted { epoch });
    }

    fn arm_timers(&mut self) {
        if let Some(every) = self.state.config.timers.key_drop_every_ticks {
            self.scheduler
                .every(self.state.epoch, self.state.time_ticks, every, Command::DropKey);
        }
    }

    fn apply_commands(&mut self) {
        while let Some(stamped) = self.commands.pop() {
            if stamped.epoch != self.state.epoch {
                log::debug!(
                    "Dropped stale {:?} from epoch {} (current {})",
                    stamped.command,
                    stamped.epoch,
                    self.state.epoch
                );
                continue;
            }

            match stamped.command {
                Command::Restart => self.restart(),
                Command::Continue => self.continue_game(),
                Command::DropKey => self.drop_key(),
            }
        }
    }

    fn continue_game(&mut self) {
        if !matches!(self.state.phase, GamePhase::ShowingInfo(_)) {
            log::debug!("Continue ignored in {:?}", self.state.phase);
            return;
        }
        match self.state.config.scoring.continue_action {
            ContinueAction::Resume => {
                resume(&mut self.state);
            }
            ContinueAction::Restart => self.restart(),
        }
    }

    fn drop_key(&mut self) {
        if !self.state.phase.is_running() {
            return;
        }
        let state = &mut self.state;
        let bounce = sample_range(&mut state.rng, KEY_BOUNCE_MIN, KEY_BOUNCE_MAX);
        let x = state.world.camera.right() - KEY_SIZE;
        let id = state.world.spawn_key(Vec2::new(x, -KEY_SIZE), bounce);
        log::debug!("Timer dropped key {:?} at x={:.0}", id, x);
        state.emit(GameEvent::KeyDropped { id });
    }
}
