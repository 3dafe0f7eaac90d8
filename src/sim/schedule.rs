//! Tick-counted timers and the session command queue
//!
//! Deferred work is data, not closures: a timer fires a `Command` into the
//! queue, and the session drains the queue at the start of the next tick.
//! Every command carries the epoch of the session that issued it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Deferred or host-issued action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Dismiss the info panel
    Continue,
    /// Tear the session down and build a new one
    Restart,
    /// Drop a key from above the camera's right edge
    DropKey,
}

/// A command tagged with the epoch of the session that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamped {
    pub epoch: u64,
    pub command: Command,
}

/// FIFO of pending commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    items: VecDeque<Stamped>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, epoch: u64, command: Command) {
        self.items.push_back(Stamped { epoch, command });
    }

    pub fn pop(&mut self) -> Option<Stamped> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Timer {
    epoch: u64,
    due_tick: u64,
    period: u64,
    command: Command,
}

/// Pending periodic timers for the current session
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `command` every `period` ticks, starting `period` ticks after `now`
    pub fn every(&mut self, epoch: u64, now: u64, period: u32, command: Command) {
        let period = u64::from(period.max(1));
        self.timers.push(Timer {
            epoch,
            due_tick: now + period,
            period,
            command,
        });
    }

    /// Drop every pending timer; returns how many were pending
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Enqueue the commands of every timer due at or before `now` and re-arm
    /// it. A timer fires at most once per call.
    pub fn advance(&mut self, now: u64, queue: &mut CommandQueue) -> usize {
        let mut fired = 0;
        for timer in self.timers.iter_mut().filter(|t| t.due_tick <= now) {
            queue.push(timer.epoch, timer.command);
            timer.due_tick = now + timer.period;
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_rearms() {
        let mut scheduler = Scheduler::new();
        let mut queue = CommandQueue::new();
        scheduler.every(3, 0, 4, Command::DropKey);

        let fired: usize = (1..=12).map(|t| scheduler.advance(t, &mut queue)).sum();
        assert_eq!(fired, 3);
        assert_eq!(queue.len(), 3);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(queue.pop().unwrap().epoch, 3);
    }

    #[test]
    fn test_cancel_all_silences_timers() {
        let mut scheduler = Scheduler::new();
        let mut queue = CommandQueue::new();
        scheduler.every(0, 0, 2, Command::DropKey);
        scheduler.every(0, 0, 3, Command::DropKey);

        assert_eq!(scheduler.cancel_all(), 2);
        assert_eq!(scheduler.cancel_all(), 0);
        assert_eq!(scheduler.advance(100, &mut queue), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_across_epochs() {
        let mut queue = CommandQueue::new();
        queue.push(1, Command::DropKey);
        queue.push(2, Command::Restart);
        assert_eq!(queue.pop(), Some(Stamped { epoch: 1, command: Command::DropKey }));
        assert_eq!(queue.pop(), Some(Stamped { epoch: 2, command: Command::Restart }));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut scheduler = Scheduler::new();
        let mut queue = CommandQueue::new();
        scheduler.every(0, 0, 0, Command::DropKey);
        assert_eq!(scheduler.advance(0, &mut queue), 0);
        assert_eq!(scheduler.advance(1, &mut queue), 1);
    }
}
