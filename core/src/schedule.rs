use alloc::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Deferred work owned by a game session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Second phase of the reveal of a pending cell.
    ResolveReveal(Coord2),
    /// Raise the terminal flag after a deferred victory.
    FinishGame,
    ElapsedTick,
    PeriodicClue,
    /// Stop waiting for the host to initialize the game.
    HostInitTimeout,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Identifies the session timers were scheduled for; replaced whenever a session is torn down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Timer {
    token: SessionToken,
    task: Task,
}

/// A virtual clock and the timers waiting on it.
///
/// Time only moves when the owner calls [`Scheduler::pop_due`] or [`Scheduler::advance_to`],
/// and timers due at the same instant fire in the order they were scheduled.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: Millis,
    next_id: u64,
    token: SessionToken,
    queue: BTreeMap<(Millis, TimerId), Timer>,
    due_by_id: BTreeMap<TimerId, Millis>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Number of timers still waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.queue.values().any(|timer| timer.task == task)
    }

    pub fn schedule(&mut self, delay: Millis, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        self.queue.insert(
            (due, id),
            Timer {
                token: self.token,
                task,
            },
        );
        self.due_by_id.insert(id, due);
        log::trace!("Scheduled {:?} at {} as {:?}", task, due, id);
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_by_id.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Drops every timer of the current session and hands out a new token.
    pub fn cancel_session(&mut self) -> SessionToken {
        let dropped = self.queue.len();
        self.queue.clear();
        self.due_by_id.clear();
        self.token = SessionToken(self.token.0 + 1);
        log::debug!("Cancelled {} timers, now on {:?}", dropped, self.token);
        self.token
    }

    /// Takes the earliest timer due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Millis) -> Option<Task> {
        loop {
            let (&(due, id), _) = self.queue.first_key_value()?;
            if due > until {
                return None;
            }
            let timer = self.queue.remove(&(due, id))?;
            self.due_by_id.remove(&id);
            self.now = self.now.max(due);

            if timer.token != self.token {
                continue;
            }
            log::trace!("Firing {:?} at {}", timer.task, due);
            return Some(timer.task);
        }
    }

    /// Moves the clock forward to `until` without firing anything.
    pub fn advance_to(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }
}
