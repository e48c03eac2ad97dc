//! Deterministic timer scheduling.
//!
//! Timers carry a payload instead of a callback. The owner pops due
//! timers with [`TimerQueue::pop_due`] and dispatches the payloads, which
//! keeps cancellation and catch-up arithmetic in one place.

use crate::clock::Timestamp;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;

/// Scheduler errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Timer queue full ({capacity} pending)")]
    Full { capacity: usize },
}

/// Cancellable handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Schedules payloads to fire at a point in time.
pub trait Scheduler<T> {
    /// Schedule `payload` to fire at `deadline`.
    fn schedule_at(&mut self, deadline: Timestamp, payload: T) -> Result<TimerHandle, SchedulerError>;

    /// Cancel a timer. Safe on fired, cancelled or unknown handles.
    /// Returns true if a pending timer was removed.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Check if a timer is still waiting to fire.
    fn is_pending(&self, handle: TimerHandle) -> bool;

    /// Schedule `payload` to fire `delay` after `now`.
    fn schedule_after(
        &mut self,
        now: Timestamp,
        delay: Duration,
        payload: T,
    ) -> Result<TimerHandle, SchedulerError> {
        self.schedule_at(now.saturating_add(delay), payload)
    }
}

/// Timer queue ordered by deadline, then by scheduling order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    queue: BTreeMap<(Timestamp, u64), T>,
    deadlines: HashMap<TimerHandle, Timestamp>,
    next_seq: u64,
    capacity: Option<usize>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_seq: 0,
            capacity: None,
        }
    }
}

impl<T> TimerQueue<T> {
    /// Create an unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue holding at most `capacity` pending timers.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(TimerHandle, T)> {
        let (&(deadline, seq), _) = self.queue.first_key_value()?;
        if deadline > now {
            return None;
        }
        let payload = self.queue.remove(&(deadline, seq))?;
        let handle = TimerHandle(seq);
        self.deadlines.remove(&handle);
        Some((handle, payload))
    }

    /// Deadline of the next timer to fire.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.first_key_value().map(|(&(deadline, _), _)| deadline)
    }

    /// Deadline of a pending timer.
    pub fn deadline(&self, handle: TimerHandle) -> Option<Timestamp> {
        self.deadlines.get(&handle).copied()
    }

    /// Iterate pending payloads in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (Timestamp, &T)> {
        self.queue.iter().map(|(&(deadline, _), payload)| (deadline, payload))
    }

    /// Get the number of pending timers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Scheduler<T> for TimerQueue<T> {
    fn schedule_at(&mut self, deadline: Timestamp, payload: T) -> Result<TimerHandle, SchedulerError> {
        if let Some(capacity) = self.capacity {
            if self.queue.len() >= capacity {
                return Err(SchedulerError::Full { capacity });
            }
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TimerHandle(seq);
        self.queue.insert((deadline, seq), payload);
        self.deadlines.insert(handle, deadline);
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle) {
            Some(deadline) => self.queue.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle)
    }
}
