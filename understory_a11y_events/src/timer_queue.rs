// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual-time timer queue.
//!
//! [`TimerQueue`] is a deterministic implementation of the [`Timer`] capability. Time only
//! moves when the host says so, which makes it suitable both for tests and for hosts that
//! drive the dispatcher from their own frame or event loop.
//!
//! ```
//! use understory_a11y_events::TimerQueue;
//!
//! let mut queue: TimerQueue<&str> = TimerQueue::new();
//! let a = queue.schedule_at(20, "a");
//! let _b = queue.schedule_at(10, "b");
//! assert!(queue.cancel(a));
//! assert!(!queue.cancel(a));
//!
//! assert_eq!(queue.pop_due(5), None);
//! assert_eq!(queue.pop_due(50).map(|(_, p)| p), Some("b"));
//! assert_eq!(queue.now(), 10);
//! assert!(queue.is_empty());
//! ```

use alloc::collections::BTreeMap;

use hashbrown::HashMap;

use crate::capability::Timer;
use crate::types::ThrottleKey;

/// Handle for one entry in a [`TimerQueue`].
///
/// Identifiers are never reused within a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Ordered queue of deadlines over a virtual clock.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    now: u64,
    next_id: u64,
    /// Entries ordered by deadline, then by scheduling order.
    entries: BTreeMap<(u64, TimerId), T>,
    /// Deadline lookup for cancellation.
    deadlines: HashMap<TimerId, u64>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an empty queue with the clock at `now`.
    pub fn starting_at(now: u64) -> Self {
        Self {
            now,
            next_id: 0,
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current virtual time, in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Move the clock forward to `now` without firing anything.
    ///
    /// The clock never moves backwards; an earlier `now` is ignored.
    pub fn advance_to(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    /// Schedule `payload` to become due at `deadline`.
    pub fn schedule_at(&mut self, deadline: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Schedule `payload` to become due `delay_ms` after the current time.
    pub fn schedule_after(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.schedule_at(self.now.saturating_add(delay_ms), payload)
    }

    /// Cancel an entry. Returns `false` if it already fired or was already cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.entries.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Remove and return the earliest entry due at or before `now`.
    ///
    /// The clock is moved to that entry's deadline (or kept, if it is already later), so a
    /// consumer observing [`TimerQueue::now`] while handling the entry sees the time it fired.
    /// Entries with equal deadlines come out in scheduling order.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, T)> {
        let (&(deadline, id), _) = self.entries.first_key_value()?;
        if deadline > now {
            return None;
        }
        let payload = self.entries.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.advance_to(deadline);
        Some((id, payload))
    }

    /// Deadline of the earliest outstanding entry.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Number of outstanding entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every outstanding entry. The clock is unchanged.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }
}

impl<N, E> Timer<N, E> for TimerQueue<ThrottleKey<N, E>> {
    type Handle = TimerId;

    fn now(&self) -> u64 {
        self.now
    }

    fn schedule(&mut self, delay_ms: u64, key: ThrottleKey<N, E>) -> TimerId {
        self.schedule_after(delay_ms, key)
    }

    fn cancel(&mut self, handle: TimerId) {
        Self::cancel(self, handle);
    }
}
