// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event dispatcher: admit, defer, or drop each accessibility event.
//!
//! ## Semantics
//!
//! For every [`Dispatcher::enqueue`] the dispatcher evaluates, in order:
//!
//! 1. Kind not in the relevant set: drop. No state, no timer, no sink call.
//! 2. Kind has no delay in the [`ThrottlePolicy`]: call the sink now. No state.
//! 3. Derive the [`ThrottleKey`] (kind-only for view-independent kinds, node + kind
//!    otherwise) and look up its state, creating it on first use.
//! 4. No previous dispatch for the key, or the window has fully elapsed: cancel any pending
//!    firing, call the sink now, record the time.
//! 5. Otherwise: cancel any pending firing and schedule a new one a full window from now.
//!    Only the last event of a burst survives; it is delivered when the timer fires.
//!
//! With throttling turned off ([`Dispatcher::set_throttling_enabled`]), every relevant kind
//! takes step 2. [`Dispatcher::counts`] tallies the outcome of each step.
//!
//! For a single key, sink calls never overlap and are at least one window apart (except
//! for the first). There is no ordering across keys.
//!
//! ## Driving timers
//!
//! Deferred dispatches are delivered by [`Dispatcher::fire`], which the host calls with the
//! handle and key it got from [`Timer::schedule`]. A firing whose handle no longer matches
//! the key's pending dispatch is stale and ignored. With a [`TimerQueue`],
//! [`Dispatcher::advance_to`] does this for every due entry.
//!
//! ## Example
//!
//! ```
//! use understory_a11y_events::{Admission, Dispatcher, ThrottlePolicy, TimerQueue};
//!
//! const CONTENT_CHANGED: u8 = 1;
//!
//! let mut sent = Vec::new();
//! let policy = ThrottlePolicy::new().with_delay(CONTENT_CHANGED, 100);
//! let mut dispatcher = Dispatcher::new(
//!     |node: u32, kind: u8| {
//!         sent.push((node, kind));
//!         true
//!     },
//!     TimerQueue::new(),
//!     policy,
//!     [CONTENT_CHANGED],
//! );
//!
//! // The first event goes out immediately, the rest of the burst coalesces.
//! assert_eq!(dispatcher.enqueue(7, CONTENT_CHANGED), Admission::Dispatched);
//! assert_eq!(dispatcher.enqueue(7, CONTENT_CHANGED), Admission::Deferred);
//! assert_eq!(dispatcher.enqueue(7, CONTENT_CHANGED), Admission::Deferred);
//!
//! // One trailing dispatch once the window has passed.
//! assert_eq!(dispatcher.advance_to(100), 1);
//! drop(dispatcher);
//! assert_eq!(sent, [(7, CONTENT_CHANGED), (7, CONTENT_CHANGED)]);
//! ```

use core::fmt::{self, Debug};
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::capability::{Sink, Timer};
use crate::policy::ThrottlePolicy;
use crate::timer_queue::TimerQueue;
use crate::types::{Admission, EventCounts, ThrottleKey};

/// A dispatch waiting for its timer.
#[derive(Copy, Clone, Debug)]
struct Pending<N, H> {
    handle: H,
    /// Node of the most recent event deferred under this key.
    node: N,
}

/// Per-key throttle state. Lives until [`Dispatcher::clear_queue`].
#[derive(Copy, Clone, Debug)]
struct ThrottleState<N, H> {
    last_dispatch: Option<u64>,
    pending: Option<Pending<N, H>>,
}

impl<N, H> Default for ThrottleState<N, H> {
    fn default() -> Self {
        Self {
            last_dispatch: None,
            pending: None,
        }
    }
}

/// Throttling dispatcher between a content tree and a platform accessibility sink.
///
/// ## Usage
///
/// - Construct with [`Dispatcher::new`] from a [`Sink`], a [`Timer`], a
///   [`ThrottlePolicy`], and the initially relevant kinds.
/// - Call [`Dispatcher::enqueue`] for every semantic change.
/// - Deliver timer firings with [`Dispatcher::fire`] (or [`Dispatcher::advance_to`] when
///   using a [`TimerQueue`]).
/// - Keep the relevant set current with [`Dispatcher::update_relevant_event_types`].
/// - Call [`Dispatcher::clear_queue`] before the sink goes away.
///
/// The dispatcher is single-threaded and not reentrant: every mutation goes through
/// `&mut self`, and timer firings must be delivered on the same logical thread.
pub struct Dispatcher<N, E, S, T: Timer<N, E>> {
    sink: S,
    timer: T,
    policy: ThrottlePolicy<E>,
    relevant: HashSet<E>,
    states: HashMap<ThrottleKey<N, E>, ThrottleState<N, T::Handle>>,
    throttling: bool,
    counts: EventCounts,
}

impl<N: Debug, E: Debug, S, T: Timer<N, E>> Debug for Dispatcher<N, E, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("policy", &self.policy)
            .field("relevant", &self.relevant)
            .field("tracked_keys", &self.states.len())
            .field("throttling", &self.throttling)
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}

impl<N, E, S, T> Dispatcher<N, E, S, T>
where
    N: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
    S: Sink<N, E>,
    T: Timer<N, E>,
{
    /// Create a dispatcher with no throttle state.
    pub fn new(
        sink: S,
        timer: T,
        policy: ThrottlePolicy<E>,
        relevant: impl IntoIterator<Item = E>,
    ) -> Self {
        Self {
            sink,
            timer,
            policy,
            relevant: relevant.into_iter().collect(),
            states: HashMap::new(),
            throttling: true,
            counts: EventCounts::default(),
        }
    }

    /// Offer one event for dispatch.
    ///
    /// Never blocks. The returned [`Admission`] is informational.
    pub fn enqueue(&mut self, node: N, kind: E) -> Admission {
        let admission = self.admit(node, kind);
        self.counts.record(admission);
        admission
    }

    fn admit(&mut self, node: N, kind: E) -> Admission {
        if !self.relevant.contains(&kind) {
            tracing::trace!(?node, ?kind, "dropping event of irrelevant kind");
            return Admission::Dropped;
        }

        let delay = match self.policy.delay(kind) {
            Some(delay) if self.throttling => delay,
            _ => {
                self.sink.dispatch(node, kind);
                return Admission::Dispatched;
            }
        };

        let key = self.policy.key_for(node, kind);
        let now = self.timer.now();
        let state = self.states.entry(key).or_default();

        // A burst only ever has one outstanding firing per key. With no pending handle
        // there is nothing to cancel, so the cancel is skipped rather than issued empty.
        if let Some(pending) = state.pending.take() {
            self.timer.cancel(pending.handle);
        }

        let window_elapsed = state
            .last_dispatch
            .is_none_or(|last| now.saturating_sub(last) >= delay);

        if window_elapsed {
            self.sink.dispatch(node, kind);
            state.last_dispatch = Some(now);
            tracing::debug!(?key, now, "dispatched event");
            Admission::Dispatched
        } else {
            let handle = self.timer.schedule(delay, key);
            state.pending = Some(Pending { handle, node });
            tracing::debug!(?key, ?node, delay_ms = delay, "deferred event");
            Admission::Deferred
        }
    }

    /// Deliver a timer firing for `key`.
    ///
    /// Returns `true` if the sink was called. Firings for unknown keys, keys with nothing
    /// pending, or keys whose pending dispatch was rescheduled under another handle are
    /// ignored.
    pub fn fire(&mut self, handle: T::Handle, key: &ThrottleKey<N, E>) -> bool {
        let Some(state) = self.states.get_mut(key) else {
            tracing::trace!(?key, ?handle, "ignoring firing for untracked key");
            return false;
        };
        let Some(pending) = state.pending.take_if(|p| p.handle == handle) else {
            tracing::trace!(?key, ?handle, "ignoring stale firing");
            return false;
        };

        let now = self.timer.now();
        self.sink.dispatch(pending.node, key.kind());
        state.last_dispatch = Some(now);
        self.counts.fired += 1;
        tracing::debug!(?key, node = ?pending.node, now, "dispatched deferred event");
        true
    }

    /// Replace the set of kinds eligible for dispatch.
    ///
    /// Only affects future [`Dispatcher::enqueue`] calls; dispatches already pending for a
    /// kind that is no longer relevant are still delivered.
    pub fn update_relevant_event_types(&mut self, relevant: impl IntoIterator<Item = E>) {
        self.relevant = relevant.into_iter().collect();
        tracing::debug!(relevant = ?self.relevant, "updated relevant event types");
    }

    /// Coalesce `kind` across all nodes from now on.
    ///
    /// Existing per-node state is not migrated. Returns `true` if the kind was newly added.
    pub fn add_view_independent(&mut self, kind: E) -> bool {
        self.policy.insert_view_independent(kind)
    }

    /// Coalesce `kind` per node from now on.
    ///
    /// Existing kind-only state is not migrated. Returns `true` if the kind was present.
    pub fn remove_view_independent(&mut self, kind: E) -> bool {
        self.policy.remove_view_independent(kind)
    }

    /// Cancel every pending dispatch and forget all throttle state.
    ///
    /// Events enqueued afterwards behave like the first event for their key. Call this
    /// before the sink or the timer's host goes away.
    pub fn clear_queue(&mut self) {
        let mut cancelled = 0_usize;
        for (_, state) in self.states.drain() {
            if let Some(pending) = state.pending {
                self.timer.cancel(pending.handle);
                cancelled += 1;
            }
        }
        tracing::debug!(cancelled, "cleared event queue");
    }

    /// Turn throttling on or off.
    ///
    /// While off, every relevant event goes straight to the sink and no throttle state is
    /// touched, which is what performance measurements of the sink want. Dispatches already
    /// pending keep their timers. Throttling is on for new dispatchers.
    pub fn set_throttling_enabled(&mut self, enabled: bool) {
        self.throttling = enabled;
        tracing::debug!(enabled, "set throttling");
    }

    /// Returns `true` unless throttling was turned off.
    pub fn is_throttling_enabled(&self) -> bool {
        self.throttling
    }

    /// Totals of every decision since construction or the last [`Dispatcher::reset_counts`].
    pub fn counts(&self) -> EventCounts {
        self.counts
    }

    /// Zero the decision totals.
    pub fn reset_counts(&mut self) {
        self.counts = EventCounts::default();
    }

    /// Returns `true` if `kind` is currently relevant.
    pub fn is_relevant(&self, kind: E) -> bool {
        self.relevant.contains(&kind)
    }

    /// Iterate over the relevant kinds, in no particular order.
    pub fn relevant_event_types(&self) -> impl Iterator<Item = E> + '_ {
        self.relevant.iter().copied()
    }

    /// Returns `true` if a deferred dispatch is outstanding for `key`.
    pub fn has_pending(&self, key: &ThrottleKey<N, E>) -> bool {
        self.states.get(key).is_some_and(|s| s.pending.is_some())
    }

    /// Number of keys with an outstanding deferred dispatch.
    pub fn pending_len(&self) -> usize {
        self.states.values().filter(|s| s.pending.is_some()).count()
    }

    /// Time of the last sink call for `key`, if any.
    pub fn last_dispatch(&self, key: &ThrottleKey<N, E>) -> Option<u64> {
        self.states.get(key).and_then(|s| s.last_dispatch)
    }

    /// Number of keys that have throttle state.
    pub fn tracked_keys(&self) -> usize {
        self.states.len()
    }
}

impl<N, E, S, T: Timer<N, E>> Dispatcher<N, E, S, T> {
    /// The throttle policy in effect.
    pub fn policy(&self) -> &ThrottlePolicy<E> {
        &self.policy
    }

    /// The sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The timer, mutably.
    ///
    /// Cancelling a handle the dispatcher still tracks leaves that key's dispatch pending
    /// until the next event for the key.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Take the dispatcher apart without cancelling anything.
    pub fn into_parts(self) -> (S, T) {
        (self.sink, self.timer)
    }
}

impl<N, E, S> Dispatcher<N, E, S, TimerQueue<ThrottleKey<N, E>>>
where
    N: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
    S: Sink<N, E>,
{
    /// Advance the timer queue to `now`, firing everything due in deadline order.
    ///
    /// While an entry fires the clock reads its deadline. Returns the number of deferred
    /// dispatches delivered to the sink.
    pub fn advance_to(&mut self, now: u64) -> usize {
        let mut delivered = 0;
        while let Some((id, key)) = self.timer.pop_due(now) {
            if self.fire(id, &key) {
                delivered += 1;
            }
        }
        self.timer.advance_to(now);
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    use crate::timer_queue::TimerId;

    const KIND1: u8 = 1;
    const KIND2: u8 = 2;
    const KIND3: u8 = 3;

    type Key = ThrottleKey<u32, u8>;

    /// Records every sink call.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u32, u8)>,
        accept: bool,
    }

    impl Sink<u32, u8> for Recorder {
        fn dispatch(&mut self, node: u32, kind: u8) -> bool {
            self.calls.push((node, kind));
            self.accept
        }
    }

    /// Timer queue that also counts schedule and cancel calls.
    #[derive(Default)]
    struct CountingTimer {
        queue: TimerQueue<Key>,
        scheduled: usize,
        cancelled: usize,
    }

    impl Timer<u32, u8> for CountingTimer {
        type Handle = TimerId;

        fn now(&self) -> u64 {
            self.queue.now()
        }

        fn schedule(&mut self, delay_ms: u64, key: Key) -> TimerId {
            self.scheduled += 1;
            self.queue.schedule_after(delay_ms, key)
        }

        fn cancel(&mut self, handle: TimerId) {
            self.cancelled += 1;
            self.queue.cancel(handle);
        }
    }

    type TestDispatcher = Dispatcher<u32, u8, Recorder, CountingTimer>;

    /// Delays `{kind2: 10ms, kind3: 5000ms}`, relevant `{kind1, kind2, kind3}`.
    fn reference() -> TestDispatcher {
        let policy = ThrottlePolicy::new()
            .with_delay(KIND2, 10)
            .with_delay(KIND3, 5_000);
        Dispatcher::new(
            Recorder {
                accept: true,
                ..Recorder::default()
            },
            CountingTimer::default(),
            policy,
            [KIND1, KIND2, KIND3],
        )
    }

    /// Fire everything due by `now`. Returns the number of sink calls made by firings.
    fn run_until(d: &mut TestDispatcher, now: u64) -> usize {
        let mut delivered = 0;
        while let Some((id, key)) = d.timer_mut().queue.pop_due(now) {
            if d.fire(id, &key) {
                delivered += 1;
            }
        }
        d.timer_mut().queue.advance_to(now);
        delivered
    }

    #[test]
    fn undelayed_kind_passes_through() {
        let mut d = reference();
        assert_eq!(d.enqueue(1, KIND1), Admission::Dispatched);

        assert_eq!(d.sink().calls, [(1, KIND1)]);
        assert_eq!(d.timer().scheduled, 0);
        assert_eq!(d.tracked_keys(), 0);
    }

    #[test]
    fn first_throttled_event_is_admitted() {
        let mut d = reference();
        assert_eq!(d.enqueue(1, KIND2), Admission::Dispatched);

        assert_eq!(d.sink().calls, [(1, KIND2)]);
        assert_eq!(d.timer().scheduled, 0);
        // Nothing was pending, so there was no handle to cancel.
        assert_eq!(d.timer().cancelled, 0);
        assert_eq!(d.last_dispatch(&ThrottleKey::Node(1, KIND2)), Some(0));
    }

    #[test]
    fn event_after_window_is_admitted() {
        let mut d = reference();
        d.enqueue(1, KIND2);
        run_until(&mut d, 10);
        assert_eq!(d.enqueue(1, KIND2), Admission::Dispatched);

        assert_eq!(d.sink().calls, [(1, KIND2), (1, KIND2)]);
        assert_eq!(d.timer().scheduled, 0);
        assert_eq!(d.last_dispatch(&ThrottleKey::Node(1, KIND2)), Some(10));
    }

    #[test]
    fn burst_coalesces_into_one_trailing_dispatch() {
        let mut d = reference();
        assert_eq!(d.enqueue(1, KIND3), Admission::Dispatched);
        assert_eq!(d.enqueue(1, KIND3), Admission::Deferred);
        assert_eq!(d.enqueue(1, KIND3), Admission::Deferred);
        assert_eq!(d.enqueue(1, KIND3), Admission::Deferred);

        assert_eq!(d.sink().calls.len(), 1);
        assert_eq!(d.timer().scheduled, 3);
        assert_eq!(d.timer().cancelled, 2);
        assert_eq!(d.pending_len(), 1);

        assert_eq!(run_until(&mut d, 4_999), 0);
        assert_eq!(run_until(&mut d, 5_000), 1);
        assert_eq!(d.sink().calls, [(1, KIND3), (1, KIND3)]);
        assert_eq!(d.pending_len(), 0);
        assert_eq!(d.last_dispatch(&ThrottleKey::Node(1, KIND3)), Some(5_000));
    }

    #[test]
    fn reschedule_restarts_the_full_window() {
        let mut d = reference();
        d.enqueue(1, KIND2);
        run_until(&mut d, 3);
        d.enqueue(1, KIND2);
        run_until(&mut d, 6);
        d.enqueue(1, KIND2);

        // The first deferral would have fired at 13; it was superseded.
        assert_eq!(run_until(&mut d, 15), 0);
        assert_eq!(run_until(&mut d, 16), 1);
        assert_eq!(d.last_dispatch(&ThrottleKey::Node(1, KIND2)), Some(16));

        // The window now runs from the trailing dispatch.
        run_until(&mut d, 20);
        assert_eq!(d.enqueue(1, KIND2), Admission::Deferred);
        run_until(&mut d, 30);
        assert_eq!(d.sink().calls.len(), 3);
        assert_eq!(d.last_dispatch(&ThrottleKey::Node(1, KIND2)), Some(30));
    }

    #[test]
    fn irrelevant_kind_is_dropped_without_state() {
        let mut d = reference();
        d.update_relevant_event_types([KIND3]);

        assert_eq!(d.enqueue(1, KIND3), Admission::Dispatched);
        assert_eq!(d.enqueue(1, KIND2), Admission::Dropped);
        assert_eq!(d.enqueue(1, KIND1), Admission::Dropped);

        assert_eq!(d.sink().calls, [(1, KIND3)]);
        assert_eq!(d.timer().scheduled, 0);
        assert_eq!(d.tracked_keys(), 1);
        assert!(!d.is_relevant(KIND2));
    }

    #[test]
    fn view_independent_burst_carries_last_node() {
        let mut d = reference();
        assert!(d.add_view_independent(KIND3));

        assert_eq!(d.enqueue(1, KIND3), Admission::Dispatched);
        assert_eq!(d.enqueue(2, KIND3), Admission::Deferred);
        assert_eq!(d.enqueue(3, KIND3), Admission::Deferred);
        assert_eq!(d.enqueue(4, KIND3), Admission::Deferred);

        assert_eq!(d.tracked_keys(), 1);
        assert!(d.has_pending(&ThrottleKey::Kind(KIND3)));
        assert_eq!(d.timer().scheduled, 3);

        assert_eq!(run_until(&mut d, 5_000), 1);
        assert_eq!(d.sink().calls, [(1, KIND3), (4, KIND3)]);
    }

    #[test]
    fn distinct_nodes_are_throttled_independently() {
        let mut d = reference();
        assert_eq!(d.enqueue(1, KIND2), Admission::Dispatched);
        assert_eq!(d.enqueue(2, KIND2), Admission::Dispatched);
        assert_eq!(d.enqueue(1, KIND2), Admission::Deferred);

        assert!(d.has_pending(&ThrottleKey::Node(1, KIND2)));
        assert!(!d.has_pending(&ThrottleKey::Node(2, KIND2)));
        assert_eq!(d.tracked_keys(), 2);
    }

    #[test]
    fn stale_firing_is_ignored() {
        let mut d = reference();
        let key = ThrottleKey::Node(1, KIND3);
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND3);
        let (stale, _) = d.timer().queue.clone().pop_due(u64::MAX).unwrap();
        d.enqueue(1, KIND3);

        assert!(!d.fire(stale, &key));
        assert!(d.has_pending(&key));
        assert!(!d.fire(stale, &ThrottleKey::Node(9, KIND3)));
        assert_eq!(d.sink().calls.len(), 1);

        assert_eq!(run_until(&mut d, 5_000), 1);
        assert_eq!(d.sink().calls.len(), 2);
        // Late delivery of the superseded handle is still a no-op.
        assert!(!d.fire(stale, &key));
        assert_eq!(d.sink().calls.len(), 2);
    }

    #[test]
    fn rejected_dispatch_still_advances_the_window() {
        let mut d = reference();
        d.sink_mut().accept = false;

        assert_eq!(d.enqueue(1, KIND2), Admission::Dispatched);
        assert_eq!(d.enqueue(1, KIND2), Admission::Deferred);
        assert_eq!(d.sink().calls.len(), 1);
    }

    #[test]
    fn relevance_change_keeps_pending_dispatches() {
        let mut d = reference();
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND3);
        d.update_relevant_event_types([KIND1]);

        assert!(d.has_pending(&ThrottleKey::Node(1, KIND3)));
        assert_eq!(run_until(&mut d, 5_000), 1);
        assert_eq!(d.sink().calls, [(1, KIND3), (1, KIND3)]);
    }

    #[test]
    fn view_independent_change_does_not_migrate_state() {
        let mut d = reference();
        d.add_view_independent(KIND2);
        d.enqueue(1, KIND2);
        assert_eq!(d.last_dispatch(&ThrottleKey::Kind(KIND2)), Some(0));

        assert!(d.remove_view_independent(KIND2));
        // Fresh per-node key: admitted even though the kind-only window is open.
        assert_eq!(d.enqueue(1, KIND2), Admission::Dispatched);
        assert_eq!(d.tracked_keys(), 2);
    }

    #[test]
    fn clear_queue_cancels_and_resets() {
        let mut d = reference();
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND3);
        d.enqueue(2, KIND2);
        d.enqueue(2, KIND2);
        assert_eq!(d.pending_len(), 2);

        d.clear_queue();
        assert_eq!(d.pending_len(), 0);
        assert_eq!(d.tracked_keys(), 0);
        assert!(d.timer().queue.is_empty());
        assert_eq!(run_until(&mut d, 10_000), 0);

        // Keys start over.
        assert_eq!(d.enqueue(1, KIND3), Admission::Dispatched);
        assert_eq!(d.sink().calls.len(), 3);
    }

    #[test]
    fn zero_delay_never_defers() {
        let policy = ThrottlePolicy::new().with_delay(KIND2, 0);
        let mut d: TestDispatcher =
            Dispatcher::new(Recorder::default(), CountingTimer::default(), policy, [KIND2]);
        assert_eq!(d.enqueue(1, KIND2), Admission::Dispatched);
        assert_eq!(d.enqueue(1, KIND2), Admission::Dispatched);
        assert_eq!(d.tracked_keys(), 1);
    }

    #[test]
    fn disabled_throttling_sends_every_relevant_event() {
        let mut d = reference();
        assert!(d.is_throttling_enabled());
        d.set_throttling_enabled(false);

        assert_eq!(d.enqueue(1, KIND3), Admission::Dispatched);
        assert_eq!(d.enqueue(1, KIND3), Admission::Dispatched);
        assert_eq!(d.enqueue(1, KIND3), Admission::Dispatched);
        assert_eq!(d.sink().calls.len(), 3);
        assert_eq!(d.timer().scheduled, 0);
        assert_eq!(d.tracked_keys(), 0);

        // The relevance filter still applies.
        d.update_relevant_event_types([KIND1]);
        assert_eq!(d.enqueue(1, KIND3), Admission::Dropped);
        assert_eq!(d.sink().calls.len(), 3);
    }

    #[test]
    fn disabling_throttling_keeps_pending_dispatches() {
        let mut d = reference();
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND3);
        d.set_throttling_enabled(false);
        assert!(d.has_pending(&ThrottleKey::Node(1, KIND3)));

        assert_eq!(run_until(&mut d, 5_000), 1);

        d.set_throttling_enabled(true);
        assert_eq!(d.enqueue(1, KIND3), Admission::Deferred);
    }

    #[test]
    fn counts_track_every_decision() {
        let mut d = reference();
        d.enqueue(1, KIND1);
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND3);
        d.update_relevant_event_types([KIND1, KIND3]);
        d.enqueue(1, KIND2);
        run_until(&mut d, 5_000);

        assert_eq!(
            d.counts(),
            EventCounts {
                enqueued: 5,
                dropped: 1,
                dispatched: 2,
                deferred: 2,
                fired: 1,
            }
        );

        // Stale firings are not counted.
        d.enqueue(1, KIND3);
        let (stale, key) = d.timer().queue.clone().pop_due(u64::MAX).unwrap();
        d.enqueue(1, KIND3);
        assert!(!d.fire(stale, &key));
        assert_eq!(d.counts().fired, 1);

        d.reset_counts();
        assert_eq!(d.counts(), EventCounts::default());
    }

    #[test]
    fn timer_queue_driver_fires_due_entries() {
        let mut calls = Vec::new();
        let policy = ThrottlePolicy::new().with_delay(KIND2, 10).with_delay(KIND3, 50);
        let mut d = Dispatcher::new(
            |node: u32, kind: u8| {
                calls.push((node, kind));
                true
            },
            TimerQueue::new(),
            policy,
            [KIND2, KIND3],
        );
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND3);
        d.enqueue(1, KIND2);
        d.enqueue(1, KIND2);

        assert_eq!(d.advance_to(100), 2);
        assert_eq!(d.timer().now(), 100);
        assert_eq!(d.last_dispatch(&ThrottleKey::Node(1, KIND2)), Some(10));
        assert_eq!(d.last_dispatch(&ThrottleKey::Node(1, KIND3)), Some(50));
        drop(d);
        assert_eq!(calls, [(1, KIND3), (1, KIND2), (1, KIND2), (1, KIND3)]);
    }
}
