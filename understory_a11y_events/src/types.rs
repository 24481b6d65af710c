// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types shared by the dispatcher and its capabilities.

/// Coalescing identity for throttled events.
///
/// Events that share a key are mutually exclusive within a throttle window: at most one of
/// them is admitted per window, and a burst collapses into a single trailing dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThrottleKey<N, E> {
    /// Kind-only key, used for view-independent kinds. All nodes share it.
    Kind(E),
    /// Per-node key, used for every other throttled kind.
    Node(N, E),
}

impl<N: Copy, E: Copy> ThrottleKey<N, E> {
    /// The event kind this key throttles.
    pub fn kind(&self) -> E {
        match *self {
            Self::Kind(kind) | Self::Node(_, kind) => kind,
        }
    }

    /// The node this key is scoped to, or `None` for kind-only keys.
    pub fn node(&self) -> Option<N> {
        match *self {
            Self::Kind(_) => None,
            Self::Node(node, _) => Some(node),
        }
    }

    /// Returns `true` if this key coalesces across all nodes.
    pub fn is_view_independent(&self) -> bool {
        matches!(self, Self::Kind(_))
    }
}

/// What [`Dispatcher::enqueue`](crate::Dispatcher::enqueue) did with an event.
///
/// Purely informational; `enqueue` is fire-and-forget and callers may ignore it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Admission {
    /// The kind is not currently relevant. Nothing happened.
    Dropped,
    /// The sink was called synchronously.
    Dispatched,
    /// A trailing dispatch was (re)scheduled for the event's key.
    Deferred,
}

/// Running totals of what a [`Dispatcher`](crate::Dispatcher) did with its events.
///
/// Hosts read these for usage metrics; see
/// [`Dispatcher::counts`](crate::Dispatcher::counts).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventCounts {
    /// Every call to `enqueue`.
    pub enqueued: u64,
    /// Events of kinds that were not relevant.
    pub dropped: u64,
    /// Events sent to the sink from within `enqueue`.
    pub dispatched: u64,
    /// Events that (re)scheduled a trailing dispatch.
    pub deferred: u64,
    /// Trailing dispatches delivered by timer firings.
    pub fired: u64,
}

impl EventCounts {
    pub(crate) fn record(&mut self, admission: Admission) {
        self.enqueued += 1;
        match admission {
            Admission::Dropped => self.dropped += 1,
            Admission::Dispatched => self.dispatched += 1,
            Admission::Deferred => self.deferred += 1,
        }
    }
}
