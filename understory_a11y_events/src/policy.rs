// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Throttle policy: per-kind delays and the view-independent set.
//!
//! A [`ThrottlePolicy`] answers two questions for the dispatcher:
//!
//! - How long is the throttle window for a kind? Kinds without a delay are never
//!   throttled and always pass straight through to the sink.
//! - Does a kind coalesce per node, or across all nodes? View-independent kinds use a
//!   kind-only [`ThrottleKey`].
//!
//! ```
//! use understory_a11y_events::{ThrottleKey, ThrottlePolicy};
//!
//! let policy = ThrottlePolicy::new()
//!     .with_delay(2_u8, 10)
//!     .with_delay(3_u8, 5_000)
//!     .with_view_independent(3_u8);
//!
//! assert_eq!(policy.delay(2), Some(10));
//! assert_eq!(policy.delay(1), None);
//! assert_eq!(policy.key_for(9_u32, 2), ThrottleKey::Node(9, 2));
//! assert_eq!(policy.key_for(9_u32, 3), ThrottleKey::Kind(3));
//! ```

use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::types::ThrottleKey;

/// Per-kind throttle configuration.
///
/// The delay table is fixed once the policy is handed to a
/// [`Dispatcher`](crate::Dispatcher); the view-independent set may still grow or shrink
/// through the dispatcher.
#[derive(Clone, Debug)]
pub struct ThrottlePolicy<E> {
    /// Throttle window per kind, in milliseconds.
    delays: HashMap<E, u64>,
    /// Kinds coalesced across all nodes.
    view_independent: HashSet<E>,
}

impl<E> Default for ThrottlePolicy<E> {
    fn default() -> Self {
        Self {
            delays: HashMap::new(),
            view_independent: HashSet::new(),
        }
    }
}

impl<E: Copy + Eq + Hash> ThrottlePolicy<E> {
    /// Create an empty policy: nothing is throttled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Throttle `kind` with a window of `delay_ms` milliseconds.
    ///
    /// A zero delay is allowed; such a kind records state but never defers.
    pub fn with_delay(mut self, kind: E, delay_ms: u64) -> Self {
        self.delays.insert(kind, delay_ms);
        self
    }

    /// Coalesce `kind` across all nodes instead of per node.
    pub fn with_view_independent(mut self, kind: E) -> Self {
        self.view_independent.insert(kind);
        self
    }

    /// The throttle window for `kind`, or `None` if the kind is pass-through.
    pub fn delay(&self, kind: E) -> Option<u64> {
        self.delays.get(&kind).copied()
    }

    /// Returns `true` if `kind` is coalesced across all nodes.
    pub fn is_view_independent(&self, kind: E) -> bool {
        self.view_independent.contains(&kind)
    }

    /// Derive the coalescing key for an event.
    pub fn key_for<N>(&self, node: N, kind: E) -> ThrottleKey<N, E> {
        if self.is_view_independent(kind) {
            ThrottleKey::Kind(kind)
        } else {
            ThrottleKey::Node(node, kind)
        }
    }

    /// Iterate over the throttled kinds and their windows, in no particular order.
    pub fn delays(&self) -> impl Iterator<Item = (E, u64)> + '_ {
        self.delays.iter().map(|(kind, delay)| (*kind, *delay))
    }

    /// Iterate over the view-independent kinds, in no particular order.
    pub fn view_independent(&self) -> impl Iterator<Item = E> + '_ {
        self.view_independent.iter().copied()
    }

    /// Add `kind` to the view-independent set. Returns `true` if it was not present.
    pub(crate) fn insert_view_independent(&mut self, kind: E) -> bool {
        self.view_independent.insert(kind)
    }

    /// Remove `kind` from the view-independent set. Returns `true` if it was present.
    pub(crate) fn remove_view_independent(&mut self, kind: E) -> bool {
        self.view_independent.remove(&kind)
    }
}
