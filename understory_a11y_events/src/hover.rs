// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover enter/exit pairing for platform sinks.
//!
//! Platform views report hover as an enter on the new node followed by an exit on the node
//! that was hovered before. The dispatcher coalesces hover-enter across all nodes, so only
//! the sink knows which node actually received the last enter. [`HoverPairing`] wraps a sink
//! and emits the matching exit.
//!
//! ```
//! use understory_a11y_events::{EventTypes, HoverPairing, Sink};
//!
//! let mut sent = Vec::new();
//! let mut sink = HoverPairing::new(|node: u32, kind: EventTypes| {
//!     sent.push((node, kind));
//!     true
//! });
//! sink.dispatch(1, EventTypes::VIEW_HOVER_ENTER);
//! sink.dispatch(2, EventTypes::VIEW_HOVER_ENTER);
//! drop(sink);
//!
//! assert_eq!(
//!     sent,
//!     [
//!         (1, EventTypes::VIEW_HOVER_ENTER),
//!         (2, EventTypes::VIEW_HOVER_ENTER),
//!         (1, EventTypes::VIEW_HOVER_EXIT),
//!     ]
//! );
//! ```

use crate::capability::Sink;
use crate::platform::EventTypes;

/// Sink adapter that follows every accepted hover-enter with an exit for the previous hover
/// target.
///
/// A hover-enter the inner sink rejects leaves the hover target unchanged and sends no exit.
#[derive(Clone, Debug)]
pub struct HoverPairing<S, N> {
    inner: S,
    last_hover: Option<N>,
}

impl<S, N: Copy + PartialEq> HoverPairing<S, N> {
    /// Wrap `inner`. No node is considered hovered yet.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last_hover: None,
        }
    }

    /// The node whose hover-enter was last accepted.
    pub fn last_hover(&self) -> Option<N> {
        self.last_hover
    }

    /// The wrapped sink.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The wrapped sink, mutably.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Forget the hover target without sending anything.
    ///
    /// Hosts that want the exit filtered by relevance should take the target here and
    /// enqueue [`EventTypes::VIEW_HOVER_EXIT`] for it through the dispatcher.
    pub fn take_hover(&mut self) -> Option<N> {
        self.last_hover.take()
    }
}

impl<S: Sink<N, EventTypes>, N: Copy + PartialEq> HoverPairing<S, N> {
    /// Forget the hover target, sending an exit for it first.
    ///
    /// Use when accessibility focus is reset or the hovered node goes away. Returns `true`
    /// if an exit was sent.
    ///
    /// The exit goes straight to the inner sink. It does not pass through a
    /// [`Dispatcher`](crate::Dispatcher), so it is sent even when hover-exit is not in the
    /// relevant set. Use [`HoverPairing::take_hover`] to route it through the dispatcher.
    pub fn clear_hover(&mut self) -> bool {
        match self.last_hover.take() {
            Some(node) => {
                self.inner.dispatch(node, EventTypes::VIEW_HOVER_EXIT);
                true
            }
            None => false,
        }
    }

    /// Clear the hover target only if it is `node`. Returns `true` if an exit was sent.
    pub fn clear_hover_if(&mut self, node: N) -> bool {
        if self.last_hover == Some(node) {
            self.clear_hover()
        } else {
            false
        }
    }
}

impl<S: Sink<N, EventTypes>, N: Copy + PartialEq> Sink<N, EventTypes> for HoverPairing<S, N> {
    fn dispatch(&mut self, node: N, kind: EventTypes) -> bool {
        let accepted = self.inner.dispatch(node, kind);
        // A rejected enter never reached the platform, so the previous target stays hovered.
        if accepted && kind == EventTypes::VIEW_HOVER_ENTER {
            if let Some(previous) = self.last_hover {
                self.inner.dispatch(previous, EventTypes::VIEW_HOVER_EXIT);
            }
            self.last_hover = Some(node);
        }
        accepted
    }
}
