// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the dispatcher consumes: a sink that forwards events and a timer that
//! defers them.
//!
//! Both are narrow traits so a host can satisfy them with a closure, a platform handler,
//! or the in-crate [`TimerQueue`](crate::TimerQueue).
//!
//! ## Timer firings
//!
//! The timer never calls back into the dispatcher by itself. [`Timer::schedule`] is told
//! which [`ThrottleKey`] the firing belongs to; when the delay elapses the host passes the
//! returned handle and that key to [`Dispatcher::fire`](crate::Dispatcher::fire) on the same
//! logical thread that calls [`Dispatcher::enqueue`](crate::Dispatcher::enqueue).

use core::fmt::Debug;

use crate::types::ThrottleKey;

/// Forwards admitted events to the platform accessibility layer.
///
/// Closures of the shape `FnMut(N, E) -> bool` implement this trait.
pub trait Sink<N, E> {
    /// Forward one event.
    ///
    /// The return value reports whether the platform accepted the event. It is advisory:
    /// the dispatcher never retries and advances the throttle window either way.
    fn dispatch(&mut self, node: N, kind: E) -> bool;
}

impl<N, E, F> Sink<N, E> for F
where
    F: FnMut(N, E) -> bool,
{
    fn dispatch(&mut self, node: N, kind: E) -> bool {
        self(node, kind)
    }
}

/// Clock and deferred-firing capability.
///
/// Timestamps and delays are in milliseconds.
pub trait Timer<N, E> {
    /// Identifies one scheduled firing.
    type Handle: Copy + Eq + Debug;

    /// Current time, in milliseconds. Must never go backwards.
    fn now(&self) -> u64;

    /// Arrange for `key` to be handed back to the dispatcher once, no earlier than
    /// `delay_ms` from now.
    fn schedule(&mut self, delay_ms: u64, key: ThrottleKey<N, E>) -> Self::Handle;

    /// Prevent a scheduled firing.
    ///
    /// Must be a no-op for handles that already fired or were already cancelled.
    fn cancel(&mut self, handle: Self::Handle);
}
