// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory A11y Events: throttled delivery of accessibility events.
//!
//! ## Overview
//!
//! Content trees mutate in bursts (live regions, animations, layout churn), and forwarding
//! every resulting notification to a platform accessibility API floods screen readers.
//! This crate sits between the two. For every semantic change it decides whether to forward
//! the event now, coalesce it with others of the same kind, or drop it.
//!
//! It does not decide *what* changed and does not build platform event payloads. Those stay
//! with the host, behind the [`Sink`] capability.
//!
//! ## Pieces
//!
//! - [`Dispatcher`]: per-key throttle state and the admit/defer/drop decision.
//! - [`ThrottlePolicy`]: per-kind throttle windows and the set of view-independent kinds,
//!   whose bursts coalesce across all nodes rather than per node.
//! - [`Sink`] and [`Timer`]: the capabilities the dispatcher consumes. Closures implement
//!   [`Sink`]; [`TimerQueue`] implements [`Timer`] over a virtual clock.
//! - [`EventTypes`]: the platform's single-bit event types and service masks, with
//!   [`ThrottlePolicy::platform_default`].
//! - [`HoverPairing`]: a sink adapter that pairs hover-enter with hover-exit.
//!
//! ## Workflow
//!
//! 1) Build a policy and a dispatcher with the kinds that running services care about.
//! 2) Call [`Dispatcher::enqueue`] for each change. The first event of a burst goes out
//!    immediately; later ones within the window collapse into a single trailing event.
//! 3) Hand timer firings back with [`Dispatcher::fire`], or let
//!    [`Dispatcher::advance_to`] do it when driving a [`TimerQueue`].
//! 4) When the set of services changes, call [`Dispatcher::update_relevant_event_types`].
//!
//! ```
//! use understory_a11y_events::{
//!     Admission, Dispatcher, EventTypes, HoverPairing, ThrottlePolicy, TimerQueue,
//! };
//!
//! let mut sent = Vec::new();
//! let sink = HoverPairing::new(|node: u32, kind: EventTypes| {
//!     sent.push((node, kind));
//!     true
//! });
//! let relevant = EventTypes::relevant_from_mask(
//!     (EventTypes::VIEW_HOVER_ENTER | EventTypes::VIEW_HOVER_EXIT).bits(),
//! );
//! let mut dispatcher =
//!     Dispatcher::new(sink, TimerQueue::new(), ThrottlePolicy::platform_default(), relevant);
//!
//! // Hovering across three nodes in quick succession.
//! assert_eq!(dispatcher.enqueue(1, EventTypes::VIEW_HOVER_ENTER), Admission::Dispatched);
//! assert_eq!(dispatcher.enqueue(2, EventTypes::VIEW_HOVER_ENTER), Admission::Deferred);
//! assert_eq!(dispatcher.enqueue(3, EventTypes::VIEW_HOVER_ENTER), Admission::Deferred);
//! // Scrolls are not requested by any service.
//! assert_eq!(dispatcher.enqueue(1, EventTypes::VIEW_SCROLLED), Admission::Dropped);
//!
//! dispatcher.advance_to(50);
//! drop(dispatcher);
//! assert_eq!(
//!     sent,
//!     [
//!         (1, EventTypes::VIEW_HOVER_ENTER),
//!         (3, EventTypes::VIEW_HOVER_ENTER),
//!         (1, EventTypes::VIEW_HOVER_EXIT),
//!     ]
//! );
//! ```
//!
//! ## Threading
//!
//! The dispatcher is single-threaded and cooperative. Enqueue calls and timer firings must
//! arrive on one logical thread; hosts with several producers serialize them first.
//!
//! ## Logging
//!
//! Decisions are reported through [`tracing`]: drops and stale firings at `trace`, admits,
//! deferrals and queue clears at `debug`.
//!
//! ## Features
//!
//! - `std`: enables `std` support in `tracing`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod capability;
pub mod dispatcher;
pub mod hover;
pub mod platform;
mod policy;
pub mod timer_queue;
mod types;

pub use capability::{Sink, Timer};
pub use dispatcher::Dispatcher;
pub use hover::HoverPairing;
pub use platform::EventTypes;
pub use policy::ThrottlePolicy;
pub use timer_queue::{TimerId, TimerQueue};
pub use types::{Admission, EventCounts, ThrottleKey};
