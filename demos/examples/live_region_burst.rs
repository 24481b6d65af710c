// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Throttling a burst of accessibility events.
//!
//! This example shows how to combine:
//! - `ThrottlePolicy::platform_default` for the standard per-kind windows,
//! - `HoverPairing` to emit hover-exit after each delivered hover-enter,
//! - `TimerQueue` to drive deferred dispatches from a simulated frame clock.
//!
//! A live region updates every 5ms for 300ms while the pointer sweeps across a list. Only
//! a handful of events reach the sink.
//!
//! Run:
//! - `cargo run -p understory_a11y_demos --example live_region_burst`
//! - `RUST_LOG=understory_a11y_events=debug cargo run -p understory_a11y_demos --example live_region_burst`

use understory_a11y_demos::init_tracing;
use understory_a11y_events::{Dispatcher, EventTypes, HoverPairing, ThrottlePolicy, TimerQueue};

const LIVE_REGION: u32 = 10;
const FRAME_MS: u64 = 5;

fn main() {
    init_tracing();

    let mut delivered = 0_usize;
    let sink = HoverPairing::new(|node: u32, kind: EventTypes| {
        delivered += 1;
        tracing::info!(node, ?kind, "sent to platform");
        true
    });

    // A screen reader is running: it listens for content changes, scrolls and hover.
    let service_mask = EventTypes::WINDOW_CONTENT_CHANGED
        | EventTypes::VIEW_SCROLLED
        | EventTypes::VIEW_HOVER_ENTER
        | EventTypes::VIEW_HOVER_EXIT;
    let mut dispatcher = Dispatcher::new(
        sink,
        TimerQueue::new(),
        ThrottlePolicy::platform_default(),
        EventTypes::relevant_from_mask(service_mask.bits()),
    );

    for frame in 0..60_u64 {
        let now = frame * FRAME_MS;
        dispatcher.advance_to(now);

        dispatcher.enqueue(LIVE_REGION, EventTypes::WINDOW_CONTENT_CHANGED);

        // The pointer crosses a new list row every other frame.
        if frame % 2 == 0 {
            let row = 100 + u32::try_from(frame / 2).unwrap_or(u32::MAX);
            dispatcher.enqueue(row, EventTypes::VIEW_HOVER_ENTER);
        }

        // Halfway through, the user switches to a service that ignores content changes.
        if frame == 30 {
            let mask = EventTypes::VIEW_HOVER_ENTER | EventTypes::VIEW_HOVER_EXIT;
            dispatcher.update_relevant_event_types(EventTypes::relevant_from_mask(mask.bits()));
            tracing::info!(now, "service mask changed");
        }
    }

    // Let trailing dispatches drain.
    let end = 60 * FRAME_MS + 1_000;
    dispatcher.advance_to(end);
    dispatcher.clear_queue();
    let counts = dispatcher.counts();
    drop(dispatcher);

    tracing::info!(?counts, delivered, "done");
}
