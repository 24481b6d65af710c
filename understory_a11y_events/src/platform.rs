// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform accessibility event types.
//!
//! Mobile accessibility APIs identify event types by single bits, and running
//! accessibility services announce which types they consume as a combined mask.
//! [`EventTypes`] models both: a single-bit value is an event kind usable with the
//! [`Dispatcher`](crate::Dispatcher), and a multi-bit value is a service mask.
//!
//! ```
//! use understory_a11y_events::{EventTypes, ThrottlePolicy};
//!
//! // Two services between them listen for scrolls and content changes.
//! let mask = (EventTypes::VIEW_SCROLLED | EventTypes::WINDOW_CONTENT_CHANGED).bits();
//! let relevant = EventTypes::relevant_from_mask(mask);
//! assert_eq!(relevant.len(), 2);
//! assert!(relevant.contains(&EventTypes::VIEW_SCROLLED));
//!
//! let policy = ThrottlePolicy::platform_default();
//! assert_eq!(policy.delay(EventTypes::VIEW_HOVER_ENTER), Some(50));
//! assert!(policy.is_view_independent(EventTypes::VIEW_HOVER_ENTER));
//! ```

use hashbrown::HashSet;

use crate::policy::ThrottlePolicy;

/// Default throttle window for scroll and content-change events, in milliseconds.
pub const DEFAULT_EVENT_DELAY_MS: u64 = 100;

/// Throttle window for hover-enter events, in milliseconds.
pub const HOVER_EVENT_DELAY_MS: u64 = 50;

bitflags::bitflags! {
    /// Accessibility event types, one bit per type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventTypes: u32 {
        /// A view was clicked.
        const VIEW_CLICKED = 1 << 0;
        /// A view was long-clicked.
        const VIEW_LONG_CLICKED = 1 << 1;
        /// A view was selected.
        const VIEW_SELECTED = 1 << 2;
        /// A view gained input focus.
        const VIEW_FOCUSED = 1 << 3;
        /// The text of an editable view changed.
        const VIEW_TEXT_CHANGED = 1 << 4;
        /// A window's state changed (opened, dialog shown, ...).
        const WINDOW_STATE_CHANGED = 1 << 5;
        /// A notification was posted.
        const NOTIFICATION_STATE_CHANGED = 1 << 6;
        /// The pointer entered a view while hovering.
        const VIEW_HOVER_ENTER = 1 << 7;
        /// The pointer left a view while hovering.
        const VIEW_HOVER_EXIT = 1 << 8;
        /// Touch exploration gesture started.
        const TOUCH_EXPLORATION_GESTURE_START = 1 << 9;
        /// Touch exploration gesture ended.
        const TOUCH_EXPLORATION_GESTURE_END = 1 << 10;
        /// The content of a window changed.
        const WINDOW_CONTENT_CHANGED = 1 << 11;
        /// A view was scrolled.
        const VIEW_SCROLLED = 1 << 12;
        /// The selection in an editable view changed.
        const VIEW_TEXT_SELECTION_CHANGED = 1 << 13;
        /// An announcement for the user.
        const ANNOUNCEMENT = 1 << 14;
        /// A view gained accessibility focus.
        const VIEW_ACCESSIBILITY_FOCUSED = 1 << 15;
        /// A view lost accessibility focus.
        const VIEW_ACCESSIBILITY_FOCUS_CLEARED = 1 << 16;
        /// Text was traversed at a movement granularity.
        const VIEW_TEXT_TRAVERSED_AT_MOVEMENT_GRANULARITY = 1 << 17;
        /// Gesture detection started.
        const GESTURE_DETECTION_START = 1 << 18;
        /// Gesture detection ended.
        const GESTURE_DETECTION_END = 1 << 19;
        /// The user started touching the screen.
        const TOUCH_INTERACTION_START = 1 << 20;
        /// The user stopped touching the screen.
        const TOUCH_INTERACTION_END = 1 << 21;
        /// The set of on-screen windows changed.
        const WINDOWS_CHANGED = 1 << 22;
        /// A view was context-clicked.
        const VIEW_CONTEXT_CLICKED = 1 << 23;
        /// The assistant requested reading context.
        const ASSIST_READING_CONTEXT = 1 << 24;
    }
}

impl EventTypes {
    /// Requesting any of these marks a service as a screen reader or comparable assistive
    /// technology.
    pub const SCREEN_READER_EVENTS: Self = Self::VIEW_SELECTED
        .union(Self::VIEW_SCROLLED)
        .union(Self::ANNOUNCEMENT);

    /// Services requesting nothing beyond these are likely password managers.
    pub const PASSWORD_MANAGER_EVENTS: Self = Self::VIEW_CLICKED
        .union(Self::VIEW_FOCUSED)
        .union(Self::VIEW_TEXT_CHANGED)
        .union(Self::WINDOW_STATE_CHANGED)
        .union(Self::WINDOW_CONTENT_CHANGED);

    /// Split a mask into its single-bit kinds, lowest bit first.
    ///
    /// Bits without a named flag are kept as kinds of their own.
    pub fn kinds(self) -> impl Iterator<Item = Self> {
        let mut rest = self.bits();
        core::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let bit = 1_u32 << rest.trailing_zeros();
            rest &= !bit;
            Some(Self::from_bits_retain(bit))
        })
    }

    /// The relevant set for a combined service event mask.
    pub fn relevant_from_mask(mask: u32) -> HashSet<Self> {
        Self::from_bits_retain(mask).kinds().collect()
    }

    /// Returns `true` if this service mask requests screen-reader events.
    pub fn requests_screen_reader_events(self) -> bool {
        self.intersects(Self::SCREEN_READER_EVENTS)
    }

    /// Returns `true` if this service mask is non-empty and requests only password-manager
    /// events.
    pub fn is_password_manager_only(self) -> bool {
        !self.is_empty() && Self::PASSWORD_MANAGER_EVENTS.contains(self)
    }
}

impl ThrottlePolicy<EventTypes> {
    /// The platform bridge's standard throttling.
    ///
    /// Scrolls and content changes are throttled per node at
    /// [`DEFAULT_EVENT_DELAY_MS`]. Hover-enter is throttled at [`HOVER_EVENT_DELAY_MS`] and
    /// coalesced across all nodes, since only the node under the pointer matters.
    pub fn platform_default() -> Self {
        Self::new()
            .with_delay(EventTypes::VIEW_SCROLLED, DEFAULT_EVENT_DELAY_MS)
            .with_delay(EventTypes::WINDOW_CONTENT_CHANGED, DEFAULT_EVENT_DELAY_MS)
            .with_delay(EventTypes::VIEW_HOVER_ENTER, HOVER_EVENT_DELAY_MS)
            .with_view_independent(EventTypes::VIEW_HOVER_ENTER)
    }
}
