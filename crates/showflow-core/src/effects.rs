//! Effect types.
//!
//! Effects are commands returned by the reducer that a scheduler executes.
//! The reducer never sleeps or spawns: it mutates sequencer state and hands
//! back what has to happen on the clock.
//!
//! ## Cancellation
//!
//! `CancelTimer` carries the token that was handed out with the matching
//! `ScheduleTimer`. Executing it is best effort: the reducer also drops any
//! firing whose id is no longer live, so a timer that fires between the cancel
//! request and its delivery still cannot touch state.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::common::{TimerId, TimerSlot};

#[derive(Debug)]
pub enum Effect {
    /// Deliver `HostEvent::TimerFired { slot, id }` after `delay`, unless
    /// `cancel` is cancelled first.
    ScheduleTimer {
        slot: TimerSlot,
        id: TimerId,
        delay: Duration,
        cancel: CancellationToken,
    },

    /// Cancel a previously scheduled timer.
    CancelTimer {
        slot: TimerSlot,
        id: TimerId,
        token: Option<CancellationToken>,
    },

    /// Stop the host loop.
    Quit,
}
