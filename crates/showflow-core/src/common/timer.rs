//! Timer slot bookkeeping.
//!
//! Every delayed transition is armed into a named slot. A slot holds at most
//! one live timer: arming replaces (and cancels) whatever was there, and a
//! firing is accepted only while its id is still the slot's live id.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::effects::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source shared by every sequencer of a presentation.
///
/// Ids are never reused, so a firing from an earlier generation (or an
/// earlier sequencer instance) can never match a live slot.
#[derive(Debug, Default)]
pub struct TimerSeq {
    next: u64,
}

impl TimerSeq {
    pub fn next_id(&mut self) -> TimerId {
        let id = TimerId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerSlot {
    Splash,
    Sheet,
    Popup,
    Promo,
}

impl TimerSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerSlot::Splash => "splash",
            TimerSlot::Sheet => "sheet",
            TimerSlot::Popup => "popup",
            TimerSlot::Promo => "promo",
        }
    }
}

impl fmt::Display for TimerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timer lifecycle state for one slot (owned by a sequencer, mutated only by
/// the reducer).
#[derive(Debug, Default, Clone)]
pub struct TimerState {
    pub active: Option<TimerId>,
    pub cancel: Option<CancellationToken>,
}

impl TimerState {
    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    /// Arms a fresh timer for `slot`, cancelling any timer still live in it.
    ///
    /// Pushes the cancel (if needed) and schedule effects, in that order.
    pub fn arm(
        &mut self,
        slot: TimerSlot,
        seq: &mut TimerSeq,
        delay: Duration,
        effects: &mut Vec<Effect>,
    ) -> TimerId {
        self.disarm(slot, effects);

        let id = seq.next_id();
        let cancel = CancellationToken::new();
        self.active = Some(id);
        self.cancel = Some(cancel.clone());
        debug!(%slot, %id, delay_ms = delay.as_millis() as u64, "timer armed");
        effects.push(Effect::ScheduleTimer {
            slot,
            id,
            delay,
            cancel,
        });
        id
    }

    /// Cancels the live timer, if any. Does nothing on an empty slot.
    pub fn disarm(&mut self, slot: TimerSlot, effects: &mut Vec<Effect>) {
        let Some(id) = self.active.take() else {
            self.cancel = None;
            return;
        };
        debug!(%slot, %id, "timer cancelled");
        effects.push(Effect::CancelTimer {
            slot,
            id,
            token: self.cancel.take(),
        });
    }

    /// Consumes the live timer if `id` matches it.
    ///
    /// Returns false for stale firings (cancelled, replaced, or from another
    /// generation); the caller must then leave its state untouched.
    pub fn finish_if_active(&mut self, id: TimerId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
            self.cancel = None;
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_replaces_live_timer() {
        let mut seq = TimerSeq::default();
        let mut state = TimerState::default();
        let mut effects = Vec::new();

        let first = state.arm(TimerSlot::Sheet, &mut seq, Duration::from_secs(1), &mut effects);
        let second = state.arm(TimerSlot::Sheet, &mut seq, Duration::from_secs(1), &mut effects);

        assert_ne!(first, second);
        assert_eq!(state.active, Some(second));
        assert_eq!(effects.len(), 3);
        assert!(matches!(
            &effects[1],
            Effect::CancelTimer { id, token: Some(token), .. } if *id == first && !token.is_cancelled()
        ));
        assert!(!state.finish_if_active(first));
        assert!(state.finish_if_active(second));
        assert!(!state.is_armed());
    }

    #[test]
    fn test_disarm_on_empty_slot_emits_nothing() {
        let mut state = TimerState::default();
        let mut effects = Vec::new();

        state.disarm(TimerSlot::Popup, &mut effects);

        assert!(effects.is_empty());
    }

    #[test]
    fn test_finish_consumes_once() {
        let mut seq = TimerSeq::default();
        let mut state = TimerState::default();
        let id = state.arm(TimerSlot::Promo, &mut seq, Duration::ZERO, &mut Vec::new());

        assert!(state.finish_if_active(id));
        assert!(!state.finish_if_active(id));
    }
}
