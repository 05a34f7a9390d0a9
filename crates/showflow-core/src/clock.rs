//! Deterministic clock for driving the reducer without real time.
//!
//! `VirtualClock` executes the timer effects of the reducer against a manual
//! clock. Firings are delivered in deadline order (ties by id, which is
//! arming order), and a firing may schedule further timers that are honoured
//! within the same `advance` call.
//!
//! The racy variant keeps cancelled timers queued and delivers them anyway.
//! It models a firing that was already in flight when the cancel arrived.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::common::{TimerId, TimerSlot};
use crate::effects::Effect;

#[derive(Debug)]
struct Scheduled {
    due: Duration,
    slot: TimerSlot,
    id: TimerId,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Duration,
    queue: Vec<Scheduled>,
    racy: bool,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that ignores cancellation and delivers every scheduled timer.
    pub fn racy() -> Self {
        Self {
            racy: true,
            ..Self::default()
        }
    }

    /// Time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.iter().map(|s| s.due).min()
    }

    /// Executes reducer effects against this clock.
    pub fn apply(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleTimer {
                    slot,
                    id,
                    delay,
                    cancel,
                } => {
                    self.queue.push(Scheduled {
                        due: self.now + delay,
                        slot,
                        id,
                        cancel,
                    });
                }
                Effect::CancelTimer { id, token, .. } => {
                    if let Some(token) = token {
                        token.cancel();
                    }
                    if !self.racy {
                        self.queue.retain(|s| s.id != id);
                    }
                }
                Effect::Quit => trace!("quit ignored by virtual clock"),
            }
        }
    }

    /// Pops the next timer due at or before `until`, moving the clock to its
    /// deadline. When nothing is due the clock moves to `until` and `None` is
    /// returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerSlot, TimerId)> {
        loop {
            let next = self
                .queue
                .iter()
                .enumerate()
                .filter(|(_, s)| s.due <= until)
                .min_by_key(|(_, s)| (s.due, s.id))
                .map(|(idx, _)| idx);

            let Some(idx) = next else {
                self.now = self.now.max(until);
                return None;
            };

            let scheduled = self.queue.swap_remove(idx);
            self.now = scheduled.due;
            if scheduled.cancel.is_cancelled() && !self.racy {
                trace!(slot = %scheduled.slot, id = %scheduled.id, "cancelled timer skipped");
                continue;
            }
            return Some((scheduled.slot, scheduled.id));
        }
    }

    /// Moves the clock forward by `by`, delivering every timer that falls due.
    ///
    /// Effects returned by `on_fire` are applied immediately. Returns the
    /// number of firings delivered.
    pub fn advance<F>(&mut self, by: Duration, mut on_fire: F) -> usize
    where
        F: FnMut(TimerSlot, TimerId) -> Vec<Effect>,
    {
        let until = self.now + by;
        let mut fired = 0;
        while let Some((slot, id)) = self.pop_due(until) {
            fired += 1;
            let effects = on_fire(slot, id);
            self.apply(effects);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{TimerSeq, TimerState};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut seq = TimerSeq::default();
        let mut clock = VirtualClock::new();
        let mut effects = Vec::new();
        TimerState::default().arm(TimerSlot::Popup, &mut seq, ms(300), &mut effects);
        TimerState::default().arm(TimerSlot::Sheet, &mut seq, ms(100), &mut effects);
        clock.apply(effects);

        let mut order = Vec::new();
        let fired = clock.advance(ms(1000), |slot, _| {
            order.push(slot);
            Vec::new()
        });

        assert_eq!(fired, 2);
        assert_eq!(order, vec![TimerSlot::Sheet, TimerSlot::Popup]);
        assert_eq!(clock.now(), ms(1000));
    }

    #[test]
    fn test_chained_timer_fires_within_same_advance() {
        let mut seq = TimerSeq::default();
        let mut clock = VirtualClock::new();
        let mut first = Vec::new();
        TimerState::default().arm(TimerSlot::Sheet, &mut seq, ms(100), &mut first);
        clock.apply(first);

        let mut seen = Vec::new();
        clock.advance(ms(250), |slot, _| {
            seen.push(slot);
            let mut next = Vec::new();
            if slot == TimerSlot::Sheet {
                TimerState::default().arm(TimerSlot::Popup, &mut seq, ms(100), &mut next);
            }
            next
        });

        assert_eq!(seen, vec![TimerSlot::Sheet, TimerSlot::Popup]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_cancel_removes_timer_unless_racy() {
        for (mut clock, expected) in [(VirtualClock::new(), 0), (VirtualClock::racy(), 1)] {
            let mut seq = TimerSeq::default();
            let mut timer = TimerState::default();
            let mut effects = Vec::new();
            timer.arm(TimerSlot::Promo, &mut seq, ms(100), &mut effects);
            timer.disarm(TimerSlot::Promo, &mut effects);
            clock.apply(effects);

            assert_eq!(clock.advance(ms(200), |_, _| Vec::new()), expected);
        }
    }
}
