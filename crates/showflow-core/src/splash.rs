//! Splash sequencer.
//!
//! Owns the single delayed transition from the splash screen to content:
//!
//! ```text
//! Showing --(splash delay, not cancelled)--> Dismissed
//! ```
//!
//! `start()` always re-arms from `Showing`, so calling it again (launch,
//! resume) replays the splash in full.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, trace};

use crate::common::{InstanceId, TimerId, TimerSeq, TimerSlot, TimerState};
use crate::effects::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplashState {
    #[default]
    Showing,
    Dismissed,
}

#[derive(Debug)]
pub struct SplashSequencer {
    instance: InstanceId,
    state: SplashState,
    timer: TimerState,
    delay: Duration,
}

impl SplashSequencer {
    pub fn new(delay: Duration) -> Self {
        Self {
            instance: InstanceId::new(),
            state: SplashState::Showing,
            timer: TimerState::default(),
            delay,
        }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn state(&self) -> SplashState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn timer(&self) -> &TimerState {
        &self.timer
    }

    /// Shows the splash and arms its dismissal, cancelling any pending one.
    pub fn start(&mut self, seq: &mut TimerSeq) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.state = SplashState::Showing;
        self.timer
            .arm(TimerSlot::Splash, seq, self.delay, &mut effects);
        info!(instance = %self.instance, "splash shown");
        effects
    }

    /// Resume from background: the splash always replays.
    pub fn on_lifecycle_active(&mut self, seq: &mut TimerSeq) -> Vec<Effect> {
        self.start(seq)
    }

    /// Cancels the pending dismissal without touching the visible state.
    pub fn suspend(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.timer.disarm(TimerSlot::Splash, &mut effects);
        effects
    }

    /// Handles a splash timer firing.
    ///
    /// Returns true only when this firing dismissed the splash, which is the
    /// "content" signal the flow waits for.
    pub fn on_timer_fired(&mut self, id: TimerId) -> bool {
        if !self.timer.finish_if_active(id) {
            trace!(%id, "stale splash timer ignored");
            return false;
        }
        if self.state == SplashState::Dismissed {
            return false;
        }
        self.state = SplashState::Dismissed;
        info!(instance = %self.instance, "splash dismissed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_splash_dismisses_exactly_at_delay() {
        let mut seq = TimerSeq::default();
        let mut clock = VirtualClock::new();
        let mut splash = SplashSequencer::new(ms(2000));
        let mut dismissals = 0;

        clock.apply(splash.start(&mut seq));
        clock.advance(ms(1900), |_, id| {
            dismissals += u32::from(splash.on_timer_fired(id));
            Vec::new()
        });
        assert_eq!(splash.state(), SplashState::Showing);

        clock.advance(ms(100), |_, id| {
            dismissals += u32::from(splash.on_timer_fired(id));
            Vec::new()
        });
        assert_eq!(splash.state(), SplashState::Dismissed);

        clock.advance(ms(5000), |_, id| {
            dismissals += u32::from(splash.on_timer_fired(id));
            Vec::new()
        });
        assert_eq!(dismissals, 1);
        assert!(!splash.timer().is_armed());
    }

    #[test]
    fn test_restart_rearms_from_showing() {
        let mut seq = TimerSeq::default();
        let mut clock = VirtualClock::new();
        let mut splash = SplashSequencer::new(ms(2000));

        clock.apply(splash.start(&mut seq));
        clock.advance(ms(1500), |_, id| {
            splash.on_timer_fired(id);
            Vec::new()
        });
        clock.apply(splash.on_lifecycle_active(&mut seq));

        // The first timer would have fired at 2.0s; only the new one at 3.5s counts.
        clock.advance(ms(1000), |_, id| {
            splash.on_timer_fired(id);
            Vec::new()
        });
        assert_eq!(splash.state(), SplashState::Showing);
        assert_eq!(clock.pending(), 1);

        clock.advance(ms(1000), |_, id| {
            splash.on_timer_fired(id);
            Vec::new()
        });
        assert_eq!(splash.state(), SplashState::Dismissed);
    }

    #[test]
    fn test_start_after_dismissal_shows_again() {
        let mut seq = TimerSeq::default();
        let mut splash = SplashSequencer::new(ms(2000));

        let effects = splash.start(&mut seq);
        let Some(Effect::ScheduleTimer { id, .. }) = effects.last() else {
            panic!("expected a scheduled timer");
        };
        assert!(splash.on_timer_fired(*id));

        splash.start(&mut seq);
        assert_eq!(splash.state(), SplashState::Showing);
        assert!(splash.timer().is_armed());
    }

    #[test]
    fn test_suspend_drops_pending_dismissal() {
        let mut seq = TimerSeq::default();
        let mut splash = SplashSequencer::new(ms(2000));

        let effects = splash.start(&mut seq);
        let Some(Effect::ScheduleTimer { id, .. }) = effects.last() else {
            panic!("expected a scheduled timer");
        };
        let cancel = splash.suspend();

        assert!(matches!(cancel.as_slice(), [Effect::CancelTimer { .. }]));
        assert!(!splash.on_timer_fired(*id));
        assert_eq!(splash.state(), SplashState::Showing);
    }
}
