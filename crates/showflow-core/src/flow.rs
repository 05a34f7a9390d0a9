//! Flow sequencer.
//!
//! Drives the chain of delayed presentations that follows the splash:
//!
//! ```text
//! Idle --(sheet delay)--> SheetVisible
//! SheetVisible --(dismiss)--> Idle --(popup delay)--> PopupVisible
//! PopupVisible --(close)--> Idle --(promo delay)--> PromoVisible
//! PromoVisible --(close)--> ErrorArmed
//! ErrorArmed --(tap)--> alert shown (step unchanged)
//! ```
//!
//! Every operation is guarded: calls that do not apply to the current step
//! are silent no-ops. Step N+1's timer is armed only from the handler of
//! step N's close event, so the chain cannot run ahead of the user.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::common::{InstanceId, TimerId, TimerSeq, TimerSlot, TimerState};
use crate::effects::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStepState {
    #[default]
    Idle,
    SheetVisible,
    PopupVisible,
    PromoVisible,
    ErrorArmed,
}

impl FlowStepState {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowStepState::Idle => "idle",
            FlowStepState::SheetVisible => "sheet_visible",
            FlowStepState::PopupVisible => "popup_visible",
            FlowStepState::PromoVisible => "promo_visible",
            FlowStepState::ErrorArmed => "error_armed",
        }
    }
}

/// Delays between the steps of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimings {
    /// Main screen shown → bottom sheet.
    pub sheet: Duration,
    /// Sheet dismissed → consultant popup.
    pub popup: Duration,
    /// Popup closed → promo screen.
    pub promo: Duration,
}

impl Default for FlowTimings {
    fn default() -> Self {
        let step = Duration::from_millis(1600);
        Self {
            sheet: step,
            popup: step,
            promo: step,
        }
    }
}

#[derive(Debug)]
pub struct FlowSequencer {
    instance: InstanceId,
    step: FlowStepState,
    alert_shown: bool,
    timings: FlowTimings,
    sheet: TimerState,
    popup: TimerState,
    promo: TimerState,
}

impl FlowSequencer {
    pub fn new(timings: FlowTimings) -> Self {
        Self {
            instance: InstanceId::new(),
            step: FlowStepState::Idle,
            alert_shown: false,
            timings,
            sheet: TimerState::default(),
            popup: TimerState::default(),
            promo: TimerState::default(),
        }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn step(&self) -> FlowStepState {
        self.step
    }

    pub fn error_armed(&self) -> bool {
        self.step == FlowStepState::ErrorArmed
    }

    pub fn alert_shown(&self) -> bool {
        self.alert_shown
    }

    /// Slots that currently hold a live timer.
    pub fn armed_timers(&self) -> Vec<TimerSlot> {
        [
            (TimerSlot::Sheet, &self.sheet),
            (TimerSlot::Popup, &self.popup),
            (TimerSlot::Promo, &self.promo),
        ]
        .into_iter()
        .filter(|(_, timer)| timer.is_armed())
        .map(|(slot, _)| slot)
        .collect()
    }

    /// Cancels every timer and returns to a clean `Idle`.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.sheet.disarm(TimerSlot::Sheet, &mut effects);
        self.popup.disarm(TimerSlot::Popup, &mut effects);
        self.promo.disarm(TimerSlot::Promo, &mut effects);
        self.step = FlowStepState::Idle;
        self.alert_shown = false;
        debug!(instance = %self.instance, "flow reset");
        effects
    }

    /// Starts a new generation: reset, then arm the sheet timer.
    pub fn begin(&mut self, seq: &mut TimerSeq) -> Vec<Effect> {
        let mut effects = self.reset();
        self.sheet
            .arm(TimerSlot::Sheet, seq, self.timings.sheet, &mut effects);
        info!(instance = %self.instance, "flow started");
        effects
    }

    pub fn on_lifecycle_active(&mut self, seq: &mut TimerSeq) -> Vec<Effect> {
        self.begin(seq)
    }

    pub fn on_sheet_dismissed(&mut self, seq: &mut TimerSeq) -> Vec<Effect> {
        if self.step != FlowStepState::SheetVisible {
            trace!(step = self.step.as_str(), "sheet dismiss ignored");
            return Vec::new();
        }
        let mut effects = Vec::new();
        self.step = FlowStepState::Idle;
        self.sheet.disarm(TimerSlot::Sheet, &mut effects);
        self.popup
            .arm(TimerSlot::Popup, seq, self.timings.popup, &mut effects);
        info!(instance = %self.instance, "bottom sheet dismissed");
        effects
    }

    pub fn on_popup_closed(&mut self, seq: &mut TimerSeq) -> Vec<Effect> {
        if self.step != FlowStepState::PopupVisible {
            trace!(step = self.step.as_str(), "popup close ignored");
            return Vec::new();
        }
        let mut effects = Vec::new();
        self.step = FlowStepState::Idle;
        self.popup.disarm(TimerSlot::Popup, &mut effects);
        self.promo
            .arm(TimerSlot::Promo, seq, self.timings.promo, &mut effects);
        info!(instance = %self.instance, "consultant popup closed");
        effects
    }

    pub fn on_promo_closed(&mut self) -> Vec<Effect> {
        if self.step != FlowStepState::PromoVisible {
            trace!(step = self.step.as_str(), "promo close ignored");
            return Vec::new();
        }
        let mut effects = Vec::new();
        self.promo.disarm(TimerSlot::Promo, &mut effects);
        self.step = FlowStepState::ErrorArmed;
        info!(instance = %self.instance, "promo closed, error armed");
        effects
    }

    /// Shows the error alert. Returns true if the tap did anything.
    pub fn on_surface_tap(&mut self) -> bool {
        if !self.error_armed() || self.alert_shown {
            trace!(
                step = self.step.as_str(),
                alert_shown = self.alert_shown,
                "tap ignored"
            );
            return false;
        }
        self.alert_shown = true;
        info!(instance = %self.instance, "error alert shown");
        true
    }

    /// Hides the alert. The flow stays armed, so the next tap shows it again.
    pub fn on_alert_acknowledged(&mut self) -> bool {
        if !self.alert_shown {
            trace!("acknowledge ignored, no alert showing");
            return false;
        }
        self.alert_shown = false;
        info!(instance = %self.instance, "error alert acknowledged");
        true
    }

    /// Handles a flow timer firing. Returns true if the step changed.
    pub fn on_timer_fired(&mut self, slot: TimerSlot, id: TimerId) -> bool {
        let (timer, target) = match slot {
            TimerSlot::Sheet => (&mut self.sheet, FlowStepState::SheetVisible),
            TimerSlot::Popup => (&mut self.popup, FlowStepState::PopupVisible),
            TimerSlot::Promo => (&mut self.promo, FlowStepState::PromoVisible),
            TimerSlot::Splash => return false,
        };
        if !timer.finish_if_active(id) {
            trace!(%slot, %id, "stale flow timer ignored");
            return false;
        }
        if self.step != FlowStepState::Idle {
            trace!(%slot, %id, step = self.step.as_str(), "flow timer consumed out of step");
            return false;
        }
        self.step = target;
        info!(instance = %self.instance, step = target.as_str(), "flow advanced");
        true
    }
}
