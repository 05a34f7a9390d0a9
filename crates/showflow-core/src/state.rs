//! Presentation state (composition root).
//!
//! Owns one splash and one flow sequencer, the timer id sequence they share,
//! and the lifecycle phase. All mutation goes through `update::update`.

use std::mem;
use std::time::Duration;

use tracing::info;

use crate::common::TimerSeq;
use crate::config::TimingsConfig;
use crate::effects::Effect;
use crate::events::LifecyclePhase;
use crate::flow::{FlowSequencer, FlowTimings};
use crate::splash::{SplashSequencer, SplashState};
use crate::view::{PresentationView, Surface};

#[derive(Debug)]
pub struct Presentation {
    pub splash: SplashSequencer,
    pub flow: FlowSequencer,
    pub phase: LifecyclePhase,
    pub(crate) seq: TimerSeq,
    splash_delay: Duration,
    flow_timings: FlowTimings,
    crossfade: Duration,
}

impl Presentation {
    pub fn new(timings: &TimingsConfig) -> Self {
        let splash_delay = timings.splash();
        let flow_timings = timings.flow();
        Self {
            splash: SplashSequencer::new(splash_delay),
            flow: FlowSequencer::new(flow_timings),
            phase: LifecyclePhase::Active,
            seq: TimerSeq::default(),
            splash_delay,
            flow_timings,
            crossfade: timings.crossfade(),
        }
    }

    /// First appearance: shows the splash and arms its dismissal.
    pub fn launch(&mut self) -> Vec<Effect> {
        info!("presentation launched");
        self.splash.start(&mut self.seq)
    }

    /// Replaces both sequencers with fresh instances and replays the splash.
    ///
    /// Timers owned by the outgoing instances are cancelled first.
    pub(crate) fn restart(&mut self) -> Vec<Effect> {
        let mut old_splash = mem::replace(&mut self.splash, SplashSequencer::new(self.splash_delay));
        let mut old_flow = mem::replace(&mut self.flow, FlowSequencer::new(self.flow_timings));
        let mut effects = old_splash.suspend();
        effects.extend(old_flow.reset());

        info!(
            splash = %self.splash.instance(),
            flow = %self.flow.instance(),
            "presentation restarted"
        );
        effects.extend(self.splash.on_lifecycle_active(&mut self.seq));
        effects
    }

    /// The splash handed over to content: start a fresh flow generation.
    pub(crate) fn start_flow(&mut self) -> Vec<Effect> {
        let mut old_flow = mem::replace(&mut self.flow, FlowSequencer::new(self.flow_timings));
        let mut effects = old_flow.reset();
        effects.extend(self.flow.begin(&mut self.seq));
        effects
    }

    pub fn view(&self) -> PresentationView {
        let splash = self.splash.state();
        let step = self.flow.step();
        let alert_shown = self.flow.alert_shown();
        PresentationView {
            surface: Surface::derive(splash, step, alert_shown),
            splash,
            step,
            error_armed: self.flow.error_armed(),
            alert_shown,
            status_bar_hidden: splash == SplashState::Dismissed,
            splash_instance: self.splash.instance(),
            flow_instance: self.flow.instance(),
            crossfade_ms: self.crossfade.as_millis() as u64,
        }
    }
}
