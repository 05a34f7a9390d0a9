//! Reducer.
//!
//! `update` is the only place presentation state changes. It never blocks or
//! spawns; whatever must happen on the clock comes back as `Effect`s.

use tracing::{debug, info, trace};

use crate::common::TimerSlot;
use crate::effects::Effect;
use crate::events::{HostEvent, LifecyclePhase};
use crate::splash::SplashState;
use crate::state::Presentation;

pub fn update(app: &mut Presentation, event: &HostEvent) -> Vec<Effect> {
    match event {
        HostEvent::Lifecycle(LifecyclePhase::Background) => handle_background(app),
        HostEvent::Lifecycle(LifecyclePhase::Active) => handle_active(app),
        HostEvent::TimerFired { slot, id } => {
            debug!(%slot, %id, "timer fired");
            match slot {
                TimerSlot::Splash => {
                    if app.splash.on_timer_fired(*id) {
                        app.start_flow()
                    } else {
                        Vec::new()
                    }
                }
                TimerSlot::Sheet | TimerSlot::Popup | TimerSlot::Promo => {
                    app.flow.on_timer_fired(*slot, *id);
                    Vec::new()
                }
            }
        }
        HostEvent::Quit => vec![Effect::Quit],
        user_event => handle_user_event(app, user_event),
    }
}

fn handle_background(app: &mut Presentation) -> Vec<Effect> {
    if app.phase == LifecyclePhase::Background {
        trace!("already in background");
        return Vec::new();
    }
    app.phase = LifecyclePhase::Background;
    info!("moved to background, timers suspended");

    let mut effects = app.splash.suspend();
    effects.extend(app.flow.reset());
    effects
}

fn handle_active(app: &mut Presentation) -> Vec<Effect> {
    if app.phase == LifecyclePhase::Active {
        trace!("active without prior background, ignored");
        return Vec::new();
    }
    app.phase = LifecyclePhase::Active;
    info!("resumed from background");
    app.restart()
}

fn handle_user_event(app: &mut Presentation, event: &HostEvent) -> Vec<Effect> {
    if app.splash.state() == SplashState::Showing {
        trace!(?event, "user event ignored while splash is showing");
        return Vec::new();
    }
    if app.phase == LifecyclePhase::Background {
        trace!(?event, "user event ignored in background");
        return Vec::new();
    }

    match event {
        HostEvent::SheetDismissed => app.flow.on_sheet_dismissed(&mut app.seq),
        HostEvent::PopupClosed => app.flow.on_popup_closed(&mut app.seq),
        HostEvent::PromoClosed => app.flow.on_promo_closed(),
        HostEvent::SurfaceTapped => {
            let surface = app.view().surface;
            if surface.is_modal() {
                trace!(%surface, "tap swallowed by modal surface");
            } else {
                app.flow.on_surface_tap();
            }
            Vec::new()
        }
        HostEvent::AlertAcknowledged => {
            app.flow.on_alert_acknowledged();
            Vec::new()
        }
        HostEvent::Lifecycle(_) | HostEvent::TimerFired { .. } | HostEvent::Quit => Vec::new(),
    }
}
