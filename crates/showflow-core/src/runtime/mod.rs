//! Presentation runtime - owns the state, runs the event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces effects;
//! this module turns them into tokio timers and feeds firings back.
//!
//! ## Inbox Pattern
//!
//! - Hosts submit `HostEvent`s through a cloneable `HostHandle`
//! - Timer tasks send `HostEvent::TimerFired` to the same inbox
//! - The loop handles one event at a time, so the reducer never races itself
//!
//! After every event the current `PresentationView` is published on a
//! `watch` channel if it changed.

mod inbox;

use std::time::Duration;

use anyhow::{Context, Result};
use inbox::{HostEventReceiver, HostEventSender};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::common::{TimerId, TimerSlot};
use crate::config::TimingsConfig;
use crate::effects::Effect;
use crate::events::{HostEvent, UserAction};
use crate::state::Presentation;
use crate::update;
use crate::view::PresentationView;

/// Cloneable event submission interface for hosts.
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: HostEventSender,
}

impl HostHandle {
    pub fn send(&self, event: HostEvent) -> Result<()> {
        self.tx
            .send(event)
            .context("presentation runtime has stopped")
    }

    pub fn action(&self, action: UserAction) -> Result<()> {
        self.send(action.into())
    }

    pub fn quit(&self) -> Result<()> {
        self.send(HostEvent::Quit)
    }
}

pub struct FlowRuntime {
    state: Presentation,
    inbox_tx: HostEventSender,
    inbox_rx: HostEventReceiver,
    view_tx: watch::Sender<PresentationView>,
    should_quit: bool,
}

impl FlowRuntime {
    pub fn new(timings: &TimingsConfig) -> Self {
        let state = Presentation::new(timings);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(state.view());
        Self {
            state,
            inbox_tx,
            inbox_rx,
            view_tx,
            should_quit: false,
        }
    }

    pub fn handle(&self) -> HostHandle {
        HostHandle {
            tx: self.inbox_tx.clone(),
        }
    }

    /// Receiver for view snapshots. The current view is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<PresentationView> {
        self.view_tx.subscribe()
    }

    /// Launches the presentation and processes events until `Quit`.
    ///
    /// Returns the final state.
    pub async fn run(mut self) -> Presentation {
        let effects = self.state.launch();
        self.execute_effects(effects);
        self.publish();

        while !self.should_quit {
            // The runtime holds a sender itself, so the inbox never closes.
            let Some(event) = self.inbox_rx.recv().await else {
                break;
            };
            trace!(?event, "event");
            let effects = update::update(&mut self.state, &event);
            self.execute_effects(effects);
            self.publish();
        }

        debug!("runtime stopped");
        self.state
    }

    fn publish(&self) {
        let view = self.state.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                return false;
            }
            *current = view;
            true
        });
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScheduleTimer {
                slot,
                id,
                delay,
                cancel,
            } => self.spawn_timer(slot, id, delay, cancel),
            Effect::CancelTimer { token, .. } => {
                if let Some(token) = token {
                    token.cancel();
                }
            }
            Effect::Quit => {
                self.should_quit = true;
            }
        }
    }

    /// Sleeps for `delay`, then reports the firing unless cancelled first.
    fn spawn_timer(
        &self,
        slot: TimerSlot,
        id: TimerId,
        delay: Duration,
        cancel: CancellationToken,
    ) {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    trace!(%slot, %id, "timer task cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(HostEvent::TimerFired { slot, id });
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{Instant, timeout};

    use super::*;
    use crate::events::LifecyclePhase;
    use crate::flow::FlowStepState;
    use crate::view::Surface;

    async fn next_surface(views: &mut watch::Receiver<PresentationView>) -> Surface {
        views.changed().await.unwrap();
        views.borrow_and_update().surface
    }

    fn assert_elapsed(start: Instant, expected_ms: u64) {
        let elapsed = start.elapsed().as_millis() as u64;
        assert!(
            (expected_ms..expected_ms + 5).contains(&elapsed),
            "expected ~{expected_ms}ms, got {elapsed}ms"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_publishes_transitions_on_time() {
        let runtime = FlowRuntime::new(&TimingsConfig::default());
        let handle = runtime.handle();
        let mut views = runtime.subscribe();
        let start = Instant::now();
        let task = tokio::spawn(runtime.run());

        assert_eq!(next_surface(&mut views).await, Surface::Main);
        assert_elapsed(start, 2000);

        assert_eq!(next_surface(&mut views).await, Surface::BottomSheet);
        assert_elapsed(start, 3600);

        handle.send(HostEvent::SheetDismissed).unwrap();
        assert_eq!(next_surface(&mut views).await, Surface::Main);
        assert_eq!(next_surface(&mut views).await, Surface::ConsultantPopup);
        assert_elapsed(start, 5200);

        handle.quit().unwrap();
        let state = task.await.unwrap();
        assert_eq!(state.flow.step(), FlowStepState::PopupVisible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_cancels_pending_sheet() {
        let runtime = FlowRuntime::new(&TimingsConfig::default());
        let handle = runtime.handle();
        let mut views = runtime.subscribe();
        let task = tokio::spawn(runtime.run());

        assert_eq!(next_surface(&mut views).await, Surface::Main);
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle
            .send(HostEvent::Lifecycle(LifecyclePhase::Background))
            .unwrap();

        let waited = timeout(Duration::from_secs(5), views.changed()).await;
        assert!(waited.is_err(), "no surface change expected while suspended");

        handle
            .send(HostEvent::Lifecycle(LifecyclePhase::Active))
            .unwrap();
        assert_eq!(next_surface(&mut views).await, Surface::Splash);
        assert_eq!(next_surface(&mut views).await, Surface::Main);

        handle.quit().unwrap();
        let state = task.await.unwrap();
        assert_eq!(state.flow.armed_timers(), vec![TimerSlot::Sheet]);
    }

    #[tokio::test]
    async fn test_handle_errors_after_runtime_dropped() {
        let runtime = FlowRuntime::new(&TimingsConfig::default());
        let handle = runtime.handle();
        drop(runtime);

        assert!(handle.action(UserAction::SurfaceTapped).is_err());
    }
}
