//! Timed event scripts replayed on the virtual clock.
//!
//! ```toml
//! until = 12.0
//!
//! [[step]]
//! at = 3.6
//! event = "sheet_dismissed"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::VirtualClock;
use crate::config::{TimingsConfig, secs_to_duration};
use crate::events::{HostEvent, UserAction};
use crate::state::Presentation;
use crate::update::update;
use crate::view::PresentationView;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// End of the simulation in seconds. Without it the replay runs until no
    /// timer is left after the last step.
    pub until: Option<f64>,
    #[serde(default)]
    pub step: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Seconds since launch.
    pub at: f64,
    pub event: UserAction,
}

impl Script {
    pub fn parse(contents: &str) -> Result<Self> {
        let script: Script = toml::from_str(contents).context("Failed to parse script")?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script from {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid script {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        let mut previous = 0.0_f64;
        for (idx, step) in self.step.iter().enumerate() {
            let n = idx + 1;
            if !step.at.is_finite() || step.at < 0.0 {
                bail!("step {n} ({}): time must be zero or more seconds, got {}", step.event, step.at);
            }
            if step.at < previous {
                bail!(
                    "step {n} ({}): at = {} comes before the previous step at {previous}",
                    step.event,
                    step.at
                );
            }
            previous = step.at;
        }
        if let Some(until) = self.until {
            if !until.is_finite() || until < previous {
                bail!("until = {until} must be a finite time not before the last step ({previous})");
            }
        }
        Ok(())
    }
}

/// One observed change of the presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub at_ms: u64,
    /// What caused the change: `launch`, a user action, or `timer:<slot>`.
    pub cause: String,
    pub view: PresentationView,
}

impl TimelineEntry {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

/// Replays `script` from launch and returns every view change.
pub fn simulate(script: &Script, timings: &TimingsConfig) -> Vec<TimelineEntry> {
    let mut sim = Simulation::new(timings);
    for step in &script.step {
        sim.run_until(secs_to_duration(step.at));
        debug!(at = step.at, event = %step.event, "script step");
        let effects = update(&mut sim.app, &HostEvent::from(step.event));
        sim.clock.apply(effects);
        sim.record(step.event.name().to_string());
    }

    match script.until {
        Some(until) => sim.run_until(secs_to_duration(until)),
        None => {
            while let Some(deadline) = sim.clock.next_deadline() {
                sim.run_until(deadline);
            }
        }
    }
    sim.timeline
}

struct Simulation {
    app: Presentation,
    clock: VirtualClock,
    last: PresentationView,
    timeline: Vec<TimelineEntry>,
}

impl Simulation {
    fn new(timings: &TimingsConfig) -> Self {
        let mut app = Presentation::new(timings);
        let mut clock = VirtualClock::new();
        clock.apply(app.launch());
        let last = app.view();
        let timeline = vec![TimelineEntry {
            at_ms: 0,
            cause: "launch".to_string(),
            view: last.clone(),
        }];
        Self {
            app,
            clock,
            last,
            timeline,
        }
    }

    fn run_until(&mut self, until: Duration) {
        while let Some((slot, id)) = self.clock.pop_due(until) {
            let effects = update(&mut self.app, &HostEvent::TimerFired { slot, id });
            self.clock.apply(effects);
            self.record(format!("timer:{slot}"));
        }
    }

    fn record(&mut self, cause: String) {
        let view = self.app.view();
        if view == self.last {
            return;
        }
        self.timeline.push(TimelineEntry {
            at_ms: self.clock.now().as_millis() as u64,
            cause,
            view: view.clone(),
        });
        self.last = view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowStepState;
    use crate::view::Surface;

    fn surfaces(timeline: &[TimelineEntry]) -> Vec<(u64, Surface)> {
        timeline.iter().map(|e| (e.at_ms, e.view.surface)).collect()
    }

    #[test]
    fn test_parse_script() {
        let script = Script::parse(
            r#"
until = 10.0

[[step]]
at = 3.6
event = "sheet_dismissed"

[[step]]
at = 3.6
event = "surface_tapped"
"#,
        )
        .unwrap();

        assert_eq!(script.until, Some(10.0));
        assert_eq!(script.step.len(), 2);
        assert_eq!(script.step[0].event, UserAction::SheetDismissed);
    }

    #[test]
    fn test_parse_rejects_out_of_order_steps() {
        let err = Script::parse(
            r#"
[[step]]
at = 4.0
event = "sheet_dismissed"

[[step]]
at = 3.0
event = "popup_closed"
"#,
        )
        .unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("step 2"), "{message}");
        assert!(message.contains("popup_closed"), "{message}");
    }

    #[test]
    fn test_parse_rejects_negative_time() {
        let err = Script::parse("[[step]]\nat = -1.0\nevent = \"background\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("step 1"));
    }

    #[test]
    fn test_parse_rejects_unknown_event() {
        assert!(Script::parse("[[step]]\nat = 1.0\nevent = \"explode\"\n").is_err());
    }

    #[test]
    fn test_parse_rejects_until_before_last_step() {
        let err = Script::parse("until = 1.0\n[[step]]\nat = 2.0\nevent = \"background\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("until"));
    }

    #[test]
    fn test_empty_script_settles_on_sheet() {
        let script = Script::parse("").unwrap();
        let timeline = simulate(&script, &TimingsConfig::default());

        assert_eq!(
            surfaces(&timeline),
            vec![
                (0, Surface::Splash),
                (2000, Surface::Main),
                (3600, Surface::BottomSheet),
            ]
        );
        assert_eq!(timeline[1].cause, "timer:splash");
    }

    #[test]
    fn test_full_scripted_chain() {
        let script = Script::parse(
            r#"
until = 12.0

[[step]]
at = 4.0
event = "sheet_dismissed"

[[step]]
at = 6.0
event = "popup_closed"

[[step]]
at = 8.0
event = "promo_closed"

[[step]]
at = 9.0
event = "surface_tapped"
"#,
        )
        .unwrap();

        let timeline = simulate(&script, &TimingsConfig::default());

        assert_eq!(
            surfaces(&timeline),
            vec![
                (0, Surface::Splash),
                (2000, Surface::Main),
                (3600, Surface::BottomSheet),
                (4000, Surface::Main),
                (5600, Surface::ConsultantPopup),
                (6000, Surface::Main),
                (7600, Surface::PromoFullScreen),
                (8000, Surface::Main),
                (9000, Surface::ErrorAlert),
            ]
        );
        let last = timeline.last().unwrap();
        assert_eq!(last.view.step, FlowStepState::ErrorArmed);
        assert_eq!(last.cause, "surface_tapped");
    }

    #[test]
    fn test_background_during_delay_then_resume() {
        let script = Script::parse(
            r#"
until = 8.0

[[step]]
at = 2.5
event = "background"

[[step]]
at = 4.0
event = "foreground"
"#,
        )
        .unwrap();

        let timeline = simulate(&script, &TimingsConfig::default());

        assert_eq!(
            surfaces(&timeline),
            vec![
                (0, Surface::Splash),
                (2000, Surface::Main),
                (4000, Surface::Splash),
                (6000, Surface::Main),
                (7600, Surface::BottomSheet),
            ]
        );
    }
}
