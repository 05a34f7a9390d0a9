//! Read-only snapshot of the presentation for renderers.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::common::InstanceId;
use crate::flow::FlowStepState;
use crate::splash::SplashState;

/// The single topmost surface a renderer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Splash,
    Main,
    BottomSheet,
    ConsultantPopup,
    PromoFullScreen,
    ErrorAlert,
}

impl Surface {
    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Splash => "splash",
            Surface::Main => "main",
            Surface::BottomSheet => "bottom_sheet",
            Surface::ConsultantPopup => "consultant_popup",
            Surface::PromoFullScreen => "promo_full_screen",
            Surface::ErrorAlert => "error_alert",
        }
    }

    /// Whether the surface covers the main screen and swallows taps on it.
    pub fn is_modal(self) -> bool {
        !matches!(self, Surface::Splash | Surface::Main)
    }

    pub(crate) fn derive(splash: SplashState, step: FlowStepState, alert_shown: bool) -> Self {
        if splash == SplashState::Showing {
            return Surface::Splash;
        }
        if alert_shown {
            return Surface::ErrorAlert;
        }
        match step {
            FlowStepState::Idle | FlowStepState::ErrorArmed => Surface::Main,
            FlowStepState::SheetVisible => Surface::BottomSheet,
            FlowStepState::PopupVisible => Surface::ConsultantPopup,
            FlowStepState::PromoVisible => Surface::PromoFullScreen,
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationView {
    pub surface: Surface,
    pub splash: SplashState,
    pub step: FlowStepState,
    pub error_armed: bool,
    pub alert_shown: bool,
    /// The splash keeps the status bar; content hides it.
    pub status_bar_hidden: bool,
    pub splash_instance: InstanceId,
    pub flow_instance: InstanceId,
    /// How long a renderer should cross-fade between splash and content.
    pub crossfade_ms: u64,
}

/// Something that paints presentation snapshots.
///
/// Hosts call `render` with every published view and the time elapsed since
/// launch.
pub trait Renderer {
    fn render(&mut self, elapsed: Duration, view: &PresentationView) -> Result<()>;
}
