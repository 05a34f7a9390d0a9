//! Events consumed by the reducer.
//!
//! `HostEvent` is everything the host can tell the presentation: lifecycle
//! signals, user actions forwarded from the renderer, and timer firings fed
//! back by the scheduler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{TimerId, TimerSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    #[default]
    Active,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Lifecycle(LifecyclePhase),
    /// Bottom sheet closed by any means (close button or swipe).
    SheetDismissed,
    /// Consultant popup's close affordance tapped.
    PopupClosed,
    /// Promo screen's close affordance tapped.
    PromoClosed,
    /// Tap anywhere on the main screen.
    SurfaceTapped,
    /// The error alert's single action ("Got it") tapped.
    AlertAcknowledged,
    TimerFired { slot: TimerSlot, id: TimerId },
    Quit,
}

/// Host actions that can be typed at a prompt or listed in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Background,
    Foreground,
    SheetDismissed,
    PopupClosed,
    PromoClosed,
    SurfaceTapped,
    AlertAcknowledged,
}

impl UserAction {
    pub fn all() -> &'static [UserAction] {
        &[
            UserAction::Background,
            UserAction::Foreground,
            UserAction::SheetDismissed,
            UserAction::PopupClosed,
            UserAction::PromoClosed,
            UserAction::SurfaceTapped,
            UserAction::AlertAcknowledged,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            UserAction::Background => "background",
            UserAction::Foreground => "foreground",
            UserAction::SheetDismissed => "sheet_dismissed",
            UserAction::PopupClosed => "popup_closed",
            UserAction::PromoClosed => "promo_closed",
            UserAction::SurfaceTapped => "surface_tapped",
            UserAction::AlertAcknowledged => "alert_acknowledged",
        }
    }

    /// Short alias accepted at the interactive prompt.
    pub fn alias(self) -> &'static str {
        match self {
            UserAction::Background => "bg",
            UserAction::Foreground => "fg",
            UserAction::SheetDismissed => "dismiss",
            UserAction::PopupClosed => "close-popup",
            UserAction::PromoClosed => "close-promo",
            UserAction::SurfaceTapped => "tap",
            UserAction::AlertAcknowledged => "ack",
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UserAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        UserAction::all()
            .iter()
            .copied()
            .find(|action| action.name() == needle || action.alias().replace('-', "_") == needle)
            .ok_or_else(|| anyhow::anyhow!("unknown action '{}'", s.trim()))
    }
}

impl From<UserAction> for HostEvent {
    fn from(action: UserAction) -> Self {
        match action {
            UserAction::Background => HostEvent::Lifecycle(LifecyclePhase::Background),
            UserAction::Foreground => HostEvent::Lifecycle(LifecyclePhase::Active),
            UserAction::SheetDismissed => HostEvent::SheetDismissed,
            UserAction::PopupClosed => HostEvent::PopupClosed,
            UserAction::PromoClosed => HostEvent::PromoClosed,
            UserAction::SurfaceTapped => HostEvent::SurfaceTapped,
            UserAction::AlertAcknowledged => HostEvent::AlertAcknowledged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_names_and_aliases() {
        assert_eq!(
            "sheet_dismissed".parse::<UserAction>().unwrap(),
            UserAction::SheetDismissed
        );
        assert_eq!("dismiss".parse::<UserAction>().unwrap(), UserAction::SheetDismissed);
        assert_eq!("close-popup".parse::<UserAction>().unwrap(), UserAction::PopupClosed);
        assert_eq!(" TAP ".parse::<UserAction>().unwrap(), UserAction::SurfaceTapped);
        assert_eq!("bg".parse::<UserAction>().unwrap(), UserAction::Background);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "explode".parse::<UserAction>().unwrap_err();
        assert!(err.to_string().contains("explode"));
    }

    #[test]
    fn test_foreground_maps_to_active() {
        assert_eq!(
            HostEvent::from(UserAction::Foreground),
            HostEvent::Lifecycle(LifecyclePhase::Active)
        );
    }
}
