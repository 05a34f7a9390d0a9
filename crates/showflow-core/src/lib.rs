//! Timer-driven presentation sequencer for the splash → main screen → bottom
//! sheet → consultant popup → promo → error alert flow.
//!
//! The state machines are pure: `update::update` mutates a `Presentation` and
//! returns `Effect`s. `runtime::FlowRuntime` executes them on tokio, and
//! `clock::VirtualClock` executes them on a manual clock for tests and
//! scripted replays.

pub mod clock;
pub mod common;
pub mod config;
pub mod effects;
pub mod events;
pub mod flow;
pub mod logging;
pub mod runtime;
pub mod script;
pub mod splash;
pub mod state;
pub mod update;
pub mod view;

pub use config::Config;
pub use events::{HostEvent, LifecyclePhase, UserAction};
pub use runtime::{FlowRuntime, HostHandle};
pub use state::Presentation;
pub use view::{PresentationView, Renderer, Surface};
