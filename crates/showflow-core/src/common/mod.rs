//! Building blocks shared by the sequencers.

mod instance;
mod timer;

pub use instance::InstanceId;
pub use timer::{TimerId, TimerSeq, TimerSlot, TimerState};
