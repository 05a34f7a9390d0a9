use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Identity of one constructed sequencer.
///
/// Restarting a sequencer builds a new instance instead of clearing fields,
/// so observers keyed on this id (animation state, caches) reset as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell generations apart in logs.
        let full = self.0.simple().to_string();
        f.write_str(&full[..8])
    }
}
