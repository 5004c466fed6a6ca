use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Engine tunables. Everything has a sensible default; hosts override what
/// they need.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Capacity of each history ring buffer (undo and redo).
    pub history_capacity: usize,
    /// Quiet window after the last character-level edit before the
    /// deferred history snapshot fires.
    #[serde(with = "duration_millis")]
    pub snapshot_debounce: Duration,
    /// Distance (in container pixels) from the container edge at which a
    /// drag starts auto-scrolling.
    pub scroll_margin: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            snapshot_debounce: Duration::from_secs(1),
            scroll_margin: 48.0,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
