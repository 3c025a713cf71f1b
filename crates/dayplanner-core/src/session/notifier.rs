//! Audible alert fired when a block's countdown reaches zero.
//!
//! Alerts are best-effort: a notifier must never fail the state machine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How an alert sounds: `pulses` tones, `spacing` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPattern {
    pub pulses: u32,
    #[serde(with = "millis")]
    pub spacing: Duration,
}

impl Default for AlertPattern {
    fn default() -> Self {
        Self {
            pulses: 3,
            spacing: Duration::from_millis(300),
        }
    }
}

/// Receives countdown alerts.
pub trait Notifier {
    fn alert(&self, pattern: &AlertPattern);
}

/// Swallows alerts. Used when alerts are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn alert(&self, _pattern: &AlertPattern) {}
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
