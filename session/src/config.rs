//! Session tuning knobs.

use std::time::Duration;

use serde::Deserialize;

/// Tunables for a workspace session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Outer deadline applied to every persistence call, in milliseconds.
    #[serde(default = "default_persist_timeout_ms")]
    pub persist_timeout_ms: u64,
    /// Quiet window for debounced narrative edits, in milliseconds.
    #[serde(default = "default_narrative_quiet_ms")]
    pub narrative_quiet_ms: u64,
}

fn default_persist_timeout_ms() -> u64 {
    10_000
}

fn default_narrative_quiet_ms() -> u64 {
    600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist_timeout_ms: default_persist_timeout_ms(),
            narrative_quiet_ms: default_narrative_quiet_ms(),
        }
    }
}

impl SessionConfig {
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }

    pub fn narrative_quiet(&self) -> Duration {
        Duration::from_millis(self.narrative_quiet_ms)
    }
}
