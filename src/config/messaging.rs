//! Live fan-out configuration types.

use serde::Deserialize;

/// Bus and relay tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Events buffered per bus before slow subscribers start skipping.
    pub bus_capacity: usize,
    /// How often the relay re-reads the ledger without a commit notice.
    pub relay_sweep_interval_ms: u64,
    /// Claims read per relay pass.
    pub relay_batch_size: u32,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            relay_sweep_interval_ms: 2000,
            relay_batch_size: 256,
        }
    }
}
