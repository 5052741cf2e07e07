//! Time utilities
//!
//! Safe clock reads that never panic on a misbehaving system clock.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Current Unix timestamp in seconds
///
/// A clock set before the epoch yields 0 instead of panicking, so a bad
/// system clock cannot take down a provisioning run.
pub fn current_timestamp() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs(),
        Err(_) => {
            warn!("System clock is before the UNIX epoch, recording 0");
            0
        }
    }
}
