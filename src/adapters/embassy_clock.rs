//! Embassy time-base adapter
//!
//! This adapter implements the Clock port from the embassy time driver's
//! monotonic instant.

use crate::ports::clock::Clock;

/// Microsecond time base over `embassy_time::Instant`.
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}
