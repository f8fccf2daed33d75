//! Clock port - monotonic time for dwell gates and rate windows
//!
//! The clock is the one dependency every subsystem shares. It is read-only,
//! so sharing it never couples the subsystems to each other.

/// Monotonic microsecond clock.
///
/// Implementations must never step backwards. A 64-bit count of
/// microseconds does not wrap within any realistic deployment.
pub trait Clock {
    /// Microseconds since boot.
    fn now_us(&self) -> u64;
}
