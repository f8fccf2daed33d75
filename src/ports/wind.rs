//! Wind ports - vane angle input and the assembled wind instrument
//!
//! Two boundaries live here. `WindVane` is the low-level angle input the
//! acquisition driver reads. `WindSense` is the whole instrument as the
//! station sees it: one speed-and-direction observation per tick.

use crate::domain::wind::WindSample;

/// Error type for wind vane operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum VaneError {
    /// The angle conversion failed.
    ReadFailed,
}

/// Port for the wind vane.
pub trait WindVane {
    /// Vane angle relative to its mounting, in deci-degrees 0..3600.
    fn direction_ddeg(&mut self) -> Result<i32, VaneError>;
}

/// Error type for wind acquisition, flattened for the station boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum WindError {
    /// The rotation counter read back non-zero after its reset pulse.
    CounterNotCleared,
    /// A counter pin-level operation failed.
    CounterPin,
    /// The vane angle could not be read.
    Vane,
    /// The sampling window had zero length, so the rate is undefined.
    UndefinedRate,
}

/// Port for the assembled wind instrument.
pub trait WindSense {
    /// Clear the rotation counter and open the first sampling window.
    fn init(&mut self) -> Result<(), WindError>;

    /// Close the current sampling window and produce one observation.
    fn sample(&mut self) -> Result<WindSample, WindError>;
}
