//! Rotation-rate to wind-speed conversion
//!
//! The Davis cup anemometer closes one reed-switch contact per rotation and
//! is specified at 2.25 mph per rotation per second. Speeds are reported in
//! fixed point as m/s x100 to keep the wire format integer-only.

use libm::roundf;

/// Davis anemometer constant: miles per hour per rotation per second.
pub const MPH_PER_ROTATION_HZ: f32 = 2.25;

/// Conversion factor from miles per hour to metres per second.
pub const MPS_PER_MPH: f32 = 0.44704;

/// Error for an undefined rotation rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum RateError {
    /// The measurement interval had zero length, so the rate is undefined.
    DivisionByZero,
}

/// Convert a rotation count over an elapsed interval to wind speed.
///
/// Returns m/s x100 rounded to the nearest integer. A zero-length interval
/// yields [`RateError::DivisionByZero`] instead of a garbage rate.
pub fn speed_cm_s(rotations: u8, elapsed_us: u64) -> Result<i32, RateError> {
    if elapsed_us == 0 {
        return Err(RateError::DivisionByZero);
    }
    let rotation_hz = rotations as f32 * 1_000_000.0 / elapsed_us as f32;
    let m_per_s = rotation_hz * MPH_PER_ROTATION_HZ * MPS_PER_MPH;
    Ok(roundf(m_per_s * 100.0) as i32)
}
