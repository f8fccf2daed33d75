//! ADC wind vane adapter
//!
//! This adapter implements the WindVane port for a potentiometer vane on
//! the onboard ADC: the wiper voltage maps linearly onto one full rotation.

use embassy_rp::adc::{Adc, Blocking, Channel};

use crate::domain::wind::FULL_CIRCLE_DDEG;
use crate::ports::wind::{VaneError, WindVane};

/// Top of the 12-bit conversion range.
const ADC_FULL_SCALE: i32 = 4095;

/// Potentiometer vane on an ADC channel.
pub struct AdcVane<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
}

impl<'d> AdcVane<'d> {
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }
}

impl WindVane for AdcVane<'_> {
    fn direction_ddeg(&mut self) -> Result<i32, VaneError> {
        let raw = self
            .adc
            .blocking_read(&mut self.channel)
            .map_err(|_| VaneError::ReadFailed)?;
        Ok(i32::from(raw) * FULL_CIRCLE_DDEG / ADC_FULL_SCALE)
    }
}
