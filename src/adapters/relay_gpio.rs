//! GPIO relay bank adapter
//!
//! This adapter implements the RelayBank port with the three measurement
//! relay coils on push-pull GPIO outputs. Drivers are active-high; an open
//! output leaves the contact in the de-energized position.

use embassy_rp::gpio::Output;

use crate::ports::relays::{Relay, RelayBank, RelayError};

/// The three measurement relays behind their coil-driver pins.
pub struct GpioRelayBank<'d> {
    short: Output<'d>,
    sense: Output<'d>,
    charger_isolation: Output<'d>,
}

impl<'d> GpioRelayBank<'d> {
    pub fn new(short: Output<'d>, sense: Output<'d>, charger_isolation: Output<'d>) -> Self {
        Self {
            short,
            sense,
            charger_isolation,
        }
    }

    fn coil(&mut self, relay: Relay) -> &mut Output<'d> {
        match relay {
            Relay::Short => &mut self.short,
            Relay::Sense => &mut self.sense,
            Relay::ChargerIsolation => &mut self.charger_isolation,
        }
    }
}

impl RelayBank for GpioRelayBank<'_> {
    fn engage(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.coil(relay).set_high();
        Ok(())
    }

    fn release(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.coil(relay).set_low();
        Ok(())
    }
}
