//! Relay bank port - the contacts that reroute the panel under test
//!
//! Callers only name which relay to move; the adapter knows pins and
//! polarities. Timing is not this port's business: the sequencer owns the
//! settle dwell after every toggle.

/// The three relays of the measurement chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Relay {
    /// Shorts the panel through the current shunt for the Isc reading.
    Short,
    /// Connects the measurement chain to the panel.
    Sense,
    /// Disconnects the charger while the panel is characterised.
    ChargerIsolation,
}

/// Error type for relay operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum RelayError {
    /// The relay driver failed to move the contact.
    DriveFailed,
}

/// Port for the relay bank.
///
/// Plain GPIO banks cannot fail; the error leaves room for banks behind
/// port expanders.
pub trait RelayBank {
    /// Close the relay's contact.
    fn engage(&mut self, relay: Relay) -> Result<(), RelayError>;

    /// Open the relay's contact.
    fn release(&mut self, relay: Relay) -> Result<(), RelayError>;
}
