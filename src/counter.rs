//! Bit-serial rotation counter driver
//!
//! The anemometer's reed switch clocks an external 8-bit ripple counter with
//! no parallel readout: its outputs sit behind an 8:1 multiplexer addressed
//! by three GPIO lines, so the count is read one bit at a time. The
//! multiplexer output is only valid 1 us after an address or control edge,
//! and the driver inserts that settle delay after every line change.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Multiplexer propagation delay after any address or control edge.
pub const MUX_PROPAGATION_DELAY_US: u32 = 1;

/// Width of the counter in bits.
const COUNTER_BITS: u8 = 8;

/// Error type for counter operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum CounterError<E> {
    /// A pin-level operation failed.
    Pin(E),
    /// The counter read back non-zero after its reset pulse; the payload
    /// is the residual value.
    NotCleared(u8),
}

impl<E> From<E> for CounterError<E> {
    fn from(error: E) -> Self {
        CounterError::Pin(error)
    }
}

/// Driver for the multiplexed bit-serial rotation counter.
///
/// `O` drives the three address lines, the reset line and the active-low
/// count-enable line; `I` samples the multiplexer output; `D` provides the
/// propagation delays. Counting runs while the enable line is low, so the
/// caller brackets its sampling window with [`RotationCounter::inhibit`]
/// and [`RotationCounter::resume`].
pub struct RotationCounter<O, I, D> {
    addr_a: O,
    addr_b: O,
    addr_c: O,
    reset: O,
    enable: O,
    data: I,
    delay: D,
}

impl<O, I, D, E> RotationCounter<O, I, D>
where
    O: OutputPin<Error = E>,
    I: InputPin<Error = E>,
    D: DelayNs,
{
    /// Create a driver over the given lines.
    ///
    /// No pin is touched until the first operation.
    pub fn new(addr_a: O, addr_b: O, addr_c: O, reset: O, enable: O, data: I, delay: D) -> Self {
        Self {
            addr_a,
            addr_b,
            addr_c,
            reset,
            enable,
            data,
            delay,
        }
    }

    /// Read the current count, bit 0 first.
    ///
    /// Each bit is selected on the address lines, given its propagation
    /// delay and sampled from the data line. The address lines are left at
    /// the last bit's address.
    pub fn read(&mut self) -> Result<u8, CounterError<E>> {
        let mut value = 0u8;
        for bit in 0..COUNTER_BITS {
            self.select_bit(bit)?;
            if self.data.is_high()? {
                value |= 1 << bit;
            }
        }
        Ok(value)
    }

    /// Pulse the counter reset and verify the count actually cleared.
    ///
    /// Counting is inhibited first so an early rotation cannot land between
    /// the pulse and the verification read. The caller decides when to
    /// [`RotationCounter::resume`].
    pub fn reset_and_verify(&mut self) -> Result<(), CounterError<E>> {
        self.select_bit(0)?;
        self.inhibit()?;
        self.reset.set_low()?;
        self.settle();
        self.reset.set_high()?;
        self.settle();
        self.reset.set_low()?;
        self.settle();
        let residue = self.read()?;
        if residue != 0 {
            return Err(CounterError::NotCleared(residue));
        }
        Ok(())
    }

    /// Let the counter count rotations again.
    pub fn resume(&mut self) -> Result<(), CounterError<E>> {
        self.enable.set_low()?;
        self.settle();
        Ok(())
    }

    /// Freeze the count, e.g. while it is being read.
    pub fn inhibit(&mut self) -> Result<(), CounterError<E>> {
        self.enable.set_high()?;
        self.settle();
        Ok(())
    }

    /// Drive the multiplexer address for one bit position and wait for the
    /// output to become valid.
    fn select_bit(&mut self, bit: u8) -> Result<(), E> {
        self.addr_a.set_state(PinState::from(bit & 0b001 != 0))?;
        self.addr_b.set_state(PinState::from(bit & 0b010 != 0))?;
        self.addr_c.set_state(PinState::from(bit & 0b100 != 0))?;
        self.settle();
        Ok(())
    }

    fn settle(&mut self) {
        self.delay.delay_us(MUX_PROPAGATION_DELAY_US);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use std::vec::Vec;

    /// Address-line expectations for one full 8-bit read.
    fn address_sweep(line_mask: u8) -> Vec<PinTransaction> {
        (0..8)
            .map(|bit| {
                PinTransaction::set(if bit & line_mask != 0 {
                    State::High
                } else {
                    State::Low
                })
            })
            .collect()
    }

    fn data_bits(bits: [bool; 8]) -> Vec<PinTransaction> {
        bits.iter()
            .map(|high| PinTransaction::get(if *high { State::High } else { State::Low }))
            .collect()
    }

    #[test]
    fn read_reassembles_bits_low_to_high() {
        // Bits 0, 3 and 7 set: 0x89.
        let mut addr_a = PinMock::new(&address_sweep(0b001));
        let mut addr_b = PinMock::new(&address_sweep(0b010));
        let mut addr_c = PinMock::new(&address_sweep(0b100));
        let mut reset = PinMock::new(&[]);
        let mut enable = PinMock::new(&[]);
        let mut data = PinMock::new(&data_bits([
            true, false, false, true, false, false, false, true,
        ]));

        let mut counter = RotationCounter::new(
            &mut addr_a,
            &mut addr_b,
            &mut addr_c,
            &mut reset,
            &mut enable,
            &mut data,
            NoopDelay::new(),
        );
        assert_eq!(counter.read().unwrap(), 0x89);
        drop(counter);

        for pin in [
            &mut addr_a,
            &mut addr_b,
            &mut addr_c,
            &mut reset,
            &mut enable,
            &mut data,
        ] {
            pin.done();
        }
    }

    #[test]
    fn reset_pulses_and_verifies_a_clean_counter() {
        // select_bit(0), then the verification read sweeps all addresses.
        let mut a_expect = std::vec![PinTransaction::set(State::Low)];
        a_expect.extend(address_sweep(0b001));
        let mut b_expect = std::vec![PinTransaction::set(State::Low)];
        b_expect.extend(address_sweep(0b010));
        let mut c_expect = std::vec![PinTransaction::set(State::Low)];
        c_expect.extend(address_sweep(0b100));

        let mut addr_a = PinMock::new(&a_expect);
        let mut addr_b = PinMock::new(&b_expect);
        let mut addr_c = PinMock::new(&c_expect);
        let mut reset = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]);
        let mut enable = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut data = PinMock::new(&data_bits([false; 8]));

        let mut counter = RotationCounter::new(
            &mut addr_a,
            &mut addr_b,
            &mut addr_c,
            &mut reset,
            &mut enable,
            &mut data,
            NoopDelay::new(),
        );
        counter.reset_and_verify().unwrap();
        drop(counter);

        for pin in [
            &mut addr_a,
            &mut addr_b,
            &mut addr_c,
            &mut reset,
            &mut enable,
            &mut data,
        ] {
            pin.done();
        }
    }

    #[test]
    fn reset_reports_a_counter_that_will_not_clear() {
        let mut a_expect = std::vec![PinTransaction::set(State::Low)];
        a_expect.extend(address_sweep(0b001));
        let mut b_expect = std::vec![PinTransaction::set(State::Low)];
        b_expect.extend(address_sweep(0b010));
        let mut c_expect = std::vec![PinTransaction::set(State::Low)];
        c_expect.extend(address_sweep(0b100));

        let mut addr_a = PinMock::new(&a_expect);
        let mut addr_b = PinMock::new(&b_expect);
        let mut addr_c = PinMock::new(&c_expect);
        let mut reset = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]);
        let mut enable = PinMock::new(&[PinTransaction::set(State::High)]);
        // Bit 0 stuck high: the reset did not take.
        let mut data = PinMock::new(&data_bits([
            true, false, false, false, false, false, false, false,
        ]));

        let mut counter = RotationCounter::new(
            &mut addr_a,
            &mut addr_b,
            &mut addr_c,
            &mut reset,
            &mut enable,
            &mut data,
            NoopDelay::new(),
        );
        match counter.reset_and_verify() {
            Err(CounterError::NotCleared(residue)) => assert_eq!(residue, 0x01),
            other => panic!("expected NotCleared, got {other:?}"),
        }
        drop(counter);

        for pin in [
            &mut addr_a,
            &mut addr_b,
            &mut addr_c,
            &mut reset,
            &mut enable,
            &mut data,
        ] {
            pin.done();
        }
    }

    #[test]
    fn enable_line_is_active_low() {
        let mut addr_a = PinMock::new(&[]);
        let mut addr_b = PinMock::new(&[]);
        let mut addr_c = PinMock::new(&[]);
        let mut reset = PinMock::new(&[]);
        let mut enable = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let mut data = PinMock::new(&[]);

        let mut counter = RotationCounter::new(
            &mut addr_a,
            &mut addr_b,
            &mut addr_c,
            &mut reset,
            &mut enable,
            &mut data,
            NoopDelay::new(),
        );
        counter.resume().unwrap();
        counter.inhibit().unwrap();
        drop(counter);

        enable.done();
        for pin in [&mut addr_a, &mut addr_b, &mut addr_c, &mut reset, &mut data] {
            pin.done();
        }
    }
}
