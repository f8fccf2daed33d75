//! Davis anemometer acquisition
//!
//! Assembles the rotation counter, the vane and the clock into the wind
//! instrument the station polls. A sampling window runs between two counter
//! resets; closing it yields one speed-and-direction observation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::counter::{CounterError, RotationCounter};
use crate::domain::speed::{speed_cm_s, RateError};
use crate::domain::wind::WindSample;
use crate::ports::clock::Clock;
use crate::ports::wind::{VaneError, WindError, WindSense, WindVane};

/// Default vane mounting offset from true north, deci-degrees.
///
/// The vane boom points 157.5 degrees east of north on the standard mast.
pub const DEFAULT_NORTH_OFFSET_DDEG: i32 = 1575;

/// Acquisition error with the underlying cause preserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum WindSenseError<E> {
    /// The rotation counter failed.
    Counter(CounterError<E>),
    /// The vane angle could not be read.
    Vane(VaneError),
    /// The sampling window had zero length.
    Rate(RateError),
}

impl<E> From<CounterError<E>> for WindSenseError<E> {
    fn from(error: CounterError<E>) -> Self {
        WindSenseError::Counter(error)
    }
}

impl<E> From<VaneError> for WindSenseError<E> {
    fn from(error: VaneError) -> Self {
        WindSenseError::Vane(error)
    }
}

impl<E> From<RateError> for WindSenseError<E> {
    fn from(error: RateError) -> Self {
        WindSenseError::Rate(error)
    }
}

impl<E> From<WindSenseError<E>> for WindError {
    fn from(error: WindSenseError<E>) -> Self {
        match error {
            WindSenseError::Counter(CounterError::NotCleared(_)) => WindError::CounterNotCleared,
            WindSenseError::Counter(CounterError::Pin(_)) => WindError::CounterPin,
            WindSenseError::Vane(_) => WindError::Vane,
            WindSenseError::Rate(_) => WindError::UndefinedRate,
        }
    }
}

/// The Davis wind instrument: counter-derived speed plus vane direction.
///
/// Rotations accumulate in hardware between ticks; [`DavisWindSense::acquire`]
/// freezes the counter, reads and clears it, reopens the window and converts
/// the count over the window length into a speed.
pub struct DavisWindSense<O, I, D, V, K> {
    counter: RotationCounter<O, I, D>,
    vane: V,
    clock: K,
    north_offset_ddeg: i32,
    window_opened_us: u64,
}

impl<O, I, D, V, K, E> DavisWindSense<O, I, D, V, K>
where
    O: OutputPin<Error = E>,
    I: InputPin<Error = E>,
    D: DelayNs,
    V: WindVane,
    K: Clock,
{
    /// Create the instrument with the standard mast north offset.
    pub fn new(counter: RotationCounter<O, I, D>, vane: V, clock: K) -> Self {
        Self {
            counter,
            vane,
            clock,
            north_offset_ddeg: DEFAULT_NORTH_OFFSET_DDEG,
            window_opened_us: 0,
        }
    }

    /// Override the vane's mounting offset from true north.
    pub fn with_north_offset(mut self, north_offset_ddeg: i32) -> Self {
        self.north_offset_ddeg = north_offset_ddeg;
        self
    }

    /// Clear the counter and open the first sampling window.
    pub fn begin(&mut self) -> Result<(), WindSenseError<E>> {
        self.counter.reset_and_verify()?;
        self.counter.resume()?;
        self.window_opened_us = self.clock.now_us();
        Ok(())
    }

    /// Close the sampling window and produce one observation.
    ///
    /// Rotations that happen while the counter is frozen are lost; the
    /// window length is measured up to the freeze, so they do not skew the
    /// rate either.
    pub fn acquire(&mut self) -> Result<WindSample, WindSenseError<E>> {
        self.counter.inhibit()?;
        let closed_at = self.clock.now_us();
        let elapsed_us = closed_at.wrapping_sub(self.window_opened_us);
        let rotations = self.counter.read()?;
        self.counter.reset_and_verify()?;
        self.counter.resume()?;
        self.window_opened_us = self.clock.now_us();

        let speed_cm_s = speed_cm_s(rotations, elapsed_us)?;
        let direction_ddeg = self.vane.direction_ddeg()? + self.north_offset_ddeg;
        Ok(WindSample {
            speed_cm_s,
            direction_ddeg,
        })
    }
}

impl<O, I, D, V, K, E> WindSense for DavisWindSense<O, I, D, V, K>
where
    O: OutputPin<Error = E>,
    I: InputPin<Error = E>,
    D: DelayNs,
    V: WindVane,
    K: Clock,
{
    fn init(&mut self) -> Result<(), WindError> {
        self.begin().map_err(WindError::from)
    }

    fn sample(&mut self) -> Result<WindSample, WindError> {
        self.acquire().map_err(WindError::from)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::Cell;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Clone)]
    struct TestClock(Rc<Cell<u64>>);

    impl Clock for TestClock {
        fn now_us(&self) -> u64 {
            self.0.get()
        }
    }

    struct TestVane {
        ddeg: i32,
    }

    impl WindVane for TestVane {
        fn direction_ddeg(&mut self) -> Result<i32, VaneError> {
            Ok(self.ddeg)
        }
    }

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

    fn data_gets(bits: [bool; 8]) -> Vec<PinTransaction> {
        bits.iter()
            .map(|high| PinTransaction::get(if *high { State::High } else { State::Low }))
            .collect()
    }

    /// Address expectations for one `acquire`: the value read, the reset's
    /// return to bit 0, then the verification read.
    fn acquire_addr(line_mask: u8) -> Vec<PinTransaction> {
        let mut expect = address_sweep(line_mask);
        expect.push(PinTransaction::set(State::Low));
        expect.extend(address_sweep(line_mask));
        expect
    }

    struct AcquireRig {
        addr_a: PinMock,
        addr_b: PinMock,
        addr_c: PinMock,
        reset: PinMock,
        enable: PinMock,
        data: PinMock,
        clock: Rc<Cell<u64>>,
    }

    impl AcquireRig {
        /// Pin scripting for one full `acquire` that reads `rotations` and
        /// then sees `verify` on the post-reset read.
        fn new(rotations: [bool; 8], verify: [bool; 8], resumes: bool) -> Self {
            let mut enable_expect = std::vec![
                PinTransaction::set(State::High),
                PinTransaction::set(State::High),
            ];
            if resumes {
                enable_expect.push(PinTransaction::set(State::Low));
            }
            let mut data_expect = data_gets(rotations);
            data_expect.extend(data_gets(verify));
            Self {
                addr_a: PinMock::new(&acquire_addr(0b001)),
                addr_b: PinMock::new(&acquire_addr(0b010)),
                addr_c: PinMock::new(&acquire_addr(0b100)),
                reset: PinMock::new(&[
                    PinTransaction::set(State::Low),
                    PinTransaction::set(State::High),
                    PinTransaction::set(State::Low),
                ]),
                enable: PinMock::new(&enable_expect),
                data: PinMock::new(&data_expect),
                clock: Rc::new(Cell::new(0)),
            }
        }

        fn instrument(
            &mut self,
            vane_ddeg: i32,
        ) -> DavisWindSense<&mut PinMock, &mut PinMock, NoopDelay, TestVane, TestClock> {
            let counter = RotationCounter::new(
                &mut self.addr_a,
                &mut self.addr_b,
                &mut self.addr_c,
                &mut self.reset,
                &mut self.enable,
                &mut self.data,
                NoopDelay::new(),
            );
            DavisWindSense::new(counter, TestVane { ddeg: vane_ddeg }, TestClock(self.clock.clone()))
        }

        fn done(&mut self) {
            self.addr_a.done();
            self.addr_b.done();
            self.addr_c.done();
            self.reset.done();
            self.enable.done();
            self.data.done();
        }
    }

    #[test]
    fn acquire_converts_rotations_and_applies_north_offset() {
        // 100 rotations: 0b0110_0100.
        let mut rig = AcquireRig::new(
            [false, false, true, false, false, true, true, false],
            [false; 8],
            true,
        );
        rig.clock.set(1_000_000);
        let mut instrument = rig.instrument(900);
        // The window opened at zero, so this is 100 rotations over one second.
        let sample = instrument.acquire().unwrap();
        assert_eq!(sample.speed_cm_s, 10058);
        assert_eq!(sample.direction_ddeg, 900 + DEFAULT_NORTH_OFFSET_DDEG);
        drop(instrument);
        rig.done();
    }

    #[test]
    fn failed_clear_reaches_the_port_as_counter_not_cleared() {
        let mut rig = AcquireRig::new(
            [false; 8],
            [true, false, false, false, false, false, false, false],
            false,
        );
        rig.clock.set(3_000_000);
        let mut instrument = rig.instrument(0);
        assert_eq!(
            WindSense::sample(&mut instrument),
            Err(WindError::CounterNotCleared)
        );
        drop(instrument);
        rig.done();
    }

    #[test]
    fn zero_length_window_is_an_undefined_rate() {
        let mut rig = AcquireRig::new([false; 8], [false; 8], true);
        // Clock never advances past the window origin.
        let mut instrument = rig.instrument(0);
        match instrument.acquire() {
            Err(WindSenseError::Rate(RateError::DivisionByZero)) => {}
            other => panic!("expected a rate error, got {other:?}"),
        }
        drop(instrument);
        rig.done();
    }
}
