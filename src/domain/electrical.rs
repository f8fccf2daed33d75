//! Relay-sequenced electrical measurements
//!
//! A solar panel is characterised once per cycle by up to three readings:
//! the auxiliary (battery) bus voltage, the panel open-circuit voltage and
//! the panel short-circuit current. Relays reroute the panel between those
//! readings, and mechanical contacts need time to settle, so the cycle runs
//! as a resumable state machine: every [`ElectricalSequencer::poll`] advances
//! at most one stage and returns immediately.

use crate::domain::accumulator::IntervalAccumulator;
use crate::ports::power_monitor::{PowerMonitor, PowerMonitorError};
use crate::ports::relays::{Relay, RelayBank};

/// Relay contact settle time. The HF3FD datasheet puts operate and release
/// below 10 ms; the dwell doubles that.
pub const RELAY_DWELL_US: u64 = 20_000;

// Staged-measurement channel order, matching `ElectricalAverages`.
const CH_AUX: usize = 0;
const CH_OPEN_CIRCUIT: usize = 1;
const CH_SHORT_CIRCUIT: usize = 2;
const CHANNELS: usize = 3;

/// Gate that holds the sequencer off until the last relay toggle settled.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct SwitchTimer {
    switched_at_us: u64,
    dwell_us: u64,
}

impl SwitchTimer {
    /// Create a timer with the given dwell.
    pub const fn new(dwell_us: u64) -> Self {
        Self {
            switched_at_us: 0,
            dwell_us,
        }
    }

    /// Rearm after a relay toggle.
    pub fn restart(&mut self, now_us: u64) {
        self.switched_at_us = now_us;
    }

    /// Whether the contacts have had the full dwell to settle.
    pub fn settled(&self, now_us: u64) -> bool {
        now_us.wrapping_sub(self.switched_at_us) >= self.dwell_us
    }
}

/// Which optional stages a measurement cycle runs.
///
/// The open-circuit and short-circuit readings are always taken; the
/// auxiliary voltage reading and the charger-isolation relay are properties
/// of how the station is wired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct ElectricalConfig {
    /// Measure the auxiliary bus voltage before the panel is rerouted.
    pub measure_aux_voltage: bool,
    /// Drive the charger-isolation relay around the panel readings.
    pub isolate_charger: bool,
}

impl ElectricalConfig {
    /// Full cycle: aux voltage, charger isolation, then Uoc and Isc.
    pub const FULL: Self = Self {
        measure_aux_voltage: true,
        isolate_charger: true,
    };

    /// Panel-only wiring without the sense-relay stages.
    pub const PANEL_ONLY: Self = Self {
        measure_aux_voltage: false,
        isolate_charger: false,
    };

    fn uses_sense_relays(&self) -> bool {
        self.measure_aux_voltage || self.isolate_charger
    }
}

impl Default for ElectricalConfig {
    fn default() -> Self {
        Self::FULL
    }
}

/// Stage of the measurement cycle, named for the hardware action it performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum SequencerState {
    /// Between cycles; the next poll opens a new one.
    Idle,
    /// Trigger a one-shot conversion on the auxiliary bus.
    StartAuxVoltage,
    /// Wait for the auxiliary conversion and stage the voltage.
    AwaitAuxVoltage,
    /// Engage the sense and charger-isolation relays.
    EngageSenseRelays,
    /// Trigger the open-circuit voltage conversion.
    StartOpenCircuitVoltage,
    /// Wait for the open-circuit conversion and stage the voltage.
    AwaitOpenCircuitVoltage,
    /// Engage the short-circuit relay.
    EngageShortRelay,
    /// Trigger the short-circuit current conversion.
    StartShortCircuitCurrent,
    /// Wait for the short-circuit conversion and stage the current.
    AwaitShortCircuitCurrent,
    /// Release the short-circuit relay.
    ReleaseShortRelay,
    /// Release the sense and charger-isolation relays, closing the cycle.
    ReleaseSenseRelays,
}

/// Outcome of one sequencer poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Progress {
    /// The cycle is still in flight; poll again.
    Pending,
    /// A full cycle just folded into the interval accumulator.
    Complete,
}

/// Latched electrical-subsystem fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum ElectricalFault {
    /// The power monitor rejected its configuration at initialization.
    ConfigRejected,
    /// The power monitor stopped responding on the bus.
    MonitorLost,
    /// A relay driver reported a fault.
    RelayFailed,
}

/// Interval averages for the electrical subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct ElectricalAverages {
    /// Auxiliary bus voltage, mV.
    pub aux_mv: i32,
    /// Panel open-circuit voltage, mV.
    pub open_circuit_mv: i32,
    /// Panel short-circuit current, mA.
    pub short_circuit_ma: i32,
}

impl ElectricalAverages {
    /// The record reported for a faulted or empty interval.
    pub const ZERO: Self = Self {
        aux_mv: 0,
        open_circuit_mv: 0,
        short_circuit_ma: 0,
    };
}

// ============================================================================
// Sequencer
// ============================================================================

/// Non-blocking driver of the relay-switched measurement cycle.
///
/// A fault latches: every later poll keeps returning it and the interval
/// accumulator stays empty until [`ElectricalSequencer::reinitialize`].
pub struct ElectricalSequencer<M, R> {
    monitor: M,
    relays: R,
    config: ElectricalConfig,
    state: SequencerState,
    timer: SwitchTimer,
    staged: [i32; CHANNELS],
    accumulator: IntervalAccumulator<CHANNELS>,
    fault: Option<ElectricalFault>,
}

impl<M: PowerMonitor, R: RelayBank> ElectricalSequencer<M, R> {
    /// Create a sequencer over the given monitor and relay bank.
    ///
    /// Call [`ElectricalSequencer::init`] before the first poll.
    pub fn new(monitor: M, relays: R, config: ElectricalConfig) -> Self {
        Self {
            monitor,
            relays,
            config,
            state: SequencerState::Idle,
            timer: SwitchTimer::new(RELAY_DWELL_US),
            staged: [0; CHANNELS],
            accumulator: IntervalAccumulator::new(),
            fault: None,
        }
    }

    /// Force all relays open, configure the monitor and arm the dwell gate.
    pub fn init(&mut self, now_us: u64) -> Result<(), ElectricalFault> {
        self.fault = None;
        self.state = SequencerState::Idle;
        self.staged = [0; CHANNELS];
        self.accumulator.reset();
        let opened = self
            .relays
            .release(Relay::Short)
            .and_then(|_| self.relays.release(Relay::Sense))
            .and_then(|_| self.relays.release(Relay::ChargerIsolation));
        if opened.is_err() {
            return Err(self.latch(ElectricalFault::RelayFailed));
        }
        self.monitor
            .configure()
            .map_err(|e| self.latch_monitor(e))?;
        self.timer.restart(now_us);
        Ok(())
    }

    /// Recover from a latched fault by running initialization again.
    pub fn reinitialize(&mut self, now_us: u64) -> Result<(), ElectricalFault> {
        self.init(now_us)
    }

    /// The latched fault, if any.
    pub fn fault(&self) -> Option<ElectricalFault> {
        self.fault
    }

    /// Current cycle stage.
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Advance the cycle by at most one stage.
    ///
    /// While the relay dwell since the last toggle has not elapsed this
    /// returns `Pending` without touching any hardware or state. The
    /// `Await*` stages also return `Pending` until the monitor reports its
    /// conversion ready, so a caller may poll as often as it likes.
    pub fn poll(&mut self, now_us: u64) -> Result<Progress, ElectricalFault> {
        if let Some(fault) = self.fault {
            self.accumulator.reset();
            return Err(fault);
        }
        if !self.timer.settled(now_us) {
            return Ok(Progress::Pending);
        }

        let next = match self.state {
            SequencerState::Idle => {
                self.staged = [0; CHANNELS];
                if self.config.measure_aux_voltage {
                    SequencerState::StartAuxVoltage
                } else if self.config.uses_sense_relays() {
                    SequencerState::EngageSenseRelays
                } else {
                    SequencerState::StartOpenCircuitVoltage
                }
            }
            SequencerState::StartAuxVoltage => {
                self.monitor
                    .start_bus_conversion()
                    .map_err(|e| self.latch_monitor(e))?;
                SequencerState::AwaitAuxVoltage
            }
            SequencerState::AwaitAuxVoltage => {
                if !self
                    .monitor
                    .conversion_ready()
                    .map_err(|e| self.latch_monitor(e))?
                {
                    return Ok(Progress::Pending);
                }
                self.staged[CH_AUX] = self
                    .monitor
                    .bus_millivolts()
                    .map_err(|e| self.latch_monitor(e))?;
                SequencerState::EngageSenseRelays
            }
            SequencerState::EngageSenseRelays => {
                if self.config.measure_aux_voltage {
                    self.relays
                        .engage(Relay::Sense)
                        .map_err(|_| self.latch(ElectricalFault::RelayFailed))?;
                }
                if self.config.isolate_charger {
                    self.relays
                        .engage(Relay::ChargerIsolation)
                        .map_err(|_| self.latch(ElectricalFault::RelayFailed))?;
                }
                self.timer.restart(now_us);
                SequencerState::StartOpenCircuitVoltage
            }
            SequencerState::StartOpenCircuitVoltage => {
                self.monitor
                    .start_bus_conversion()
                    .map_err(|e| self.latch_monitor(e))?;
                SequencerState::AwaitOpenCircuitVoltage
            }
            SequencerState::AwaitOpenCircuitVoltage => {
                if !self
                    .monitor
                    .conversion_ready()
                    .map_err(|e| self.latch_monitor(e))?
                {
                    return Ok(Progress::Pending);
                }
                self.staged[CH_OPEN_CIRCUIT] = self
                    .monitor
                    .bus_millivolts()
                    .map_err(|e| self.latch_monitor(e))?;
                SequencerState::EngageShortRelay
            }
            SequencerState::EngageShortRelay => {
                self.relays
                    .engage(Relay::Short)
                    .map_err(|_| self.latch(ElectricalFault::RelayFailed))?;
                self.timer.restart(now_us);
                SequencerState::StartShortCircuitCurrent
            }
            SequencerState::StartShortCircuitCurrent => {
                self.monitor
                    .start_shunt_conversion()
                    .map_err(|e| self.latch_monitor(e))?;
                SequencerState::AwaitShortCircuitCurrent
            }
            SequencerState::AwaitShortCircuitCurrent => {
                if !self
                    .monitor
                    .conversion_ready()
                    .map_err(|e| self.latch_monitor(e))?
                {
                    return Ok(Progress::Pending);
                }
                self.staged[CH_SHORT_CIRCUIT] = self
                    .monitor
                    .shunt_milliamps()
                    .map_err(|e| self.latch_monitor(e))?;
                SequencerState::ReleaseShortRelay
            }
            SequencerState::ReleaseShortRelay => {
                self.relays
                    .release(Relay::Short)
                    .map_err(|_| self.latch(ElectricalFault::RelayFailed))?;
                self.timer.restart(now_us);
                if self.config.uses_sense_relays() {
                    SequencerState::ReleaseSenseRelays
                } else {
                    return Ok(self.finish_cycle());
                }
            }
            SequencerState::ReleaseSenseRelays => {
                if self.config.measure_aux_voltage {
                    self.relays
                        .release(Relay::Sense)
                        .map_err(|_| self.latch(ElectricalFault::RelayFailed))?;
                }
                if self.config.isolate_charger {
                    self.relays
                        .release(Relay::ChargerIsolation)
                        .map_err(|_| self.latch(ElectricalFault::RelayFailed))?;
                }
                self.timer.restart(now_us);
                return Ok(self.finish_cycle());
            }
        };
        self.state = next;
        Ok(Progress::Pending)
    }

    /// Drain the interval into its averaged record.
    ///
    /// A faulted subsystem reports the all-zero record and stays empty.
    pub fn averages(&mut self) -> ElectricalAverages {
        if self.fault.is_some() {
            self.accumulator.reset();
            return ElectricalAverages::ZERO;
        }
        let [aux_mv, open_circuit_mv, short_circuit_ma] = self.accumulator.average();
        ElectricalAverages {
            aux_mv,
            open_circuit_mv,
            short_circuit_ma,
        }
    }

    fn finish_cycle(&mut self) -> Progress {
        self.accumulator.record(self.staged);
        self.state = SequencerState::Idle;
        Progress::Complete
    }

    fn latch(&mut self, fault: ElectricalFault) -> ElectricalFault {
        // A latched fault must not leave the panel shorted or the charger
        // isolated, so the contacts are forced open; release errors are
        // swallowed because the fault is already being reported.
        let _ = self.relays.release(Relay::Short);
        let _ = self.relays.release(Relay::Sense);
        let _ = self.relays.release(Relay::ChargerIsolation);
        self.accumulator.reset();
        self.fault = Some(fault);
        fault
    }

    fn latch_monitor(&mut self, error: PowerMonitorError) -> ElectricalFault {
        let fault = match error {
            PowerMonitorError::ConfigRejected => ElectricalFault::ConfigRejected,
            PowerMonitorError::Bus => ElectricalFault::MonitorLost,
        };
        self.latch(fault)
    }
}
