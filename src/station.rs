//! Station orchestration
//!
//! One [`Station`] owns the three measurement subsystems and is driven by a
//! periodic scheduler tick. Every tick samples the healthy subsystems once
//! and steps the electrical sequencer; every `ticks_per_report` ticks the
//! aggregated interval drains into a [`StationReport`].
//!
//! A subsystem that errors is latched faulted: it is skipped from then on
//! and its record reports as zeros until [`Station::reinitialize`] brings it
//! back.

use crate::domain::electrical::ElectricalSequencer;
use crate::domain::environment::EnvironmentAggregator;
use crate::domain::wind::WindAggregator;
use crate::ports::environment::{EnvironmentError, EnvironmentSensor};
use crate::ports::power_monitor::PowerMonitor;
use crate::ports::relays::RelayBank;
use crate::ports::wind::{WindError, WindSense};
use crate::report::{StationReport, SubsystemMask};

/// Scheduler tick period, milliseconds.
pub const TICK_PERIOD_MS: u64 = 3_000;

/// Ticks per reporting interval. Twenty 3-second ticks make one minute.
pub const DEFAULT_TICKS_PER_REPORT: u32 = 20;

/// Per-station settings fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct StationConfig {
    /// Station identity on a shared collector line.
    pub device_id: u16,
    /// Ticks between reports.
    pub ticks_per_report: u32,
    /// Subsystems this station is fitted with. Subsystems outside the set
    /// are never initialized or sampled and report as zeros.
    pub subsystems: SubsystemMask,
}

impl StationConfig {
    /// A fully fitted station on the default one-minute interval.
    pub const fn full(device_id: u16) -> Self {
        Self {
            device_id,
            ticks_per_report: DEFAULT_TICKS_PER_REPORT,
            subsystems: SubsystemMask(
                SubsystemMask::WIND.0
                    | SubsystemMask::ENVIRONMENT.0
                    | SubsystemMask::ELECTRICAL.0
                    | SubsystemMask::REPORTING.0,
            ),
        }
    }
}

/// The field station: wind, environment and electrical subsystems behind
/// one tick-driven front.
pub struct Station<W, S, M, R> {
    config: StationConfig,
    wind: W,
    wind_aggregator: WindAggregator,
    wind_fault: Option<WindError>,
    environment: S,
    environment_aggregator: EnvironmentAggregator,
    environment_fault: Option<EnvironmentError>,
    electrical: ElectricalSequencer<M, R>,
    ticks: u32,
}

impl<W, S, M, R> Station<W, S, M, R>
where
    W: WindSense,
    S: EnvironmentSensor,
    M: PowerMonitor,
    R: RelayBank,
{
    pub fn new(
        config: StationConfig,
        wind: W,
        environment: S,
        electrical: ElectricalSequencer<M, R>,
    ) -> Self {
        Self {
            config,
            wind,
            wind_aggregator: WindAggregator::new(),
            wind_fault: None,
            environment,
            environment_aggregator: EnvironmentAggregator::new(),
            environment_fault: None,
            electrical,
            ticks: 0,
        }
    }

    /// Bring up every configured subsystem.
    ///
    /// Failures latch the subsystem faulted rather than aborting: a station
    /// with a broken anemometer still reports its electrical readings.
    pub fn init(&mut self, now_us: u64) {
        self.ticks = 0;
        if self.config.subsystems.contains(SubsystemMask::WIND) {
            self.wind_fault = self.wind.init().err();
        }
        if self.config.subsystems.contains(SubsystemMask::ENVIRONMENT) {
            self.environment_fault = self.environment.init().err();
        }
        if self.config.subsystems.contains(SubsystemMask::ELECTRICAL) {
            let _ = self.electrical.init(now_us);
        }
    }

    /// Retry every latched-faulted subsystem once.
    pub fn reinitialize(&mut self, now_us: u64) {
        if self.wind_fault.take().is_some() {
            self.wind_fault = self.wind.init().err();
        }
        if self.environment_fault.take().is_some() {
            self.environment_fault = self.environment.init().err();
        }
        if self.electrical.fault().is_some() {
            let _ = self.electrical.reinitialize(now_us);
        }
    }

    /// Run one scheduler tick, returning a report on interval boundaries.
    pub fn tick(&mut self, now_us: u64) -> Option<StationReport> {
        if self.config.subsystems.contains(SubsystemMask::WIND) && self.wind_fault.is_none() {
            match self.wind.sample() {
                Ok(sample) => self.wind_aggregator.record(sample),
                Err(error) => {
                    self.wind_fault = Some(error);
                    self.wind_aggregator.reset();
                }
            }
        }
        if self.config.subsystems.contains(SubsystemMask::ENVIRONMENT)
            && self.environment_fault.is_none()
        {
            match self.environment.sample() {
                Ok(sample) => self.environment_aggregator.record(sample),
                Err(error) => {
                    self.environment_fault = Some(error);
                    self.environment_aggregator.reset();
                }
            }
        }
        if self.config.subsystems.contains(SubsystemMask::ELECTRICAL) {
            // Faults latch inside the sequencer and surface in the mask.
            let _ = self.electrical.poll(now_us);
        }

        self.ticks += 1;
        if self.ticks < self.config.ticks_per_report {
            return None;
        }
        self.ticks = 0;
        Some(self.report())
    }

    /// Drain every subsystem's interval into a report immediately.
    ///
    /// [`Station::tick`] calls this on interval boundaries; calling it
    /// directly cuts the current interval short.
    pub fn report(&mut self) -> StationReport {
        let mut faulted = SubsystemMask::EMPTY;
        if self.wind_fault.is_some() {
            faulted.insert(SubsystemMask::WIND);
        }
        if self.environment_fault.is_some() {
            faulted.insert(SubsystemMask::ENVIRONMENT);
        }
        if self.electrical.fault().is_some() {
            faulted.insert(SubsystemMask::ELECTRICAL);
        }
        StationReport {
            device_id: self.config.device_id,
            configured: self.config.subsystems,
            faulted,
            wind: self.wind_aggregator.average().into(),
            environment: self.environment_aggregator.average().into(),
            electrical: self.electrical.averages().into(),
        }
    }
}
