//! Environment sample aggregation
//!
//! Ambient temperature, barometric pressure and relative humidity are
//! sampled once per tick and averaged per reporting interval. All values are
//! fixed point so the wire format stays integer-only.

use crate::domain::accumulator::IntervalAccumulator;

/// One environment observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct EnvironmentSample {
    /// Air temperature, degrees Celsius x10.
    pub temperature_dc: i32,
    /// Barometric pressure, hPa x10.
    pub pressure_dhpa: i32,
    /// Relative humidity, percent x10.
    pub humidity_dpct: i32,
}

/// Interval averages for the environment subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct EnvironmentAverages {
    /// Mean air temperature, degrees Celsius x10.
    pub temperature_dc: i32,
    /// Mean barometric pressure, hPa x10.
    pub pressure_dhpa: i32,
    /// Mean relative humidity, percent x10.
    pub humidity_dpct: i32,
}

impl EnvironmentAverages {
    /// The record reported for a faulted or empty interval.
    pub const ZERO: Self = Self {
        temperature_dc: 0,
        pressure_dhpa: 0,
        humidity_dpct: 0,
    };
}

/// Per-interval reduction of environment samples.
#[derive(Clone, Copy, Debug, Default, defmt::Format)]
pub struct EnvironmentAggregator {
    accumulator: IntervalAccumulator<3>,
}

impl EnvironmentAggregator {
    /// Create an aggregator with an empty interval.
    pub const fn new() -> Self {
        Self {
            accumulator: IntervalAccumulator::new(),
        }
    }

    /// Fold one observation into the interval.
    pub fn record(&mut self, sample: EnvironmentSample) {
        self.accumulator.record([
            sample.temperature_dc,
            sample.pressure_dhpa,
            sample.humidity_dpct,
        ]);
    }

    /// Number of samples folded this interval.
    pub fn count(&self) -> u32 {
        self.accumulator.count()
    }

    /// Drain the interval into its averaged record.
    pub fn average(&mut self) -> EnvironmentAverages {
        let [temperature_dc, pressure_dhpa, humidity_dpct] = self.accumulator.average();
        EnvironmentAverages {
            temperature_dc,
            pressure_dhpa,
            humidity_dpct,
        }
    }

    /// Throw away the interval, for example after a fault.
    pub fn reset(&mut self) {
        self.accumulator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_all_three_channels() {
        let mut agg = EnvironmentAggregator::new();
        agg.record(EnvironmentSample {
            temperature_dc: 215,
            pressure_dhpa: 10132,
            humidity_dpct: 453,
        });
        agg.record(EnvironmentSample {
            temperature_dc: 225,
            pressure_dhpa: 10138,
            humidity_dpct: 461,
        });
        assert_eq!(
            agg.average(),
            EnvironmentAverages {
                temperature_dc: 220,
                pressure_dhpa: 10135,
                humidity_dpct: 457,
            }
        );
        assert_eq!(agg.average(), EnvironmentAverages::ZERO);
    }

    #[test]
    fn reset_discards_partial_intervals() {
        let mut agg = EnvironmentAggregator::new();
        agg.record(EnvironmentSample {
            temperature_dc: -53,
            pressure_dhpa: 9980,
            humidity_dpct: 987,
        });
        agg.reset();
        assert_eq!(agg.average(), EnvironmentAverages::ZERO);
    }
}
