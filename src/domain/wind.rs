//! Wind sample aggregation
//!
//! One wind sample per tick feeds three reductions in parallel: an average
//! speed, a 16-sector direction histogram whose mode becomes the interval
//! direction, and a running gust maximum. Directions are handled in
//! deci-degrees (degrees x10) end to end.

use crate::domain::accumulator::IntervalAccumulator;

/// Number of direction sectors in the histogram.
pub const DIRECTION_SECTORS: usize = 16;

/// Full circle in deci-degrees.
pub const FULL_CIRCLE_DDEG: i32 = 3600;

/// Sector width in deci-degrees (22.5 degrees).
const SECTOR_DDEG: i32 = FULL_CIRCLE_DDEG / DIRECTION_SECTORS as i32;

/// Half a sector, used to centre buckets on their nominal direction.
const HALF_SECTOR_DDEG: i32 = SECTOR_DDEG / 2;

/// One wind observation: speed in m/s x100, direction in deci-degrees.
///
/// The direction may exceed a full circle when a north offset has been
/// applied; the histogram folds it back into range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct WindSample {
    pub speed_cm_s: i32,
    pub direction_ddeg: i32,
}

/// 16-sector wind direction histogram.
///
/// Each sector spans 22.5 degrees centred on its nominal direction, so
/// sector 0 covers 348.75..11.25 degrees. The interval direction is the
/// mode sector's nominal direction.
#[derive(Clone, Copy, Debug, Default, defmt::Format)]
pub struct DirectionHistogram {
    buckets: [u16; DIRECTION_SECTORS],
}

impl DirectionHistogram {
    /// Create an empty histogram.
    pub const fn new() -> Self {
        Self {
            buckets: [0; DIRECTION_SECTORS],
        }
    }

    /// Count one observation in the sector containing `direction_ddeg`.
    pub fn record(&mut self, direction_ddeg: i32) {
        let folded = (direction_ddeg + HALF_SECTOR_DDEG).rem_euclid(FULL_CIRCLE_DDEG);
        let idx = (folded / SECTOR_DDEG) as usize;
        self.buckets[idx] = self.buckets[idx].saturating_add(1);
    }

    /// Nominal direction of the most-observed sector, in deci-degrees,
    /// clearing the histogram in the same scan.
    ///
    /// Ties go to the lowest sector index; an empty histogram reports north.
    pub fn mode_and_clear(&mut self) -> i32 {
        let mut best_count = 0u16;
        let mut best_idx = 0usize;
        for (idx, bucket) in self.buckets.iter_mut().enumerate() {
            if *bucket > best_count {
                best_count = *bucket;
                best_idx = idx;
            }
            *bucket = 0;
        }
        best_idx as i32 * SECTOR_DDEG
    }
}

/// Running maximum wind speed over the interval.
#[derive(Clone, Copy, Debug, Default, defmt::Format)]
pub struct GustTracker {
    max_cm_s: i32,
}

impl GustTracker {
    /// Create a tracker with no observed gust.
    pub const fn new() -> Self {
        Self { max_cm_s: 0 }
    }

    /// Update the maximum; only a strictly faster sample replaces it.
    pub fn record(&mut self, speed_cm_s: i32) {
        if speed_cm_s > self.max_cm_s {
            self.max_cm_s = speed_cm_s;
        }
    }

    /// The interval maximum so far, without consuming it.
    pub fn peak(&self) -> i32 {
        self.max_cm_s
    }

    /// Take the interval maximum and reset for the next interval.
    pub fn take(&mut self) -> i32 {
        core::mem::take(&mut self.max_cm_s)
    }
}

/// Interval averages for the wind subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct WindAverages {
    /// Mean speed over the interval, m/s x100.
    pub speed_cm_s: i32,
    /// Mode of the direction histogram, deci-degrees.
    pub direction_ddeg: i32,
    /// Fastest single sample of the interval, m/s x100.
    pub gust_cm_s: i32,
}

impl WindAverages {
    /// The record reported for a faulted or empty interval.
    pub const ZERO: Self = Self {
        speed_cm_s: 0,
        direction_ddeg: 0,
        gust_cm_s: 0,
    };
}

/// Per-interval reduction of wind samples.
#[derive(Clone, Copy, Debug, Default, defmt::Format)]
pub struct WindAggregator {
    speed: IntervalAccumulator<1>,
    directions: DirectionHistogram,
    gust: GustTracker,
}

impl WindAggregator {
    /// Create an aggregator with an empty interval.
    pub const fn new() -> Self {
        Self {
            speed: IntervalAccumulator::new(),
            directions: DirectionHistogram::new(),
            gust: GustTracker::new(),
        }
    }

    /// Fold one observation into all three reductions.
    pub fn record(&mut self, sample: WindSample) {
        self.speed.record([sample.speed_cm_s]);
        self.directions.record(sample.direction_ddeg);
        self.gust.record(sample.speed_cm_s);
    }

    /// Number of samples folded this interval.
    pub fn count(&self) -> u32 {
        self.speed.count()
    }

    /// Drain the interval into its averaged record. The gust passes through
    /// verbatim; it is never averaged.
    pub fn average(&mut self) -> WindAverages {
        let [speed_cm_s] = self.speed.average();
        WindAverages {
            speed_cm_s,
            direction_ddeg: self.directions.mode_and_clear(),
            gust_cm_s: self.gust.take(),
        }
    }

    /// Throw away the interval, for example after a fault.
    pub fn reset(&mut self) {
        self.speed.reset();
        self.directions = DirectionHistogram::new();
        self.gust = GustTracker::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_buckets_are_centred_on_sector_directions() {
        let mut hist = DirectionHistogram::new();
        // 11.3 degrees is past the first boundary, lands in sector 1 (22.5).
        hist.record(113);
        assert_eq!(hist.mode_and_clear(), 225);
        // 11.2 degrees still belongs to north.
        hist.record(112);
        assert_eq!(hist.mode_and_clear(), 0);
        // 355 degrees wraps forward into the north sector.
        hist.record(3550);
        assert_eq!(hist.mode_and_clear(), 0);
    }

    #[test]
    fn histogram_folds_offset_directions_into_range() {
        let mut hist = DirectionHistogram::new();
        // 370 degrees == 10 degrees, north sector.
        hist.record(3700);
        assert_eq!(hist.mode_and_clear(), 0);
    }

    #[test]
    fn mode_ties_go_to_the_lowest_sector() {
        let mut hist = DirectionHistogram::new();
        hist.record(900); // east
        hist.record(2700); // west
        assert_eq!(hist.mode_and_clear(), 900);
    }

    #[test]
    fn mode_scan_clears_the_histogram() {
        let mut hist = DirectionHistogram::new();
        hist.record(1800);
        hist.record(1800);
        assert_eq!(hist.mode_and_clear(), 1800);
        // A fresh interval with a single different observation wins outright.
        hist.record(900);
        assert_eq!(hist.mode_and_clear(), 900);
    }

    #[test]
    fn gust_keeps_the_strict_maximum() {
        let mut gust = GustTracker::new();
        for speed in [10, 25, 15] {
            gust.record(speed);
        }
        assert_eq!(gust.peak(), 25);
        gust.record(25);
        assert_eq!(gust.peak(), 25);
        gust.record(30);
        assert_eq!(gust.take(), 30);
        assert_eq!(gust.peak(), 0);
    }

    #[test]
    fn aggregator_reduces_speed_direction_and_gust() {
        let mut agg = WindAggregator::new();
        agg.record(WindSample {
            speed_cm_s: 300,
            direction_ddeg: 900,
        });
        agg.record(WindSample {
            speed_cm_s: 500,
            direction_ddeg: 905,
        });
        agg.record(WindSample {
            speed_cm_s: 400,
            direction_ddeg: 2700,
        });
        let avg = agg.average();
        assert_eq!(avg.speed_cm_s, 400);
        assert_eq!(avg.direction_ddeg, 900);
        assert_eq!(avg.gust_cm_s, 500);
        // The drain opened a fresh interval.
        assert_eq!(agg.count(), 0);
        assert_eq!(agg.average(), WindAverages::ZERO);
    }

    #[test]
    fn reset_discards_partial_intervals() {
        let mut agg = WindAggregator::new();
        agg.record(WindSample {
            speed_cm_s: 1200,
            direction_ddeg: 450,
        });
        agg.reset();
        assert_eq!(agg.average(), WindAverages::ZERO);
    }
}
