//! Interval accumulation for averaged records
//!
//! Every subsystem folds its per-tick samples into an accumulator and drains
//! it once per reporting interval. Draining clears the accumulator, so sums
//! and count are zero at the start of each interval.

use libm::roundf;

/// Running channel sums and sample count for one reporting interval.
///
/// `N` is the number of channels accumulated in lockstep; a single count
/// covers all channels because a sample always carries every channel.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct IntervalAccumulator<const N: usize> {
    sums: [i64; N],
    count: u32,
}

impl<const N: usize> IntervalAccumulator<N> {
    /// Create an empty accumulator.
    pub const fn new() -> Self {
        Self {
            sums: [0; N],
            count: 0,
        }
    }

    /// Fold one sample vector into the running sums.
    pub fn record(&mut self, sample: [i32; N]) {
        for (sum, value) in self.sums.iter_mut().zip(sample.iter()) {
            *sum += i64::from(*value);
        }
        self.count += 1;
    }

    /// Number of samples recorded since the last drain.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the current interval holds no samples.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Per-channel average, rounded half away from zero, draining the
    /// accumulator in the same step. An empty interval averages to zeros.
    pub fn average(&mut self) -> [i32; N] {
        let mut averages = [0i32; N];
        if self.count != 0 {
            for (average, sum) in averages.iter_mut().zip(self.sums.iter()) {
                *average = roundf(*sum as f32 / self.count as f32) as i32;
            }
        }
        self.reset();
        averages
    }

    /// Discard everything recorded this interval.
    pub fn reset(&mut self) {
        self.sums = [0; N];
        self.count = 0;
    }
}

impl<const N: usize> Default for IntervalAccumulator<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_each_channel_independently() {
        let mut acc = IntervalAccumulator::<3>::new();
        acc.record([10, 20, 30]);
        acc.record([20, 40, 50]);
        assert_eq!(acc.average(), [15, 30, 40]);
    }

    #[test]
    fn average_drains_the_interval() {
        let mut acc = IntervalAccumulator::<2>::new();
        acc.record([4, 8]);
        assert_eq!(acc.count(), 1);
        assert_eq!(acc.average(), [4, 8]);
        assert!(acc.is_empty());
        assert_eq!(acc.average(), [0, 0]);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let mut acc = IntervalAccumulator::<2>::new();
        acc.record([7, -7]);
        acc.record([0, 0]);
        // 3.5 -> 4 and -3.5 -> -4
        assert_eq!(acc.average(), [4, -4]);
    }

    #[test]
    fn empty_interval_averages_to_zero() {
        let mut acc = IntervalAccumulator::<4>::new();
        assert_eq!(acc.average(), [0, 0, 0, 0]);
    }
}
