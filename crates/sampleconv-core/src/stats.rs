//! Robust timing statistics: median and median absolute deviation.
//!
//! Medians are taken as `sorted[n / 2]`, the upper median for an even
//! sample count. Both statistics are deterministic and independent of the
//! input order.

use std::time::Duration;

/// Median of `samples`, `0.0` when empty.
///
/// # Example
///
/// ```rust
/// use sampleconv_core::stats::median;
///
/// assert_eq!(median(&[4.0, 1.0, 100.0, 3.0, 2.0]), 3.0);
/// ```
#[must_use]
pub fn median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[sorted.len() / 2]
}

/// Median of the absolute deviations from the median, `0.0` when empty.
#[must_use]
pub fn median_abs_dev(samples: &[f64]) -> f64 {
    let center = median(samples);
    let deviations: Vec<f64> = samples.iter().map(|x| (x - center).abs()).collect();
    median(&deviations)
}

/// Median and MAD of a set of per-iteration timings, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimingStats {
    /// Median time.
    pub median: f64,
    /// Median absolute deviation.
    pub mad: f64,
    /// Number of samples.
    pub samples: usize,
}

impl TimingStats {
    /// Summarises raw samples.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Self {
        Self {
            median: median(samples),
            mad: median_abs_dev(samples),
            samples: samples.len(),
        }
    }

    /// Summarises durations, converted to microseconds.
    #[must_use]
    pub fn from_durations(durations: &[Duration]) -> Self {
        let micros: Vec<f64> = durations.iter().map(|d| d.as_secs_f64() * 1e6).collect();
        Self::from_samples(&micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_and_mad_known_values() {
        let samples = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(median(&samples), 3.0);
        assert_eq!(median_abs_dev(&samples), 1.0);
    }

    #[test]
    fn test_order_independent() {
        let a = [100.0, 3.0, 1.0, 4.0, 2.0];
        let b = [2.0, 4.0, 1.0, 3.0, 100.0];
        assert_eq!(TimingStats::from_samples(&a), TimingStats::from_samples(&b));
    }

    #[test]
    fn test_even_count_takes_upper_median() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 3.0);
    }

    #[test]
    fn test_empty_samples() {
        let stats = TimingStats::from_samples(&[]);
        assert_eq!(stats, TimingStats::default());
    }

    #[test]
    fn test_from_durations_in_micros() {
        let durations = [
            Duration::from_micros(10),
            Duration::from_micros(20),
            Duration::from_micros(30),
        ];
        let stats = TimingStats::from_durations(&durations);
        assert!((stats.median - 20.0).abs() < 1e-9);
        assert!((stats.mad - 10.0).abs() < 1e-9);
        assert_eq!(stats.samples, 3);
    }
}
