//! Descriptive statistics over one segment's duration samples.
//!
//! All duration-valued results are integer nanoseconds: results are only
//! interesting at millisecond granularity, so sub-nanosecond precision is
//! noise and the arithmetic truncates like the integer types it operates
//! on. Quantiles use rank interpolation: for probability `p` over `n`
//! sorted samples let `r = n * p`; a whole `r` averages the samples at
//! 0-based ranks `r - 1` and `r`, a fractional `r` takes the sample at
//! rank `floor(r)`.

use serde::Serialize;

use crate::error::MeasureError;
use crate::runner::Dataset;

/// Cumulative descriptive statistics for one measured segment.
///
/// Invariant: `min <= q25 <= median <= q75 <= max` and `std_dev >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticResult {
    /// Smallest sample, ns.
    pub min: u64,
    /// Largest sample, ns.
    pub max: u64,
    /// Arithmetic mean truncated to integer ns.
    pub mean: u64,
    /// Median (rank interpolation), ns.
    pub median: u64,
    /// 25th percentile, ns.
    pub q25: u64,
    /// 75th percentile, ns.
    pub q75: u64,
    /// Square root of the sample variance (denominator `n - 1`),
    /// truncated to integer ns.
    pub std_dev: u64,
    /// `std_dev / mean`, dimensionless; `None` when the mean is zero.
    pub variation_coefficient: Option<f64>,
}

/// Compute a [`StatisticResult`] from one dataset.
///
/// Sorting for the quantiles happens on an internal copy; the caller's
/// dataset is never reordered. Fault sentinels enter as zeros.
///
/// # Errors
///
/// [`MeasureError::EmptyDataset`] when the dataset holds no samples
/// (e.g. outlier filtering consumed it entirely).
pub fn analyze(dataset: &Dataset) -> Result<StatisticResult, MeasureError> {
    if dataset.is_empty() {
        return Err(MeasureError::EmptyDataset {
            segment: dataset.segment_index,
        });
    }

    let mut sorted = dataset.nanos();
    sorted.sort_unstable();
    let n = sorted.len();

    let min = sorted[0];
    let max = sorted[n - 1];
    let sum: u128 = sorted.iter().map(|&v| v as u128).sum();
    let mean = (sum / n as u128) as u64;

    let median = quantile(&sorted, 0.5);
    let q25 = quantile(&sorted, 0.25);
    let q75 = quantile(&sorted, 0.75);

    // Sample variance with integer division, like the rest of the
    // pipeline's duration arithmetic. A single sample has no spread.
    let std_dev = if n > 1 {
        let squared_sum: u128 = sorted
            .iter()
            .map(|&v| {
                let d = v as i128 - mean as i128;
                (d * d) as u128
            })
            .sum();
        let variance = squared_sum / (n as u128 - 1);
        (variance as f64).sqrt() as u64
    } else {
        0
    };

    let variation_coefficient = if mean > 0 {
        Some(std_dev as f64 / mean as f64)
    } else {
        None
    };

    Ok(StatisticResult {
        min,
        max,
        mean,
        median,
        q25,
        q75,
        std_dev,
        variation_coefficient,
    })
}

/// Rank-interpolation quantile over an ascending-sorted slice.
fn quantile(sorted: &[u64], p: f64) -> u64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..1.0).contains(&p));

    let n = sorted.len();
    let r = n as f64 * p;
    let rank = r as usize;
    if r.fract() == 0.0 && rank >= 1 {
        (sorted[rank - 1] + sorted[rank]) / 2
    } else {
        sorted[rank]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::DurationSample;

    fn dataset(nanos: &[u64]) -> Dataset {
        Dataset {
            segment_index: 0,
            samples: nanos.iter().map(|&n| DurationSample::Elapsed(n)).collect(),
        }
    }

    #[test]
    fn median_whole_rank_averages_the_straddling_samples() {
        // n * p = 4 * 0.5 = 2 is whole: (20 + 30) / 2.
        assert_eq!(quantile(&[10, 20, 30, 40], 0.5), 25);
    }

    #[test]
    fn median_fractional_rank_takes_the_floor_rank_sample() {
        // n * p = 3 * 0.5 = 1.5 -> rank 1.
        assert_eq!(quantile(&[10, 20, 30], 0.5), 20);
    }

    #[test]
    fn reference_scenario_truncates_the_mean() {
        let result = analyze(&dataset(&[100, 110, 105, 120, 95])).unwrap();
        // Sum 530 / 5 = 106 exactly; extremes straight from the data.
        assert_eq!(result.mean, 106);
        assert_eq!(result.min, 95);
        assert_eq!(result.max, 120);
        assert_eq!(result.median, 105);
    }

    #[test]
    fn quartiles_respect_the_ordering_invariant() {
        let datasets = [
            dataset(&[10, 20, 30, 40]),
            dataset(&[5]),
            dataset(&[7, 7, 7, 7, 7, 7]),
            dataset(&[1, 1000, 2, 999, 3, 998, 4, 997]),
            dataset(&[42, 17, 93, 8, 64, 25, 71]),
        ];
        for ds in &datasets {
            let r = analyze(ds).unwrap();
            assert!(r.min <= r.q25, "{r:?}");
            assert!(r.q25 <= r.median, "{r:?}");
            assert!(r.median <= r.q75, "{r:?}");
            assert!(r.q75 <= r.max, "{r:?}");
        }
    }

    #[test]
    fn sample_standard_deviation_uses_n_minus_one() {
        // Samples 2, 4, 6: mean 4, squared deviations 4 + 0 + 4 = 8,
        // variance 8 / 2 = 4, std dev 2.
        let result = analyze(&dataset(&[2, 4, 6])).unwrap();
        assert_eq!(result.std_dev, 2);
        assert_eq!(result.variation_coefficient, Some(0.5));
    }

    #[test]
    fn single_sample_has_zero_spread() {
        let result = analyze(&dataset(&[500])).unwrap();
        assert_eq!(result.std_dev, 0);
        assert_eq!(result.min, 500);
        assert_eq!(result.max, 500);
        assert_eq!(result.median, 500);
    }

    #[test]
    fn zero_mean_flags_the_variation_coefficient_undefined() {
        let result = analyze(&dataset(&[0, 0, 0])).unwrap();
        assert_eq!(result.mean, 0);
        assert_eq!(result.variation_coefficient, None);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let ds = Dataset::new(7);
        let err = analyze(&ds).unwrap_err();
        assert_eq!(err, MeasureError::EmptyDataset { segment: 7 });
    }

    #[test]
    fn caller_dataset_order_is_untouched() {
        let ds = dataset(&[30, 10, 20]);
        let before = ds.clone();
        analyze(&ds).unwrap();
        assert_eq!(ds, before);
    }

    #[test]
    fn fault_sentinels_enter_as_zeros_not_dropped() {
        let mut ds = dataset(&[100, 110, 120, 95]);
        ds.samples.insert(2, DurationSample::Fault);
        let result = analyze(&ds).unwrap();
        // (100 + 110 + 0 + 120 + 95) / 5 = 85.
        assert_eq!(result.mean, 85);
        assert_eq!(result.min, 0);
        assert_eq!(ds.len(), 5);
    }
}
