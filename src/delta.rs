//! Cumulative-to-incremental statistic differencing.
//!
//! Every segment is timed from the true start of the handshake, so the
//! k-th cumulative result covers everything up to the end of prefix k.
//! Differencing adjacent cumulative results yields the marginal time
//! consumed by the actions unique to each segment.
//!
//! The spread bounds are a low/high envelope: the k-th bound subtracts
//! the neighbor's mean *offset by its own standard deviation*, summing
//! the two deviations instead of combining them in quadrature. The
//! envelope is therefore wider than a quadrature combination would be.

use serde::Serialize;

use crate::stats::StatisticResult;

/// Incremental statistics for one segment, derived from the pair of
/// adjacent cumulative results. Purely a derived view: no sample set
/// backs it, and it must be recomputed if either input changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentStatistic {
    /// Marginal duration by mean, ns.
    pub mean_delta: i64,
    /// Marginal duration by median, ns.
    pub median_delta: i64,
    /// Marginal duration by minimum, ns.
    pub min_delta: i64,
    /// Lower edge of the naive spread envelope, ns.
    pub std_dev_bound_low: i64,
    /// Upper edge of the naive spread envelope, ns.
    pub std_dev_bound_high: i64,
}

/// Convert an ordered cumulative series into incremental per-segment
/// statistics. Output length equals input length; an empty input yields
/// an empty output.
pub fn diff(cumulative: &[StatisticResult]) -> Vec<SegmentStatistic> {
    let mut segments = Vec::with_capacity(cumulative.len());

    if let Some(first) = cumulative.first() {
        // Segment 0 is measured against a zero baseline.
        segments.push(SegmentStatistic {
            mean_delta: first.mean as i64,
            median_delta: first.median as i64,
            min_delta: first.min as i64,
            std_dev_bound_low: first.mean as i64 - first.std_dev as i64,
            std_dev_bound_high: first.mean as i64 + first.std_dev as i64,
        });
    }

    for pair in cumulative.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        segments.push(SegmentStatistic {
            mean_delta: curr.mean as i64 - prev.mean as i64,
            median_delta: curr.median as i64 - prev.median as i64,
            min_delta: curr.min as i64 - prev.min as i64,
            std_dev_bound_low: (curr.mean as i64 - curr.std_dev as i64)
                - (prev.mean as i64 + prev.std_dev as i64),
            std_dev_bound_high: (curr.mean as i64 + curr.std_dev as i64)
                - (prev.mean as i64 - prev.std_dev as i64),
        });
    }

    segments
}
