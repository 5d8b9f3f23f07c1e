//! Measurement runner: execute every measured segment R times.
//!
//! Repetitions within a segment and segments within a run execute
//! strictly sequentially. Concurrent handshakes would contend for host
//! resources and bias the very timing signal being measured, so there is
//! deliberately no parallelism here.
//!
//! Fault policy: a repetition whose handshake does not complete is kept
//! in the dataset as a zero-nanosecond sentinel, so every dataset has
//! exactly `repetitions` entries before outlier filtering and faults
//! visibly drag the lower tail of the distribution. Fault counts are
//! tracked per dataset for reporting.

use serde::Serialize;

use crate::executor::ProtocolExecutor;
use crate::segment::Segment;

/// One elapsed-time measurement, or a sentinel for a failed repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DurationSample {
    /// Successful repetition; elapsed wall-clock time in nanoseconds.
    Elapsed(u64),
    /// The handshake prefix did not complete.
    Fault,
}

impl DurationSample {
    /// The sample value entering statistics: elapsed nanoseconds, with
    /// faults contributing zero.
    pub fn nanos(self) -> u64 {
        match self {
            Self::Elapsed(n) => n,
            Self::Fault => 0,
        }
    }

    /// Whether this sample is a fault sentinel.
    pub fn is_fault(self) -> bool {
        matches!(self, Self::Fault)
    }
}

/// The repetition samples collected for one measured segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Index of the segment (within the variant's full segment list)
    /// these samples belong to.
    pub segment_index: usize,
    /// Samples in collection order, one per repetition.
    pub samples: Vec<DurationSample>,
}

impl Dataset {
    /// Create a dataset for the given segment.
    pub fn new(segment_index: usize) -> Self {
        Self {
            segment_index,
            samples: Vec::new(),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of fault sentinels among the samples.
    pub fn fault_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_fault()).count()
    }

    /// Sample values in nanoseconds, faults as zero, collection order.
    pub fn nanos(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.nanos()).collect()
    }
}

/// Execute every measured segment's prefix `repetitions` times and
/// collect one [`Dataset`] per measured segment, in segment order.
///
/// Unmeasured segments are stepping stones only and are never executed.
/// A protocol fault is logged and recorded as a sentinel; it never
/// aborts the run.
pub fn run<E: ProtocolExecutor>(
    executor: &mut E,
    segments: &[Segment],
    repetitions: usize,
) -> Vec<Dataset> {
    let mut datasets = Vec::new();

    for segment in segments.iter().filter(|s| s.measured) {
        let mut dataset = Dataset::new(segment.index);
        log::debug!(
            "measuring segment {} ({}) x{repetitions}",
            segment.index,
            segment.label
        );

        for repetition in 0..repetitions {
            match executor.execute(&segment.actions) {
                Ok(elapsed) => {
                    dataset
                        .samples
                        .push(DurationSample::Elapsed(elapsed.as_nanos() as u64));
                }
                Err(fault) => {
                    log::warn!(
                        "segment {} repetition {repetition}: {fault}; recording sentinel",
                        segment.index
                    );
                    dataset.samples.push(DurationSample::Fault);
                }
            }
        }

        if dataset.fault_count() > 0 {
            log::info!(
                "segment {}: {}/{} repetitions faulted",
                segment.index,
                dataset.fault_count(),
                repetitions
            );
        }
        datasets.push(dataset);
    }

    datasets
}
