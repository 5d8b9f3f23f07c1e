//! End-to-end measurement pipeline.
//!
//! [`HandshakeProfiler`] wires the stages together: segmentation,
//! repeated execution, optional outlier trimming, cumulative statistics
//! and incremental differencing. Stages hand datasets onward by
//! ownership; nothing is mutated after it is produced, only replaced.

use serde::Serialize;

use crate::config::MeasurementConfig;
use crate::delta::{self, SegmentStatistic};
use crate::error::MeasureError;
use crate::executor::ProtocolExecutor;
use crate::outlier;
use crate::runner::{self, Dataset};
use crate::segment::{self, Segment};
use crate::stats::{self, StatisticResult};
use crate::variant::HandshakeVariant;

/// Default repetitions per segment when none are configured.
pub const DEFAULT_REPETITIONS: usize = 50;

/// The duration matrix and both statistic series for one dataset state
/// (raw, or cleaned after outlier trimming).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSet {
    /// One dataset per measured segment, in segment order.
    pub datasets: Vec<Dataset>,
    /// Cumulative statistics, one per measured segment.
    pub cumulative: Vec<StatisticResult>,
    /// Incremental statistics, same length as `cumulative`.
    pub incremental: Vec<SegmentStatistic>,
}

impl AnalysisSet {
    fn from_datasets(datasets: Vec<Dataset>) -> Result<Self, MeasureError> {
        let cumulative = datasets
            .iter()
            .map(stats::analyze)
            .collect::<Result<Vec<_>, _>>()?;
        let incremental = delta::diff(&cumulative);
        Ok(Self {
            datasets,
            cumulative,
            incremental,
        })
    }
}

/// Everything one `measure` call produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// The variant that was measured.
    pub variant: HandshakeVariant,
    /// The configuration it ran under.
    pub config: MeasurementConfig,
    /// All segments of the variant, measured or not.
    pub segments: Vec<Segment>,
    /// Repetitions per measured segment.
    pub repetitions: usize,
    /// Outlier percentage that produced `cleaned`, 0 if disabled.
    pub outlier_percent: u8,
    /// Analysis over the raw duration matrix.
    pub raw: AnalysisSet,
    /// Analysis after outlier trimming; `None` when trimming was off.
    pub cleaned: Option<AnalysisSet>,
}

impl RunReport {
    /// The measured segments, in order.
    pub fn measured_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.measured)
    }

    /// Total fault sentinels across the raw matrix.
    pub fn fault_count(&self) -> usize {
        self.raw.datasets.iter().map(Dataset::fault_count).sum()
    }
}

/// Builder-style entry point for segmented handshake timing runs.
///
/// ```no_run
/// use segtimer::config::*;
/// use segtimer::executor::ScriptedExecutor;
/// use segtimer::pipeline::HandshakeProfiler;
/// use segtimer::variant::HandshakeVariant;
///
/// let config = MeasurementConfig::new(
///     TlsVersion::Tls13,
///     KeyExchange::Ecdhe,
///     ServerAuth::Ecdsa,
///     HashAlgo::Sha256,
///     BulkAlgo::Aes128Gcm,
/// );
/// let mut executor = ScriptedExecutor::new();
/// let report = HandshakeProfiler::new(config)
///     .repetitions(100)
///     .outlier_percent(10)
///     .measure(HandshakeVariant::Tls13NoClientAuth, &mut executor)?;
/// # Ok::<(), segtimer::error::MeasureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HandshakeProfiler {
    config: MeasurementConfig,
    repetitions: usize,
    outlier_percent: u8,
}

impl HandshakeProfiler {
    /// Create a profiler with [`DEFAULT_REPETITIONS`] and outlier
    /// trimming disabled.
    pub fn new(config: MeasurementConfig) -> Self {
        Self {
            config,
            repetitions: DEFAULT_REPETITIONS,
            outlier_percent: 0,
        }
    }

    /// Set the repetition count per measured segment.
    pub fn repetitions(mut self, n: usize) -> Self {
        self.repetitions = n;
        self
    }

    /// Set the upper-tail outlier percentage in `[0, 100)`; 0 disables
    /// trimming. Validated when `measure` runs.
    pub fn outlier_percent(mut self, percent: u8) -> Self {
        self.outlier_percent = percent;
        self
    }

    /// The configuration this profiler measures under.
    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    /// Run the full pipeline for one variant.
    ///
    /// Validation and segmentation happen before the first executor
    /// call, so an unsupported variant never produces network traffic.
    ///
    /// # Errors
    ///
    /// [`MeasureError::InvalidOutlierPercent`] for a percentage outside
    /// `[0, 100)`, [`MeasureError::UnsupportedVariant`] from
    /// segmentation, and [`MeasureError::EmptyDataset`] when a segment
    /// ends up with no samples to analyze.
    pub fn measure<E: ProtocolExecutor>(
        &self,
        variant: HandshakeVariant,
        executor: &mut E,
    ) -> Result<RunReport, MeasureError> {
        if self.outlier_percent >= 100 {
            return Err(MeasureError::InvalidOutlierPercent(self.outlier_percent));
        }

        let segments = segment::segment(variant, &self.config)?;
        log::info!(
            "measuring {variant}: {} measured segments x {} repetitions",
            segments.iter().filter(|s| s.measured).count(),
            self.repetitions
        );

        let datasets = runner::run(executor, &segments, self.repetitions);

        let cleaned = if self.outlier_percent > 0 {
            let trimmed = outlier::trim_upper(datasets.clone(), self.outlier_percent);
            Some(AnalysisSet::from_datasets(trimmed)?)
        } else {
            None
        };
        let raw = AnalysisSet::from_datasets(datasets)?;

        Ok(RunReport {
            variant,
            config: self.config.clone(),
            segments,
            repetitions: self.repetitions,
            outlier_percent: self.outlier_percent,
            raw,
            cleaned,
        })
    }
}
