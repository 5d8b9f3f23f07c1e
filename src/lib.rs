//! # segtimer
//!
//! Segmented timing measurement for multi-step protocol handshakes.
//!
//! The crate decomposes a named handshake variant into an ordered list
//! of measurable prefixes ("segments"), executes each prefix repeatedly
//! through an external protocol engine, and turns the resulting matrix
//! of cumulative elapsed-time samples into statistically sound
//! per-segment duration estimates with outlier control. Comparing the
//! per-segment numbers across variants (full vs. resumed handshake,
//! with vs. without client auth, with vs. without early data) exposes
//! timing side channels between them.
//!
//! Message construction, cryptography and wire encoding are delegated
//! to whatever implements [`executor::ProtocolExecutor`]; the core only
//! assumes `execute(prefix)` either reports an elapsed time or a fault.
//!
//! ## Pipeline
//!
//! ```text
//! variant name -> segmenter -> segments -> runner (+ executor)
//!   -> raw matrix -> outlier trim (optional) -> cumulative statistics
//!   -> incremental differencing -> report
//! ```
//!
//! Everything runs strictly sequentially: concurrent handshakes would
//! share ports and scheduler time with each other and bias the very
//! signal being measured.
//!
//! ## Quick Start
//!
//! ```no_run
//! use segtimer::config::*;
//! use segtimer::pipeline::HandshakeProfiler;
//! use segtimer::variant::HandshakeVariant;
//! # use segtimer::executor::ScriptedExecutor;
//!
//! let config = MeasurementConfig::new(
//!     TlsVersion::Tls13,
//!     KeyExchange::Ecdhe,
//!     ServerAuth::Ecdsa,
//!     HashAlgo::Sha256,
//!     BulkAlgo::Aes128Gcm,
//! )
//! .extension(Extension::SessionResumption);
//!
//! # let mut executor = ScriptedExecutor::new();
//! let report = HandshakeProfiler::new(config)
//!     .repetitions(200)
//!     .outlier_percent(5)
//!     .measure(HandshakeVariant::Tls13NoClientAuthResumption, &mut executor)?;
//!
//! println!("{}", segtimer::report::render_summary(&report));
//! # Ok::<(), segtimer::error::MeasureError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod delta;
pub mod error;
pub mod executor;
pub mod outlier;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod segment;
pub mod stats;
pub mod trace;
pub mod variant;

pub use config::MeasurementConfig;
pub use delta::SegmentStatistic;
pub use error::{MeasureError, ProtocolFault};
pub use executor::{ProtocolExecutor, ScriptedExecutor};
pub use pipeline::{AnalysisSet, HandshakeProfiler, RunReport};
pub use runner::{Dataset, DurationSample};
pub use segment::Segment;
pub use stats::StatisticResult;
pub use trace::{Action, ActionSequence, MessageKind};
pub use variant::HandshakeVariant;
