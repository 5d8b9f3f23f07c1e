//! Error types for the measurement pipeline.
//!
//! Configuration and segmentation problems fail fast before any network
//! traffic is produced. Per-repetition protocol faults are deliberately
//! *not* errors at the pipeline level: they are absorbed into the dataset
//! as sentinel samples (see [`crate::runner::DurationSample`]).

use thiserror::Error;

use crate::variant::HandshakeVariant;

/// Fatal errors surfaced by a single `measure` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeasureError {
    /// The requested handshake variant cannot be segmented under the
    /// given configuration (unknown combination or structurally invalid,
    /// e.g. zero-RTT without the early-data extension).
    #[error("unsupported handshake variant {variant}: {reason}")]
    UnsupportedVariant {
        /// The variant that was requested.
        variant: HandshakeVariant,
        /// Why the variant/configuration combination is rejected.
        reason: String,
    },

    /// Statistics were requested over zero samples, e.g. because the
    /// outlier percentage consumed the entire dataset.
    #[error("segment {segment} has no samples to analyze")]
    EmptyDataset {
        /// Index of the segment whose dataset was empty.
        segment: usize,
    },

    /// The outlier percentage is outside the valid `[0, 100)` range.
    #[error("outlier percentage {0} is outside [0, 100)")]
    InvalidOutlierPercent(u8),
}

/// A single repetition's handshake did not complete.
///
/// Not fatal: the measurement runner records a sentinel sample and
/// continues with the remaining repetitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("protocol execution fault: {message}")]
pub struct ProtocolFault {
    /// What the protocol engine reported.
    pub message: String,
}

impl ProtocolFault {
    /// Build a fault from anything that converts into a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_variant_message_names_variant_and_reason() {
        let err = MeasureError::UnsupportedVariant {
            variant: HandshakeVariant::Tls13NoClientAuthZeroRtt,
            reason: "early-data extension not configured".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TLS 1.3"));
        assert!(msg.contains("early-data extension not configured"));
    }

    #[test]
    fn empty_dataset_message_names_segment() {
        let err = MeasureError::EmptyDataset { segment: 3 };
        assert_eq!(err.to_string(), "segment 3 has no samples to analyze");
    }

    #[test]
    fn protocol_fault_displays_message() {
        let fault = ProtocolFault::new("connection reset");
        assert_eq!(fault.to_string(), "protocol execution fault: connection reset");
    }
}
