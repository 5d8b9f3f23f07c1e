//! Trace segmentation: variant plan -> ordered list of measurable prefixes.
//!
//! The segmenter walks a variant's declarative plan left to right,
//! appending each step's action to a running [`ActionSequence`] and
//! snapshotting the sequence after every step. Snapshots are
//! copy-on-branch, so no later step can retroactively alter an earlier
//! segment. Validation happens before the first action is built:
//! structurally invalid variant/configuration combinations are rejected
//! with [`MeasureError::UnsupportedVariant`] and never produce a partial
//! segment list.

use serde::Serialize;

use crate::config::{Extension, KeyExchange, MeasurementConfig};
use crate::error::MeasureError;
use crate::trace::{Action, ActionSequence};
use crate::variant::{HandshakeVariant, KxFlavor, Step};

/// A prefix of a handshake's action sequence, produced by [`segment`].
///
/// Immutable once produced. Among segments with `measured == true`,
/// segment `i`'s actions are a true prefix of segment `i + 1`'s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Position in the variant's plan (0-based, counts every prefix,
    /// measured or not).
    pub index: usize,
    /// Human-readable description of the step that ends this prefix.
    pub label: String,
    /// The actions of this prefix.
    pub actions: ActionSequence,
    /// Whether this prefix is independently timed.
    pub measured: bool,
}

/// Produce the ordered segment list for `variant` under `config`.
///
/// Deterministic: identical inputs yield structurally identical output.
///
/// # Errors
///
/// [`MeasureError::UnsupportedVariant`] when the combination is
/// structurally invalid: version mismatch, zero-RTT without the
/// early-data extension, resumption without the resumption extension,
/// client auth without a client certificate, or a TLS 1.2 key-exchange
/// flavor the configuration does not provide.
pub fn segment(
    variant: HandshakeVariant,
    config: &MeasurementConfig,
) -> Result<Vec<Segment>, MeasureError> {
    validate(variant, config)?;

    let mut running = ActionSequence::new();
    let mut segments = Vec::with_capacity(variant.plan().len());

    for (index, spec) in variant.plan().iter().enumerate() {
        let action = build_action(spec.step, variant);
        running.push(action);
        segments.push(Segment {
            index,
            label: format!("{action}"),
            actions: running.snapshot(),
            measured: spec.measured,
        });
    }

    log::debug!(
        "segmented {variant}: {} prefixes, {} measured",
        segments.len(),
        segments.iter().filter(|s| s.measured).count()
    );
    Ok(segments)
}

/// Resolve an abstract plan step to a concrete action.
///
/// The hello offers are fixed per flow: the initial hello never offers
/// PSK or early data, the resumption hello always offers PSK and offers
/// early data exactly for zero-RTT variants.
fn build_action(step: Step, variant: HandshakeVariant) -> Action {
    match step {
        Step::InitialHello => Action::SendClientHello {
            offer_psk: false,
            offer_early_data: false,
        },
        Step::ResumptionHello => Action::SendClientHello {
            offer_psk: true,
            offer_early_data: variant.uses_early_data(),
        },
        Step::ReceiveTill(kind) => Action::ReceiveTill(kind),
        Step::Certificate => Action::SendCertificate,
        Step::CertificateVerify => Action::SendCertificateVerify,
        Step::ClientKeyExchange => Action::SendClientKeyExchange,
        Step::ChangeCipherSpec => Action::SendChangeCipherSpec,
        Step::Finished => Action::SendFinished,
        Step::EarlyData => Action::SendEarlyData,
        Step::EndOfEarlyData => Action::SendEndOfEarlyData,
        Step::Reset => Action::ResetConnection,
    }
}

fn unsupported(variant: HandshakeVariant, reason: impl Into<String>) -> MeasureError {
    MeasureError::UnsupportedVariant {
        variant,
        reason: reason.into(),
    }
}

fn validate(variant: HandshakeVariant, config: &MeasurementConfig) -> Result<(), MeasureError> {
    if variant.version() != config.version {
        return Err(unsupported(
            variant,
            format!(
                "variant requires {} but the configuration is {}",
                variant.version(),
                config.version
            ),
        ));
    }
    if variant.resumes() && !config.has_extension(Extension::SessionResumption) {
        return Err(unsupported(
            variant,
            "session-resumption extension not configured",
        ));
    }
    if variant.uses_early_data() && !config.has_extension(Extension::EarlyData) {
        return Err(unsupported(variant, "early-data extension not configured"));
    }
    if variant.authenticates_client() && !config.client_certificate {
        return Err(unsupported(variant, "no client certificate configured"));
    }
    match variant.kx_flavor() {
        Some(KxFlavor::Ephemeral) if config.key_exchange == KeyExchange::Rsa => Err(unsupported(
            variant,
            "ephemeral variant requires DHE or ECDHE key exchange",
        )),
        Some(KxFlavor::Static) if config.key_exchange != KeyExchange::Rsa => Err(unsupported(
            variant,
            "static variant requires RSA key exchange",
        )),
        None if config.version == crate::config::TlsVersion::Tls13
            && config.key_exchange == KeyExchange::Rsa =>
        {
            Err(unsupported(
                variant,
                "TLS 1.3 has no static RSA key exchange",
            ))
        }
        _ => Ok(()),
    }
}
