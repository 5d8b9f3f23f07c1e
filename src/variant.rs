//! Handshake variants and their declarative step plans.
//!
//! Each [`HandshakeVariant`] names one end-to-end scenario (version,
//! authentication mode, resumption mode). A variant maps to a static,
//! ordered list of [`StepSpec`] entries; the segmenter in
//! [`crate::segment`] is a single generic interpreter over these tables,
//! so adding a scenario means adding a table, not a code branch.

use std::fmt;

use serde::Serialize;

use crate::config::TlsVersion;
use crate::trace::MessageKind;

/// One entry of a variant's plan: a step plus whether the prefix ending
/// at this step is worth timing on its own.
///
/// `measured: false` prefixes are stepping stones toward a later, more
/// interesting prefix; they are still produced as segments so that the
/// measured segments form a true prefix chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSpec {
    /// The protocol step to append.
    pub step: Step,
    /// Whether the prefix ending here is independently timed.
    pub measured: bool,
}

impl StepSpec {
    const fn run(step: Step) -> Self {
        Self {
            step,
            measured: true,
        }
    }

    const fn skip(step: Step) -> Self {
        Self {
            step,
            measured: false,
        }
    }
}

/// Abstract plan step, resolved to a concrete [`crate::trace::Action`]
/// by the segmenter.
///
/// The two hello shapes are distinct on purpose: the initial flow's
/// ClientHello never carries resumption offers, the resumption flow's
/// does. Which offers the resumption hello carries is decided per
/// variant, never by mutating an already-built message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// ClientHello of the first flow (no PSK, no early data).
    InitialHello,
    /// ClientHello of the resumption flow (PSK, optionally early data).
    ResumptionHello,
    /// Receive records until the given message.
    ReceiveTill(MessageKind),
    /// Send the client Certificate.
    Certificate,
    /// Send the client CertificateVerify.
    CertificateVerify,
    /// Send the ClientKeyExchange (TLS 1.2).
    ClientKeyExchange,
    /// Send the ChangeCipherSpec marker (TLS 1.2).
    ChangeCipherSpec,
    /// Send the client Finished.
    Finished,
    /// Send zero-RTT application data.
    EarlyData,
    /// Send EndOfEarlyData.
    EndOfEarlyData,
    /// Reset the connection before the resumption flow.
    Reset,
}

/// TLS 1.2 key-exchange flavor a variant expects from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KxFlavor {
    /// Ephemeral (DHE/ECDHE) key exchange.
    Ephemeral,
    /// Static RSA key transport.
    Static,
}

/// A named handshake scenario to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HandshakeVariant {
    /// TLS 1.2, ephemeral key exchange, no client auth.
    Tls12EphemeralNoClientAuth,
    /// TLS 1.2, ephemeral key exchange, no client auth, ticket resumption.
    Tls12EphemeralNoClientAuthResumption,
    /// TLS 1.2, ephemeral key exchange, client auth.
    Tls12EphemeralClientAuth,
    /// TLS 1.2, ephemeral key exchange, client auth, ticket resumption.
    Tls12EphemeralClientAuthResumption,
    /// TLS 1.2, static RSA key exchange, no client auth.
    Tls12StaticNoClientAuth,
    /// TLS 1.2, static RSA key exchange, no client auth, ticket resumption.
    Tls12StaticNoClientAuthResumption,
    /// TLS 1.2, static RSA key exchange, client auth.
    Tls12StaticClientAuth,
    /// TLS 1.2, static RSA key exchange, client auth, ticket resumption.
    Tls12StaticClientAuthResumption,
    /// TLS 1.3, no client auth.
    Tls13NoClientAuth,
    /// TLS 1.3, no client auth, ticket resumption.
    Tls13NoClientAuthResumption,
    /// TLS 1.3, no client auth, resumption with zero-RTT early data.
    Tls13NoClientAuthZeroRtt,
    /// TLS 1.3, client auth.
    Tls13ClientAuth,
    /// TLS 1.3, client auth, ticket resumption.
    Tls13ClientAuthResumption,
}

use HandshakeVariant::*;
use MessageKind::{Finished as FinMsg, NewSessionTicket, ServerHelloDone};

/// TLS 1.2 ephemeral full handshake without client auth. Measured
/// points: end of the server's first flight and end of the handshake.
const TLS12_EPHEMERAL_NO_AUTH: &[StepSpec] = &[
    StepSpec::skip(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(ServerHelloDone)),
    StepSpec::skip(Step::ClientKeyExchange),
    StepSpec::skip(Step::ChangeCipherSpec),
    StepSpec::skip(Step::Finished),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
];

/// TLS 1.2 static-RSA full handshake without client auth. The static
/// flavor times more of its prefixes: the ClientHello, the server's
/// first flight, the client's Finished flight, and the handshake end.
const TLS12_STATIC_NO_AUTH: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(ServerHelloDone)),
    StepSpec::skip(Step::ClientKeyExchange),
    StepSpec::skip(Step::ChangeCipherSpec),
    StepSpec::run(Step::Finished),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
];

/// TLS 1.2 with ticket resumption: the full handshake, a connection
/// reset, and the abbreviated second flow.
const TLS12_NO_AUTH_RESUMPTION: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(ServerHelloDone)),
    StepSpec::skip(Step::ClientKeyExchange),
    StepSpec::skip(Step::ChangeCipherSpec),
    StepSpec::run(Step::Finished),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Reset),
    StepSpec::run(Step::ResumptionHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::skip(Step::ChangeCipherSpec),
    StepSpec::run(Step::Finished),
];

/// TLS 1.2 with client authentication.
const TLS12_CLIENT_AUTH: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(ServerHelloDone)),
    StepSpec::run(Step::Certificate),
    StepSpec::run(Step::ClientKeyExchange),
    StepSpec::run(Step::CertificateVerify),
    StepSpec::skip(Step::ChangeCipherSpec),
    StepSpec::run(Step::Finished),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
];

/// TLS 1.2 with client authentication and ticket resumption.
const TLS12_CLIENT_AUTH_RESUMPTION: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(ServerHelloDone)),
    StepSpec::run(Step::Certificate),
    StepSpec::run(Step::ClientKeyExchange),
    StepSpec::run(Step::CertificateVerify),
    StepSpec::skip(Step::ChangeCipherSpec),
    StepSpec::run(Step::Finished),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Reset),
    StepSpec::run(Step::ResumptionHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::skip(Step::ChangeCipherSpec),
    StepSpec::run(Step::Finished),
];

/// TLS 1.3 full handshake: only the completed handshake is interesting,
/// the earlier prefixes are stepping stones.
const TLS13_NO_AUTH: &[StepSpec] = &[
    StepSpec::skip(Step::InitialHello),
    StepSpec::skip(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Finished),
];

/// TLS 1.3 with ticket resumption.
const TLS13_NO_AUTH_RESUMPTION: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Finished),
    StepSpec::run(Step::ReceiveTill(NewSessionTicket)),
    StepSpec::run(Step::Reset),
    StepSpec::run(Step::ResumptionHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Finished),
];

/// TLS 1.3 resumption with zero-RTT early data in the second flow.
const TLS13_NO_AUTH_ZERO_RTT: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Finished),
    StepSpec::run(Step::ReceiveTill(NewSessionTicket)),
    StepSpec::run(Step::Reset),
    StepSpec::run(Step::ResumptionHello),
    StepSpec::run(Step::EarlyData),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::skip(Step::EndOfEarlyData),
    StepSpec::run(Step::Finished),
];

/// TLS 1.3 with client authentication.
const TLS13_CLIENT_AUTH: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Certificate),
    StepSpec::run(Step::CertificateVerify),
    StepSpec::run(Step::Finished),
];

/// TLS 1.3 with client authentication and ticket resumption.
const TLS13_CLIENT_AUTH_RESUMPTION: &[StepSpec] = &[
    StepSpec::run(Step::InitialHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Certificate),
    StepSpec::run(Step::CertificateVerify),
    StepSpec::run(Step::Finished),
    StepSpec::run(Step::ReceiveTill(NewSessionTicket)),
    StepSpec::run(Step::Reset),
    StepSpec::run(Step::ResumptionHello),
    StepSpec::run(Step::ReceiveTill(FinMsg)),
    StepSpec::run(Step::Finished),
];

impl HandshakeVariant {
    /// All variants, in declaration order.
    pub const ALL: [HandshakeVariant; 13] = [
        Tls12EphemeralNoClientAuth,
        Tls12EphemeralNoClientAuthResumption,
        Tls12EphemeralClientAuth,
        Tls12EphemeralClientAuthResumption,
        Tls12StaticNoClientAuth,
        Tls12StaticNoClientAuthResumption,
        Tls12StaticClientAuth,
        Tls12StaticClientAuthResumption,
        Tls13NoClientAuth,
        Tls13NoClientAuthResumption,
        Tls13NoClientAuthZeroRtt,
        Tls13ClientAuth,
        Tls13ClientAuthResumption,
    ];

    /// The ordered step plan for this variant.
    ///
    /// The client's message sequence is the same for the ephemeral and
    /// static TLS 1.2 flavors; where they differ is which prefixes are
    /// worth timing.
    pub fn plan(self) -> &'static [StepSpec] {
        match self {
            Tls12EphemeralNoClientAuth => TLS12_EPHEMERAL_NO_AUTH,
            Tls12StaticNoClientAuth => TLS12_STATIC_NO_AUTH,
            Tls12EphemeralNoClientAuthResumption | Tls12StaticNoClientAuthResumption => {
                TLS12_NO_AUTH_RESUMPTION
            }
            Tls12EphemeralClientAuth | Tls12StaticClientAuth => TLS12_CLIENT_AUTH,
            Tls12EphemeralClientAuthResumption | Tls12StaticClientAuthResumption => {
                TLS12_CLIENT_AUTH_RESUMPTION
            }
            Tls13NoClientAuth => TLS13_NO_AUTH,
            Tls13NoClientAuthResumption => TLS13_NO_AUTH_RESUMPTION,
            Tls13NoClientAuthZeroRtt => TLS13_NO_AUTH_ZERO_RTT,
            Tls13ClientAuth => TLS13_CLIENT_AUTH,
            Tls13ClientAuthResumption => TLS13_CLIENT_AUTH_RESUMPTION,
        }
    }

    /// Protocol version this variant runs under.
    pub fn version(self) -> TlsVersion {
        match self {
            Tls12EphemeralNoClientAuth
            | Tls12EphemeralNoClientAuthResumption
            | Tls12EphemeralClientAuth
            | Tls12EphemeralClientAuthResumption
            | Tls12StaticNoClientAuth
            | Tls12StaticNoClientAuthResumption
            | Tls12StaticClientAuth
            | Tls12StaticClientAuthResumption => TlsVersion::Tls12,
            Tls13NoClientAuth
            | Tls13NoClientAuthResumption
            | Tls13NoClientAuthZeroRtt
            | Tls13ClientAuth
            | Tls13ClientAuthResumption => TlsVersion::Tls13,
        }
    }

    /// Key-exchange flavor a TLS 1.2 variant expects; `None` for TLS 1.3,
    /// where key transport is always ephemeral.
    pub fn kx_flavor(self) -> Option<KxFlavor> {
        match self {
            Tls12EphemeralNoClientAuth
            | Tls12EphemeralNoClientAuthResumption
            | Tls12EphemeralClientAuth
            | Tls12EphemeralClientAuthResumption => Some(KxFlavor::Ephemeral),
            Tls12StaticNoClientAuth
            | Tls12StaticNoClientAuthResumption
            | Tls12StaticClientAuth
            | Tls12StaticClientAuthResumption => Some(KxFlavor::Static),
            _ => None,
        }
    }

    /// Whether this variant resumes a session after a connection reset.
    pub fn resumes(self) -> bool {
        self.plan().iter().any(|spec| spec.step == Step::Reset)
    }

    /// Whether this variant sends zero-RTT early data.
    pub fn uses_early_data(self) -> bool {
        self.plan().iter().any(|spec| spec.step == Step::EarlyData)
    }

    /// Whether this variant authenticates the client.
    pub fn authenticates_client(self) -> bool {
        self.plan()
            .iter()
            .any(|spec| spec.step == Step::CertificateVerify)
    }
}

impl fmt::Display for HandshakeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tls12EphemeralNoClientAuth => "TLS 1.2 ephemeral, no client auth",
            Tls12EphemeralNoClientAuthResumption => {
                "TLS 1.2 ephemeral, no client auth, resumption"
            }
            Tls12EphemeralClientAuth => "TLS 1.2 ephemeral, client auth",
            Tls12EphemeralClientAuthResumption => "TLS 1.2 ephemeral, client auth, resumption",
            Tls12StaticNoClientAuth => "TLS 1.2 static, no client auth",
            Tls12StaticNoClientAuthResumption => "TLS 1.2 static, no client auth, resumption",
            Tls12StaticClientAuth => "TLS 1.2 static, client auth",
            Tls12StaticClientAuthResumption => "TLS 1.2 static, client auth, resumption",
            Tls13NoClientAuth => "TLS 1.3, no client auth",
            Tls13NoClientAuthResumption => "TLS 1.3, no client auth, resumption",
            Tls13NoClientAuthZeroRtt => "TLS 1.3, no client auth, zero-RTT",
            Tls13ClientAuth => "TLS 1.3, client auth",
            Tls13ClientAuthResumption => "TLS 1.3, client auth, resumption",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_nonempty_plan() {
        for variant in HandshakeVariant::ALL {
            assert!(!variant.plan().is_empty(), "{variant} has an empty plan");
        }
    }

    #[test]
    fn every_plan_starts_with_the_initial_hello() {
        for variant in HandshakeVariant::ALL {
            assert_eq!(variant.plan()[0].step, Step::InitialHello);
        }
    }

    #[test]
    fn every_plan_has_at_least_one_measured_prefix() {
        for variant in HandshakeVariant::ALL {
            assert!(variant.plan().iter().any(|spec| spec.measured));
        }
    }

    #[test]
    fn resumption_plans_place_the_resumption_hello_after_the_reset() {
        for variant in HandshakeVariant::ALL.into_iter().filter(|v| v.resumes()) {
            let plan = variant.plan();
            let reset = plan.iter().position(|s| s.step == Step::Reset).unwrap();
            let hello = plan
                .iter()
                .position(|s| s.step == Step::ResumptionHello)
                .unwrap();
            assert!(hello == reset + 1, "{variant}: hello must follow the reset");
        }
    }

    #[test]
    fn non_resumption_plans_have_no_second_flow_steps() {
        for variant in HandshakeVariant::ALL.into_iter().filter(|v| !v.resumes()) {
            let plan = variant.plan();
            assert!(plan.iter().all(|s| s.step != Step::ResumptionHello));
            assert!(plan.iter().all(|s| s.step != Step::EarlyData));
        }
    }

    #[test]
    fn zero_rtt_is_the_only_early_data_variant() {
        for variant in HandshakeVariant::ALL {
            assert_eq!(
                variant.uses_early_data(),
                variant == Tls13NoClientAuthZeroRtt
            );
        }
    }

    #[test]
    fn client_auth_flags_match_the_plans() {
        assert!(Tls12EphemeralClientAuth.authenticates_client());
        assert!(Tls13ClientAuthResumption.authenticates_client());
        assert!(!Tls13NoClientAuth.authenticates_client());
        assert!(!Tls12StaticNoClientAuthResumption.authenticates_client());
    }

    #[test]
    fn static_no_auth_times_more_prefixes_than_ephemeral() {
        let measured = |v: HandshakeVariant| v.plan().iter().filter(|s| s.measured).count();
        assert_eq!(measured(Tls12EphemeralNoClientAuth), 2);
        assert_eq!(measured(Tls12StaticNoClientAuth), 4);

        let plan = Tls12StaticNoClientAuth.plan();
        assert!(plan[0].measured, "ClientHello prefix is timed");
        assert!(plan
            .iter()
            .any(|s| s.step == Step::Finished && s.measured));
    }

    #[test]
    fn versions_split_as_expected() {
        assert_eq!(Tls12StaticClientAuth.version(), TlsVersion::Tls12);
        assert_eq!(Tls13NoClientAuthZeroRtt.version(), TlsVersion::Tls13);
        assert_eq!(
            Tls12EphemeralNoClientAuth.kx_flavor(),
            Some(KxFlavor::Ephemeral)
        );
        assert_eq!(Tls12StaticNoClientAuth.kx_flavor(), Some(KxFlavor::Static));
        assert_eq!(Tls13ClientAuth.kx_flavor(), None);
    }
}
