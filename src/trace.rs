//! Protocol action catalog and branch-safe action sequences.
//!
//! An [`ActionSequence`] is the unit of work handed to the external
//! protocol executor: an ordered list of atomic client-side steps
//! ("send ClientHello", "receive until Finished", "reset connection").
//! The segmenter grows one running sequence and snapshots it after each
//! step; snapshots are copy-on-branch, so appending to the running
//! sequence never retroactively alters an already-produced prefix.

use std::fmt;

use serde::Serialize;

/// Handshake message kinds that a receive step can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageKind {
    /// End of the server's first flight in TLS 1.2.
    ServerHelloDone,
    /// The server's Finished message.
    Finished,
    /// A post-handshake NewSessionTicket (resumption ticket).
    NewSessionTicket,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerHelloDone => write!(f, "ServerHelloDone"),
            Self::Finished => write!(f, "Finished"),
            Self::NewSessionTicket => write!(f, "NewSessionTicket"),
        }
    }
}

/// One atomic protocol step.
///
/// The two ClientHello shapes are distinct immutable variants selected
/// declaratively per flow: the initial flow never offers a pre-shared
/// key or early data, the resumption flow may offer both. Extensions are
/// never stripped from an already-built message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Send a ClientHello with the given optional offers.
    SendClientHello {
        /// Offer the pre-shared-key extension (resumption flow only).
        offer_psk: bool,
        /// Offer the early-data extension (zero-RTT resumption only).
        offer_early_data: bool,
    },
    /// Receive records until the given message has arrived.
    ReceiveTill(MessageKind),
    /// Send the client Certificate message.
    SendCertificate,
    /// Send the client CertificateVerify message.
    SendCertificateVerify,
    /// Send the ClientKeyExchange message (TLS 1.2).
    SendClientKeyExchange,
    /// Send the ChangeCipherSpec marker (TLS 1.2).
    SendChangeCipherSpec,
    /// Send the client Finished message.
    SendFinished,
    /// Send application data under the early-data key (zero-RTT).
    SendEarlyData,
    /// Send the EndOfEarlyData message (zero-RTT).
    SendEndOfEarlyData,
    /// Tear the connection down and reconnect for a resumption flow.
    ResetConnection,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendClientHello {
                offer_psk,
                offer_early_data,
            } => {
                write!(f, "send ClientHello")?;
                if *offer_psk {
                    write!(f, " +psk")?;
                }
                if *offer_early_data {
                    write!(f, " +early-data")?;
                }
                Ok(())
            }
            Self::ReceiveTill(kind) => write!(f, "receive till {kind}"),
            Self::SendCertificate => write!(f, "send Certificate"),
            Self::SendCertificateVerify => write!(f, "send CertificateVerify"),
            Self::SendClientKeyExchange => write!(f, "send ClientKeyExchange"),
            Self::SendChangeCipherSpec => write!(f, "send ChangeCipherSpec"),
            Self::SendFinished => write!(f, "send Finished"),
            Self::SendEarlyData => write!(f, "send early data"),
            Self::SendEndOfEarlyData => write!(f, "send EndOfEarlyData"),
            Self::ResetConnection => write!(f, "reset connection"),
        }
    }
}

/// An ordered, append-only list of protocol steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionSequence {
    actions: Vec<Action>,
}

impl ActionSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one step to the end of the sequence.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Take an independent snapshot of the current prefix.
    ///
    /// The snapshot owns its own storage; further pushes on `self` do
    /// not affect it, and vice versa.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// The steps in order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the sequence contains no steps.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether `self` is a true prefix of `other` (strictly shorter and
    /// step-for-step equal over its own length).
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.len() < other.len() && other.actions[..self.len()] == self.actions[..]
    }
}

impl fmt::Display for ActionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for action in &self.actions {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{action}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_independent_of_later_pushes() {
        let mut seq = ActionSequence::new();
        seq.push(Action::SendClientHello {
            offer_psk: false,
            offer_early_data: false,
        });
        let snap = seq.snapshot();
        seq.push(Action::ReceiveTill(MessageKind::Finished));

        assert_eq!(snap.len(), 1);
        assert_eq!(seq.len(), 2);
        assert!(snap.is_prefix_of(&seq));
    }

    #[test]
    fn prefix_check_rejects_diverging_sequences() {
        let mut a = ActionSequence::new();
        a.push(Action::SendFinished);
        let mut b = ActionSequence::new();
        b.push(Action::SendCertificate);
        b.push(Action::SendFinished);

        assert!(!a.is_prefix_of(&b));
        // A sequence is not a *true* prefix of itself.
        assert!(!a.is_prefix_of(&a.snapshot()));
    }

    #[test]
    fn display_names_every_step() {
        let mut seq = ActionSequence::new();
        seq.push(Action::SendClientHello {
            offer_psk: true,
            offer_early_data: true,
        });
        seq.push(Action::ReceiveTill(MessageKind::ServerHelloDone));
        seq.push(Action::ResetConnection);

        let text = seq.to_string();
        assert!(text.contains("send ClientHello +psk +early-data"));
        assert!(text.contains("receive till ServerHelloDone"));
        assert!(text.contains("reset connection"));
    }
}
