//! Measurement configuration: protocol options for the scenario under test.
//!
//! Pure data construction. The configuration fixes the cryptographic
//! parameters (version, key exchange, authentication, cipher) and the
//! optional extensions a handshake variant may rely on; the segmenter
//! validates variant/configuration combinations eagerly before any
//! measurement starts.

use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;

/// Protocol version of the handshake under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TlsVersion {
    /// TLS 1.2.
    Tls12,
    /// TLS 1.3.
    Tls13,
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls12 => write!(f, "TLS 1.2"),
            Self::Tls13 => write!(f, "TLS 1.3"),
        }
    }
}

/// Key exchange family offered by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyExchange {
    /// Static RSA key transport (TLS 1.2 only).
    Rsa,
    /// Ephemeral finite-field Diffie-Hellman.
    Dhe,
    /// Ephemeral elliptic-curve Diffie-Hellman.
    Ecdhe,
}

impl fmt::Display for KeyExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::Dhe => write!(f, "DHE"),
            Self::Ecdhe => write!(f, "ECDHE"),
        }
    }
}

/// Named group used for the key exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyExchangeGroup {
    /// NIST P-256.
    Secp256r1,
    /// NIST P-384.
    Secp384r1,
    /// Curve25519.
    X25519,
    /// RFC 7919 2048-bit finite-field group.
    Ffdhe2048,
}

impl fmt::Display for KeyExchangeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secp256r1 => write!(f, "secp256r1"),
            Self::Secp384r1 => write!(f, "secp384r1"),
            Self::X25519 => write!(f, "x25519"),
            Self::Ffdhe2048 => write!(f, "ffdhe2048"),
        }
    }
}

/// Server authentication algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServerAuth {
    /// RSA certificate.
    Rsa,
    /// ECDSA certificate.
    Ecdsa,
}

impl fmt::Display for ServerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::Ecdsa => write!(f, "ECDSA"),
        }
    }
}

/// Handshake hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HashAlgo {
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
}

impl fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha384 => write!(f, "SHA384"),
        }
    }
}

/// Bulk encryption algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BulkAlgo {
    /// AES-128 in GCM mode.
    Aes128Gcm,
    /// AES-256 in GCM mode.
    Aes256Gcm,
}

impl fmt::Display for BulkAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes128Gcm => write!(f, "AES_128_GCM"),
            Self::Aes256Gcm => write!(f, "AES_256_GCM"),
        }
    }
}

/// Optional protocol extensions a scenario may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Extension {
    /// Session ticket resumption.
    SessionResumption,
    /// Zero-RTT early data (TLS 1.3 only).
    EarlyData,
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionResumption => write!(f, "session resumption"),
            Self::EarlyData => write!(f, "early data"),
        }
    }
}

/// Full configuration for one measurement run.
///
/// Built with consuming setters in the builder style:
///
/// ```
/// use segtimer::config::*;
///
/// let config = MeasurementConfig::new(
///     TlsVersion::Tls13,
///     KeyExchange::Ecdhe,
///     ServerAuth::Ecdsa,
///     HashAlgo::Sha256,
///     BulkAlgo::Aes128Gcm,
/// )
/// .group(KeyExchangeGroup::Secp256r1)
/// .extension(Extension::SessionResumption)
/// .peer("localhost", 4433);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementConfig {
    /// Protocol version.
    pub version: TlsVersion,
    /// Key exchange family.
    pub key_exchange: KeyExchange,
    /// Named group for the key exchange.
    pub group: KeyExchangeGroup,
    /// Server authentication algorithm.
    pub server_auth: ServerAuth,
    /// Handshake hash.
    pub hash: HashAlgo,
    /// Bulk cipher.
    pub bulk: BulkAlgo,
    /// Extensions offered by the client.
    pub extensions: Vec<Extension>,
    /// Peer hostname.
    pub host: String,
    /// Peer port.
    pub port: u16,
    /// Whether a client certificate is configured for client auth.
    pub client_certificate: bool,
}

impl MeasurementConfig {
    /// Create a configuration with the mandatory cryptographic choices
    /// and defaults for everything else (secp256r1, localhost:4433, no
    /// extensions, no client certificate).
    pub fn new(
        version: TlsVersion,
        key_exchange: KeyExchange,
        server_auth: ServerAuth,
        hash: HashAlgo,
        bulk: BulkAlgo,
    ) -> Self {
        Self {
            version,
            key_exchange,
            group: KeyExchangeGroup::Secp256r1,
            server_auth,
            hash,
            bulk,
            extensions: Vec::new(),
            host: "localhost".to_string(),
            port: 4433,
            client_certificate: false,
        }
    }

    /// Set the key exchange group.
    pub fn group(mut self, group: KeyExchangeGroup) -> Self {
        self.group = group;
        self
    }

    /// Offer an extension. Adding the same extension twice is a no-op.
    pub fn extension(mut self, extension: Extension) -> Self {
        if !self.extensions.contains(&extension) {
            self.extensions.push(extension);
        }
        self
    }

    /// Set the peer endpoint.
    pub fn peer(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Configure a client certificate for client-authenticated variants.
    pub fn client_certificate(mut self, present: bool) -> Self {
        self.client_certificate = present;
        self
    }

    /// Whether the given extension is offered.
    pub fn has_extension(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    /// Multi-line textual summary for the report header.
    pub fn overview(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, " Version: {}", self.version);
        let _ = writeln!(out, " Key Exchange: {} ({})", self.key_exchange, self.group);
        let _ = writeln!(out, " Server Auth: {}", self.server_auth);
        let _ = writeln!(out, " Hash: {}", self.hash);
        let _ = writeln!(out, " Bulk Cipher: {}", self.bulk);
        if self.extensions.is_empty() {
            let _ = writeln!(out, " Extensions: none");
        } else {
            let names: Vec<String> = self.extensions.iter().map(|e| e.to_string()).collect();
            let _ = writeln!(out, " Extensions: {}", names.join(", "));
        }
        let _ = writeln!(out, " Peer: {}:{}", self.host, self.port);
        let _ = writeln!(
            out,
            " Client Certificate: {}",
            if self.client_certificate { "yes" } else { "no" }
        );
        out
    }
}
