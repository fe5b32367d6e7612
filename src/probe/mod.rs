// Probe module - typed model of one O-Saft scan of one target
//
// The check tables below embed the literal header strings of O-Saft's
// `--legacy=quick --no-header` report. They are effectively a versioned wire
// format: a new O-Saft release that renames a label requires updating the
// matching constant here, nothing else.

use serde::Serialize;

pub mod parser;

pub use parser::ParsedProbe;

/// Tri-state outcome of one probe check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Safe,
    Vulnerable,
    Unknown,
}

/// Outcome of one probe check with an optional diagnostic note
/// (e.g. the observed key size). Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    status: CheckStatus,
    note: Option<String>,
}

impl CheckResult {
    pub fn safe() -> Self {
        Self {
            status: CheckStatus::Safe,
            note: None,
        }
    }

    pub fn safe_with(note: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Safe,
            note: Some(note.into()),
        }
    }

    pub fn vulnerable() -> Self {
        Self {
            status: CheckStatus::Vulnerable,
            note: None,
        }
    }

    pub fn vulnerable_with(note: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Vulnerable,
            note: Some(note.into()),
        }
    }

    pub fn unknown() -> Self {
        Self {
            status: CheckStatus::Unknown,
            note: None,
        }
    }

    pub fn unknown_with(note: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Unknown,
            note: Some(note.into()),
        }
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn is_safe(&self) -> bool {
        self.status == CheckStatus::Safe
    }

    pub fn is_vulnerable(&self) -> bool {
        self.status == CheckStatus::Vulnerable
    }

    pub fn is_unknown(&self) -> bool {
        self.status == CheckStatus::Unknown
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

impl Default for CheckResult {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Which boolean token O-Saft prints when a check passed.
///
/// Explicit per check in the table below so the decoder stays a pure
/// function of (value, polarity) instead of inferring polarity from caller
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    SafeWhenYes,
    SafeWhenNo,
}

/// Certificate key algorithm family as reported by O-Saft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyAlgorithm {
    Rsa,
    Ecdsa,
    Other,
}

/// Every named check the parser produces a `CheckResult` for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckId {
    // Vulnerabilities
    Beast,
    Breach,
    Crime,
    Drown,
    Freak,
    Heartbleed,
    Logjam,
    Lucky13,
    Poodle,
    Rc4,
    Sweet32,
    Sslv2NotSupported,
    Sslv3NotSupported,
    Pfs,
    RandomSessionTicket,
    // Certificate checks
    HostnameMatch,
    ReverseHostnameMatch,
    NotExpired,
    IsValid,
    FingerprintNotMd5,
    PrivateKeySha2,
    NotSelfSigned,
}

/// Vulnerability headers, `+check` output
pub const BEAST_HEADER: &str = "Connection is safe against BEAST attack";
pub const BREACH_HEADER: &str = "Connection is safe against BREACH attack";
pub const CRIME_HEADER: &str = "Connection is safe against CRIME attack";
pub const DROWN_HEADER: &str = "Connection is safe against DROWN attack";
pub const FREAK_HEADER: &str = "Connection is safe against FREAK attack";
pub const HEARTBLEED_HEADER: &str = "Connection is safe against Heartbleed attack";
pub const LOGJAM_HEADER: &str = "Connection is safe against Logjam attack";
pub const LUCKY_13_HEADER: &str = "Connection is safe against Lucky 13 attack";
pub const POODLE_HEADER: &str = "Connection is safe against POODLE attack";
pub const RC4_HEADER: &str = "Connection is safe against RC4 attack";
pub const SWEET_32_HEADER: &str = "Connection is safe against Sweet32 attack";
pub const SSLV2_NOT_SUPPORTED_HEADER: &str = "Target does not support SSLv2";
pub const SSLV3_NOT_SUPPORTED_HEADER: &str = "Target does not support SSLv3";
pub const PFS_HEADER: &str = "Target supports PFS (selected cipher)";
pub const RANDOM_TLS_SESSION_TICKET_HEADER: &str = "Target TLS Session Ticket is random";

/// Protocol support headers, `+protocols` output. SSLv2/SSLv3 support is
/// derived from the two "does not support" vulnerability headers above.
pub const TLS10_SUPPORTED_HEADER: &str = "Target supports TLSv1";
pub const TLS11_SUPPORTED_HEADER: &str = "Target supports TLSv1.1";
pub const TLS12_SUPPORTED_HEADER: &str = "Target supports TLSv1.2";

/// Certificate headers, `+info` output
pub const REVERSE_HOSTNAME_MATCH_HEADER: &str = "Given hostname is same as reverse resolved hostname";
pub const CERTIFICATE_NOT_EXPIRED_HEADER: &str = "Certificate is not expired";
pub const CERTIFICATE_IS_VALID_HEADER: &str = "Certificate is valid";
pub const CERTIFICATE_FINGERPRINT_NOT_MD5_HEADER: &str = "Certificate Fingerprint is not MD5";
pub const CERTIFICATE_PRIVATE_KEY_SHA2_HEADER: &str = "Certificate Private Key Signature SHA2";
pub const CERTIFICATE_PUBLIC_KEY_SIZE_HEADER: &str = "Certificate Public Key size";
pub const CERTIFICATE_PUBLIC_KEY_ALGORITHM_HEADER: &str = "Certificate Public Key Algorithm";
pub const CERTIFICATE_SIGNATURE_KEY_SIZE_HEADER: &str = "Certificate Signature Key size";
pub const CERTIFICATE_SIGNATURE_ALGORITHM_HEADER: &str = "Certificate Signature Algorithm";
pub const CERTIFICATE_CHAIN_HEADER: &str = "Certificate chain";
pub const VALIDITY_HOSTNAME_HEADER: &str = "Validity hostname";
pub const VALIDITY_ALTNAME_HEADER: &str = "Validity alternate names";

/// Substring O-Saft prints when the TCP/TLS connection itself failed
pub const NO_CONNECTION_MARKER: &str = "Can't make a connection";

/// Boolean checks decoded straight from a header/value line.
///
/// Hostname match and self-signed detection are absent here: both need
/// stateful reconciliation across lines and live in dedicated sub-parsers.
pub const HEADER_CHECKS: &[(CheckId, &str, Polarity)] = &[
    (CheckId::Beast, BEAST_HEADER, Polarity::SafeWhenYes),
    (CheckId::Breach, BREACH_HEADER, Polarity::SafeWhenYes),
    (CheckId::Crime, CRIME_HEADER, Polarity::SafeWhenYes),
    (CheckId::Drown, DROWN_HEADER, Polarity::SafeWhenYes),
    (CheckId::Freak, FREAK_HEADER, Polarity::SafeWhenYes),
    (CheckId::Heartbleed, HEARTBLEED_HEADER, Polarity::SafeWhenYes),
    (CheckId::Logjam, LOGJAM_HEADER, Polarity::SafeWhenYes),
    (CheckId::Lucky13, LUCKY_13_HEADER, Polarity::SafeWhenYes),
    (CheckId::Poodle, POODLE_HEADER, Polarity::SafeWhenYes),
    (CheckId::Rc4, RC4_HEADER, Polarity::SafeWhenYes),
    (CheckId::Sweet32, SWEET_32_HEADER, Polarity::SafeWhenYes),
    (
        CheckId::Sslv2NotSupported,
        SSLV2_NOT_SUPPORTED_HEADER,
        Polarity::SafeWhenYes,
    ),
    (
        CheckId::Sslv3NotSupported,
        SSLV3_NOT_SUPPORTED_HEADER,
        Polarity::SafeWhenYes,
    ),
    (CheckId::Pfs, PFS_HEADER, Polarity::SafeWhenYes),
    (
        CheckId::RandomSessionTicket,
        RANDOM_TLS_SESSION_TICKET_HEADER,
        Polarity::SafeWhenYes,
    ),
    (
        CheckId::ReverseHostnameMatch,
        REVERSE_HOSTNAME_MATCH_HEADER,
        Polarity::SafeWhenYes,
    ),
    (
        CheckId::NotExpired,
        CERTIFICATE_NOT_EXPIRED_HEADER,
        Polarity::SafeWhenYes,
    ),
    (
        CheckId::IsValid,
        CERTIFICATE_IS_VALID_HEADER,
        Polarity::SafeWhenYes,
    ),
    (
        CheckId::FingerprintNotMd5,
        CERTIFICATE_FINGERPRINT_NOT_MD5_HEADER,
        Polarity::SafeWhenYes,
    ),
    (
        CheckId::PrivateKeySha2,
        CERTIFICATE_PRIVATE_KEY_SHA2_HEADER,
        Polarity::SafeWhenYes,
    ),
];

/// Recognizer for one revision of O-Saft's supported-cipher-suite lines.
///
/// Cipher records carry no header; they are recognized purely by shape: a
/// fixed tab-split arity plus one marker field that holds either a strength
/// word or a hex code. The shape changed once between observed O-Saft
/// revisions, so the known shapes are data, not logic.
#[derive(Debug, Clone, Copy)]
pub struct CipherLineShape {
    /// Expected number of tab-separated fields
    pub fields: usize,
    /// Index of the marker field within the split
    pub marker: usize,
}

impl CipherLineShape {
    pub fn matches(&self, pieces: &[&str]) -> bool {
        pieces.len() == self.fields && is_cipher_marker(pieces[self.marker])
    }
}

/// Known cipher-line shapes, newest first. `name\thex\tstrength\t…` appeared
/// alongside the legacy `name\t…\tstrength` layout.
pub const CIPHER_LINE_SHAPES: &[CipherLineShape] = &[
    CipherLineShape { fields: 3, marker: 2 },
    CipherLineShape { fields: 4, marker: 1 },
];

const CIPHER_STRENGTHS: &[&str] = &["weak", "medium", "high"];

fn is_cipher_marker(field: &str) -> bool {
    let lower = field.trim().to_lowercase();
    CIPHER_STRENGTHS.contains(&lower.as_str()) || lower.starts_with("0x")
}
