// Policy module - declarative per-target TLS requirements
//
// Profiles and targets are built once by the configuration loader and are
// read-only for the remainder of a run. The registry is an explicitly
// constructed lookup table passed by reference into the orchestrator, so the
// core stays testable with ad hoc in-memory profiles.

pub mod evaluator;
pub mod parser;
pub mod report;

use crate::error::ScanError;
use crate::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Declared requirement strength for a policy item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    MustBe,
    MustNotBe,
    CanBe,
}

const MUST_BE_STR: &str = "mustBe";
const MUST_NOT_BE_STR: &str = "mustNotBe";
const CAN_BE_STR: &str = "canBe";

impl Mode {
    /// Parse the configuration vocabulary (`mustBe` / `mustNotBe` / `canBe`)
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            MUST_BE_STR => Ok(Mode::MustBe),
            MUST_NOT_BE_STR => Ok(Mode::MustNotBe),
            CAN_BE_STR => Ok(Mode::CanBe),
            other => Err(ScanError::UnknownMode {
                value: other.to_string(),
            }
            .into()),
        }
    }

    pub fn is_must_be(&self) -> bool {
        matches!(self, Mode::MustBe)
    }

    pub fn is_must_not_be(&self) -> bool {
        matches!(self, Mode::MustNotBe)
    }

    pub fn is_can_be(&self) -> bool {
        matches!(self, Mode::CanBe)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Mode::MustBe => "MUST BE",
            Mode::MustNotBe => "MUST NOT BE",
            Mode::CanBe => "CAN BE",
        };
        write!(f, "{}", text)
    }
}

/// Named, moded integer policy parameter
/// (e.g. minimum RSA public-key size = 2048, mustBe).
///
/// Directives are keyed by name within a profile, so equality ignores the
/// value and mode.
#[derive(Debug, Clone, Serialize)]
pub struct Directive {
    name: String,
    value: i32,
    mode: Mode,
}

impl Directive {
    pub fn new(name: impl Into<String>, value: i32, mode: Mode) -> Self {
        Self {
            name: name.into(),
            value,
            mode,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl PartialEq for Directive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Directive {}

/// Cipher suite by canonical name, optionally carrying a declared mode.
///
/// Equality and hashing go by name only: a bare-name suite observed by the
/// parser compares equal to the moded one declared in a profile.
#[derive(Debug, Clone, Serialize)]
pub struct CipherSuite {
    name: String,
    mode: Option<Mode>,
}

impl CipherSuite {
    pub fn new(name: impl Into<String>, mode: Mode) -> Self {
        Self {
            name: name.into(),
            mode: Some(mode),
        }
    }

    /// A suite as seen in probe output, with no declared mode
    pub fn observed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }
}

impl PartialEq for CipherSuite {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CipherSuite {}

impl std::hash::Hash for CipherSuite {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// TLS/SSL protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProtocolType {
    SSLv2,
    SSLv3,
    TLS10,
    TLS11,
    TLS12,
    TLS13,
}

impl ProtocolType {
    pub fn all() -> &'static [ProtocolType] {
        &[
            ProtocolType::SSLv2,
            ProtocolType::SSLv3,
            ProtocolType::TLS10,
            ProtocolType::TLS11,
            ProtocolType::TLS12,
            ProtocolType::TLS13,
        ]
    }

    /// Canonical name, stable per type (aliases round-trip through this)
    pub fn name(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted textual aliases, canonical first, matched case-insensitively
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            ProtocolType::SSLv2 => &["SSLv2", "SSL 2.0", "SSL 2", "SSL2"],
            ProtocolType::SSLv3 => &["SSLv3", "SSL 3.0", "SSL 3", "SSL3"],
            ProtocolType::TLS10 => &["TLSv1.0", "TLS 1.0", "TLSv10", "TLS 10", "TLSv1"],
            ProtocolType::TLS11 => &["TLSv1.1", "TLS 1.1", "TLSv11", "TLS 11"],
            ProtocolType::TLS12 => &["TLSv1.2", "TLS 1.2", "TLSv12", "TLS 12"],
            ProtocolType::TLS13 => &["TLSv1.3", "TLS 1.3", "TLSv13", "TLS 13"],
        }
    }

    pub fn parse(code_name: &str) -> Result<Self> {
        for protocol in Self::all() {
            if protocol
                .aliases()
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(code_name))
            {
                return Ok(*protocol);
            }
        }

        Err(ScanError::UnknownProtocol {
            value: code_name.to_string(),
        }
        .into())
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A protocol declaration: enumerated type plus optional mode.
/// Equality goes by type only.
#[derive(Debug, Clone, Serialize)]
pub struct Protocol {
    protocol_type: ProtocolType,
    mode: Option<Mode>,
}

impl Protocol {
    pub fn new(protocol_type: ProtocolType, mode: Mode) -> Self {
        Self {
            protocol_type,
            mode: Some(mode),
        }
    }

    pub fn parse(code_name: &str, mode: Mode) -> Result<Self> {
        Ok(Self::new(ProtocolType::parse(code_name)?, mode))
    }

    pub fn protocol_type(&self) -> ProtocolType {
        self.protocol_type
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }
}

impl PartialEq for Protocol {
    fn eq(&self, other: &Self) -> bool {
        self.protocol_type == other.protocol_type
    }
}

impl Eq for Protocol {}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.protocol_type)
    }
}

/// The four certificate directives every profile must declare
pub const RSA_MINIMUM_PUBLIC_KEY_SIZE: &str = "rsaMinimumPublicKeySize";
pub const RSA_MINIMUM_SIGNATURE_KEY_SIZE: &str = "rsaMinimumSignatureKeySize";
pub const ECDSA_MINIMUM_PUBLIC_KEY_SIZE: &str = "ecdsaMinimumPublicKeySize";
pub const ECDSA_MINIMUM_SIGNATURE_KEY_SIZE: &str = "ecdsaMinimumSignatureKeySize";

pub fn all_certificate_directives() -> Vec<&'static str> {
    vec![
        RSA_MINIMUM_PUBLIC_KEY_SIZE,
        RSA_MINIMUM_SIGNATURE_KEY_SIZE,
        ECDSA_MINIMUM_PUBLIC_KEY_SIZE,
        ECDSA_MINIMUM_SIGNATURE_KEY_SIZE,
    ]
}

/// Named policy bundle for one or more targets.
///
/// Whether a category is evaluated at all is driven by the declarations
/// themselves: cipher suites and protocols are in scope iff their lists are
/// non-empty, vulnerabilities and certificate checks iff their governing
/// mode is must-be.
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    protocols: Vec<Protocol>,
    cipher_suites: Vec<CipherSuite>,
    certificate_directives: HashMap<String, Directive>,
    vulnerabilities: Mode,
    certificate: Mode,
    unknown_as_failure: bool,
}

impl Profile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        protocols: Vec<Protocol>,
        cipher_suites: Vec<CipherSuite>,
        certificate_directives: Vec<Directive>,
        vulnerabilities: Mode,
        certificate: Mode,
        unknown_as_failure: bool,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ScanError::Config {
                message: "Profile name can't be empty".to_string(),
            }
            .into());
        }

        let mut directives = HashMap::new();
        for directive in certificate_directives {
            if !all_certificate_directives().contains(&directive.name()) {
                return Err(ScanError::UnknownDirective {
                    name: directive.name().to_string(),
                }
                .into());
            }
            directives.insert(directive.name().to_string(), directive);
        }

        let missing: Vec<String> = all_certificate_directives()
            .into_iter()
            .filter(|name| !directives.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ScanError::MissingDirectives {
                profile: name,
                names: missing,
            }
            .into());
        }

        Ok(Self {
            name,
            protocols: dedup_in_order(protocols),
            cipher_suites: dedup_in_order(cipher_suites),
            certificate_directives: directives,
            vulnerabilities,
            certificate,
            unknown_as_failure,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }

    pub fn cipher_suites(&self) -> &[CipherSuite] {
        &self.cipher_suites
    }

    /// Fails fast on an unsupported name: the loader guarantees all four
    /// directives are present, so a miss here is a programming error in the
    /// caller, not scan data.
    pub fn certificate_directive(&self, name: &str) -> Result<&Directive> {
        self.certificate_directives
            .get(name)
            .ok_or_else(|| {
                ScanError::UnknownDirective {
                    name: name.to_string(),
                }
                .into()
            })
    }

    pub fn is_test_certificate(&self) -> bool {
        self.certificate.is_must_be()
    }

    pub fn is_test_vulnerabilities(&self) -> bool {
        self.vulnerabilities.is_must_be()
    }

    pub fn is_test_cipher_suites(&self) -> bool {
        !self.cipher_suites.is_empty()
    }

    pub fn is_test_safe_protocols(&self) -> bool {
        !self.protocols.is_empty()
    }

    pub fn vulnerabilities_mode(&self) -> Mode {
        self.vulnerabilities
    }

    pub fn certificate_mode(&self) -> Mode {
        self.certificate
    }

    /// Whether an Unknown check result is reported as a failure
    pub fn unknown_as_failure(&self) -> bool {
        self.unknown_as_failure
    }
}

fn dedup_in_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut done: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !done.contains(&item) {
            done.push(item);
        }
    }
    done
}

/// Name-keyed profile lookup table, built once by the configuration loader
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Profile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, profile: Profile) -> Result<()> {
        if self.profiles.contains_key(profile.name()) {
            return Err(ScanError::DuplicateProfile {
                name: profile.name().to_string(),
            }
            .into());
        }
        self.profiles.insert(profile.name().to_string(), profile);
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Profile> {
        self.profiles.get(name).ok_or_else(|| {
            ScanError::UnknownProfile {
                name: name.to_string(),
            }
            .into()
        })
    }
}

/// One endpoint to be scanned, bound to exactly one registered profile
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    destination: String,
    profile: String,
    name: String,
}

impl Target {
    pub fn new(
        destination: impl Into<String>,
        profile: impl Into<String>,
        name: impl Into<String>,
        registry: &ProfileRegistry,
    ) -> Result<Self> {
        let destination = destination.into();
        let profile = profile.into();

        if destination.is_empty() {
            return Err(ScanError::EmptyDestination.into());
        }
        if !registry.has(&profile) {
            return Err(ScanError::UnknownProfile { name: profile }.into());
        }

        Ok(Self {
            destination,
            profile,
            name: name.into(),
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn profile_name(&self) -> &str {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ; {})", self.destination, self.name, self.profile)
    }
}
