// Probe parser - turns O-Saft's line-oriented report into a ParsedProbe
//
// The parser is total: it never fails. Malformed or missing tool output
// degrades to Unknown results with a diagnostic note, and the evaluator's
// unknown-as-failure policy decides how severe that is.

use crate::policy::{CipherSuite, ProtocolType};
use crate::probe::{
    CheckId, CheckResult, CipherLineShape, KeyAlgorithm, Polarity, CERTIFICATE_CHAIN_HEADER,
    CERTIFICATE_PUBLIC_KEY_ALGORITHM_HEADER, CERTIFICATE_PUBLIC_KEY_SIZE_HEADER,
    CERTIFICATE_SIGNATURE_ALGORITHM_HEADER, CERTIFICATE_SIGNATURE_KEY_SIZE_HEADER,
    CIPHER_LINE_SHAPES, HEADER_CHECKS, NO_CONNECTION_MARKER, SSLV2_NOT_SUPPORTED_HEADER,
    SSLV3_NOT_SUPPORTED_HEADER, TLS10_SUPPORTED_HEADER, TLS11_SUPPORTED_HEADER,
    TLS12_SUPPORTED_HEADER, VALIDITY_ALTNAME_HEADER, VALIDITY_HOSTNAME_HEADER,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

const YES: &str = "yes";
const NO: &str = "no";
const NOT_AVAILABLE: &str = "N/A";
const UNEXPECTED_VALUE_NOTE: &str = "O-Saft returned unexpected value";

/// Sentinel for a key size O-Saft reported but we could not parse
pub const KEY_SIZE_UNPARSABLE: i32 = -1;

lazy_static! {
    /// Note suffix of a boolean value: `yes (details)` / `no (details)`
    static ref NOTE_RE: Regex = Regex::new(r"^(?:yes|no) \((.*)\)$").unwrap();
    /// Hostname matches the certificate's common name
    static ref CN_MATCH_RE: Regex =
        Regex::new(r"^Given hostname '(?P<given>[^']*)' matches CN '(?P<cn>[^']*)' in certificate")
            .unwrap();
    /// Hostname matches an alternate/subject-alternative (incl. wildcard) name
    static ref ALTNAME_MATCH_RE: Regex =
        Regex::new(r"^Given hostname '(?P<given>[^']*)' matches .*name\b").unwrap();
    /// Explicit mismatch against the common name
    static ref CN_MISMATCH_RE: Regex = Regex::new(
        r"^Given hostname '(?P<given>[^']*)' does not match CN '(?P<cn>[^']*)' in certificate"
    )
    .unwrap();
    /// One certificate-chain entry: depth, then subject/issuer markers
    static ref CHAIN_ENTRY_RE: Regex =
        Regex::new(r"(?i)^\s*(?P<depth>\d+):?\s.*\b(subject|issuer)").unwrap();
}

/// Structured snapshot of one target's probe output.
///
/// Created fresh per target per scan and discarded after evaluation. The
/// observed cipher-suite list is owned by the instance, never shared across
/// targets.
#[derive(Debug, Clone)]
pub struct ParsedProbe {
    checks: HashMap<CheckId, CheckResult>,
    cipher_suites: Vec<CipherSuite>,
    protocols: HashMap<ProtocolType, CheckResult>,
    public_key_size: i32,
    public_key_algorithm: KeyAlgorithm,
    signature_key_size: i32,
    signature_algorithm: KeyAlgorithm,
    connection_ok: bool,
}

impl Default for ParsedProbe {
    fn default() -> Self {
        Self {
            checks: HashMap::new(),
            cipher_suites: Vec::new(),
            protocols: HashMap::new(),
            public_key_size: KEY_SIZE_UNPARSABLE,
            public_key_algorithm: KeyAlgorithm::Other,
            signature_key_size: KEY_SIZE_UNPARSABLE,
            signature_algorithm: KeyAlgorithm::Other,
            connection_ok: true,
        }
    }
}

impl ParsedProbe {
    /// Result of one named check; Unknown when the tool never reported it
    pub fn check(&self, id: CheckId) -> CheckResult {
        self.checks.get(&id).cloned().unwrap_or_default()
    }

    pub fn cipher_suites(&self) -> &[CipherSuite] {
        &self.cipher_suites
    }

    pub fn observes_cipher_suite(&self, suite: &CipherSuite) -> bool {
        self.cipher_suites.contains(suite)
    }

    /// A protocol counts as supported when its probe result is Safe under
    /// the supported polarity used during parsing.
    pub fn is_protocol_supported(&self, protocol: ProtocolType) -> bool {
        self.protocols
            .get(&protocol)
            .map(CheckResult::is_safe)
            .unwrap_or(false)
    }

    pub fn public_key_size(&self) -> i32 {
        self.public_key_size
    }

    pub fn public_key_algorithm(&self) -> KeyAlgorithm {
        self.public_key_algorithm
    }

    pub fn signature_key_size(&self) -> i32 {
        self.signature_key_size
    }

    pub fn signature_algorithm(&self) -> KeyAlgorithm {
        self.signature_algorithm
    }

    pub fn connection_ok(&self) -> bool {
        self.connection_ok
    }
}

/// Parse the ordered raw stdout lines of one O-Saft run.
///
/// Single forward pass, streaming-compatible; the only state is the two
/// sub-parsers below, scoped to this call.
pub fn parse(lines: &[String]) -> ParsedProbe {
    let mut probe = ParsedProbe::default();
    let mut chain = ChainDepth::default();
    let mut hostname = HostnameMatch::default();

    for line in lines {
        // Connectivity gates the meaning of everything else, so it is
        // checked before any category parsing.
        if line.contains(NO_CONNECTION_MARKER) {
            probe.connection_ok = false;
        }

        let pieces: Vec<&str> = line.split('\t').collect();
        let header = pieces[0];
        let value = pieces.get(1).copied();

        if let Some(value) = value {
            parse_checks(&mut probe, header, value);
            parse_protocols(&mut probe, header, value);
            parse_certificate_keys(&mut probe, header, value);
            hostname.observe(header, value);
        }

        parse_cipher_suites(&mut probe, &pieces);

        if header == CERTIFICATE_CHAIN_HEADER {
            chain.arm();
        } else {
            chain.observe(line);
        }
    }

    if let Some(result) = chain.judgment() {
        probe.checks.insert(CheckId::NotSelfSigned, result);
    }
    if let Some(result) = hostname.judgment() {
        probe.checks.insert(CheckId::HostnameMatch, result);
    }

    probe
}

/// Boolean checks: header must exactly equal the registered string. Exact
/// equality, not prefix match, so one header can never shadow another that
/// extends it ("Target supports TLSv1" vs "Target supports TLSv1.1").
fn parse_checks(probe: &mut ParsedProbe, header: &str, value: &str) {
    for (id, check_header, polarity) in HEADER_CHECKS {
        if header == *check_header {
            probe.checks.insert(*id, decode_tristate(value, *polarity));
        }
    }
}

/// Protocol support, one result per version.
///
/// SSLv2/SSLv3 reuse the "does not support" headers with supported-when-no
/// polarity; TLS 1.0-1.2 have dedicated headers. TLS 1.3 is deliberately
/// not parsed: it was not yet standardized for the supported O-Saft
/// revisions and is excluded from active evaluation.
fn parse_protocols(probe: &mut ParsedProbe, header: &str, value: &str) {
    let slot = match header {
        SSLV2_NOT_SUPPORTED_HEADER => Some((ProtocolType::SSLv2, Polarity::SafeWhenNo)),
        SSLV3_NOT_SUPPORTED_HEADER => Some((ProtocolType::SSLv3, Polarity::SafeWhenNo)),
        TLS10_SUPPORTED_HEADER => Some((ProtocolType::TLS10, Polarity::SafeWhenYes)),
        TLS11_SUPPORTED_HEADER => Some((ProtocolType::TLS11, Polarity::SafeWhenYes)),
        TLS12_SUPPORTED_HEADER => Some((ProtocolType::TLS12, Polarity::SafeWhenYes)),
        _ => None,
    };

    if let Some((protocol, polarity)) = slot {
        probe
            .protocols
            .insert(protocol, decode_tristate(value, polarity));
    }
}

fn parse_certificate_keys(probe: &mut ParsedProbe, header: &str, value: &str) {
    match header {
        CERTIFICATE_PUBLIC_KEY_SIZE_HEADER => {
            probe.public_key_size = parse_key_size(value);
        }
        CERTIFICATE_SIGNATURE_KEY_SIZE_HEADER => {
            probe.signature_key_size = parse_key_size(value);
        }
        CERTIFICATE_PUBLIC_KEY_ALGORITHM_HEADER => {
            if let Some(algorithm) = parse_key_algorithm(value) {
                probe.public_key_algorithm = algorithm;
            }
        }
        CERTIFICATE_SIGNATURE_ALGORITHM_HEADER => {
            if let Some(algorithm) = parse_key_algorithm(value) {
                probe.signature_algorithm = algorithm;
            }
        }
        _ => {}
    }
}

fn parse_key_size(value: &str) -> i32 {
    value
        .replace(" bits", "")
        .trim()
        .parse()
        .unwrap_or(KEY_SIZE_UNPARSABLE)
}

/// Case-insensitive substring match; `ecdsa` first because `rsa` is a
/// substring of it. Unrecognized text returns None so the previous value
/// stays in place instead of being overwritten by garbage.
fn parse_key_algorithm(value: &str) -> Option<KeyAlgorithm> {
    let lower = value.to_lowercase();
    if lower.contains("ecdsa") {
        Some(KeyAlgorithm::Ecdsa)
    } else if lower.contains("rsa") {
        Some(KeyAlgorithm::Rsa)
    } else {
        None
    }
}

/// Supported-cipher-suite records carry no header and are recognized by
/// shape alone. A line matching no known shape is simply not a cipher
/// record; duplicates may accumulate, membership tests stay correct.
fn parse_cipher_suites(probe: &mut ParsedProbe, pieces: &[&str]) {
    if CIPHER_LINE_SHAPES
        .iter()
        .any(|shape: &CipherLineShape| shape.matches(pieces))
    {
        probe
            .cipher_suites
            .push(CipherSuite::observed(pieces[0].trim()));
    }
}

/// Decode one boolean value field to a tri-state result.
///
/// "N/A" wins over everything: O-Saft reports it for checks the target's
/// configuration makes inapplicable, regardless of the yes/no prefix.
fn decode_tristate(value: &str, polarity: Polarity) -> CheckResult {
    let rest = value
        .strip_prefix("yes ")
        .or_else(|| value.strip_prefix("no "))
        .unwrap_or(value);
    if rest.contains(NOT_AVAILABLE) {
        return CheckResult::unknown_with(rest);
    }

    let (safe_token, vulnerable_token) = match polarity {
        Polarity::SafeWhenYes => (YES, NO),
        Polarity::SafeWhenNo => (NO, YES),
    };

    if value.starts_with(safe_token) {
        return match parse_note(value) {
            Some(note) => CheckResult::safe_with(note),
            None => CheckResult::safe(),
        };
    }

    if value.starts_with(vulnerable_token) {
        return match parse_note(value) {
            Some(note) => CheckResult::vulnerable_with(note),
            None => CheckResult::vulnerable(),
        };
    }

    CheckResult::unknown_with(UNEXPECTED_VALUE_NOTE)
}

fn parse_note(value: &str) -> Option<String> {
    NOTE_RE
        .captures(value)
        .map(|captures| captures[1].to_string())
}

/// Self-signed detection via certificate chain depth.
///
/// The chain header arms the sub-parser and resets the depth; chain-entry
/// shaped lines then raise the maximum depth seen. A chain whose deepest
/// entry is the leaf itself (depth 0) has no issuer, i.e. is self-signed.
#[derive(Debug, Default)]
struct ChainDepth {
    max_depth: Option<u32>,
}

impl ChainDepth {
    fn arm(&mut self) {
        self.max_depth = Some(0);
    }

    fn observe(&mut self, line: &str) {
        let Some(seen) = self.max_depth else {
            return;
        };
        if let Some(captures) = CHAIN_ENTRY_RE.captures(line) {
            if let Ok(depth) = captures["depth"].parse::<u32>() {
                self.max_depth = Some(seen.max(depth));
            }
        }
    }

    fn judgment(&self) -> Option<CheckResult> {
        self.max_depth.map(|depth| {
            if depth > 0 {
                CheckResult::safe()
            } else {
                CheckResult::vulnerable()
            }
        })
    }
}

/// Hostname-match reconciliation across two non-adjacent report lines.
///
/// The two validity values are captured verbatim on first sighting; the
/// three shapes are then tried in priority order. CN match and alternate
/// name match (which subsumes wildcard certificates) are safe; an explicit
/// CN mismatch is vulnerable. Anything else stays Unknown until a later
/// line resolves it.
#[derive(Debug, Default)]
struct HostnameMatch {
    common_name: Option<String>,
    alternate_names: Option<String>,
    result: Option<CheckResult>,
}

impl HostnameMatch {
    fn observe(&mut self, header: &str, value: &str) {
        match header {
            VALIDITY_HOSTNAME_HEADER if self.common_name.is_none() => {
                self.common_name = Some(value.to_string());
            }
            VALIDITY_ALTNAME_HEADER if self.alternate_names.is_none() => {
                self.alternate_names = Some(value.to_string());
            }
            _ => return,
        }
        self.resolve();
    }

    fn resolve(&mut self) {
        if self.result.is_some() {
            return;
        }

        if let Some(value) = &self.common_name {
            if CN_MATCH_RE.is_match(value) {
                self.result = Some(CheckResult::safe());
                return;
            }
        }

        if let Some(value) = &self.alternate_names {
            if ALTNAME_MATCH_RE.is_match(value) {
                self.result = Some(CheckResult::safe());
                return;
            }
        }

        if let Some(value) = &self.common_name {
            if let Some(captures) = CN_MISMATCH_RE.captures(value) {
                self.result = Some(CheckResult::vulnerable_with(format!(
                    "{} <> {}",
                    &captures["given"], &captures["cn"]
                )));
            }
        }
    }

    fn judgment(&self) -> Option<CheckResult> {
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_decode_safe_when_yes() {
        let result = decode_tristate("yes", Polarity::SafeWhenYes);
        assert!(result.is_safe());
        assert!(result.note().is_none());

        let result = decode_tristate("no (<<reason>>)", Polarity::SafeWhenYes);
        assert!(result.is_vulnerable());
        assert_eq!(result.note(), Some("<<reason>>"));
    }

    #[test]
    fn test_decode_safe_when_no() {
        assert!(decode_tristate("no", Polarity::SafeWhenNo).is_safe());
        assert!(decode_tristate("yes", Polarity::SafeWhenNo).is_vulnerable());
    }

    #[test]
    fn test_decode_not_applicable_wins_over_polarity() {
        for polarity in [Polarity::SafeWhenYes, Polarity::SafeWhenNo] {
            let result = decode_tristate("yes N/A", polarity);
            assert!(result.is_unknown());
            let result = decode_tristate("N/A", polarity);
            assert!(result.is_unknown());
        }
    }

    #[test]
    fn test_decode_unexpected_value() {
        let result = decode_tristate("maybe", Polarity::SafeWhenYes);
        assert!(result.is_unknown());
        assert_eq!(result.note(), Some(UNEXPECTED_VALUE_NOTE));
    }

    #[test]
    fn test_header_must_match_exactly() {
        // A prefix of a known header must not feed that check.
        let probe = parse(&lines(&["Connection is safe against BEAST\tyes"]));
        assert!(probe.check(CheckId::Beast).is_unknown());

        let probe = parse(&lines(&["Connection is safe against BEAST attack\tyes"]));
        assert!(probe.check(CheckId::Beast).is_safe());
    }

    #[test]
    fn test_last_match_wins_for_checks() {
        let probe = parse(&lines(&[
            "Connection is safe against BEAST attack\tno",
            "Connection is safe against BEAST attack\tyes",
        ]));
        assert!(probe.check(CheckId::Beast).is_safe());
    }

    #[test]
    fn test_unmatched_line_keeps_previous_value() {
        let probe = parse(&lines(&[
            "Connection is safe against BEAST attack\tyes",
            "some unrelated noise",
        ]));
        assert!(probe.check(CheckId::Beast).is_safe());
    }

    #[test]
    fn test_protocol_support() {
        let probe = parse(&lines(&[
            "Target does not support SSLv2\tyes",
            "Target does not support SSLv3\tno",
            "Target supports TLSv1\tno",
            "Target supports TLSv1.2\tyes",
        ]));

        assert!(!probe.is_protocol_supported(ProtocolType::SSLv2));
        assert!(probe.is_protocol_supported(ProtocolType::SSLv3));
        assert!(!probe.is_protocol_supported(ProtocolType::TLS10));
        assert!(!probe.is_protocol_supported(ProtocolType::TLS11));
        assert!(probe.is_protocol_supported(ProtocolType::TLS12));
        // not parsed at all
        assert!(!probe.is_protocol_supported(ProtocolType::TLS13));
    }

    #[test]
    fn test_cipher_suite_lines_by_shape() {
        let probe = parse(&lines(&[
            "ECDHE-RSA-AES256-GCM-SHA384\t-?-\tHIGH",
            "AES128-SHA\t0x002F\tyes\tmedium",
            "Certificate is valid\tyes",
            "a line\twith\tthe wrong\tshape\tentirely",
        ]));

        assert_eq!(probe.cipher_suites().len(), 2);
        assert!(probe.observes_cipher_suite(&CipherSuite::observed(
            "ECDHE-RSA-AES256-GCM-SHA384"
        )));
        assert!(probe.observes_cipher_suite(&CipherSuite::observed("AES128-SHA")));
    }

    #[test]
    fn test_duplicate_cipher_suites_accumulate() {
        let probe = parse(&lines(&[
            "AES128-SHA\t-?-\tmedium",
            "AES128-SHA\t-?-\tmedium",
        ]));
        assert_eq!(probe.cipher_suites().len(), 2);
        assert!(probe.observes_cipher_suite(&CipherSuite::observed("AES128-SHA")));
    }

    #[test]
    fn test_certificate_key_sizes() {
        let probe = parse(&lines(&[
            "Certificate Public Key size\t2048 bits",
            "Certificate Public Key Algorithm\trsaEncryption",
            "Certificate Signature Key size\tgarbage",
            "Certificate Signature Algorithm\tecdsa-with-SHA256",
        ]));

        assert_eq!(probe.public_key_size(), 2048);
        assert_eq!(probe.public_key_algorithm(), KeyAlgorithm::Rsa);
        assert_eq!(probe.signature_key_size(), KEY_SIZE_UNPARSABLE);
        assert_eq!(probe.signature_algorithm(), KeyAlgorithm::Ecdsa);
    }

    #[test]
    fn test_unrecognized_algorithm_is_sticky() {
        let probe = parse(&lines(&[
            "Certificate Public Key Algorithm\trsaEncryption",
            "Certificate Public Key Algorithm\tgost2001",
        ]));
        assert_eq!(probe.public_key_algorithm(), KeyAlgorithm::Rsa);
    }

    #[test]
    fn test_chain_depth_zero_is_self_signed() {
        let probe = parse(&lines(&[
            "Certificate chain",
            " 0: subject= /CN=example.com issuer= /CN=example.com",
        ]));
        assert!(probe.check(CheckId::NotSelfSigned).is_vulnerable());
    }

    #[test]
    fn test_chain_depth_nonzero_is_safe() {
        let probe = parse(&lines(&[
            "Certificate chain",
            " 0: subject= /CN=example.com issuer= /CN=Some CA",
            " 1: subject= /CN=Some CA issuer= /CN=Root CA",
        ]));
        assert!(probe.check(CheckId::NotSelfSigned).is_safe());
    }

    #[test]
    fn test_no_chain_header_leaves_self_signed_unknown() {
        let probe = parse(&lines(&[
            " 1: subject= /CN=Some CA issuer= /CN=Root CA",
        ]));
        assert!(probe.check(CheckId::NotSelfSigned).is_unknown());
    }

    #[test]
    fn test_hostname_matches_common_name() {
        let probe = parse(&lines(&[
            "Validity hostname\tGiven hostname 'a.com' matches CN 'a.com' in certificate",
        ]));
        assert!(probe.check(CheckId::HostnameMatch).is_safe());
    }

    #[test]
    fn test_hostname_matches_alternate_name() {
        let probe = parse(&lines(&[
            "Validity hostname\tsomething inconclusive",
            "Validity alternate names\tGiven hostname 'www.a.com' matches wildcard name '*.a.com'",
        ]));
        assert!(probe.check(CheckId::HostnameMatch).is_safe());
    }

    #[test]
    fn test_hostname_mismatch() {
        let probe = parse(&lines(&[
            "Validity hostname\tGiven hostname 'a.com' does not match CN 'b.com' in certificate",
        ]));
        let result = probe.check(CheckId::HostnameMatch);
        assert!(result.is_vulnerable());
        assert_eq!(result.note(), Some("a.com <> b.com"));
    }

    #[test]
    fn test_hostname_holders_are_first_match_wins() {
        let probe = parse(&lines(&[
            "Validity hostname\tGiven hostname 'a.com' does not match CN 'b.com' in certificate",
            "Validity hostname\tGiven hostname 'a.com' matches CN 'a.com' in certificate",
        ]));
        // The second sighting must not overwrite the captured first one.
        assert!(probe.check(CheckId::HostnameMatch).is_vulnerable());
    }

    #[test]
    fn test_connectivity_failure() {
        let probe = parse(&lines(&[
            "**WARN: Can't make a connection to example.com:443",
            "Connection is safe against BEAST attack\tyes",
        ]));
        assert!(!probe.connection_ok());
        // category parsing still ran; the evaluator decides relevance
        assert!(probe.check(CheckId::Beast).is_safe());
    }

    #[test]
    fn test_empty_input_is_valid() {
        let probe = parse(&[]);
        assert!(probe.connection_ok());
        assert!(probe.check(CheckId::Heartbleed).is_unknown());
        assert!(probe.cipher_suites().is_empty());
    }
}
