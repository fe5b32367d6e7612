// Policy evaluator - reconciles one ParsedProbe against one Profile
//
// Pure transformation over already-collected data; assumes a Profile the
// configuration loader has validated. The only errors it can produce are
// structural profile bugs (a missing certificate directive), which the
// loader is supposed to have made impossible.

use crate::policy::report::{Category, Evaluation, ReportMessage};
use crate::policy::{
    Profile, ProtocolType, ECDSA_MINIMUM_PUBLIC_KEY_SIZE, ECDSA_MINIMUM_SIGNATURE_KEY_SIZE,
    RSA_MINIMUM_PUBLIC_KEY_SIZE, RSA_MINIMUM_SIGNATURE_KEY_SIZE,
};
use crate::probe::{CheckId, CheckResult, KeyAlgorithm, ParsedProbe};
use crate::Mode;
use crate::Result;

const NOT_TESTED_MESSAGE: &str = "OK (by default, not tested due to profile configuration)";
const NO_CONNECTION_MESSAGE: &str = "Can't connect to target, no tests were performed";
const UNABLE_TO_TEST_PREFIX: &str = "Unable to test";

/// Vulnerability checks in report order, with their failure texts
const VULNERABILITY_CHECKS: &[(CheckId, &str)] = &[
    (CheckId::Beast, "Vulnerable to BEAST!"),
    (CheckId::Breach, "Vulnerable to BREACH!"),
    (CheckId::Crime, "Vulnerable to CRIME!"),
    (CheckId::Drown, "Vulnerable to DROWN!"),
    (CheckId::Freak, "Vulnerable to FREAK!"),
    (CheckId::Heartbleed, "Vulnerable to Heartbleed!"),
    (CheckId::Logjam, "Vulnerable to Logjam!"),
    (CheckId::Lucky13, "Vulnerable to Lucky 13!"),
    (CheckId::Poodle, "Vulnerable to POODLE!"),
    (
        CheckId::Rc4,
        "RC4 ciphers are supported (but they are assumed to be broken)!",
    ),
    (CheckId::Sweet32, "Vulnerable to Sweet32!"),
    (CheckId::Sslv2NotSupported, "SSLv2 supported!"),
    (CheckId::Sslv3NotSupported, "SSLv3 supported!"),
    (CheckId::Pfs, "PFS (perfect forward secrecy) not supported!"),
    (
        CheckId::RandomSessionTicket,
        "TLS session ticket doesn't contain random value!",
    ),
];

/// Certificate boolean checks in report order, with their failure texts
const CERTIFICATE_CHECKS: &[(CheckId, &str)] = &[
    (
        CheckId::HostnameMatch,
        "Mismatch between hostname and certificate subject.",
    ),
    (
        CheckId::ReverseHostnameMatch,
        "Mismatch between given hostname and reverse resolved hostname.",
    ),
    (CheckId::NotExpired, "Certificate expired."),
    (CheckId::IsValid, "Certificate isn't valid."),
    (CheckId::FingerprintNotMd5, "Certificate fingerprint is MD5."),
    (
        CheckId::PrivateKeySha2,
        "Certificate Private Key Signature isn't SHA2.",
    ),
    (CheckId::NotSelfSigned, "Certificate is self-signed."),
];

/// Evaluate one parsed probe against one profile.
///
/// Every category always contributes at least one message: vulnerable
/// findings, a single "OK", or a single not-tested notice, so downstream
/// rendering never has to special-case absent categories.
pub fn evaluate(probe: &ParsedProbe, profile: &Profile) -> Result<Evaluation> {
    // Connectivity gates everything: without a connection no other result
    // is meaningful, so the verdict is a single deterministic message.
    if !probe.connection_ok() {
        return Ok(Evaluation {
            vulnerable: vec![ReportMessage::error(
                NO_CONNECTION_MESSAGE,
                Category::Protocol,
                Mode::MustBe,
            )],
            safe: Vec::new(),
        });
    }

    let mut evaluation = Evaluation::default();

    if profile.is_test_cipher_suites() {
        split_safe_and_vulnerable(
            &mut evaluation,
            check_cipher_suites(probe, profile),
            Category::Cipher,
        );
    } else {
        add_not_tested(&mut evaluation, Category::Cipher);
    }

    if profile.is_test_vulnerabilities() {
        split_safe_and_vulnerable(
            &mut evaluation,
            check_vulnerabilities(probe, profile),
            Category::Vulnerability,
        );
    } else {
        add_not_tested(&mut evaluation, Category::Vulnerability);
    }

    if profile.is_test_certificate() {
        split_safe_and_vulnerable(
            &mut evaluation,
            check_certificate(probe, profile)?,
            Category::Certificate,
        );
    } else {
        add_not_tested(&mut evaluation, Category::Certificate);
    }

    if profile.is_test_safe_protocols() {
        split_safe_and_vulnerable(
            &mut evaluation,
            check_protocols(probe, profile),
            Category::Protocol,
        );
    } else {
        add_not_tested(&mut evaluation, Category::Protocol);
    }

    Ok(evaluation)
}

fn split_safe_and_vulnerable(
    evaluation: &mut Evaluation,
    vulnerabilities: Vec<ReportMessage>,
    category: Category,
) {
    if vulnerabilities.is_empty() {
        evaluation.safe.push(ReportMessage::success("OK", category));
    } else {
        evaluation.vulnerable.extend(vulnerabilities);
    }
}

fn add_not_tested(evaluation: &mut Evaluation, category: Category) {
    evaluation
        .safe
        .push(ReportMessage::success(NOT_TESTED_MESSAGE, category));
}

fn check_cipher_suites(probe: &ParsedProbe, profile: &Profile) -> Vec<ReportMessage> {
    let mut vulns = Vec::new();

    for suite in profile.cipher_suites() {
        let Some(mode) = suite.mode() else {
            continue;
        };

        if mode.is_must_be() && !probe.observes_cipher_suite(suite) {
            vulns.push(ReportMessage::error(
                format!("Cipher suite {} MUST BE supported!", suite),
                Category::Cipher,
                mode,
            ));
        } else if mode.is_must_not_be() && probe.observes_cipher_suite(suite) {
            vulns.push(ReportMessage::error(
                format!("Cipher suite {} MUST NOT BE supported!", suite),
                Category::Cipher,
                mode,
            ));
        }
    }

    vulns
}

fn check_protocols(probe: &ParsedProbe, profile: &Profile) -> Vec<ReportMessage> {
    let mut vulns = Vec::new();

    for protocol in profile.protocols() {
        // TLS 1.3 was not standardized for the supported O-Saft revisions;
        // the parser records nothing for it, so declarations are skipped
        // instead of misreported as unsupported.
        if protocol.protocol_type() == ProtocolType::TLS13 {
            continue;
        }

        let Some(mode) = protocol.mode() else {
            continue;
        };
        let supported = probe.is_protocol_supported(protocol.protocol_type());

        if mode.is_must_be() && !supported {
            vulns.push(ReportMessage::error(
                format!("Protocol {} MUST BE supported!", protocol),
                Category::Protocol,
                mode,
            ));
        } else if mode.is_must_not_be() && supported {
            vulns.push(ReportMessage::error(
                format!("Protocol {} MUST NOT BE supported!", protocol),
                Category::Protocol,
                mode,
            ));
        }
    }

    vulns
}

fn check_vulnerabilities(probe: &ParsedProbe, profile: &Profile) -> Vec<ReportMessage> {
    let mut vulns = Vec::new();

    for (id, failure_text) in VULNERABILITY_CHECKS {
        if let Some(message) = judge_check(
            failure_text,
            &probe.check(*id),
            Category::Vulnerability,
            profile.vulnerabilities_mode(),
            profile.unknown_as_failure(),
        ) {
            vulns.push(message);
        }
    }

    vulns
}

fn check_certificate(probe: &ParsedProbe, profile: &Profile) -> Result<Vec<ReportMessage>> {
    let mut vulns = Vec::new();

    for (id, failure_text) in CERTIFICATE_CHECKS {
        if let Some(message) = judge_check(
            failure_text,
            &probe.check(*id),
            Category::Certificate,
            profile.certificate_mode(),
            profile.unknown_as_failure(),
        ) {
            vulns.push(message);
        }
    }

    vulns.extend(check_certificate_keys(probe, profile)?);
    Ok(vulns)
}

/// The one check that needs probe data and two profile directives at once:
/// the observed algorithm family picks which minimum applies, making the
/// RSA and ECDSA directives mutually exclusive per slot.
fn check_certificate_keys(probe: &ParsedProbe, profile: &Profile) -> Result<Vec<ReportMessage>> {
    let slots = [
        (
            "public",
            probe.public_key_algorithm(),
            probe.public_key_size(),
            RSA_MINIMUM_PUBLIC_KEY_SIZE,
            ECDSA_MINIMUM_PUBLIC_KEY_SIZE,
        ),
        (
            "signature",
            probe.signature_algorithm(),
            probe.signature_key_size(),
            RSA_MINIMUM_SIGNATURE_KEY_SIZE,
            ECDSA_MINIMUM_SIGNATURE_KEY_SIZE,
        ),
    ];

    let mut vulns = Vec::new();

    for (slot, algorithm, size, rsa_directive, ecdsa_directive) in slots {
        let directive = match algorithm {
            KeyAlgorithm::Rsa => profile.certificate_directive(rsa_directive)?,
            KeyAlgorithm::Ecdsa => profile.certificate_directive(ecdsa_directive)?,
            KeyAlgorithm::Other => continue,
        };

        if directive.mode().is_must_be() && directive.value() > size {
            vulns.push(ReportMessage::error(
                format!(
                    "Wrong size of certificate's {} key [actual size [{}] is less than expected minimum [{}]]",
                    slot,
                    size,
                    directive.value()
                ),
                Category::Certificate,
                directive.mode(),
            ));
        }
    }

    Ok(vulns)
}

/// Turn one check result into a vulnerable message, or nothing.
///
/// Safe never emits; Vulnerable always does; Unknown emits an
/// "unable to test" message only under the profile's unknown-as-failure
/// policy.
fn judge_check(
    failure_text: &str,
    result: &CheckResult,
    category: Category,
    mode: Mode,
    unknown_as_failure: bool,
) -> Option<ReportMessage> {
    let mut text = failure_text.to_string();
    if let Some(note) = result.note() {
        text.push_str(&format!(" [{}]", note));
    }

    if result.is_vulnerable() {
        Some(ReportMessage::error(text, category, mode))
    } else if result.is_unknown() && unknown_as_failure {
        Some(ReportMessage::error(
            format!("{}: {}", UNABLE_TO_TEST_PREFIX, text),
            category,
            mode,
        ))
    } else {
        None
    }
}
