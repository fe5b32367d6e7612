// Scanner module - per-target orchestration
//
// Thin glue: for each target, run O-Saft, feed the captured lines to the
// probe parser, hand the parsed probe to the policy evaluator, and collect
// the resulting report. Targets are independent; a target that cannot be
// reached produces its single connection-failure message without touching
// the rest of the batch.

use crate::external::OSaftClient;
use crate::policy::evaluator;
use crate::policy::parser::Configuration;
use crate::policy::report::Report;
use crate::policy::{Profile, Target};
use crate::probe::parser::parse;
use crate::Result;
use tracing::info;

/// Outcome of one batch run over all configured targets
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub reports: Vec<Report>,
}

impl ScanSummary {
    /// Total vulnerable messages across all targets
    pub fn vulnerable_count(&self) -> usize {
        self.reports
            .iter()
            .map(|report| report.vulnerable_messages().len())
            .sum()
    }

    pub fn all_safe(&self) -> bool {
        self.reports.iter().all(Report::is_safe)
    }
}

/// Scan one target with already-collected probe output.
///
/// This is the complete core pipeline with the process boundary cut off,
/// which is exactly what tests want.
pub fn scan_lines(target: &Target, profile: &Profile, lines: &[String]) -> Result<Report> {
    let probe = parse(lines);
    let evaluation = evaluator::evaluate(&probe, profile)?;
    Ok(Report::new(target.clone(), evaluation))
}

/// Scan every configured target sequentially
pub fn run_batch(configuration: &Configuration, client: &OSaftClient) -> Result<ScanSummary> {
    let mut reports = Vec::with_capacity(configuration.targets.len());

    for target in &configuration.targets {
        let profile = configuration.registry.get(target.profile_name())?;

        info!("Running scan of {}", target.destination());
        let lines = client.collect(target, profile)?;
        let report = scan_lines(target, profile, &lines)?;
        info!(
            "Scan finished: {} vulnerable message(s)",
            report.vulnerable_messages().len()
        );

        reports.push(report);
    }

    Ok(ScanSummary { reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{
        CipherSuite, Directive, Mode, Profile, ProfileRegistry, Target,
        ECDSA_MINIMUM_PUBLIC_KEY_SIZE, ECDSA_MINIMUM_SIGNATURE_KEY_SIZE,
        RSA_MINIMUM_PUBLIC_KEY_SIZE, RSA_MINIMUM_SIGNATURE_KEY_SIZE,
    };

    fn fixture() -> (Target, Profile) {
        let profile = Profile::new(
            "default",
            Vec::new(),
            vec![CipherSuite::new("AES128-SHA", Mode::MustNotBe)],
            vec![
                Directive::new(RSA_MINIMUM_PUBLIC_KEY_SIZE, 2048, Mode::MustBe),
                Directive::new(RSA_MINIMUM_SIGNATURE_KEY_SIZE, 2048, Mode::MustBe),
                Directive::new(ECDSA_MINIMUM_PUBLIC_KEY_SIZE, 256, Mode::MustBe),
                Directive::new(ECDSA_MINIMUM_SIGNATURE_KEY_SIZE, 256, Mode::MustBe),
            ],
            Mode::CanBe,
            Mode::CanBe,
            false,
        )
        .unwrap();

        let mut registry = ProfileRegistry::new();
        registry.register(profile.clone()).unwrap();
        let target = Target::new("example.com", "default", "Example", &registry).unwrap();

        (target, profile)
    }

    #[test]
    fn test_scan_lines_pipeline() {
        let (target, profile) = fixture();
        let lines = vec!["AES128-SHA\t-?-\tmedium".to_string()];

        let report = scan_lines(&target, &profile, &lines).unwrap();

        assert!(!report.is_safe());
        assert_eq!(report.vulnerable_messages().len(), 1);
        assert_eq!(report.target().destination(), "example.com");
    }

    #[test]
    fn test_observed_suites_do_not_leak_between_scans() {
        let (target, profile) = fixture();

        let vulnerable =
            scan_lines(&target, &profile, &["AES128-SHA\t-?-\tmedium".to_string()]).unwrap();
        assert!(!vulnerable.is_safe());

        // A second scan of the same target with clean output must not see
        // the first scan's observed cipher suites.
        let clean = scan_lines(&target, &profile, &[]).unwrap();
        assert!(clean.is_safe());
    }

    #[test]
    fn test_summary_counts() {
        let (target, profile) = fixture();
        let report = scan_lines(&target, &profile, &["AES128-SHA\t-?-\tmedium".to_string()])
            .unwrap();

        let summary = ScanSummary {
            reports: vec![report],
        };
        assert_eq!(summary.vulnerable_count(), 1);
        assert!(!summary.all_safe());
    }
}
