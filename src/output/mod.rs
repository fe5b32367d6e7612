// Output module - terminal, JSON and HTML renderers for scan reports

pub mod html;

use crate::policy::report::{Report, Severity};
use crate::scanner::ScanSummary;
use crate::Result;
use colored::Colorize;

/// Format the whole batch for the terminal
pub fn format_terminal(summary: &ScanSummary) -> String {
    let mut output = String::new();

    for report in &summary.reports {
        output.push_str(&format!("{}\n", "=".repeat(60).cyan()));
        output.push_str(&format!(
            "Target: {} ({})\n",
            report.target().destination().bold(),
            report.target().name()
        ));
        output.push_str(&format!(
            "Profile: {}\n",
            report.target().profile_name()
        ));
        output.push_str(&format!("{}\n", "=".repeat(60).cyan()));

        for message in report.vulnerable_messages() {
            output.push_str(&format!(
                "{} [{}] {}\n",
                "✗".red().bold(),
                message.category().label(),
                message.message().red()
            ));
        }
        for message in report.safe_messages() {
            let marker = match message.severity() {
                Severity::Success => "✓".green(),
                Severity::Error => "✗".red(),
            };
            output.push_str(&format!(
                "{} [{}] {}\n",
                marker,
                message.category().label(),
                message.message()
            ));
        }

        let verdict = if report.is_safe() {
            "SAFE".green().bold().to_string()
        } else {
            format!(
                "VULNERABLE ({} finding(s))",
                report.vulnerable_messages().len()
            )
            .red()
            .bold()
            .to_string()
        };
        output.push_str(&format!("Result: {}\n\n", verdict));
    }

    let exit_code_msg = if summary.all_safe() {
        "Exit Code: 0 (PASS)".green().bold()
    } else {
        "Exit Code: 1 (FAIL)".red().bold()
    };
    output.push_str(&format!("{}\n", exit_code_msg));

    output
}

/// Format the whole batch as pretty-printed JSON
pub fn format_json(reports: &[Report]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::report::{Category, Evaluation, ReportMessage};
    use crate::policy::{Mode, ProfileRegistry, Target};

    fn report() -> Report {
        let mut registry = ProfileRegistry::new();
        let profile = crate::policy::Profile::new(
            "default",
            Vec::new(),
            Vec::new(),
            vec![
                crate::policy::Directive::new(
                    crate::policy::RSA_MINIMUM_PUBLIC_KEY_SIZE,
                    2048,
                    Mode::MustBe,
                ),
                crate::policy::Directive::new(
                    crate::policy::RSA_MINIMUM_SIGNATURE_KEY_SIZE,
                    2048,
                    Mode::MustBe,
                ),
                crate::policy::Directive::new(
                    crate::policy::ECDSA_MINIMUM_PUBLIC_KEY_SIZE,
                    256,
                    Mode::MustBe,
                ),
                crate::policy::Directive::new(
                    crate::policy::ECDSA_MINIMUM_SIGNATURE_KEY_SIZE,
                    256,
                    Mode::MustBe,
                ),
            ],
            Mode::MustBe,
            Mode::MustBe,
            false,
        )
        .unwrap();
        registry.register(profile).unwrap();
        let target = Target::new("example.com", "default", "Example", &registry).unwrap();

        Report::new(
            target,
            Evaluation {
                vulnerable: vec![ReportMessage::error(
                    "SSLv3 supported!",
                    Category::Vulnerability,
                    Mode::MustBe,
                )],
                safe: vec![ReportMessage::success("OK", Category::Cipher)],
            },
        )
    }

    #[test]
    fn test_terminal_output_mentions_findings() {
        colored::control::set_override(false);
        let summary = ScanSummary {
            reports: vec![report()],
        };
        let output = format_terminal(&summary);

        assert!(output.contains("example.com"));
        assert!(output.contains("SSLv3 supported!"));
        assert!(output.contains("Exit Code: 1 (FAIL)"));
    }

    #[test]
    fn test_json_output_is_valid() {
        let output = format_json(&[report()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["target"]["destination"], "example.com");
    }
}
