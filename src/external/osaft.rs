// O-Saft integration
//
// Wrapper around the o-saft.pl probing tool. The profile decides which
// O-Saft subcommands are worth running; their concatenated stdout lines are
// what the probe parser consumes.

use crate::external::validate_destination;
use crate::error::ScanError;
use crate::policy::{Profile, Target};
use crate::Result;
use std::process::Command;
use tracing::{debug, info};

/// Default O-Saft entry script, resolved via PATH
pub const DEFAULT_TOOL: &str = "o-saft.pl";

/// O-Saft subcommands per test category
const CHECK_COMMAND: &str = "+check";
const INFO_COMMAND: &str = "+info";
const PROTOCOLS_COMMAND: &str = "+protocols";

/// O-Saft client
pub struct OSaftClient {
    tool_path: String,
}

impl Default for OSaftClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OSaftClient {
    pub fn new() -> Self {
        Self {
            tool_path: DEFAULT_TOOL.to_string(),
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            tool_path: path.into(),
        }
    }

    pub fn tool_path(&self) -> &str {
        &self.tool_path
    }

    /// Run every O-Saft subcommand the profile needs and collect the raw
    /// stdout lines for one target, in invocation order.
    pub fn collect(&self, target: &Target, profile: &Profile) -> Result<Vec<String>> {
        let mut lines = Vec::new();

        if profile.is_test_cipher_suites() || profile.is_test_vulnerabilities() {
            lines.extend(self.run(target.destination(), CHECK_COMMAND)?);
        }
        if profile.is_test_certificate() {
            lines.extend(self.run(target.destination(), INFO_COMMAND)?);
        }
        if profile.is_test_safe_protocols() {
            lines.extend(self.run(target.destination(), PROTOCOLS_COMMAND)?);
        }

        Ok(lines)
    }

    fn run(&self, destination: &str, command: &str) -> Result<Vec<String>> {
        validate_destination(destination)?;

        info!(
            "Running O-Saft: {} --legacy=quick --no-header {} {}",
            self.tool_path, command, destination
        );

        // --legacy=quick and --no-header keep the output in the
        // tab-separated header/value layout the parser expects.
        let output = Command::new(&self.tool_path)
            .arg("--legacy=quick")
            .arg("--no-header")
            .arg(command)
            .arg(destination)
            .output()
            .map_err(|err| ScanError::Tool {
                message: format!("failed to run {}: {}", self.tool_path, err),
            })?;

        // O-Saft exits non-zero for some perfectly parsable situations
        // (e.g. connection failures), so the exit status is logged but the
        // stdout lines are always handed to the parser.
        debug!("O-Saft exited with {}", output.status);

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_path() {
        assert_eq!(OSaftClient::new().tool_path(), DEFAULT_TOOL);
        assert_eq!(
            OSaftClient::with_path("/opt/o-saft/o-saft.pl").tool_path(),
            "/opt/o-saft/o-saft.pl"
        );
    }

    #[test]
    fn test_run_rejects_unsafe_destination() {
        let client = OSaftClient::new();
        assert!(client.run("--foo", CHECK_COMMAND).is_err());
    }
}
