// External tool integration - O-Saft

pub mod osaft;

pub use osaft::OSaftClient;

use crate::error::ScanError;
use crate::Result;
use std::process::Command;

/// Check if an external tool is available in PATH
pub fn check_tool_available(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Reject destinations that could smuggle options or shell metacharacters
/// into the child process argv.
pub fn validate_destination(destination: &str) -> Result<()> {
    let acceptable = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '_');

    if destination.is_empty()
        || destination.starts_with('-')
        || !destination.chars().all(acceptable)
    {
        return Err(ScanError::InvalidDestination {
            destination: destination.to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_available() {
        // Most systems should have 'ls'
        assert!(check_tool_available("ls"));

        // This tool definitely doesn't exist
        assert!(!check_tool_available("nonexistent_tool_xyz123"));
    }

    #[test]
    fn test_validate_destination() {
        assert!(validate_destination("example.com").is_ok());
        assert!(validate_destination("example.com:8443").is_ok());
        assert!(validate_destination("my_host-1.example.com").is_ok());

        assert!(validate_destination("").is_err());
        assert!(validate_destination("--no-header").is_err());
        assert!(validate_destination("example.com; rm -rf /").is_err());
        assert!(validate_destination("host with spaces").is_err());
    }
}
