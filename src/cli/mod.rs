// CLI module - command line interface and argument parsing

use crate::policy::parser::CONFIG_FILE;
use clap::Parser;
use std::path::PathBuf;

/// tlscheck - declarative TLS policy scanner on top of O-Saft
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "tlscheck")]
#[command(about = "Declarative TLS policy scanner built on top of O-Saft")]
pub struct Args {
    /// Configuration file with profiles and targets
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Write a commented starter configuration and exit
    #[arg(long = "create-default")]
    pub create_default: bool,

    /// Write an HTML report to FILE
    #[arg(long = "html", value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Print reports as JSON instead of the terminal summary
    #[arg(long = "json")]
    pub json: bool,

    /// Path to the O-Saft entry script (overrides the configuration)
    #[arg(long = "osaft", value_name = "PATH")]
    pub osaft: Option<String>,
}

impl Args {
    /// Tool path precedence: CLI flag, then configuration, then PATH lookup
    pub fn osaft_path(&self, configured: Option<&str>) -> String {
        self.osaft
            .clone()
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| crate::external::osaft::DEFAULT_TOOL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["tlscheck"]);
        assert_eq!(args.config, PathBuf::from(CONFIG_FILE));
        assert!(!args.create_default);
        assert!(!args.json);
        assert!(args.html.is_none());
    }

    #[test]
    fn test_osaft_path_precedence() {
        let args = Args::parse_from(["tlscheck", "--osaft", "/opt/o-saft/o-saft.pl"]);
        assert_eq!(
            args.osaft_path(Some("/etc/o-saft.pl")),
            "/opt/o-saft/o-saft.pl"
        );

        let args = Args::parse_from(["tlscheck"]);
        assert_eq!(args.osaft_path(Some("/etc/o-saft.pl")), "/etc/o-saft.pl");
        assert_eq!(args.osaft_path(None), "o-saft.pl");
    }

    #[test]
    fn test_flag_parsing() {
        let args = Args::parse_from(["tlscheck", "--json", "--html", "out.html", "-c", "my.yaml"]);
        assert!(args.json);
        assert_eq!(args.html, Some(PathBuf::from("out.html")));
        assert_eq!(args.config, PathBuf::from("my.yaml"));
    }
}
