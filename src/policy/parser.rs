// YAML configuration loader and validator
//
// Deserializes the raw configuration into untyped string-carrying structs,
// then converts and strict-validates them into the domain model. Everything
// that can be wrong with a configuration fails here, before any scan runs.

use crate::error::ScanError;
use crate::policy::{
    CipherSuite, Directive, Mode, Profile, ProfileRegistry, Protocol, Target,
};
use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default configuration file name, expected in the working directory
pub const CONFIG_FILE: &str = "tlscheck.yaml";

/// Commented starter configuration written by `--create-default`
pub const DEFAULT_CONFIG: &str = r#"# tlscheck configuration
#
# Each profile declares what a compliant endpoint looks like; each target
# binds one destination to one profile. Modes: mustBe, mustNotBe, canBe.

# Path to the O-Saft entry script (optional, defaults to o-saft.pl on PATH)
# osaft: /opt/o-saft/o-saft.pl

profiles:
  - name: default
    vulnerabilities: mustBe
    certificate: mustBe
    # Report checks the tool could not answer as failures?
    unknownTestResultIsError: false
    directives:
      rsaMinimumPublicKeySize: { value: 2048, mode: mustBe }
      rsaMinimumSignatureKeySize: { value: 2048, mode: mustBe }
      ecdsaMinimumPublicKeySize: { value: 256, mode: mustBe }
      ecdsaMinimumSignatureKeySize: { value: 256, mode: mustBe }
    protocols:
      - { name: "TLSv1.2", mode: mustBe }
      - { name: "SSLv2", mode: mustNotBe }
      - { name: "SSLv3", mode: mustNotBe }
    cipherSuites:
      - { name: "ECDHE-RSA-AES256-GCM-SHA384", mode: canBe }

targets:
  - destination: example.com
    profile: default
    name: Example
"#;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    osaft: Option<String>,
    profiles: Vec<RawProfile>,
    targets: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    name: String,
    vulnerabilities: String,
    certificate: String,
    #[serde(rename = "unknownTestResultIsError", default)]
    unknown_test_result_is_error: bool,
    directives: HashMap<String, RawDirective>,
    #[serde(default)]
    protocols: Vec<RawModedName>,
    #[serde(rename = "cipherSuites", default)]
    cipher_suites: Vec<RawModedName>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDirective {
    value: i32,
    mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModedName {
    name: String,
    mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    destination: String,
    profile: String,
    #[serde(default)]
    name: String,
}

/// Fully validated configuration: the profile registry plus the resolved
/// targets, ready to hand to the orchestrator.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub osaft_path: Option<String>,
    pub registry: ProfileRegistry,
    pub targets: Vec<Target>,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path).map_err(|source| ScanError::Io { source })?;
        Self::load_from_string(&content)
    }

    /// Load and validate configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Configuration> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(ScanError::Yaml)?;

        let mut registry = ProfileRegistry::new();
        for raw_profile in raw.profiles {
            registry.register(Self::convert_profile(raw_profile)?)?;
        }

        let mut targets = Vec::new();
        for raw_target in raw.targets {
            targets.push(Target::new(
                raw_target.destination,
                raw_target.profile,
                raw_target.name,
                &registry,
            )?);
        }

        Ok(Configuration {
            osaft_path: raw.osaft,
            registry,
            targets,
        })
    }

    /// Write the commented starter configuration, refusing to overwrite
    pub fn create_default(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(ScanError::Config {
                message: format!("refusing to overwrite existing {}", path.display()),
            }
            .into());
        }
        fs::write(path, DEFAULT_CONFIG).map_err(|source| ScanError::Io { source })?;
        Ok(())
    }

    fn convert_profile(raw: RawProfile) -> Result<Profile> {
        let mut directives = Vec::new();
        for (name, raw_directive) in raw.directives {
            directives.push(Directive::new(
                name,
                raw_directive.value,
                Mode::parse(&raw_directive.mode)?,
            ));
        }

        let mut protocols = Vec::new();
        for raw_protocol in raw.protocols {
            protocols.push(Protocol::parse(
                &raw_protocol.name,
                Mode::parse(&raw_protocol.mode)?,
            )?);
        }

        let mut cipher_suites = Vec::new();
        for raw_suite in raw.cipher_suites {
            cipher_suites.push(CipherSuite::new(
                raw_suite.name,
                Mode::parse(&raw_suite.mode)?,
            ));
        }

        Profile::new(
            raw.name,
            protocols,
            cipher_suites,
            directives,
            Mode::parse(&raw.vulnerabilities)?,
            Mode::parse(&raw.certificate)?,
            raw.unknown_test_result_is_error,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips() {
        let config = ConfigLoader::load_from_string(DEFAULT_CONFIG).unwrap();

        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].destination(), "example.com");

        let profile = config.registry.get("default").unwrap();
        assert!(profile.is_test_vulnerabilities());
        assert!(profile.is_test_certificate());
        assert!(profile.is_test_safe_protocols());
        assert!(profile.is_test_cipher_suites());
        assert!(!profile.unknown_as_failure());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let content = DEFAULT_CONFIG.replace("vulnerabilities: mustBe", "vulnerabilities: always");
        let err = ConfigLoader::load_from_string(&content).unwrap_err();
        let err = err.downcast::<ScanError>().unwrap();
        assert!(matches!(err, ScanError::UnknownMode { .. }));
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let content = DEFAULT_CONFIG.replace("TLSv1.2", "TLSv9");
        let err = ConfigLoader::load_from_string(&content).unwrap_err();
        let err = err.downcast::<ScanError>().unwrap();
        assert!(matches!(err, ScanError::UnknownProtocol { .. }));
    }

    #[test]
    fn test_missing_directive_is_rejected() {
        let content =
            DEFAULT_CONFIG.replace("      rsaMinimumPublicKeySize: { value: 2048, mode: mustBe }\n", "");
        let err = ConfigLoader::load_from_string(&content).unwrap_err();
        let err = err.downcast::<ScanError>().unwrap();
        assert!(matches!(err, ScanError::MissingDirectives { .. }));
    }

    #[test]
    fn test_target_with_unknown_profile_is_rejected() {
        let content = DEFAULT_CONFIG.replace("    profile: default", "    profile: nonexistent");
        let err = ConfigLoader::load_from_string(&content).unwrap_err();
        let err = err.downcast::<ScanError>().unwrap();
        assert!(matches!(err, ScanError::UnknownProfile { .. }));
    }

    #[test]
    fn test_create_default_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        ConfigLoader::create_default(&path).unwrap();
        assert!(path.exists());
        assert!(ConfigLoader::create_default(&path).is_err());

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.targets.len(), 1);
    }
}
