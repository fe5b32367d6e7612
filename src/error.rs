// Error types for tlscheck
//
// Structured error types using thiserror. The probe parser never produces
// errors (malformed tool output degrades to Unknown results); everything
// here belongs to configuration loading, tool invocation and rendering.

use std::io;
use thiserror::Error;

/// Main error type for tlscheck operations
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid configuration or parameters
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Mode string outside the mustBe/mustNotBe/canBe vocabulary
    #[error("Unknown mode [{value}]")]
    UnknownMode { value: String },

    /// Protocol name that matches no accepted alias
    #[error("Unknown protocol codename ({value})")]
    UnknownProtocol { value: String },

    /// Certificate directive name outside the supported set
    #[error("Unknown certificate directive [{name}]")]
    UnknownDirective { name: String },

    /// Profile is missing required certificate directives
    #[error("Profile [{profile}] is missing certificate directives {names:?}")]
    MissingDirectives { profile: String, names: Vec<String> },

    /// Two profiles share one name
    #[error("Duplicate profile name [{name}]")]
    DuplicateProfile { name: String },

    /// Target references a profile that was never registered
    #[error("Profile with name [{name}] not found")]
    UnknownProfile { name: String },

    /// Target with an empty destination
    #[error("Target destination can't be empty")]
    EmptyDestination,

    /// External tool invocation failed
    #[error("O-Saft invocation failed: {message}")]
    Tool { message: String },

    /// Destination contains characters unsafe to pass to a child process
    #[error("Invalid destination [{destination}]")]
    InvalidDestination { destination: String },

    /// Generic I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// YAML configuration parsing errors
    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors on report output
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTML template rendering errors
    #[error("Template render error: {0}")]
    Template(#[from] handlebars::RenderError),
}
