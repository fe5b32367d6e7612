// tlscheck - declarative TLS policy scanner built on top of O-Saft
// Copyright (C) 2026 tlscheck contributors
// Licensed under GPL-3.0

//! tlscheck evaluates whether TLS endpoints meet a declarative security
//! policy. The actual protocol probing is delegated to the external O-Saft
//! tool; tlscheck parses its textual report into tri-state check results and
//! reconciles them against per-target profiles (must-be / must-not-be /
//! can-be) to produce categorized pass/fail verdicts.

pub mod cli;
pub mod error;
pub mod external;
pub mod output;
pub mod policy;
pub mod probe;
pub mod scanner;

// Re-export commonly used types
pub use crate::cli::Args;
pub use crate::error::ScanError;
pub use crate::policy::{Mode, Profile, ProfileRegistry, Target};
pub use crate::probe::{CheckResult, CheckStatus, ParsedProbe};

/// Result type for tlscheck operations
pub type Result<T> = anyhow::Result<T>;
