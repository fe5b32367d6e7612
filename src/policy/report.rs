// Report model - categorized evaluation outcomes, consumed by the renderers

use crate::policy::{Mode, Target};
use serde::Serialize;

/// Test category a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Protocol,
    Vulnerability,
    Certificate,
    Cipher,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Protocol => "Protocols",
            Category::Vulnerability => "Vulnerabilities",
            Category::Certificate => "Certificate",
            Category::Cipher => "Cipher suites",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Success,
}

/// One categorized, human-readable evaluation outcome.
///
/// `mode` is the declaration mode that produced the message; synthetic
/// messages (category not tested, "OK" summaries) carry none.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMessage {
    message: String,
    category: Category,
    mode: Option<Mode>,
    severity: Severity,
}

impl ReportMessage {
    pub fn error(message: impl Into<String>, category: Category, mode: Mode) -> Self {
        Self {
            message: message.into(),
            category,
            mode: Some(mode),
            severity: Severity::Error,
        }
    }

    pub fn success(message: impl Into<String>, category: Category) -> Self {
        Self {
            message: message.into(),
            category,
            mode: None,
            severity: Severity::Success,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// The evaluator's verdict for one target: every produced message, split
/// into the vulnerable and the confirmed-safe bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Evaluation {
    pub vulnerable: Vec<ReportMessage>,
    pub safe: Vec<ReportMessage>,
}

impl Evaluation {
    pub fn is_safe(&self) -> bool {
        self.vulnerable.is_empty()
    }
}

/// One target's scan outcome, ready for rendering
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    target: Target,
    evaluation: Evaluation,
}

impl Report {
    pub fn new(target: Target, evaluation: Evaluation) -> Self {
        Self { target, evaluation }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn vulnerable_messages(&self) -> &[ReportMessage] {
        &self.evaluation.vulnerable
    }

    pub fn safe_messages(&self) -> &[ReportMessage] {
        &self.evaluation.safe
    }

    pub fn is_safe(&self) -> bool {
        self.evaluation.is_safe()
    }
}
