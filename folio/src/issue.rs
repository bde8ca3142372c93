//! Issues found in a document.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The rule id under which problems found while parsing are reported.
pub const STRUCTURE_RECOVERY: &str = "structure.recovery";

/// How severe an issue is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document violates the schema.
    Error,
    /// The document is questionable, but not invalid.
    Warning,
    /// Purely informational.
    Info,
}

impl Severity {
    /// The lowercase name of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// The id of the rule that reported the issue.
    pub rule_id: String,
    /// How severe the issue is.
    pub severity: Severity,
    /// A human-readable description.
    pub message: String,
    /// The number of the object the issue is about, if it is about a specific object.
    pub object_number: Option<u32>,
}

impl Issue {
    /// Create a new issue.
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        object_number: Option<u32>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            object_number,
        }
    }

    pub(crate) fn structure(
        severity: Severity,
        message: impl Into<String>,
        object_number: Option<u32>,
    ) -> Self {
        Self::new(STRUCTURE_RECOVERY, severity, message, object_number)
    }

    /// Whether the issue has [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rule_id, self.message)?;

        if let Some(num) = self.object_number {
            write!(f, " (object {num})")?;
        }

        Ok(())
    }
}
