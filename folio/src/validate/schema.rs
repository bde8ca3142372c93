//! Schemas and the rules they consist of.

use crate::document::Document;
use crate::issue::{Issue, Severity};
use std::fmt::{Debug, Formatter};

/// A single check that can be part of a schema.
///
/// Rules only have read access to the document, so the rules of a schema can run in
/// any order, or concurrently.
pub trait Rule: Send + Sync {
    /// The stable id of the rule, such as `trailer.root`.
    fn id(&self) -> &'static str;

    /// A short description of what the rule checks.
    fn description(&self) -> &'static str;

    /// Check the document and report any issues to the sink.
    fn check(&self, doc: &Document, sink: &mut IssueSink);
}

/// Collects the issues reported by one rule.
#[derive(Debug)]
pub struct IssueSink {
    rule_id: &'static str,
    issues: Vec<Issue>,
}

impl IssueSink {
    pub(crate) fn new(rule_id: &'static str) -> Self {
        Self {
            rule_id,
            issues: vec![],
        }
    }

    /// Report an issue under the id of the current rule.
    pub fn report(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        object_number: Option<u32>,
    ) {
        self.issues
            .push(Issue::new(self.rule_id, severity, message, object_number));
    }

    /// Report an error.
    pub fn error(&mut self, message: impl Into<String>, object_number: Option<u32>) {
        self.report(Severity::Error, message, object_number);
    }

    /// Report a warning.
    pub fn warning(&mut self, message: impl Into<String>, object_number: Option<u32>) {
        self.report(Severity::Warning, message, object_number);
    }

    /// Add an issue as is, keeping its rule id.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// The issues reported so far.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Finish the rule, sorting its issues by object number. Issues that are not about
    /// a specific object come first.
    pub(crate) fn finish(mut self) -> Vec<Issue> {
        self.issues.sort_by_key(|i| i.object_number);
        self.issues
    }
}

/// A named, versioned, ordered list of rules.
pub struct Schema {
    name: String,
    version: String,
    rules: Vec<Box<dyn Rule>>,
}

impl Schema {
    /// Create a new schema without rules.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            rules: vec![],
        }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Append a boxed rule.
    pub fn push_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// The name of the schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version of the schema.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The rules, in the order they run in.
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }
}

impl Debug for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("rules", &self.rules.iter().map(|r| r.id()).collect::<Vec<_>>())
            .finish()
    }
}
