//! Validating documents against schemas.

mod builtin;
pub mod registry;
pub mod rules;
pub mod schema;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::issue::{Issue, Severity};
use crate::settings::ValidationSettings;
use schema::{IssueSink, Rule, Schema};
use serde::Serialize;
use std::sync::Arc;

/// The result of validating a document against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    schema_name: String,
    schema_version: String,
    valid: bool,
    issues: Vec<Issue>,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
}

impl ValidationReport {
    fn new(schema: &Schema, issues: Vec<Issue>) -> Self {
        let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count();

        Self {
            schema_name: schema.name().to_string(),
            schema_version: schema.version().to_string(),
            valid: count(Severity::Error) == 0,
            error_count: count(Severity::Error),
            warning_count: count(Severity::Warning),
            info_count: count(Severity::Info),
            issues,
        }
    }

    /// Whether no issue has [`Severity::Error`].
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// All issues, grouped by rule in the order of the schema.
    pub fn get_issues(&self) -> &[Issue] {
        &self.issues
    }

    /// The name of the schema the document was validated against.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The version of the schema the document was validated against.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// The number of issues with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error_count,
            Severity::Warning => self.warning_count,
            Severity::Info => self.info_count,
        }
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The state of a [`Validator`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidatorState {
    /// No rule has run yet.
    Pending,
    /// The rules are running.
    InProgress,
    /// All rules have run and the report is available.
    Completed,
}

/// Runs the rules of one schema over one document.
#[derive(Debug)]
pub struct Validator<'a> {
    doc: &'a Document,
    schema: Arc<Schema>,
    settings: ValidationSettings,
    state: ValidatorState,
    report: Option<ValidationReport>,
}

impl<'a> Validator<'a> {
    /// Create a new, pending validator.
    pub fn new(doc: &'a Document, schema: Arc<Schema>) -> Self {
        Self {
            doc,
            schema,
            settings: ValidationSettings::default(),
            state: ValidatorState::Pending,
            report: None,
        }
    }

    /// Use the given settings.
    pub fn with_settings(mut self, settings: ValidationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The current state.
    pub fn state(&self) -> ValidatorState {
        self.state
    }

    /// Run all rules and return the report. Running a completed validator again
    /// returns the same report.
    pub fn run(&mut self) -> ValidationReport {
        if let Some(report) = &self.report {
            return report.clone();
        }

        self.state = ValidatorState::InProgress;

        let issues = self.run_rules();
        let report = ValidationReport::new(&self.schema, issues);

        self.report = Some(report.clone());
        self.state = ValidatorState::Completed;

        report
    }

    #[cfg(feature = "parallel")]
    fn run_rules(&self) -> Vec<Issue> {
        use rayon::prelude::*;

        if !self.settings.parallel {
            return self.run_rules_sequential();
        }

        // Collecting keeps the order of the rules.
        self.schema
            .rules()
            .par_iter()
            .map(|rule| check_rule(rule.as_ref(), self.doc))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_rules(&self) -> Vec<Issue> {
        if self.settings.parallel {
            ldebug!("parallel validation requires the `parallel` feature, running sequentially");
        }

        self.run_rules_sequential()
    }

    fn run_rules_sequential(&self) -> Vec<Issue> {
        self.schema
            .rules()
            .iter()
            .flat_map(|rule| check_rule(rule.as_ref(), self.doc))
            .collect()
    }
}

fn check_rule(rule: &dyn Rule, doc: &Document) -> Vec<Issue> {
    let mut sink = IssueSink::new(rule.id());
    rule.check(doc, &mut sink);
    let issues = sink.finish();

    ltrace!("rule {} reported {} issues", rule.id(), issues.len());

    issues
}

pub(crate) fn validate(
    doc: &Document,
    schema_name: &str,
    settings: &ValidationSettings,
) -> Result<ValidationReport> {
    let schema = registry::global_schema(schema_name)
        .ok_or_else(|| Error::UnknownSchema(schema_name.to_string()))?;

    Ok(Validator::new(doc, schema).with_settings(*settings).run())
}
