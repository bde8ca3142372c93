use folio::{Document, Issue, Severity, parse_pdf};
use once_cell::sync::Lazy;

mod pages;
mod recovery;
mod revisions;
mod sample;

pub(crate) static SAMPLE: Lazy<Vec<u8>> =
    Lazy::new(|| include_bytes!("../pdfs/sample.pdf").to_vec());

pub(crate) const CATALOG: &str = "<< /Type /Catalog /Pages 2 0 R >>";
pub(crate) const ONE_PAGE: &str = "<< /Type /Pages /Kids [3 0 R] /Count 1 >>";
pub(crate) const PAGE: &str = "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>";

pub(crate) fn parse(data: Vec<u8>) -> Document {
    parse_pdf(data).unwrap()
}

/// The structure issues of the given severity.
pub(crate) fn issues(doc: &Document, severity: Severity) -> Vec<&Issue> {
    doc.structure_issues()
        .iter()
        .filter(|i| i.severity == severity)
        .collect()
}

pub(crate) fn has_issue(doc: &Document, severity: Severity, needle: &str) -> bool {
    issues(doc, severity)
        .iter()
        .any(|i| i.message.contains(needle))
}
