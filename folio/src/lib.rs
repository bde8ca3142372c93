/*!
A crate for parsing PDF files into a document model and validating them.

Parsing goes from raw bytes over the cross-reference data and the object graph to a
[`Document`], which exposes the catalog, the flattened page tree, the trailer and the
information dictionary. Damaged files are repaired where possible: broken
cross-reference data is rebuilt by scanning the file, wrong stream lengths are
corrected and page tree cycles are cut. Each repair is recorded as an [`Issue`], so
parsing only fails if nothing at all could be recovered.

A document can then be validated against a named [`Schema`], such as `PDF-1.7`,
`PDF-2.0` or `PDF/A-1b`, which produces a [`ValidationReport`].

```no_run
let data = std::fs::read("file.pdf").unwrap();

if folio::is_pdf(&data) {
    let document = folio::parse_pdf(data).unwrap();
    let report = document.validate("PDF-1.7").unwrap();

    println!("{} is valid: {}", document.get_version(), report.is_valid());
}
```

## Safety
This crate forbids unsafe code via a crate-level attribute.

## Cargo features
- `logging`: Forward internal diagnostics to the `log` crate.
- `parallel`: Allow running the rules of a schema concurrently, see [`ValidationSettings`].
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

#[macro_use]
mod log;

pub mod document;
mod error;
pub mod issue;
mod settings;
pub mod stats;
mod util;
pub mod validate;

pub use document::Document;
pub use document::metadata::Metadata;
pub use document::page::{Page, Rect};
pub use error::{Error, Result};
pub use folio_syntax;
pub use folio_syntax::PdfData;
pub use issue::{Issue, Severity};
pub use settings::{ParseSettings, ValidationSettings, VersionPolicy};
pub use stats::{StatValue, Statistics};
pub use validate::registry::{SchemaRegistry, get_available_schemas, register_schema};
pub use validate::schema::{IssueSink, Rule, Schema};
pub use validate::{ValidationReport, Validator, ValidatorState};

use memchr::memmem;

/// How far into the file the `%PDF-` signature may appear.
const HEADER_WINDOW: usize = 1024;

/// Check cheaply whether the data looks like a PDF file.
///
/// The data must have a `%PDF-` signature within the first 1024 bytes, and a
/// `startxref` or `trailer` keyword somewhere. The file is not parsed.
pub fn is_pdf(data: &[u8]) -> bool {
    let head = &data[..data.len().min(HEADER_WINDOW)];

    memmem::find(head, b"%PDF-").is_some()
        && (memmem::rfind(data, b"startxref").is_some() || memmem::rfind(data, b"trailer").is_some())
}

/// Parse a document with the default settings.
///
/// Fails with [`Error::MalformedDocument`] only if no object could be recovered at
/// all. Anything less severe is recorded as an issue on the document.
pub fn parse_pdf(data: impl Into<PdfData>) -> Result<Document> {
    parse_pdf_with(data, ParseSettings::default())
}

/// Parse a document with the given settings.
pub fn parse_pdf_with(data: impl Into<PdfData>, settings: ParseSettings) -> Result<Document> {
    Document::build(data.into(), settings)
}

#[cfg(test)]
mod tests {
    use super::is_pdf;

    #[test]
    fn sniffing() {
        assert!(is_pdf(b"%PDF-1.4\n...\nstartxref\n0\n%%EOF"));
        assert!(is_pdf(b"garbage%PDF-1.4\ntrailer << >>"));
        assert!(!is_pdf(b"This is not a PDF file"));
        assert!(!is_pdf(b"%PDF-1.4 without any structure"));
        assert!(!is_pdf(b""));
    }
}
