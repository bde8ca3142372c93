use crate::{SAMPLE, has_issue};
use folio::{Error, ParseSettings, Severity, StatValue, is_pdf, parse_pdf, parse_pdf_with};

#[test]
fn sample_is_pdf() {
    assert!(is_pdf(&SAMPLE));
    assert!(!is_pdf(b"%!PS-Adobe-3.0\nshowpage"));
}

#[test]
fn sample_structure() {
    let doc = parse_pdf(SAMPLE.as_slice()).unwrap();

    assert_eq!(doc.object_count(), 3);
    assert_eq!(doc.get_version(), "1.4");
    assert_eq!(doc.catalog_id().map(|id| id.num), Some(1));

    let pages = doc.pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].object_number(), Some(3));

    let media_box = pages[0].media_box_rect().unwrap();
    assert_eq!(media_box.width(), 612.0);
    assert_eq!(media_box.height(), 792.0);
}

#[test]
fn sample_startxref_is_repaired() {
    let doc = parse_pdf(SAMPLE.as_slice()).unwrap();

    // The file claims its table starts at offset 200, which is in the middle of it.
    assert!(doc.xref().reconstructed);
    assert!(has_issue(&doc, Severity::Warning, "reconstructed"));
    assert!(doc.structure_issues().iter().all(|i| !i.is_error()));
}

#[test]
fn sample_without_repair() {
    let settings = ParseSettings {
        repair: false,
        ..ParseSettings::default()
    };

    assert!(matches!(
        parse_pdf_with(SAMPLE.as_slice(), settings),
        Err(Error::MalformedDocument(_))
    ));
}

#[test]
fn sample_statistics() {
    let doc = parse_pdf(SAMPLE.as_slice()).unwrap();
    let stats = doc.get_statistics();

    assert_eq!(stats["object_count"], StatValue::Integer(3));
    assert_eq!(stats["page_count"], StatValue::Integer(1));
    assert_eq!(stats["objects.dictionary"], StatValue::Integer(3));
    assert_eq!(stats["stream_count"], StatValue::Integer(0));
    assert_eq!(stats["version"].as_str(), Some("1.4"));
    assert_eq!(stats["header_version"].as_str(), Some("1.4"));
    assert_eq!(stats["encrypted"], StatValue::Flag(false));
    assert_eq!(stats["xref_repaired"], StatValue::Flag(true));
    assert!(!stats.contains_key("catalog_version"));
}

#[test]
fn sample_against_builtin_schemas() {
    let doc = parse_pdf(SAMPLE.as_slice()).unwrap();

    let report = doc.validate("PDF-1.7").unwrap();
    assert!(report.is_valid());
    assert_eq!(report.schema_version(), "1.7");
    assert!(report.get_issues().iter().any(|i| i.rule_id == "trailer.id"));

    // PDF 2.0 requires a file identifier.
    let report = doc.validate("PDF-2.0").unwrap();
    assert!(!report.is_valid());
    assert!(
        report
            .get_issues()
            .iter()
            .any(|i| i.rule_id == "trailer.id" && i.severity == Severity::Error)
    );

    let report = doc.validate("PDF/A-1b").unwrap();
    assert!(!report.is_valid());
    assert!(
        report
            .get_issues()
            .iter()
            .any(|i| i.rule_id == "metadata.stream" && i.object_number == Some(1))
    );
}
