use crate::{CATALOG, ONE_PAGE, PAGE, has_issue, issues, parse};
use folio::{Error, Severity, parse_pdf};
use folio_tests::{PdfBuilder, simple_document};

fn with_contents(contents: &str) -> Vec<u8> {
    PdfBuilder::new("1.4")
        .object(1, CATALOG)
        .object(2, ONE_PAGE)
        .object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        )
        .object(4, contents)
        .xref_table("/Root 1 0 R")
        .finish()
}

#[test]
fn wrong_stream_length() {
    let doc = parse(with_contents("<< /Length 100 >>\nstream\nhello\nendstream"));

    assert!(has_issue(&doc, Severity::Warning, "/Length 100 is wrong"));
    assert!(
        issues(&doc, Severity::Warning)
            .iter()
            .any(|i| i.object_number == Some(4))
    );

    let stream = doc.get(4).and_then(|o| o.as_stream()).unwrap();
    assert_eq!(doc.decode_stream(stream).unwrap(), b"hello");
}

#[test]
fn missing_stream_length() {
    let doc = parse(with_contents("<< >>\nstream\nhello\nendstream"));

    assert!(has_issue(&doc, Severity::Warning, "/Length is missing"));

    let stream = doc.get(4).and_then(|o| o.as_stream()).unwrap();
    assert_eq!(stream.raw_data(), b"hello");
}

#[test]
fn garbage_before_header() {
    let mut data = b"GARBAGE\n".to_vec();
    data.extend(simple_document("1.6", &["/MediaBox [0 0 10 10]"]));

    let doc = parse(data);

    assert!(has_issue(&doc, Severity::Info, "preceded by 8 bytes"));
    assert_eq!(doc.get_version(), "1.6");
    assert_eq!(doc.pages().len(), 1);
}

#[test]
fn no_xref_table() {
    let data = format!(
        "%PDF-1.3\n1 0 obj\n{CATALOG}\nendobj\n2 0 obj\n{ONE_PAGE}\nendobj\n3 0 obj\n{PAGE}\nendobj\ntrailer\n<< /Root 1 0 R /Size 4 >>\n%%EOF"
    );

    let doc = parse(data.into_bytes());

    assert!(doc.xref().reconstructed);
    assert!(has_issue(&doc, Severity::Warning, "reconstructed"));
    assert_eq!(doc.object_count(), 3);
    assert_eq!(doc.pages().len(), 1);
}

#[test]
fn no_trailer() {
    let data = format!(
        "%PDF-1.3\n1 0 obj\n{CATALOG}\nendobj\n2 0 obj\n{ONE_PAGE}\nendobj\n3 0 obj\n{PAGE}\nendobj\n%%EOF"
    );

    let doc = parse(data.into_bytes());

    assert!(has_issue(&doc, Severity::Warning, "no usable trailer"));
    assert_eq!(doc.catalog_id().map(|id| id.num), Some(1));
    assert_eq!(doc.pages().len(), 1);
}

#[test]
fn truncated_file() {
    let data = simple_document("1.4", &["/MediaBox [0 0 10 10]", "/MediaBox [0 0 20 20]"]);
    // Cut the file right after the last page object, losing the table.
    let end = table_offset(&data);

    let doc = parse(data[..end].to_vec());

    assert!(doc.xref().reconstructed);
    assert_eq!(doc.pages().len(), 2);
}

fn table_offset(data: &[u8]) -> usize {
    data.windows(6).rposition(|w| w == b"\nxref\n").unwrap() + 1
}

#[test]
fn dangling_reference() {
    let data = PdfBuilder::new("1.4")
        .object(1, "<< /Type /Catalog /Pages 2 0 R /Outlines 9 0 R >>")
        .object(2, ONE_PAGE)
        .object(3, PAGE)
        .xref_table("/Root 1 0 R")
        .finish();

    let doc = parse(data);
    let dangling = issues(&doc, Severity::Warning);

    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].message, "reference to missing object 9 0");
    assert_eq!(dangling[0].object_number, Some(1));

    // Dangling references resolve to null.
    let outlines = doc.catalog().and_then(|c| c.get(b"Outlines")).unwrap();
    assert!(doc.deref(outlines).is_null());
}

#[test]
fn not_a_pdf() {
    assert!(matches!(
        parse_pdf(b"hello world".as_slice()),
        Err(Error::MalformedDocument(_))
    ));
    assert!(matches!(
        parse_pdf(Vec::new()),
        Err(Error::MalformedDocument(_))
    ));
}
