use crate::{CATALOG, has_issue, parse};
use folio::{ParseSettings, Severity, parse_pdf_with};
use folio_tests::PdfBuilder;

fn tree(nodes: &[(u32, &str)]) -> Vec<u8> {
    let mut builder = PdfBuilder::new("1.7").object(1, CATALOG);

    for (num, body) in nodes {
        builder = builder.object(*num, body);
    }

    builder.xref_table("/Root 1 0 R").finish()
}

#[test]
fn inherited_attributes() {
    let data = tree(&[
        (
            2,
            "<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 /MediaBox [0 0 100 100] /Rotate 90 /Resources << /ProcSet [/PDF] >> >>",
        ),
        (
            3,
            "<< /Type /Pages /Parent 2 0 R /Kids [4 0 R] /Count 1 /MediaBox [0 0 200 300] >>",
        ),
        (4, "<< /Type /Page /Parent 3 0 R >>"),
        (
            5,
            "<< /Type /Page /Parent 2 0 R /Rotate -90 /CropBox [10 10 50 50] /Resources 6 0 R >>",
        ),
        (6, "<< /Font << >> >>"),
    ]);

    let doc = parse(data);
    let pages = doc.pages();

    assert_eq!(pages.len(), 2);
    assert!(doc.structure_issues().is_empty());

    let first = &pages[0];
    assert_eq!(first.object_number(), Some(4));
    assert_eq!(first.media_box_rect().map(|r| (r.width(), r.height())), Some((200.0, 300.0)));
    assert_eq!(first.rotation(), 90);
    assert!(first.crop_box.is_none());
    assert!(first.resources.as_ref().and_then(|r| r.as_dict()).is_some());

    let second = &pages[1];
    assert_eq!(second.media_box_rect().map(|r| r.area()), Some(10_000.0));
    assert_eq!(second.rotation(), 270);
    assert!(second.crop_box.is_some());
    // Resources given by reference are stored resolved.
    assert!(second.resources.as_ref().and_then(|r| r.as_dict()).is_some());
}

#[test]
fn untyped_intermediate_node() {
    let data = tree(&[
        (2, "<< /Type /Pages /Kids [3 0 R] /Count 2 >>"),
        (3, "<< /Kids [4 0 R 5 0 R] /MediaBox [0 0 1 1] >>"),
        (4, "<< /Type /Page >>"),
        (5, "<< /Type /Page >>"),
    ]);

    let doc = parse(data);
    let pages = doc.pages();

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p.media_box.is_some()));
}

#[test]
fn cycle_in_page_tree() {
    let data = tree(&[
        (2, "<< /Type /Pages /Kids [3 0 R 4 0 R] /Count 1 >>"),
        (3, "<< /Type /Pages /Kids [2 0 R] /Count 0 >>"),
        (4, "<< /Type /Page /MediaBox [0 0 612 792] >>"),
    ]);

    let doc = parse(data);

    assert!(has_issue(&doc, Severity::Error, "page tree cycle"));
    assert_eq!(doc.pages().len(), 1);
    assert!(!doc.validate("PDF-1.7").unwrap().is_valid());
}

#[test]
fn shared_page_node() {
    let data = tree(&[
        (2, "<< /Type /Pages /Kids [3 0 R 3 0 R] /Count 2 >>"),
        (3, "<< /Type /Page /MediaBox [0 0 612 792] >>"),
    ]);

    let doc = parse(data);

    assert!(has_issue(&doc, Severity::Warning, "appears more than once"));
    assert_eq!(doc.pages().len(), 1);

    let report = doc.validate("PDF-1.7").unwrap();
    assert!(
        report
            .get_issues()
            .iter()
            .any(|i| i.rule_id == "pages.count" && i.object_number == Some(2))
    );
}

#[test]
fn deep_page_tree() {
    let mut nodes = vec![];

    for num in 2..12 {
        nodes.push(format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", num + 1));
    }
    nodes.push("<< /Type /Page /MediaBox [0 0 1 1] >>".to_string());

    let nodes: Vec<(u32, &str)> = nodes
        .iter()
        .enumerate()
        .map(|(i, body)| (i as u32 + 2, body.as_str()))
        .collect();
    let data = tree(&nodes);

    let doc = parse(data.clone());
    assert_eq!(doc.pages().len(), 1);

    let settings = ParseSettings {
        max_page_tree_depth: 4,
        ..ParseSettings::default()
    };
    let doc = parse_pdf_with(data, settings).unwrap();

    assert!(doc.pages().is_empty());
    assert!(has_issue(&doc, Severity::Error, "depth limit of 4"));
}

#[test]
fn missing_media_box() {
    let data = tree(&[
        (2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>"),
        (3, "<< /Type /Page /MediaBox [0 0 0 0] >>"),
    ]);

    let doc = parse(data);
    let report = doc.validate("PDF-1.7").unwrap();

    assert!(!report.is_valid());
    assert!(
        report
            .get_issues()
            .iter()
            .any(|i| i.message == "page 1 has an empty /MediaBox" && i.object_number == Some(3))
    );
}
