use crate::{CATALOG, ONE_PAGE, PAGE, has_issue, issues, parse};
use folio::folio_syntax::XRefEntry;
use folio::{Metadata, Severity, StatValue};
use folio_tests::PdfBuilder;
use std::collections::BTreeSet;

fn base() -> PdfBuilder {
    PdfBuilder::new("1.4")
        .object(1, CATALOG)
        .object(2, ONE_PAGE)
        .object(3, PAGE)
}

const TRAILER: &str = "/Root 1 0 R /Info 4 0 R /ID [<ab> <ab>]";

#[test]
fn newest_revision_wins() {
    let data = base()
        .object(4, "<< /Title (first) >>")
        .object(5, "(kept)")
        .xref_table(TRAILER)
        .object(4, "<< /Title (second) >>")
        .xref_table(TRAILER)
        .object(4, "<< /Title (third) /Author (someone) >>")
        .xref_table(TRAILER)
        .finish();

    let doc = parse(data);

    assert_eq!(doc.xref().revisions.len(), 3);
    assert!(!doc.xref().reconstructed);
    assert!(doc.structure_issues().is_empty());

    let info = doc.info().unwrap();
    assert_eq!(Metadata::text(&info.title).as_deref(), Some("third"));
    assert_eq!(Metadata::text(&info.author).as_deref(), Some("someone"));

    // Objects only defined in older revisions are still there.
    assert_eq!(doc.get(5).and_then(|o| o.as_string()).map(|s| s.as_bytes()), Some(&b"kept"[..]));
    assert_eq!(doc.get_statistics()["revision_count"], StatValue::Integer(3));
}

#[test]
fn freed_in_update() {
    let data = base()
        .object(4, "(to be deleted)")
        .xref_table("/Root 1 0 R")
        .free(4)
        .xref_table("/Root 1 0 R")
        .finish();

    let doc = parse(data);

    assert!(matches!(doc.xref().table.get(4), Some(XRefEntry::Free { .. })));
    assert!(doc.get(4).is_none());
    assert_eq!(doc.object_count(), 3);
}

#[test]
fn cyclic_prev() {
    let builder = base();
    let at = builder.len();
    let data = builder
        .xref_table(&format!("/Root 1 0 R /Prev {at}"))
        .finish();

    let doc = parse(data);

    assert!(has_issue(&doc, Severity::Error, "cyclic /Prev"));
    assert_eq!(doc.xref().revisions.len(), 1);
    assert_eq!(doc.pages().len(), 1);
}

#[test]
fn broken_prev() {
    let data = base()
        .xref_table("/Root 1 0 R /Prev 3")
        .finish();

    let doc = parse(data);

    assert!(!doc.xref().reconstructed);
    assert!(has_issue(&doc, Severity::Warning, "offset 3 is unreadable"));
    assert!(issues(&doc, Severity::Error).is_empty());
    assert_eq!(doc.pages().len(), 1);
}

#[test]
fn update_with_xref_stream() {
    let data = base()
        .object(4, "<< /Title (old) >>")
        .xref_table(TRAILER)
        .object(4, "<< /Title (new) >>")
        .xref_stream(6, TRAILER)
        .finish();

    let doc = parse(data);
    let info = doc.info().unwrap();

    assert_eq!(Metadata::text(&info.title).as_deref(), Some("new"));
    assert_eq!(doc.get_statistics()["xref_streams"], StatValue::Integer(1));
}

fn nums(nums: &[u32]) -> BTreeSet<u32> {
    nums.iter().copied().collect()
}

#[test]
fn changes_per_revision() {
    let data = base()
        .object(4, "<< /Title (first) >>")
        .object(5, "(doomed)")
        .xref_table(TRAILER)
        .object(4, "<< /Title (second) >>")
        .free(5)
        .object(6, "(new)")
        .xref_table(TRAILER)
        .finish();

    let doc = parse(data);
    let revisions = &doc.xref().revisions;
    assert_eq!(revisions.len(), 2);

    let newest = &revisions[0];
    assert_eq!(newest.added, nums(&[6]));
    assert_eq!(newest.modified, nums(&[4]));
    assert_eq!(newest.freed, nums(&[5]));

    let oldest = &revisions[1];
    assert_eq!(oldest.added, nums(&[1, 2, 3, 4, 5]));
    assert!(oldest.modified.is_empty());
    assert!(oldest.freed.is_empty());

    let stats = doc.get_statistics();
    assert_eq!(stats["revisions.0.added"], StatValue::Integer(1));
    assert_eq!(stats["revisions.0.modified"], StatValue::Integer(1));
    assert_eq!(stats["revisions.0.freed"], StatValue::Integer(1));
    assert_eq!(stats["revisions.1.added"], StatValue::Integer(5));
    assert_eq!(stats["revisions.1.freed"], StatValue::Integer(0));
}

#[test]
fn objects_of_broken_older_revision() {
    let mut data = base()
        .object(5, "(only in the first revision)")
        .xref_table("/Root 1 0 R")
        .object(4, "<< /Title (update) >>")
        .xref_table("/Root 1 0 R /Info 4 0 R")
        .finish();

    let first_table = data.windows(7).position(|w| w == b"xref\n0 ").unwrap();
    data[first_table + 3] = b'X';

    let doc = parse(data);

    assert!(!doc.xref().reconstructed);
    assert_eq!(doc.xref().revisions.len(), 1);
    assert!(has_issue(&doc, Severity::Warning, "is unreadable"));

    assert_eq!(
        doc.get(5).and_then(|o| o.as_string()).map(|s| s.as_bytes()),
        Some(&b"only in the first revision"[..])
    );
    assert_eq!(doc.pages().len(), 1);
    assert_eq!(Metadata::text(&doc.info().unwrap().title).as_deref(), Some("update"));
}
