//! Statistics about a document.

use crate::document::Document;
use folio_syntax::filter::Filter;
use folio_syntax::load::LoadNote;
use folio_syntax::xref::SectionKind;
use folio_syntax::{Location, XRefEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// A single statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    /// A count.
    Integer(i64),
    /// A textual value, such as a version.
    Text(String),
    /// Whether something is present.
    Flag(bool),
}

impl StatValue {
    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a flag, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl Display for StatValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<usize> for StatValue {
    fn from(value: usize) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for StatValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Statistics keyed by name, in alphabetical order.
pub type Statistics = BTreeMap<String, StatValue>;

pub(crate) fn collect(doc: &Document) -> Statistics {
    let mut stats = Statistics::new();
    let mut put = |key: &str, value: StatValue| {
        stats.insert(key.to_string(), value);
    };

    let mut kinds = BTreeMap::<&str, usize>::new();
    let mut filters = BTreeMap::<String, usize>::new();
    let mut streams = 0;
    let mut compressed = 0;

    for object in doc.objects() {
        *kinds.entry(object.object.kind().as_str()).or_default() += 1;

        if matches!(object.location, Location::ObjectStream { .. }) {
            compressed += 1;
        }

        if let Some(stream) = object.object.as_stream() {
            streams += 1;

            for name in stream.filter_names(doc) {
                let name = Filter::from_name(&name)
                    .map(|f| f.name().to_string())
                    .unwrap_or_else(|_| name.as_str().into_owned());
                *filters.entry(name).or_default() += 1;
            }
        }
    }

    let xref = doc.xref();
    let free = xref
        .table
        .iter()
        .filter(|(_, e)| matches!(e, XRefEntry::Free { .. }))
        .count();
    let repaired = xref.reconstructed
        || doc
            .load_notes()
            .iter()
            .any(|n| matches!(n, LoadNote::Relocated { .. }));

    put("object_count", doc.object_count().into());
    for (kind, count) in kinds {
        put(&format!("objects.{kind}"), count.into());
    }
    put("stream_count", streams.into());
    for (name, count) in filters {
        put(&format!("filters.{name}"), count.into());
    }
    put("compressed_object_count", compressed.into());
    put("free_object_count", free.into());

    put("page_count", doc.pages().len().into());
    put("version", doc.get_version().into());
    if let Some(header) = doc.header_version() {
        put("header_version", header.to_string().into());
    }
    if let Some(catalog) = doc.catalog_version() {
        put("catalog_version", catalog.into());
    }

    put("encrypted", doc.is_encrypted().into());
    put("linearized", doc.is_linearized().into());
    put("revision_count", xref.revisions.len().into());
    put(
        "xref_streams",
        xref.revisions
            .iter()
            .filter(|r| r.kind != SectionKind::Table)
            .count()
            .into(),
    );
    // Numbered like `XRef::revisions`, with 0 being the newest.
    for (i, revision) in xref.revisions.iter().enumerate() {
        put(&format!("revisions.{i}.added"), revision.added.len().into());
        put(&format!("revisions.{i}.modified"), revision.modified.len().into());
        put(&format!("revisions.{i}.freed"), revision.freed.len().into());
    }
    put("xref_repaired", repaired.into());
    put("issue_count", doc.structure_issues().len().into());

    stats
}

#[cfg(test)]
mod tests {
    use super::StatValue;
    use crate::parse_pdf;

    #[test]
    fn counts() {
        let data = b"%PDF-1.5\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n3 0 obj\n<< /Length 2 /Filter [/AHx /ASCIIHexDecode] >>\nstream\nab\nendstream\nendobj\n4 0 obj\n[1 2]\nendobj\ntrailer\n<< /Root 1 0 R /Encrypt 5 0 R >>\n%%EOF";
        let stats = parse_pdf(data).unwrap().get_statistics();

        assert_eq!(stats["object_count"], StatValue::Integer(4));
        assert_eq!(stats["objects.dictionary"], StatValue::Integer(2));
        assert_eq!(stats["objects.stream"], StatValue::Integer(1));
        assert_eq!(stats["objects.array"], StatValue::Integer(1));
        assert_eq!(stats["stream_count"], StatValue::Integer(1));
        assert_eq!(stats["filters.ASCIIHexDecode"], StatValue::Integer(2));
        assert_eq!(stats["page_count"], StatValue::Integer(0));
        assert_eq!(stats["version"].as_str(), Some("1.5"));
        assert_eq!(stats["encrypted"], StatValue::Flag(true));
        assert_eq!(stats["xref_repaired"], StatValue::Flag(true));
        assert!(!stats.contains_key("catalog_version"));
    }

    #[test]
    fn serialize_untagged() {
        assert_eq!(serde_json::to_string(&StatValue::Integer(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&StatValue::Flag(false)).unwrap(), "false");
        assert_eq!(serde_json::to_string(&StatValue::Text("1.7".into())).unwrap(), "\"1.7\"");
    }
}
