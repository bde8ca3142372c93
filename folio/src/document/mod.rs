//! The logical document model.

pub mod metadata;
pub mod page;

use crate::error::{Error, Result};
use crate::issue::{Issue, Severity};
use crate::settings::{ParseSettings, ValidationSettings, VersionPolicy};
use crate::stats::{self, Statistics};
use crate::util::OptionLog;
use crate::validate::{self, ValidationReport, registry::SchemaRegistry};
use folio_syntax::load::LoadNote;
use folio_syntax::object::LengthStatus;
use folio_syntax::object::dict::keys::{INFO, METADATA, ROOT, VERSION};
use folio_syntax::xref::{XRef, XRefNote, find_header};
use folio_syntax::{
    Dict, IndirectObject, Location, Object, ObjectId, PdfData, Resolve, Stream, SyntaxFile,
};
use metadata::Metadata;
use page::Page;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// A parsed PDF document.
///
/// The document owns the input bytes for its whole lifetime, together with every object
/// that could be recovered from them. Pages, the catalog and the info dictionary are
/// views computed from those objects.
#[derive(Debug, Clone)]
pub struct Document {
    file: SyntaxFile,
    header_version: Option<String>,
    settings: ParseSettings,
    issues: Vec<Issue>,
    linearized: bool,
}

impl Document {
    pub(crate) fn build(data: PdfData, settings: ParseSettings) -> Result<Self> {
        let header_version = parse_header_version(data.as_ref());

        let file = folio_syntax::read(data, &settings.read_settings())
            .map_err(|e| Error::MalformedDocument(e.to_string()))?;

        if file.objects().is_empty() {
            return Err(Error::MalformedDocument(
                "no object could be recovered".to_string(),
            ));
        }

        let mut doc = Self {
            linearized: is_linearized(&file),
            file,
            header_version,
            settings,
            issues: vec![],
        };

        doc.issues = doc.collect_structure_issues();
        ldebug!(
            "built document with {} objects and {} structural issues",
            doc.file.objects().len(),
            doc.issues.len()
        );

        Ok(doc)
    }

    fn collect_structure_issues(&self) -> Vec<Issue> {
        let mut issues = vec![];

        match find_header(self.file.data().as_ref()) {
            None => issues.push(Issue::structure(
                Severity::Error,
                "no %PDF- header found in the first 1024 bytes",
                None,
            )),
            Some(0) => {}
            Some(offset) => issues.push(Issue::structure(
                Severity::Info,
                format!("%PDF- header is preceded by {offset} bytes of garbage"),
                None,
            )),
        }

        for note in &self.xref().notes {
            let severity = match note {
                XRefNote::CyclicPrev { .. } => Severity::Error,
                _ => Severity::Warning,
            };
            issues.push(Issue::structure(severity, note.to_string(), None));
        }

        for note in self.file.load_notes() {
            let severity = match note {
                LoadNote::GenerationMismatch { .. } => Severity::Info,
                LoadNote::Relocated { .. } => Severity::Warning,
                LoadNote::Unreadable { .. } | LoadNote::BrokenObjectStream { .. } => {
                    Severity::Error
                }
            };
            issues.push(Issue::structure(
                severity,
                note.to_string(),
                Some(note.object_number()),
            ));
        }

        for object in self.file.objects().values() {
            if let Some(LengthStatus::Recovered { declared }) =
                object.object.as_stream().map(Stream::length_status)
            {
                let message = match declared {
                    Some(len) => format!(
                        "stream /Length {len} is wrong, data was delimited by endstream"
                    ),
                    None => "stream /Length is missing, data was delimited by endstream"
                        .to_string(),
                };
                issues.push(Issue::structure(Severity::Warning, message, Some(object.id.num)));
            }
        }

        issues.extend(self.dangling_references());
        issues.extend(page::flatten(self).issues);

        issues
    }

    fn dangling_references(&self) -> Vec<Issue> {
        let mut dangling = BTreeSet::new();

        for object in self.file.objects().values() {
            object.object.visit_references(&mut |id| {
                if self.file.get(id.num).is_none() {
                    dangling.insert((Some(object.id.num), id));
                }
            });
        }

        Object::Dict(self.trailer().clone()).visit_references(&mut |id| {
            if self.file.get(id.num).is_none() {
                dangling.insert((None, id));
            }
        });

        dangling
            .into_iter()
            .map(|(from, to)| {
                Issue::structure(
                    Severity::Warning,
                    format!("reference to missing object {to}"),
                    from,
                )
            })
            .collect()
    }

    /// The raw bytes of the document.
    pub fn data(&self) -> &PdfData {
        self.file.data()
    }

    /// The settings the document was parsed with.
    pub fn settings(&self) -> &ParseSettings {
        &self.settings
    }

    /// The resolved cross-reference data.
    pub fn xref(&self) -> &XRef {
        self.file.xref()
    }

    /// The effective trailer dictionary.
    pub fn trailer(&self) -> &Dict {
        self.file.trailer()
    }

    /// All recovered objects, in ascending object number order.
    pub fn objects(&self) -> impl Iterator<Item = &IndirectObject> {
        self.file.objects().values()
    }

    /// The number of recovered objects.
    pub fn object_count(&self) -> usize {
        self.file.objects().len()
    }

    /// Look up an object by number.
    pub fn get(&self, num: u32) -> Option<&Object> {
        self.file.get(num).map(|o| &o.object)
    }

    /// Where an object was found.
    pub fn location(&self, num: u32) -> Option<Location> {
        self.file.get(num).map(|o| o.location)
    }

    /// Follow `object` if it is a reference. Dangling references give `null`.
    pub fn deref<'a>(&'a self, object: &'a Object) -> &'a Object {
        match self.resolve(object) {
            Cow::Borrowed(object) => object,
            // Resolution never produces owned objects.
            Cow::Owned(_) => Object::NULL,
        }
    }

    pub(crate) fn load_notes(&self) -> &[LoadNote] {
        self.file.load_notes()
    }

    /// Problems that were found and worked around while parsing.
    pub fn structure_issues(&self) -> &[Issue] {
        &self.issues
    }

    /// The object number of the catalog.
    pub fn catalog_id(&self) -> Option<ObjectId> {
        self.trailer().get_ref(ROOT)
    }

    /// The document catalog.
    pub fn catalog(&self) -> Option<&Dict> {
        self.trailer()
            .get(ROOT)
            .map(|root| self.deref(root))
            .and_then(Object::as_dict)
            .warn_none("catalog could not be resolved")
    }

    /// The flattened pages, in document order.
    pub fn pages(&self) -> Vec<Page> {
        page::flatten(self).pages
    }

    /// The version of the document, for example `"1.7"`. Which of the header version and
    /// the catalog's `/Version` is used depends on [`ParseSettings::version_policy`].
    /// Returns `"unknown"` if neither is present.
    pub fn get_version(&self) -> String {
        let header = self.header_version.clone();
        let catalog = self.catalog_version();

        let version = match self.settings.version_policy {
            VersionPolicy::HeaderWins => header.or(catalog),
            VersionPolicy::CatalogWins => catalog.or(header),
        };

        version.unwrap_or_else(|| "unknown".to_string())
    }

    /// The version declared in the `%PDF-` header.
    pub fn header_version(&self) -> Option<&str> {
        self.header_version.as_deref()
    }

    /// The version declared by the catalog's `/Version` entry.
    pub fn catalog_version(&self) -> Option<String> {
        self.catalog()
            .and_then(|c| c.get(VERSION))
            .and_then(|v| self.deref(v).as_name())
            .map(|n| n.as_str().into_owned())
    }

    /// Whether the trailer has an `/Encrypt` entry. Encrypted documents are not decrypted.
    pub fn is_encrypted(&self) -> bool {
        self.trailer()
            .contains_key(folio_syntax::object::dict::keys::ENCRYPT)
    }

    /// Whether the first object of the file is a linearization parameter dictionary.
    pub fn is_linearized(&self) -> bool {
        self.linearized
    }

    /// The document information dictionary.
    pub fn info(&self) -> Option<Metadata> {
        let info = self.trailer().get(INFO)?;

        self.deref(info)
            .as_dict()
            .map(|dict| Metadata::from_dict(dict, self))
    }

    /// Decode the XMP metadata stream referenced by the catalog.
    ///
    /// Returns `Ok(None)` if the catalog has no `/Metadata` stream.
    pub fn metadata_stream(&self) -> Result<Option<Vec<u8>>> {
        let Some(stream) = self
            .catalog()
            .and_then(|c| c.get(METADATA))
            .and_then(|m| self.deref(m).as_stream())
        else {
            return Ok(None);
        };

        self.decode_stream(stream).map(Some)
    }

    /// Decode the data of a stream of this document.
    pub fn decode_stream(&self, stream: &Stream) -> Result<Vec<u8>> {
        Ok(stream.decoded(self, &self.settings.decode_limits)?)
    }

    /// Collect statistics about the document.
    pub fn get_statistics(&self) -> Statistics {
        stats::collect(self)
    }

    /// Validate the document against a schema of the global registry.
    pub fn validate(&self, schema_name: &str) -> Result<ValidationReport> {
        validate::validate(self, schema_name, &ValidationSettings::default())
    }

    /// Validate the document against a schema of the given registry.
    pub fn validate_with(
        &self,
        registry: &SchemaRegistry,
        schema_name: &str,
    ) -> Result<ValidationReport> {
        let schema = registry
            .get(schema_name)
            .ok_or_else(|| Error::UnknownSchema(schema_name.to_string()))?;

        Ok(validate::Validator::new(self, schema).run())
    }
}

impl Resolve for Document {
    fn resolve_ref(&self, id: ObjectId) -> Option<Cow<'_, Object>> {
        let mut current = id;

        for _ in 0..self.settings.max_reference_chain {
            match &self.file.get(current.num)?.object {
                Object::Reference(next) => current = *next,
                other => return Some(Cow::Borrowed(other)),
            }
        }

        lwarn!("reference chain starting at {} is too long", id);

        None
    }
}

/// Read the version of the `%PDF-x.y` header.
pub(crate) fn parse_header_version(data: &[u8]) -> Option<String> {
    let start = find_header(data)? + b"%PDF-".len();
    let version: String = data[start..]
        .iter()
        .take(8)
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|b| *b as char)
        .collect();

    (!version.is_empty()).then_some(version)
}

fn is_linearized(file: &SyntaxFile) -> bool {
    file.objects()
        .values()
        .filter_map(|o| match o.location {
            Location::Offset(offset) => Some((offset, o)),
            Location::ObjectStream { .. } => None,
        })
        .min_by_key(|(offset, _)| *offset)
        .and_then(|(_, o)| o.object.as_dict())
        .is_some_and(|d| d.contains_key(folio_syntax::object::dict::keys::LINEARIZED))
}

#[cfg(test)]
mod tests {
    use super::parse_header_version;
    use crate::settings::{ParseSettings, VersionPolicy};
    use crate::{Error, parse_pdf, parse_pdf_with};

    const CATALOG_VERSION: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Version /1.7 /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF";

    #[test]
    fn header_versions() {
        assert_eq!(parse_header_version(b"%PDF-1.7\n").as_deref(), Some("1.7"));
        assert_eq!(parse_header_version(b"junk%PDF-2.0\r").as_deref(), Some("2.0"));
        assert_eq!(parse_header_version(b"%PDF-\n"), None);
        assert_eq!(parse_header_version(b"hello"), None);
    }

    #[test]
    fn version_policy() {
        assert_eq!(VersionPolicy::default(), VersionPolicy::HeaderWins);

        let doc = parse_pdf(CATALOG_VERSION).unwrap();
        assert_eq!(doc.get_version(), "1.4");
        assert_eq!(doc.catalog_version().as_deref(), Some("1.7"));
        assert_eq!(doc.get_statistics()["version"].as_str(), Some("1.4"));

        let settings = ParseSettings {
            version_policy: VersionPolicy::CatalogWins,
            ..ParseSettings::default()
        };
        let doc = parse_pdf_with(CATALOG_VERSION, settings).unwrap();
        assert_eq!(doc.get_version(), "1.7");
    }

    #[test]
    fn reference_chains() {
        let data = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n2 0 obj\n3 0 R\nendobj\n3 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n4 0 obj\n5 0 R\nendobj\n5 0 obj\n4 0 R\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF";
        let doc = parse_pdf(data).unwrap();

        let pages = doc.catalog().unwrap().get(b"Pages").unwrap();
        assert!(doc.deref(pages).as_dict().unwrap().is_type(b"Pages"));
        assert!(doc.deref(&folio_syntax::ObjectId::new(4, 0).into()).is_null());
    }

    #[test]
    fn dangling_references() {
        let data = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 9 0 R >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF";
        let doc = parse_pdf(data).unwrap();

        assert!(doc.structure_issues().iter().any(|i| {
            i.object_number == Some(1) && i.message == "reference to missing object 9 0"
        }));
    }

    #[test]
    fn not_a_pdf() {
        assert!(matches!(
            parse_pdf(b"This is not a PDF file"),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn linearized() {
        let data = b"%PDF-1.4\n1 0 obj\n<< /Linearized 1 /L 200 >>\nendobj\n2 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 2 0 R >>\n%%EOF";
        let doc = parse_pdf(data).unwrap();
        assert!(doc.is_linearized());
    }
}
