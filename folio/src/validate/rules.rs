//! The rules the built-in schemas are made of.

use crate::document::Document;
use crate::document::page::Rect;
use crate::issue::Severity;
use crate::validate::schema::{IssueSink, Rule};
use folio_syntax::filter::Filter;
use folio_syntax::object::dict::keys::{
    ACRO_FORM, CATALOG, COUNT, CREATION_DATE, DESCENDANT_FONTS, EF, EMBEDDED_FILES, ENCRYPT,
    FONT, FONT_DESCRIPTOR, FONT_FILE, FONT_FILE2, FONT_FILE3, ID, INFO, JAVA_SCRIPT, JS,
    METADATA, MOD_DATE, NAMES, OUTPUT_INTENTS, PAGES, ROOT, S, SIZE, SUBTYPE, XFA, XML,
};
use folio_syntax::{Dict, Object};
use rustc_hash::FxHashSet;

const TYPE0: &[u8] = b"Type0";
const TYPE3: &[u8] = b"Type3";
const EXTERNAL_ACTIONS: &[&[u8]] = &[b"Launch", b"GoToR", b"ImportData"];
const LZW_NAMES: &[&[u8]] = &[b"LZWDecode", b"LZW"];

/// Replays the issues recorded while parsing the document.
#[derive(Debug, Default)]
pub struct StructureRecovery;

impl Rule for StructureRecovery {
    fn id(&self) -> &'static str {
        crate::issue::STRUCTURE_RECOVERY
    }

    fn description(&self) -> &'static str {
        "the file can be read without repairs"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        for issue in doc.structure_issues() {
            sink.push(issue.clone());
        }
    }
}

/// The cross-reference table has at least one object in use.
#[derive(Debug, Default)]
pub struct XRefEntries;

impl Rule for XRefEntries {
    fn id(&self) -> &'static str {
        "xref.entries"
    }

    fn description(&self) -> &'static str {
        "the cross-reference table lists objects"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        if doc.xref().table.in_use_count() == 0 {
            sink.error("cross-reference table has no entries in use", None);
        }
    }
}

/// The trailer names the catalog with an indirect reference.
#[derive(Debug, Default)]
pub struct TrailerRoot;

impl Rule for TrailerRoot {
    fn id(&self) -> &'static str {
        "trailer.root"
    }

    fn description(&self) -> &'static str {
        "the trailer has a /Root reference"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        match doc.trailer().get(ROOT) {
            None => sink.error("trailer has no /Root entry", None),
            Some(Object::Reference(_)) => {}
            Some(_) => sink.error("trailer /Root is not an indirect reference", None),
        }
    }
}

/// The trailer has a `/Size` larger than every object number.
#[derive(Debug, Default)]
pub struct TrailerSize;

impl Rule for TrailerSize {
    fn id(&self) -> &'static str {
        "trailer.size"
    }

    fn description(&self) -> &'static str {
        "the trailer /Size covers all objects"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(size) = doc.trailer().get(SIZE).and_then(|s| doc.deref(s).as_i64()) else {
            sink.error("trailer has no /Size entry", None);
            return;
        };

        if let Some(max) = doc.xref().table.max_object_number()
            && size <= i64::from(max)
        {
            sink.warning(
                format!("trailer /Size {size} does not exceed the highest object number {max}"),
                None,
            );
        }
    }
}

/// The trailer has an `/ID` of two strings.
#[derive(Debug)]
pub struct TrailerId {
    /// The severity of a missing or malformed `/ID`.
    pub severity: Severity,
}

impl Rule for TrailerId {
    fn id(&self) -> &'static str {
        "trailer.id"
    }

    fn description(&self) -> &'static str {
        "the trailer has a file identifier"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(id) = doc.trailer().get(ID).map(|id| doc.deref(id)) else {
            sink.report(self.severity, "trailer has no /ID entry", None);
            return;
        };

        let well_formed = matches!(
            id.as_array(),
            Some([a, b]) if a.as_string().is_some() && b.as_string().is_some()
        );

        if !well_formed {
            sink.report(self.severity, "trailer /ID is not an array of two strings", None);
        }
    }
}

/// The root object is a catalog dictionary.
#[derive(Debug, Default)]
pub struct CatalogType;

impl Rule for CatalogType {
    fn id(&self) -> &'static str {
        "catalog.type"
    }

    fn description(&self) -> &'static str {
        "/Root is a /Catalog dictionary"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(root) = doc.trailer().get(ROOT) else {
            return;
        };
        let num = root.as_reference().map(|r| r.num);

        match doc.deref(root).as_dict() {
            None => sink.error("/Root does not resolve to a dictionary", num),
            Some(dict) if !dict.is_type(CATALOG) => {
                sink.error("catalog does not have /Type /Catalog", num);
            }
            Some(_) => {}
        }
    }
}

/// The catalog has a page tree.
#[derive(Debug, Default)]
pub struct CatalogPages;

impl Rule for CatalogPages {
    fn id(&self) -> &'static str {
        "catalog.pages"
    }

    fn description(&self) -> &'static str {
        "the catalog has a /Pages tree"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(catalog) = doc.catalog() else {
            return;
        };

        let Some(pages) = catalog.get(PAGES) else {
            sink.error("catalog has no /Pages entry", doc.catalog_id().map(|id| id.num));
            return;
        };
        let num = pages.as_reference().map(|r| r.num);

        match doc.deref(pages).as_dict() {
            None => sink.error("/Pages does not resolve to a dictionary", num),
            Some(dict) if !dict.is_type(PAGES) => {
                sink.error("page tree root does not have /Type /Pages", num);
            }
            Some(_) => {}
        }
    }
}

/// The `/Count` of the page tree root matches the number of pages.
#[derive(Debug, Default)]
pub struct PagesCount;

impl Rule for PagesCount {
    fn id(&self) -> &'static str {
        "pages.count"
    }

    fn description(&self) -> &'static str {
        "the page tree /Count matches its pages"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(pages) = doc.catalog().and_then(|c| c.get(PAGES)) else {
            return;
        };
        let num = pages.as_reference().map(|r| r.num);
        let Some(root) = doc.deref(pages).as_dict() else {
            return;
        };

        let actual = doc.pages().len();

        match root.get(COUNT).and_then(|c| doc.deref(c).as_i64()) {
            None => sink.warning("page tree root has no /Count", num),
            Some(count) if usize::try_from(count).ok() != Some(actual) => sink.warning(
                format!("page tree /Count is {count}, but the tree has {actual} pages"),
                num,
            ),
            Some(_) => {}
        }
    }
}

/// Every page has a usable media box.
#[derive(Debug, Default)]
pub struct PageMediaBox;

impl Rule for PageMediaBox {
    fn id(&self) -> &'static str {
        "page.media-box"
    }

    fn description(&self) -> &'static str {
        "every page has a non-empty /MediaBox"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        for (index, page) in doc.pages().iter().enumerate() {
            let n = index + 1;
            let num = page.object_number();

            let Some(media_box) = &page.media_box else {
                sink.error(format!("page {n} has no /MediaBox"), num);
                continue;
            };

            match Rect::from_object(media_box) {
                None => sink.error(format!("page {n} has a malformed /MediaBox"), num),
                Some(rect) if rect.area() == 0.0 => {
                    sink.error(format!("page {n} has an empty /MediaBox"), num);
                }
                Some(_) => {}
            }
        }
    }
}

/// Every stream can be decoded.
#[derive(Debug, Default)]
pub struct StreamFilters;

impl Rule for StreamFilters {
    fn id(&self) -> &'static str {
        "streams.filters"
    }

    fn description(&self) -> &'static str {
        "all stream filters are supported and decode"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        // The data of encrypted documents cannot be decoded without decrypting it first.
        let encrypted = doc.is_encrypted();

        for object in doc.objects() {
            let Some(stream) = object.object.as_stream() else {
                continue;
            };
            let num = Some(object.id.num);

            let unsupported: Vec<_> = stream
                .filter_names(doc)
                .into_iter()
                .filter(|name| Filter::from_name(name).is_err())
                .collect();

            if !unsupported.is_empty() {
                for name in unsupported {
                    sink.warning(format!("stream uses unsupported filter /{name}"), num);
                }
                continue;
            }

            if !encrypted && let Err(e) = doc.decode_stream(stream) {
                sink.warning(format!("stream cannot be decoded: {e}"), num);
            }
        }
    }
}

/// The catalog's `/Metadata`, if present, is an XML stream.
#[derive(Debug, Default)]
pub struct MetadataStream {
    /// Whether a metadata stream is mandatory. Problems are errors if it is.
    pub required: bool,
}

impl Rule for MetadataStream {
    fn id(&self) -> &'static str {
        "metadata.stream"
    }

    fn description(&self) -> &'static str {
        "the catalog /Metadata is an XML stream"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(catalog) = doc.catalog() else {
            return;
        };
        let severity = if self.required {
            Severity::Error
        } else {
            Severity::Warning
        };

        let Some(metadata) = catalog.get(METADATA) else {
            if self.required {
                sink.error("catalog has no /Metadata stream", doc.catalog_id().map(|id| id.num));
            }
            return;
        };
        let num = metadata.as_reference().map(|r| r.num);

        match doc.deref(metadata).as_stream() {
            None => sink.report(severity, "/Metadata is not a stream", num),
            Some(stream) if !is_xml(stream.dict()) => {
                sink.report(severity, "/Metadata stream does not have /Subtype /XML", num);
            }
            Some(_) => {}
        }
    }
}

fn is_xml(dict: &Dict) -> bool {
    dict.get_name(SUBTYPE).is_some_and(|s| s.as_bytes() == XML)
}

/// The header and catalog versions agree and reach a minimum.
#[derive(Debug)]
pub struct CatalogVersion {
    /// The lowest acceptable version, such as `"2.0"`.
    pub minimum: &'static str,
}

impl Rule for CatalogVersion {
    fn id(&self) -> &'static str {
        "catalog.version"
    }

    fn description(&self) -> &'static str {
        "the document version is consistent and recent enough"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let catalog_num = doc.catalog_id().map(|id| id.num);

        if let (Some(header), Some(catalog)) = (doc.header_version(), doc.catalog_version())
            && header != catalog
        {
            sink.warning(
                format!("header version {header} differs from catalog version {catalog}"),
                catalog_num,
            );
        }

        let version = doc.get_version();

        match (parse_version(&version), parse_version(self.minimum)) {
            (None, _) => sink.warning(format!("document version {version:?} is not valid"), None),
            (Some(actual), Some(minimum)) if actual < minimum => sink.warning(
                format!("document version {version} is below {}", self.minimum),
                None,
            ),
            _ => {}
        }
    }
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let (major, minor) = version.split_once('.')?;

    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Neither the header nor the catalog declares a version above a maximum.
#[derive(Debug)]
pub struct MaximumVersion {
    /// The highest acceptable version, such as `"1.4"`.
    pub maximum: &'static str,
}

impl Rule for MaximumVersion {
    fn id(&self) -> &'static str {
        "version.maximum"
    }

    fn description(&self) -> &'static str {
        "the document version does not exceed the version the schema is based on"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(maximum) = parse_version(self.maximum) else {
            return;
        };
        let above = |version: &str| parse_version(version).is_some_and(|v| v > maximum);

        if let Some(header) = doc.header_version()
            && above(header)
        {
            sink.error(format!("header version {header} is above {}", self.maximum), None);
        }

        if let Some(catalog) = doc.catalog_version()
            && above(&catalog)
        {
            sink.error(
                format!("catalog version {catalog} is above {}", self.maximum),
                doc.catalog_id().map(|id| id.num),
            );
        }
    }
}

/// The information dictionary only has the entries that are not deprecated.
#[derive(Debug, Default)]
pub struct InfoDeprecated;

impl Rule for InfoDeprecated {
    fn id(&self) -> &'static str {
        "info.deprecated"
    }

    fn description(&self) -> &'static str {
        "the information dictionary only has date entries"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(info) = doc.trailer().get(INFO) else {
            return;
        };
        let num = info.as_reference().map(|r| r.num);
        let Some(info) = doc.deref(info).as_dict() else {
            return;
        };

        for key in info.keys() {
            if key.as_bytes() != CREATION_DATE && key.as_bytes() != MOD_DATE {
                sink.warning(format!("information dictionary entry /{key} is deprecated"), num);
            }
        }
    }
}

/// The document is not encrypted.
#[derive(Debug, Default)]
pub struct NoEncryption;

impl Rule for NoEncryption {
    fn id(&self) -> &'static str {
        "security.encryption"
    }

    fn description(&self) -> &'static str {
        "the document is not encrypted"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        if doc.trailer().contains_key(ENCRYPT) {
            sink.error("document is encrypted", None);
        }
    }
}

/// The document contains no JavaScript.
#[derive(Debug, Default)]
pub struct NoJavaScript;

impl Rule for NoJavaScript {
    fn id(&self) -> &'static str {
        "actions.javascript"
    }

    fn description(&self) -> &'static str {
        "the document contains no JavaScript"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        if has_name_tree(doc, JAVA_SCRIPT) {
            sink.error("catalog has a /JavaScript name tree", doc.catalog_id().map(|id| id.num));
        }

        for object in doc.objects() {
            let mut found = false;
            visit_dicts(&object.object, &mut |dict| {
                found |= dict.contains_key(JS)
                    || dict.get_name(S).is_some_and(|s| s.as_bytes() == JAVA_SCRIPT);
            });

            if found {
                sink.error("object contains a JavaScript action", Some(object.id.num));
            }
        }
    }
}

/// The document contains no actions that reach outside of it.
#[derive(Debug, Default)]
pub struct NoExternalActions;

impl Rule for NoExternalActions {
    fn id(&self) -> &'static str {
        "actions.external"
    }

    fn description(&self) -> &'static str {
        "the document contains no launch, remote go-to or import actions"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        for object in doc.objects() {
            let mut kinds = vec![];
            visit_dicts(&object.object, &mut |dict| {
                if let Some(kind) = dict
                    .get_name(S)
                    .filter(|s| EXTERNAL_ACTIONS.contains(&s.as_bytes()))
                {
                    kinds.push(kind.clone());
                }
            });

            for kind in kinds {
                sink.error(format!("object contains a /{kind} action"), Some(object.id.num));
            }
        }
    }
}

/// The document has no embedded files.
#[derive(Debug, Default)]
pub struct NoEmbeddedFiles;

impl Rule for NoEmbeddedFiles {
    fn id(&self) -> &'static str {
        "files.embedded"
    }

    fn description(&self) -> &'static str {
        "the document has no embedded files"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        if has_name_tree(doc, EMBEDDED_FILES) {
            sink.error(
                "catalog has an /EmbeddedFiles name tree",
                doc.catalog_id().map(|id| id.num),
            );
        }

        for object in doc.objects() {
            let mut found = false;
            visit_dicts(&object.object, &mut |dict| found |= dict.contains_key(EF));

            if found {
                sink.error("file specification has an embedded file", Some(object.id.num));
            }
        }
    }
}

/// Every font used by a page is embedded.
#[derive(Debug, Default)]
pub struct FontsEmbedded;

impl Rule for FontsEmbedded {
    fn id(&self) -> &'static str {
        "fonts.embedded"
    }

    fn description(&self) -> &'static str {
        "all fonts used by pages are embedded"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let mut checked = FxHashSet::default();

        for page in doc.pages() {
            let Some(fonts) = page
                .resources
                .as_ref()
                .and_then(Object::as_dict)
                .and_then(|r| r.get(FONT))
                .and_then(|f| doc.deref(f).as_dict())
            else {
                continue;
            };

            for (name, font) in fonts {
                let id = font.as_reference();

                if let Some(id) = id
                    && !checked.insert(id)
                {
                    continue;
                }

                let Some(dict) = doc.deref(font).as_dict() else {
                    continue;
                };

                if !is_embedded(doc, dict) {
                    sink.error(
                        format!("font /{name} is not embedded"),
                        id.map(|id| id.num).or(page.object_number()),
                    );
                }
            }
        }
    }
}

fn is_embedded(doc: &Document, font: &Dict) -> bool {
    let font = match font.get_name(SUBTYPE).map(|s| s.as_bytes()) {
        // The glyphs of type 3 fonts are content streams of the document.
        Some(TYPE3) => return true,
        Some(TYPE0) => {
            let descendant = font
                .get(DESCENDANT_FONTS)
                .and_then(|d| doc.deref(d).as_array())
                .and_then(|d| d.first())
                .and_then(|d| doc.deref(d).as_dict());

            match descendant {
                Some(descendant) => descendant,
                None => return false,
            }
        }
        _ => font,
    };

    font.get(FONT_DESCRIPTOR)
        .and_then(|d| doc.deref(d).as_dict())
        .is_some_and(|d| {
            [FONT_FILE, FONT_FILE2, FONT_FILE3]
                .iter()
                .any(|key| d.contains_key(key))
        })
}

/// Interactive forms are not XFA forms.
#[derive(Debug, Default)]
pub struct NoXfa;

impl Rule for NoXfa {
    fn id(&self) -> &'static str {
        "forms.xfa"
    }

    fn description(&self) -> &'static str {
        "the interactive form has no XFA data"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(form) = doc.catalog().and_then(|c| c.get(ACRO_FORM)) else {
            return;
        };
        let num = form
            .as_reference()
            .or(doc.catalog_id())
            .map(|id| id.num);

        if doc.deref(form).as_dict().is_some_and(|f| f.contains_key(XFA)) {
            sink.error("interactive form has an /XFA entry", num);
        }
    }
}

/// The catalog declares at least one output intent.
#[derive(Debug, Default)]
pub struct OutputIntentPresent;

impl Rule for OutputIntentPresent {
    fn id(&self) -> &'static str {
        "color.output-intents"
    }

    fn description(&self) -> &'static str {
        "the catalog has /OutputIntents"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        let Some(catalog) = doc.catalog() else {
            return;
        };

        let present = catalog
            .get(OUTPUT_INTENTS)
            .and_then(|o| doc.deref(o).as_array())
            .is_some_and(|intents| !intents.is_empty());

        if !present {
            sink.warning("catalog has no /OutputIntents", doc.catalog_id().map(|id| id.num));
        }
    }
}

/// No stream is LZW-compressed.
#[derive(Debug, Default)]
pub struct NoLzw;

impl Rule for NoLzw {
    fn id(&self) -> &'static str {
        "streams.lzw"
    }

    fn description(&self) -> &'static str {
        "no stream uses the LZWDecode filter"
    }

    fn check(&self, doc: &Document, sink: &mut IssueSink) {
        for object in doc.objects() {
            let Some(stream) = object.object.as_stream() else {
                continue;
            };

            if stream
                .filter_names(doc)
                .iter()
                .any(|name| LZW_NAMES.contains(&name.as_bytes()))
            {
                sink.error("stream uses the LZWDecode filter", Some(object.id.num));
            }
        }
    }
}

fn has_name_tree(doc: &Document, key: &[u8]) -> bool {
    doc.catalog()
        .and_then(|c| c.get(NAMES))
        .and_then(|n| doc.deref(n).as_dict())
        .is_some_and(|names| names.contains_key(key))
}

/// Call `f` for every dictionary directly contained in `object`, without following
/// references.
fn visit_dicts(object: &Object, f: &mut impl FnMut(&Dict)) {
    match object {
        Object::Array(array) => array.iter().for_each(|o| visit_dicts(o, f)),
        Object::Dict(dict) => {
            f(dict);
            dict.iter().for_each(|(_, o)| visit_dicts(o, f));
        }
        Object::Stream(stream) => {
            f(stream.dict());
            stream.dict().iter().for_each(|(_, o)| visit_dicts(o, f));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Issue;
    use crate::parse_pdf;

    fn pdf(objects: &[&str], trailer: &str) -> Document {
        let mut out = b"%PDF-1.7\n".to_vec();
        for (i, body) in objects.iter().enumerate() {
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        out.extend_from_slice(format!("trailer\n{trailer}\n%%EOF").as_bytes());
        parse_pdf(out).unwrap()
    }

    fn check(rule: &dyn Rule, doc: &Document) -> Vec<Issue> {
        let mut sink = IssueSink::new(rule.id());
        rule.check(doc, &mut sink);
        sink.finish()
    }

    fn simple(catalog_extra: &str, page_extra: &str) -> Document {
        pdf(
            &[
                &format!("<< /Type /Catalog /Pages 2 0 R {catalog_extra} >>"),
                "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
                &format!("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] {page_extra} >>"),
            ],
            "<< /Root 1 0 R /Size 4 /ID [<01> <02>] >>",
        )
    }

    #[test]
    fn clean_document() {
        let doc = simple("", "");

        for rule in [
            &TrailerRoot as &dyn Rule,
            &TrailerSize,
            &TrailerId { severity: Severity::Error },
            &CatalogType,
            &CatalogPages,
            &PagesCount,
            &PageMediaBox,
            &XRefEntries,
            &StreamFilters,
            &MetadataStream { required: false },
            &CatalogVersion { minimum: "1.0" },
            &NoJavaScript,
            &NoExternalActions,
            &NoEmbeddedFiles,
            &FontsEmbedded,
            &MaximumVersion { maximum: "1.7" },
            &NoXfa,
            &NoLzw,
        ] {
            assert_eq!(check(rule, &doc), vec![], "{}", rule.id());
        }
    }

    #[test]
    fn trailer_problems() {
        let doc = pdf(&["<< /Type /Catalog >>"], "<< /Root 1 0 R /Size 1 /ID (x) >>");

        assert_eq!(check(&TrailerSize, &doc)[0].severity, Severity::Warning);
        assert_eq!(
            check(&TrailerId { severity: Severity::Warning }, &doc)[0].message,
            "trailer /ID is not an array of two strings"
        );
    }

    #[test]
    fn catalog_problems() {
        let doc = pdf(&["<< /Type /Pages >>"], "<< /Root 1 0 R >>");

        assert_eq!(check(&CatalogType, &doc)[0].object_number, Some(1));
        assert_eq!(check(&CatalogPages, &doc)[0].message, "catalog has no /Pages entry");
    }

    #[test]
    fn count_mismatch() {
        let doc = pdf(
            &[
                "<< /Type /Catalog /Pages 2 0 R >>",
                "<< /Type /Pages /Kids [3 0 R] /Count 5 >>",
                "<< /Type /Page /MediaBox [0 0 0 10] >>",
            ],
            "<< /Root 1 0 R >>",
        );

        assert_eq!(
            check(&PagesCount, &doc)[0].message,
            "page tree /Count is 5, but the tree has 1 pages"
        );
        assert_eq!(check(&PageMediaBox, &doc)[0].message, "page 1 has an empty /MediaBox");
    }

    #[test]
    fn versions() {
        let doc = simple("/Version /2.0", "");
        let issues = check(&CatalogVersion { minimum: "2.0" }, &doc);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].message, "document version 1.7 is below 2.0");
        assert_eq!(issues[1].message, "header version 1.7 differs from catalog version 2.0");
        assert_eq!(issues[1].object_number, Some(1));
        assert_eq!(parse_version("1.10"), Some((1, 10)));
        assert_eq!(parse_version("x"), None);
    }

    #[test]
    fn actions() {
        let doc = simple(
            "/OpenAction << /S /JavaScript /JS (app.alert(1)) >> /Names << /EmbeddedFiles 9 0 R >>",
            "/AA << /O << /S /Launch /F (calc.exe) >> >>",
        );

        assert_eq!(check(&NoJavaScript, &doc).len(), 1);
        assert_eq!(check(&NoExternalActions, &doc)[0].message, "object contains a /Launch action");
        assert_eq!(check(&NoEmbeddedFiles, &doc)[0].object_number, Some(1));
    }

    #[test]
    fn fonts() {
        let doc = pdf(
            &[
                "<< /Type /Catalog /Pages 2 0 R >>",
                "<< /Type /Pages /Kids [3 0 R] /Count 1 /Resources << /Font << /F1 4 0 R /F2 5 0 R /F3 6 0 R >> >> >>",
                "<< /Type /Page /MediaBox [0 0 1 1] >>",
                "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>",
                "<< /Type /Font /Subtype /TrueType /FontDescriptor 7 0 R >>",
                "<< /Type /Font /Subtype /Type3 >>",
                "<< /Type /FontDescriptor /FontFile2 8 0 R >>",
                "<< /Length 0 >>\nstream\n\nendstream",
            ],
            "<< /Root 1 0 R >>",
        );

        let issues = check(&FontsEmbedded, &doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "font /F1 is not embedded");
        assert_eq!(issues[0].object_number, Some(4));
    }

    #[test]
    fn metadata() {
        let doc = simple("", "");
        assert_eq!(check(&MetadataStream { required: true }, &doc)[0].severity, Severity::Error);

        let doc = simple("/Metadata 4 0 R", "");
        assert_eq!(
            check(&MetadataStream { required: false }, &doc)[0].message,
            "/Metadata is not a stream"
        );
    }

    #[test]
    fn unsupported_filter() {
        let doc = pdf(
            &["<< /Type /Catalog >>", "<< /Length 1 /Filter /JBIG2Decode >>\nstream\nx\nendstream"],
            "<< /Root 1 0 R >>",
        );

        let issues = check(&StreamFilters, &doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "stream uses unsupported filter /JBIG2Decode");
    }

    #[test]
    fn maximum_version() {
        let doc = simple("/Version /2.0", "");
        let issues = check(&MaximumVersion { maximum: "1.4" }, &doc);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].message, "header version 1.7 is above 1.4");
        assert_eq!(issues[0].object_number, None);
        assert_eq!(issues[1].message, "catalog version 2.0 is above 1.4");
        assert_eq!(issues[1].object_number, Some(1));

        assert!(check(&MaximumVersion { maximum: "2.0" }, &doc).is_empty());
    }

    #[test]
    fn forms_and_output_intents() {
        let doc = simple("/AcroForm << /Fields [] /XFA 4 0 R >>", "");
        let issues = check(&NoXfa, &doc);
        assert_eq!(issues[0].message, "interactive form has an /XFA entry");
        assert_eq!(issues[0].object_number, Some(1));

        let issues = check(&OutputIntentPresent, &doc);
        assert_eq!(issues[0].severity, Severity::Warning);

        let doc = simple("/AcroForm << /Fields [] >> /OutputIntents [<< /S /GTS_PDFA1 >>]", "");
        assert!(check(&NoXfa, &doc).is_empty());
        assert!(check(&OutputIntentPresent, &doc).is_empty());
    }

    #[test]
    fn lzw_streams() {
        let doc = pdf(
            &[
                "<< /Type /Catalog >>",
                "<< /Length 1 /Filter [/AHx /LZW] >>\nstream\nx\nendstream",
                "<< /Length 1 /Filter /FlateDecode >>\nstream\nx\nendstream",
            ],
            "<< /Root 1 0 R >>",
        );

        let issues = check(&NoLzw, &doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].object_number, Some(2));
    }
}
