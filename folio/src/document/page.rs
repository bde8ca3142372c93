//! Flattening the page tree.

use crate::document::Document;
use crate::issue::{Issue, Severity};
use folio_syntax::object::dict::keys::{
    CROP_BOX, KIDS, MEDIA_BOX, PAGE, PAGES, RESOURCES, ROTATE, TYPE,
};
use folio_syntax::{Dict, Object, ObjectId};
use rustc_hash::FxHashSet;

/// A rectangle given by two corner points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    /// The x coordinate of the first corner.
    pub x0: f64,
    /// The y coordinate of the first corner.
    pub y0: f64,
    /// The x coordinate of the second corner.
    pub x1: f64,
    /// The y coordinate of the second corner.
    pub y1: f64,
}

impl Rect {
    /// Read a rectangle from an array of four numbers.
    pub fn from_object(object: &Object) -> Option<Self> {
        match object.as_array()? {
            [x0, y0, x1, y1] => Some(Self {
                x0: x0.as_f64()?,
                y0: y0.as_f64()?,
                x1: x1.as_f64()?,
                y1: y1.as_f64()?,
            }),
            _ => None,
        }
    }

    /// The width of the rectangle.
    pub fn width(&self) -> f64 {
        (self.x1 - self.x0).abs()
    }

    /// The height of the rectangle.
    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }

    /// The area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// Attributes a page inherits from its ancestors in the page tree.
#[derive(Debug, Clone, Default, PartialEq)]
struct Inherited {
    media_box: Option<Object>,
    crop_box: Option<Object>,
    resources: Option<Object>,
    rotate: Option<Object>,
}

impl Inherited {
    fn apply(&self, node: &Dict, doc: &Document) -> Self {
        let get = |key: &[u8], parent: &Option<Object>| {
            node.get(key)
                .map(|o| doc.deref(o).clone())
                .or_else(|| parent.clone())
        };

        Self {
            media_box: get(MEDIA_BOX, &self.media_box),
            crop_box: get(CROP_BOX, &self.crop_box),
            resources: get(RESOURCES, &self.resources),
            rotate: get(ROTATE, &self.rotate),
        }
    }
}

/// A page of the document, combining its dictionary with inherited attributes.
///
/// An attribute is taken from the page itself if it defines it, otherwise from the
/// nearest ancestor that does. If no ancestor defines it either, it is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The reference to the page dictionary, if the page is an indirect object.
    pub id: Option<ObjectId>,
    /// The page dictionary.
    pub dict: Dict,
    /// The effective `/MediaBox`, resolved.
    pub media_box: Option<Object>,
    /// The effective `/CropBox`, resolved.
    pub crop_box: Option<Object>,
    /// The effective `/Resources`.
    pub resources: Option<Object>,
    /// The effective `/Rotate`, resolved.
    pub rotate: Option<Object>,
}

impl Page {
    /// The media box, if it is a valid rectangle.
    pub fn media_box_rect(&self) -> Option<Rect> {
        self.media_box.as_ref().and_then(Rect::from_object)
    }

    /// The rotation in degrees, normalized to `0..360`. Defaults to 0.
    pub fn rotation(&self) -> i64 {
        self.rotate
            .as_ref()
            .and_then(Object::as_i64)
            .unwrap_or(0)
            .rem_euclid(360)
    }

    /// The object number of the page, if it has one.
    pub fn object_number(&self) -> Option<u32> {
        self.id.map(|id| id.num)
    }
}

/// The result of flattening a page tree.
#[derive(Debug, Default)]
pub(crate) struct PageTree {
    pub(crate) pages: Vec<Page>,
    pub(crate) issues: Vec<Issue>,
}

/// Flatten the page tree of a document by a depth-first traversal.
pub(crate) fn flatten(doc: &Document) -> PageTree {
    let mut walker = Walker {
        doc,
        path: vec![],
        seen: FxHashSet::default(),
        tree: PageTree::default(),
    };

    let Some(root) = doc.catalog().and_then(|c| c.get(PAGES)) else {
        return walker.tree;
    };

    let id = root.as_reference();
    let Some(node) = doc.deref(root).as_dict() else {
        return walker.tree;
    };

    if let Some(id) = id {
        walker.path.push(id);
        walker.seen.insert(id);
    }

    walker.visit(id, node, &Inherited::default(), 0);

    walker.tree
}

struct Walker<'a> {
    doc: &'a Document,
    path: Vec<ObjectId>,
    seen: FxHashSet<ObjectId>,
    tree: PageTree,
}

impl<'a> Walker<'a> {
    fn issue(&mut self, severity: Severity, message: String, object: Option<ObjectId>) {
        self.tree
            .issues
            .push(Issue::structure(severity, message, object.map(|id| id.num)));
    }

    fn visit(&mut self, id: Option<ObjectId>, node: &'a Dict, inherited: &Inherited, depth: usize) {
        let inherited = inherited.apply(node, self.doc);

        if !is_intermediate(node) {
            self.tree.pages.push(Page {
                id,
                dict: node.clone(),
                media_box: inherited.media_box,
                crop_box: inherited.crop_box,
                resources: inherited.resources,
                rotate: inherited.rotate,
            });

            return;
        }

        let limit = self.doc.settings().max_page_tree_depth;
        if depth >= limit {
            lwarn!("page tree is deeper than {}", limit);
            self.issue(
                Severity::Error,
                format!("page tree exceeds the depth limit of {limit}, branch skipped"),
                id,
            );
            return;
        }

        let Some(kids) = node.get(KIDS).map(|k| self.doc.deref(k)) else {
            return;
        };

        let Some(kids) = kids.as_array() else {
            self.issue(Severity::Error, "/Kids is not an array".to_string(), id);
            return;
        };

        for kid in kids {
            let kid_id = kid.as_reference();

            if let Some(kid_id) = kid_id {
                if self.path.contains(&kid_id) {
                    lwarn!("cycle in page tree at {}", kid_id);
                    self.issue(
                        Severity::Error,
                        format!("page tree cycle: {kid_id} is its own ancestor"),
                        id,
                    );
                    continue;
                }

                if !self.seen.insert(kid_id) {
                    self.issue(
                        Severity::Warning,
                        format!("{kid_id} appears more than once in the page tree"),
                        Some(kid_id),
                    );
                    continue;
                }
            }

            let Some(kid_dict) = self.doc.deref(kid).as_dict() else {
                self.issue(
                    Severity::Warning,
                    "page tree node is not a dictionary".to_string(),
                    kid_id.or(id),
                );
                continue;
            };

            if let Some(kid_id) = kid_id {
                self.path.push(kid_id);
            }

            self.visit(kid_id, kid_dict, &inherited, depth + 1);

            if kid_id.is_some() {
                self.path.pop();
            }
        }
    }
}

/// Whether a node is an intermediate node rather than a page. Nodes without a type are
/// classified by whether they have kids.
fn is_intermediate(node: &Dict) -> bool {
    match node.get_name(TYPE).map(|n| n.as_bytes()) {
        Some(PAGES) => true,
        Some(PAGE) => false,
        _ => node.contains_key(KIDS),
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;
    use crate::parse_pdf;
    use folio_syntax::Object;

    fn pdf(objects: &[&str]) -> Vec<u8> {
        let mut out = b"%PDF-1.7\n".to_vec();
        for (i, body) in objects.iter().enumerate() {
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        out.extend_from_slice(b"trailer\n<< /Root 1 0 R >>\n%%EOF");
        out
    }

    #[test]
    fn inheritance() {
        let data = pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 /MediaBox [0 0 612 792] /Rotate 90 >>",
            "<< /Type /Page /Parent 2 0 R >>",
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 100 100] /Rotate -90 >>",
        ]);
        let pages = parse_pdf(data).unwrap().pages();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].media_box_rect().unwrap().area(), 612.0 * 792.0);
        assert_eq!(pages[0].rotation(), 90);
        assert_eq!(pages[1].media_box_rect().unwrap().width(), 100.0);
        assert_eq!(pages[1].rotation(), 270);
        assert_eq!(pages[1].object_number(), Some(4));
    }

    #[test]
    fn absent_attribute_stays_absent() {
        let data = pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
            "<< /Type /Page /Parent 2 0 R >>",
        ]);
        let pages = parse_pdf(data).unwrap().pages();

        assert_eq!(pages[0].media_box, None);
        assert_eq!(pages[0].resources, None);
    }

    #[test]
    fn untyped_nodes() {
        let data = pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Kids [3 0 R << /MediaBox [0 0 1 1] >>] >>",
            "<< /Kids [4 0 R] >>",
            "<< /MediaBox [0 0 5 5] >>",
        ]);
        let pages = parse_pdf(data).unwrap().pages();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].object_number(), Some(4));
        assert_eq!(pages[1].id, None);
    }

    #[test]
    fn cycle() {
        let data = pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] >>",
            "<< /Type /Pages /Kids [2 0 R 4 0 R] >>",
            "<< /Type /Page >>",
        ]);
        let doc = parse_pdf(data).unwrap();

        assert_eq!(doc.pages().len(), 1);
        assert!(doc
            .structure_issues()
            .iter()
            .any(|i| i.is_error() && i.message.contains("cycle") && i.object_number == Some(3)));
    }

    #[test]
    fn shared_node() {
        let data = pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R 3 0 R] >>",
            "<< /Type /Page >>",
        ]);
        let doc = parse_pdf(data).unwrap();

        assert_eq!(doc.pages().len(), 1);
        assert!(doc
            .structure_issues()
            .iter()
            .any(|i| !i.is_error() && i.message.contains("more than once")));
    }

    #[test]
    fn depth_limit() {
        let data = pdf(&[
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] >>",
            "<< /Type /Pages /Kids [4 0 R] >>",
            "<< /Type /Page >>",
        ]);
        let settings = crate::ParseSettings {
            max_page_tree_depth: 1,
            ..crate::ParseSettings::default()
        };
        let doc = crate::parse_pdf_with(data, settings).unwrap();

        assert!(doc.pages().is_empty());
    }

    #[test]
    fn rect() {
        let object = Object::Array(vec![
            Object::Integer(0),
            Object::Real(0.5),
            Object::Integer(10),
            Object::Integer(2),
        ]);
        let rect = Rect::from_object(&object).unwrap();

        assert_eq!(rect.height(), 1.5);
        assert_eq!(Rect::from_object(&Object::Array(vec![])), None);
    }
}
