//! The document information dictionary.

use folio_syntax::object::dict::keys::{
    AUTHOR, CREATION_DATE, CREATOR, KEYWORDS, MOD_DATE, PRODUCER, SUBJECT, TITLE,
};
use folio_syntax::{Dict, PdfString, Resolve};

/// The entries of a document information dictionary.
///
/// All values are raw string bytes. Use [`Metadata::text`] to interpret them.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Metadata {
    /// The title of the document.
    pub title: Option<Vec<u8>>,
    /// The author of the document.
    pub author: Option<Vec<u8>>,
    /// The subject of the document.
    pub subject: Option<Vec<u8>>,
    /// The keywords of the document.
    pub keywords: Option<Vec<u8>>,
    /// The application that created the original document.
    pub creator: Option<Vec<u8>>,
    /// The application that converted the document to PDF.
    pub producer: Option<Vec<u8>>,
    /// The creation date, as a PDF date string such as `D:20240101120000Z`.
    pub creation_date: Option<Vec<u8>>,
    /// The modification date, as a PDF date string.
    pub modification_date: Option<Vec<u8>>,
}

impl Metadata {
    pub(crate) fn from_dict(dict: &Dict, resolver: &dyn Resolve) -> Self {
        let get = |key: &[u8]| {
            dict.get(key)
                .and_then(|o| resolver.resolve(o).as_string().map(|s| s.as_bytes().to_vec()))
        };

        Self {
            title: get(TITLE),
            author: get(AUTHOR),
            subject: get(SUBJECT),
            keywords: get(KEYWORDS),
            creator: get(CREATOR),
            producer: get(PRODUCER),
            creation_date: get(CREATION_DATE),
            modification_date: get(MOD_DATE),
        }
    }

    /// Decode one of the fields as text.
    pub fn text(field: &Option<Vec<u8>>) -> Option<String> {
        field.as_ref().map(|b| PdfString::new(b.clone()).to_text())
    }
}
