/*!
A low-level crate for reading the syntax layer of PDF files.

This crate tokenizes PDF files, parses their objects, decodes stream data and resolves
the cross-reference data that ties everything together. It is very lenient: files with
wrong offsets, broken `/Prev` chains or a missing `startxref` are reconstructed by
scanning the whole file for object headers, and every repair is reported so that higher
layers can turn it into diagnostics.

The entry point is [`read`], which returns a [`SyntaxFile`] holding the resolved
cross-reference data and all objects that could be loaded.

## Safety
This crate forbids unsafe code via a crate-level attribute.

## Cargo features
- `logging`: Forward internal diagnostics to the `log` crate.
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

#[macro_use]
mod log;

pub mod data;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod load;
pub mod object;
pub mod objstm;
pub mod parser;
pub mod reader;
pub mod trivia;
pub mod xref;

pub use data::PdfData;
pub use error::{FilterError, ParseError, XRefError};
pub use filter::DecodeLimits;
pub use load::{IndirectObject, LoadNote, Location};
pub use object::{Dict, Name, Object, ObjectId, PdfString, Resolve, Stream};
pub use xref::{XRef, XRefEntry, XRefNote};

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Settings for reading a file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReadSettings {
    /// The maximum nesting depth of arrays and dictionaries.
    pub max_depth: usize,
    /// Limits for decoding stream data.
    pub decode_limits: DecodeLimits,
    /// Whether to reconstruct broken cross-reference data by scanning the file.
    pub repair: bool,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            max_depth: parser::DEFAULT_MAX_DEPTH,
            decode_limits: DecodeLimits::default(),
            repair: true,
        }
    }
}

/// A file whose cross-reference data has been resolved and whose objects have been loaded.
#[derive(Debug, Clone)]
pub struct SyntaxFile {
    data: PdfData,
    xref: XRef,
    objects: BTreeMap<u32, IndirectObject>,
    load_notes: Vec<LoadNote>,
}

impl SyntaxFile {
    /// The underlying data.
    pub fn data(&self) -> &PdfData {
        &self.data
    }

    /// The resolved cross-reference data.
    pub fn xref(&self) -> &XRef {
        &self.xref
    }

    /// The effective trailer dictionary.
    pub fn trailer(&self) -> &Dict {
        &self.xref.trailer
    }

    /// All loaded objects, in ascending object number order.
    pub fn objects(&self) -> &BTreeMap<u32, IndirectObject> {
        &self.objects
    }

    /// Look up a loaded object by number.
    pub fn get(&self, num: u32) -> Option<&IndirectObject> {
        self.objects.get(&num)
    }

    /// Problems encountered while loading objects.
    pub fn load_notes(&self) -> &[LoadNote] {
        &self.load_notes
    }
}

impl Resolve for SyntaxFile {
    // References resolve by object number, the generation is not compared.
    fn resolve_ref(&self, id: ObjectId) -> Option<Cow<'_, Object>> {
        self.objects.get(&id.num).map(|o| Cow::Borrowed(&o.object))
    }
}

/// Resolve the cross-reference data of a file and load all of its objects.
pub fn read(data: impl Into<PdfData>, settings: &ReadSettings) -> Result<SyntaxFile, XRefError> {
    let data = data.into();
    let xref = xref::resolve(&data, settings)?;
    let loaded = load::load(&data, &xref, settings);

    ldebug!(
        "loaded {} of {} objects",
        loaded.objects.len(),
        xref.table.in_use_count()
    );

    Ok(SyntaxFile {
        data,
        xref,
        objects: loaded.objects,
        load_notes: loaded.notes,
    })
}
