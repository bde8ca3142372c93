//! Materializing the objects listed in the cross-reference table.

use crate::ReadSettings;
use crate::data::PdfData;
use crate::error::ParseError;
use crate::object::{Object, ObjectId, Resolve};
use crate::objstm::ObjectStream;
use crate::parser::{EndstreamIndex, Parser};
use crate::xref::{self, XRef, XRefEntry};
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// How deeply lookups of indirect `/Length` values may nest while loading.
const MAX_RESOLVE_DEPTH: usize = 4;

/// Where an object was found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Location {
    /// Directly in the file, with the `N G obj` header at the given byte offset.
    Offset(usize),
    /// Inside an object stream.
    ObjectStream {
        /// Object number of the object stream.
        stream: u32,
        /// Index within the object stream.
        index: u32,
    },
}

/// An object together with its identity and location.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    /// The object number and generation.
    pub id: ObjectId,
    /// The object itself.
    pub object: Object,
    /// Where the object was found.
    pub location: Location,
}

/// Something noteworthy that happened while loading objects.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadNote {
    /// The object was not at the offset recorded in the cross-reference table.
    Relocated {
        /// The object number.
        num: u32,
        /// The recorded offset.
        expected: usize,
        /// The offset the object was actually found at.
        found: usize,
    },
    /// The generation found in the file differs from the one in the table.
    GenerationMismatch {
        /// The object number.
        num: u32,
        /// Generation in the cross-reference table.
        expected: u16,
        /// Generation in the object header.
        found: u16,
    },
    /// The object could not be read.
    Unreadable {
        /// The object number.
        num: u32,
        /// What went wrong.
        error: ParseError,
    },
    /// An object stream could not be decoded.
    BrokenObjectStream {
        /// The object number that was stored in it.
        num: u32,
        /// The object number of the object stream.
        stream: u32,
    },
}

impl LoadNote {
    /// The number of the object this note is about.
    pub fn object_number(&self) -> u32 {
        match self {
            Self::Relocated { num, .. }
            | Self::GenerationMismatch { num, .. }
            | Self::Unreadable { num, .. }
            | Self::BrokenObjectStream { num, .. } => *num,
        }
    }
}

impl Display for LoadNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relocated {
                num,
                expected,
                found,
            } => write!(
                f,
                "object {num} is at offset {found} instead of the recorded offset {expected}"
            ),
            Self::GenerationMismatch {
                num,
                expected,
                found,
            } => write!(
                f,
                "object {num} has generation {found} instead of the recorded generation {expected}"
            ),
            Self::Unreadable { num, error } => write!(f, "object {num} is unreadable: {error}"),
            Self::BrokenObjectStream { num, stream } => {
                write!(f, "object {num} is stored in unreadable object stream {stream}")
            }
        }
    }
}

/// All objects that could be loaded, keyed by object number.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    /// The objects.
    pub objects: BTreeMap<u32, IndirectObject>,
    /// Problems encountered along the way.
    pub notes: Vec<LoadNote>,
}

/// Load every object the cross-reference table lists as in use.
pub fn load(data: &PdfData, xref: &XRef, settings: &ReadSettings) -> Loaded {
    let loader = Loader {
        data,
        xref,
        settings,
        scan: OnceCell::new(),
        endstreams: EndstreamIndex::default(),
        object_streams: RefCell::new(FxHashMap::default()),
        depth: Cell::new(0),
    };

    let mut loaded = Loaded::default();

    for (num, entry) in xref.table.iter() {
        if !entry.is_in_use() {
            continue;
        }

        match loader.fetch(num, *entry) {
            Ok((object, note)) => {
                loaded.notes.extend(note);
                loaded.objects.insert(num, object);
            }
            Err(note) => {
                lwarn!("{}", note);
                loaded.notes.push(note);
            }
        }
    }

    loaded
}

struct Loader<'a> {
    data: &'a PdfData,
    xref: &'a XRef,
    settings: &'a ReadSettings,
    scan: OnceCell<BTreeMap<u32, (usize, u16)>>,
    endstreams: EndstreamIndex,
    object_streams: RefCell<FxHashMap<u32, Option<Rc<ObjectStream>>>>,
    depth: Cell<usize>,
}

impl Loader<'_> {
    fn fetch(
        &self,
        num: u32,
        entry: XRefEntry,
    ) -> Result<(IndirectObject, Option<LoadNote>), LoadNote> {
        match entry {
            XRefEntry::Free { .. } => Err(LoadNote::Unreadable {
                num,
                error: ParseError::UnexpectedEof,
            }),
            XRefEntry::InUse { offset, gen_num } => self.fetch_direct(num, offset, gen_num),
            XRefEntry::Compressed { stream, index } => self
                .fetch_compressed(num, stream, index)
                .map(|object| (object, None)),
        }
    }

    fn fetch_direct(
        &self,
        num: u32,
        offset: usize,
        gen_num: u16,
    ) -> Result<(IndirectObject, Option<LoadNote>), LoadNote> {
        let first_error = match self.parse_at(offset, num) {
            Ok(object) => {
                let note = (object.id.gen_num != gen_num).then_some(LoadNote::GenerationMismatch {
                    num,
                    expected: gen_num,
                    found: object.id.gen_num,
                });
                return Ok((object, note));
            }
            Err(e) => e,
        };

        let mut candidates = vec![];

        if self.xref.header_offset > 0
            && let Some(shifted) = offset.checked_add(self.xref.header_offset)
        {
            candidates.push(shifted);
        }

        if self.settings.repair
            && let Some((found, _)) = self.scan().get(&num)
        {
            candidates.push(*found);
        }

        for found in candidates {
            if found == offset {
                continue;
            }

            if let Ok(object) = self.parse_at(found, num) {
                ldebug!("object {} relocated from {} to {}", num, offset, found);

                let note = LoadNote::Relocated {
                    num,
                    expected: offset,
                    found,
                };
                return Ok((object, Some(note)));
            }
        }

        Err(LoadNote::Unreadable {
            num,
            error: first_error,
        })
    }

    fn parse_at(&self, offset: usize, num: u32) -> Result<IndirectObject, ParseError> {
        if offset >= self.data.len() {
            return Err(ParseError::UnexpectedEof);
        }

        let (id, object) = Parser::new(self.data, offset)
            .with_max_depth(self.settings.max_depth)
            .with_resolver(self)
            .with_endstreams(&self.endstreams)
            .parse_indirect()?;

        if id.num != num {
            return Err(ParseError::ObjectMismatch {
                expected: num,
                found: id.num,
            });
        }

        Ok(IndirectObject {
            id,
            object,
            location: Location::Offset(offset),
        })
    }

    fn fetch_compressed(
        &self,
        num: u32,
        stream: u32,
        index: u32,
    ) -> Result<IndirectObject, LoadNote> {
        let objstm = self
            .object_stream(stream)
            .ok_or(LoadNote::BrokenObjectStream { num, stream })?;

        let object = objstm
            .get(index as usize, num, self.settings.max_depth, self)
            .map_err(|error| LoadNote::Unreadable { num, error })?;

        Ok(IndirectObject {
            id: ObjectId::new(num, 0),
            object,
            location: Location::ObjectStream { stream, index },
        })
    }

    fn object_stream(&self, stream: u32) -> Option<Rc<ObjectStream>> {
        if let Some(cached) = self.object_streams.borrow().get(&stream) {
            return cached.clone();
        }

        // Object streams must be stored directly in the file.
        let decoded = match self.xref.table.get(stream) {
            Some(XRefEntry::InUse { offset, gen_num }) => self
                .fetch_direct(stream, *offset, *gen_num)
                .ok()
                .and_then(|(container, _)| {
                    let stream = container.object.as_stream()?;
                    ObjectStream::new(stream, self, &self.settings.decode_limits)
                })
                .map(Rc::new),
            _ => None,
        };

        self.object_streams
            .borrow_mut()
            .insert(stream, decoded.clone());

        decoded
    }

    fn scan(&self) -> &BTreeMap<u32, (usize, u16)> {
        self.scan
            .get_or_init(|| xref::scan(self.data, self.settings).objects)
    }
}

impl Resolve for Loader<'_> {
    fn resolve_ref(&self, id: ObjectId) -> Option<Cow<'_, Object>> {
        let depth = self.depth.get();

        if depth >= MAX_RESOLVE_DEPTH {
            return None;
        }

        self.depth.set(depth + 1);
        let entry = self.xref.table.get(id.num).copied();
        let result = entry.and_then(|e| self.fetch(id.num, e).ok());
        self.depth.set(depth);

        result.map(|(object, _)| Cow::Owned(object.object))
    }
}
