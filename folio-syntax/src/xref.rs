//! Reading the cross-reference data of a PDF file.
//!
//! The newest cross-reference section is found via `startxref`, and older revisions are
//! reached by following `/Prev`. The first section that mentions an object number
//! wins. If the chain cannot be read at all, the whole file is scanned for
//! `N G obj` headers instead.

use crate::ReadSettings;
use crate::data::PdfData;
use crate::error::XRefError;
use crate::objstm::ObjectStream;
use crate::object::dict::keys::{
    CATALOG, INDEX, OBJ_STM, PREV, ROOT, SIZE, TYPE, W, XREF, XREF_STM,
};
use crate::object::{Dict, NoResolve, Object, ObjectId};
use crate::parser::{EndstreamIndex, Parser};
use crate::reader::Reader;
use crate::trivia::{is_regular_character, is_white_space_character};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;
use std::fmt::{Display, Formatter};

/// An entry of the cross-reference table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum XRefEntry {
    /// The object number is not in use.
    Free {
        /// The generation number the object would have if reused.
        gen_num: u16,
    },
    /// The object is stored directly in the file.
    InUse {
        /// Byte offset of the `N G obj` header.
        offset: usize,
        /// The generation number.
        gen_num: u16,
    },
    /// The object is stored in an object stream.
    Compressed {
        /// Object number of the containing object stream.
        stream: u32,
        /// Index of the object within the object stream.
        index: u32,
    },
}

impl XRefEntry {
    /// Whether the entry refers to an object, as opposed to being free.
    pub fn is_in_use(&self) -> bool {
        !matches!(self, Self::Free { .. })
    }

    /// The generation number. Objects in object streams always have generation zero.
    pub fn gen_num(&self) -> u16 {
        match self {
            Self::Free { gen_num } | Self::InUse { gen_num, .. } => *gen_num,
            Self::Compressed { .. } => 0,
        }
    }
}

/// The merged cross-reference table, with exactly one entry per object number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XRefTable {
    entries: BTreeMap<u32, XRefEntry>,
}

impl XRefTable {
    /// Return the entry for an object number.
    pub fn get(&self, num: u32) -> Option<&XRefEntry> {
        self.entries.get(&num)
    }

    /// Iterate over all entries in ascending object number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &XRefEntry)> {
        self.entries.iter().map(|(n, e)| (*n, e))
    }

    /// The number of entries, including free ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of entries that are not free.
    pub fn in_use_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_in_use()).count()
    }

    /// The highest object number with an entry.
    pub fn max_object_number(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    /// Insert an entry unless the object number already has one. Returns whether the
    /// entry was inserted.
    fn insert_if_absent(&mut self, num: u32, entry: XRefEntry) -> bool {
        match self.entries.entry(num) {
            Entry::Vacant(v) => {
                v.insert(entry);
                true
            }
            Entry::Occupied(_) => false,
        }
    }
}

/// The format of a cross-reference section.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SectionKind {
    /// A classic `xref` table.
    Table,
    /// A table with an additional cross-reference stream named by `/XRefStm`.
    Hybrid,
    /// A cross-reference stream.
    Stream,
}

/// One revision of the file, as reached through the `/Prev` chain.
#[derive(Debug, Clone)]
pub struct Revision {
    /// Byte offset of the section.
    pub offset: usize,
    /// The format of the section.
    pub kind: SectionKind,
    /// The trailer dictionary (or the dictionary of the cross-reference stream).
    pub trailer: Dict,
    /// The number of entries the section defined.
    pub entry_count: usize,
    /// Objects in use in this revision that no older revision had in use.
    pub added: BTreeSet<u32>,
    /// Objects in use in this revision that an older revision already had in use.
    pub modified: BTreeSet<u32>,
    /// Objects an older revision had in use that this revision marks as free.
    pub freed: BTreeSet<u32>,
}

/// Something noteworthy that happened while reading the cross-reference data.
#[derive(Debug, Clone, PartialEq)]
pub enum XRefNote {
    /// A `/Prev` link pointed to a section that was already visited.
    CyclicPrev {
        /// The offset that was visited twice.
        offset: usize,
    },
    /// An older revision could not be read, so the chain was cut off there. Objects
    /// missing from the newer revisions are taken from a scan of the file if repairing
    /// is enabled.
    BrokenSection {
        /// The offset of the section.
        offset: usize,
        /// What went wrong.
        error: XRefError,
    },
    /// The cross-reference stream of a hybrid file could not be read.
    BrokenXRefStm {
        /// The offset named by `/XRefStm`.
        offset: usize,
    },
    /// The table was reconstructed by scanning the file.
    Reconstructed {
        /// Why the regular cross-reference data could not be used.
        reason: XRefError,
    },
    /// No trailer with a usable `/Root` was found, so one was synthesized.
    SynthesizedTrailer,
}

impl Display for XRefNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CyclicPrev { offset } => {
                write!(f, "cyclic /Prev chain at offset {offset}, older revisions ignored")
            }
            Self::BrokenSection { offset, error } => {
                write!(f, "cross-reference section at offset {offset} is unreadable: {error}")
            }
            Self::BrokenXRefStm { offset } => {
                write!(f, "/XRefStm at offset {offset} is unreadable")
            }
            Self::Reconstructed { reason } => {
                write!(f, "cross-reference table reconstructed by scanning the file ({reason})")
            }
            Self::SynthesizedTrailer => {
                write!(f, "no usable trailer found, using the last catalog object as root")
            }
        }
    }
}

/// The resolved cross-reference data of a file.
#[derive(Debug, Clone)]
pub struct XRef {
    /// The merged table.
    pub table: XRefTable,
    /// All revisions, newest first. Empty if the table was reconstructed.
    pub revisions: Vec<Revision>,
    /// The effective trailer: the newest trailer, with keys missing from it taken from
    /// older ones.
    pub trailer: Dict,
    /// Whether the table was reconstructed by a brute-force scan.
    pub reconstructed: bool,
    /// Byte offset of the `%PDF-` header. Some writers compute offsets relative to it.
    pub header_offset: usize,
    /// Notes about problems that were worked around.
    pub notes: Vec<XRefNote>,
}

impl XRef {
    /// Whether the chain yielded something a document can be built from.
    fn is_usable(&self) -> bool {
        self.table.in_use_count() > 0 && self.trailer.contains_key(ROOT)
    }
}

/// Locate the `%PDF-` header within the first kilobyte.
pub fn find_header(data: &[u8]) -> Option<usize> {
    let head = &data[..data.len().min(1024)];
    memchr::memmem::find(head, b"%PDF-")
}

/// Find the offset named by the last `startxref` keyword.
pub fn find_startxref(data: &[u8]) -> Option<usize> {
    let pos = memchr::memmem::rfind(data, b"startxref")?;
    let mut r = Reader::new_at(data, pos + b"startxref".len());
    r.skip_white_spaces_and_comments();

    usize::try_from(r.read_unsigned()?).ok()
}

/// Resolve the cross-reference data of a file, reconstructing it if necessary.
pub fn resolve(data: &PdfData, settings: &ReadSettings) -> Result<XRef, XRefError> {
    let header_offset = find_header(data.as_ref()).unwrap_or(0);

    let reason = match read_chain(data, header_offset, settings) {
        Ok(xref) if xref.is_usable() => return Ok(xref),
        Ok(_) => XRefError::Unrecoverable,
        Err(e) => e,
    };

    lwarn!("falling back to a brute-force scan: {}", reason);

    if !settings.repair {
        return Err(reason);
    }

    let mut xref = reconstruct(data, header_offset, settings)?;
    xref.notes.insert(0, XRefNote::Reconstructed { reason });

    Ok(xref)
}

fn read_chain(
    data: &PdfData,
    header_offset: usize,
    settings: &ReadSettings,
) -> Result<XRef, XRefError> {
    let start = find_startxref(data.as_ref()).ok_or(XRefError::MissingStartXRef)?;

    let mut table = XRefTable::default();
    let mut revisions = vec![];
    let mut sections = vec![];
    let mut notes = vec![];
    let mut visited = FxHashSet::default();
    let mut next = Some(start);

    while let Some(offset) = next {
        if !visited.insert(offset) {
            lwarn!("cyclic /Prev chain at offset {}", offset);
            notes.push(XRefNote::CyclicPrev { offset });
            break;
        }

        let section = match read_revision(data, offset, header_offset, settings, &mut notes) {
            Ok(section) => section,
            Err(e) if revisions.is_empty() => return Err(e),
            Err(error) => {
                lwarn!("broken cross-reference section at offset {}", offset);
                notes.push(XRefNote::BrokenSection { offset, error });

                if settings.repair {
                    let added = merge_scan(&mut table, &scan(data, settings), data, settings).0;
                    ldebug!("{} objects of older revisions recovered by scanning", added);
                }
                break;
            }
        };

        for (num, entry) in &section.entries {
            table.insert_if_absent(*num, *entry);
        }

        next = section
            .trailer
            .get_int(PREV)
            .and_then(|p| usize::try_from(p).ok());

        revisions.push(Revision {
            offset,
            kind: section.kind,
            entry_count: section.entries.len(),
            trailer: section.trailer,
            added: BTreeSet::new(),
            modified: BTreeSet::new(),
            freed: BTreeSet::new(),
        });
        sections.push(section.entries);
    }

    record_changes(&mut revisions, sections);

    let mut trailer = Dict::new();
    for revision in &revisions {
        trailer.fill_from(&revision.trailer);
    }

    Ok(XRef {
        table,
        revisions,
        trailer,
        reconstructed: false,
        header_offset,
        notes,
    })
}

/// Sort the entries of each revision into added, modified and freed objects by
/// replaying the revisions from oldest to newest. `sections` holds the entries of each
/// revision, newest first like `revisions`.
fn record_changes(revisions: &mut [Revision], sections: Vec<BTreeMap<u32, XRefEntry>>) {
    let mut live = FxHashSet::default();

    for (revision, entries) in revisions.iter_mut().zip(sections).rev() {
        for (num, entry) in entries {
            // Object 0 is the head of the free list.
            if num == 0 {
                continue;
            }

            if entry.is_in_use() {
                if live.insert(num) {
                    revision.added.insert(num);
                } else {
                    revision.modified.insert(num);
                }
            } else if live.remove(&num) {
                revision.freed.insert(num);
            }
        }
    }
}

struct Section {
    kind: SectionKind,
    entries: BTreeMap<u32, XRefEntry>,
    trailer: Dict,
}

/// Read the section at `offset`, also trying the offset relative to the header.
fn read_revision(
    data: &PdfData,
    offset: usize,
    header_offset: usize,
    settings: &ReadSettings,
    notes: &mut Vec<XRefNote>,
) -> Result<Section, XRefError> {
    match read_section(data, offset, settings, notes) {
        Err(e) if header_offset > 0 => match offset.checked_add(header_offset) {
            Some(shifted) => read_section(data, shifted, settings, notes).map_err(|_| e),
            None => Err(e),
        },
        other => other,
    }
}

fn read_section(
    data: &PdfData,
    offset: usize,
    settings: &ReadSettings,
    notes: &mut Vec<XRefNote>,
) -> Result<Section, XRefError> {
    let mut r = Reader::new_at(data.as_ref(), offset);
    r.skip_white_spaces();

    if r.forward_tag(b"xref").is_none() {
        return read_stream_section(data, offset, settings);
    }

    let mut section = read_table_section(data, r, settings)?;

    if let Some(stm_offset) = section
        .trailer
        .get_int(XREF_STM)
        .and_then(|o| usize::try_from(o).ok())
    {
        match read_stream_section(data, stm_offset, settings) {
            Ok(stream) => {
                section.kind = SectionKind::Hybrid;

                // Entries missing or free in the table are taken from the stream.
                for (num, entry) in stream.entries {
                    match section.entries.entry(num) {
                        Entry::Vacant(v) => {
                            v.insert(entry);
                        }
                        Entry::Occupied(mut o) if !o.get().is_in_use() => {
                            o.insert(entry);
                        }
                        Entry::Occupied(_) => {}
                    }
                }
            }
            Err(_) => notes.push(XRefNote::BrokenXRefStm { offset: stm_offset }),
        }
    }

    Ok(section)
}

fn read_table_section(
    data: &PdfData,
    mut r: Reader<'_>,
    settings: &ReadSettings,
) -> Result<Section, XRefError> {
    let invalid = XRefError::InvalidSection(r.offset());
    let mut entries = BTreeMap::new();

    loop {
        r.skip_white_spaces_and_comments();

        if r.peek_tag(b"trailer").is_some() {
            break;
        }

        let (mut start, count) = read_subsection_header(&mut r).ok_or_else(|| invalid.clone())?;

        for i in 0..count {
            let Some((entry, offset)) = read_table_entry(&mut r) else {
                lwarn!("xref subsection ended after {} of {} entries", i, count);
                return Err(invalid);
            };

            // A common mistake is to start the first subsection at 1 while still
            // including the entry of object 0.
            if i == 0
                && start == 1
                && offset == 0
                && entry == (XRefEntry::Free { gen_num: 65535 })
            {
                start = 0;
            }

            let Some(num) = start.checked_add(i).and_then(|n| u32::try_from(n).ok()) else {
                return Err(invalid);
            };

            entries.entry(num).or_insert(entry);
        }
    }

    r.forward_tag(b"trailer").ok_or_else(|| invalid.clone())?;

    let trailer = Parser::new(data, r.offset())
        .with_max_depth(settings.max_depth)
        .parse_object()
        .ok()
        .and_then(|o| match o {
            Object::Dict(d) => Some(d),
            _ => None,
        })
        .ok_or(invalid)?;

    Ok(Section {
        kind: SectionKind::Table,
        entries,
        trailer,
    })
}

fn read_subsection_header(r: &mut Reader<'_>) -> Option<(u64, u64)> {
    let start = r.read_unsigned()?;
    r.forward_while(|b| b == b' ' || b == b'\t');
    let count = r.read_unsigned()?;

    Some((start, count))
}

/// Read one `oooooooooo ggggg n` entry. Entry lines are nominally 20 bytes, but
/// 19 and 21 byte variants are common, so white space is handled loosely.
fn read_table_entry(r: &mut Reader<'_>) -> Option<(XRefEntry, u64)> {
    r.skip_white_spaces();
    let offset = r.read_unsigned()?;
    r.forward_while(|b| b == b' ');
    let gen_num = u16::try_from(r.read_unsigned()?).unwrap_or(u16::MAX);
    r.forward_while(|b| b == b' ');

    let entry = match r.read_byte()? {
        b'n' => XRefEntry::InUse {
            offset: usize::try_from(offset).ok()?,
            gen_num,
        },
        b'f' => XRefEntry::Free { gen_num },
        _ => return None,
    };

    Some((entry, offset))
}

fn read_stream_section(
    data: &PdfData,
    offset: usize,
    settings: &ReadSettings,
) -> Result<Section, XRefError> {
    let invalid = XRefError::InvalidSection(offset);

    let (_, object) = Parser::new(data, offset)
        .with_max_depth(settings.max_depth)
        .parse_indirect()
        .map_err(|_| invalid.clone())?;

    let stream = object.as_stream().ok_or_else(|| invalid.clone())?;
    let dict = stream.dict();

    if dict.get_name(TYPE).is_some_and(|t| t.as_bytes() != XREF) {
        return Err(invalid);
    }

    let widths = dict
        .get(W)
        .and_then(|w| w.as_array())
        .filter(|w| w.len() == 3)
        .and_then(|w| {
            w.iter()
                .map(|o| o.as_i64().and_then(|v| usize::try_from(v).ok()).filter(|v| *v <= 8))
                .collect::<Option<Vec<_>>>()
        })
        .filter(|w| w.iter().sum::<usize>() > 0)
        .ok_or_else(|| invalid.clone())?;

    let size = dict
        .get_int(SIZE)
        .and_then(|s| u64::try_from(s).ok())
        .unwrap_or(0);

    let subsections: Vec<(u64, u64)> = match dict.get(INDEX).and_then(|i| i.as_array()) {
        Some(index) => index
            .chunks_exact(2)
            .filter_map(|pair| {
                let start = u64::try_from(pair[0].as_i64()?).ok()?;
                let count = u64::try_from(pair[1].as_i64()?).ok()?;
                Some((start, count))
            })
            .collect(),
        None => vec![(0, size)],
    };

    let decoded = stream.decoded(&NoResolve, &settings.decode_limits)?;
    let mut r = Reader::new(&decoded);
    let mut entries = BTreeMap::new();

    'outer: for (start, count) in subsections {
        for i in 0..count {
            let Some((kind, f2, f3)) = read_stream_entry(&mut r, &widths) else {
                lwarn!("cross-reference stream data ended prematurely");
                break 'outer;
            };

            let Some(num) = start.checked_add(i).and_then(|n| u32::try_from(n).ok()) else {
                break 'outer;
            };

            let entry = match kind {
                0 => XRefEntry::Free {
                    gen_num: u16::try_from(f3).unwrap_or(u16::MAX),
                },
                1 => match usize::try_from(f2) {
                    Ok(offset) => XRefEntry::InUse {
                        offset,
                        gen_num: u16::try_from(f3).unwrap_or(u16::MAX),
                    },
                    Err(_) => continue,
                },
                2 => match (u32::try_from(f2), u32::try_from(f3)) {
                    (Ok(stream), Ok(index)) => XRefEntry::Compressed { stream, index },
                    _ => continue,
                },
                // Unknown types are to be treated as references to the null object.
                _ => continue,
            };

            entries.entry(num).or_insert(entry);
        }
    }

    Ok(Section {
        kind: SectionKind::Stream,
        entries,
        trailer: dict.clone(),
    })
}

fn read_stream_entry(r: &mut Reader<'_>, widths: &[usize]) -> Option<(u64, u64, u64)> {
    // A missing type field defaults to type 1.
    let kind = if widths[0] == 0 {
        1
    } else {
        r.read_be_uint(widths[0])?
    };

    Some((kind, r.read_be_uint(widths[1])?, r.read_be_uint(widths[2])?))
}

/// The result of scanning a whole file for objects.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    /// The offset and generation of the last header found for each object number.
    pub(crate) objects: BTreeMap<u32, (usize, u16)>,
    /// Trailer dictionaries and cross-reference stream dictionaries, in file order.
    pub(crate) trailers: Vec<Dict>,
    /// Object numbers of all catalog dictionaries, in file order.
    pub(crate) catalogs: Vec<ObjectId>,
    /// Object numbers of all object streams, in file order.
    pub(crate) object_streams: Vec<u32>,
}

/// Scan the whole file for `N G obj` headers that are followed by a valid object.
pub(crate) fn scan(data: &PdfData, settings: &ReadSettings) -> Scan {
    let bytes = data.as_ref();
    let mut scan = Scan::default();
    let mut trailers = vec![];
    let endstreams = EndstreamIndex::default();

    for pos in memchr::memmem::find_iter(bytes, b"obj") {
        let Some(start) = object_header_start(bytes, pos) else {
            continue;
        };

        let Ok((id, object)) = Parser::new(data, start)
            .with_max_depth(settings.max_depth)
            .with_endstreams(&endstreams)
            .parse_indirect()
        else {
            continue;
        };

        scan.objects.insert(id.num, (start, id.gen_num));

        if let Some(dict) = object.as_dict_like() {
            if dict.is_type(XREF) {
                trailers.push((start, dict.clone()));
            } else if dict.is_type(CATALOG) {
                scan.catalogs.push(id);
            } else if dict.is_type(OBJ_STM) {
                scan.object_streams.push(id.num);
            }
        }
    }

    for pos in memchr::memmem::find_iter(bytes, b"trailer") {
        let dict = Parser::new(data, pos + b"trailer".len())
            .with_max_depth(settings.max_depth)
            .parse_object();

        if let Ok(Object::Dict(dict)) = dict {
            trailers.push((pos, dict));
        }
    }

    trailers.sort_by_key(|(pos, _)| *pos);
    scan.trailers = trailers.into_iter().map(|(_, d)| d).collect();

    scan
}

/// Given the position of an `obj` keyword, return the start of the `N G obj` header.
fn object_header_start(data: &[u8], obj_pos: usize) -> Option<usize> {
    if data
        .get(obj_pos + 3)
        .is_some_and(|b| is_regular_character(*b))
    {
        return None;
    }

    let mut i = obj_pos;

    skip_back(data, &mut i, is_white_space_character)?;
    skip_back(data, &mut i, |b| b.is_ascii_digit())?;
    skip_back(data, &mut i, is_white_space_character)?;
    skip_back(data, &mut i, |b| b.is_ascii_digit())?;

    if i > 0 && is_regular_character(data[i - 1]) {
        return None;
    }

    Some(i)
}

/// Move `i` backwards over bytes matching `f`. Fails if there was not at least one.
fn skip_back(data: &[u8], i: &mut usize, f: impl Fn(u8) -> bool) -> Option<()> {
    let end = *i;
    while *i > 0 && f(data[*i - 1]) {
        *i -= 1;
    }

    (*i < end).then_some(())
}

/// Add the objects found by a scan to the table, keeping existing entries. Returns the
/// number of entries added and the object streams that were decoded on the way.
fn merge_scan(
    table: &mut XRefTable,
    scan: &Scan,
    data: &PdfData,
    settings: &ReadSettings,
) -> (usize, FxHashMap<u32, ObjectStream>) {
    let mut added = 0;

    for (num, (offset, gen_num)) in &scan.objects {
        let entry = XRefEntry::InUse {
            offset: *offset,
            gen_num: *gen_num,
        };
        added += usize::from(table.insert_if_absent(*num, entry));
    }

    // Objects only found inside object streams. Newer streams come later in the file.
    let mut decoded: FxHashMap<u32, ObjectStream> = FxHashMap::default();
    for num in scan.object_streams.iter().rev() {
        let Some((offset, _)) = scan.objects.get(num) else {
            continue;
        };

        let object = Parser::new(data, *offset)
            .with_max_depth(settings.max_depth)
            .parse_indirect()
            .ok();

        let Some(stream) = object.as_ref().and_then(|(_, o)| o.as_stream()) else {
            continue;
        };

        if let Some(objstm) = ObjectStream::new(stream, &NoResolve, &settings.decode_limits) {
            for (index, embedded) in objstm.object_numbers().enumerate() {
                let entry = XRefEntry::Compressed {
                    stream: *num,
                    index: index as u32,
                };
                added += usize::from(table.insert_if_absent(embedded, entry));
            }

            decoded.insert(*num, objstm);
        }
    }

    (added, decoded)
}

fn reconstruct(
    data: &PdfData,
    header_offset: usize,
    settings: &ReadSettings,
) -> Result<XRef, XRefError> {
    let scan = scan(data, settings);

    if scan.objects.is_empty() {
        return Err(XRefError::Unrecoverable);
    }

    let mut table = XRefTable::default();
    let (_, decoded) = merge_scan(&mut table, &scan, data, settings);

    let mut notes = vec![];
    let catalog_nums: FxHashSet<u32> = scan.catalogs.iter().map(|id| id.num).collect();
    let has_catalog_root = |dict: &Dict| {
        dict.get_ref(ROOT).is_some_and(|r| catalog_nums.contains(&r.num))
    };

    // Prefer the newest trailer whose root is a catalog, and fill in from the others.
    let mut trailer = Dict::new();
    if let Some(best) = scan.trailers.iter().rev().find(|&t| has_catalog_root(t)) {
        trailer.fill_from(best);
    }
    for older in scan.trailers.iter().rev() {
        trailer.fill_from(older);
    }

    if !has_catalog_root(&trailer) {
        let catalog = scan.catalogs.last().copied().or_else(|| {
            // Catalogs inside object streams are only found by looking at them.
            decoded.values().find_map(|objstm| objstm.find_catalog(settings.max_depth))
        });

        if let Some(catalog) = catalog {
            trailer.insert(ROOT, Object::Reference(catalog));
            notes.push(XRefNote::SynthesizedTrailer);
        }
    }

    Ok(XRef {
        table,
        revisions: vec![],
        trailer,
        reconstructed: true,
        header_offset,
        notes,
    })
}
