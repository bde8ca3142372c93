//! Helpers for the integration tests.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Copy, Clone)]
enum Entry {
    Free,
    InUse(usize),
    Compressed(u32, u32),
}

/// Writes PDF files object by object, keeping track of offsets so that the
/// cross-reference data it writes is correct.
///
/// Every call to one of the `xref_*` methods finishes a revision containing all objects
/// written since the previous one, so incremental updates are written by calling them
/// repeatedly.
#[derive(Debug, Clone)]
pub struct PdfBuilder {
    buf: Vec<u8>,
    pending: BTreeMap<u32, Entry>,
    offsets: BTreeMap<u32, usize>,
    max_num: u32,
    last_xref: Option<usize>,
}

impl PdfBuilder {
    /// Start a file with the given header version.
    pub fn new(version: &str) -> Self {
        let mut buf = format!("%PDF-{version}\n").into_bytes();
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        Self {
            buf,
            pending: BTreeMap::new(),
            offsets: BTreeMap::new(),
            max_num: 0,
            last_xref: None,
        }
    }

    fn record(&mut self, num: u32, entry: Entry) {
        if let Entry::InUse(offset) = entry {
            self.offsets.insert(num, offset);
        }

        self.max_num = self.max_num.max(num);
        self.pending.insert(num, entry);
    }

    /// Write an indirect object.
    pub fn object(mut self, num: u32, body: &str) -> Self {
        let offset = self.buf.len();
        self.buf
            .extend_from_slice(format!("{num} 0 obj\n{body}\nendobj\n").as_bytes());
        self.record(num, Entry::InUse(offset));

        self
    }

    /// Mark an object as free in the next revision.
    pub fn free(mut self, num: u32) -> Self {
        self.offsets.remove(&num);
        self.record(num, Entry::Free);

        self
    }

    /// Write a stream object. `entries` are the dictionary entries besides `/Length`.
    pub fn stream(mut self, num: u32, entries: &str, data: &[u8]) -> Self {
        self.write_stream(num, entries, data);
        self
    }

    fn write_stream(&mut self, num: u32, entries: &str, data: &[u8]) -> usize {
        let offset = self.buf.len();
        self.buf.extend_from_slice(
            format!("{num} 0 obj\n<< {entries} /Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        self.record(num, Entry::InUse(offset));

        offset
    }

    /// Write a Flate-compressed object stream holding the given objects.
    pub fn object_stream(mut self, num: u32, objects: &[(u32, &str)]) -> Self {
        let mut header = String::new();
        let mut body = String::new();

        for (index, (embedded, object)) in objects.iter().enumerate() {
            header.push_str(&format!("{embedded} {} ", body.len()));
            body.push_str(object);
            body.push('\n');
            self.record(*embedded, Entry::Compressed(num, index as u32));
        }

        let first = header.len();
        let data = deflate(format!("{header}{body}").as_bytes());
        let entries = format!(
            "/Type /ObjStm /N {} /First {first} /Filter /FlateDecode",
            objects.len()
        );
        self.write_stream(num, &entries, &data);

        self
    }

    /// Append raw bytes.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// The current length of the file.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written, which is never the case.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The offset of the most recent definition of an object stored directly in the file.
    pub fn offset(&self, num: u32) -> Option<usize> {
        self.offsets.get(&num).copied()
    }

    fn trailer_entries(&self, trailer: &str) -> String {
        let mut entries = format!("/Size {} {trailer}", self.max_num + 1);

        if let Some(prev) = self.last_xref {
            entries.push_str(&format!(" /Prev {prev}"));
        }

        entries
    }

    fn take_pending(&mut self) -> BTreeMap<u32, Entry> {
        let mut entries = std::mem::take(&mut self.pending);

        if self.last_xref.is_none() {
            entries.insert(0, Entry::Free);
        }

        entries
    }

    /// Finish the revision with a classic cross-reference table.
    pub fn xref_table(mut self, trailer: &str) -> Self {
        let entries = self.take_pending();
        self.write_table(entries, &self.trailer_entries(trailer));
        self
    }

    fn write_table(&mut self, entries: BTreeMap<u32, Entry>, trailer: &str) {
        let offset = self.buf.len();
        let mut out = String::from("xref\n");

        for (start, run) in runs(&entries) {
            out.push_str(&format!("{start} {}\n", run.len()));

            for entry in run {
                match entry {
                    Entry::Free => out.push_str("0000000000 65535 f \n"),
                    Entry::InUse(offset) => out.push_str(&format!("{offset:010} 00000 n \n")),
                    Entry::Compressed(..) => unreachable!("compressed entries need a stream"),
                }
            }
        }

        out.push_str(&format!("trailer\n<< {trailer} >>\nstartxref\n{offset}\n%%EOF\n"));
        self.buf.extend_from_slice(out.as_bytes());
        self.last_xref = Some(offset);
    }

    /// Finish the revision with a cross-reference stream, written as object `num`.
    pub fn xref_stream(mut self, num: u32, trailer: &str) -> Self {
        self.max_num = self.max_num.max(num);
        let mut entries = self.take_pending();
        let offset = self.buf.len();
        entries.insert(num, Entry::InUse(offset));

        let trailer = self.trailer_entries(trailer);
        self.write_xref_stream(num, &entries, &trailer);
        self.pending.clear();
        self.buf
            .extend_from_slice(format!("startxref\n{offset}\n%%EOF\n").as_bytes());
        self.last_xref = Some(offset);

        self
    }

    /// Finish the revision with a classic table for the objects stored directly in the
    /// file and a cross-reference stream, referenced by `/XRefStm`, for the compressed
    /// ones.
    pub fn hybrid_xref(mut self, num: u32, trailer: &str) -> Self {
        let (compressed, direct): (BTreeMap<_, _>, BTreeMap<_, _>) = self
            .take_pending()
            .into_iter()
            .partition(|(_, e)| matches!(e, Entry::Compressed(..)));

        self.max_num = self.max_num.max(num);
        let trailer = self.trailer_entries(trailer);
        let stream_offset = self.write_xref_stream(num, &compressed, &trailer);

        let mut direct = direct;
        direct.insert(num, Entry::InUse(stream_offset));
        self.pending.clear();

        self.write_table(direct, &format!("{trailer} /XRefStm {stream_offset}"));
        self
    }

    fn write_xref_stream(
        &mut self,
        num: u32,
        entries: &BTreeMap<u32, Entry>,
        trailer: &str,
    ) -> usize {
        let mut data = vec![];
        let mut index = String::new();

        for (start, run) in runs(entries) {
            index.push_str(&format!("{start} {} ", run.len()));

            for entry in run {
                let (kind, f2, f3) = match *entry {
                    Entry::Free => (0_u8, 0_u32, 65535_u16),
                    Entry::InUse(offset) => (1, offset as u32, 0),
                    Entry::Compressed(stream, index) => (2, stream, index as u16),
                };
                data.push(kind);
                data.extend_from_slice(&f2.to_be_bytes());
                data.extend_from_slice(&f3.to_be_bytes());
            }
        }

        let entries = format!(
            "/Type /XRef /W [1 4 2] /Index [{}] /Filter /FlateDecode {trailer}",
            index.trim_end()
        );

        self.write_stream(num, &entries, &deflate(&data))
    }

    /// Return the finished file.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

fn runs(entries: &BTreeMap<u32, Entry>) -> Vec<(u32, Vec<&Entry>)> {
    let mut runs: Vec<(u32, Vec<&Entry>)> = vec![];

    for (num, entry) in entries {
        match runs.last_mut() {
            Some((start, run)) if *start + run.len() as u32 == *num => run.push(entry),
            _ => runs.push((*num, vec![entry])),
        }
    }

    runs
}

/// Compress data with zlib.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A document with a catalog, a page tree and the given pages, finished with a classic
/// cross-reference table. Page `i` is object `3 + i`.
pub fn simple_document(version: &str, pages: &[&str]) -> Vec<u8> {
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 3 + i)).collect();

    let mut builder = PdfBuilder::new(version)
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(
            2,
            &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
        );

    for (i, page) in pages.iter().enumerate() {
        builder = builder.object(3 + i as u32, &format!("<< /Type /Page /Parent 2 0 R {page} >>"));
    }

    builder
        .xref_table("/Root 1 0 R /ID [<0123> <0123>]")
        .finish()
}
