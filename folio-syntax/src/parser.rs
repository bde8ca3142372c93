//! A recursive-descent parser turning tokens into objects.

use crate::data::PdfData;
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::object::dict::keys::LENGTH;
use crate::object::{
    Dict, LengthStatus, Name, NoResolve, Object, ObjectId, PdfString, Resolve, Stream,
};
use crate::reader::Reader;
use crate::trivia::is_white_space_character;
use smallvec::SmallVec;
use std::cell::OnceCell;

/// The default maximum nesting depth of arrays and dictionaries.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The positions of all `endstream` keywords of a buffer, collected on first use.
///
/// Recovering streams with a wrong `/Length` searches for the next `endstream`. Sharing
/// an index between the parsers of one buffer keeps that search from rescanning the
/// rest of the file for every such stream.
#[derive(Debug, Default)]
pub(crate) struct EndstreamIndex(OnceCell<Vec<usize>>);

impl EndstreamIndex {
    /// The position of the first `endstream` keyword at or after `start`. `data` must be
    /// the same buffer on every call.
    pub(crate) fn find(&self, data: &[u8], start: usize) -> Option<usize> {
        let positions = self
            .0
            .get_or_init(|| memchr::memmem::find_iter(data, b"endstream").collect());

        positions
            .get(positions.partition_point(|p| *p < start))
            .copied()
    }
}

/// A parser for PDF objects.
///
/// The parser is independent of any cross-reference data, except that the `/Length` of
/// a stream may be an indirect reference, which is looked up through an optional
/// [`Resolve`] implementation.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    data: &'a PdfData,
    lookahead: SmallVec<[Token<'a>; 3]>,
    max_depth: usize,
    resolver: &'a dyn Resolve,
    endstreams: Option<&'a EndstreamIndex>,
}

impl<'a> Parser<'a> {
    /// Create a new parser reading from the given offset.
    pub fn new(data: &'a PdfData, offset: usize) -> Self {
        Self {
            lexer: Lexer::new_at(data.as_ref(), offset),
            data,
            lookahead: SmallVec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            resolver: &NoResolve,
            endstreams: None,
        }
    }

    /// Set the maximum nesting depth of arrays and dictionaries.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the resolver used for indirect stream lengths.
    pub fn with_resolver(mut self, resolver: &'a dyn Resolve) -> Self {
        self.resolver = resolver;
        self
    }

    /// Look up `endstream` keywords in a shared index instead of searching the data.
    pub(crate) fn with_endstreams(mut self, index: &'a EndstreamIndex) -> Self {
        self.endstreams = Some(index);
        self
    }

    /// The offset of the next unconsumed token.
    pub fn position(&self) -> usize {
        self.lookahead
            .first()
            .map(|t| t.offset)
            .unwrap_or_else(|| self.lexer.position())
    }

    fn fill(&mut self, n: usize) {
        while self.lookahead.len() < n {
            match self.lexer.next_token() {
                Some(Token {
                    kind: TokenKind::Comment(_),
                    ..
                }) => {}
                Some(t) => self.lookahead.push(t),
                None => return,
            }
        }
    }

    fn peek(&mut self, n: usize) -> Option<&Token<'a>> {
        self.fill(n + 1);
        self.lookahead.get(n)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        self.fill(1);

        if self.lookahead.is_empty() {
            None
        } else {
            Some(self.lookahead.remove(0))
        }
    }

    fn peek_keyword(&mut self, keyword: &[u8]) -> bool {
        self.peek(0).is_some_and(|t| t.is_keyword(keyword))
    }

    /// Parse a single direct object.
    pub fn parse_object(&mut self) -> Result<Object, ParseError> {
        self.parse_inner(0)
    }

    /// Parse an indirect object of the form `N G obj ... endobj`.
    ///
    /// A dictionary directly followed by `stream` becomes a stream. The trailing
    /// `endobj` is optional.
    pub fn parse_indirect(&mut self) -> Result<(ObjectId, Object), ParseError> {
        let id = self.parse_object_header()?;

        let object = if self.peek_keyword(b"endobj") {
            Object::Null
        } else {
            self.parse_inner(0)?
        };

        let object = match object {
            Object::Dict(dict) if self.peek_keyword(b"stream") => {
                let Some(keyword) = self.next() else {
                    return Err(ParseError::UnexpectedEof);
                };
                self.read_stream(dict, keyword.end)
            }
            other => other,
        };

        if self.peek_keyword(b"endobj") {
            self.next();
        }

        Ok((id, object))
    }

    /// Parse the `N G obj` header of an indirect object.
    pub fn parse_object_header(&mut self) -> Result<ObjectId, ParseError> {
        let unexpected = |t: Option<&Token<'_>>| match t {
            Some(t) => ParseError::UnexpectedToken { offset: t.offset },
            None => ParseError::UnexpectedEof,
        };

        let num = match self.peek(0).map(|t| &t.kind) {
            Some(TokenKind::Integer(n)) => u32::try_from(*n).ok(),
            _ => None,
        };
        let gen_num = match self.peek(1).map(|t| &t.kind) {
            Some(TokenKind::Integer(n)) => u16::try_from(*n).ok(),
            _ => None,
        };

        match (num, gen_num) {
            (Some(num), Some(gen_num)) if self.peek(2).is_some_and(|t| t.is_keyword(b"obj")) => {
                self.lookahead.drain(..3);
                Ok(ObjectId::new(num, gen_num))
            }
            (None, _) => Err(unexpected(self.peek(0))),
            (_, None) => Err(unexpected(self.peek(1))),
            _ => Err(unexpected(self.peek(2))),
        }
    }

    fn parse_inner(&mut self, depth: usize) -> Result<Object, ParseError> {
        let token = self.next().ok_or(ParseError::UnexpectedEof)?;

        let object = match token.kind {
            TokenKind::Integer(num) => {
                if let Some(id) = self.try_reference(num) {
                    Object::Reference(id)
                } else {
                    Object::Integer(num)
                }
            }
            TokenKind::Real(r) => Object::Real(r),
            TokenKind::LiteralString(raw) => Object::String(PdfString::from_literal(raw)),
            TokenKind::HexString(raw) => Object::String(PdfString::from_hex(raw)),
            TokenKind::Name(raw) => Object::Name(Name::from_raw(raw)),
            TokenKind::Keyword(b"true") => Object::Boolean(true),
            TokenKind::Keyword(b"false") => Object::Boolean(false),
            TokenKind::Keyword(b"null") => Object::Null,
            TokenKind::ArrayStart => {
                self.check_depth(depth)?;
                let mut items = vec![];

                loop {
                    match self.peek(0).map(|t| &t.kind) {
                        Some(TokenKind::ArrayEnd) => {
                            self.next();
                            break;
                        }
                        Some(_) => items.push(self.parse_inner(depth + 1)?),
                        None => return Err(ParseError::UnexpectedEof),
                    }
                }

                Object::Array(items)
            }
            TokenKind::DictStart => {
                self.check_depth(depth)?;
                Object::Dict(self.parse_dict_entries(depth)?)
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    offset: token.offset,
                });
            }
        };

        Ok(object)
    }

    fn parse_dict_entries(&mut self, depth: usize) -> Result<Dict, ParseError> {
        let mut dict = Dict::new();

        loop {
            let token = self.next().ok_or(ParseError::UnexpectedEof)?;

            match token.kind {
                TokenKind::DictEnd => return Ok(dict),
                TokenKind::Name(raw) => {
                    let key = Name::from_raw(raw);

                    // A key without a value right before the end is read as `null`.
                    let value = match self.peek(0).map(|t| &t.kind) {
                        Some(TokenKind::DictEnd) => Object::Null,
                        _ => self.parse_inner(depth + 1)?,
                    };

                    dict.insert(key, value);
                }
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        offset: token.offset,
                    });
                }
            }
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth >= self.max_depth {
            Err(ParseError::StructuralLimit {
                limit: self.max_depth,
            })
        } else {
            Ok(())
        }
    }

    fn try_reference(&mut self, num: i64) -> Option<ObjectId> {
        let num = u32::try_from(num).ok()?;

        let gen_num = match self.peek(0)?.kind {
            TokenKind::Integer(g) => u16::try_from(g).ok()?,
            _ => return None,
        };

        if !self.peek(1)?.is_keyword(b"R") {
            return None;
        }

        self.lookahead.drain(..2);

        Some(ObjectId::new(num, gen_num))
    }

    fn read_stream(&mut self, dict: Dict, keyword_end: usize) -> Object {
        let data = self.data.as_ref();
        let mut r = Reader::new_at(data, keyword_end);
        // Some writers put spaces between the keyword and the end-of-line marker.
        r.forward_while(|b| b == b' ' || b == b'\t');
        r.skip_eol();
        let start = r.offset();

        let declared = match dict.get(LENGTH) {
            Some(length) => self
                .resolver
                .resolve(length)
                .as_i64()
                .and_then(|l| u64::try_from(l).ok()),
            None => None,
        };

        if let Some(len) = declared {
            let end = usize::try_from(len).ok().and_then(|l| start.checked_add(l));

            if let Some(end) = end.filter(|e| *e <= data.len()) {
                let mut r = Reader::new_at(data, end);
                r.forward_while(is_white_space_character);

                if r.forward_tag(b"endstream").is_some() {
                    self.seek(r.offset());
                    return self.stream(dict, start..end, LengthStatus::Exact);
                }
            }
        }

        let marker = match self.endstreams {
            Some(index) => index.find(data, start),
            None => data
                .get(start..)
                .and_then(|tail| memchr::memmem::find(tail, b"endstream"))
                .map(|found| start + found),
        };

        match marker {
            Some(marker) => {
                let mut end = marker;

                // The end-of-line marker before `endstream` is not part of the data.
                if end > start && data[end - 1] == b'\n' {
                    end -= 1;
                }
                if end > start && data[end - 1] == b'\r' {
                    end -= 1;
                }

                lwarn!(
                    "stream length {:?} is wrong, recovered {} bytes by searching for endstream",
                    declared,
                    end - start
                );

                self.seek(marker + b"endstream".len());
                self.stream(dict, start..end, LengthStatus::Recovered { declared })
            }
            None => {
                ldebug!("no endstream keyword found for stream at offset {}", start);
                Object::Dict(dict)
            }
        }
    }

    fn stream(&self, dict: Dict, range: std::ops::Range<usize>, status: LengthStatus) -> Object {
        Object::Stream(Stream::new(dict, self.data.clone(), range, status))
    }

    fn seek(&mut self, offset: usize) {
        self.lookahead.clear();
        self.lexer.seek(offset);
    }
}
