//! Object streams.

use crate::data::PdfData;
use crate::error::ParseError;
use crate::filter::DecodeLimits;
use crate::lexer::{Lexer, TokenKind};
use crate::object::dict::keys::{CATALOG, FIRST, N};
use crate::object::{Object, ObjectId, Resolve, Stream};
use crate::parser::Parser;

/// A decoded object stream.
///
/// The decoded data starts with `N` pairs of integers, each being an object number and
/// the offset of that object relative to `/First`.
#[derive(Debug, Clone)]
pub struct ObjectStream {
    data: PdfData,
    first: usize,
    headers: Vec<(u32, usize)>,
}

impl ObjectStream {
    /// Decode an object stream. Returns `None` if the stream is not a valid object
    /// stream or cannot be decoded.
    pub fn new(stream: &Stream, resolver: &dyn Resolve, limits: &DecodeLimits) -> Option<Self> {
        let dict = stream.dict();
        let n = usize::try_from(dict.get_int(N)?).ok()?;
        let first = usize::try_from(dict.get_int(FIRST)?).ok()?;

        let decoded = stream
            .decoded(resolver, limits)
            .inspect_err(|e| {
                lwarn!("failed to decode object stream: {}", e);
            })
            .ok()?;

        let header = decoded.get(..first.min(decoded.len()))?;
        let mut lexer = Lexer::new(header);
        let mut headers = vec![];

        while headers.len() < n {
            let (Some(num), Some(offset)) = (lexer.next_token(), lexer.next_token()) else {
                lwarn!("object stream header ended after {} of {} objects", headers.len(), n);
                break;
            };

            let (TokenKind::Integer(num), TokenKind::Integer(offset)) = (num.kind, offset.kind)
            else {
                break;
            };

            let (Ok(num), Ok(offset)) = (u32::try_from(num), usize::try_from(offset)) else {
                break;
            };

            headers.push((num, offset));
        }

        Some(Self {
            data: PdfData::from(decoded),
            first,
            headers,
        })
    }

    /// The number of objects listed in the header.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the header lists no objects.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// The object numbers listed in the header, in order.
    pub fn object_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.headers.iter().map(|(num, _)| *num)
    }

    /// Parse the object at `index`, which must be object number `expected`.
    ///
    /// If the header lists a different object at that index, but lists `expected`
    /// elsewhere, that one is used instead.
    pub fn get(
        &self,
        index: usize,
        expected: u32,
        max_depth: usize,
        resolver: &dyn Resolve,
    ) -> Result<Object, ParseError> {
        let offset = match self.headers.get(index) {
            Some((num, offset)) if *num == expected => *offset,
            other => {
                let found = other.map(|(num, _)| *num).unwrap_or(0);

                self.headers
                    .iter()
                    .find(|(num, _)| *num == expected)
                    .map(|(_, offset)| *offset)
                    .ok_or(ParseError::ObjectMismatch { expected, found })?
            }
        };

        let start = self.first.checked_add(offset).ok_or(ParseError::UnexpectedEof)?;

        if start >= self.data.len() {
            return Err(ParseError::UnexpectedEof);
        }

        Parser::new(&self.data, start)
            .with_max_depth(max_depth)
            .with_resolver(resolver)
            .parse_object()
    }

    /// Find the last catalog dictionary stored in this object stream.
    pub(crate) fn find_catalog(&self, max_depth: usize) -> Option<ObjectId> {
        self.headers
            .iter()
            .enumerate()
            .rev()
            .find(|(index, (num, _))| {
                self.get(*index, *num, max_depth, &crate::object::NoResolve)
                    .is_ok_and(|o| o.as_dict().is_some_and(|d| d.is_type(CATALOG)))
            })
            .map(|(_, (num, _))| ObjectId::new(*num, 0))
    }
}
