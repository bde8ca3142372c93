//! Splitting raw PDF bytes into tokens.
//!
//! The lexer only classifies bytes. It does not decode escape sequences in strings or
//! names, and it never looks inside stream bodies: when the parser meets a `stream`
//! keyword it reads the body itself and then [`Lexer::seek`]s past it.

use crate::reader::Reader;
use crate::trivia::{is_eol_character, is_regular_character, is_white_space_character};

/// The class of a token, together with its raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `<<`
    DictStart,
    /// `>>`
    DictEnd,
    /// `{`, only valid in PostScript calculator functions.
    BraceOpen,
    /// `}`
    BraceClose,
    /// A number without a decimal point.
    Integer(i64),
    /// A number with a decimal point, or an integer too large for `i64`.
    Real(f64),
    /// The raw bytes between the outer parentheses of a literal string.
    LiteralString(&'a [u8]),
    /// The raw bytes between the angle brackets of a hex string.
    HexString(&'a [u8]),
    /// The raw bytes after the solidus of a name, with `#xx` escapes still in place.
    Name(&'a [u8]),
    /// Any other run of regular characters, like `obj`, `R` or `true`.
    Keyword(&'a [u8]),
    /// A comment, without the leading `%`.
    Comment(&'a [u8]),
}

/// A token together with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// What was read.
    pub kind: TokenKind<'a>,
    /// Byte offset of the first byte of the token.
    pub offset: usize,
    /// Byte offset one past the last byte of the token.
    pub end: usize,
}

impl Token<'_> {
    /// Whether this token is the given keyword.
    pub fn is_keyword(&self, keyword: &[u8]) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k == keyword)
    }
}

/// A lazy, restartable token iterator over a byte slice.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    reader: Reader<'a>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer at the start of the data.
    pub fn new(data: &'a [u8]) -> Self {
        Self::new_at(data, 0)
    }

    /// Create a new lexer at the given byte offset.
    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Self {
            reader: Reader::new_at(data, offset),
            failed: false,
        }
    }

    /// The offset the next token will be read from (before skipping white space).
    pub fn position(&self) -> usize {
        self.reader.offset()
    }

    /// Restart lexing at a different offset.
    pub fn seek(&mut self, offset: usize) {
        self.reader.jump(offset);
        self.failed = false;
    }

    /// Whether lexing stopped because of an unrecoverable byte sequence, as opposed to
    /// reaching the end of the input.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// The underlying data.
    pub fn data(&self) -> &'a [u8] {
        self.reader.data()
    }

    /// Read the next token, including comments.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.failed {
            return None;
        }

        self.reader.skip_white_spaces();
        let offset = self.reader.offset();

        let kind = match self.read_kind() {
            Some(kind) => kind,
            None => {
                self.failed = !self.reader.at_end() || offset != self.reader.offset();
                self.reader.jump(offset);
                return None;
            }
        };

        Some(Token {
            kind,
            offset,
            end: self.reader.offset(),
        })
    }

    fn read_kind(&mut self) -> Option<TokenKind<'a>> {
        let r = &mut self.reader;

        match r.peek_byte()? {
            b'[' => {
                r.forward();
                Some(TokenKind::ArrayStart)
            }
            b']' => {
                r.forward();
                Some(TokenKind::ArrayEnd)
            }
            b'{' => {
                r.forward();
                Some(TokenKind::BraceOpen)
            }
            b'}' => {
                r.forward();
                Some(TokenKind::BraceClose)
            }
            b'<' => {
                if r.forward_tag(b"<<").is_some() {
                    Some(TokenKind::DictStart)
                } else {
                    read_hex_string(r).map(TokenKind::HexString)
                }
            }
            b'>' => {
                r.forward_tag(b">>")?;
                Some(TokenKind::DictEnd)
            }
            b'(' => read_literal_string(r).map(TokenKind::LiteralString),
            b'/' => {
                r.forward();
                let start = r.offset();
                r.forward_while(is_regular_character);
                r.range(start..r.offset()).map(TokenKind::Name)
            }
            b'%' => {
                r.forward();
                let start = r.offset();
                r.forward_while(|b| !is_eol_character(b));
                r.range(start..r.offset()).map(TokenKind::Comment)
            }
            b')' => None,
            _ => {
                let start = r.offset();
                r.forward_while_1(is_regular_character)?;
                let raw = r.range(start..r.offset())?;

                Some(parse_number(raw).unwrap_or(TokenKind::Keyword(raw)))
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn read_hex_string<'a>(r: &mut Reader<'a>) -> Option<&'a [u8]> {
    r.forward_tag(b"<")?;
    let start = r.offset();
    r.forward_while(|b| b.is_ascii_hexdigit() || is_white_space_character(b));
    let end = r.offset();
    r.forward_tag(b">")?;

    r.range(start..end)
}

fn read_literal_string<'a>(r: &mut Reader<'a>) -> Option<&'a [u8]> {
    r.forward_tag(b"(")?;
    let start = r.offset();
    let mut depth = 1_usize;

    loop {
        match r.read_byte()? {
            b'\\' => {
                // Escaped byte, whatever it is, does not affect nesting.
                r.read_byte()?;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;

                if depth == 0 {
                    return r.range(start..r.offset() - 1);
                }
            }
            _ => {}
        }
    }
}

/// Parse PDF numeric syntax: an optional sign, digits with at most one decimal point
/// anywhere (including leading or trailing), no exponent.
pub(crate) fn parse_number(raw: &[u8]) -> Option<TokenKind<'static>> {
    let digits = match raw.first()? {
        b'+' | b'-' => &raw[1..],
        _ => raw,
    };

    let mut dots = 0;
    let mut seen_digit = false;

    for b in digits.iter().copied() {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' => dots += 1,
            _ => return None,
        }
    }

    if !seen_digit || dots > 1 {
        return None;
    }

    let text = std::str::from_utf8(raw).ok()?;
    let text = text.strip_prefix('+').unwrap_or(text);

    if dots == 0
        && let Ok(i) = text.parse::<i64>()
    {
        return Some(TokenKind::Integer(i));
    }

    // Either a real, or an integer too large for `i64`.
    text.parse::<f64>().ok().map(TokenKind::Real)
}

#[cfg(test)]
mod tests {
    use super::{Lexer, TokenKind};

    fn kinds(data: &[u8]) -> Vec<TokenKind<'_>> {
        Lexer::new(data).map(|t| t.kind).collect()
    }

    #[test]
    fn delimiters() {
        assert_eq!(
            kinds(b"[<<>>]{}"),
            vec![
                TokenKind::ArrayStart,
                TokenKind::DictStart,
                TokenKind::DictEnd,
                TokenKind::ArrayEnd,
                TokenKind::BraceOpen,
                TokenKind::BraceClose
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds(b"12 -7 +3 4. .5 -.002 0.0"),
            vec![
                TokenKind::Integer(12),
                TokenKind::Integer(-7),
                TokenKind::Integer(3),
                TokenKind::Real(4.0),
                TokenKind::Real(0.5),
                TokenKind::Real(-0.002),
                TokenKind::Real(0.0),
            ]
        );
    }

    #[test]
    fn not_numbers() {
        assert_eq!(
            kinds(b"1e5 -- . 1.2.3"),
            vec![
                TokenKind::Keyword(b"1e5"),
                TokenKind::Keyword(b"--"),
                TokenKind::Keyword(b"."),
                TokenKind::Keyword(b"1.2.3"),
            ]
        );
    }

    #[test]
    fn huge_integer_becomes_real() {
        assert_eq!(
            kinds(b"99999999999999999999"),
            vec![TokenKind::Real(1e20)]
        );
    }

    #[test]
    fn strings_and_names() {
        assert_eq!(
            kinds(b"(a (nested\\)) string) <48 65> /Na#20me /"),
            vec![
                TokenKind::LiteralString(b"a (nested\\)) string"),
                TokenKind::HexString(b"48 65"),
                TokenKind::Name(b"Na#20me"),
                TokenKind::Name(b""),
            ]
        );
    }

    #[test]
    fn comments_and_offsets() {
        let tokens: Vec<_> = Lexer::new(b"%PDF-1.7\n1 0 obj").collect();
        assert_eq!(tokens[0].kind, TokenKind::Comment(b"PDF-1.7"));
        assert_eq!(tokens[1].offset, 9);
        assert!(tokens[3].is_keyword(b"obj"));
        assert_eq!(tokens[3].end, 16);
    }

    #[test]
    fn unterminated_string_stops() {
        let mut lexer = Lexer::new(b"1 (never closed");
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Integer(1)));
        assert_eq!(lexer.next(), None);
        assert!(lexer.failed());
    }

    #[test]
    fn end_of_input_is_not_failure() {
        let mut lexer = Lexer::new(b"true  ");
        assert!(lexer.next().is_some());
        assert_eq!(lexer.next(), None);
        assert!(!lexer.failed());
    }

    #[test]
    fn restart() {
        let mut lexer = Lexer::new(b"1 2 3");
        lexer.next();
        let pos = lexer.position();
        let rest: Vec<_> = lexer.clone().map(|t| t.kind).collect();
        lexer.seek(pos);
        assert_eq!(rest, lexer.map(|t| t.kind).collect::<Vec<_>>());
    }
}
