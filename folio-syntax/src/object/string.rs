//! Strings.

use crate::reader::Reader;
use crate::trivia::is_white_space_character;
use std::fmt::{Debug, Formatter};

/// A PDF string.
///
/// The bytes are stored after escape decoding, but the text encoding
/// (`PDFDocEncoding` or UTF-16) is left to the consumer.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct PdfString(Vec<u8>);

impl PdfString {
    /// Create a string from already decoded bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self(data.into())
    }

    /// Decode the raw content of a literal string token.
    pub fn from_literal(raw: &[u8]) -> Self {
        Self(decode_literal(raw))
    }

    /// Decode the raw content of a hex string token.
    pub fn from_hex(raw: &[u8]) -> Self {
        Self(decode_hex(raw))
    }

    /// Return the bytes of the string.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Interpret the string as text.
    ///
    /// Strings with a UTF-16BE byte order mark are decoded as such, all other strings are
    /// treated as Latin-1, which matches `PDFDocEncoding` for all printable ASCII.
    pub fn to_text(&self) -> String {
        if let Some(utf16) = self.0.strip_prefix(&[0xfe, 0xff]) {
            let units = utf16
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]));

            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        } else {
            self.0.iter().map(|b| char::from(*b)).collect()
        }
    }
}

impl Debug for PdfString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", String::from_utf8_lossy(&self.0))
    }
}

#[inline(always)]
fn is_octal_digit(byte: u8) -> bool {
    matches!(byte, b'0'..=b'7')
}

fn decode_literal(raw: &[u8]) -> Vec<u8> {
    if !raw.iter().any(|b| matches!(b, b'\\' | b'\r')) {
        return raw.to_vec();
    }

    let mut decoded = Vec::with_capacity(raw.len());
    let mut r = Reader::new(raw);

    while let Some(byte) = r.read_byte() {
        match byte {
            b'\\' => {
                let Some(next) = r.read_byte() else {
                    break;
                };

                if is_octal_digit(next) {
                    // Up to three octal digits, high-order overflow is ignored.
                    let mut value = u32::from(next - b'0');

                    for _ in 0..2 {
                        match r.eat(is_octal_digit) {
                            Some(d) => value = value * 8 + u32::from(d - b'0'),
                            None => break,
                        }
                    }

                    decoded.push((value & 0xff) as u8);
                } else {
                    match next {
                        b'n' => decoded.push(0x0a),
                        b'r' => decoded.push(0x0d),
                        b't' => decoded.push(0x09),
                        b'b' => decoded.push(0x08),
                        b'f' => decoded.push(0x0c),
                        // A backslash before an end-of-line marker splits the string
                        // over two lines without contributing any bytes.
                        b'\r' => {
                            r.eat(|b| b == b'\n');
                        }
                        b'\n' => {}
                        // Unknown escapes, as well as `\(`, `\)` and `\\`, keep the byte.
                        other => decoded.push(other),
                    }
                }
            }
            // Any unescaped end-of-line marker reads as a single line feed.
            b'\r' => {
                r.eat(|b| b == b'\n');
                decoded.push(0x0a);
            }
            other => decoded.push(other),
        }
    }

    decoded
}

fn decode_hex(raw: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(raw.len() / 2 + 1);
    let mut high: Option<u8> = None;

    for b in raw.iter().copied() {
        if is_white_space_character(b) {
            continue;
        }

        let Some(nibble) = (b as char).to_digit(16) else {
            continue;
        };
        let nibble = nibble as u8;

        match high.take() {
            Some(h) => decoded.push(h << 4 | nibble),
            None => high = Some(nibble),
        }
    }

    // An odd number of digits behaves as if a final zero followed.
    if let Some(h) = high {
        decoded.push(h << 4);
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::PdfString;

    fn literal(raw: &[u8]) -> Vec<u8> {
        PdfString::from_literal(raw).as_bytes().to_vec()
    }

    #[test]
    fn literal_plain() {
        assert_eq!(literal(b"Hi there"), b"Hi there");
    }

    #[test]
    fn literal_escapes() {
        assert_eq!(literal(b"a\\nb\\tc\\(d\\)\\\\"), b"a\nb\tc(d)\\");
    }

    #[test]
    fn literal_octal() {
        assert_eq!(literal(b"\\101\\53\\0053"), b"A+\x053");
        assert_eq!(literal(b"\\7"), b"\x07");
    }

    #[test]
    fn literal_line_continuation() {
        assert_eq!(literal(b"one\\\r\ntwo\\\nthree"), b"onetwothree");
    }

    #[test]
    fn literal_eol_normalization() {
        assert_eq!(literal(b"a\r\nb\rc\nd"), b"a\nb\nc\nd");
    }

    #[test]
    fn literal_unknown_escape() {
        assert_eq!(literal(b"\\q"), b"q");
    }

    #[test]
    fn hex_pairs() {
        assert_eq!(PdfString::from_hex(b"48 65 6c6C6f").as_bytes(), b"Hello");
    }

    #[test]
    fn hex_odd_length() {
        assert_eq!(PdfString::from_hex(b"901FA").as_bytes(), &[0x90, 0x1f, 0xa0]);
    }

    #[test]
    fn utf16_text() {
        let s = PdfString::new(vec![0xfe, 0xff, 0x00, 0x48, 0x00, 0x69]);
        assert_eq!(s.to_text(), "Hi");
        assert_eq!(PdfString::new(b"plain".to_vec()).to_text(), "plain");
    }
}
