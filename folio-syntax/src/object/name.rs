//! Names.

use std::borrow::{Borrow, Cow};
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

/// A PDF name, with `#xx` escape sequences already decoded.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Name(Vec<u8>);

impl Name {
    /// Create a name from already decoded bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self(data.into())
    }

    /// Create a name from the raw bytes of a name token, decoding `#xx` escapes.
    ///
    /// An invalid escape sequence is kept verbatim.
    pub fn from_raw(raw: &[u8]) -> Self {
        if !raw.contains(&b'#') {
            return Self(raw.to_vec());
        }

        let mut decoded = Vec::with_capacity(raw.len());
        let mut i = 0;

        while i < raw.len() {
            if raw[i] == b'#' {
                let escape = raw.get(i + 1..i + 3).and_then(|h| Some((hex(h[0])?, hex(h[1])?)));

                if let Some((hi, lo)) = escape {
                    decoded.push(hi << 4 | lo);
                    i += 3;
                    continue;
                }
            }

            decoded.push(raw[i]);
            i += 1;
        }

        Self(decoded)
    }

    /// Return the bytes of the name.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the name as a string, replacing invalid UTF-8 sequences.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

fn hex(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'0'..=b'9' => Some(c - b'0'),
        _ => None,
    }
}

impl Deref for Name {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<[u8]> for Name {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Name {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl Debug for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
