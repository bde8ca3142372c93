//! A decoder for ASCII-85-encoded streams.

use crate::trivia::is_white_space_character;

/// Decode an ASCII-85-encoded stream. The `~>` end marker is optional.
pub(crate) fn decode(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoded = Vec::with_capacity(data.len() * 4 / 5);
    let mut group = [0_u8; 5];
    let mut len = 0;

    let data = data.strip_prefix(b"<~").unwrap_or(data);

    for b in data.iter().copied() {
        if is_white_space_character(b) {
            continue;
        }

        match b {
            b'~' => break,
            b'z' if len == 0 => decoded.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[len] = b - b'!';
                len += 1;

                if len == 5 {
                    decoded.extend_from_slice(&word(group)?);
                    len = 0;
                }
            }
            _ => return None,
        }
    }

    match len {
        0 => {}
        // A single trailing character cannot encode any byte.
        1 => return None,
        _ => {
            // Pad with the highest digit and drop the bytes that came from padding.
            group[len..].fill(84);
            let last = word(group)?;
            decoded.extend_from_slice(&last[..len - 1]);
        }
    }

    Some(decoded)
}

fn word(digits: [u8; 5]) -> Option<[u8; 4]> {
    let value = digits
        .iter()
        .fold(0_u64, |acc, d| acc * 85 + u64::from(*d));

    // 85^5 > 256^4, so not every group fits.
    Some(u32::try_from(value).ok()?.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::decode;

    #[test]
    fn decode_simple() {
        assert_eq!(decode(b"87cURDZ~>").unwrap(), b"Hello");
    }

    #[test]
    fn decode_spaces() {
        assert_eq!(decode(b"87  cURD\n  Z~>").unwrap(), b"Hello");
    }

    #[test]
    fn decode_zeroes() {
        assert_eq!(decode(b"z~>").unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn decode_full_group_and_prefix() {
        assert_eq!(decode(b"<~9jqo^~>").unwrap(), b"Man ");
    }

    #[test]
    fn invalid_character() {
        assert!(decode(b"87cU{RDZ~>").is_none());
    }

    #[test]
    fn overflowing_group() {
        assert!(decode(b"uuuuu~>").is_none());
    }
}
