use crate::trivia::is_white_space_character;

/// Decode ASCII hex data. The closing `>` is optional and an odd number of digits is
/// padded with a zero.
pub(crate) fn decode(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoded = Vec::with_capacity(data.len() / 2 + 1);
    let mut high = None;

    for b in data.iter().copied() {
        if is_white_space_character(b) {
            continue;
        }

        if b == b'>' {
            break;
        }

        let nibble = val(b)?;

        match high.take() {
            Some(h) => decoded.push(h << 4 | nibble),
            None => high = Some(nibble),
        }
    }

    if let Some(h) = high {
        decoded.push(h << 4);
    }

    Some(decoded)
}

fn val(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'0'..=b'9' => Some(c - b'0'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::decode;

    #[test]
    fn decode_simple() {
        assert_eq!(decode(b"AF3E2901>").unwrap(), vec![0xaf, 0x3e, 0x29, 0x01]);
    }

    #[test]
    fn decode_whitespaces() {
        assert_eq!(decode(b"AF3   E2 \n  901>").unwrap(), vec![0xaf, 0x3e, 0x29, 0x01]);
    }

    #[test]
    fn decode_without_gt() {
        assert_eq!(decode(b"AF3E2901").unwrap(), vec![0xaf, 0x3e, 0x29, 0x01]);
    }

    #[test]
    fn decode_with_padding() {
        assert_eq!(decode(b"AF3E291>").unwrap(), vec![0xaf, 0x3e, 0x29, 0x10]);
    }

    #[test]
    fn invalid_digit() {
        assert!(decode(b"AG>").is_none());
    }
}
