use crate::error::FilterError;
use crate::filter::DecodeLimits;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// Inflate zlib data, falling back to raw deflate data without a zlib header.
///
/// Truncated or corrupted streams keep whatever could be inflated before the error.
pub(crate) fn decode(data: &[u8], limits: &DecodeLimits) -> Result<Vec<u8>, FilterError> {
    match inflate(ZlibDecoder::new(data), limits)? {
        Some(decoded) => Ok(decoded),
        None => inflate(DeflateDecoder::new(data), limits)?.ok_or(FilterError::Malformed {
            filter: "FlateDecode",
        }),
    }
}

fn inflate(reader: impl Read, limits: &DecodeLimits) -> Result<Option<Vec<u8>>, FilterError> {
    let mut decoded = Vec::new();
    // Read one byte more than allowed to tell "exactly at the limit" from "above it".
    let mut limited = reader.take((limits.max_output_len as u64).saturating_add(1));

    let result = limited.read_to_end(&mut decoded);
    limits.check(decoded.len())?;

    match result {
        Ok(_) => Ok(Some(decoded)),
        Err(_) if !decoded.is_empty() => {
            lwarn!("flate stream is corrupt, keeping {} decoded bytes", decoded.len());
            Ok(Some(decoded))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::error::FilterError;
    use crate::filter::DecodeLimits;
    use flate2::Compression;
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut e = ZlibEncoder::new(Vec::new(), Compression::default());
        e.write_all(data).unwrap();
        e.finish().unwrap()
    }

    #[test]
    fn zlib_stream() {
        let encoded = zlib(b"hello hello hello");
        assert_eq!(
            decode(&encoded, &DecodeLimits::default()).unwrap(),
            b"hello hello hello"
        );
    }

    #[test]
    fn raw_deflate_stream() {
        let mut e = DeflateEncoder::new(Vec::new(), Compression::default());
        e.write_all(b"no zlib header").unwrap();
        let encoded = e.finish().unwrap();

        assert_eq!(
            decode(&encoded, &DecodeLimits::default()).unwrap(),
            b"no zlib header"
        );
    }

    #[test]
    fn garbage() {
        assert!(decode(b"\xff\xff\xff\xff", &DecodeLimits::default()).is_err());
    }

    #[test]
    fn bomb() {
        let encoded = zlib(&vec![0; 10_000]);
        let limits = DecodeLimits { max_output_len: 1000 };
        assert_eq!(
            decode(&encoded, &limits),
            Err(FilterError::LimitExceeded { limit: 1000 })
        );
    }
}
