use crate::error::FilterError;
use crate::filter::DecodeLimits;
use crate::reader::Reader;

/// Decode run-length encoded data. A missing end-of-data marker is tolerated.
pub(crate) fn decode(data: &[u8], limits: &DecodeLimits) -> Result<Vec<u8>, FilterError> {
    let mut reader = Reader::new(data);
    let mut decoded = vec![];

    loop {
        let Some(length) = reader.read_byte() else {
            lwarn!("run-length stream ended without EOD marker");
            break;
        };

        match length {
            128 => break,
            0..=127 => match reader.read_bytes(length as usize + 1) {
                Some(run) => decoded.extend_from_slice(run),
                None => {
                    lwarn!("run-length stream ended prematurely");
                    decoded.extend_from_slice(reader.tail().unwrap_or_default());
                    break;
                }
            },
            _ => {
                let Some(byte) = reader.read_byte() else {
                    break;
                };
                let count = 257 - length as usize;
                decoded.resize(decoded.len() + count, byte);
            }
        }

        limits.check(decoded.len())?;
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::error::FilterError;
    use crate::filter::DecodeLimits;

    #[test]
    fn run_length() {
        let input = [4, 10, 11, 12, 13, 14, 253, 3, 128];
        assert_eq!(
            decode(&input, &DecodeLimits::default()).unwrap(),
            vec![10, 11, 12, 13, 14, 3, 3, 3, 3]
        );
    }

    #[test]
    fn missing_eod() {
        let input = [1, 7, 8, 255, 9];
        assert_eq!(
            decode(&input, &DecodeLimits::default()).unwrap(),
            vec![7, 8, 9, 9]
        );
    }

    #[test]
    fn limit() {
        let input = [129, 0, 129, 0];
        let limits = DecodeLimits { max_output_len: 100 };
        assert_eq!(
            decode(&input, &limits),
            Err(FilterError::LimitExceeded { limit: 100 })
        );
    }
}
