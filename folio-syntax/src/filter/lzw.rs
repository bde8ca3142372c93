use crate::filter::DecodeLimits;

const CLEAR_TABLE: usize = 256;
const EOD: usize = 257;
const MAX_ENTRIES: usize = 4096;
const INITIAL_SIZE: usize = 258;

/// Decode LZW data with variable code lengths between 9 and 12 bits.
///
/// Returns `None` for invalid codes. A missing EOD code is tolerated.
pub(crate) fn decode(
    data: &[u8],
    early_change: bool,
    limits: &DecodeLimits,
) -> Option<Vec<u8>> {
    let mut table = Table::new(early_change);
    let mut reader = BitReader::new(data);
    let mut decoded = vec![];
    let mut prev: Option<usize> = None;

    while let Some(code) = reader.read(table.code_length()) {
        match code {
            CLEAR_TABLE => {
                table.clear();
                prev = None;
            }
            EOD => break,
            code => {
                if let Some(entry) = table.get(code) {
                    decoded.extend_from_slice(entry);
                    let first = entry[0];

                    if let Some(prev) = prev {
                        table.register(prev, first);
                    }
                } else {
                    // The KwKwK case: the code is the one about to be defined.
                    let prev = prev?;

                    if code != table.len() {
                        return None;
                    }

                    let first = table.get(prev)?[0];
                    decoded.extend_from_slice(table.register(prev, first)?);
                }

                prev = Some(code);
            }
        }

        if limits.check(decoded.len()).is_err() {
            return Some(decoded);
        }
    }

    Some(decoded)
}

struct Table {
    early_change: bool,
    entries: Vec<Vec<u8>>,
}

impl Table {
    fn new(early_change: bool) -> Self {
        let mut entries: Vec<_> = (0..=255).map(|b| vec![b]).collect();

        // Clear table and EOD don't have any data.
        entries.push(vec![]);
        entries.push(vec![]);

        Self {
            early_change,
            entries,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn register(&mut self, prev: usize, new_byte: u8) -> Option<&[u8]> {
        if self.entries.len() >= MAX_ENTRIES {
            return None;
        }

        let mut new_entry = self.get(prev)?.to_vec();
        new_entry.push(new_byte);
        self.entries.push(new_entry);

        self.entries.last().map(|v| &**v)
    }

    fn get(&self, index: usize) -> Option<&[u8]> {
        self.entries
            .get(index)
            .map(|v| &**v)
            .filter(|v| !v.is_empty())
    }

    fn clear(&mut self) {
        self.entries.truncate(INITIAL_SIZE);
    }

    fn code_length(&self) -> u8 {
        let adjusted = self.entries.len() + usize::from(self.early_change);

        if adjusted >= 2048 {
            12
        } else if adjusted >= 1024 {
            11
        } else if adjusted >= 512 {
            10
        } else {
            9
        }
    }
}

/// Reads big-endian bit groups of up to 16 bits.
struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    fn read(&mut self, bits: u8) -> Option<usize> {
        let mut value = 0_usize;

        for _ in 0..bits {
            let byte = *self.data.get(self.bit_pos / 8)?;
            let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
            value = (value << 1) | usize::from(bit);
            self.bit_pos += 1;
        }

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::filter::DecodeLimits;

    #[test]
    fn simple_lzw() {
        let input = [0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01];
        let decoded = decode(&input, true, &DecodeLimits::default()).unwrap();

        assert_eq!(decoded, vec![45, 45, 45, 45, 45, 65, 45, 45, 45, 66]);
    }

    #[test]
    fn invalid_first_code() {
        // 9 bit code 300 without any previous code.
        let input = [0x96, 0x00];
        assert!(decode(&input, true, &DecodeLimits::default()).is_none());
    }
}
