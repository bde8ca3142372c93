#![no_main]

use folio_syntax::DecodeLimits;
use folio_syntax::filter::{Filter, apply};
use libfuzzer_sys::fuzz_target;

const FILTERS: &[&[u8]] = &[
    b"ASCIIHexDecode",
    b"ASCII85Decode",
    b"LZWDecode",
    b"FlateDecode",
    b"RunLengthDecode",
];

// The first byte selects the filter, the rest is the encoded data.
fuzz_target!(|data: &[u8]| {
    let Some((selector, data)) = data.split_first() else {
        return;
    };

    let name = FILTERS[*selector as usize % FILTERS.len()];
    let Ok(filter) = Filter::from_name(name) else {
        return;
    };

    let limits = DecodeLimits {
        max_output_len: 1 << 20,
    };

    let _ = apply(filter, data, None, &limits);
});
