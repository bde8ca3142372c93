#![no_main]

use folio_syntax::PdfData;
use folio_syntax::parser::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let data = PdfData::from(data);

    let _ = Parser::new(&data, 0).with_max_depth(64).parse_object();
    let _ = Parser::new(&data, 0).with_max_depth(64).parse_indirect();
});
