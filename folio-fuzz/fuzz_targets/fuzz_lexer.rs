#![no_main]

use folio_syntax::lexer::Lexer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut lexer = Lexer::new(data);
    let mut last = 0;

    while lexer.next_token().is_some() {
        // The lexer must always make progress.
        assert!(lexer.position() > last || lexer.position() == data.len());
        last = lexer.position();
    }
});
