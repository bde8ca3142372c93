#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = folio::parse_pdf(data) else {
        return;
    };

    let _ = doc.pages();
    let _ = doc.get_statistics();

    for schema in folio::get_available_schemas() {
        let _ = doc.validate(&schema);
    }
});
