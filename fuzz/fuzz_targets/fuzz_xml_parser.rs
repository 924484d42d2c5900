#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Model part parser on malformed XML
    if let Ok(xml) = std::str::from_utf8(data) {
        let _ = lib3mf_audit::parser::parse_model_xml(xml);
    }
});
