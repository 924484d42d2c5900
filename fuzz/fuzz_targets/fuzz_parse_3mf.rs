#![no_main]

use libfuzzer_sys::fuzz_target;
use lib3mf_audit::{Log, Package, ValidatorConfig};

fuzz_target!(|data: &[u8]| {
    // Full pipeline: ZIP structure -> content types -> relationships -> parts -> topology
    let mut log = Log::new();
    let package = Package::from_bytes(data.to_vec(), &ValidatorConfig::default(), &mut log);

    assert!(log.current_context().is_empty());
    assert_eq!(package.is_none(), log.has_fatal());
});
