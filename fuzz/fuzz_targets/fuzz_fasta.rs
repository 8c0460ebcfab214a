#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes either parse or fail cleanly
    if let Ok(records) = stpd::index::batch::parse_fasta(data) {
        for record in records {
            assert!(record.header.starts_with(b">"));
        }
    }
});
