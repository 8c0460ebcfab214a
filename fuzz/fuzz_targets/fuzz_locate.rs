#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stpd::index::prefix_array::{PrefixArrayBuilder, naive_occurrences};
use stpd::index::{BuildInputs, IndexConfig, PhiBackend, SamplingKind, StpdIndex};

#[derive(Arbitrary, Debug)]
struct Input {
    text: Vec<u8>,
    pattern: Vec<u8>,
    move_phi: bool,
    bounded: bool,
}

fn dna(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|&b| b"ACGT"[(b & 3) as usize]).collect()
}

fuzz_target!(|input: Input| {
    let text = dna(&input.text);
    if text.is_empty() || text.len() > 512 {
        return;
    }
    let pattern = dna(&input.pattern);

    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("text");
    PrefixArrayBuilder::new(&text).build().write_files(&base, false).unwrap();
    let config = IndexConfig {
        phi: if input.move_phi { PhiBackend::Move } else { PhiBackend::EliasFano },
        sampling: if input.bounded { SamplingKind::ColexMinMax } else { SamplingKind::ColexMin },
        ..Default::default()
    };
    let index = StpdIndex::build(&BuildInputs::from_base(&base, config.sampling), &config).unwrap();

    let mut found = index.locate(&pattern);
    found.sort_unstable();
    assert_eq!(found, naive_occurrences(&text, &pattern));
});
