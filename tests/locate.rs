//! End-to-end tests: build indexes from prefix array files on disk and check
//! `locate` against a naive scan.
//!
//! Fixtures carry the sparse path decomposition samples unless a test swaps
//! in every-position samples.

use std::path::{Path, PathBuf};
use stpd::index::prefix_array::{BuiltPrefixArray, PrefixArrayBuilder};
use stpd::index::{
    ArrayKind, BuildInputs, IndexConfig, PhiBackend, SamplingKind, StpdIndex, locate_fasta,
};
use stpd::text::OracleKind;
use tempfile::TempDir;

const TEXTS: &[&[u8]] = &[
    b"ACGTACGTACGTTTGACCA",
    b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
    b"GATTACAGATTACAGATTACATGATTACAGATTACAGATTACA",
    b"TTTTCCCCGGGGAAAATTTTCCCCGGGGAAAAT",
];

const PHIS: [PhiBackend; 4] = [
    PhiBackend::EliasFano,
    PhiBackend::Dense,
    PhiBackend::Interleaved,
    PhiBackend::Move,
];

fn setup(text: &[u8], with_lcs: bool) -> (TempDir, PathBuf, BuiltPrefixArray) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let base = dir.path().join("text.fa");
    let built = PrefixArrayBuilder::new(text).build();
    built.write_files(&base, with_lcs).expect("Failed to write inputs");
    (dir, base, built)
}

fn build(base: &Path, config: &IndexConfig) -> StpdIndex {
    StpdIndex::build(&BuildInputs::from_base(base, config.sampling), config).expect("Failed to build index")
}

fn sorted(mut positions: Vec<usize>) -> Vec<usize> {
    positions.sort_unstable();
    positions
}

/// Every substring up to length 6, plus a few absent patterns
fn patterns(text: &[u8]) -> Vec<Vec<u8>> {
    let mut patterns: Vec<Vec<u8>> = Vec::new();
    for len in 1..=6.min(text.len()) {
        for window in text.windows(len) {
            if !patterns.iter().any(|p| p == window) {
                patterns.push(window.to_vec());
            }
        }
    }
    patterns.push(b"GGGGGGGGGGGG".to_vec());
    patterns.push(b"ACGTTTGACCAC".to_vec());
    patterns.push(text.to_vec());
    patterns
}

fn check_all_configurations(text: &[u8], base: &Path, built: &BuiltPrefixArray) {
    for phi in PHIS {
        for oracle in [OracleKind::Packed, OracleKind::Rlz] {
            for array in [ArrayKind::Buckets, ArrayKind::Windows] {
                for sampling in [SamplingKind::ColexMin, SamplingKind::ColexMinMax] {
                    let config = IndexConfig {
                        phi,
                        oracle,
                        rlz_reference_len: Some(8),
                        array,
                        window_len: 4,
                        sampling,
                    };
                    let index = build(base, &config);
                    for pattern in patterns(text) {
                        assert_eq!(
                            sorted(index.locate(&pattern)),
                            built.occurrences(&pattern),
                            "text {:?} pattern {:?} config {:?}",
                            String::from_utf8_lossy(text),
                            String::from_utf8_lossy(&pattern),
                            config
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_all_configurations_match_naive() {
    for &text in TEXTS {
        let (_dir, base, built) = setup(text, false);
        check_all_configurations(text, &base, &built);
    }
}

#[test]
fn test_every_position_samples_match_naive() {
    for &text in TEXTS {
        let (_dir, base, built) = setup(text, false);
        built.write_every_position_samples(&base).unwrap();
        check_all_configurations(text, &base, &built);
    }
}

#[test]
fn test_sparse_samples_are_used() {
    let text = TEXTS[2];
    let (_dir, base, built) = setup(text, true);
    for sampling in [SamplingKind::ColexMin, SamplingKind::ColexMinMax] {
        for array in [ArrayKind::Buckets, ArrayKind::Windows] {
            let config = IndexConfig {
                sampling,
                array,
                window_len: 3,
                ..Default::default()
            };
            let index = build(&base, &config);
            let expected = built.stpd_samples(sampling);
            assert_eq!(index.array().len(), expected.len());
            assert!(index.array().len() < text.len());
            for pattern in patterns(text) {
                assert_eq!(sorted(index.locate(&pattern)), built.occurrences(&pattern));
            }
        }
    }
}

#[test]
fn test_results_are_distinct() {
    let (_dir, base, _) = setup(TEXTS[1], false);
    let index = build(&base, &IndexConfig::default());
    let occurrences = index.locate(b"AAA");
    let unique = sorted(occurrences.clone());
    assert_eq!(unique.len(), occurrences.len());
    assert_eq!(unique.windows(2).filter(|w| w[0] == w[1]).count(), 0);
    assert_eq!(index.count(b"AAA"), TEXTS[1].len() - 2);
}

#[test]
fn test_lcs_file_does_not_change_results() {
    let text = TEXTS[2];
    let (_dir, base, built) = setup(text, true);
    let config = IndexConfig {
        array: ArrayKind::Windows,
        window_len: 5,
        ..Default::default()
    };
    assert!(BuildInputs::from_base(&base, config.sampling).lcs.is_some());
    let with_lcs = build(&base, &config);

    built.write_files(&base, false).unwrap();
    assert!(BuildInputs::from_base(&base, config.sampling).lcs.is_none());
    let without_lcs = build(&base, &config);

    for pattern in patterns(text) {
        assert_eq!(sorted(with_lcs.locate(&pattern)), sorted(without_lcs.locate(&pattern)));
    }
}

#[test]
fn test_store_and_load_round_trip() {
    let text = TEXTS[0];
    let (dir, base, built) = setup(text, false);
    for phi in PHIS {
        let config = IndexConfig {
            phi,
            oracle: OracleKind::Rlz,
            rlz_reference_len: Some(6),
            array: ArrayKind::Windows,
            window_len: 3,
            sampling: SamplingKind::ColexMinMax,
        };
        let index = build(&base, &config);
        let path = dir.path().join(format!("text.{:?}.stpd", phi));
        let meta = index.store(&path).unwrap();
        assert_eq!(meta.config, config);
        assert_eq!(meta.text_len, text.len() as u64);

        let loaded = StpdIndex::load(&path).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.config(), config);
        for pattern in patterns(text) {
            assert_eq!(sorted(loaded.locate(&pattern)), built.occurrences(&pattern));
        }
    }
}

#[test]
fn test_locate_is_repeatable() {
    let (_dir, base, _) = setup(TEXTS[2], false);
    let index = build(&base, &IndexConfig::default());
    let first = index.locate(b"GATTACA");
    assert_eq!(index.locate(b"GATTACA"), first);
    assert_eq!(index.locate(b"gattaca"), first);
}

#[test]
fn test_extreme_symbols() {
    let text = b"AAAATTTTAAAATTTTACGTA";
    let (_dir, base, built) = setup(text, false);
    for sampling in [SamplingKind::ColexMin, SamplingKind::ColexMinMax] {
        let index = build(
            &base,
            &IndexConfig {
                sampling,
                ..Default::default()
            },
        );
        for pattern in [&b"A"[..], b"T", b"AAAA", b"TTTT", b"TA", b"AT"] {
            assert_eq!(sorted(index.locate(pattern)), built.occurrences(pattern));
        }
    }
}

#[test]
fn test_rejected_patterns() {
    let (_dir, base, _) = setup(TEXTS[0], false);
    let index = build(&base, &IndexConfig::default());
    assert!(index.locate(b"").is_empty());
    assert!(index.locate(b"ACGN").is_empty());
    assert!(index.locate(&[b'A'; 40]).is_empty());
    assert_eq!(index.locate_limited(b"ACG", Some(0)), Vec::<usize>::new());
    assert_eq!(index.locate_limited(b"ACG", Some(2)).len(), 2);
}

#[test]
fn test_fasta_output_format() {
    let (dir, base, _) = setup(b"ACGTACGTACGT", false);
    let index = build(&base, &IndexConfig::default());
    let patterns = dir.path().join("reads.fa");
    std::fs::write(&patterns, ">first read\nCG\nT\n>absent\nTTT\n>whole\nACGTACGTACGT\n").unwrap();

    let summary = locate_fasta(&index, &patterns, None).unwrap();
    assert_eq!(summary.patterns, 3);
    assert_eq!(summary.symbols, 3 + 3 + 12);
    assert_eq!(summary.occurrences, 3 + 1);

    let output = std::fs::read_to_string(&summary.output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], ">first read");
    let mut cgt: Vec<usize> = lines[1].split_whitespace().map(|p| p.parse().unwrap()).collect();
    cgt.sort_unstable();
    assert_eq!(cgt, vec![1, 5, 9]);
    assert!(lines[1].ends_with(' '));
    assert_eq!(lines[2], ">absent");
    assert_eq!(lines[3], "");
    assert_eq!(lines[4], ">whole");
    assert_eq!(lines[5], "0 ");
}

#[test]
fn test_fasta_respects_cap() {
    let (dir, base, _) = setup(TEXTS[1], false);
    let index = build(&base, &IndexConfig::default());
    let patterns = dir.path().join("reads.fa");
    std::fs::write(&patterns, ">a\nAA\n").unwrap();
    let summary = locate_fasta(&index, &patterns, Some(5)).unwrap();
    assert_eq!(summary.occurrences, 5);
}

#[test]
fn test_build_errors() {
    let (dir, base, _) = setup(TEXTS[0], false);
    let config = IndexConfig::default();

    let missing = dir.path().join("missing.fa");
    let err = StpdIndex::build(&BuildInputs::from_base(&missing, config.sampling), &config).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.fa"));

    std::fs::write(&base, b"ACGTACGTNCGTTTGACCA").unwrap();
    assert!(StpdIndex::build(&BuildInputs::from_base(&base, config.sampling), &config).is_err());

    let bad_window = IndexConfig {
        window_len: 0,
        ..Default::default()
    };
    assert!(StpdIndex::build(&BuildInputs::from_base(&base, bad_window.sampling), &bad_window).is_err());
}

#[test]
fn test_load_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.stpd");
    std::fs::write(&path, b"not an index at all, just bytes").unwrap();
    assert!(StpdIndex::load(&path).is_err());
}
