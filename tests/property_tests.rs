use proptest::prelude::*;
use stpd::index::prefix_array::PrefixArrayBuilder;
use stpd::index::{ArrayKind, BuildInputs, IndexConfig, PhiBackend, SamplingKind, StpdIndex};
use stpd::succinct::{BitVector, EliasFano};
use stpd::text::OracleKind;

proptest! {
    #[test]
    fn test_elias_fano_rank_select(
        mut keys in prop::collection::vec(0..5000u64, 0..200),
        slack in 1..500u64,
    ) {
        keys.sort_unstable();
        let universe = keys.last().copied().unwrap_or(0) + slack;
        let ef = EliasFano::new(&keys, universe).unwrap();

        prop_assert_eq!(ef.len(), keys.len());
        for (r, &key) in keys.iter().enumerate() {
            prop_assert_eq!(ef.select1(r), key);
        }
        for query in (0..=universe).step_by(7) {
            let expected = keys.partition_point(|&k| k < query);
            prop_assert_eq!(ef.rank1(query), expected);
            let successor = keys.get(expected).map(|&k| (k, 0));
            prop_assert_eq!(ef.successor_value(query), successor);
        }
    }

    #[test]
    fn test_elias_fano_values(
        mut entries in prop::collection::vec((0..100_000u64, 0..1024u64), 1..100),
    ) {
        entries.sort_unstable_by_key(|&(key, _)| key);
        let universe = entries.last().map_or(1, |&(key, _)| key + 1);
        let ef = EliasFano::interleaved(&entries, universe, 10).unwrap();
        for (r, &(key, value)) in entries.iter().enumerate() {
            prop_assert_eq!(ef.select1_value(r), (key, value));
        }
    }

    #[test]
    fn test_bitvector_matches_positions(
        mut positions in prop::collection::vec(0..3000u64, 0..150),
    ) {
        positions.sort_unstable();
        positions.dedup();
        let bv = BitVector::from_positions(positions.iter().copied(), 3000);
        prop_assert_eq!(bv.count_ones(), positions.len());
        for (k, &pos) in positions.iter().enumerate() {
            prop_assert_eq!(bv.select1(k), Some(pos as usize));
            prop_assert_eq!(bv.rank1(pos as usize), k);
        }
        prop_assert_eq!(bv.select1(positions.len()), None);
    }
}

fn dna(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), 1..max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_locate_matches_naive(
        // Low-entropy texts give long runs and repeated patterns
        text in prop::collection::vec(prop::sample::select(b"AACGT".to_vec()), 8..120),
        patterns in prop::collection::vec(dna(8), 1..12),
        phi in prop::sample::select(vec![
            PhiBackend::EliasFano,
            PhiBackend::Dense,
            PhiBackend::Interleaved,
            PhiBackend::Move,
        ]),
        windows in any::<bool>(),
        window_len in 1..6usize,
        bounded in any::<bool>(),
        every_position in any::<bool>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("text");
        let built = PrefixArrayBuilder::new(&text).build();
        built.write_files(&base, windows).unwrap();
        if every_position {
            built.write_every_position_samples(&base).unwrap();
        }
        let config = IndexConfig {
            phi,
            oracle: if windows { OracleKind::Rlz } else { OracleKind::Packed },
            rlz_reference_len: windows.then_some(16),
            array: if windows { ArrayKind::Windows } else { ArrayKind::Buckets },
            window_len,
            sampling: if bounded { SamplingKind::ColexMinMax } else { SamplingKind::ColexMin },
        };
        let inputs = BuildInputs::from_base(&base, config.sampling);
        prop_assert_eq!(inputs.lcs.is_some(), windows);
        let index = StpdIndex::build(&inputs, &config).unwrap();
        if !every_position {
            prop_assert_eq!(index.array().len(), built.stpd_samples(config.sampling).len());
        }

        // Substrings of the text are sure hits
        let start = text.len() / 3;
        let mut patterns = patterns;
        patterns.push(text[start..(start + 4).min(text.len())].to_vec());

        for pattern in &patterns {
            let mut found = index.locate(pattern);
            found.sort_unstable();
            prop_assert_eq!(found, built.occurrences(pattern));
        }
    }
}
