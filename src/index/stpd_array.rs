//! Sorted sample array and its pattern searches.
//!
//! Samples are text positions sorted by the colex order of the prefixes they
//! end. Every search first narrows to a candidate range of samples that could
//! end with the pattern prefix, then runs the same three-way binary search
//! inside it:
//!
//! - [`ArrayKind::Buckets`]: the range of samples ending with the last
//!   symbol of the prefix.
//! - [`ArrayKind::Windows`]: an Elias-Fano dictionary keyed by the `len`
//!   symbols ending at each sample (last symbol most significant, positions
//!   before the text start padded with `A`). For prefixes of at most `len`
//!   symbols the key-prefix range is exactly the set of samples ending with
//!   the prefix, except for samples shorter than the prefix whose padding
//!   happens to agree; those sort first in the range and are skipped.
//!
//! # Binary search
//!
//! A sample `s` compares against the pattern prefix `P[0..pend)` by walking
//! both backwards (`lcs_char`). If the walk matches all `pend` symbols, `s`
//! ends with the prefix. Otherwise the text symbol at the mismatch decides,
//! with an exhausted text sorting first. Because code order equals ASCII
//! order (see [`crate::text::alphabet`]), this is the order the samples are
//! stored in, so "s sorts before the prefix" is monotone over any range and
//! the first sample not before it is the colex-smallest sample ending with
//! the prefix, if any sample does.

use super::inputs::PrefixArrayView;
use super::types::{ArrayKind, SamplingKind};
use crate::succinct::{EliasFano, IntVector};
use crate::text::TextOracle;
use crate::text::alphabet::{self, SYMBOL_BITS};
use crate::utils::encoding::{Persist, bit_width, read_u32_le, read_usize_le, read_words, write_u32_le, write_u64_le, write_words};
use anyhow::{Result, bail};
use rustc_hash::FxHashMap;
use std::io::{self, Read, Write};
use std::ops::Range;

/// Outcome of a lower-bound search for a pattern prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// Sample at the bound; `None` when the candidate range is empty
    pub sample: Option<usize>,
    /// Longest common suffix of the prefix and the sample
    pub lcp: usize,
    /// The prefix does not end at `sample`, so it does not occur
    pub mismatch: bool,
}

impl Bound {
    const EMPTY: Bound = Bound {
        sample: None,
        lcp: 0,
        mismatch: true,
    };

    /// The matching sample, if the prefix occurs
    #[inline]
    pub fn matched(&self) -> Option<usize> {
        if self.mismatch { None } else { self.sample }
    }
}

/// Seed for the prefix-extension loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstPrefix {
    /// Length of the next prefix to search (matched length plus one)
    pub next: usize,
    /// End of an occurrence of `P[0..next-1)`; `None` if nothing is anchored yet
    pub occ: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SampleSearch {
    Buckets {
        samples: IntVector,
        /// `buckets[c]..buckets[c + 1]` holds the samples ending with byte `c`
        buckets: Vec<u64>,
    },
    Windows {
        /// Window key -> `(sample << lcs_width) | min(lcs bound, window)`
        dict: EliasFano,
        window: usize,
        lcs_width: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StpdArray {
    text_len: usize,
    sampling: SamplingKind,
    search: SampleSearch,
}

impl StpdArray {
    /// Build a bucketed array from samples in colex order.
    ///
    /// Samples at or past the end of the text are dropped.
    pub fn with_buckets<O: TextOracle + ?Sized>(
        samples: impl IntoIterator<Item = u64>,
        oracle: &O,
        sampling: SamplingKind,
    ) -> Result<Self> {
        let n = oracle.len();
        let samples: Vec<u64> = samples.into_iter().filter(|&s| s < n as u64).collect();
        let mut counts = [0u64; 256];
        let mut prev = 0u8;
        for (r, &s) in samples.iter().enumerate() {
            let symbol = oracle.extract(s as usize);
            if symbol < prev {
                bail!(
                    "samples are not in colex order: sample {} at rank {} ends with {:?} after {:?}",
                    s,
                    r,
                    symbol as char,
                    prev as char
                );
            }
            prev = symbol;
            counts[symbol as usize] += 1;
        }
        let mut buckets = Vec::with_capacity(257);
        let mut total = 0;
        buckets.push(0);
        for count in counts {
            total += count;
            buckets.push(total);
        }

        Ok(Self {
            text_len: n,
            sampling,
            search: SampleSearch::Buckets {
                samples: IntVector::from_values(bit_width(n as u64), samples),
                buckets,
            },
        })
    }

    /// Build a window-dictionary array from samples in colex order and their
    /// LCS bounds (see [`sample_lcs_bounds`]).
    pub fn with_windows<O: TextOracle + ?Sized>(
        samples: &[u64],
        lcs_bounds: &[u64],
        window: usize,
        oracle: &O,
        sampling: SamplingKind,
    ) -> Result<Self> {
        if samples.len() != lcs_bounds.len() {
            bail!("{} samples but {} LCS bounds", samples.len(), lcs_bounds.len());
        }
        if !(1..=super::types::MAX_WINDOW_LEN).contains(&window) {
            bail!("window length {} out of range", window);
        }
        let n = oracle.len();
        let lcs_width = bit_width(window as u64);
        let mut entries = Vec::with_capacity(samples.len());
        for (&s, &lcs) in samples.iter().zip(lcs_bounds) {
            if s >= n as u64 {
                continue;
            }
            let key = window_key(oracle, s as usize, window);
            entries.push((key, (s << lcs_width) | lcs.min(window as u64)));
        }
        let universe = 1u64 << (SYMBOL_BITS as usize * window);
        let value_width = bit_width(n as u64) + lcs_width;
        let dict = EliasFano::interleaved(&entries, universe, value_width)
            .map_err(|e| e.context("sample windows are not in colex order"))?;

        Ok(Self {
            text_len: n,
            sampling,
            search: SampleSearch::Windows {
                dict,
                window,
                lcs_width,
            },
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        match &self.search {
            SampleSearch::Buckets { samples, .. } => samples.len(),
            SampleSearch::Windows { dict, .. } => dict.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn sampling(&self) -> SamplingKind {
        self.sampling
    }

    pub fn kind(&self) -> ArrayKind {
        match self.search {
            SampleSearch::Buckets { .. } => ArrayKind::Buckets,
            SampleSearch::Windows { .. } => ArrayKind::Windows,
        }
    }

    /// Window length of a dictionary array
    pub fn window(&self) -> Option<usize> {
        match self.search {
            SampleSearch::Windows { window, .. } => Some(window),
            SampleSearch::Buckets { .. } => None,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        match &self.search {
            SampleSearch::Buckets { samples, buckets } => samples.size_in_bytes() + buckets.len() * 8,
            SampleSearch::Windows { dict, .. } => dict.size_in_bytes(),
        }
    }

    /// Sample of rank `r` in colex order
    #[inline]
    pub fn sample(&self, r: usize) -> usize {
        match &self.search {
            SampleSearch::Buckets { samples, .. } => samples.get(r) as usize,
            SampleSearch::Windows { dict, lcs_width, .. } => (dict.value(r) >> lcs_width) as usize,
        }
    }

    /// Samples in colex order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).map(move |r| self.sample(r))
    }

    /// Stored LCS bound of rank `r` (dictionary arrays only)
    #[inline]
    fn lcs_bound(&self, r: usize) -> Option<usize> {
        match &self.search {
            SampleSearch::Windows { dict, lcs_width, .. } => {
                Some((dict.value(r) & ((1u64 << lcs_width) - 1)) as usize)
            }
            SampleSearch::Buckets { .. } => None,
        }
    }

    /// Ranks of the samples that may end with `pattern[0..pend)`
    fn candidate_range(&self, pattern: &[u8], pend: usize) -> Option<Range<usize>> {
        let range = match &self.search {
            SampleSearch::Buckets { buckets, .. } => {
                let c = pattern[pend - 1] as usize;
                buckets[c] as usize..buckets[c + 1] as usize
            }
            SampleSearch::Windows { dict, window, .. } => {
                let (key, key_width) = pattern_key(pattern, pend, *window)?;
                dict.prefix_range(key, key_width)
            }
        };
        (!range.is_empty()).then_some(range)
    }

    /// Skip samples shorter than `pend` at the front of a window range
    fn skip_short(&self, range: Range<usize>, pend: usize) -> Option<usize> {
        range.into_iter().find(|&r| self.sample(r) + 1 >= pend)
    }

    /// Colex-smallest sample ending with `pattern[0..pend)`.
    ///
    /// On mismatch the prefix does not occur in the text (provided the
    /// sampling covers it).
    pub fn binary_search_lower_bound<O: TextOracle + ?Sized>(&self, pattern: &[u8], pend: usize, oracle: &O) -> Bound {
        debug_assert!(pend >= 1 && pend <= pattern.len());
        let Some(range) = self.candidate_range(pattern, pend) else {
            return Bound::EMPTY;
        };
        if pend == 1 {
            return Bound {
                sample: Some(self.sample(range.start)),
                lcp: 1,
                mismatch: false,
            };
        }
        if let Some(window) = self.window()
            && pend <= window
        {
            // Every sample in the range long enough for the prefix ends with it;
            // the LCS walk confirms the one we land on
            let Some(r) = self.skip_short(range, pend) else {
                return Bound::EMPTY;
            };
            let sample = self.sample(r);
            let lcp = oracle.lcs(pattern, pend - 1, sample);
            return Bound {
                sample: Some(sample),
                lcp,
                mismatch: lcp != pend,
            };
        }
        self.lower_bound_in(pattern, pend, range, oracle)
    }

    fn lower_bound_in<O: TextOracle + ?Sized>(&self, pattern: &[u8], pend: usize, range: Range<usize>, oracle: &O) -> Bound {
        let mut low = range.start;
        let mut high = range.end - 1;
        let mut lcp = oracle.lcs(pattern, pend - 1, self.sample(high));
        while low < high {
            let mid = low + (high - low) / 2;
            let (matched, symbol) = oracle.lcs_char(pattern, pend - 1, self.sample(mid));
            if matched != pend && symbol < Some(pattern[pend - matched - 1]) {
                low = mid + 1;
            } else {
                high = mid;
                lcp = matched;
            }
        }
        Bound {
            sample: Some(self.sample(low)),
            lcp,
            mismatch: lcp != pend,
        }
    }

    /// Colex-largest sample not after `pattern[0..pend)`, restricted to the
    /// candidate range. When the prefix occurs this sample ends with it.
    pub fn binary_search_upper_bound<O: TextOracle + ?Sized>(&self, pattern: &[u8], pend: usize, oracle: &O) -> Option<usize> {
        debug_assert!(pend >= 1 && pend <= pattern.len());
        let range = self.candidate_range(pattern, pend)?;
        if pend == 1 {
            return Some(self.sample(range.end - 1));
        }
        if let Some(window) = self.window()
            && pend <= window
        {
            let last = self.sample(range.end - 1);
            return (last + 1 >= pend).then_some(last);
        }
        let start = range.start;
        let mut low = range.start;
        let mut high = range.end;
        while low < high {
            let mid = low + (high - low) / 2;
            let (matched, symbol) = oracle.lcs_char(pattern, pend - 1, self.sample(mid));
            if matched != pend && symbol > Some(pattern[pend - matched - 1]) {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        (high > start).then(|| self.sample(high - 1))
    }

    /// Anchor the first symbols of `pattern` and extend the match forward.
    ///
    /// Bucketed arrays anchor on the colex-smallest sample ending with
    /// `pattern[0]`. Dictionary arrays try the longest window prefix first and
    /// accept a sample only if its LCS bound is below the prefix length: the
    /// previous prefix in colex order then does not end with the prefix, so
    /// the sample is the colex-smallest occurrence, sampled or not.
    pub fn locate_first_prefix<O: TextOracle + ?Sized>(&self, pattern: &[u8], oracle: &O) -> FirstPrefix {
        const UNANCHORED: FirstPrefix = FirstPrefix { next: 1, occ: None };
        let m = pattern.len();
        if m == 0 {
            return UNANCHORED;
        }
        let extend = |k: usize, sample: usize| {
            let f = if k < m { oracle.lcp(pattern, k, sample + 1) } else { 0 };
            FirstPrefix {
                next: k + f + 1,
                occ: Some(sample + f),
            }
        };
        match &self.search {
            SampleSearch::Buckets { .. } => match self.candidate_range(pattern, 1) {
                Some(range) => extend(1, self.sample(range.start)),
                None => UNANCHORED,
            },
            SampleSearch::Windows { dict, window, .. } => {
                for k in (1..=m.min(*window)).rev() {
                    let Some((key, key_width)) = pattern_key(pattern, k, *window) else {
                        return UNANCHORED;
                    };
                    let Some(r) = self.skip_short(dict.prefix_range(key, key_width), k) else {
                        continue;
                    };
                    let sample = self.sample(r);
                    if self.lcs_bound(r).is_some_and(|b| b < k) && oracle.lcs(pattern, k - 1, sample) == k {
                        return extend(k, sample);
                    }
                }
                UNANCHORED
            }
        }
    }
}

/// Packed key of the `window` symbols ending at text position `end`
fn window_key<O: TextOracle + ?Sized>(oracle: &O, end: usize, window: usize) -> u64 {
    let mut key = 0u64;
    for j in 0..window.min(end + 1) {
        let code = alphabet::encode(oracle.extract(end - j)).unwrap_or(0) as u64;
        key |= code << (SYMBOL_BITS as usize * (window - 1 - j));
    }
    key
}

/// Key prefix for `pattern[0..pend)`: its last `min(window, pend)` symbols in
/// the top bits. `None` if one of them is not a DNA symbol.
fn pattern_key(pattern: &[u8], pend: usize, window: usize) -> Option<(u64, u32)> {
    let k = window.min(pend);
    let mut key = 0u64;
    for j in 0..k {
        let code = alphabet::encode(pattern[pend - 1 - j])? as u64;
        key |= code << (SYMBOL_BITS as usize * (window - 1 - j));
    }
    Some((key, SYMBOL_BITS * k as u32))
}

/// LCS bound of every sample: the longest common suffix between the prefix
/// ending at the sample and the prefix of the previous prefix-array row,
/// capped at `cap`.
///
/// Taken from the LCS file when the view carries one, otherwise computed
/// through the oracle.
pub fn sample_lcs_bounds<O: TextOracle + ?Sized>(
    samples: &[u64],
    view: &PrefixArrayView<'_>,
    oracle: &O,
    cap: usize,
) -> Result<Vec<u64>> {
    let mut bounds: FxHashMap<u64, u64> = samples.iter().map(|&s| (s, u64::MAX)).collect();
    let mut prev_end: Option<u64> = None;
    for k in 1..=view.text_len() {
        let end = view.end(k);
        if let Some(bound) = bounds.get_mut(&end) {
            *bound = match (view.lcs(k), prev_end) {
                (Some(lcs), _) => lcs,
                (None, Some(prev)) => oracle.prefix_lcs(prev as usize, end as usize, cap) as u64,
                (None, None) => 0,
            }
            .min(cap as u64);
        }
        prev_end = Some(end);
    }
    samples
        .iter()
        .filter(|&&s| s < view.text_len() as u64)
        .map(|s| match bounds.get(s) {
            Some(&b) if b != u64::MAX => Ok(b),
            _ => bail!("sample {} does not appear in the prefix array", s),
        })
        .collect()
}

impl Persist for StpdArray {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u64_le(writer, self.text_len as u64)?;
        write_u32_le(writer, self.sampling.tag())?;
        let mut written = 12;
        match &self.search {
            SampleSearch::Buckets { samples, buckets } => {
                write_u32_le(writer, 0)?;
                written += 4 + samples.write_to(writer)?;
                written += write_words(writer, buckets)?;
            }
            SampleSearch::Windows {
                dict,
                window,
                lcs_width,
            } => {
                write_u32_le(writer, 1)?;
                write_u32_le(writer, *window as u32)?;
                write_u32_le(writer, *lcs_width)?;
                written += 12 + dict.write_to(writer)?;
            }
        }
        Ok(written)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let text_len = read_usize_le(reader)?;
        let sampling = SamplingKind::from_tag(read_u32_le(reader)?)?;
        let search = match read_u32_le(reader)? {
            0 => {
                let samples = IntVector::read_from(reader)?;
                let buckets = read_words(reader)?;
                if buckets.len() != 257 || buckets[256] != samples.len() as u64 {
                    bail!("bucket table does not cover {} samples", samples.len());
                }
                SampleSearch::Buckets { samples, buckets }
            }
            1 => {
                let window = read_u32_le(reader)? as usize;
                let lcs_width = read_u32_le(reader)?;
                let dict = EliasFano::read_from(reader)?;
                if lcs_width == 0 || lcs_width >= dict.value_width().max(1) {
                    bail!("window dictionary value layout is invalid");
                }
                if !(1..=super::types::MAX_WINDOW_LEN).contains(&window)
                    || SYMBOL_BITS * window as u32 != dict.key_bits()
                {
                    bail!(
                        "window length {} does not match {}-bit dictionary keys",
                        window,
                        dict.key_bits()
                    );
                }
                SampleSearch::Windows {
                    dict,
                    window,
                    lcs_width,
                }
            }
            tag => bail!("unknown sample array tag {}", tag),
        };
        Ok(Self {
            text_len,
            sampling,
            search,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::prefix_array::PrefixArrayBuilder;
    use crate::text::PackedText;

    const TEXT: &[u8] = b"ACGTACGTACGT";

    fn arrays(text: &[u8], window: usize) -> (PackedText, Vec<StpdArray>) {
        let built = PrefixArrayBuilder::new(text).build();
        let oracle = PackedText::new(text).unwrap();
        let samples = built.colex_samples();
        let owned = built.view().unwrap();
        let view = owned.without_lcs().unwrap();
        let bounds = sample_lcs_bounds(&samples, &view, &oracle, window).unwrap();
        let buckets = StpdArray::with_buckets(samples.iter().copied(), &oracle, SamplingKind::ColexMin).unwrap();
        let windows = StpdArray::with_windows(&samples, &bounds, window, &oracle, SamplingKind::ColexMin).unwrap();
        (oracle, vec![buckets, windows])
    }

    fn ends_with(text: &[u8], end: usize, pattern: &[u8]) -> bool {
        end + 1 >= pattern.len() && &text[end + 1 - pattern.len()..=end] == pattern
    }

    /// Colex-smallest end position of `pattern` by brute force
    fn colex_min_end(text: &[u8], pattern: &[u8]) -> Option<usize> {
        (0..text.len())
            .filter(|&e| ends_with(text, e, pattern))
            .min_by(|&a, &b| text[..=a].iter().rev().cmp(text[..=b].iter().rev()))
    }

    #[test]
    fn test_samples_in_colex_order() {
        let (_, arrays) = arrays(TEXT, 3);
        for array in &arrays {
            let samples: Vec<usize> = array.iter().collect();
            assert_eq!(samples.len(), TEXT.len());
            for pair in samples.windows(2) {
                assert!(TEXT[..=pair[0]].iter().rev().lt(TEXT[..=pair[1]].iter().rev()));
            }
        }
    }

    #[test]
    fn test_lower_bound_finds_colex_min() {
        let (oracle, arrays) = arrays(TEXT, 2);
        let patterns: [&[u8]; 6] = [b"A", b"CG", b"TAC", b"GTACGTAC", b"T", b"ACGTACGTACGT"];
        for array in &arrays {
            for pattern in patterns {
                let bound = array.binary_search_lower_bound(pattern, pattern.len(), &oracle);
                assert_eq!(bound.matched(), colex_min_end(TEXT, pattern), "{:?}", pattern);
            }
        }
    }

    #[test]
    fn test_lower_bound_mismatch_for_absent() {
        let (oracle, arrays) = arrays(TEXT, 2);
        let absent: [&[u8]; 5] = [b"GGG", b"AA", b"CA", b"TTACG", b"ACGN"];
        for array in &arrays {
            for pattern in absent {
                let bound = array.binary_search_lower_bound(pattern, pattern.len(), &oracle);
                assert!(bound.mismatch, "{:?} on {:?}", pattern, array.kind());
                assert_eq!(bound.matched(), None);
            }
        }
    }

    #[test]
    fn test_upper_bound_finds_colex_max() {
        let (oracle, arrays) = arrays(TEXT, 3);
        for array in &arrays {
            for pattern in [&b"CGT"[..], b"G", b"TACGT", b"ACG"] {
                let expected = (0..TEXT.len())
                    .filter(|&e| ends_with(TEXT, e, pattern))
                    .max_by(|&a, &b| TEXT[..=a].iter().rev().cmp(TEXT[..=b].iter().rev()));
                assert_eq!(array.binary_search_upper_bound(pattern, pattern.len(), &oracle), expected);
            }
        }
    }

    #[test]
    fn test_short_samples_are_skipped() {
        // "CA" ends at 1 and its padded window "ACA" ties with the real "ACA"
        let text = b"CACAT";
        let (oracle, arrays) = arrays(text, 3);
        let windows = &arrays[1];
        let bound = windows.binary_search_lower_bound(b"ACA", 3, &oracle);
        assert_eq!(bound.matched(), Some(3));
        assert_eq!(windows.binary_search_upper_bound(b"ACA", 3, &oracle), Some(3));
        let bound = windows.binary_search_lower_bound(b"CA", 2, &oracle);
        assert_eq!(bound.matched(), colex_min_end(text, b"CA"));
    }

    #[test]
    fn test_first_prefix_anchors_colex_min_occurrence() {
        let (oracle, arrays) = arrays(TEXT, 4);
        for array in &arrays {
            for pattern in [&b"CGTA"[..], b"GTACG", b"A", b"TACGTACG"] {
                let first = array.locate_first_prefix(pattern, &oracle);
                let occ = first.occ.unwrap();
                let matched = &pattern[..first.next - 1];
                assert_eq!(Some(occ), colex_min_end(TEXT, matched), "{:?}", pattern);
            }
        }
    }

    #[test]
    fn test_first_prefix_rejects_unproven_anchor() {
        let text = b"GACGTTACGA";
        let built = PrefixArrayBuilder::new(text).build();
        let oracle = PackedText::new(text).unwrap();
        let owned = built.view().unwrap();
        let view = owned.with_lcs().unwrap();
        // Drop the colex-smallest occurrence of "ACG"; the next one has an LCS bound of 3
        let dropped = colex_min_end(text, b"ACG").unwrap();
        let samples: Vec<u64> = built.colex_samples().into_iter().filter(|&s| s as usize != dropped).collect();
        let bounds = sample_lcs_bounds(&samples, &view, &oracle, 3).unwrap();
        let array = StpdArray::with_windows(&samples, &bounds, 3, &oracle, SamplingKind::ColexMin).unwrap();
        // "ACG" at 8 is not accepted; "AC" anchors at 2 and extends into the dropped occurrence
        let first = array.locate_first_prefix(b"ACG", &oracle);
        assert_eq!(first.next, 4);
        assert_eq!(first.occ, Some(dropped));
    }

    #[test]
    fn test_boundary_symbols() {
        let text = b"TTGCAAGTCA";
        let (oracle, arrays) = arrays(text, 2);
        for array in &arrays {
            let a = array.binary_search_lower_bound(b"A", 1, &oracle);
            assert_eq!(a.matched(), colex_min_end(text, b"A"));
            let t = array.binary_search_lower_bound(b"T", 1, &oracle);
            assert_eq!(t.matched(), colex_min_end(text, b"T"));
            assert_eq!(array.sample(0), colex_min_end(text, b"A").unwrap());
            assert_eq!(array.binary_search_upper_bound(b"T", 1, &oracle), Some(array.sample(array.len() - 1)));
        }
    }

    #[test]
    fn test_rejects_unsorted_samples() {
        let oracle = PackedText::new(TEXT).unwrap();
        // Ends with C, then A
        assert!(StpdArray::with_buckets([1, 0], &oracle, SamplingKind::ColexMin).is_err());
        assert!(StpdArray::with_windows(&[1, 0], &[0, 0], 2, &oracle, SamplingKind::ColexMin).is_err());
    }

    #[test]
    fn test_persist() {
        let (_, arrays) = arrays(TEXT, 5);
        for array in arrays {
            let mut buf = Vec::new();
            let written = array.write_to(&mut buf).unwrap();
            assert_eq!(written as usize, buf.len());
            assert_eq!(StpdArray::read_from(&mut buf.as_slice()).unwrap(), array);
        }
    }

    #[test]
    fn test_read_rejects_window_wider_than_keys() {
        let (_, arrays) = arrays(TEXT, 5);
        let windows = &arrays[1];
        assert_eq!(windows.window(), Some(5));
        let mut buf = Vec::new();
        windows.write_to(&mut buf).unwrap();

        // text_len, sampling, tag, then the window length
        for window in [0u32, 6, 31, 1000] {
            let mut bad = buf.clone();
            bad[16..20].copy_from_slice(&window.to_le_bytes());
            assert!(StpdArray::read_from(&mut bad.as_slice()).is_err(), "window {}", window);
        }
    }
}
