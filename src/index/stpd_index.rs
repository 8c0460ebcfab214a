//! STPD index: text oracle, sample array and phi, composed into `locate`.
//!
//! Locating a pattern `P` of length `m` runs in two phases:
//!
//! 1. **Seed**: find the colex-smallest occurrence. The array anchors a first
//!    prefix of `P`, then alternates lower-bound searches for longer prefixes
//!    with forward LCP extensions until all of `P` is matched.
//! 2. **Enumerate**: every other occurrence follows in colex order, so phi
//!    walks them one by one. With colex-smallest samples only, the walk
//!    fetches 1, 2, 4, ... successors and checks the last of each batch; the
//!    first failing batch is trimmed by binary search. With colex-smallest and
//!    colex-largest samples, the largest occurrence is seeded as well and the
//!    walk simply runs up to it.
//!
//! The pipeline works on end positions; `locate` reports start positions.

use super::inputs::{BuildInputs, MappedInputs, PrefixArrayView};
use super::phi::{Phi, PhiFunction};
use super::reader::IndexReader;
use super::stpd_array::{StpdArray, sample_lcs_bounds};
use super::types::{ArrayKind, DEFAULT_WINDOW_LEN, IndexConfig, IndexMeta, SamplingKind, TextPosition};
use super::writer::IndexWriter;
use crate::text::{Oracle, TextOracle, alphabet};
use crate::utils::progress::Progress;
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StpdIndex {
    oracle: Oracle,
    array: StpdArray,
    phi: Phi,
}

impl StpdIndex {
    /// Build an index from the collaborator files
    pub fn build(inputs: &BuildInputs, config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        info!(
            text = %inputs.text.display(),
            oracle = ?config.oracle,
            array = ?config.array,
            phi = ?config.phi,
            "Building index"
        );
        let mapped = MappedInputs::open(inputs)?;
        if mapped.text.is_empty() {
            bail!("text {} is empty", inputs.text.display());
        }

        let step = Progress::step("Encoding text");
        let oracle = Oracle::build(&mapped.text, config.oracle, config.rlz_reference_len)
            .with_context(|| format!("Failed to encode {}", inputs.text.display()))?;
        step.finish();
        debug!(bytes = oracle.size_in_bytes(), "Text oracle built");

        let n = oracle.len();
        let view = PrefixArrayView::new(&mapped.rbwt, &mapped.pa, mapped.lcs.as_deref(), n)
            .with_context(|| format!("Invalid prefix array {}", inputs.pa.display()))?;

        let step = Progress::step("Building sample array");
        let samples: Vec<u64> = mapped.samples().filter(|&s| s < n as u64).collect();
        let array = match config.array {
            ArrayKind::Buckets => StpdArray::with_buckets(samples, &oracle, config.sampling),
            ArrayKind::Windows => {
                let bounds = sample_lcs_bounds(&samples, &view, &oracle, config.window_len)?;
                StpdArray::with_windows(&samples, &bounds, config.window_len, &oracle, config.sampling)
            }
        }
        .with_context(|| format!("Invalid samples {}", inputs.samples.display()))?;
        step.finish();
        debug!(samples = array.len(), bytes = array.size_in_bytes(), "Sample array built");

        let step = Progress::step("Building phi");
        let phi = Phi::build(&view, config.phi)?;
        step.finish();
        debug!(runs = phi.run_count(), bytes = phi.size_in_bytes(), "Phi built");

        info!(symbols = n, samples = array.len(), runs = phi.run_count(), "Index built");
        Self::from_parts(oracle, array, phi)
    }

    /// Assemble an index, checking that the parts describe the same text
    pub fn from_parts(oracle: Oracle, array: StpdArray, phi: Phi) -> Result<Self> {
        let n = oracle.len();
        if array.text_len() != n || phi.text_len() != n {
            bail!(
                "index parts disagree on the text length: oracle {}, array {}, phi {}",
                n,
                array.text_len(),
                phi.text_len()
            );
        }
        Ok(Self { oracle, array, phi })
    }

    /// Load an index file
    pub fn load(path: &Path) -> Result<Self> {
        IndexReader::open(path)
    }

    /// Write the index file and its metadata sidecar
    pub fn store(&self, path: &Path) -> Result<IndexMeta> {
        IndexWriter::write(path, self)
    }

    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    pub fn array(&self) -> &StpdArray {
        &self.array
    }

    pub fn phi(&self) -> &Phi {
        &self.phi
    }

    pub fn text_len(&self) -> usize {
        self.oracle.len()
    }

    /// Configuration equivalent to the one the index was built with
    pub fn config(&self) -> IndexConfig {
        IndexConfig {
            oracle: self.oracle.kind(),
            rlz_reference_len: match &self.oracle {
                Oracle::Rlz(text) => Some(text.reference_len()),
                Oracle::Packed(_) => None,
            },
            array: self.array.kind(),
            window_len: self.array.window().unwrap_or(DEFAULT_WINDOW_LEN),
            phi: self.phi.backend(),
            sampling: self.array.sampling(),
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.oracle.size_in_bytes() + self.array.size_in_bytes() + self.phi.size_in_bytes()
    }

    /// Start positions of every occurrence of `pattern`, in colex order of
    /// the prefixes they end
    pub fn locate(&self, pattern: &[u8]) -> Vec<TextPosition> {
        self.locate_limited(pattern, None)
    }

    /// Like [`locate`](Self::locate), stopping after `cap` occurrences
    pub fn locate_limited(&self, pattern: &[u8], cap: Option<usize>) -> Vec<TextPosition> {
        let m = pattern.len();
        if m == 0 || m > self.text_len() || cap == Some(0) || alphabet::find_invalid(pattern).is_some() {
            return Vec::new();
        }
        let pattern = pattern.to_ascii_uppercase();
        let limit = cap.unwrap_or(usize::MAX);
        let ends = match self.array.sampling() {
            SamplingKind::ColexMin => self.locate_exponential(&pattern, limit),
            SamplingKind::ColexMinMax => self.locate_bounded(&pattern, limit),
        };
        ends.into_iter().map(|end| end + 1 - m).collect()
    }

    /// Number of occurrences of `pattern`
    pub fn count(&self, pattern: &[u8]) -> usize {
        self.locate(pattern).len()
    }

    fn locate_exponential(&self, pattern: &[u8], limit: usize) -> Vec<usize> {
        match self.seed_lower(pattern) {
            Some(anchor) => self.enumerate_exponential(pattern, anchor, limit),
            None => Vec::new(),
        }
    }

    fn locate_bounded(&self, pattern: &[u8], limit: usize) -> Vec<usize> {
        let Some(lower) = self.seed_lower(pattern) else {
            return Vec::new();
        };
        let Some(upper) = self.seed_upper(pattern) else {
            return self.enumerate_exponential(pattern, lower, limit);
        };
        let mut ends = vec![lower];
        if lower != upper {
            for end in self.phi.walk(lower) {
                if ends.len() >= limit {
                    break;
                }
                ends.push(end);
                if end == upper {
                    break;
                }
            }
        }
        ends.truncate(limit);
        ends
    }

    #[inline]
    fn ends_with_pattern(&self, pattern: &[u8], end: usize) -> bool {
        self.oracle.lcs(pattern, pattern.len() - 1, end) == pattern.len()
    }

    /// End of the colex-smallest occurrence
    fn seed_lower(&self, pattern: &[u8]) -> Option<usize> {
        let m = pattern.len();
        let first = self.array.locate_first_prefix(pattern, &self.oracle);
        let mut occ = first.occ;
        let mut next = first.next;
        while next <= m {
            let sample = self.array.binary_search_lower_bound(pattern, next, &self.oracle).matched()?;
            let extension = self.extend(pattern, next, sample);
            occ = Some(sample + extension);
            next += extension + 1;
        }
        occ.filter(|&end| self.ends_with_pattern(pattern, end))
    }

    /// End of the colex-largest occurrence
    fn seed_upper(&self, pattern: &[u8]) -> Option<usize> {
        let m = pattern.len();
        let mut occ = None;
        let mut next = 1;
        while next <= m {
            let sample = self.array.binary_search_upper_bound(pattern, next, &self.oracle)?;
            if self.oracle.lcs(pattern, next - 1, sample) != next {
                return None;
            }
            let extension = self.extend(pattern, next, sample);
            occ = Some(sample + extension);
            next += extension + 1;
        }
        occ.filter(|&end| self.ends_with_pattern(pattern, end))
    }

    /// Symbols of `pattern[matched..]` following the occurrence of the first
    /// `matched` symbols ending at `end`
    #[inline]
    fn extend(&self, pattern: &[u8], matched: usize, end: usize) -> usize {
        if matched < pattern.len() {
            self.oracle.lcp(pattern, matched, end + 1)
        } else {
            0
        }
    }

    /// Walk phi from `anchor` in doubling batches until an occurrence fails
    fn enumerate_exponential(&self, pattern: &[u8], anchor: usize, limit: usize) -> Vec<usize> {
        let mut ends = vec![anchor];
        let mut walk = self.phi.walk(anchor);
        let mut verified = 1;
        let mut batch = 1;
        while ends.len() < limit {
            let target = ends.len().saturating_add(batch).min(limit);
            let before = ends.len();
            ends.extend(walk.by_ref().take(target - before));
            let exhausted = ends.len() < target;
            if ends.len() == before {
                break;
            }
            let last = ends[ends.len() - 1];
            if !self.ends_with_pattern(pattern, last) {
                // Occurrences are consecutive, so the batch matches up to a cut
                let cut = verified + ends[verified..].partition_point(|&end| self.ends_with_pattern(pattern, end));
                ends.truncate(cut);
                break;
            }
            verified = ends.len();
            if exhausted {
                break;
            }
            batch = batch.saturating_mul(2);
        }
        ends.truncate(limit);
        ends
    }
}
