//! Brute-force prefix array builder
//!
//! Produces the collaborator files for small texts by sorting every text
//! prefix in colex order (comparing prefixes right to left):
//! 1. Prefix lengths `0..=n` are sorted with a parallel sort
//! 2. The reversed BWT and LCS array follow from that order
//! 3. The path decomposition samples are read off the LCS array
//!
//! Every-position sampling is valid for both sampling kinds as well and is
//! available through [`BuiltPrefixArray::write_every_position_samples`].
//! Meant for tests, benches and small experiments; real genomes come from an
//! external construction tool.

use super::inputs::{BuildInputs, PrefixArrayView, with_extension};
use super::types::SamplingKind;
use crate::utils::encoding::write_u40_le;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Builder for the prefix array of a single text
pub struct PrefixArrayBuilder {
    text: Vec<u8>,
}

impl PrefixArrayBuilder {
    /// Text is upper-cased; validation happens when the index is built
    pub fn new(text: &[u8]) -> Self {
        Self {
            text: text.to_ascii_uppercase(),
        }
    }

    pub fn build(self) -> BuiltPrefixArray {
        let text = self.text;
        let n = text.len();
        let prefix_array = build_prefix_array_parallel(&text);

        let rbwt = prefix_array
            .iter()
            .map(|&p| text.get(p as usize).copied().unwrap_or(b'$'))
            .collect();
        let mut lcs = Vec::with_capacity(n + 1);
        lcs.push(0);
        lcs.extend(prefix_array.windows(2).map(|pair| common_suffix(&text, pair[0], pair[1])));

        BuiltPrefixArray {
            text,
            prefix_array,
            rbwt,
            lcs,
        }
    }
}

/// Prefix array of a text and everything derived from it
pub struct BuiltPrefixArray {
    /// Upper-cased text
    pub text: Vec<u8>,
    /// Prefix lengths in colex order; row 0 is the empty prefix
    pub prefix_array: Vec<u64>,
    /// Symbol following each row's prefix, `$` after the whole text
    pub rbwt: Vec<u8>,
    /// Longest common suffix of each row with the previous one
    pub lcs: Vec<u64>,
}

impl BuiltPrefixArray {
    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// End position of every non-empty prefix, in colex order
    pub fn colex_samples(&self) -> Vec<u64> {
        self.prefix_array[1..].iter().map(|&p| p - 1).collect()
    }

    /// Path decomposition samples in colex order.
    ///
    /// Write `e(x)` for the end of the colex-smallest occurrence of `x`. The
    /// colex-min set holds `e(c)` for every symbol `c` and every `e(wc)` with
    /// `e(wc) != e(w) + 1`. The colex-max set is built the same way from the
    /// colex-largest occurrences, and `ColexMinMax` takes the union of both.
    pub fn stpd_samples(&self, sampling: SamplingKind) -> Vec<u64> {
        let mut heads = self.path_heads(|k| self.lcs[k]);
        if sampling == SamplingKind::ColexMinMax {
            let largest = self.path_heads(|k| self.lcs.get(k + 1).copied().unwrap_or(0));
            for (head, last) in heads.iter_mut().zip(largest) {
                *head |= last;
            }
        }
        (1..=self.text_len())
            .filter(|&k| heads[k])
            .map(|k| self.prefix_array[k] - 1)
            .collect()
    }

    /// Rows whose end position starts a new path.
    ///
    /// `shared(k)` is the suffix row `k` shares with its neighbour on the
    /// sampled side. Strings ending at row `k` that are longer than it have
    /// their extreme occurrence there; the shortest of them is `x`. The row
    /// is a head when `x` is a single symbol, or when `x` minus its last
    /// symbol is shared by the neighbour of the row ending one position
    /// earlier, so its extreme occurrence lies elsewhere.
    fn path_heads(&self, shared: impl Fn(usize) -> u64) -> Vec<bool> {
        let n = self.text_len();
        let mut row_of = vec![0usize; n + 1];
        for (k, &len) in self.prefix_array.iter().enumerate() {
            row_of[len as usize] = k;
        }
        let mut heads = vec![false; n + 1];
        for k in 1..=n {
            let end = self.prefix_array[k] - 1;
            let bound = shared(k);
            heads[k] = bound <= end && (bound == 0 || shared(row_of[end as usize]) >= bound);
        }
        heads
    }

    /// Encoded `.pa` contents
    pub fn pa_bytes(&self) -> Vec<u8> {
        encode_u40(&self.prefix_array)
    }

    /// Encoded `.lcs` contents
    pub fn lcs_bytes(&self) -> Vec<u8> {
        encode_u40(&self.lcs)
    }

    /// View over freshly encoded copies of the arrays
    pub fn view(&self) -> Result<OwnedView> {
        OwnedView::new(self)
    }

    /// Write `base`, `.pa`, `.rbwt`, `.colex_m`, `.colex_pm` and optionally `.lcs`
    pub fn write_files(&self, base: &Path, with_lcs: bool) -> Result<BuildInputs> {
        write_file(base, &self.text)?;
        let inputs = BuildInputs::from_base(base, SamplingKind::ColexMin);
        write_file(&inputs.pa, &self.pa_bytes())?;
        write_file(&inputs.rbwt, &self.rbwt)?;

        for sampling in [SamplingKind::ColexMin, SamplingKind::ColexMinMax] {
            let path = with_extension(base, sampling.extension());
            write_file(&path, &encode_u40(&self.stpd_samples(sampling)))?;
        }

        let lcs_path = with_extension(base, "lcs");
        if with_lcs {
            write_file(&lcs_path, &self.lcs_bytes())?;
        } else if lcs_path.exists() {
            std::fs::remove_file(&lcs_path).with_context(|| format!("Failed to remove {}", lcs_path.display()))?;
        }
        Ok(BuildInputs::from_base(base, SamplingKind::ColexMin))
    }

    /// Replace both sample files next to `base` with every position
    pub fn write_every_position_samples(&self, base: &Path) -> Result<()> {
        let samples = encode_u40(&self.colex_samples());
        for sampling in [SamplingKind::ColexMin, SamplingKind::ColexMinMax] {
            write_file(&with_extension(base, sampling.extension()), &samples)?;
        }
        Ok(())
    }

    /// Start positions of `pattern` by naive scanning
    pub fn occurrences(&self, pattern: &[u8]) -> Vec<usize> {
        naive_occurrences(&self.text, pattern)
    }
}

/// Encoded arrays that a [`PrefixArrayView`] can borrow from
pub struct OwnedView {
    rbwt: Vec<u8>,
    pa: Vec<u8>,
    lcs: Vec<u8>,
    text_len: usize,
}

impl OwnedView {
    fn new(built: &BuiltPrefixArray) -> Result<Self> {
        let view = Self {
            rbwt: built.rbwt.clone(),
            pa: built.pa_bytes(),
            lcs: built.lcs_bytes(),
            text_len: built.text_len(),
        };
        view.with_lcs()?;
        Ok(view)
    }

    /// View carrying the LCS array
    pub fn with_lcs(&self) -> Result<PrefixArrayView<'_>> {
        PrefixArrayView::new(&self.rbwt, &self.pa, Some(&self.lcs), self.text_len)
    }

    /// View without the LCS array, forcing bounds through the oracle
    pub fn without_lcs(&self) -> Result<PrefixArrayView<'_>> {
        PrefixArrayView::new(&self.rbwt, &self.pa, None, self.text_len)
    }
}

/// Start positions of every (possibly overlapping) occurrence
pub fn naive_occurrences(text: &[u8], pattern: &[u8]) -> Vec<usize> {
    if pattern.is_empty() || pattern.len() > text.len() {
        return Vec::new();
    }
    text.windows(pattern.len())
        .enumerate()
        .filter(|(_, window)| window.eq_ignore_ascii_case(pattern))
        .map(|(i, _)| i)
        .collect()
}

/// Sort prefix lengths `0..=n` in colex order
///
/// Uses rayon for texts above 100 000 symbols
fn build_prefix_array_parallel(text: &[u8]) -> Vec<u64> {
    let n = text.len();
    let mut pa: Vec<u64> = (0..=n as u64).collect();
    if n > 100_000 {
        pa.par_sort_unstable_by(|&a, &b| compare_prefixes(text, a as usize, b as usize));
    } else {
        pa.sort_unstable_by(|&a, &b| compare_prefixes(text, a as usize, b as usize));
    }
    pa
}

#[inline]
fn compare_prefixes(text: &[u8], a: usize, b: usize) -> Ordering {
    text[..a].iter().rev().cmp(text[..b].iter().rev())
}

fn common_suffix(text: &[u8], a: u64, b: u64) -> u64 {
    text[..a as usize]
        .iter()
        .rev()
        .zip(text[..b as usize].iter().rev())
        .take_while(|(x, y)| x == y)
        .count() as u64
}

fn encode_u40(values: &[u64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 5);
    for &v in values {
        // Writing into a Vec cannot fail
        let _ = write_u40_le(&mut buf, v);
    }
    buf
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::with_capacity(65536, file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
