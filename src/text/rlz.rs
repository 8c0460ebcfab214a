//! Relative Lempel-Ziv compressed text.
//!
//! The text is parsed greedily into phrases, each phrase being the longest
//! prefix of the remaining text that occurs in a reference string. The
//! reference is a prefix of the text followed by one copy of every symbol, so
//! every position is covered by a phrase of length at least one.
//!
//! The reference suffix array is built with SA-IS in linear time.
//!
//! Random access finds the phrase through an Elias-Fano dictionary of phrase
//! starts, then reads the packed reference. LCP/LCS walks stay inside the
//! current phrase and only consult the dictionary when they cross into the
//! next (or previous) one.

use super::TextOracle;
use super::sais;
use super::alphabet::{self, SYMBOL_BITS, SYMBOLS};
use crate::succinct::{EliasFano, IntVector};
use crate::utils::encoding::{Persist, bit_width, read_usize_le, write_u64_le};
use anyhow::{Result, bail};
use std::io::{self, Read, Write};
use tracing::debug;

/// Smallest reference used by the default policy
pub const MIN_REFERENCE_LEN: usize = 1024;

/// Default reference length for a text of `n` symbols
pub fn default_reference_len(n: usize) -> usize {
    (n / 8).max(MIN_REFERENCE_LEN).min(n)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RlzText {
    reference: IntVector,
    starts: EliasFano,
    sources: IntVector,
    len: usize,
}

/// Position inside one phrase
#[derive(Clone, Copy)]
struct PhraseCursor {
    phrase: usize,
    start: usize,
    end: usize,
    source: usize,
}

impl RlzText {
    /// Compress `text` against its first `reference_len` symbols
    pub fn new(text: &[u8], reference_len: usize) -> Result<Self> {
        if let Some(pos) = alphabet::find_invalid(text) {
            bail!("non-DNA symbol {:?} at offset {}", text[pos] as char, pos);
        }
        let reference: Vec<u8> = text[..reference_len.min(text.len())]
            .iter()
            .map(u8::to_ascii_uppercase)
            .chain(SYMBOLS)
            .collect();
        let suffixes = sais::suffix_array(&reference);

        let mut starts = Vec::new();
        let mut sources = Vec::new();
        let mut i = 0;
        while i < text.len() {
            let (source, len) = longest_match(&reference, &suffixes, &text[i..]);
            if len == 0 {
                bail!("no reference match for the symbol at offset {}", i);
            }
            starts.push(i as u64);
            sources.push(source as u64);
            i += len;
        }
        debug!(
            phrases = starts.len(),
            reference = reference.len(),
            "RLZ parse complete"
        );

        Ok(Self {
            reference: IntVector::from_values(
                SYMBOL_BITS,
                reference.iter().filter_map(|&b| alphabet::encode(b)).map(u64::from),
            ),
            starts: EliasFano::new(&starts, text.len() as u64)?,
            sources: IntVector::from_values(bit_width(reference.len() as u64), sources),
            len: text.len(),
        })
    }

    pub fn phrase_count(&self) -> usize {
        self.starts.len()
    }

    /// Length of the text prefix used as reference
    pub fn reference_len(&self) -> usize {
        self.reference.len() - SYMBOLS.len()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.reference.size_in_bytes() + self.starts.size_in_bytes() + self.sources.size_in_bytes()
    }

    #[inline]
    fn cursor(&self, phrase: usize) -> PhraseCursor {
        let end = if phrase + 1 < self.starts.len() {
            self.starts.select1(phrase + 1) as usize
        } else {
            self.len
        };
        PhraseCursor {
            phrase,
            start: self.starts.select1(phrase) as usize,
            end,
            source: self.sources.get(phrase) as usize,
        }
    }

    /// Cursor of the phrase holding `pos`
    #[inline]
    fn cursor_at(&self, pos: usize) -> PhraseCursor {
        self.cursor(self.starts.rank1(pos as u64 + 1) - 1)
    }

    #[inline]
    fn symbol(&self, cursor: &PhraseCursor, pos: usize) -> u8 {
        alphabet::decode(self.reference.get(cursor.source + (pos - cursor.start)))
    }
}

impl TextOracle for RlzText {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn extract(&self, pos: usize) -> u8 {
        let cursor = self.cursor_at(pos);
        self.symbol(&cursor, pos)
    }

    fn lcp(&self, pattern: &[u8], p: usize, t: usize) -> usize {
        let limit = pattern.len().saturating_sub(p).min(self.len.saturating_sub(t));
        if limit == 0 {
            return 0;
        }
        let mut cursor = self.cursor_at(t);
        for k in 0..limit {
            let pos = t + k;
            if pos == cursor.end {
                cursor = self.cursor(cursor.phrase + 1);
            }
            if self.symbol(&cursor, pos) != pattern[p + k] {
                return k;
            }
        }
        limit
    }

    fn lcs_char(&self, pattern: &[u8], p: usize, t: usize) -> (usize, Option<u8>) {
        let limit = (p + 1).min(t + 1);
        let mut cursor = self.cursor_at(t);
        for k in 0..limit {
            let pos = t - k;
            if pos < cursor.start {
                cursor = self.cursor(cursor.phrase - 1);
            }
            let symbol = self.symbol(&cursor, pos);
            if symbol != pattern[p - k] {
                return (k, Some(symbol));
            }
        }
        (limit, None)
    }
}

/// Longest prefix of `rest` occurring in the reference: (source, length).
///
/// Narrows the suffix-array interval one symbol at a time; the reference ends
/// with every symbol, so the length is at least one.
fn longest_match(reference: &[u8], suffixes: &[u32], rest: &[u8]) -> (usize, usize) {
    let mut lo = 0;
    let mut hi = suffixes.len();
    let mut best = (0, 0);
    for (depth, &symbol) in rest.iter().enumerate() {
        let symbol = Some(symbol.to_ascii_uppercase());
        let at = |s: &u32| reference.get(*s as usize + depth).copied();
        let window = &suffixes[lo..hi];
        let first = window.partition_point(|s| at(s) < symbol);
        let last = window.partition_point(|s| at(s) <= symbol);
        if first == last {
            break;
        }
        hi = lo + last;
        lo += first;
        best = (suffixes[lo] as usize, depth + 1);
    }
    best
}

impl Persist for RlzText {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u64_le(writer, self.len as u64)?;
        let mut written = 8;
        written += self.reference.write_to(writer)?;
        written += self.starts.write_to(writer)?;
        written += self.sources.write_to(writer)?;
        Ok(written)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = read_usize_le(reader)?;
        let reference = IntVector::read_from(reader)?;
        let starts = EliasFano::read_from(reader)?;
        let sources = IntVector::read_from(reader)?;
        if starts.len() != sources.len() || starts.universe() != len as u64 {
            bail!("RLZ parse of {} phrases does not cover {} symbols", starts.len(), len);
        }
        Ok(Self {
            reference,
            starts,
            sources,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::PackedText;

    const TEXT: &[u8] = b"ACGTACGTTTGACCAGTACGTACGTTTGACCAGTAAAAAAACGT";

    #[test]
    fn test_reference_suffix_array() {
        let sa = sais::suffix_array(b"GATA");
        // A, ATA, GATA, TA
        assert_eq!(sa, vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_longest_match() {
        let reference = b"ACGTTACGT";
        let sa = sais::suffix_array(reference);
        assert_eq!(longest_match(reference, &sa, b"TTACGG"), (3, 5));
        assert_eq!(longest_match(reference, &sa, b"TACGTA"), (4, 5));
        assert_eq!(longest_match(reference, &sa, b"N"), (0, 0));
    }

    #[test]
    fn test_extract_matches_text() {
        for reference_len in [0, 4, 10, TEXT.len()] {
            let rlz = RlzText::new(TEXT, reference_len).unwrap();
            assert_eq!(rlz.len(), TEXT.len());
            for (i, &b) in TEXT.iter().enumerate() {
                assert_eq!(rlz.extract(i), b, "position {} with reference {}", i, reference_len);
            }
        }
    }

    #[test]
    fn test_whole_text_reference_is_one_phrase() {
        let rlz = RlzText::new(TEXT, TEXT.len()).unwrap();
        assert_eq!(rlz.phrase_count(), 1);
    }

    #[test]
    fn test_queries_agree_with_packed() {
        let packed = PackedText::new(TEXT).unwrap();
        let rlz = RlzText::new(TEXT, 6).unwrap();
        assert!(rlz.phrase_count() > 1);
        let patterns: [&[u8]; 4] = [b"ACGTACG", b"TTTGACCAGT", b"AAAAC", b"GTA"];
        for pattern in patterns {
            for t in 0..=TEXT.len() {
                for p in 0..pattern.len() {
                    assert_eq!(rlz.lcp(pattern, p, t), packed.lcp(pattern, p, t));
                    if t < TEXT.len() {
                        assert_eq!(rlz.lcs_char(pattern, p, t), packed.lcs_char(pattern, p, t));
                    }
                }
            }
        }
    }

    #[test]
    fn test_persist() {
        let rlz = RlzText::new(TEXT, 8).unwrap();
        let mut buf = Vec::new();
        rlz.write_to(&mut buf).unwrap();
        assert_eq!(RlzText::read_from(&mut buf.as_slice()).unwrap(), rlz);
    }
}
