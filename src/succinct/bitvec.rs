//! Rank/select bit vector.
//!
//! Rank9-style directory: every 512-bit block carries the absolute number of
//! ones before it plus seven 9-bit cumulative counts for its 64-bit words.
//! Select is answered by sampling the block of every 512th one (and zero),
//! then binary searching the block directory between two samples.

use super::SuccinctDictionary;
use crate::utils::encoding::{Persist, read_usize_le, read_words, write_u64_le, write_words};
use anyhow::{Result, bail};
use std::io::{self, Read, Write};

const BLOCK_BITS: usize = 512;
const WORDS_PER_BLOCK: usize = 8;
const SELECT_SAMPLE: usize = 512;

#[derive(Clone, PartialEq, Eq)]
pub struct BitVector {
    /// Raw bits, padded with one spare block so rank(len) never reads past the end
    words: Vec<u64>,
    /// Two words per block: absolute rank, packed relative ranks
    blocks: Vec<u64>,
    /// Block holding every SELECT_SAMPLE-th one
    select1_hints: Vec<u64>,
    /// Block holding every SELECT_SAMPLE-th zero
    select0_hints: Vec<u64>,
    len: usize,
    ones: usize,
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .field("ones", &self.ones)
            .finish()
    }
}

impl BitVector {
    /// Build from raw words holding `len` bits (bits past `len` are ignored)
    pub fn new(bits: &[u64], len: usize) -> Self {
        let num_blocks = len.div_ceil(BLOCK_BITS);
        let mut words = vec![0u64; (num_blocks + 1) * WORDS_PER_BLOCK];
        let full_words = len / 64;
        words[..full_words].copy_from_slice(&bits[..full_words]);
        if len % 64 != 0 {
            words[full_words] = bits[full_words] & ((1u64 << (len % 64)) - 1);
        }

        let mut blocks = Vec::with_capacity(2 * (num_blocks + 1));
        let mut select1_hints = Vec::new();
        let mut select0_hints = Vec::new();
        let mut rank = 0usize;
        let mut next_one = 0usize;
        let mut next_zero = 0usize;

        for b in 0..=num_blocks {
            let mut relative = 0u64;
            let mut in_block = 0usize;
            for j in 0..WORDS_PER_BLOCK {
                if j > 0 {
                    relative |= (in_block as u64) << (9 * (j - 1));
                }
                in_block += words[b * WORDS_PER_BLOCK + j].count_ones() as usize;
            }
            blocks.push(rank as u64);
            blocks.push(relative);

            if b < num_blocks {
                let block_len = BLOCK_BITS.min(len - b * BLOCK_BITS);
                let zeros_before = b * BLOCK_BITS - rank;
                while next_one < rank + in_block {
                    select1_hints.push(b as u64);
                    next_one += SELECT_SAMPLE;
                }
                while next_zero < zeros_before + block_len - in_block {
                    select0_hints.push(b as u64);
                    next_zero += SELECT_SAMPLE;
                }
            }
            rank += in_block;
        }

        Self {
            words,
            blocks,
            select1_hints,
            select0_hints,
            len,
            ones: rank,
        }
    }

    /// Build a vector of `len` bits with ones at `positions`
    pub fn from_positions(positions: impl IntoIterator<Item = u64>, len: usize) -> Self {
        let mut bits = vec![0u64; len.div_ceil(64)];
        for pos in positions {
            let pos = pos as usize;
            debug_assert!(pos < len, "position {} outside bit vector of {} bits", pos, len);
            bits[pos / 64] |= 1u64 << (pos % 64);
        }
        Self::new(&bits, len)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Approximate heap memory usage in bytes
    pub fn size_in_bytes(&self) -> usize {
        (self.words.len() + self.blocks.len() + self.select1_hints.len() + self.select0_hints.len()) * 8
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.words[i / 64] >> (i % 64)) & 1 == 1
    }

    #[inline]
    fn block_rank(&self, b: usize) -> usize {
        self.blocks[2 * b] as usize
    }

    /// Ones before word `j` of block `b`
    #[inline]
    fn word_rank(&self, b: usize, j: usize) -> usize {
        if j == 0 {
            0
        } else {
            ((self.blocks[2 * b + 1] >> (9 * (j - 1))) & 0x1FF) as usize
        }
    }

    /// Number of ones in `[0, i)`; saturates at `len`
    #[inline]
    pub fn rank1(&self, i: usize) -> usize {
        let i = i.min(self.len);
        let b = i / BLOCK_BITS;
        let j = (i % BLOCK_BITS) / 64;
        let word = self.words[b * WORDS_PER_BLOCK + j];
        let mask = (1u64 << (i % 64)).wrapping_sub(1);
        self.block_rank(b) + self.word_rank(b, j) + (word & mask).count_ones() as usize
    }

    /// Position of the `k`-th one (0-indexed)
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }
        let s = k / SELECT_SAMPLE;
        let mut lo = self.select1_hints[s] as usize;
        let mut hi = match self.select1_hints.get(s + 1) {
            Some(&b) => b as usize + 1,
            None => self.len.div_ceil(BLOCK_BITS),
        };
        // Largest block with fewer than k+1 ones before it
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.block_rank(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let mut remaining = k - self.block_rank(lo);
        let mut j = 0;
        while j + 1 < WORDS_PER_BLOCK && self.word_rank(lo, j + 1) <= remaining {
            j += 1;
        }
        remaining -= self.word_rank(lo, j);
        let word = self.words[lo * WORDS_PER_BLOCK + j];
        Some(lo * BLOCK_BITS + j * 64 + select_in_word(word, remaining))
    }

    /// Position of the `k`-th zero (0-indexed)
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.len - self.ones {
            return None;
        }
        let zeros_before = |b: usize| b * BLOCK_BITS - self.block_rank(b);
        let s = k / SELECT_SAMPLE;
        let mut lo = self.select0_hints[s] as usize;
        let mut hi = match self.select0_hints.get(s + 1) {
            Some(&b) => b as usize + 1,
            None => self.len.div_ceil(BLOCK_BITS),
        };
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if zeros_before(mid) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let mut remaining = k - zeros_before(lo);
        let word_zeros = |j: usize| j * 64 - self.word_rank(lo, j);
        let mut j = 0;
        while j + 1 < WORDS_PER_BLOCK && word_zeros(j + 1) <= remaining {
            j += 1;
        }
        remaining -= word_zeros(j);
        let word = !self.words[lo * WORDS_PER_BLOCK + j];
        Some(lo * BLOCK_BITS + j * 64 + select_in_word(word, remaining))
    }
}

/// Position of the `k`-th set bit of `word`
#[inline]
fn select_in_word(mut word: u64, k: usize) -> usize {
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}

impl SuccinctDictionary for BitVector {
    fn size(&self) -> usize {
        self.len
    }

    fn no_ones(&self) -> usize {
        self.ones
    }

    fn rank1(&self, i: u64) -> usize {
        BitVector::rank1(self, usize::try_from(i).unwrap_or(usize::MAX))
    }

    fn select1(&self, r: usize) -> u64 {
        debug_assert!(r < self.ones, "select1({}) past {} ones", r, self.ones);
        BitVector::select1(self, r).map_or(self.len as u64, |p| p as u64)
    }
}

impl Persist for BitVector {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u64_le(writer, self.len as u64)?;
        write_u64_le(writer, self.ones as u64)?;
        let mut written = 16;
        written += write_words(writer, &self.words)?;
        written += write_words(writer, &self.blocks)?;
        written += write_words(writer, &self.select1_hints)?;
        written += write_words(writer, &self.select0_hints)?;
        Ok(written)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = read_usize_le(reader)?;
        let ones = read_usize_le(reader)?;
        let words = read_words(reader)?;
        let blocks = read_words(reader)?;
        let select1_hints = read_words(reader)?;
        let select0_hints = read_words(reader)?;
        let num_blocks = len.div_ceil(BLOCK_BITS);
        if words.len() != (num_blocks + 1) * WORDS_PER_BLOCK || blocks.len() != 2 * (num_blocks + 1) {
            bail!("bit vector directory does not match its length {}", len);
        }
        if ones > len || select1_hints.len() != ones.div_ceil(SELECT_SAMPLE) {
            bail!("bit vector select samples are inconsistent");
        }
        Ok(Self {
            words,
            blocks,
            select1_hints,
            select0_hints,
            len,
            ones,
        })
    }
}
