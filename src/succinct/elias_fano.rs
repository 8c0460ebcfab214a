//! Elias-Fano dictionary with an optional interleaved value per key.
//!
//! Keys are split into `l = floor(log2(u/n))` low bits, stored packed, and
//! high bits, stored in unary in a [`BitVector`] (key `i` sets bit
//! `(key_i >> l) + i`). When a value width `w > 0` is requested, the `w`-bit
//! value of each key is packed right after its low bits, so a single lookup
//! by rank yields both.

use super::SuccinctDictionary;
use super::bitvec::BitVector;
use super::int_vector::IntVector;
use crate::utils::encoding::{Persist, read_u32_le, read_u64_le, read_usize_le, write_u32_le, write_u64_le};
use anyhow::{Result, bail};
use std::io::{self, Read, Write};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliasFano {
    upper: BitVector,
    /// Low bits and values; absent when both widths are zero
    lower: Option<IntVector>,
    universe: u64,
    len: usize,
    low_width: u32,
    value_width: u32,
}

impl EliasFano {
    /// Encode a non-decreasing sequence of keys drawn from `[0, universe)`.
    ///
    /// Unsorted or out-of-range keys are rejected.
    pub fn new(keys: &[u64], universe: u64) -> Result<Self> {
        Self::build(keys.len(), universe, 0, |i| (keys[i], 0))
    }

    /// Encode `(key, value)` pairs, keys non-decreasing, values below `2^value_width`
    pub fn interleaved(entries: &[(u64, u64)], universe: u64, value_width: u32) -> Result<Self> {
        if value_width > 64 {
            bail!("value width {} exceeds 64 bits", value_width);
        }
        Self::build(entries.len(), universe, value_width, |i| entries[i])
    }

    fn build(len: usize, universe: u64, value_width: u32, entry: impl Fn(usize) -> (u64, u64)) -> Result<Self> {
        // Any low width up to floor(log2(u/n)) is valid; wide values take bits from it
        let low_width = match universe.checked_div(len as u64) {
            Some(ratio) if ratio > 1 => 63 - ratio.leading_zeros(),
            _ => 0,
        }
        .min(64 - value_width);
        let upper_len = len + usize::try_from(universe >> low_width)? + 1;
        let mut upper_bits = vec![0u64; upper_len.div_ceil(64)];
        let mut lower = (low_width + value_width > 0).then(|| IntVector::new(low_width + value_width, len));
        let low_mask = low_mask(low_width);

        let mut prev = 0u64;
        for i in 0..len {
            let (key, value) = entry(i);
            if key >= universe {
                bail!("key {} at rank {} is outside universe {}", key, i, universe);
            }
            if key < prev {
                bail!("keys are not sorted: {} follows {} at rank {}", key, prev, i);
            }
            if value_width < 64 && value >> value_width != 0 {
                bail!("value {} at rank {} exceeds {} bits", value, i, value_width);
            }
            prev = key;

            let bit = (key >> low_width) as usize + i;
            upper_bits[bit / 64] |= 1u64 << (bit % 64);
            if let Some(lower) = lower.as_mut() {
                let packed = (key & low_mask) | value.checked_shl(low_width).unwrap_or(0);
                lower.set(i, packed);
            }
        }

        Ok(Self {
            upper: BitVector::new(&upper_bits, upper_len),
            lower,
            universe,
            len,
            low_width,
            value_width,
        })
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
    pub fn universe(&self) -> u64 {
        self.universe
    }

    #[inline]
    pub fn value_width(&self) -> u32 {
        self.value_width
    }

    /// Bits spanned by the largest possible key
    #[inline]
    pub fn key_bits(&self) -> u32 {
        if self.universe <= 1 { 0 } else { 64 - (self.universe - 1).leading_zeros() }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.upper.size_in_bytes() + self.lower.as_ref().map_or(0, IntVector::size_in_bytes)
    }

    #[inline]
    fn low(&self, r: usize) -> u64 {
        match &self.lower {
            Some(lower) => lower.get(r) & low_mask(self.low_width),
            None => 0,
        }
    }

    /// Value stored with the key of rank `r`
    #[inline]
    pub fn value(&self, r: usize) -> u64 {
        debug_assert!(r < self.len, "value({}) past {} keys", r, self.len);
        match &self.lower {
            Some(lower) if self.value_width > 0 => lower.get(r).checked_shr(self.low_width).unwrap_or(0),
            _ => 0,
        }
    }

    /// Number of keys strictly smaller than `key`
    pub fn rank1(&self, key: u64) -> usize {
        if key >= self.universe {
            return self.len;
        }
        let high = (key >> self.low_width) as usize;
        // Ones before the high-th zero are the keys whose high part is <= high
        let Some(mut pos) = self.upper.select0(high) else {
            return self.len;
        };
        let mut rank = pos - high;
        let low = key & low_mask(self.low_width);
        while rank > 0 && pos > 0 && self.upper.get(pos - 1) && self.low(rank - 1) >= low {
            rank -= 1;
            pos -= 1;
        }
        rank
    }

    /// Key of rank `r`. `r` must be below `len()`.
    pub fn select1(&self, r: usize) -> u64 {
        debug_assert!(r < self.len, "select1({}) past {} keys", r, self.len);
        match self.upper.select1(r) {
            Some(pos) => (((pos - r) as u64) << self.low_width) | self.low(r),
            None => self.universe,
        }
    }

    /// Key and value of rank `r`
    #[inline]
    pub fn select1_value(&self, r: usize) -> (u64, u64) {
        (self.select1(r), self.value(r))
    }

    /// Smallest key `>= i` together with its value
    pub fn successor_value(&self, i: u64) -> Option<(u64, u64)> {
        let r = self.rank1(i);
        (r < self.len).then(|| self.select1_value(r))
    }

    /// Rank of the first key `>= key`, provided that key agrees with `key` on
    /// its top `key_width` bits.
    ///
    /// Agreement is counted in whole `symbol_bits`-wide symbols, so a partial
    /// symbol match does not count. Returns `None` when no stored key shares
    /// the required prefix.
    pub fn lower_bound(&self, key: u64, key_width: u32, symbol_bits: u32) -> Option<usize> {
        let r = self.rank1(key);
        if r >= self.len {
            return None;
        }
        let bits = self.key_bits();
        let diff = self.select1(r) ^ key;
        let mut matched = if diff == 0 { bits } else { diff.leading_zeros() - (64 - bits) };
        if symbol_bits > 1 {
            matched -= matched % symbol_bits;
        }
        (matched >= key_width).then_some(r)
    }

    /// Ranks of all keys whose top `key_width` bits equal those of `key`
    pub fn prefix_range(&self, key: u64, key_width: u32) -> Range<usize> {
        let bits = self.key_bits();
        debug_assert!(key_width <= bits);
        let shift = bits - key_width;
        let lo_key = key.checked_shr(shift).map_or(0, |k| k << shift);
        let lo = self.rank1(lo_key);
        let hi = match 1u64.checked_shl(shift).and_then(|span| lo_key.checked_add(span)) {
            Some(hi_key) => self.rank1(hi_key),
            None => self.len,
        };
        lo..hi
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).map(move |r| self.select1(r))
    }
}

#[inline]
fn low_mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

impl SuccinctDictionary for EliasFano {
    fn size(&self) -> usize {
        usize::try_from(self.universe).unwrap_or(usize::MAX)
    }

    fn no_ones(&self) -> usize {
        self.len
    }

    fn rank1(&self, i: u64) -> usize {
        EliasFano::rank1(self, i)
    }

    fn select1(&self, r: usize) -> u64 {
        EliasFano::select1(self, r)
    }
}

impl Persist for EliasFano {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u64_le(writer, self.universe)?;
        write_u64_le(writer, self.len as u64)?;
        write_u32_le(writer, self.low_width)?;
        write_u32_le(writer, self.value_width)?;
        let mut written = 24 + self.upper.write_to(writer)?;
        match &self.lower {
            Some(lower) => {
                writer.write_all(&[1])?;
                written += 1 + lower.write_to(writer)?;
            }
            None => {
                writer.write_all(&[0])?;
                written += 1;
            }
        }
        Ok(written)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let universe = read_u64_le(reader)?;
        let len = read_usize_le(reader)?;
        let low_width = read_u32_le(reader)?;
        let value_width = read_u32_le(reader)?;
        if low_width >= 64 || low_width + value_width > 64 {
            bail!("invalid Elias-Fano widths: {} low bits, {} value bits", low_width, value_width);
        }
        let upper = BitVector::read_from(reader)?;
        let expected_upper = usize::try_from(universe >> low_width)
            .ok()
            .and_then(|high| high.checked_add(len)?.checked_add(1));
        if expected_upper != Some(upper.len()) {
            bail!(
                "Elias-Fano upper bits hold {} bits, expected {} keys over universe {}",
                upper.len(),
                len,
                universe
            );
        }
        let mut flag = [0u8; 1];
        reader.read_exact(&mut flag)?;
        let lower = match flag[0] {
            0 => None,
            1 => Some(IntVector::read_from(reader)?),
            other => bail!("invalid Elias-Fano lower-bits flag {}", other),
        };
        if upper.count_ones() != len
            || lower
                .as_ref()
                .is_some_and(|l| l.len() != len || l.width() != low_width + value_width)
        {
            bail!("Elias-Fano dictionary of {} keys is inconsistent", len);
        }
        if lower.is_none() && low_width + value_width > 0 {
            bail!("Elias-Fano dictionary is missing its lower bits");
        }
        Ok(Self {
            upper,
            lower,
            universe,
            len,
            low_width,
            value_width,
        })
    }
}
