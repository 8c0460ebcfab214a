//! Fixed-width packed integers.

use crate::utils::encoding::{Persist, read_u32_le, read_usize_le, read_words, write_u32_le, write_u64_le, write_words};
use anyhow::{Result, bail};
use std::io::{self, Read, Write};

/// A vector of `len` integers of `width` bits each, packed into u64 words.
///
/// Entries may straddle a word boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVector {
    words: Vec<u64>,
    width: u32,
    len: usize,
}

impl IntVector {
    /// Zero-filled vector of `len` entries
    pub fn new(width: u32, len: usize) -> Self {
        assert!((1..=64).contains(&width), "width must be in 1..=64, got {}", width);
        let bits = width as usize * len;
        Self {
            words: vec![0; bits.div_ceil(64)],
            width,
            len,
        }
    }

    /// Pack `values`, each of which must fit in `width` bits
    pub fn from_values(width: u32, values: impl IntoIterator<Item = u64>) -> Self {
        let values = values.into_iter();
        let mut vec = Self::new(width, 0);
        vec.words.reserve((values.size_hint().0 * width as usize).div_ceil(64));
        for value in values {
            vec.push(value);
        }
        vec
    }

    /// Append one entry
    pub fn push(&mut self, value: u64) {
        let bit = self.len * self.width as usize;
        let needed = (bit + self.width as usize).div_ceil(64);
        if self.words.len() < needed {
            self.words.resize(needed, 0);
        }
        self.len += 1;
        self.set(self.len - 1, value);
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
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn mask(&self) -> u64 {
        if self.width == 64 { u64::MAX } else { (1u64 << self.width) - 1 }
    }

    /// Read entry `i`
    #[inline]
    pub fn get(&self, i: usize) -> u64 {
        debug_assert!(i < self.len, "index {} out of bounds ({})", i, self.len);
        let bit = i * self.width as usize;
        let word = bit / 64;
        let offset = (bit % 64) as u32;
        let mut value = self.words[word] >> offset;
        if offset + self.width > 64 {
            value |= self.words[word + 1] << (64 - offset);
        }
        value & self.mask()
    }

    /// Overwrite entry `i`
    #[inline]
    pub fn set(&mut self, i: usize, value: u64) {
        debug_assert!(i < self.len);
        debug_assert!(value <= self.mask(), "value {} exceeds {} bits", value, self.width);
        let mask = self.mask();
        let value = value & mask;
        let bit = i * self.width as usize;
        let word = bit / 64;
        let offset = (bit % 64) as u32;
        self.words[word] = (self.words[word] & !(mask << offset)) | (value << offset);
        if offset + self.width > 64 {
            let spill = 64 - offset;
            let high_mask = mask >> spill;
            self.words[word + 1] = (self.words[word + 1] & !high_mask) | (value >> spill);
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = u64> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Heap bytes used by the packed words
    pub fn size_in_bytes(&self) -> usize {
        self.words.len() * 8
    }
}

impl Persist for IntVector {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u32_le(writer, self.width)?;
        write_u64_le(writer, self.len as u64)?;
        Ok(12 + write_words(writer, &self.words)?)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let width = read_u32_le(reader)?;
        let len = read_usize_le(reader)?;
        let words = read_words(reader)?;
        if !(1..=64).contains(&width) {
            bail!("invalid packed integer width {}", width);
        }
        if words.len() < (width as usize * len).div_ceil(64) {
            bail!("packed integer vector truncated: {} words for {} entries", words.len(), len);
        }
        Ok(Self { words, width, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_across_words() {
        let mut v = IntVector::new(7, 20);
        for i in 0..20 {
            v.set(i, (i as u64 * 13) % 128);
        }
        for i in 0..20 {
            assert_eq!(v.get(i), (i as u64 * 13) % 128);
        }
        v.set(9, 0);
        assert_eq!(v.get(8), (8 * 13) % 128);
        assert_eq!(v.get(9), 0);
        assert_eq!(v.get(10), (10 * 13) % 128);
    }

    #[test]
    fn test_full_width_entries() {
        let v = IntVector::from_values(64, [u64::MAX, 0, 1 << 63]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![u64::MAX, 0, 1 << 63]);
    }

    #[test]
    fn test_push_grows() {
        let mut v = IntVector::new(3, 0);
        assert!(v.is_empty());
        for x in [5, 7, 0, 1, 6] {
            v.push(x);
        }
        assert_eq!(v.len(), 5);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![5, 7, 0, 1, 6]);
    }

    #[test]
    fn test_persist() {
        let v = IntVector::from_values(11, (0..100).map(|x| x * 17 % 2048));
        let mut buf = Vec::new();
        let written = v.write_to(&mut buf).unwrap();
        assert_eq!(written as usize, buf.len());
        let back = IntVector::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(back, v);
    }
}
