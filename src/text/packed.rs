//! Bitpacked text: two bits per DNA symbol.

use super::TextOracle;
use super::alphabet::{self, SYMBOL_BITS};
use crate::succinct::IntVector;
use crate::utils::encoding::Persist;
use anyhow::{Result, bail};
use std::io::{self, Read, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedText {
    codes: IntVector,
}

impl PackedText {
    /// Pack an ASCII DNA text. Any other byte is an error.
    pub fn new(text: &[u8]) -> Result<Self> {
        if let Some(pos) = alphabet::find_invalid(text) {
            bail!("non-DNA symbol {:?} at offset {}", text[pos] as char, pos);
        }
        let codes = IntVector::from_values(
            SYMBOL_BITS,
            text.iter().filter_map(|&b| alphabet::encode(b)).map(u64::from),
        );
        Ok(Self { codes })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.codes.size_in_bytes()
    }
}

impl TextOracle for PackedText {
    #[inline]
    fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    fn extract(&self, pos: usize) -> u8 {
        alphabet::decode(self.codes.get(pos))
    }

    fn lcp(&self, pattern: &[u8], p: usize, t: usize) -> usize {
        let limit = pattern.len().saturating_sub(p).min(self.len().saturating_sub(t));
        (0..limit)
            .position(|k| self.extract(t + k) != pattern[p + k])
            .unwrap_or(limit)
    }

    fn lcs_char(&self, pattern: &[u8], p: usize, t: usize) -> (usize, Option<u8>) {
        let limit = (p + 1).min(t + 1);
        for k in 0..limit {
            let symbol = self.extract(t - k);
            if symbol != pattern[p - k] {
                return (k, Some(symbol));
            }
        }
        (limit, None)
    }
}

impl Persist for PackedText {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        self.codes.write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let codes = IntVector::read_from(reader)?;
        if codes.width() != SYMBOL_BITS {
            bail!("packed text has {}-bit symbols, expected {}", codes.width(), SYMBOL_BITS);
        }
        Ok(Self { codes })
    }
}
