//! Random-access text oracles.
//!
//! An oracle answers symbol extraction and pattern/text comparisons without
//! keeping the text in plain form:
//!
//! - [`PackedText`] - two bits per symbol
//! - [`RlzText`] - relative Lempel-Ziv parse against a text prefix
//!
//! Comparisons are always between a pattern and the text. `lcp` walks forward
//! from a text position, `lcs` walks backward (colex direction).

pub mod alphabet;
pub mod packed;
pub mod rlz;
mod sais;

pub use packed::PackedText;
pub use rlz::RlzText;

use crate::utils::encoding::{Persist, read_u32_le, write_u32_le};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

/// Read-only access to an indexed text.
pub trait TextOracle: Send + Sync {
    /// Number of symbols
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper-case ASCII symbol at `pos`
    fn extract(&self, pos: usize) -> u8;

    /// Length of the longest common prefix of `pattern[p..]` and `text[t..]`
    fn lcp(&self, pattern: &[u8], p: usize, t: usize) -> usize;

    /// Longest common suffix of `pattern[..=p]` and `text[..=t]`, plus the
    /// text symbol at the first mismatch.
    ///
    /// The symbol is `None` when the comparison ran out of pattern or text.
    /// Ordering-wise an exhausted text sorts before every symbol.
    fn lcs_char(&self, pattern: &[u8], p: usize, t: usize) -> (usize, Option<u8>);

    /// Length of the longest common suffix of `pattern[..=p]` and `text[..=t]`
    fn lcs(&self, pattern: &[u8], p: usize, t: usize) -> usize {
        self.lcs_char(pattern, p, t).0
    }

    /// Longest common suffix of the text prefixes ending at `a` and `b`, capped at `cap`
    fn prefix_lcs(&self, a: usize, b: usize, cap: usize) -> usize {
        let limit = cap.min(a + 1).min(b + 1);
        (0..limit)
            .position(|k| self.extract(a - k) != self.extract(b - k))
            .unwrap_or(limit)
    }
}

/// Text representation stored in an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Two bits per symbol
    #[default]
    Packed,
    /// Relative Lempel-Ziv against a prefix of the text
    Rlz,
}

impl OracleKind {
    fn tag(self) -> u32 {
        match self {
            OracleKind::Packed => 0,
            OracleKind::Rlz => 1,
        }
    }
}

/// The oracle owned by an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Oracle {
    Packed(PackedText),
    Rlz(RlzText),
}

impl Oracle {
    /// Build an oracle of the requested kind.
    ///
    /// `rlz_reference_len` overrides the default reference length for RLZ.
    pub fn build(text: &[u8], kind: OracleKind, rlz_reference_len: Option<usize>) -> Result<Self> {
        Ok(match kind {
            OracleKind::Packed => Oracle::Packed(PackedText::new(text)?),
            OracleKind::Rlz => {
                let reference_len = rlz_reference_len.unwrap_or_else(|| rlz::default_reference_len(text.len()));
                Oracle::Rlz(RlzText::new(text, reference_len)?)
            }
        })
    }

    pub fn kind(&self) -> OracleKind {
        match self {
            Oracle::Packed(_) => OracleKind::Packed,
            Oracle::Rlz(_) => OracleKind::Rlz,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        match self {
            Oracle::Packed(text) => text.size_in_bytes(),
            Oracle::Rlz(text) => text.size_in_bytes(),
        }
    }
}

impl TextOracle for Oracle {
    #[inline]
    fn len(&self) -> usize {
        match self {
            Oracle::Packed(text) => text.len(),
            Oracle::Rlz(text) => text.len(),
        }
    }

    #[inline]
    fn extract(&self, pos: usize) -> u8 {
        match self {
            Oracle::Packed(text) => text.extract(pos),
            Oracle::Rlz(text) => text.extract(pos),
        }
    }

    #[inline]
    fn lcp(&self, pattern: &[u8], p: usize, t: usize) -> usize {
        match self {
            Oracle::Packed(text) => text.lcp(pattern, p, t),
            Oracle::Rlz(text) => text.lcp(pattern, p, t),
        }
    }

    #[inline]
    fn lcs_char(&self, pattern: &[u8], p: usize, t: usize) -> (usize, Option<u8>) {
        match self {
            Oracle::Packed(text) => text.lcs_char(pattern, p, t),
            Oracle::Rlz(text) => text.lcs_char(pattern, p, t),
        }
    }
}

impl Persist for Oracle {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u32_le(writer, self.kind().tag())?;
        let body = match self {
            Oracle::Packed(text) => text.write_to(writer)?,
            Oracle::Rlz(text) => text.write_to(writer)?,
        };
        Ok(4 + body)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(match read_u32_le(reader)? {
            0 => Oracle::Packed(PackedText::read_from(reader)?),
            1 => Oracle::Rlz(RlzText::read_from(reader)?),
            tag => bail!("unknown text oracle tag {}", tag),
        })
    }
}
