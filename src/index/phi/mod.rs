//! Phi: the successor of a prefix in colex order.
//!
//! `phi(end(k)) = end(k + 1)` where `end(k)` is the text position where the
//! prefix of row `k` ends. The last row has no successor; its end position is
//! the terminal `L`. All occurrences of a pattern are consecutive rows, so
//! once the colex-smallest one is known the rest follow by applying phi.
//!
//! Rows `k` and `k + 1` with the same reversed-BWT symbol extend to adjacent
//! rows, hence `phi(x + 1) = phi(x) + 1` unless `x` is a run boundary. Only
//! the boundaries are stored, as `(x, phi(x))` sorted by `x`:
//!
//! - [`RunTable`] over any [`SuccinctDictionary`] of boundaries plus packed values
//! - [`InterleavedPhi`] with values inside the Elias-Fano dictionary
//! - [`MovePhi`] splitting the permutation into intervals and stepping with a cursor

pub mod interleaved;
pub mod move_table;
pub mod run_table;

pub use interleaved::InterleavedPhi;
pub use move_table::{MoveCursor, MovePhi};
pub use run_table::{RunDictionary, RunTable};

use super::inputs::PrefixArrayView;
use super::types::PhiBackend;
use crate::succinct::{BitVector, EliasFano};
use crate::utils::encoding::{Persist, read_u32_le, write_u32_le};
use anyhow::{Result, bail};
use std::io::{self, Read, Write};

/// Colex successor over text positions.
pub trait PhiFunction: Send + Sync {
    /// Number of text positions
    fn text_len(&self) -> usize;

    /// End position of the colex-largest prefix, which has no successor
    fn terminal(&self) -> usize;

    /// Successor of `i`. `i` must not be the terminal.
    fn phi_unsafe(&self, i: usize) -> usize;

    /// Successor of `i`, `None` at the terminal
    fn phi_safe(&self, i: usize) -> Option<usize> {
        (i != self.terminal()).then(|| self.phi_unsafe(i))
    }

    /// Number of stored boundaries (or intervals)
    fn run_count(&self) -> usize;
}

/// Run boundaries read from the prefix array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunBoundaries {
    /// `(x, phi(x))` sorted by `x`
    pub pairs: Vec<(u64, u64)>,
    /// End of the colex-largest prefix
    pub terminal: u64,
    /// End of the colex-smallest prefix
    pub first_end: u64,
    pub text_len: usize,
}

impl RunBoundaries {
    pub fn from_view(view: &PrefixArrayView<'_>) -> Result<Self> {
        let n = view.text_len();
        if n == 0 {
            bail!("cannot build phi over an empty text");
        }
        let mut pairs = Vec::new();
        let mut prev_end = view.end(1);
        let mut prev_bwt = view.bwt(1);
        for k in 2..=n {
            let end = view.end(k);
            let bwt = view.bwt(k);
            if bwt != prev_bwt {
                pairs.push((prev_end, end));
            }
            prev_end = end;
            prev_bwt = bwt;
        }
        pairs.sort_unstable_by_key(|&(x, _)| x);
        if let Some(pair) = pairs.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            bail!("prefix array lists position {} twice", pair[0].0);
        }
        Ok(Self {
            pairs,
            terminal: prev_end,
            first_end: view.end(1),
            text_len: n,
        })
    }

    pub fn positions(&self) -> Vec<u64> {
        self.pairs.iter().map(|&(x, _)| x).collect()
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = u64> + '_ {
        self.pairs.iter().map(|&(_, v)| v)
    }
}

macro_rules! dispatch {
    ($self:ident, $phi:ident => $body:expr) => {
        match $self {
            Phi::Table($phi) => $body,
            Phi::Dense($phi) => $body,
            Phi::Interleaved($phi) => $body,
            Phi::Move($phi) => $body,
        }
    };
}

/// The phi structure owned by an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phi {
    Table(RunTable<EliasFano>),
    Dense(RunTable<BitVector>),
    Interleaved(InterleavedPhi),
    Move(MovePhi),
}

impl Phi {
    pub fn build(view: &PrefixArrayView<'_>, backend: PhiBackend) -> Result<Self> {
        let runs = RunBoundaries::from_view(view)?;
        Ok(match backend {
            PhiBackend::EliasFano => Phi::Table(RunTable::new(&runs)?),
            PhiBackend::Dense => Phi::Dense(RunTable::new(&runs)?),
            PhiBackend::Interleaved => Phi::Interleaved(InterleavedPhi::new(&runs)?),
            PhiBackend::Move => Phi::Move(MovePhi::new(&runs)?),
        })
    }

    pub fn backend(&self) -> PhiBackend {
        match self {
            Phi::Table(_) => PhiBackend::EliasFano,
            Phi::Dense(_) => PhiBackend::Dense,
            Phi::Interleaved(_) => PhiBackend::Interleaved,
            Phi::Move(_) => PhiBackend::Move,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        dispatch!(self, phi => phi.size_in_bytes())
    }

    /// Successive phi values after `start`, ending with the terminal
    pub fn walk(&self, start: usize) -> PhiWalk<'_> {
        let cursor = match self {
            Phi::Move(phi) => Some(phi.cursor(start)),
            _ => None,
        };
        PhiWalk {
            phi: self,
            current: Some(start),
            cursor,
        }
    }

    fn tag(&self) -> u32 {
        match self {
            Phi::Table(_) => 0,
            Phi::Dense(_) => 1,
            Phi::Interleaved(_) => 2,
            Phi::Move(_) => 3,
        }
    }
}

impl PhiFunction for Phi {
    fn text_len(&self) -> usize {
        dispatch!(self, phi => phi.text_len())
    }

    fn terminal(&self) -> usize {
        dispatch!(self, phi => phi.terminal())
    }

    #[inline]
    fn phi_unsafe(&self, i: usize) -> usize {
        dispatch!(self, phi => phi.phi_unsafe(i))
    }

    fn run_count(&self) -> usize {
        dispatch!(self, phi => phi.run_count())
    }
}

/// Iterator returned by [`Phi::walk`]
pub struct PhiWalk<'a> {
    phi: &'a Phi,
    current: Option<usize>,
    cursor: Option<MoveCursor>,
}

impl Iterator for PhiWalk<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.current?;
        if current == self.phi.terminal() {
            self.current = None;
            return None;
        }
        let next = match (self.phi, self.cursor.as_mut()) {
            (Phi::Move(phi), Some(cursor)) => {
                let (moved, pos) = phi.step(*cursor);
                *cursor = moved;
                pos
            }
            (phi, _) => phi.phi_unsafe(current),
        };
        self.current = Some(next);
        Some(next)
    }
}

impl Persist for Phi {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u32_le(writer, self.tag())?;
        let body = dispatch!(self, phi => phi.write_to(writer)?);
        Ok(4 + body)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(match read_u32_le(reader)? {
            0 => Phi::Table(RunTable::read_from(reader)?),
            1 => Phi::Dense(RunTable::read_from(reader)?),
            2 => Phi::Interleaved(InterleavedPhi::read_from(reader)?),
            3 => Phi::Move(MovePhi::read_from(reader)?),
            tag => bail!("unknown phi tag {}", tag),
        })
    }
}

/// Shared check for deserialized phi structures
pub(crate) fn check_terminal(terminal: u64, text_len: u64) -> Result<()> {
    if terminal >= text_len.max(1) {
        bail!("phi terminal {} outside text of {} symbols", terminal, text_len);
    }
    Ok(())
}
