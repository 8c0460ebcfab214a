//! Phi from a dictionary of run boundaries and a packed array of their successors.

use super::{PhiFunction, RunBoundaries, check_terminal};
use crate::succinct::{BitVector, EliasFano, IntVector, SuccinctDictionary};
use crate::utils::encoding::{Persist, bit_width, read_u64_le, write_u64_le};
use anyhow::{Result, bail};
use std::io::{self, Read, Write};

/// Dictionary that can hold the run boundaries of a [`RunTable`]
pub trait RunDictionary: SuccinctDictionary + Persist + Send + Sync {
    /// Encode strictly increasing positions below `universe`
    fn from_sorted(positions: &[u64], universe: u64) -> Result<Self>;

    fn size_in_bytes(&self) -> usize;
}

impl RunDictionary for EliasFano {
    fn from_sorted(positions: &[u64], universe: u64) -> Result<Self> {
        EliasFano::new(positions, universe)
    }

    fn size_in_bytes(&self) -> usize {
        EliasFano::size_in_bytes(self)
    }
}

impl RunDictionary for BitVector {
    fn from_sorted(positions: &[u64], universe: u64) -> Result<Self> {
        if let Some(&p) = positions.iter().find(|&&p| p >= universe) {
            bail!("run boundary {} outside universe {}", p, universe);
        }
        Ok(BitVector::from_positions(positions.iter().copied(), universe as usize))
    }

    fn size_in_bytes(&self) -> usize {
        BitVector::size_in_bytes(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTable<D> {
    /// Run boundaries `x`
    last: D,
    /// `phi(x)` for each boundary, by rank
    first: IntVector,
    terminal: u64,
    text_len: u64,
}

impl<D: RunDictionary> RunTable<D> {
    pub fn new(runs: &RunBoundaries) -> Result<Self> {
        let n = runs.text_len as u64;
        let last = D::from_sorted(&runs.positions(), n)?;
        let first = IntVector::from_values(bit_width(n), runs.values());
        Ok(Self {
            last,
            first,
            terminal: runs.terminal,
            text_len: n,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.last.size_in_bytes() + self.first.size_in_bytes() + 16
    }
}

impl<D: RunDictionary> PhiFunction for RunTable<D> {
    fn text_len(&self) -> usize {
        self.text_len as usize
    }

    fn terminal(&self) -> usize {
        self.terminal as usize
    }

    #[inline]
    fn phi_unsafe(&self, i: usize) -> usize {
        debug_assert!(i as u64 != self.terminal, "phi of the terminal {}", i);
        match self.last.successor_rank(i as u64) {
            Some((x, r)) => (self.first.get(r - 1) - (x - i as u64)) as usize,
            None => {
                debug_assert!(false, "no run boundary at or after {}", i);
                self.terminal as usize
            }
        }
    }

    fn run_count(&self) -> usize {
        self.last.no_ones()
    }
}

impl<D: RunDictionary> Persist for RunTable<D> {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u64_le(writer, self.text_len)?;
        write_u64_le(writer, self.terminal)?;
        let written = self.last.write_to(writer)? + self.first.write_to(writer)?;
        Ok(16 + written)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let text_len = read_u64_le(reader)?;
        let terminal = read_u64_le(reader)?;
        check_terminal(terminal, text_len)?;
        let last = D::read_from(reader)?;
        let first = IntVector::read_from(reader)?;
        if first.len() != last.no_ones() {
            bail!("run table has {} boundaries but {} successors", last.no_ones(), first.len());
        }
        Ok(Self {
            last,
            first,
            terminal,
            text_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs() -> RunBoundaries {
        // phi: 0->3, 1->4, 2->5 (one run ending at 2), 3->0 (boundary), 5 terminal, 4->1
        RunBoundaries {
            pairs: vec![(2, 5), (3, 0), (4, 1)],
            terminal: 5,
            first_end: 2,
            text_len: 6,
        }
    }

    #[test]
    fn test_gap_arithmetic() {
        let sparse: RunTable<EliasFano> = RunTable::new(&runs()).unwrap();
        let dense: RunTable<BitVector> = RunTable::new(&runs()).unwrap();
        for i in 0..5 {
            assert_eq!(sparse.phi_unsafe(i), dense.phi_unsafe(i));
        }
        assert_eq!(sparse.phi_unsafe(0), 3);
        assert_eq!(sparse.phi_unsafe(1), 4);
        assert_eq!(sparse.phi_unsafe(3), 0);
        assert_eq!(sparse.phi_safe(5), None);
        assert_eq!(sparse.run_count(), 3);
    }

    #[test]
    fn test_rejects_bad_terminal() {
        let table: RunTable<EliasFano> = RunTable::new(&runs()).unwrap();
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        // Terminal lives at bytes 8..16
        buf[8..16].copy_from_slice(&9u64.to_le_bytes());
        assert!(RunTable::<EliasFano>::read_from(&mut buf.as_slice()).is_err());
    }
}
