//! Phi with run boundaries and successors in one interleaved Elias-Fano dictionary.
//!
//! A single successor query returns both the boundary and its phi value, so
//! each step touches one structure instead of two.

use super::{PhiFunction, RunBoundaries, check_terminal};
use crate::succinct::EliasFano;
use crate::utils::encoding::{Persist, bit_width, read_u64_le, write_u64_le};
use anyhow::Result;
use std::io::{self, Read, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedPhi {
    runs: EliasFano,
    terminal: u64,
    text_len: u64,
}

impl InterleavedPhi {
    pub fn new(runs: &RunBoundaries) -> Result<Self> {
        let n = runs.text_len as u64;
        Ok(Self {
            runs: EliasFano::interleaved(&runs.pairs, n, bit_width(n))?,
            terminal: runs.terminal,
            text_len: n,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.runs.size_in_bytes() + 16
    }
}

impl PhiFunction for InterleavedPhi {
    fn text_len(&self) -> usize {
        self.text_len as usize
    }

    fn terminal(&self) -> usize {
        self.terminal as usize
    }

    #[inline]
    fn phi_unsafe(&self, i: usize) -> usize {
        debug_assert!(i as u64 != self.terminal, "phi of the terminal {}", i);
        match self.runs.successor_value(i as u64) {
            Some((x, first)) => (first - (x - i as u64)) as usize,
            None => {
                debug_assert!(false, "no run boundary at or after {}", i);
                self.terminal as usize
            }
        }
    }

    fn run_count(&self) -> usize {
        self.runs.len()
    }
}

impl Persist for InterleavedPhi {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u64_le(writer, self.text_len)?;
        write_u64_le(writer, self.terminal)?;
        Ok(16 + self.runs.write_to(writer)?)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let text_len = read_u64_le(reader)?;
        let terminal = read_u64_le(reader)?;
        check_terminal(terminal, text_len)?;
        Ok(Self {
            runs: EliasFano::read_from(reader)?,
            terminal,
            text_len,
        })
    }
}
