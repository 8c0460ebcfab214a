//! Move table over the phi permutation.
//!
//! Extending phi with `phi(L) = end(1)` makes it a permutation of text
//! positions. It is cut into maximal intervals on which it is a shift
//! (`phi(x) = phi(x - 1) + 1`). For each interval we store where its first
//! position lands as `(block, offset)`, the block being the interval that
//! contains the image. A [`MoveCursor`] remembers the block of the current
//! position, so stepping needs no successor query: add the offset and move
//! forward over the blocks the image overflows.

use super::{PhiFunction, RunBoundaries, check_terminal};
use crate::succinct::{EliasFano, IntVector};
use crate::utils::encoding::{Persist, bit_width, read_u32_le, read_u64_le, write_u32_le, write_u64_le};
use anyhow::{Result, bail};
use std::io::{self, Read, Write};

/// Position state carried between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCursor {
    pub block: usize,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePhi {
    /// First position of every interval
    borders: EliasFano,
    /// `(block << offset_width) | offset` of each interval's image
    blocks: IntVector,
    offset_width: u32,
    terminal: u64,
    text_len: u64,
}

impl MovePhi {
    pub fn new(runs: &RunBoundaries) -> Result<Self> {
        let n = runs.text_len as u64;
        // Boundaries plus the terminal closing the cycle; every position has one at or after it
        let mut pairs = runs.pairs.clone();
        pairs.push((runs.terminal, runs.first_end));
        pairs.sort_unstable_by_key(|&(x, _)| x);

        // Each segment (previous boundary, boundary] is a shift; merge segments that continue
        let mut starts: Vec<u64> = Vec::new();
        let mut images: Vec<u64> = Vec::new();
        let mut prev: Option<(u64, u64)> = None;
        for &(x, value) in &pairs {
            let seg_start = prev.map_or(0, |(px, _)| px + 1);
            if seg_start > x {
                bail!("run boundary {} listed twice", x);
            }
            let Some(image) = value.checked_sub(x - seg_start) else {
                bail!("run boundary {} maps below the text start", x);
            };
            let continues = prev.is_some_and(|(_, pv)| pv + 1 == image);
            if !continues {
                starts.push(seg_start);
                images.push(image);
            }
            prev = Some((x, value));
        }
        if prev.map(|(x, _)| x + 1) != Some(n) {
            bail!("run boundaries do not cover the text of {} symbols", n);
        }

        let widest = starts
            .iter()
            .zip(starts.iter().skip(1).chain(std::iter::once(&n)))
            .map(|(s, e)| e - s)
            .max()
            .unwrap_or(1);
        let offset_width = bit_width(widest);
        let block_width = bit_width(starts.len() as u64);
        let mut blocks = IntVector::new(offset_width + block_width, starts.len());
        for (j, &image) in images.iter().enumerate() {
            let block = starts.partition_point(|&s| s <= image) - 1;
            let offset = image - starts[block];
            blocks.set(j, ((block as u64) << offset_width) | offset);
        }

        Ok(Self {
            borders: EliasFano::new(&starts, n)?,
            blocks,
            offset_width,
            terminal: runs.terminal,
            text_len: n,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.borders.size_in_bytes() + self.blocks.size_in_bytes() + 20
    }

    #[inline]
    fn start(&self, block: usize) -> u64 {
        if block < self.borders.len() {
            self.borders.select1(block)
        } else {
            self.text_len
        }
    }

    /// Cursor for text position `x`
    pub fn cursor(&self, x: usize) -> MoveCursor {
        let block = self.borders.rank1(x as u64 + 1) - 1;
        MoveCursor {
            block,
            offset: x as u64 - self.start(block),
        }
    }

    /// Apply phi to the cursor's position, returning the new cursor and position
    #[inline]
    pub fn step(&self, cursor: MoveCursor) -> (MoveCursor, usize) {
        let packed = self.blocks.get(cursor.block);
        let mut block = (packed >> self.offset_width) as usize;
        let mut offset = (packed & ((1u64 << self.offset_width) - 1)) + cursor.offset;
        let mut start = self.start(block);
        loop {
            let end = self.start(block + 1);
            if start + offset < end || block + 1 >= self.borders.len() {
                break;
            }
            offset -= end - start;
            start = end;
            block += 1;
        }
        (MoveCursor { block, offset }, (start + offset) as usize)
    }
}

impl PhiFunction for MovePhi {
    fn text_len(&self) -> usize {
        self.text_len as usize
    }

    fn terminal(&self) -> usize {
        self.terminal as usize
    }

    fn phi_unsafe(&self, i: usize) -> usize {
        debug_assert!(i as u64 != self.terminal, "phi of the terminal {}", i);
        self.step(self.cursor(i)).1
    }

    fn run_count(&self) -> usize {
        self.borders.len()
    }
}

impl Persist for MovePhi {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        write_u64_le(writer, self.text_len)?;
        write_u64_le(writer, self.terminal)?;
        write_u32_le(writer, self.offset_width)?;
        let written = self.borders.write_to(writer)? + self.blocks.write_to(writer)?;
        Ok(20 + written)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let text_len = read_u64_le(reader)?;
        let terminal = read_u64_le(reader)?;
        check_terminal(terminal, text_len)?;
        let offset_width = read_u32_le(reader)?;
        let borders = EliasFano::read_from(reader)?;
        let blocks = IntVector::read_from(reader)?;
        if blocks.len() != borders.len() || offset_width > blocks.width() {
            bail!("move table has {} intervals but {} blocks", borders.len(), blocks.len());
        }
        Ok(Self {
            borders,
            blocks,
            offset_width,
            terminal,
            text_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals_merge_continuing_segments() {
        // phi: 0->3, 1->4, 2->5, 3->0, 4->1, terminal 5 (-> 2 when closed)
        let runs = RunBoundaries {
            pairs: vec![(2, 5), (3, 0), (4, 1)],
            terminal: 5,
            first_end: 2,
            text_len: 6,
        };
        let phi = MovePhi::new(&runs).unwrap();
        // Closing the cycle with 5 -> 2 extends [3, 5) -> 0 to the end
        assert_eq!(phi.run_count(), 2);
        let expected = [3, 4, 5, 0, 1];
        for (i, &succ) in expected.iter().enumerate() {
            assert_eq!(phi.phi_unsafe(i), succ);
        }
        assert_eq!(phi.cursor(4), MoveCursor { block: 1, offset: 1 });
    }

    #[test]
    fn test_step_crosses_blocks() {
        // Cycle 0 -> 3 -> 6 -> 2 -> 5 -> 1 -> 4, terminal 4.
        // Interval [0, 4) lands on [3, 7), spanning both blocks.
        let runs = RunBoundaries {
            pairs: vec![(3, 6), (6, 2)],
            terminal: 4,
            first_end: 0,
            text_len: 7,
        };
        let phi = MovePhi::new(&runs).unwrap();
        assert_eq!(phi.run_count(), 2);
        let mut cursor = phi.cursor(0);
        let mut seen = Vec::new();
        for _ in 0..6 {
            let (next, pos) = phi.step(cursor);
            seen.push(pos);
            cursor = next;
            assert_eq!(phi.cursor(pos), cursor);
        }
        assert_eq!(seen, vec![3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn test_rejects_uncovered_tail() {
        let runs = RunBoundaries {
            pairs: vec![(2, 0)],
            terminal: 1,
            first_end: 2,
            text_len: 5,
        };
        assert!(MovePhi::new(&runs).is_err());
    }
}
