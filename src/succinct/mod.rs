//! Succinct building blocks.
//!
//! - [`bitvec`] - plain rank/select bit vector
//! - [`int_vector`] - fixed-width packed integers
//! - [`elias_fano`] - Elias-Fano dictionary, optionally carrying a value per key
//!
//! The phi tables are written against [`SuccinctDictionary`] so either a dense
//! bit vector or an Elias-Fano dictionary can hold the run boundaries.

pub mod bitvec;
pub mod elias_fano;
pub mod int_vector;

pub use bitvec::BitVector;
pub use elias_fano::EliasFano;
pub use int_vector::IntVector;

/// Rank/select over a set of one-bits in `[0, size())`.
pub trait SuccinctDictionary {
    /// Length of the universe
    fn size(&self) -> usize;

    /// Number of stored ones
    fn no_ones(&self) -> usize;

    /// Ones strictly before `i`; `no_ones()` when `i` is past the end
    fn rank1(&self, i: u64) -> usize;

    /// Position of the one with rank `r` (0-indexed). `r` must be below `no_ones()`.
    fn select1(&self, r: usize) -> u64;

    /// Position of the first one `>= i` and its rank plus one.
    ///
    /// `None` when every one lies before `i`.
    fn successor_rank(&self, i: u64) -> Option<(u64, usize)> {
        let r = self.rank1(i);
        (r < self.no_ones()).then(|| (self.select1(r), r + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Both backends must agree on the trait contract
    #[test]
    fn test_backends_agree() {
        let ones = [0u64, 5, 6, 130, 513, 999];
        let dense = BitVector::from_positions(ones, 1000);
        let sparse = EliasFano::new(&ones, 1000).unwrap();
        let backends: [&dyn SuccinctDictionary; 2] = [&dense, &sparse];
        for dict in backends {
            assert_eq!(dict.size(), 1000);
            assert_eq!(dict.no_ones(), ones.len());
            for i in 0..1001u64 {
                let expected = ones.iter().filter(|&&p| p < i).count();
                assert_eq!(dict.rank1(i), expected);
                let succ = ones.iter().position(|&p| p >= i).map(|r| (ones[r], r + 1));
                assert_eq!(dict.successor_rank(i), succ);
            }
            for (r, &p) in ones.iter().enumerate() {
                assert_eq!(dict.select1(r), p);
            }
        }
    }
}
