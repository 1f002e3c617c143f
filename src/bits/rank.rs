//! Rank index records for [`BitVector`](super::BitVector).
//!
//! One 12-byte record covers each 512-bit block:
//!
//! - `abs`: number of 1-bits before the block.
//! - `rel1..rel7`: number of 1-bits between the block start and the start of
//!   word `j` of the block, for `j` in `1..8`.
//!
//! The relative counts are packed into two `u32`s. `rel_j` can reach `64 * j`,
//! so the fields are 7, 8, 8 and 9 bits wide in `rel_lo` and 9 bits each in
//! `rel_hi`.

use bytemuck::{Pod, Zeroable};

/// Bits per rank block.
pub const BLOCK_BITS: usize = 512;

/// Words per rank block.
pub const BLOCK_WORDS: usize = BLOCK_BITS / 64;

/// `(in_hi, shift, width)` of `rel_j`, indexed by `j - 1`.
const REL_FIELDS: [(bool, u32, u32); 7] = [
    (false, 0, 7),
    (false, 7, 8),
    (false, 15, 8),
    (false, 23, 9),
    (true, 0, 9),
    (true, 9, 9),
    (true, 18, 9),
];

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct RankIndex {
    abs: u32,
    rel_lo: u32,
    rel_hi: u32,
}

impl RankIndex {
    /// 1-bits before this block.
    #[inline]
    pub fn abs(&self) -> usize {
        self.abs as usize
    }

    #[inline]
    pub fn set_abs(&mut self, value: usize) {
        debug_assert!(value <= u32::MAX as usize);
        self.abs = value as u32;
    }

    /// 1-bits from the block start to the start of word `j`.
    ///
    /// `rel(0)` is always 0.
    #[inline]
    pub fn rel(&self, j: usize) -> usize {
        debug_assert!(j < BLOCK_WORDS);
        if j == 0 {
            return 0;
        }
        let (in_hi, shift, width) = REL_FIELDS[j - 1];
        let word = if in_hi { self.rel_hi } else { self.rel_lo };
        ((word >> shift) & ((1u32 << width) - 1)) as usize
    }

    #[inline]
    pub fn set_rel(&mut self, j: usize, value: usize) {
        debug_assert!((1..BLOCK_WORDS).contains(&j));
        debug_assert!(value <= 64 * j);
        let (in_hi, shift, width) = REL_FIELDS[j - 1];
        let mask = ((1u32 << width) - 1) << shift;
        let word = if in_hi {
            &mut self.rel_hi
        } else {
            &mut self.rel_lo
        };
        *word = (*word & !mask) | (((value as u32) << shift) & mask);
    }
}
