//! Bitvector with constant-time rank and sampled select.
//!
//! A [`BitVector`] is built once from a [`BitVectorBuilder`] and is read-only
//! afterwards. Construction computes a [`RankIndex`] for every 512-bit block
//! and, on request, samples the position of every 512th zero and every 512th
//! one. Each sample array ends with a sentinel equal to the bit count.
//!
//! # Serialized form
//!
//! | Field | Encoding |
//! |-------|----------|
//! | units | blob of `u64` |
//! | size | `u32` |
//! | num_1s | `u32` |
//! | ranks | blob of 12-byte [`RankIndex`] |
//! | select0s | blob of `u32` |
//! | select1s | blob of `u32` |

use crate::binary::PodVec;
use crate::bits::popcount::{popcount_low, popcount_word};
use crate::bits::rank::{RankIndex, BLOCK_BITS, BLOCK_WORDS};
use crate::error::{Error, Result};
use crate::io::{Source, Writer};
use crate::util::select_in_word;
use crate::RankSelect;
use std::io::Write;

/// Block windows at most this wide are scanned linearly during select.
const LINEAR_SCAN_BLOCKS: usize = 10;

/// Append-only staging area for a [`BitVector`].
#[derive(Clone, Debug, Default)]
pub struct BitVectorBuilder {
    units: Vec<u64>,
    size: usize,
    num_1s: usize,
}

impl BitVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bit.
    #[inline]
    pub fn push(&mut self, bit: bool) {
        if self.size % 64 == 0 {
            self.units.push(0);
        }
        if bit {
            if let Some(unit) = self.units.last_mut() {
                *unit |= 1u64 << (self.size % 64);
            }
            self.num_1s += 1;
        }
        self.size += 1;
    }

    /// Number of bits pushed so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Finalize into a read-only bitvector.
    ///
    /// Select sampling is only computed for the kinds requested; calling
    /// `select0`/`select1` on a vector built without it is a contract
    /// violation.
    ///
    /// # Errors
    ///
    /// [`Error::Size`] if more than `u32::MAX` bits were pushed.
    pub fn build(self, enable_select0: bool, enable_select1: bool) -> Result<BitVector> {
        if self.size > u32::MAX as usize {
            return Err(Error::Size("bitvector longer than u32::MAX bits"));
        }
        let mut bv = BitVector {
            units: self.units.into(),
            size: self.size,
            num_1s: self.num_1s,
            ..BitVector::default()
        };
        bv.build_index(enable_select0, enable_select1);
        Ok(bv)
    }
}

/// Read-only bitvector with rank and select support.
#[derive(Clone, Debug, Default)]
pub struct BitVector {
    units: PodVec<u64>,
    size: usize,
    num_1s: usize,
    ranks: PodVec<RankIndex>,
    select0s: PodVec<u32>,
    select1s: PodVec<u32>,
}

impl BitVector {
    /// Build a bitvector directly from a bit sequence.
    pub fn from_bits<I>(bits: I, enable_select0: bool, enable_select1: bool) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut builder = BitVectorBuilder::new();
        for bit in bits {
            builder.push(bit);
        }
        builder.build(enable_select0, enable_select1)
    }

    fn build_index(&mut self, enable_select0: bool, enable_select1: bool) {
        let size = self.size;
        let num_blocks = size.div_ceil(BLOCK_BITS);
        let mut ranks = vec![RankIndex::default(); num_blocks + 1];
        let mut select0s = Vec::new();
        let mut select1s = Vec::new();

        let mut num_0s = 0usize;
        let mut num_1s = 0usize;
        for (unit_id, &unit) in self.units.iter().enumerate() {
            let bit_id = unit_id * 64;
            let block = &mut ranks[bit_id / BLOCK_BITS];
            match unit_id % BLOCK_WORDS {
                0 => block.set_abs(num_1s),
                j => block.set_rel(j, num_1s - block.abs()),
            }

            let unit_num_1s = popcount_word(unit);
            if enable_select0 {
                let unit_num_0s = (size - bit_id).min(64) - unit_num_1s;
                // Zeros still needed before the next sampled zero.
                let gap = num_0s.wrapping_neg() % BLOCK_BITS;
                if unit_num_0s > gap {
                    select0s.push((bit_id + select_in_word(!unit, gap)) as u32);
                }
                num_0s += unit_num_0s;
            }
            if enable_select1 {
                let gap = num_1s.wrapping_neg() % BLOCK_BITS;
                if unit_num_1s > gap {
                    select1s.push((bit_id + select_in_word(unit, gap)) as u32);
                }
            }
            num_1s += unit_num_1s;
        }

        // Words past the end of a partial final block see every remaining bit.
        if size % BLOCK_BITS != 0 {
            let block = &mut ranks[(size - 1) / BLOCK_BITS];
            let last_word = ((size - 1) / 64) % BLOCK_WORDS;
            for j in last_word + 1..BLOCK_WORDS {
                block.set_rel(j, num_1s - block.abs());
            }
        }
        ranks[num_blocks].set_abs(num_1s);
        debug_assert_eq!(num_1s, self.num_1s);

        if enable_select0 {
            select0s.push(size as u32);
        }
        if enable_select1 {
            select1s.push(size as u32);
        }

        self.ranks = ranks.into();
        self.select0s = select0s.into();
        self.select1s = select1s.into();
    }

    /// Get bit at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.size, "index {} out of bounds for length {}", i, self.size);
        (self.units[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn num_1s(&self) -> usize {
        self.num_1s
    }

    #[inline]
    pub fn num_0s(&self) -> usize {
        self.size - self.num_1s
    }

    /// Whether zero positions were sampled at build time.
    #[inline]
    pub fn has_select0(&self) -> bool {
        !self.select0s.is_empty()
    }

    /// Whether one positions were sampled at build time.
    #[inline]
    pub fn has_select1(&self) -> bool {
        !self.select1s.is_empty()
    }

    /// Count 1-bits in `[0, i)`.
    ///
    /// Requires `i <= len()`; checked in debug builds only.
    #[inline]
    pub fn rank1_unchecked(&self, i: usize) -> usize {
        debug_assert!(i <= self.size, "rank index {} beyond length {}", i, self.size);
        let rank = &self.ranks[i / BLOCK_BITS];
        let mut offset = rank.abs() + rank.rel((i / 64) % BLOCK_WORDS);
        if i % 64 != 0 {
            offset += popcount_low(self.units[i / 64], i % 64);
        }
        offset
    }

    /// Count 0-bits in `[0, i)`.
    ///
    /// Requires `i <= len()`; checked in debug builds only.
    #[inline]
    pub fn rank0_unchecked(&self, i: usize) -> usize {
        i - self.rank1_unchecked(i)
    }

    /// Position of the `i`-th 0-bit (0-indexed).
    ///
    /// Requires `i < num_0s()` and select0 sampling; checked in debug builds
    /// only.
    #[inline]
    pub fn select0_unchecked(&self, i: usize) -> usize {
        debug_assert!(self.has_select0(), "select0 sampling not enabled");
        debug_assert!(i < self.num_0s(), "select0 rank {} out of range", i);
        self.select::<true>(i)
    }

    /// Position of the `i`-th 1-bit (0-indexed).
    ///
    /// Requires `i < num_1s()` and select1 sampling; checked in debug builds
    /// only.
    #[inline]
    pub fn select1_unchecked(&self, i: usize) -> usize {
        debug_assert!(self.has_select1(), "select1 sampling not enabled");
        debug_assert!(i < self.num_1s, "select1 rank {} out of range", i);
        self.select::<false>(i)
    }

    /// Bits of the requested kind before block `block`.
    #[inline]
    fn count_before_block<const ZEROS: bool>(&self, block: usize) -> usize {
        let ones = self.ranks[block].abs();
        if ZEROS {
            block * BLOCK_BITS - ones
        } else {
            ones
        }
    }

    fn select<const ZEROS: bool>(&self, i: usize) -> usize {
        let samples = if ZEROS { &self.select0s } else { &self.select1s };
        let sample_id = i / BLOCK_BITS;
        if i % BLOCK_BITS == 0 {
            return samples[sample_id] as usize;
        }

        // The target lies between this sample and the next one.
        let mut begin = samples[sample_id] as usize / BLOCK_BITS;
        let mut end = (samples[sample_id + 1] as usize).div_ceil(BLOCK_BITS);
        if begin + LINEAR_SCAN_BLOCKS >= end {
            while i >= self.count_before_block::<ZEROS>(begin + 1) {
                begin += 1;
            }
        } else {
            while begin + 1 < end {
                let middle = (begin + end) / 2;
                if i < self.count_before_block::<ZEROS>(middle) {
                    end = middle;
                } else {
                    begin = middle;
                }
            }
        }

        let i = i - self.count_before_block::<ZEROS>(begin);
        let rank = &self.ranks[begin];
        let rel = |j: usize| {
            if ZEROS {
                64 * j - rank.rel(j)
            } else {
                rank.rel(j)
            }
        };

        // Largest word j of the block with rel(j) <= i.
        let mut j = if i < rel(4) { 0 } else { 4 };
        if i >= rel(j + 2) {
            j += 2;
        }
        if i >= rel(j + 1) {
            j += 1;
        }

        let unit_id = begin * BLOCK_WORDS + j;
        let unit = if ZEROS {
            !self.units[unit_id]
        } else {
            self.units[unit_id]
        };
        unit_id * 64 + select_in_word(unit, i - rel(j))
    }

    /// Heap bytes held by this bitvector.
    pub fn total_size(&self) -> usize {
        self.units.byte_len()
            + self.ranks.byte_len()
            + self.select0s.byte_len()
            + self.select1s.byte_len()
    }

    /// Serialized size in bytes.
    pub fn io_size(&self) -> usize {
        self.units.io_size()
            + 8
            + self.ranks.io_size()
            + self.select0s.io_size()
            + self.select1s.io_size()
    }

    pub(crate) fn read_from<S: Source>(src: &mut S) -> Result<Self> {
        let units = src.read_vec::<u64>()?;
        let size = src.read_u32()? as usize;
        let num_1s = src.read_u32()? as usize;
        if num_1s > size {
            return Err(Error::format(format!(
                "bitvector claims {} ones in {} bits",
                num_1s, size
            )));
        }
        if units.len() != size.div_ceil(64) {
            return Err(Error::format(format!(
                "bitvector of {} bits carries {} words",
                size,
                units.len()
            )));
        }
        let ranks = src.read_vec::<RankIndex>()?;
        // An unbuilt empty vector carries no rank records.
        let expected_ranks = if size == 0 && ranks.is_empty() {
            0
        } else {
            size.div_ceil(BLOCK_BITS) + 1
        };
        if ranks.len() != expected_ranks {
            return Err(Error::format(format!(
                "bitvector of {} bits carries {} rank records",
                size,
                ranks.len()
            )));
        }
        let select0s = src.read_vec::<u32>()?;
        let select1s = src.read_vec::<u32>()?;
        Ok(Self {
            units,
            size,
            num_1s,
            ranks,
            select0s,
            select1s,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_vec(&self.units)?;
        writer.write_u32(self.size as u32)?;
        writer.write_u32(self.num_1s as u32)?;
        writer.write_vec(&self.ranks)?;
        writer.write_vec(&self.select0s)?;
        writer.write_vec(&self.select1s)
    }
}

impl RankSelect for BitVector {
    #[inline]
    fn rank1(&self, i: usize) -> usize {
        if self.ranks.is_empty() {
            return 0;
        }
        self.rank1_unchecked(i.min(self.size))
    }

    #[inline]
    fn rank0(&self, i: usize) -> usize {
        let i = i.min(self.size);
        i - self.rank1(i)
    }

    #[inline]
    fn select0(&self, k: usize) -> Option<usize> {
        if !self.has_select0() || k >= self.num_0s() {
            return None;
        }
        Some(self.select::<true>(k))
    }

    #[inline]
    fn select1(&self, k: usize) -> Option<usize> {
        if !self.has_select1() || k >= self.num_1s {
            return None;
        }
        Some(self.select::<false>(k))
    }
}
