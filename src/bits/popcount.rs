//! Popcount implementations with compile-time switching.
//!
//! - Default: Uses Rust's `count_ones()` which auto-vectorizes
//! - `simd`: Uses the POPCNT-backed intrinsic path
//! - `portable-popcount`: Uses the broadword algorithm (no intrinsics)
//!
//! Feature priority (when multiple enabled): portable-popcount > simd > default

/// Popcount a single u64 word.
#[inline(always)]
pub fn popcount_word(word: u64) -> usize {
    #[cfg(feature = "portable-popcount")]
    {
        let sums = crate::util::broadword::byte_counts(word)
            .wrapping_mul(crate::util::broadword::L8);
        (sums >> 56) as usize
    }

    #[cfg(all(feature = "simd", not(feature = "portable-popcount")))]
    {
        // count_ones compiles to POPCNT when the target enables it
        word.count_ones() as usize
    }

    #[cfg(not(any(feature = "portable-popcount", feature = "simd")))]
    {
        word.count_ones() as usize
    }
}

/// Popcount of the lowest `n` bits of `word`, for `n` in `0..64`.
#[inline(always)]
pub(crate) fn popcount_low(word: u64, n: usize) -> usize {
    debug_assert!(n < 64);
    popcount_word(word & ((1u64 << n) - 1))
}
