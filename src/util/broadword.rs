//! Broadword (SWAR) algorithms for bit manipulation.
//!
//! These algorithms operate on 64-bit words using SIMD-within-a-register
//! techniques. Every select backend here shares one contract: given a word
//! and a rank `k` below its popcount, return the position (0-63) of the
//! k-th set bit, counting from the least significant end.

use crate::util::table::{PREFIX_SUM_OVERFLOW, SELECT_IN_BYTE};

/// Constant with 1 in each byte's LSB position.
pub const L8: u64 = 0x0101_0101_0101_0101;

/// Constant with 1 in each byte's MSB position.
pub const H8: u64 = 0x8080_8080_8080_8080;

const MASK_55: u64 = 0x5555_5555_5555_5555;
const MASK_33: u64 = 0x3333_3333_3333_3333;
const MASK_0F: u64 = 0x0F0F_0F0F_0F0F_0F0F;

/// Select the k-th set bit (0-indexed) in a 64-bit word.
///
/// `k` must be below `x.count_ones()`; this is checked in debug builds only.
///
/// On x86_64 CPUs with BMI2 this uses PDEP, detected once at runtime.
/// Otherwise it falls back to the portable prefix-sum/table algorithm.
#[inline]
pub fn select_in_word(x: u64, k: usize) -> usize {
    debug_assert!(
        k < x.count_ones() as usize,
        "select rank {} out of range for word {:#018x}",
        k,
        x
    );

    #[cfg(target_arch = "x86_64")]
    {
        if has_bmi2() {
            // SAFETY: BMI2 support was verified at runtime
            return unsafe { select_in_word_pdep(x, k) };
        }
    }

    select_in_word_portable(x, k)
}

/// Cached runtime detection of BMI2.
#[cfg(target_arch = "x86_64")]
#[inline]
fn has_bmi2() -> bool {
    use core::sync::atomic::{AtomicU8, Ordering};

    // 0 = unknown, 1 = available, 2 = not available
    static HAS_BMI2: AtomicU8 = AtomicU8::new(0);

    match HAS_BMI2.load(Ordering::Relaxed) {
        1 => true,
        2 => false,
        _ => {
            let detected = std::arch::is_x86_feature_detected!("bmi2");
            HAS_BMI2.store(if detected { 1 } else { 2 }, Ordering::Relaxed);
            detected
        }
    }
}

/// Select using PDEP: deposit a single bit at the k-th set position.
///
/// # Safety
///
/// The CPU must support BMI2.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "bmi2")]
#[inline]
unsafe fn select_in_word_pdep(x: u64, k: usize) -> usize {
    use core::arch::x86_64::_pdep_u64;
    _pdep_u64(1u64 << k, x).trailing_zeros() as usize
}

/// Per-byte popcounts of `x`, one count in each byte lane.
#[inline]
pub(crate) fn byte_counts(x: u64) -> u64 {
    let t = x - ((x >> 1) & MASK_55);
    let t = (t & MASK_33) + ((t >> 2) & MASK_33);
    (t + (t >> 4)) & MASK_0F
}

/// Portable select: cumulative byte popcounts locate the byte, a table
/// lookup finishes inside it.
#[inline]
pub(crate) fn select_in_word_portable(x: u64, k: usize) -> usize {
    // Byte j of `sums` holds the popcount of bytes 0..=j.
    let sums = byte_counts(x).wrapping_mul(L8);

    let overflow = sums.wrapping_add(PREFIX_SUM_OVERFLOW[k]) & H8;
    let skip = (overflow >> 7).trailing_zeros() as usize;

    let below = ((sums << 8) >> skip) as usize & 0xFF;
    let byte = (x >> skip) as usize & 0xFF;
    skip + SELECT_IN_BYTE[k - below][byte] as usize
}

/// Select using a CTZ (count trailing zeros) loop.
///
/// O(k), used as the reference the other backends are checked against.
#[inline]
#[allow(dead_code)]
pub(crate) fn select_in_word_ctz(x: u64, k: usize) -> usize {
    let mut val = x;
    for _ in 0..k {
        val &= val - 1; // Clear lowest set bit
    }
    val.trailing_zeros() as usize
}
