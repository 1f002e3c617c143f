//! Precomputed lookup tables for select operations.
//!
//! `SELECT_IN_BYTE` answers "where is the k-th set bit of this byte" in one
//! load, and `PREFIX_SUM_OVERFLOW` lets the broadword select locate the byte
//! holding the k-th set bit of a word without a loop.

/// Position table for select-in-byte, indexed `[k][byte]`.
///
/// `SELECT_IN_BYTE[k][b]` is the position (0-7) of the k-th set bit
/// (0-indexed) of `b`, or 8 if `b` has fewer than `k + 1` set bits.
///
/// Table size: 8 ranks × 256 bytes = 2048 bytes
pub(crate) static SELECT_IN_BYTE: [[u8; 256]; 8] = {
    let mut table = [[8u8; 256]; 8];
    let mut byte = 0usize;
    while byte < 256 {
        let mut pos = 0u8;
        let mut rank = 0usize;
        while pos < 8 {
            if (byte >> pos) & 1 == 1 {
                table[rank][byte] = pos;
                rank += 1;
            }
            pos += 1;
        }
        byte += 1;
    }
    table
};

/// `PREFIX_SUM_OVERFLOW[k]` holds `0x7F - k` in every byte.
///
/// Added to a word of per-byte cumulative popcounts, the high bit of byte `j`
/// becomes set exactly when more than `k` bits are set in bytes `0..=j`.
pub(crate) static PREFIX_SUM_OVERFLOW: [u64; 64] = {
    let mut table = [0u64; 64];
    let mut k = 0usize;
    while k < 64 {
        table[k] = (0x7F - k as u64) * 0x0101_0101_0101_0101;
        k += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_in_byte_single_bit() {
        for pos in 0..8 {
            let byte = 1u8 << pos;
            assert_eq!(SELECT_IN_BYTE[0][byte as usize], pos, "byte={:08b}", byte);
            assert_eq!(SELECT_IN_BYTE[1][byte as usize], 8, "byte={:08b}, k=1", byte);
        }
    }

    #[test]
    fn test_select_in_byte_alternating() {
        // 0b01010101 = bits at positions 0, 2, 4, 6
        let byte: u8 = 0b0101_0101;
        assert_eq!(SELECT_IN_BYTE[0][byte as usize], 0);
        assert_eq!(SELECT_IN_BYTE[1][byte as usize], 2);
        assert_eq!(SELECT_IN_BYTE[2][byte as usize], 4);
        assert_eq!(SELECT_IN_BYTE[3][byte as usize], 6);
        assert_eq!(SELECT_IN_BYTE[4][byte as usize], 8);
        assert_eq!(SELECT_IN_BYTE[7][0xFF], 7);
    }

    #[test]
    fn test_table_against_scan() {
        for byte in 0u8..=255 {
            let set: Vec<usize> = (0..8).filter(|&p| (byte >> p) & 1 == 1).collect();
            for k in 0..8 {
                let expected = set.get(k).copied().unwrap_or(8);
                assert_eq!(SELECT_IN_BYTE[k][byte as usize] as usize, expected, "byte={:08b}, k={}", byte, k);
            }
        }
    }

    #[test]
    fn test_prefix_sum_overflow() {
        assert_eq!(PREFIX_SUM_OVERFLOW[0], 0x7F7F_7F7F_7F7F_7F7F);
        assert_eq!(PREFIX_SUM_OVERFLOW[63], 0x4040_4040_4040_4040);
    }
}
