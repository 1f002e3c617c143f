//! Property-based tests for bitvector rank/select.

use proptest::prelude::*;
use succinct_trie::{BitVector, RankSelect};

fn naive_select(bits: &[bool], value: bool, k: usize) -> Option<usize> {
    bits.iter()
        .enumerate()
        .filter(|(_, &bit)| bit == value)
        .nth(k)
        .map(|(i, _)| i)
}

proptest! {
    /// rank1(i) + rank0(i) == i
    #[test]
    fn prop_rank_sum(bits in prop::collection::vec(any::<bool>(), 0..3000)) {
        let bv = BitVector::from_bits(bits.iter().copied(), true, true).unwrap();
        for i in (0..=bits.len()).step_by(7) {
            prop_assert_eq!(bv.rank1(i) + bv.rank0(i), i);
        }
    }

    /// rank1 matches a running count
    #[test]
    fn prop_rank_matches_count(bits in prop::collection::vec(any::<bool>(), 0..3000)) {
        let bv = BitVector::from_bits(bits.iter().copied(), false, false).unwrap();
        let mut ones = 0;
        for (i, &bit) in bits.iter().enumerate() {
            prop_assert_eq!(bv.rank1(i), ones, "rank1({})", i);
            ones += usize::from(bit);
        }
        prop_assert_eq!(bv.rank1(bits.len()), ones);
        prop_assert_eq!(bv.num_1s(), ones);
    }

    /// select inverts rank for both bit values
    #[test]
    fn prop_select_inverts_rank(
        bits in prop::collection::vec(any::<bool>(), 1..3000),
        k_ratio in 0.0..1.0f64,
    ) {
        let bv = BitVector::from_bits(bits.iter().copied(), true, true).unwrap();
        for (value, count) in [(true, bv.num_1s()), (false, bv.num_0s())] {
            if count == 0 {
                continue;
            }
            let k = ((k_ratio * count as f64) as usize).min(count - 1);
            let pos = if value { bv.select1(k) } else { bv.select0(k) };
            prop_assert_eq!(pos, naive_select(&bits, value, k));
            let pos = pos.unwrap();
            prop_assert_eq!(bv.get(pos), value);
            let rank = if value { bv.rank1(pos) } else { bv.rank0(pos) };
            prop_assert_eq!(rank, k);
        }
    }

    /// Sparse vectors exercise the sampled-block search
    #[test]
    fn prop_sparse_select(positions in prop::collection::btree_set(0usize..200_000, 1..200)) {
        let len = positions.iter().max().map_or(0, |&max| max + 1);
        let bits: Vec<bool> = (0..len).map(|i| positions.contains(&i)).collect();
        let bv = BitVector::from_bits(bits.iter().copied(), true, true).unwrap();
        for (k, &pos) in positions.iter().enumerate() {
            prop_assert_eq!(bv.select1(k), Some(pos));
            prop_assert_eq!(bv.select1_unchecked(k), pos);
        }
        prop_assert_eq!(bv.select1(positions.len()), None);
    }
}

#[test]
fn test_block_boundaries() {
    for len in [0usize, 1, 63, 64, 65, 511, 512, 513, 1023, 1024, 1025, 4097] {
        let bits: Vec<bool> = (0..len).map(|i| i % 3 == 0 || i % 64 == 63).collect();
        let bv = BitVector::from_bits(bits.iter().copied(), true, true).unwrap();
        assert_eq!(bv.len(), len);

        let mut ones = 0;
        let mut zeros = 0;
        for (i, &bit) in bits.iter().enumerate() {
            assert_eq!(bv.rank1(i), ones, "len {len} rank1({i})");
            if bit {
                assert_eq!(bv.select1(ones), Some(i), "len {len} select1({ones})");
                ones += 1;
            } else {
                assert_eq!(bv.select0(zeros), Some(i), "len {len} select0({zeros})");
                zeros += 1;
            }
        }
        assert_eq!(bv.rank1(len), ones);
        assert_eq!(bv.select1(ones), None);
        assert_eq!(bv.select0(zeros), None);
    }
}

#[test]
fn test_select_disabled() {
    let bv = BitVector::from_bits([true, false, true], false, true).unwrap();
    assert_eq!(bv.select0(0), None);
    assert_eq!(bv.select1(1), Some(2));
    assert!(!bv.has_select0());
    assert!(bv.has_select1());
}
