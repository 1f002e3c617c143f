//! Bitvector implementations with rank and select support.

mod bitvec;
mod flat;
mod popcount;
mod rank;

pub use bitvec::{BitVector, BitVectorBuilder};
pub use flat::FlatVector;
pub use popcount::popcount_word;
pub use rank::RankIndex;
