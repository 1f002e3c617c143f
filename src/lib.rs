//! # Succinct Trie
//!
//! Static, compressed string dictionaries built on LOUDS-encoded tries.
//!
//! A trie is built once from a [`Keyset`] and then answers four kinds of
//! queries directly on its packed representation, whether owned or
//! memory-mapped from disk:
//!
//! - exact lookup of a key, returning its id
//! - reverse lookup from an id to its key
//! - common-prefix search for every key that is a prefix of the query
//! - predictive search for every key that starts with the query
//!
//! Edge labels longer than one byte are themselves stored in a smaller trie
//! of reversed labels, recursively, with the last level backed by a
//! suffix-sharing tail. Every level keeps a small transition cache.
//!
//! ## Module Organization
//!
//! - [`bits`] - Bitvector with rank and select, packed integer vector
//! - [`config`] - Build options and their packed flag form
//!
//! ## Quick Start
//!
//! ```
//! use succinct_trie::{Agent, Keyset, Trie, TrieConfig};
//!
//! let mut keyset = Keyset::new();
//! for word in ["car", "card", "care", "cat"] {
//!     keyset.push(word).unwrap();
//! }
//! let trie = Trie::build(&mut keyset, TrieConfig::default()).unwrap();
//!
//! let mut agent = Agent::new();
//! agent.set_query("car");
//! let mut found = Vec::new();
//! while trie.predictive_search(&mut agent).unwrap() {
//!     found.push(agent.key().as_str().unwrap().to_owned());
//! }
//! found.sort();
//! assert_eq!(found, ["car", "card", "care"]);
//! ```
//!
//! ## Features
//!
//! Popcount strategies (mutually exclusive, for benchmarking):
//! - Default: Uses Rust's `count_ones()` which auto-vectorizes
//! - `simd` - Use explicit SIMD intrinsics (NEON on ARM, POPCNT on x86)
//! - `portable-popcount` - Use portable bitwise algorithm (no intrinsics)
//!
//! Other features:
//! - `serde` - Enable serialization/deserialization of [`TrieConfig`]
//! - `large-tests` - Enable the slow multi-million-key tests

// =============================================================================
// Core modules
// =============================================================================

/// Bitvector and packed vector implementations with rank and select support.
pub mod bits;

/// Build configuration.
pub mod config;

/// Internal utilities (not part of public API).
pub(crate) mod util;

/// Aligned storage shared by owned and mapped structures.
pub(crate) mod binary;

pub(crate) mod io;

mod error;

// =============================================================================
// Dictionary
// =============================================================================

pub(crate) mod louds;

mod agent;
mod keyset;
mod trie;

// =============================================================================
// Public re-exports
// =============================================================================

pub use agent::{Agent, Key, Query};
pub use bits::{popcount_word, BitVector, BitVectorBuilder, FlatVector};
pub use config::{CacheLevel, NodeOrder, TailMode, TrieConfig};
pub use error::{Error, Result};
pub use keyset::{KeyEntry, Keyset};
pub use trie::{MapOptions, Trie};
pub use util::select_in_word;

// =============================================================================
// Core traits
// =============================================================================

/// Trait for rank/select operations on bitvectors.
///
/// Rank and select are fundamental operations for succinct data structures:
/// - `rank1(i)`: Count 1-bits in positions `[0, i)`
/// - `select0(k)`: Find position of the k-th 0-bit (0-indexed)
/// - `select1(k)`: Find position of the k-th 1-bit (0-indexed)
pub trait RankSelect {
    /// Count 1-bits in positions `[0, i)`.
    ///
    /// Returns 0 if `i == 0`.
    fn rank1(&self, i: usize) -> usize;

    /// Count 0-bits in positions `[0, i)`.
    ///
    /// Default implementation: `i - rank1(i)`
    #[inline]
    fn rank0(&self, i: usize) -> usize {
        i - self.rank1(i)
    }

    /// Find position of the k-th 0-bit (0-indexed).
    ///
    /// Returns `None` if fewer than `k+1` zeros exist or zero sampling was
    /// not enabled.
    fn select0(&self, k: usize) -> Option<usize>;

    /// Find position of the k-th 1-bit (0-indexed).
    ///
    /// Returns `None` if fewer than `k+1` ones exist or one sampling was
    /// not enabled.
    fn select1(&self, k: usize) -> Option<usize>;
}
