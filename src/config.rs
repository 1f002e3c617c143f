//! Build configuration for tries.
//!
//! A [`TrieConfig`] maps one-to-one onto the packed `u32` flag word stored
//! at the end of every serialized trie level:
//!
//! | Bits | Field | Values |
//! |------|-------|--------|
//! | `0x0007F` | number of tries | 1..=127, 0 selects the default (3) |
//! | `0x00F80` | cache level | huge 0x80, large 0x100, normal 0x200, small 0x400, tiny 0x800 |
//! | `0x0F000` | tail mode | text 0x1000, binary 0x2000 |
//! | `0xF0000` | node order | label 0x10000, weight 0x20000 |

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NUM_TRIES_MASK: u32 = 0x0007F;
const CACHE_LEVEL_MASK: u32 = 0x00F80;
const TAIL_MODE_MASK: u32 = 0x0F000;
const NODE_ORDER_MASK: u32 = 0xF0000;
const CONFIG_MASK: u32 = 0xFFFFF;

/// Smallest and largest number of cascaded tries.
pub const MIN_NUM_TRIES: u32 = 1;
pub const MAX_NUM_TRIES: u32 = 0x7F;
pub const DEFAULT_NUM_TRIES: u32 = 3;

/// Size of the transition cache relative to the number of keys.
///
/// Each level's cache holds the smallest power of two at least
/// `num_keys / divisor` slots, so a larger cache level means fewer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CacheLevel {
    Huge,
    Large,
    #[default]
    Normal,
    Small,
    Tiny,
}

impl CacheLevel {
    /// Flag bits for this level.
    pub fn flag(self) -> u32 {
        match self {
            CacheLevel::Huge => 0x080,
            CacheLevel::Large => 0x100,
            CacheLevel::Normal => 0x200,
            CacheLevel::Small => 0x400,
            CacheLevel::Tiny => 0x800,
        }
    }

    /// Keys per cache slot.
    pub fn divisor(self) -> usize {
        self.flag() as usize
    }

    fn from_flag(flag: u32) -> Option<Self> {
        match flag {
            0 => Some(CacheLevel::default()),
            0x080 => Some(CacheLevel::Huge),
            0x100 => Some(CacheLevel::Large),
            0x200 => Some(CacheLevel::Normal),
            0x400 => Some(CacheLevel::Small),
            0x800 => Some(CacheLevel::Tiny),
            _ => None,
        }
    }
}

/// How the last level stores leftover suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TailMode {
    /// NUL-terminated strings. Falls back to [`TailMode::Binary`] when a
    /// suffix contains a NUL byte.
    #[default]
    Text,
    /// Raw bytes with a parallel end-of-string bitvector.
    Binary,
}

impl TailMode {
    pub fn flag(self) -> u32 {
        match self {
            TailMode::Text => 0x1000,
            TailMode::Binary => 0x2000,
        }
    }

    fn from_flag(flag: u32) -> Option<Self> {
        match flag {
            0 => Some(TailMode::default()),
            0x1000 => Some(TailMode::Text),
            0x2000 => Some(TailMode::Binary),
            _ => None,
        }
    }
}

/// Order of sibling edges, which is also the predictive search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeOrder {
    /// Ascending byte value; predictive search enumerates keys in
    /// lexicographic order.
    Label,
    /// Descending total key weight below each edge.
    #[default]
    Weight,
}

impl NodeOrder {
    pub fn flag(self) -> u32 {
        match self {
            NodeOrder::Label => 0x10000,
            NodeOrder::Weight => 0x20000,
        }
    }

    fn from_flag(flag: u32) -> Option<Self> {
        match flag {
            0 => Some(NodeOrder::default()),
            0x10000 => Some(NodeOrder::Label),
            0x20000 => Some(NodeOrder::Weight),
            _ => None,
        }
    }
}

/// Configuration for building a trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrieConfig {
    /// Maximum number of cascaded tries (default: 3)
    pub num_tries: u32,
    /// Transition cache size (default: normal)
    pub cache_level: CacheLevel,
    /// Suffix storage of the last level (default: text)
    pub tail_mode: TailMode,
    /// Sibling edge order (default: weight)
    pub node_order: NodeOrder,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            num_tries: DEFAULT_NUM_TRIES,
            cache_level: CacheLevel::default(),
            tail_mode: TailMode::default(),
            node_order: NodeOrder::default(),
        }
    }
}

impl TrieConfig {
    /// Configuration whose predictive search enumerates keys in
    /// lexicographic order.
    ///
    /// Key ids still number the nodes breadth first, so a short key gets a
    /// smaller id than a longer key that sorts before it.
    pub fn sorted() -> Self {
        Self {
            node_order: NodeOrder::Label,
            ..Self::default()
        }
    }

    /// Set the maximum number of cascaded tries.
    pub fn with_num_tries(mut self, num_tries: u32) -> Self {
        self.num_tries = num_tries;
        self
    }

    /// Set the transition cache size.
    pub fn with_cache_level(mut self, cache_level: CacheLevel) -> Self {
        self.cache_level = cache_level;
        self
    }

    /// Set the suffix storage mode.
    pub fn with_tail_mode(mut self, tail_mode: TailMode) -> Self {
        self.tail_mode = tail_mode;
        self
    }

    /// Set the sibling edge order.
    pub fn with_node_order(mut self, node_order: NodeOrder) -> Self {
        self.node_order = node_order;
        self
    }

    /// Parse a packed flag word.
    ///
    /// Zero fields select their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Code`] if the word has bits outside the defined fields or a
    /// field holds an undefined value.
    pub fn from_flags(flags: u32) -> Result<Self> {
        if flags & !CONFIG_MASK != 0 {
            return Err(Error::Code(flags));
        }
        let num_tries = match flags & NUM_TRIES_MASK {
            0 => DEFAULT_NUM_TRIES,
            n => n,
        };
        let cache_level =
            CacheLevel::from_flag(flags & CACHE_LEVEL_MASK).ok_or(Error::Code(flags))?;
        let tail_mode = TailMode::from_flag(flags & TAIL_MODE_MASK).ok_or(Error::Code(flags))?;
        let node_order =
            NodeOrder::from_flag(flags & NODE_ORDER_MASK).ok_or(Error::Code(flags))?;
        Ok(Self {
            num_tries,
            cache_level,
            tail_mode,
            node_order,
        })
    }

    /// Pack into a flag word.
    pub fn to_flags(&self) -> u32 {
        (self.num_tries & NUM_TRIES_MASK)
            | self.cache_level.flag()
            | self.tail_mode.flag()
            | self.node_order.flag()
    }

    /// Check that every field is in range.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] if `num_tries` is outside `1..=127`.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_NUM_TRIES..=MAX_NUM_TRIES).contains(&self.num_tries) {
            return Err(Error::Range("number of tries must be in 1..=127"));
        }
        Ok(())
    }
}
