//! Transition cache records.
//!
//! A cache slot remembers one heavy edge `parent -> child` together with the
//! edge's base byte and link extra, so a hit skips the LOUDS child scan. The
//! first trie indexes slots by `(parent, label)`, deeper tries by `child`.

use bytemuck::{Pod, Zeroable};

/// Extra value marking a slot whose edge is a single byte.
pub(crate) const INVALID_EXTRA: u32 = u32::MAX >> 8;

/// Node id stored in unused slots.
const UNUSED: u32 = u32::MAX;

/// One 12-byte cache slot.
///
/// While building, the third word holds the `f32` weight of the cached edge.
/// Once the trie is finished it holds `base | extra << 8`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct CacheEntry {
    parent: u32,
    child: u32,
    link: u32,
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self {
            parent: 0,
            child: 0,
            link: f32::MIN_POSITIVE.to_bits(),
        }
    }
}

impl CacheEntry {
    #[inline]
    pub fn parent(&self) -> usize {
        self.parent as usize
    }

    #[inline]
    pub fn child(&self) -> usize {
        self.child as usize
    }

    /// Weight of the cached edge. Meaningful during construction only.
    #[inline]
    pub fn weight(&self) -> f32 {
        f32::from_bits(self.link)
    }

    /// Remember `parent -> child` if it outweighs the current edge.
    #[inline]
    pub fn offer(&mut self, parent: usize, child: usize, weight: f32) {
        debug_assert!(parent < child);
        if weight > self.weight() {
            self.parent = parent as u32;
            self.child = child as u32;
            self.link = weight.to_bits();
        }
    }

    /// Replace the build weight with the edge's base byte and extra.
    #[inline]
    pub fn set_link(&mut self, base: u8, extra: u32) {
        self.link = base as u32 | (extra << 8);
    }

    /// Label of a single-byte edge, or the low byte of a link.
    #[inline]
    pub fn label(&self) -> u8 {
        self.link as u8
    }

    #[inline]
    pub fn extra(&self) -> u32 {
        self.link >> 8
    }

    /// Whether the cached edge continues in the next trie or the tail.
    #[inline]
    pub fn is_link(&self) -> bool {
        self.extra() != INVALID_EXTRA
    }

    /// Link into the next trie or the tail.
    #[inline]
    pub fn link(&self) -> usize {
        self.link as usize
    }

    /// Make every lookup against this slot miss.
    #[inline]
    pub fn clear(&mut self) {
        self.parent = UNUSED;
        self.child = UNUSED;
    }
}
