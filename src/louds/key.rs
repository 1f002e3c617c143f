//! Borrowed key views used while building.
//!
//! Every key handled during construction is a window into the bytes owned
//! by the [`Keyset`](crate::Keyset). The first trie reads its keys front to
//! back; every deeper trie and the tail read them back to front, so shared
//! suffixes become shared prefixes.

use super::sort::Sortable;

/// A key window, read backwards when `REVERSED` is set.
#[derive(Clone, Copy, Debug)]
pub(crate) struct KeyView<'a, const REVERSED: bool> {
    bytes: &'a [u8],
    weight: f32,
    id: u32,
    terminal: u32,
}

/// Front-to-back key, used by the first trie.
pub(crate) type Key<'a> = KeyView<'a, false>;

/// Back-to-front key, used by deeper tries and the tail.
pub(crate) type ReverseKey<'a> = KeyView<'a, true>;

impl<'a, const REVERSED: bool> KeyView<'a, REVERSED> {
    pub fn new(bytes: &'a [u8], weight: f32) -> Self {
        Self {
            bytes,
            weight,
            id: 0,
            terminal: 0,
        }
    }

    /// Byte `i` in reading order.
    #[inline]
    pub fn at(&self, i: usize) -> u8 {
        if REVERSED {
            self.bytes[self.bytes.len() - 1 - i]
        } else {
            self.bytes[i]
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The underlying bytes in memory order.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// `len` bytes starting at `pos` in reading order.
    pub fn substr(&self, pos: usize, len: usize) -> Self {
        let bytes = if REVERSED {
            let end = self.bytes.len() - pos;
            &self.bytes[end - len..end]
        } else {
            &self.bytes[pos..pos + len]
        };
        Self { bytes, ..*self }
    }

    /// The same memory read back to front.
    pub fn reversed(&self) -> ReverseKey<'a> {
        KeyView {
            bytes: self.bytes,
            weight: self.weight,
            id: self.id,
            terminal: self.terminal,
        }
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    #[inline]
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id as usize
    }

    #[inline]
    pub fn set_id(&mut self, id: usize) {
        self.id = id as u32;
    }

    #[inline]
    pub fn terminal(&self) -> u32 {
        self.terminal
    }

    #[inline]
    pub fn set_terminal(&mut self, terminal: usize) {
        self.terminal = terminal as u32;
    }
}

impl<const REVERSED: bool> Sortable for KeyView<'_, REVERSED> {
    #[inline]
    fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    fn byte(&self, i: usize) -> u8 {
        self.at(i)
    }
}
