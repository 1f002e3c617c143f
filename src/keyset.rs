//! Staging area for the keys of a trie under construction.

use crate::error::{Error, Result};

/// One staged key.
///
/// After [`Trie::build`](crate::Trie::build) the entry carries the id the
/// trie assigned to it. Duplicate keys share an id.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEntry {
    bytes: Box<[u8]>,
    weight: f32,
    id: usize,
}

impl KeyEntry {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Weight used to order siblings and size the transition cache.
    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Id assigned by the last build, `0` before that.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }
}

/// An ordered list of keys to build a trie from.
///
/// # Examples
///
/// ```
/// use succinct_trie::Keyset;
///
/// let mut keyset = Keyset::new();
/// keyset.push("apple").unwrap();
/// keyset.push_weighted(b"banana", 2.5).unwrap();
/// assert_eq!(keyset.len(), 2);
/// assert_eq!(keyset.total_length(), 11);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Keyset {
    keys: Vec<KeyEntry>,
    total_length: usize,
}

impl Keyset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a key with weight `1.0`.
    pub fn push(&mut self, key: impl AsRef<[u8]>) -> Result<()> {
        self.push_weighted(key, 1.0)
    }

    /// Stage a key with an explicit weight.
    ///
    /// # Errors
    ///
    /// [`Error::Size`] if the key is longer than `u32::MAX` bytes or the
    /// keyset already holds `u32::MAX` keys.
    pub fn push_weighted(&mut self, key: impl AsRef<[u8]>, weight: f32) -> Result<()> {
        let bytes = key.as_ref();
        if bytes.len() > u32::MAX as usize {
            return Err(Error::Size("key longer than u32::MAX bytes"));
        }
        if self.keys.len() >= u32::MAX as usize {
            return Err(Error::Size("more than u32::MAX keys"));
        }
        self.keys.push(KeyEntry {
            bytes: bytes.into(),
            weight,
            id: 0,
        });
        self.total_length += bytes.len();
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&KeyEntry> {
        self.keys.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyEntry> {
        self.keys.iter()
    }

    /// Sum of all key lengths in bytes.
    #[inline]
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.total_length = 0;
    }

    pub(crate) fn set_id(&mut self, i: usize, id: usize) {
        self.keys[i].id = id;
    }
}

impl<'a> IntoIterator for &'a Keyset {
    type Item = &'a KeyEntry;
    type IntoIter = std::slice::Iter<'a, KeyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Keyset {
    /// Stage every key with weight `1.0`, failing on the first key that
    /// [`push`](Self::push) rejects.
    pub fn try_from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut keyset = Keyset::new();
        for key in iter {
            keyset.push(key)?;
        }
        Ok(keyset)
    }
}

/// Collecting stops at the first key [`Keyset::push`] rejects, so keys past
/// a length limit are dropped. Use [`Keyset::try_from_iter`] to observe the
/// error instead.
impl<K: AsRef<[u8]>> FromIterator<K> for Keyset {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut keyset = Keyset::new();
        for key in iter {
            if keyset.push(key).is_err() {
                break;
            }
        }
        keyset
    }
}
