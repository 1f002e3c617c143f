//! Query and result holder for trie searches.
//!
//! An [`Agent`] bundles the query, the last result and the resumable state
//! that the common-prefix and predictive searches advance on every call.
//! Each thread searching a shared [`Trie`](crate::Trie) needs its own agent.

use std::str;

use crate::error::{Error, Result};
use crate::louds::State;

/// Where the bytes of the current result key live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum KeySource {
    #[default]
    Empty,
    /// The first `n` bytes of the query.
    Query(usize),
    /// The state's key buffer.
    Buffer,
}

/// Borrowed view of an agent's query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query<'a> {
    bytes: &'a [u8],
    id: usize,
}

impl<'a> Query<'a> {
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Key id used by [`Trie::reverse_lookup`](crate::Trie::reverse_lookup).
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Borrowed view of the last key a search produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key<'a> {
    bytes: &'a [u8],
    id: usize,
}

impl<'a> Key<'a> {
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The key as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        str::from_utf8(self.bytes).ok()
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Search cursor.
///
/// # Examples
///
/// ```
/// use succinct_trie::{Agent, Keyset, Trie, TrieConfig};
///
/// let mut keyset = Keyset::new();
/// for word in ["a", "an", "and", "ant"] {
///     keyset.push(word).unwrap();
/// }
/// let trie = Trie::build(&mut keyset, TrieConfig::default()).unwrap();
///
/// let mut agent = Agent::new();
/// agent.set_query("android");
/// let mut prefixes = Vec::new();
/// while trie.common_prefix_search(&mut agent).unwrap() {
///     prefixes.push(agent.key().as_str().unwrap().to_owned());
/// }
/// assert_eq!(prefixes, ["a", "an", "and"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Agent {
    query: Vec<u8>,
    query_id: usize,
    key_source: KeySource,
    key_id: usize,
    state: Option<State>,
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query bytes, abandoning any suspended search and the last
    /// result.
    pub fn set_query(&mut self, query: impl AsRef<[u8]>) {
        self.query.clear();
        self.query.extend_from_slice(query.as_ref());
        self.reset_state();
    }

    /// Set the key id to reverse-look-up, abandoning any suspended search
    /// and the last result.
    pub fn set_query_id(&mut self, id: usize) {
        self.query_id = id;
        self.reset_state();
    }

    pub fn query(&self) -> Query<'_> {
        Query {
            bytes: &self.query,
            id: self.query_id,
        }
    }

    /// The last key found.
    ///
    /// Meaningful only after a search has returned `true`.
    pub fn key(&self) -> Key<'_> {
        let bytes: &[u8] = match self.key_source {
            KeySource::Empty => &[],
            KeySource::Query(len) => &self.query[..len],
            KeySource::Buffer => self
                .state
                .as_ref()
                .map_or(&[][..], |state| state.key_buf.as_slice()),
        };
        Key {
            bytes,
            id: self.key_id,
        }
    }

    #[inline]
    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }

    /// Allocate the search state up front.
    ///
    /// Searches allocate it on first use, so calling this is optional.
    ///
    /// # Errors
    ///
    /// [`Error::State`] if the agent already has a state.
    pub fn init_state(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(Error::State("agent state is already initialized"));
        }
        self.state = Some(State::default());
        Ok(())
    }

    /// Drop the query, the result and the state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn reset_state(&mut self) {
        self.key_source = KeySource::Empty;
        self.key_id = 0;
        if let Some(state) = &mut self.state {
            state.reset();
        }
    }

    /// The query and the state, allocating the state if needed.
    pub(crate) fn search_parts(&mut self) -> (&[u8], &mut State) {
        let state = self.state.get_or_insert_with(State::default);
        (&self.query, state)
    }

    pub(crate) fn set_key_from_query(&mut self, len: usize, id: usize) {
        debug_assert!(len <= self.query.len());
        self.key_source = KeySource::Query(len);
        self.key_id = id;
    }

    pub(crate) fn set_key_from_buffer(&mut self, id: usize) {
        self.key_source = KeySource::Buffer;
        self.key_id = id;
    }
}
