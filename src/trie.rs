//! Public dictionary handle.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::agent::Agent;
use crate::config::{CacheLevel, NodeOrder, TailMode, TrieConfig};
use crate::error::{Error, Result};
use crate::io::{Mapper, Reader, Region, Writer};
use crate::keyset::Keyset;
use crate::louds::{self, LoudsTrie};

/// Options for [`Trie::mmap_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Pre-fault every page of the mapping.
    pub populate: bool,
}

impl MapOptions {
    pub fn populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }
}

/// A static, compressed string dictionary.
///
/// A trie is either built from a [`Keyset`] or restored from bytes that a
/// previous build wrote. Once built it never changes; lookups take `&self`
/// and keep their progress in an [`Agent`].
///
/// Every operation that replaces the contents (`build`, `load`, `read`,
/// `mmap`) leaves the trie untouched when it fails.
///
/// # Examples
///
/// ```
/// use succinct_trie::{Agent, Keyset, Trie, TrieConfig};
///
/// let mut keyset: Keyset = ["bach", "bet", "chat", "check"].into_iter().collect();
/// let trie = Trie::build(&mut keyset, TrieConfig::default()).unwrap();
///
/// let mut agent = Agent::new();
/// agent.set_query("chat");
/// assert!(trie.lookup(&mut agent).unwrap());
/// let id = agent.key().id();
///
/// agent.set_query_id(id);
/// trie.reverse_lookup(&mut agent).unwrap();
/// assert_eq!(agent.key().as_bytes(), b"chat");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Trie {
    inner: Option<Box<LoudsTrie>>,
}

impl Trie {
    /// An empty handle; every search fails with [`Error::State`] until a
    /// trie is built or loaded into it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from `keyset`, recording each key's id in the keyset.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] for an invalid config, [`Error::Size`] when a
    /// structure outgrows its 32-bit limits.
    pub fn build(keyset: &mut Keyset, config: TrieConfig) -> Result<Self> {
        debug!(num_keys = keyset.len(), ?config, "building trie");
        let inner = louds::build(keyset, &config)?;
        debug!(
            num_tries = inner.num_tries(),
            num_nodes = inner.total_num_nodes(),
            total_size = inner.total_size(),
            "built trie"
        );
        Ok(Self {
            inner: Some(Box::new(inner)),
        })
    }

    /// Read a trie from a file into owned memory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let trie = Self::read(BufReader::new(file))?;
        debug!(path = %path.display(), "loaded trie");
        Ok(trie)
    }

    /// Read a trie from any byte stream.
    pub fn read(reader: impl Read) -> Result<Self> {
        let inner = LoudsTrie::read_from(&mut Reader::new(reader))?;
        Ok(Self {
            inner: Some(Box::new(inner)),
        })
    }

    /// Map a file and search it in place.
    pub fn mmap(path: impl AsRef<Path>) -> Result<Self> {
        Self::mmap_with(path, MapOptions::default())
    }

    /// [`mmap`](Self::mmap) with explicit mapping options.
    ///
    /// The file must not be modified while the trie (or a clone of it) is
    /// alive.
    pub fn mmap_with(path: impl AsRef<Path>, options: MapOptions) -> Result<Self> {
        let path = path.as_ref();
        let region = Region::map_file(path, options.populate)?;
        let trie = Self::from_region(region)?;
        debug!(path = %path.display(), populate = options.populate, "mapped trie");
        Ok(trie)
    }

    /// Restore a trie from bytes held in memory.
    ///
    /// The bytes are copied once into an aligned buffer that the trie then
    /// views in place.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_region(Region::copy_from(bytes))
    }

    fn from_region(region: Region) -> Result<Self> {
        let inner = LoudsTrie::read_from(&mut Mapper::new(region))?;
        Ok(Self {
            inner: Some(Box::new(inner)),
        })
    }

    /// Write the trie to a file, replacing it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write(BufWriter::new(file))?;
        debug!(path = %path.display(), io_size = self.io_size(), "saved trie");
        Ok(())
    }

    /// Write the trie to any byte sink.
    pub fn write(&self, writer: impl Write) -> Result<()> {
        let inner = self.built()?;
        let mut writer = Writer::new(writer);
        inner.write_to(&mut writer)?;
        writer.flush()
    }

    /// Whether the query is a key. On success the agent's key is the query.
    pub fn lookup(&self, agent: &mut Agent) -> Result<bool> {
        let inner = self.built()?;
        let (query, state) = agent.search_parts();
        let found = inner.lookup(query, state);
        let len = query.len();
        if let Some(id) = found {
            agent.set_key_from_query(len, id);
        }
        Ok(found.is_some())
    }

    /// Restore the key whose id is the agent's query id.
    ///
    /// # Errors
    ///
    /// [`Error::Bound`] if the id is not below [`num_keys`](Self::num_keys).
    pub fn reverse_lookup(&self, agent: &mut Agent) -> Result<()> {
        let inner = self.built()?;
        let id = agent.query().id();
        let (_, state) = agent.search_parts();
        inner.reverse_lookup(id, state)?;
        agent.set_key_from_buffer(id);
        Ok(())
    }

    /// Advance to the next key that is a prefix of the query, shortest
    /// first. Returns `false` once every such key has been reported.
    pub fn common_prefix_search(&self, agent: &mut Agent) -> Result<bool> {
        let inner = self.built()?;
        let (query, state) = agent.search_parts();
        match inner.common_prefix_search(query, state) {
            Some((id, len)) => {
                agent.set_key_from_query(len, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Advance to the next key that starts with the query. Returns `false`
    /// once every such key has been reported.
    pub fn predictive_search(&self, agent: &mut Agent) -> Result<bool> {
        let inner = self.built()?;
        let (query, state) = agent.search_parts();
        match inner.predictive_search(query, state) {
            Some(id) => {
                agent.set_key_from_buffer(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn built(&self) -> Result<&LoudsTrie> {
        self.inner
            .as_deref()
            .ok_or(Error::State("trie has not been built or loaded"))
    }

    pub fn num_tries(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.num_tries() as usize)
    }

    pub fn num_keys(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.num_keys())
    }

    /// Nodes of the first level; the root counts.
    pub fn num_nodes(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.num_nodes())
    }

    /// Nodes across the first level and every level below it.
    pub fn total_num_nodes(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.total_num_nodes())
    }

    pub fn tail_mode(&self) -> Option<TailMode> {
        self.inner.as_ref().map(|inner| inner.tail_mode())
    }

    pub fn node_order(&self) -> Option<NodeOrder> {
        self.inner.as_ref().map(|inner| inner.node_order())
    }

    pub fn cache_level(&self) -> Option<CacheLevel> {
        self.inner.as_ref().map(|inner| inner.cache_level())
    }

    /// Whether the trie holds no keys.
    pub fn is_empty(&self) -> bool {
        self.num_keys() == 0
    }

    /// Number of keys; same as [`num_keys`](Self::num_keys).
    pub fn size(&self) -> usize {
        self.num_keys()
    }

    /// Bytes of memory the trie occupies, mapped or owned.
    pub fn total_size(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.total_size())
    }

    /// Bytes [`write`](Self::write) produces.
    pub fn io_size(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.io_size())
    }

    /// Drop the contents, returning to the unbuilt state.
    pub fn clear(&mut self) {
        self.inner = None;
    }

    pub fn swap(&mut self, other: &mut Trie) {
        std::mem::swap(&mut self.inner, &mut other.inner);
    }

    /// Make every transition-cache probe miss.
    #[doc(hidden)]
    pub fn invalidate_cache(&mut self) {
        if let Some(inner) = &mut self.inner {
            inner.invalidate_cache();
        }
    }
}
