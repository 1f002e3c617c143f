//! Recursive LOUDS tries.
//!
//! A [`LoudsTrie`] is one level of the dictionary. Edges whose label is
//! longer than one byte are stored as *links*: a node id in the next level
//! (which stores the label reversed) or an offset into the [`Tail`] at the
//! bottom level. Every level keeps a small cache of heavy edges in front of
//! the LOUDS scan.
//!
//! Serialized layout of one level, all blobs 8-byte aligned:
//!
//! ```text
//! louds | terminal_flags | link_flags | bases | extras | tail
//!       | [next level] | cache | num_l1_nodes: u32 | config flags: u32
//! ```
//!
//! Only the top level is preceded by the file header. A next level is
//! present exactly when the level has links and an empty tail.

mod build;
mod cache;
mod header;
mod key;
mod search;
mod sort;
mod state;
mod tail;

use std::io::Write;

use crate::binary::PodVec;
use crate::bits::{BitVector, FlatVector};
use crate::config::{CacheLevel, NodeOrder, TailMode, TrieConfig};
use crate::error::{Error, Result};
use crate::io::{Source, Writer};

pub(crate) use build::build;
pub(crate) use state::State;
#[cfg(test)]
pub(crate) use state::Status;

use cache::CacheEntry;
use tail::Tail;

#[derive(Clone, Debug, Default)]
pub(crate) struct LoudsTrie {
    louds: BitVector,
    terminal_flags: BitVector,
    link_flags: BitVector,
    bases: PodVec<u8>,
    extras: FlatVector,
    tail: Tail,
    next: Option<Box<LoudsTrie>>,
    cache: PodVec<CacheEntry>,
    cache_mask: usize,
    num_l1_nodes: usize,
    config: TrieConfig,
}

impl LoudsTrie {
    #[inline]
    pub fn num_tries(&self) -> u32 {
        self.config.num_tries
    }

    #[inline]
    pub fn num_keys(&self) -> usize {
        self.terminal_flags.num_1s()
    }

    /// Nodes in this level; the root counts.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        (self.louds.len() / 2).saturating_sub(1)
    }

    /// Nodes across this level and every level below it.
    pub fn total_num_nodes(&self) -> usize {
        self.num_nodes() + self.next.as_ref().map_or(0, |next| next.total_num_nodes())
    }

    #[inline]
    pub fn tail_mode(&self) -> TailMode {
        self.config.tail_mode
    }

    #[inline]
    pub fn node_order(&self) -> NodeOrder {
        self.config.node_order
    }

    #[inline]
    pub fn cache_level(&self) -> CacheLevel {
        self.config.cache_level
    }

    /// Heap bytes held by this level and the levels below it.
    pub fn total_size(&self) -> usize {
        self.louds.total_size()
            + self.terminal_flags.total_size()
            + self.link_flags.total_size()
            + self.bases.byte_len()
            + self.extras.total_size()
            + self.tail.total_size()
            + self.next.as_ref().map_or(0, |next| next.total_size())
            + self.cache.byte_len()
    }

    /// Bytes [`write_to`](Self::write_to) produces.
    pub fn io_size(&self) -> usize {
        header::HEADER_SIZE + self.body_io_size()
    }

    fn body_io_size(&self) -> usize {
        self.louds.io_size()
            + self.terminal_flags.io_size()
            + self.link_flags.io_size()
            + self.bases.io_size()
            + self.extras.io_size()
            + self.tail.io_size()
            + self.next.as_ref().map_or(0, |next| next.body_io_size())
            + self.cache.io_size()
            + 2 * std::mem::size_of::<u32>()
    }

    /// Restore a trie, header first.
    pub(crate) fn read_from<S: Source>(src: &mut S) -> Result<Self> {
        header::read_header(src)?;
        let trie = Self::read_level(src, true)?;
        Ok(trie)
    }

    fn read_level<S: Source>(src: &mut S, top: bool) -> Result<Self> {
        let louds = BitVector::read_from(src)?;
        let terminal_flags = BitVector::read_from(src)?;
        let link_flags = BitVector::read_from(src)?;
        let bases = src.read_vec::<u8>()?;
        let extras = FlatVector::read_from(src)?;
        let tail = Tail::read_from(src)?;
        let next = if link_flags.num_1s() != 0 && tail.is_empty() {
            Some(Box::new(Self::read_level(src, false)?))
        } else {
            None
        };
        let cache = src.read_vec::<CacheEntry>()?;
        if !cache.len().is_power_of_two() {
            return Err(Error::format(format!(
                "cache of {} slots is not a power of two",
                cache.len()
            )));
        }
        let cache_mask = cache.len() - 1;
        let num_l1_nodes = src.read_u32()? as usize;
        let config = TrieConfig::from_flags(src.read_u32()?)?;

        let trie = Self {
            louds,
            terminal_flags,
            link_flags,
            bases,
            extras,
            tail,
            next,
            cache,
            cache_mask,
            num_l1_nodes,
            config,
        };
        trie.check_level(top)?;
        Ok(trie)
    }

    /// Cross-check the counts of a restored level.
    fn check_level(&self, top: bool) -> Result<()> {
        let num_nodes = self.num_nodes();
        if self.louds.len() < 4 || !self.louds.has_select1() || (top && !self.louds.has_select0())
        {
            return Err(Error::format("level has a malformed LOUDS bitvector"));
        }
        if self.bases.len() != num_nodes || self.link_flags.len() != num_nodes {
            return Err(Error::format(format!(
                "level of {} nodes carries {} bases and {} link flags",
                num_nodes,
                self.bases.len(),
                self.link_flags.len()
            )));
        }
        if self.extras.len() != self.link_flags.num_1s() {
            return Err(Error::format(format!(
                "level has {} links but {} extras",
                self.link_flags.num_1s(),
                self.extras.len()
            )));
        }
        if top
            && (self.terminal_flags.len() != num_nodes + 1 || !self.terminal_flags.has_select1())
        {
            return Err(Error::format("top level has malformed terminal flags"));
        }
        if self.num_l1_nodes >= num_nodes.max(1) {
            return Err(Error::format(format!(
                "{} first-level nodes in a level of {} nodes",
                self.num_l1_nodes, num_nodes
            )));
        }
        let expected_tries = self.next.as_ref().map_or(1, |next| next.num_tries() + 1);
        if self.num_tries() != expected_tries {
            return Err(Error::format(format!(
                "level records {} tries but holds {}",
                self.num_tries(),
                expected_tries
            )));
        }
        Ok(())
    }

    /// Serialize, header first.
    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        header::write_header(writer)?;
        self.write_level(writer)
    }

    fn write_level<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        self.louds.write_to(writer)?;
        self.terminal_flags.write_to(writer)?;
        self.link_flags.write_to(writer)?;
        writer.write_vec(&self.bases)?;
        self.extras.write_to(writer)?;
        self.tail.write_to(writer)?;
        if let Some(next) = &self.next {
            next.write_level(writer)?;
        }
        writer.write_vec(&self.cache)?;
        writer.write_u32(self.num_l1_nodes as u32)?;
        writer.write_u32(self.config.to_flags())
    }

    /// Make every cache probe miss, in this level and below.
    ///
    /// Search results must not change; only the LOUDS scan is exercised.
    pub(crate) fn invalidate_cache(&mut self) {
        let mut cache = self.cache.to_vec();
        cache.iter_mut().for_each(CacheEntry::clear);
        self.cache = cache.into();
        if let Some(next) = &mut self.next {
            next.invalidate_cache();
        }
    }
}
