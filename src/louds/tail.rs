//! Suffix store for the last trie level.
//!
//! Each leftover suffix is stored once; a suffix that ends another stored
//! suffix points into it instead of being written again. Text mode ends
//! every suffix with a NUL byte, binary mode marks the last byte of each
//! suffix in a parallel bitvector.

use std::io::Write;

use tracing::debug;

use super::key::ReverseKey;
use super::sort;
use super::state::State;
use crate::binary::PodVec;
use crate::bits::{BitVector, BitVectorBuilder};
use crate::config::TailMode;
use crate::error::{Error, Result};
use crate::io::{Source, Writer};

#[derive(Clone, Debug, Default)]
pub(crate) struct Tail {
    buf: PodVec<u8>,
    end_flags: BitVector,
}

impl Tail {
    /// Store `entries`, returning the tail and each entry's offset.
    ///
    /// `offsets[i]` is the position of entry `i`. A requested text tail is
    /// stored in binary mode when any entry contains a NUL byte.
    ///
    /// # Errors
    ///
    /// [`Error::Range`] for an empty entry, [`Error::Size`] if the stored
    /// bytes exceed `u32::MAX`.
    pub fn build(entries: &mut [ReverseKey<'_>], mode: TailMode) -> Result<(Self, Vec<u32>)> {
        let mode = match mode {
            TailMode::Text if entries.iter().any(|entry| entry.bytes().contains(&0)) => {
                debug!("suffix contains a NUL byte, storing tail in binary mode");
                TailMode::Binary
            }
            mode => mode,
        };

        for (i, entry) in entries.iter_mut().enumerate() {
            entry.set_id(i);
        }
        // Sorting reversed strings places each suffix right before the
        // strings it ends.
        sort::sort(entries);

        let mut offsets = vec![0u32; entries.len()];
        let mut buf: Vec<u8> = Vec::new();
        let mut end_flags = BitVectorBuilder::new();
        let mut last: Option<&ReverseKey<'_>> = None;
        for current in entries.iter().rev() {
            if current.is_empty() {
                return Err(Error::Range("empty suffix in tail"));
            }
            let shared = last.filter(|last| is_prefix(current, last));
            match shared {
                Some(last) => {
                    offsets[current.id()] =
                        offsets[last.id()] + (last.len() - current.len()) as u32;
                }
                None => {
                    offsets[current.id()] = buf.len() as u32;
                    buf.extend_from_slice(current.bytes());
                    match mode {
                        TailMode::Text => buf.push(0),
                        TailMode::Binary => {
                            for _ in 1..current.len() {
                                end_flags.push(false);
                            }
                            end_flags.push(true);
                        }
                    }
                    if buf.len() > u32::MAX as usize {
                        return Err(Error::Size("tail longer than u32::MAX bytes"));
                    }
                }
            }
            last = Some(current);
        }

        let tail = Self {
            buf: buf.into(),
            end_flags: end_flags.build(false, false)?,
        };
        Ok((tail, offsets))
    }

    /// Effective storage mode.
    #[inline]
    pub fn mode(&self) -> TailMode {
        if self.end_flags.is_empty() {
            TailMode::Text
        } else {
            TailMode::Binary
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append the suffix at `offset` to `key_buf`.
    pub fn restore(&self, key_buf: &mut Vec<u8>, offset: usize) {
        let mut pos = offset;
        if self.end_flags.is_empty() {
            while self.buf[pos] != 0 {
                key_buf.push(self.buf[pos]);
                pos += 1;
            }
        } else {
            loop {
                key_buf.push(self.buf[pos]);
                pos += 1;
                if self.end_flags.get(pos - 1) {
                    break;
                }
            }
        }
    }

    /// Match the whole suffix at `offset` against the query.
    ///
    /// Fails if the query ends before the suffix does.
    pub fn match_at(&self, query: &[u8], state: &mut State, offset: usize) -> bool {
        self.walk(query, state, offset, None)
    }

    /// Match the suffix at `offset` against the query, copying it into the
    /// state's key buffer.
    ///
    /// If the query ends inside the suffix, the rest of the suffix is still
    /// copied and the match succeeds.
    pub fn prefix_match_at(&self, query: &[u8], state: &mut State, offset: usize) -> bool {
        let mut key_buf = std::mem::take(&mut state.key_buf);
        let matched = self.walk(query, state, offset, Some(&mut key_buf));
        state.key_buf = key_buf;
        matched
    }

    fn walk(
        &self,
        query: &[u8],
        state: &mut State,
        offset: usize,
        mut key_buf: Option<&mut Vec<u8>>,
    ) -> bool {
        let mut pos = offset;
        loop {
            let byte = self.buf[pos];
            if query.get(state.query_pos) != Some(&byte) {
                return false;
            }
            if let Some(key_buf) = key_buf.as_deref_mut() {
                key_buf.push(byte);
            }
            state.query_pos += 1;
            pos += 1;
            if self.ends_before(pos) {
                return true;
            }
            if state.query_pos >= query.len() {
                break;
            }
        }

        // The query is exhausted inside the suffix.
        match key_buf {
            Some(key_buf) => {
                self.restore(key_buf, pos);
                true
            }
            None => false,
        }
    }

    /// Whether the suffix ended with the byte just before `pos`.
    #[inline]
    fn ends_before(&self, pos: usize) -> bool {
        if self.end_flags.is_empty() {
            self.buf[pos] == 0
        } else {
            self.end_flags.get(pos - 1)
        }
    }

    pub fn total_size(&self) -> usize {
        self.buf.byte_len() + self.end_flags.total_size()
    }

    pub fn io_size(&self) -> usize {
        self.buf.io_size() + self.end_flags.io_size()
    }

    pub(crate) fn read_from<S: Source>(src: &mut S) -> Result<Self> {
        let buf = src.read_vec::<u8>()?;
        let end_flags = BitVector::read_from(src)?;
        if !end_flags.is_empty() && end_flags.len() != buf.len() {
            return Err(Error::format(format!(
                "tail of {} bytes carries {} end flags",
                buf.len(),
                end_flags.len()
            )));
        }
        if end_flags.is_empty() && buf.last().is_some_and(|&b| b != 0) {
            return Err(Error::format("text tail is not NUL-terminated"));
        }
        Ok(Self { buf, end_flags })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_vec(&self.buf)?;
        self.end_flags.write_to(writer)
    }
}

/// Whether `short` reads as a prefix of `long` (both back to front).
fn is_prefix(short: &ReverseKey<'_>, long: &ReverseKey<'_>) -> bool {
    short.len() <= long.len() && (0..short.len()).all(|i| short.at(i) == long.at(i))
}
