//! Binary storage for succinct data structures.
//!
//! Every array in a serialized trie is a blob: a little-endian `u64` byte
//! length, the raw little-endian records, then zero padding up to the next
//! multiple of 8 bytes. Because every blob starts 8-aligned, a blob inside a
//! memory-mapped file can be viewed in place as `&[T]` with `bytemuck`.
//!
//! [`PodVec`] is the storage behind every such array: either an owned `Vec`
//! (after a build or a stream read) or a window into a shared mapping.

use bytemuck::Pod;
use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::ops::Deref;
use std::sync::Arc;

use crate::io::Region;

/// Alignment of every blob in the serialized form.
pub(crate) const BLOB_ALIGN: usize = 8;

/// Number of zero bytes that follow a blob of `byte_len` bytes.
#[inline]
pub(crate) fn padding(byte_len: usize) -> usize {
    byte_len.wrapping_neg() % BLOB_ALIGN
}

/// Serialized size of a blob holding `byte_len` bytes of records.
#[inline]
pub(crate) fn blob_size(byte_len: usize) -> usize {
    size_of::<u64>() + byte_len + padding(byte_len)
}

/// A read-only array of POD records, owned or borrowed from a mapping.
pub(crate) enum PodVec<T: Pod> {
    Owned(Vec<T>),
    Mapped {
        region: Arc<Region>,
        offset: usize,
        len: usize,
        _marker: PhantomData<T>,
    },
}

impl<T: Pod> PodVec<T> {
    /// Whether the records live in a shared mapping.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        matches!(self, PodVec::Mapped { .. })
    }

    /// In-memory size of the records in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.len() * size_of::<T>()
    }

    /// Size of this array once written as a blob.
    #[inline]
    pub fn io_size(&self) -> usize {
        blob_size(self.byte_len())
    }
}

impl<T: Pod> Deref for PodVec<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        match self {
            PodVec::Owned(vec) => vec,
            PodVec::Mapped {
                region,
                offset,
                len,
                ..
            } => {
                if *len == 0 {
                    return &[];
                }
                let bytes = &region.bytes()[*offset..*offset + *len * size_of::<T>()];
                // Alignment was validated when the blob was mapped.
                bytemuck::cast_slice(bytes)
            }
        }
    }
}

impl<T: Pod> Default for PodVec<T> {
    fn default() -> Self {
        PodVec::Owned(Vec::new())
    }
}

impl<T: Pod> From<Vec<T>> for PodVec<T> {
    fn from(vec: Vec<T>) -> Self {
        PodVec::Owned(vec)
    }
}

impl<T: Pod> Clone for PodVec<T> {
    fn clone(&self) -> Self {
        match self {
            PodVec::Owned(vec) => PodVec::Owned(vec.clone()),
            PodVec::Mapped {
                region,
                offset,
                len,
                ..
            } => PodVec::Mapped {
                region: Arc::clone(region),
                offset: *offset,
                len: *len,
                _marker: PhantomData,
            },
        }
    }
}

impl<T: Pod> fmt::Debug for PodVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodVec")
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
