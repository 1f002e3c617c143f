//! Byte transports for trie serialization.
//!
//! Reading goes through the [`Source`] trait so every structure has a single
//! restore routine shared by stream loading ([`Reader`]) and zero-copy
//! mapping ([`Mapper`]). Writing goes through [`Writer`].

use bytemuck::Pod;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::mem::size_of;
use std::path::Path;
use std::sync::Arc;

use crate::binary::{padding, PodVec};
use crate::error::{Error, Result};

/// Records are copied from streams in chunks of at most this many bytes so a
/// corrupted length fails on the short read rather than on allocation.
const READ_CHUNK_BYTES: usize = 1 << 20;

/// Convert a serialized blob length to a record count.
fn blob_records<T: Pod>(byte_len: u64) -> Result<usize> {
    let byte_len =
        usize::try_from(byte_len).map_err(|_| Error::Size("blob length exceeds address space"))?;
    let record = size_of::<T>();
    if byte_len % record != 0 {
        return Err(Error::format(format!(
            "blob of {} bytes is not a multiple of the {}-byte record size",
            byte_len, record
        )));
    }
    Ok(byte_len / record)
}

/// Something serialized structures can be restored from.
pub(crate) trait Source {
    /// Fill `buf` completely.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Skip `n` bytes.
    fn seek(&mut self, n: usize) -> Result<()>;

    /// Restore one length-prefixed, padded blob of records.
    fn read_vec<T: Pod>(&mut self) -> Result<PodVec<T>>;

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

// =============================================================================
// Stream reading
// =============================================================================

/// Copies blobs out of any `std::io::Read` into owned vectors.
pub(crate) struct Reader<R> {
    inner: R,
}

impl<R: Read> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Source for Reader<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    fn seek(&mut self, mut n: usize) -> Result<()> {
        let mut scratch = [0u8; 64];
        while n > 0 {
            let step = n.min(scratch.len());
            self.inner.read_exact(&mut scratch[..step])?;
            n -= step;
        }
        Ok(())
    }

    fn read_vec<T: Pod>(&mut self) -> Result<PodVec<T>> {
        let count = blob_records::<T>(self.read_u64()?)?;
        let chunk = (READ_CHUNK_BYTES / size_of::<T>()).max(1);

        let mut records: Vec<T> = Vec::new();
        while records.len() < count {
            let start = records.len();
            let step = (count - start).min(chunk);
            records
                .try_reserve_exact(step)
                .map_err(|_| Error::Memory((start + step) * size_of::<T>()))?;
            records.resize(start + step, T::zeroed());
            self.inner
                .read_exact(bytemuck::cast_slice_mut(&mut records[start..]))?;
        }

        self.seek(padding(count * size_of::<T>()))?;
        Ok(PodVec::Owned(records))
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// A read-only byte region that mapped blobs point into.
pub(crate) enum Region {
    /// A memory-mapped file.
    File(Mmap),
    /// An 8-aligned private copy of caller bytes.
    Buffer { words: Vec<u64>, len: usize },
}

impl Region {
    /// Map a file read-only, optionally pre-faulting its pages.
    pub fn map_file(path: &Path, populate: bool) -> Result<Self> {
        let file = File::open(path)?;
        let mut options = MmapOptions::new();
        if populate {
            options.populate();
        }
        // SAFETY: the mapping is read-only; the file must not be modified
        // while the mapping is alive.
        let mmap = unsafe { options.map(&file)? };
        Ok(Region::File(mmap))
    }

    /// Copy `bytes` into a word-aligned buffer.
    pub fn copy_from(bytes: &[u8]) -> Self {
        let mut words = vec![0u64; bytes.len().div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);
        Region::Buffer {
            words,
            len: bytes.len(),
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Region::File(mmap) => &mmap[..],
            Region::Buffer { words, len } => &bytemuck::cast_slice::<u64, u8>(words)[..*len],
        }
    }
}

/// Hands out blobs as windows into a shared [`Region`] without copying.
pub(crate) struct Mapper {
    region: Arc<Region>,
    pos: usize,
}

impl Mapper {
    pub fn new(region: Region) -> Self {
        Self {
            region: Arc::new(region),
            pos: 0,
        }
    }

    /// Claim the next `n` bytes, returning their offset.
    fn claim(&mut self, n: usize) -> Result<usize> {
        let available = self.region.bytes().len() - self.pos;
        if n > available {
            return Err(Error::format(format!(
                "unexpected end of mapped region: need {} bytes at offset {}, {} available",
                n, self.pos, available
            )));
        }
        let offset = self.pos;
        self.pos += n;
        Ok(offset)
    }
}

impl Source for Mapper {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let offset = self.claim(buf.len())?;
        buf.copy_from_slice(&self.region.bytes()[offset..offset + buf.len()]);
        Ok(())
    }

    fn seek(&mut self, n: usize) -> Result<()> {
        self.claim(n).map(|_| ())
    }

    fn read_vec<T: Pod>(&mut self) -> Result<PodVec<T>> {
        let count = blob_records::<T>(self.read_u64()?)?;
        let byte_len = count
            .checked_mul(size_of::<T>())
            .ok_or(Error::Size("blob length exceeds address space"))?;
        let offset = self.claim(byte_len)?;

        let bytes = &self.region.bytes()[offset..offset + byte_len];
        if count > 0 && bytemuck::try_cast_slice::<u8, T>(bytes).is_err() {
            return Err(Error::format(format!("misaligned blob at offset {}", offset)));
        }

        self.seek(padding(byte_len))?;
        Ok(PodVec::Mapped {
            region: Arc::clone(&self.region),
            offset,
            len: count,
            _marker: PhantomData,
        })
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Writes blobs and scalars to any `std::io::Write`.
pub(crate) struct Writer<W> {
    inner: W,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a length-prefixed, zero-padded blob of records.
    pub fn write_vec<T: Pod>(&mut self, records: &[T]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(records);
        self.write_u64(bytes.len() as u64)?;
        self.write_bytes(bytes)?;
        self.write_bytes(&[0u8; 8][..padding(bytes.len())])
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
