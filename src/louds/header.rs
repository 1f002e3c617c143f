//! Fixed 16-byte file header.

use crate::error::{Error, Result};
use crate::io::{Source, Writer};
use std::io::Write;

const MAGIC: [u8; 16] = *b"SuccinctTrie\0v1\0";

pub(crate) const HEADER_SIZE: usize = MAGIC.len();

pub(crate) fn read_header<S: Source>(src: &mut S) -> Result<()> {
    let mut magic = [0u8; HEADER_SIZE];
    src.read_bytes(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::format("bad header: not a serialized trie"));
    }
    Ok(())
}

pub(crate) fn write_header<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    writer.write_bytes(&MAGIC)
}
