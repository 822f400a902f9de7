// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! PCZ2 container header
//!
//! On-disk layout, all integers little-endian:
//!
//! | Field | Size |
//! |---|---|
//! | magic `PCZ2` | 4 |
//! | name_len | u16 |
//! | original_size | u64 |
//! | filename | name_len |
//! | block_size | u32 |
//! | num_blocks | u64 |
//! | size table | num_blocks × u64 |
//!
//! The size table entry for a block is its encoded length including the
//! mode tag. Neither [`write_header`] nor [`read_header`] touches payload
//! bytes.

use std::io::{Read, Write};

use crate::constants::MAGIC;
use crate::error::{Error, Result};

/// Container header, including the per-block size table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Original file name, informational only
    pub filename: String,
    /// Uncompressed file size in bytes
    pub original_size: u64,
    /// Block width used by the writer
    pub block_size: u32,
    /// Number of blocks (`ceil(original_size / block_size)`)
    pub num_blocks: u64,
    /// Encoded length of each block, mode tag included
    pub block_comp_sizes: Vec<u64>,
}

impl FileHeader {
    /// Expected decoded length of block `index`. The last block covers the
    /// remainder of the file; all others are exactly `block_size` wide.
    ///
    /// Saturating arithmetic keeps hostile headers from wrapping; the
    /// resulting length disagreement is caught by the block decoder.
    pub fn block_len(&self, index: u64) -> usize {
        let block_size = self.block_size as u64;
        if index + 1 < self.num_blocks {
            block_size as usize
        } else {
            let full = block_size.saturating_mul(self.num_blocks.saturating_sub(1));
            self.original_size.saturating_sub(full) as usize
        }
    }

    /// Total payload length: the sum of the size table.
    pub fn payload_len(&self) -> u64 {
        self.block_comp_sizes.iter().sum()
    }
}

/// Number of blocks a file of `original_size` bytes splits into.
pub fn block_count(original_size: u64, block_size: usize) -> u64 {
    original_size.div_ceil(block_size as u64)
}

/// Write the header (including the block size table) to `w`.
pub fn write_header<W: Write>(w: &mut W, h: &FileHeader) -> Result<()> {
    let name = h.filename.as_bytes();
    if name.len() > u16::MAX as usize {
        return Err(Error::FilenameTooLong);
    }
    if h.block_comp_sizes.len() as u64 != h.num_blocks {
        return Err(Error::BlockCountMismatch);
    }

    w.write_all(MAGIC)?;
    w.write_all(&(name.len() as u16).to_le_bytes())?;
    w.write_all(&h.original_size.to_le_bytes())?;
    w.write_all(name)?;
    w.write_all(&h.block_size.to_le_bytes())?;
    w.write_all(&h.num_blocks.to_le_bytes())?;
    for &size in &h.block_comp_sizes {
        w.write_all(&size.to_le_bytes())?;
    }
    Ok(())
}

/// Read and validate a header from `r`. Any short read is an error.
pub fn read_header<R: Read>(r: &mut R) -> Result<FileHeader> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::BadMagic);
    }

    let name_len = read_u16(r)?;
    let original_size = read_u64(r)?;

    let mut name = vec![0u8; name_len as usize];
    r.read_exact(&mut name)?;

    let block_size = read_u32(r)?;
    let num_blocks = read_u64(r)?;

    // Capped preallocation: a corrupt count runs into a short read well
    // before the table grows unbounded.
    let mut block_comp_sizes = Vec::with_capacity(num_blocks.min(4096) as usize);
    for _ in 0..num_blocks {
        block_comp_sizes.push(read_u64(r)?);
    }

    Ok(FileHeader {
        filename: String::from_utf8_lossy(&name).into_owned(),
        original_size,
        block_size,
        num_blocks,
        block_comp_sizes,
    })
}

#[inline]
fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

#[inline]
fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[inline]
fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
