// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Single-threaded file drivers
//!
//! The sequential compressor streams the input one block at a time, so its
//! peak memory is one block plus the staged encoded output. It also hosts
//! the container plumbing the parallel drivers share.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::block_size;
use crate::decode::decode_block;
use crate::encode::encode_block;
use crate::error::{Error, Result};
use crate::header::{block_count, read_header, write_header, FileHeader};

/// Stat `path`, rejecting anything but a regular file. Returns the file
/// size and the basename recorded in the container.
pub(crate) fn stat_input(path: &Path) -> Result<(u64, String)> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(Error::NotRegularFile);
    }
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((meta.len(), filename))
}

/// Write the container for an empty input: a header with zero blocks and
/// no payload. The configured block size is still stamped.
pub(crate) fn write_empty_container(
    output: &Path,
    filename: String,
    block_size: usize,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(output)?);
    let header = FileHeader {
        filename,
        original_size: 0,
        block_size: block_size as u32,
        num_blocks: 0,
        block_comp_sizes: Vec::new(),
    };
    write_header(&mut out, &header)?;
    out.flush()?;
    Ok(())
}

/// Write the header followed by the encoded blocks in index order.
pub(crate) fn write_container(
    output: &Path,
    filename: String,
    original_size: u64,
    block_size: usize,
    encoded: &[Vec<u8>],
) -> Result<()> {
    let mut out = BufWriter::new(File::create(output)?);
    let header = FileHeader {
        filename,
        original_size,
        block_size: block_size as u32,
        num_blocks: encoded.len() as u64,
        block_comp_sizes: encoded.iter().map(|e| e.len() as u64).collect(),
    };
    write_header(&mut out, &header)?;
    for enc in encoded {
        out.write_all(enc)?;
    }
    out.flush()?;
    Ok(())
}

/// Compress `input` into a PCZ2 container at `output` on the calling thread.
pub fn compress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let (original_size, filename) = stat_input(input)?;
    let block_size = block_size();

    if original_size == 0 {
        return write_empty_container(output, filename, block_size);
    }

    let num_blocks = block_count(original_size, block_size);
    let mut reader = BufReader::new(File::open(input)?);

    let mut encoded = Vec::with_capacity(num_blocks as usize);
    let mut buf = vec![0u8; block_size];
    for index in 0..num_blocks {
        let len = if index < num_blocks - 1 {
            block_size
        } else {
            (original_size - block_size as u64 * (num_blocks - 1)) as usize
        };
        reader.read_exact(&mut buf[..len])?;
        encoded.push(encode_block(&buf[..len]));
    }

    write_container(output, filename, original_size, block_size, &encoded)
}

/// Restore the original file from a PCZ2 container on the calling thread.
///
/// Decoded blocks are written straight to the output file as they are
/// produced; nothing but the current block is held in memory.
pub fn decompress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let mut reader = BufReader::new(File::open(input)?);
    let header = read_header(&mut reader)?;

    let mut out = BufWriter::new(File::create(output)?);
    if header.original_size == 0 || header.num_blocks == 0 {
        return Ok(());
    }

    let mut enc = Vec::new();
    for index in 0..header.num_blocks {
        let comp_size = header.block_comp_sizes[index as usize] as usize;
        enc.resize(comp_size, 0);
        reader.read_exact(&mut enc)?;

        let decoded =
            decode_block(&enc, header.block_len(index)).map_err(|e| e.in_block(index))?;
        out.write_all(&decoded)?;
    }
    out.flush()?;
    Ok(())
}
