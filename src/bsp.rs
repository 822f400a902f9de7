// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Bulk-synchronous parallel drivers
//!
//! Blocks are partitioned statically: worker `w` owns the contiguous index
//! range `[w*chunk, (w+1)*chunk)` with `chunk = ceil(num_blocks / T)`.
//! Because the partition is contiguous, each worker's result slots are a
//! disjoint `&mut` chunk of the result table and writes need no
//! synchronization. Every worker enters a barrier after its loop, then the
//! coordinator joins them all and writes the container.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Barrier, Mutex};
use std::thread;

use crate::block_size;
use crate::decode::decode_block;
use crate::encode::encode_block;
use crate::error::{Error, Result};
use crate::header::read_header;
use crate::sequential::{stat_input, write_container, write_empty_container};

/// Compress `input` with `threads` workers under static partitioning.
///
/// `threads` is clamped to `[1, num_blocks]`.
pub fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    threads: usize,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let (original_size, filename) = stat_input(input)?;
    let block_size = block_size();

    if original_size == 0 {
        return write_empty_container(output, filename, block_size);
    }

    let data = fs::read(input)?;
    let blocks: Vec<&[u8]> = data.chunks(block_size).collect();
    let num_blocks = blocks.len();

    let threads = threads.max(1).min(num_blocks);
    let chunk = num_blocks.div_ceil(threads);

    let mut encoded: Vec<Vec<u8>> = vec![Vec::new(); num_blocks];
    let barrier = Barrier::new(threads);

    thread::scope(|scope| {
        // Workers past the last chunk own an empty range; they only meet
        // the others at the barrier.
        let mut parts = blocks.chunks(chunk).zip(encoded.chunks_mut(chunk));
        for _ in 0..threads {
            let part = parts.next();
            let barrier = &barrier;
            scope.spawn(move || {
                if let Some((part, slots)) = part {
                    for (block, slot) in part.iter().zip(slots.iter_mut()) {
                        *slot = encode_block(block);
                    }
                }
                barrier.wait();
            });
        }
    });

    write_container(output, filename, data.len() as u64, block_size, &encoded)
}

/// Decompress `input` with `threads` workers under static partitioning.
///
/// The whole payload is materialized, per-block offsets are prefix-summed
/// from the size table, and each worker decodes its contiguous index range
/// into the matching contiguous byte range of the output buffer. The first
/// error any worker hits is kept; peers poll it once per block and abandon
/// the rest of their range.
pub fn decompress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    threads: usize,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let mut reader = BufReader::new(File::open(input)?);
    let header = read_header(&mut reader)?;

    if header.original_size == 0 || header.num_blocks == 0 {
        File::create(output)?;
        return Ok(());
    }

    let num_blocks = header.num_blocks as usize;

    let mut payload = vec![0u8; header.payload_len() as usize];
    reader.read_exact(&mut payload)?;

    let mut offsets = Vec::with_capacity(num_blocks);
    let mut cur = 0usize;
    for &size in &header.block_comp_sizes {
        offsets.push(cur);
        cur += size as usize;
    }

    let mut out_buf = vec![0u8; header.original_size as usize];

    let threads = threads.max(1).min(num_blocks);
    let chunk = num_blocks.div_ceil(threads);

    let first_error: Mutex<Option<Error>> = Mutex::new(None);

    // Worker w's contiguous index range maps to a contiguous byte range of
    // the output; carving it with split_at_mut keeps the borrows disjoint.
    let mut parts: Vec<&mut [u8]> = Vec::with_capacity(threads);
    let mut rest: &mut [u8] = &mut out_buf;
    for w in 0..threads {
        let start = w * chunk;
        let end = (start + chunk).min(num_blocks);
        let len: usize = (start..end).map(|i| header.block_len(i as u64)).sum();
        let (part, tail) = rest.split_at_mut(len.min(rest.len()));
        parts.push(part);
        rest = tail;
    }
    let barrier = Barrier::new(threads);

    thread::scope(|scope| {
        for (w, out_part) in parts.into_iter().enumerate() {
            let header = &header;
            let payload = &payload;
            let offsets = &offsets;
            let first_error = &first_error;
            let barrier = &barrier;

            scope.spawn(move || {
                let start = w * chunk;
                let end = (start + chunk).min(num_blocks);
                let mut wrote = 0;

                for index in start..end {
                    if first_error.lock().unwrap().is_some() {
                        break;
                    }

                    let off = offsets[index];
                    let enc = &payload[off..off + header.block_comp_sizes[index] as usize];
                    let expected = header.block_len(index as u64);

                    match decode_block(enc, expected) {
                        Ok(decoded) => {
                            out_part[wrote..wrote + expected].copy_from_slice(&decoded);
                            wrote += expected;
                        }
                        Err(e) => {
                            let mut slot = first_error.lock().unwrap();
                            if slot.is_none() {
                                *slot = Some(e.in_block(index as u64));
                            }
                            break;
                        }
                    }
                }
                barrier.wait();
            });
        }
    });

    if let Some(e) = first_error.into_inner().unwrap() {
        return Err(e);
    }

    let mut out = BufWriter::new(File::create(output)?);
    out.write_all(&out_buf)?;
    out.flush()?;
    Ok(())
}
