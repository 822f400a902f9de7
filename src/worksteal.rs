// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Work-stealing drivers
//!
//! Block indices are seeded round-robin across per-worker Chase–Lev
//! deques. A worker pops its own deque from the bottom; when it runs dry
//! it steals from random victims' tops, first in a fast spin, then once
//! more after yielding the processor. A worker that still finds nothing
//! terminates.
//!
//! Termination is optimistic: a worker may give up while a slower peer
//! still holds queued tasks. Workers therefore hand their finished blocks
//! back as owned `(index, bytes)` lists at join, and the coordinator
//! processes any index nobody claimed before writing the output, so every
//! block is produced exactly once regardless of steal timing.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::block_size;
use crate::constants::STEAL_TRIES;
use crate::decode::decode_block;
use crate::deque::WsDeque;
use crate::encode::encode_block;
use crate::error::{Error, Result};
use crate::header::read_header;
use crate::sequential::{stat_input, write_container, write_empty_container};

/// Xorshift32 victim-selection PRNG, seeded from the clock and worker id.
struct XorShift32(u32);

impl XorShift32 {
    fn seeded(id: usize) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        // xorshift has a fixed point at zero
        XorShift32((nanos ^ id as u32) | 1)
    }

    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

/// Pop the worker's own deque, falling back to the two-phase steal loop.
fn next_task(id: usize, deques: &[WsDeque], rng: &mut XorShift32) -> Option<usize> {
    if let Some(task) = deques[id].pop_bottom() {
        return Some(task);
    }

    // Phase A: fast spin over random victims.
    for _ in 0..STEAL_TRIES {
        let victim = rng.next() as usize % deques.len();
        if victim == id {
            continue;
        }
        if let Some(task) = deques[victim].steal() {
            return Some(task);
        }
    }

    // Phase B: yield once, then retry before giving up.
    thread::yield_now();
    for _ in 0..STEAL_TRIES {
        let victim = rng.next() as usize % deques.len();
        if victim == id {
            continue;
        }
        if let Some(task) = deques[victim].steal() {
            return Some(task);
        }
    }

    None
}

/// Allocate one deque per worker and seed block `i` onto deque `i mod T`.
fn seed_deques(num_blocks: usize, threads: usize) -> Vec<WsDeque> {
    let deques: Vec<WsDeque> = (0..threads)
        .map(|_| WsDeque::new(num_blocks.div_ceil(threads)))
        .collect();
    for index in 0..num_blocks {
        deques[index % threads].push_bottom(index);
    }
    deques
}

/// Compress `input` with `threads` work-stealing workers.
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
    let deques = seed_deques(num_blocks, threads);

    let results: Mutex<Vec<(usize, Vec<u8>)>> = Mutex::new(Vec::with_capacity(num_blocks));

    thread::scope(|scope| {
        for id in 0..threads {
            let deques = &deques;
            let blocks = &blocks;
            let results = &results;

            scope.spawn(move || {
                let mut rng = XorShift32::seeded(id);
                let mut done = Vec::new();
                while let Some(index) = next_task(id, deques, &mut rng) {
                    done.push((index, encode_block(blocks[index])));
                }
                results.lock().unwrap().extend(done);
            });
        }
    });

    let mut encoded: Vec<Option<Vec<u8>>> = vec![None; num_blocks];
    for (index, enc) in results.into_inner().unwrap() {
        encoded[index] = Some(enc);
    }

    // Completion sweep: encode whatever no worker got to.
    let encoded: Vec<Vec<u8>> = encoded
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.unwrap_or_else(|| encode_block(blocks[index])))
        .collect();

    write_container(output, filename, data.len() as u64, block_size, &encoded)
}

/// Decompress `input` with `threads` work-stealing workers.
///
/// The first decode error wins; peers poll the shared error cell before
/// each task and abandon their remaining work once it is set.
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

    let threads = threads.max(1).min(num_blocks);
    let deques = seed_deques(num_blocks, threads);

    let first_error: Mutex<Option<Error>> = Mutex::new(None);
    let results: Mutex<Vec<(usize, Vec<u8>)>> = Mutex::new(Vec::with_capacity(num_blocks));

    thread::scope(|scope| {
        for id in 0..threads {
            let deques = &deques;
            let header = &header;
            let payload = &payload;
            let offsets = &offsets;
            let first_error = &first_error;
            let results = &results;

            scope.spawn(move || {
                let mut rng = XorShift32::seeded(id);
                let mut done = Vec::new();

                while let Some(index) = next_task(id, deques, &mut rng) {
                    if first_error.lock().unwrap().is_some() {
                        break;
                    }

                    let off = offsets[index];
                    let enc = &payload[off..off + header.block_comp_sizes[index] as usize];

                    match decode_block(enc, header.block_len(index as u64)) {
                        Ok(decoded) => done.push((index, decoded)),
                        Err(e) => {
                            let mut slot = first_error.lock().unwrap();
                            if slot.is_none() {
                                *slot = Some(e.in_block(index as u64));
                            }
                            break;
                        }
                    }
                }
                results.lock().unwrap().extend(done);
            });
        }
    });

    if let Some(e) = first_error.into_inner().unwrap() {
        return Err(e);
    }

    let mut decoded: Vec<Option<Vec<u8>>> = vec![None; num_blocks];
    for (index, block) in results.into_inner().unwrap() {
        decoded[index] = Some(block);
    }

    let mut out = BufWriter::new(File::create(output)?);
    for (index, slot) in decoded.into_iter().enumerate() {
        let block = match slot {
            Some(block) => block,
            // Completion sweep, as on the compression side.
            None => {
                let off = offsets[index];
                let enc = &payload[off..off + header.block_comp_sizes[index] as usize];
                decode_block(enc, header.block_len(index as u64))
                    .map_err(|e| e.in_block(index as u64))?
            }
        };
        out.write_all(&block)?;
    }
    out.flush()?;
    Ok(())
}
