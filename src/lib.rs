// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! # PCZ2 block-parallel compression
//!
//! This library compresses a regular file into a self-describing container
//! of independently compressed fixed-size blocks, and restores the
//! original byte for byte. Each block is either stored raw or as a small
//! LZ77 token stream, whichever is shorter, so a block never grows by more
//! than its one-byte mode tag.
//!
//! The same block workload is driven by three interchangeable schedulers:
//!
//! - **sequential** — one thread, blocks streamed in order
//! - **bsp** — bulk-synchronous: static contiguous partitioning with a
//!   barrier before the container is written
//! - **ws** — work-stealing: per-worker Chase–Lev deques, owner pops the
//!   bottom, thieves steal the top
//!
//! Containers produced by any driver decode under any other.
//!
//! ## Block Codec Example
//!
//! ```rust
//! use pcz::{decode_block, encode_block};
//!
//! let data = b"the quick brown fox jumps over the quick brown fox";
//! let encoded = encode_block(data);
//! let decoded = decode_block(&encoded, data.len()).expect("decode failed");
//! assert_eq!(&decoded[..], &data[..]);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

mod constants;
mod decode;
mod encode;
mod error;
mod header;

pub mod bsp;
pub mod deque;
pub mod sequential;
pub mod worksteal;

pub use constants::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};
pub use decode::{decode_block, decode_tokens};
pub use encode::{encode_block, encode_tokens};
pub use error::{Error, Result};
pub use header::{block_count, read_header, write_header, FileHeader};

pub use bsp::{compress_file as compress_file_bsp, decompress_file as decompress_file_bsp};
pub use sequential::{compress_file, decompress_file};
pub use worksteal::{compress_file as compress_file_ws, decompress_file as decompress_file_ws};

/// Process-wide block size used by the compression drivers.
static BLOCK_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_BLOCK_SIZE);

/// Set the block size for subsequent compressions, clamped to
/// `[MIN_BLOCK_SIZE, MAX_BLOCK_SIZE]`.
///
/// Writers stamp the configured size into each container they produce;
/// decompression always honors the size stored in the container instead.
pub fn set_block_size(n: usize) {
    BLOCK_SIZE.store(n.clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE), Ordering::Relaxed);
}

/// The currently configured block size.
pub fn block_size() -> usize {
    BLOCK_SIZE.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests;
