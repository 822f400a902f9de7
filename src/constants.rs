// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Container magic bytes
pub const MAGIC: &[u8; 4] = b"PCZ2";

/// Mode tag for a block stored as an LZ token stream
pub const MODE_LZ: u8 = 0x00;

/// Mode tag for a block stored verbatim
pub const MODE_RAW: u8 = 0xFF;

/// Token flag for a single literal byte
pub const TOKEN_LITERAL: u8 = 0x00;

/// Token flag for a back-reference match
pub const TOKEN_MATCH: u8 = 0x01;

/// Sliding window bound for match offsets (64KB)
pub const WINDOW_SIZE: usize = 65_535;

/// Minimum match length
pub const MIN_MATCH: usize = 4;

/// Maximum match length (length is stored in a single byte)
pub const MAX_MATCH: usize = 255;

/// Hash table bits (16K entries)
pub const HASH_BITS: u32 = 14;

/// Hash table size
pub const HASH_SIZE: usize = 1 << HASH_BITS;

/// Maximum block size (4MB)
pub const MAX_BLOCK_SIZE: usize = 4 << 20;

/// Minimum block size (4KB)
pub const MIN_BLOCK_SIZE: usize = 4 << 10;

/// Default block size (1MB)
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 20;

/// Steal attempts per phase of the work-stealing loop
pub const STEAL_TRIES: usize = 10;
