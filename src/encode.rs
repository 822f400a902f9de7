// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! LZ77 token encoder
//!
//! The encoder scans the input left to right with a single-slot hash table
//! of the most recent position each 4-byte key was seen at. Matching is
//! greedy first-hit: no chain walk, no lazy evaluation.

use crate::constants::*;

/// Hash table sentinel for "no previous occurrence"
const NO_POS: u32 = u32::MAX;

/// Hash the 4 bytes at `offset` into a table slot.
#[inline]
fn hash(data: &[u8], offset: usize) -> usize {
    let val = u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]);
    (val.wrapping_mul(0x1e35a7bd) >> (32 - HASH_BITS)) as usize
}

/// Compress `src` into a token stream.
///
/// The stream is a concatenation of two token shapes:
/// - `0x00, b` — a one-byte literal
/// - `0x01, o_lo, o_hi, L` — copy `L` bytes from `out_len - offset`
///
/// Match offsets stay within the 64KB sliding window and lengths within
/// `[MIN_MATCH, MAX_MATCH]`. Encoding is total: every input has a token
/// stream (in the worst case, all literals).
pub fn encode_tokens(src: &[u8]) -> Vec<u8> {
    if src.is_empty() {
        return Vec::new();
    }

    let mut dst = Vec::with_capacity(src.len());
    let mut table = vec![NO_POS; HASH_SIZE];

    let mut i = 0;
    while i < src.len() {
        // Too close to the end to form a 4-byte key.
        if i + MIN_MATCH > src.len() {
            dst.push(TOKEN_LITERAL);
            dst.push(src[i]);
            i += 1;
            continue;
        }

        let h = hash(src, i);
        let candidate = table[h];
        table[h] = i as u32;

        // A candidate is usable if it lies within the window and the four
        // key bytes actually match (the hash may collide).
        if candidate != NO_POS {
            let c = candidate as usize;
            let dist = i - c;
            if dist > 0 && dist < WINDOW_SIZE && src[c..c + MIN_MATCH] == src[i..i + MIN_MATCH] {
                let mut match_len = MIN_MATCH;
                while match_len < MAX_MATCH
                    && i + match_len < src.len()
                    && c + match_len < src.len()
                    && src[c + match_len] == src[i + match_len]
                {
                    match_len += 1;
                }

                dst.push(TOKEN_MATCH);
                dst.push((dist & 0xff) as u8);
                dst.push((dist >> 8) as u8);
                dst.push(match_len as u8);

                i += match_len;
                continue;
            }
        }

        dst.push(TOKEN_LITERAL);
        dst.push(src[i]);
        i += 1;
    }

    dst
}

/// Encode one block: a mode tag followed by either the LZ token stream or
/// the raw block bytes.
///
/// LZ wins only when it is strictly shorter than storing the block
/// verbatim, so no block ever grows beyond `1 + block.len()` bytes.
pub fn encode_block(block: &[u8]) -> Vec<u8> {
    let tokens = encode_tokens(block);

    let mut enc;
    if tokens.len() < block.len() {
        enc = Vec::with_capacity(1 + tokens.len());
        enc.push(MODE_LZ);
        enc.extend_from_slice(&tokens);
    } else {
        enc = Vec::with_capacity(1 + block.len());
        enc.push(MODE_RAW);
        enc.extend_from_slice(block);
    }
    enc
}
