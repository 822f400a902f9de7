// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! LZ77 token decoder and encoded-block dispatch

use crate::constants::*;
use crate::error::{Error, Result};

/// Decode a token stream back into `expected_size` bytes.
///
/// Match copies are performed byte-wise: a match with `offset < length`
/// reads bytes it appended moments earlier, which is how run-length
/// patterns are expressed (`offset=1, length=5` repeats the last byte
/// five times).
pub fn decode_tokens(tokens: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_size);
    let mut s = 0;

    while s < tokens.len() {
        let flag = tokens[s];
        s += 1;

        match flag {
            TOKEN_LITERAL => {
                if s >= tokens.len() {
                    return Err(Error::TruncatedLiteral);
                }
                out.push(tokens[s]);
                s += 1;
            }
            TOKEN_MATCH => {
                if s + 3 > tokens.len() {
                    return Err(Error::TruncatedMatch);
                }
                let offset = tokens[s] as usize | (tokens[s + 1] as usize) << 8;
                let length = tokens[s + 2] as usize;
                s += 3;

                if offset == 0 || offset > out.len() {
                    return Err(Error::InvalidMatchOffset {
                        offset,
                        out_len: out.len(),
                    });
                }

                let start = out.len() - offset;
                for j in 0..length {
                    let b = out[start + j];
                    out.push(b);
                }
            }
            _ => return Err(Error::InvalidTokenFlag(flag)),
        }
    }

    if out.len() != expected_size {
        return Err(Error::SizeMismatch {
            got: out.len(),
            expected: expected_size,
        });
    }
    Ok(out)
}

/// Decode one encoded block (mode tag + payload) of known decoded length.
pub fn decode_block(enc: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let (&mode, payload) = enc.split_first().ok_or(Error::EmptyBlock)?;

    match mode {
        MODE_RAW => {
            if payload.len() != expected_size {
                return Err(Error::RawSizeMismatch {
                    got: payload.len(),
                    expected: expected_size,
                });
            }
            Ok(payload.to_vec())
        }
        MODE_LZ => decode_tokens(payload, expected_size),
        _ => Err(Error::UnknownMode(mode)),
    }
}
