// Copyright 2026 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::constants::*;
use crate::{
    block_count, decode_block, decode_tokens, encode_block, encode_tokens, read_header,
    write_header, Error, FileHeader,
};

fn roundtrip(data: &[u8]) -> Result<(), String> {
    let tokens = encode_tokens(data);
    let decoded = decode_tokens(&tokens, data.len()).map_err(|e| format!("tokens: {}", e))?;
    if decoded != data {
        return Err(format!(
            "token roundtrip mismatch: original len={}, decoded len={}",
            data.len(),
            decoded.len()
        ));
    }

    let encoded = encode_block(data);
    if encoded.len() > data.len() + 1 {
        return Err(format!(
            "block inflated: {} bytes from {}",
            encoded.len(),
            data.len()
        ));
    }
    let decoded = decode_block(&encoded, data.len()).map_err(|e| format!("block: {}", e))?;
    if decoded != data {
        return Err("block roundtrip mismatch".to_string());
    }
    Ok(())
}

/// Walk a token stream, checking each token's bounds and returning the
/// total decoded length.
fn validate_tokens(tokens: &[u8]) -> usize {
    let mut out_len = 0;
    let mut s = 0;
    while s < tokens.len() {
        match tokens[s] {
            TOKEN_LITERAL => {
                out_len += 1;
                s += 2;
            }
            TOKEN_MATCH => {
                let offset = tokens[s + 1] as usize | (tokens[s + 2] as usize) << 8;
                let length = tokens[s + 3] as usize;
                assert!(offset >= 1 && offset < WINDOW_SIZE, "offset {} outside window", offset);
                assert!(offset <= out_len, "offset {} beyond output {}", offset, out_len);
                assert!((MIN_MATCH..=MAX_MATCH).contains(&length), "length {}", length);
                out_len += length;
                s += 4;
            }
            flag => panic!("unexpected flag 0x{:02x}", flag),
        }
    }
    assert_eq!(s, tokens.len(), "trailing partial token");
    out_len
}

#[test]
fn test_empty() {
    assert!(encode_tokens(&[]).is_empty());
    assert_eq!(decode_tokens(&[], 0).unwrap(), Vec::<u8>::new());
    roundtrip(&[]).unwrap();
}

#[test]
fn test_single_byte() {
    let tokens = encode_tokens(b"x");
    assert_eq!(tokens, vec![TOKEN_LITERAL, b'x']);
    roundtrip(b"x").unwrap();
}

#[test]
fn test_four_bytes_stored_raw() {
    // "AAAA" yields four literals (8 token bytes), so raw wins.
    let data = b"AAAA";
    let tokens = encode_tokens(data);
    assert_eq!(tokens.len(), 8);

    let encoded = encode_block(data);
    assert_eq!(encoded[0], MODE_RAW);
    assert_eq!(&encoded[1..], data);
    assert_eq!(encoded.len(), 5);
    roundtrip(data).unwrap();
}

#[test]
fn test_zero_run() {
    // One literal opens the run, then each match extends it by 255 from
    // offset 1..255, and the sub-4-byte tail falls back to literals:
    // 1 literal + 4 matches + 3 literals = 24 token bytes for 1 KiB.
    let data = vec![0u8; 1024];
    let tokens = encode_tokens(&data);
    assert_eq!(tokens.len(), 24);

    assert_eq!(tokens[0], TOKEN_LITERAL);
    // first match: offset 1, maximum length
    assert_eq!(tokens[2], TOKEN_MATCH);
    assert_eq!(tokens[3], 1);
    assert_eq!(tokens[4], 0);
    assert_eq!(tokens[5], MAX_MATCH as u8);

    assert_eq!(validate_tokens(&tokens), data.len());

    let encoded = encode_block(&data);
    assert_eq!(encoded[0], MODE_LZ);
    assert_eq!(decode_block(&encoded, data.len()).unwrap(), data);
}

#[test]
fn test_overlapping_copy_repeats_bytes() {
    // offset=1, length=5 repeats the preceding byte five times; only a
    // byte-wise copy produces this.
    let tokens = [TOKEN_LITERAL, b'x', TOKEN_MATCH, 0x01, 0x00, 0x05];
    assert_eq!(decode_tokens(&tokens, 6).unwrap(), b"xxxxxx");
}

#[test]
fn test_repeated_text() {
    let data = b"the quick brown fox jumps over the lazy dog. ".repeat(64);
    let tokens = encode_tokens(&data);
    assert!(tokens.len() < data.len() / 2);
    assert_eq!(validate_tokens(&tokens), data.len());
    roundtrip(&data).unwrap();

    let encoded = encode_block(&data);
    assert_eq!(encoded[0], MODE_LZ);
}

#[test]
fn test_offsets_stay_inside_window() {
    // 128 KiB of periodic data: every emitted offset must respect the
    // 64 KiB window even though equal content exists further back.
    let data: Vec<u8> = (0..128 * 1024).map(|i| (i % 251) as u8).collect();
    let tokens = encode_tokens(&data);
    assert_eq!(validate_tokens(&tokens), data.len());
    assert_eq!(decode_tokens(&tokens, data.len()).unwrap(), data);
}

#[test]
fn test_pattern_sizes() {
    for size in [1, 2, 3, 4, 5, 31, 255, 256, 1000, 4096, 65535, 65536, 70000] {
        let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
        roundtrip(&data).unwrap_or_else(|e| panic!("size {}: {}", size, e));
    }
}

#[test]
fn test_incompressible_stored_raw() {
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    let mut data = vec![0u8; 32 * 1024];
    StdRng::seed_from_u64(0x5eed).fill_bytes(&mut data);

    let encoded = encode_block(&data);
    assert_eq!(encoded[0], MODE_RAW);
    assert_eq!(encoded.len(), data.len() + 1);
    assert_eq!(decode_block(&encoded, data.len()).unwrap(), data);
}

#[test]
fn test_truncated_literal() {
    assert!(matches!(
        decode_tokens(&[TOKEN_LITERAL], 1),
        Err(Error::TruncatedLiteral)
    ));
}

#[test]
fn test_truncated_match() {
    assert!(matches!(
        decode_tokens(&[TOKEN_LITERAL, b'a', TOKEN_MATCH, 0x01], 6),
        Err(Error::TruncatedMatch)
    ));
}

#[test]
fn test_match_offset_at_empty_output() {
    // A match token before any output has nothing to copy from.
    let err = decode_tokens(&[TOKEN_MATCH, 0x00, 0x00, 0x05], 0).unwrap_err();
    assert!(matches!(err, Error::InvalidMatchOffset { .. }));

    let err = decode_tokens(&[TOKEN_MATCH, 0x01, 0x00, 0x05], 5).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidMatchOffset { offset: 1, out_len: 0 }
    ));
}

#[test]
fn test_invalid_token_flag() {
    assert!(matches!(
        decode_tokens(&[0x07, 0x00], 1),
        Err(Error::InvalidTokenFlag(0x07))
    ));
}

#[test]
fn test_size_mismatch() {
    let tokens = encode_tokens(b"hello");
    assert!(matches!(
        decode_tokens(&tokens, 4),
        Err(Error::SizeMismatch { got: 5, expected: 4 })
    ));
}

#[test]
fn test_block_mode_errors() {
    assert!(matches!(decode_block(&[], 0), Err(Error::EmptyBlock)));
    assert!(matches!(
        decode_block(&[0x33, 1, 2, 3], 3),
        Err(Error::UnknownMode(0x33))
    ));
    assert!(matches!(
        decode_block(&[MODE_RAW, 1, 2], 3),
        Err(Error::RawSizeMismatch { got: 2, expected: 3 })
    ));
}

#[test]
fn test_header_roundtrip() {
    let header = FileHeader {
        filename: "data.bin".to_string(),
        original_size: 2 * 1024 * 1024 + 17,
        block_size: 1 << 20,
        num_blocks: 3,
        block_comp_sizes: vec![512, 1 << 20, 33],
    };

    let mut buf = Vec::new();
    write_header(&mut buf, &header).unwrap();
    let read_back = read_header(&mut &buf[..]).unwrap();
    assert_eq!(read_back, header);
}

#[test]
fn test_header_empty_file() {
    let header = FileHeader {
        filename: String::new(),
        original_size: 0,
        block_size: 4096,
        num_blocks: 0,
        block_comp_sizes: Vec::new(),
    };

    let mut buf = Vec::new();
    write_header(&mut buf, &header).unwrap();
    // magic + name_len + original_size + block_size + num_blocks
    assert_eq!(buf.len(), 4 + 2 + 8 + 4 + 8);
    assert_eq!(read_header(&mut &buf[..]).unwrap(), header);
}

#[test]
fn test_header_bad_magic() {
    let header = FileHeader {
        filename: "x".to_string(),
        original_size: 1,
        block_size: 4096,
        num_blocks: 1,
        block_comp_sizes: vec![2],
    };
    let mut buf = Vec::new();
    write_header(&mut buf, &header).unwrap();
    buf[0] = b'Q';
    assert!(matches!(read_header(&mut &buf[..]), Err(Error::BadMagic)));
}

#[test]
fn test_header_short_read() {
    let header = FileHeader {
        filename: "x".to_string(),
        original_size: 1,
        block_size: 4096,
        num_blocks: 1,
        block_comp_sizes: vec![2],
    };
    let mut buf = Vec::new();
    write_header(&mut buf, &header).unwrap();
    for cut in [0, 3, 5, 13, 16, buf.len() - 1] {
        assert!(
            read_header(&mut &buf[..cut]).is_err(),
            "short header of {} bytes must not parse",
            cut
        );
    }
}

#[test]
fn test_header_filename_too_long() {
    let header = FileHeader {
        filename: "n".repeat(70_000),
        original_size: 1,
        block_size: 4096,
        num_blocks: 1,
        block_comp_sizes: vec![2],
    };
    let mut buf = Vec::new();
    assert!(matches!(
        write_header(&mut buf, &header),
        Err(Error::FilenameTooLong)
    ));
}

#[test]
fn test_header_size_table_disagreement() {
    let header = FileHeader {
        filename: "x".to_string(),
        original_size: 100,
        block_size: 4096,
        num_blocks: 2,
        block_comp_sizes: vec![50],
    };
    let mut buf = Vec::new();
    assert!(matches!(
        write_header(&mut buf, &header),
        Err(Error::BlockCountMismatch)
    ));
}

#[test]
fn test_block_count_math() {
    assert_eq!(block_count(0, 4096), 0);
    assert_eq!(block_count(1, 4096), 1);
    assert_eq!(block_count(4096, 4096), 1);
    assert_eq!(block_count(4097, 4096), 2);
    assert_eq!(block_count(5 * 1024 * 1024 / 2, 1 << 20), 3);
}

#[test]
fn test_block_len_geometry() {
    let header = FileHeader {
        filename: String::new(),
        original_size: 5 * 1024 * 1024 / 2,
        block_size: 1 << 20,
        num_blocks: 3,
        block_comp_sizes: vec![1, 1, 1],
    };
    assert_eq!(header.block_len(0), 1 << 20);
    assert_eq!(header.block_len(1), 1 << 20);
    assert_eq!(header.block_len(2), 512 * 1024);
}
