#![no_main]

use libfuzzer_sys::fuzz_target;
use pcz::{decode_block, decode_tokens, encode_block, encode_tokens};

fuzz_target!(|data: &[u8]| {
    // Skip very large inputs to avoid OOM
    if data.len() > 1_000_000 {
        return;
    }

    let tokens = encode_tokens(data);
    let decoded = decode_tokens(&tokens, data.len()).expect("token stream must decode");
    assert_eq!(data, &decoded[..], "token roundtrip failed");

    let encoded = encode_block(data);
    assert!(encoded.len() <= data.len() + 1, "block inflated");
    let decoded = decode_block(&encoded, data.len()).expect("block must decode");
    assert_eq!(data, &decoded[..], "block roundtrip failed");
});
