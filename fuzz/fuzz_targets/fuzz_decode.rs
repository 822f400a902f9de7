#![no_main]

use libfuzzer_sys::fuzz_target;
use pcz::{decode_block, decode_tokens, read_header};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through every decoding surface - should never panic,
    // only succeed or return an error.
    let _ = read_header(&mut &data[..]);
    let _ = decode_block(data, 4096);
    let _ = decode_tokens(data, 4096);

    // An expected size taken from the input itself
    if let Some((&first, rest)) = data.split_first() {
        let _ = decode_block(rest, first as usize * 64);
    }
});
