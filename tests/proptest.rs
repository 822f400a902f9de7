// Copyright 2026 Karpeles Lab Inc.
// Property-based tests using proptest

use pcz::{decode_block, decode_tokens, encode_block, encode_tokens};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_token_roundtrip(data: Vec<u8>) {
        prop_assume!(data.len() <= 100_000);

        let tokens = encode_tokens(&data);
        let decoded = decode_tokens(&tokens, data.len()).expect("decode failed");
        prop_assert_eq!(data, decoded);
    }

    #[test]
    fn prop_block_roundtrip(data: Vec<u8>) {
        prop_assume!(data.len() <= 100_000);

        let encoded = encode_block(&data);
        let decoded = decode_block(&encoded, data.len()).expect("decode failed");
        prop_assert_eq!(data, decoded);
    }

    #[test]
    fn prop_no_block_inflation(data: Vec<u8>) {
        prop_assume!(data.len() <= 100_000);

        let encoded = encode_block(&data);
        prop_assert!(encoded.len() <= data.len() + 1);
    }

    #[test]
    fn prop_repeated_data_compresses(data in prop::collection::vec(any::<u8>(), 100..1000)) {
        let repeated = data.repeat(20);
        let encoded = encode_block(&repeated);
        prop_assert!(encoded.len() < repeated.len() / 2);
    }

    #[test]
    fn prop_decode_never_panics(data: Vec<u8>, expected in 0usize..100_000) {
        prop_assume!(data.len() <= 10_000);

        // Arbitrary bytes must decode to an error or a success, never a panic.
        let _ = decode_block(&data, expected);
        let _ = decode_tokens(&data, expected);
    }

    #[test]
    fn prop_wrong_expected_size_is_rejected(data: Vec<u8>) {
        prop_assume!(!data.is_empty() && data.len() <= 10_000);

        let tokens = encode_tokens(&data);
        prop_assert!(decode_tokens(&tokens, data.len() + 1).is_err());
        prop_assert!(decode_tokens(&tokens, data.len() - 1).is_err());
    }
}

mod file_drivers {
    use std::fs;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    use proptest::prelude::*;
    use tempfile::TempDir;

    fn block_size_guard(n: usize) -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        let guard = LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        pcz::set_block_size(n);
        guard
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Any driver's container restores the original bytes under any
        /// other driver, for any worker count and block size.
        #[test]
        fn prop_file_roundtrip_interchange(
            data in prop::collection::vec(any::<u8>(), 0..60_000),
            block_size in prop::sample::select(vec![4 * 1024usize, 16 * 1024, 64 * 1024]),
            threads in 1usize..8,
        ) {
            let _guard = block_size_guard(block_size);
            let dir = TempDir::new().unwrap();

            let input = dir.path().join("in.bin");
            fs::write(&input, &data).unwrap();

            let seq = dir.path().join("seq.pcz");
            let bsp = dir.path().join("bsp.pcz");
            let ws = dir.path().join("ws.pcz");
            pcz::compress_file(&input, &seq).unwrap();
            pcz::compress_file_bsp(&input, &bsp, threads).unwrap();
            pcz::compress_file_ws(&input, &ws, threads).unwrap();

            // Deterministic encoder: every driver emits the same container.
            let seq_bytes = fs::read(&seq).unwrap();
            prop_assert_eq!(&seq_bytes, &fs::read(&bsp).unwrap());
            prop_assert_eq!(&seq_bytes, &fs::read(&ws).unwrap());

            for (i, packed) in [&seq, &bsp, &ws].into_iter().enumerate() {
                let out_seq = dir.path().join(format!("{}.seq.out", i));
                let out_bsp = dir.path().join(format!("{}.bsp.out", i));
                let out_ws = dir.path().join(format!("{}.ws.out", i));
                pcz::decompress_file(packed, &out_seq).unwrap();
                pcz::decompress_file_bsp(packed, &out_bsp, threads).unwrap();
                pcz::decompress_file_ws(packed, &out_ws, threads).unwrap();

                prop_assert_eq!(&fs::read(&out_seq).unwrap(), &data);
                prop_assert_eq!(&fs::read(&out_bsp).unwrap(), &data);
                prop_assert_eq!(&fs::read(&out_ws).unwrap(), &data);
            }
        }
    }
}
