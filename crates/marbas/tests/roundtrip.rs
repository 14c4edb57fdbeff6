//! Round-trip properties for the compress/decompress pair.

use std::io::{Read, Write};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use marbas::{BlockSize, Reader, ReaderOptions, Writer, WriterOptions};

fn compress(data: &[u8]) -> Vec<u8> {
    let mut writer = Writer::new(Vec::new());
    writer.write_all(data).unwrap();
    writer.close().unwrap();
    writer.into_inner().unwrap()
}

fn decompress(data: &[u8]) -> Vec<u8> {
    let mut reader = Reader::new(data);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    out
}

#[test]
fn test_round_trip_empty() {
    let compressed = compress(b"");
    assert_eq!(&compressed[..3], b"BZh");
    assert_eq!(decompress(&compressed), b"");
}

#[test]
fn test_round_trip_small() {
    let data = b"Hello, Marbas!";
    assert_eq!(decompress(&compress(data)), data);
}

#[test]
fn test_round_trip_repetitive_large() {
    // spans multiple compression blocks at the smallest block size
    let data = b"abcdef".repeat(100_000);
    let compressed = compress(&data);
    assert!(compressed.len() < data.len());
    assert_eq!(decompress(&compressed), data);
}

#[test]
fn test_round_trip_incompressible() {
    let mut data = vec![0u8; 64 * 1024];
    StdRng::seed_from_u64(42).fill_bytes(&mut data);
    assert_eq!(decompress(&compress(&data)), data);
}

#[test]
fn test_round_trip_small_memory_mode() {
    let data = b"reduced memory decode".repeat(500);
    let compressed = compress(&data);

    let mut reader = Reader::with_options(&compressed[..], ReaderOptions::new().small(true));
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn test_round_trip_across_block_sizes() {
    let data = b"block size sweep ".repeat(2_000);
    for size in [1, 5, 9] {
        let options = WriterOptions::new().block_size(BlockSize::new(size).unwrap());
        let mut writer = Writer::with_options(Vec::new(), options);
        writer.write_all(&data).unwrap();
        let compressed = writer.into_inner().unwrap();
        assert_eq!(decompress(&compressed), data);
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 50,
        ..ProptestConfig::default()
    })]

    /// Property: decompressing a compressed buffer restores it exactly.
    #[test]
    fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(decompress(&compress(&data)), data);
    }

    /// Property: reading in arbitrary chunk sizes equals reading in bulk.
    #[test]
    fn prop_chunked_equals_bulk(
        data in proptest::collection::vec(any::<u8>(), 1..4096),
        chunk in 1usize..2048,
    ) {
        let compressed = compress(&data);

        let mut reader = Reader::new(&compressed[..]);
        let mut collected = Vec::new();
        let mut buf = vec![0u8; chunk];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            collected.extend_from_slice(&buf[..n]);
        }

        prop_assert_eq!(collected, data);
    }
}
