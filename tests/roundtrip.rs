#![cfg(feature = "zlib")]

mod common;

use proptest::prelude::*;

use zsink::{Adapter, Format, Kind, Options, SessionParams, StreamSink};

fn compress(kind: Kind, opts: &Options, data: &[u8], cuts: &[usize]) -> Vec<u8> {
    let mut adapter = Adapter::open_on_existing(Vec::new(), kind, opts).expect("to create");

    let mut rest = data;
    for cut in cuts {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(cut % rest.len() + 1);
        assert_eq!(adapter.push(chunk).expect("to push"), chunk.len());
        rest = tail;
    }
    if !rest.is_empty() {
        assert_eq!(adapter.push(rest).expect("to push"), rest.len());
    }

    adapter.close().expect("to close").expect("hooked")
}

fn decompress(format: Format, compressed: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    format.decoder().expect("decoder").decode_all(compressed, &mut output).expect("to decode");
    output
}

fn small_params() -> SessionParams {
    SessionParams::new().hw_buff_sz(1024).strm_buff_sz(3 * 1024)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn should_restore_input_regardless_of_chunking(
        data in prop::collection::vec(any::<u8>(), 0..20_000),
        cuts in prop::collection::vec(0usize..5_000, 0..16),
        capacity in 1usize..4096,
    ) {
        let opts = Options::new().params(small_params()).capacity(capacity);
        for kind in [Kind::OneShot, Kind::Streaming, Kind::Gzip] {
            let compressed = compress(kind, &opts, &data, &cuts);
            prop_assert_eq!(decompress(Format::Gzip, &compressed), data.clone());
        }
    }

    #[test]
    fn should_not_depend_on_chunk_size(
        seed in prop::collection::vec(0u8..4, 1..64),
        repeat in 1usize..400,
        cuts in prop::collection::vec(0usize..2_000, 1..32),
    ) {
        let data = seed.repeat(repeat);
        let opts = Options::new().params(small_params()).capacity(512);

        let whole = compress(Kind::Streaming, &opts, &data, &[]);
        let chunked = compress(Kind::Streaming, &opts, &data, &cuts);
        prop_assert_eq!(decompress(Format::Gzip, &whole), decompress(Format::Gzip, &chunked));
    }
}

#[test]
fn should_roundtrip_every_deflate_format() {
    let data = common::sample(70_000);
    for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
        let opts = Options::new().params(SessionParams::new().format(format).level(6));
        for kind in [Kind::OneShot, Kind::Streaming] {
            let compressed = compress(kind, &opts, &data, &[999, 12_345, 7]);
            assert!(compressed.len() < data.len());
            assert_eq!(decompress(format, &compressed), data, "format={:?} kind={:?}", format, kind);
        }
    }
}

#[test]
fn should_roundtrip_static_huffman() {
    let data = common::sample(5_000);
    let opts = Options::new().params(SessionParams::new().huffman(zsink::Huffman::Static));
    let compressed = compress(Kind::Streaming, &opts, &data, &[]);
    assert_eq!(decompress(Format::Gzip, &compressed), data);
}

#[cfg(feature = "zstd")]
#[test]
fn should_roundtrip_zstd() {
    let data = common::sample(150_000);
    let opts = Options::new().params(SessionParams::new().format(Format::Zstd).level(3)).capacity(777);
    for kind in [Kind::OneShot, Kind::Streaming] {
        let compressed = compress(kind, &opts, &data, &[100, 50_000, 3]);
        assert_eq!(decompress(Format::Zstd, &compressed), data, "kind={:?}", kind);
    }
}
