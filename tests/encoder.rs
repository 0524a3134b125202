#![cfg(feature = "zlib")]

mod common;

use common::sample;
use zsink::encoder::{Interface, ZlibMode, ZlibOptions, ZlibStrategy};
use zsink::{EncodeOp, EncodeStatus, Format};

fn decode(format: Format, compressed: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    format.decoder().expect("decoder").decode_all(compressed, &mut output).expect("to decode");
    output
}

#[test]
fn should_finish_member_within_bound() {
    let data = sample(50_000);
    let cases = [
        (ZlibMode::Gzip, ZlibStrategy::Default, Format::Gzip),
        (ZlibMode::Gzip, ZlibStrategy::Fixed, Format::Gzip),
        (ZlibMode::Zlib, ZlibStrategy::Fixed, Format::Zlib),
        (ZlibMode::Deflate, ZlibStrategy::Default, Format::Deflate),
    ];

    for (idx, (mode, strategy, format)) in cases.into_iter().enumerate() {
        let mut encoder = Interface::zlib(ZlibOptions::new().mode(mode).strategy(strategy)).expect("to create encoder");
        let mut compressed = vec![0; encoder.bound(data.len())];

        let result = encoder.encode(&data, &mut compressed, EncodeOp::Finish);
        assert_eq!(result.status, EncodeStatus::Finished, "case {idx}");
        assert_eq!(result.input_remain, 0, "case {idx}");
        compressed.truncate(compressed.len() - result.output_remain);

        assert_eq!(decode(format, &compressed), data, "case {idx}");
    }
}

#[test]
fn should_finish_after_process() {
    let data = sample(20_000);
    let mut encoder = Interface::zlib(ZlibOptions::new()).expect("to create encoder");
    let mut compressed = vec![0; encoder.bound(data.len())];

    let (head, tail) = data.split_at(7_000);
    let result = encoder.encode(head, &mut compressed, EncodeOp::Process);
    assert_eq!(result.status, EncodeStatus::Continue);
    assert_eq!(result.input_remain, 0);
    let mut written = compressed.len() - result.output_remain;

    let result = encoder.encode(tail, &mut compressed[written..], EncodeOp::Finish);
    assert_eq!(result.status, EncodeStatus::Finished);
    assert_eq!(result.input_remain, 0);
    written = compressed.len() - result.output_remain;
    compressed.truncate(written);

    assert_eq!(decode(Format::Gzip, &compressed), data);
}

#[test]
fn should_start_new_member_after_reset() {
    let mut encoder = Interface::zlib(ZlibOptions::new().strategy(ZlibStrategy::Fixed)).expect("to create encoder");
    let mut compressed = Vec::new();

    for part in [&b"first member, "[..], b"second member"] {
        let mut output = vec![0; encoder.bound(part.len())];
        let result = encoder.encode(part, &mut output, EncodeOp::Finish);
        assert_eq!(result.status, EncodeStatus::Finished);
        output.truncate(output.len() - result.output_remain);
        compressed.extend_from_slice(&output);
        assert!(encoder.reset());
    }

    assert_eq!(decode(Format::Gzip, &compressed), b"first member, second member");
}
