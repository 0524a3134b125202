#![cfg(feature = "zlib")]

mod common;

use std::fs;
use std::io::Write;

use common::{sample, Recording};
use zsink::{Adapter, Error, Format, Kind, OpenMode, Options, StreamSink};

const KINDS: [Kind; 3] = [Kind::OneShot, Kind::Streaming, Kind::Gzip];

fn decode(compressed: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    Format::Gzip.decoder().expect("decoder").decode_all(compressed, &mut output).expect("to decode");
    output
}

#[test]
fn should_own_sink_opened_by_path() {
    let dir = tempfile::tempdir().expect("to create temp dir");
    let data = sample(100_000);

    for kind in KINDS {
        let path = dir.path().join(format!("{:?}.gz", kind));
        let mut adapter = Adapter::open_by_path(&path, OpenMode::Write, kind, &Options::new()).expect("to open");
        assert_eq!(adapter.kind(), kind);
        assert!(adapter.owns_sink());

        for chunk in data.chunks(4096) {
            assert_eq!(adapter.push(chunk).expect("to push"), chunk.len());
        }
        assert!(adapter.close().expect("to close").is_none());

        let compressed = fs::read(&path).expect("to read");
        assert_eq!(decode(&compressed), data, "kind={:?}", kind);
    }
}

#[test]
fn should_append_to_existing_file() {
    let dir = tempfile::tempdir().expect("to create temp dir");
    let path = dir.path().join("append.gz");

    for (mode, data) in [("w", &b"first"[..]), ("ab", &b" second"[..])] {
        let mode = mode.parse::<OpenMode>().expect("valid mode");
        let mut adapter = Adapter::open_by_path(&path, mode, Kind::Streaming, &Options::new()).expect("to open");
        adapter.push(data).expect("to push");
        adapter.close().expect("to close");
    }

    let compressed = fs::read(&path).expect("to read");
    assert_eq!(decode(&compressed), b"first second");
}

#[test]
fn should_truncate_on_write_mode() {
    let dir = tempfile::tempdir().expect("to create temp dir");
    let path = dir.path().join("truncate.gz");
    fs::write(&path, b"garbage that is not gzip").expect("to write");

    let mut adapter = Adapter::open_by_path(&path, OpenMode::Write, Kind::OneShot, &Options::new()).expect("to open");
    adapter.push(b"fresh").expect("to push");
    adapter.close().expect("to close");

    assert_eq!(decode(&fs::read(&path).expect("to read")), b"fresh");
}

#[test]
fn should_report_path_on_open_failure() {
    let dir = tempfile::tempdir().expect("to create temp dir");
    let path = dir.path().join("missing").join("file.gz");

    match Adapter::open_by_path(&path, OpenMode::Write, Kind::Streaming, &Options::new()) {
        Err(Error::Open { path: error_path, .. }) => assert_eq!(error_path, path),
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => panic!("directory does not exist"),
    }
}

#[test]
fn should_reject_unknown_open_mode() {
    assert!(matches!("r".parse::<OpenMode>(), Err(Error::Params(_))));
    assert_eq!("wb".parse::<OpenMode>().expect("valid"), OpenMode::Write);
    assert_eq!("a".parse::<OpenMode>().expect("valid"), OpenMode::Append);
}

#[test]
fn should_not_close_hooked_sink() {
    for kind in KINDS {
        let sink = Recording::new();
        let mut adapter = Adapter::open_on_existing(sink.clone(), kind, &Options::new()).expect("to create");
        assert!(!adapter.owns_sink());
        adapter.push(b"hooked data").expect("to push");

        let mut returned = adapter.close().expect("to close").expect("sink is handed back");
        assert!(!sink.is_dropped(), "kind={:?}", kind);
        assert!(sink.flushes.get() > 0);

        //Sink stays usable after adapter is gone.
        returned.write_all(b"trailer").expect("to write");
        let data = sink.data();
        assert!(data.ends_with(b"trailer"));
        assert_eq!(decode(&data[..data.len() - b"trailer".len()]), b"hooked data");
    }
}

#[test]
fn should_hook_mutable_reference() {
    let mut output = Vec::<u8>::new();
    {
        let mut adapter = Adapter::open_on_existing(&mut output, Kind::Streaming, &Options::new()).expect("to create");
        write!(adapter, "{}-{}", "borrowed", 42).expect("to write");
        adapter.close().expect("to close");
    }
    assert_eq!(decode(&output), b"borrowed-42");
}

#[test]
fn should_parse_kind() {
    assert_eq!("oneshot".parse::<Kind>().expect("valid"), Kind::OneShot);
    assert_eq!("streaming".parse::<Kind>().expect("valid"), Kind::Streaming);
    assert_eq!("gzip".parse::<Kind>().expect("valid"), Kind::Gzip);
    assert!("brotli".parse::<Kind>().is_err());
}
