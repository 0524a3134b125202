mod common;

use std::io::Write;

use common::{Idle, Passthrough, Recording, Scripted, Short};
use zsink::{Error, OneShot, Options, Ownership, Status, StreamSink};

#[test]
fn should_loop_until_input_is_consumed() {
    let sink = Recording::new();
    let engine = Scripted::new().take(3);
    let calls = engine.calls.clone();
    let mut adapter = OneShot::with_engine(engine, sink.clone(), Ownership::Hooked, &Options::new().capacity(16)).expect("to create");

    assert_eq!(adapter.push(b"0123456789").expect("to push"), 10);
    assert_eq!(calls.compress.get(), 4);
    assert_eq!(sink.sizes(), [3, 3, 3, 1]);
    assert_eq!(sink.data(), b"0123456789");
}

#[test]
fn should_carry_on_after_recoverable_status() {
    let sink = Recording::new();
    let engine = Scripted::new().take(4).statuses(&[Status::BufError, Status::DataError, Status::Ok]);
    let mut adapter = OneShot::with_engine(engine, sink.clone(), Ownership::Hooked, &Options::new()).expect("to create");

    assert_eq!(adapter.push(b"0123456789").expect("to push"), 10);
    assert_eq!(sink.data(), b"0123456789");
}

#[test]
fn should_report_progress_on_engine_failure() {
    let sink = Recording::new();
    let engine = Scripted::new().take(4).statuses(&[Status::Ok, Status::Fail]);
    let mut adapter = OneShot::with_engine(engine, sink.clone(), Ownership::Hooked, &Options::new()).expect("to create");

    match adapter.push(b"0123456789") {
        Err(Error::Engine { status, processed, .. }) => {
            assert_eq!(status, Status::Fail);
            assert_eq!(processed, 4);
        },
        other => panic!("unexpected result: {:?}", other),
    }
    //Produced output is still delivered
    assert_eq!(sink.data(), b"0123");
}

#[test]
fn should_return_partial_count_through_io_write() {
    let sink = Recording::new();
    let engine = Scripted::new().take(4).statuses(&[Status::Ok, Status::Fail, Status::Fail]);
    let mut adapter = OneShot::with_engine(engine, sink.clone(), Ownership::Hooked, &Options::new()).expect("to create");

    assert_eq!(adapter.write(b"0123456789").expect("partial write"), 4);
    adapter.write(b"456789").expect_err("failure is reported on next call");
}

#[test]
fn should_reject_input_over_limit() {
    let sink = Recording::new();
    let engine = Scripted::new();
    let calls = engine.calls.clone();
    let mut adapter = OneShot::with_engine(engine, sink.clone(), Ownership::Hooked, &Options::new().max_input(4)).expect("to create");

    match adapter.push(b"01234") {
        Err(Error::SizeLimitExceeded { size, limit }) => {
            assert_eq!(size, 5);
            assert_eq!(limit, 4);
        },
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(calls.compress.get(), 0);
    assert_eq!(adapter.push(b"0123").expect("to push"), 4);
}

#[test]
fn should_ignore_empty_input() {
    let sink = Recording::new();
    let engine = Scripted::new();
    let calls = engine.calls.clone();
    let mut adapter = OneShot::with_engine(engine, sink.clone(), Ownership::Hooked, &Options::new()).expect("to create");

    assert_eq!(adapter.push(&[]).expect("to push"), 0);
    assert_eq!(calls.compress.get(), 0);
    assert!(sink.sizes().is_empty());
}

#[test]
fn should_detect_stalled_engine() {
    let mut adapter = OneShot::with_engine(Idle::new(), Vec::<u8>::new(), Ownership::Hooked, &Options::new()).expect("to create");
    assert!(matches!(adapter.push(b"data"), Err(Error::Stalled { processed: 0, .. })));
}

#[test]
fn should_fail_on_short_write() {
    let mut adapter = OneShot::with_engine(Passthrough::new(), Short::new(2), Ownership::Hooked, &Options::new()).expect("to create");
    assert!(matches!(adapter.push(b"data"), Err(Error::ShortWrite { expected: 4, written: 2 })));
}

#[test]
fn should_tear_down_engine_on_close() {
    let sink = Recording::new();
    let engine = Scripted::new();
    let calls = engine.calls.clone();
    let mut adapter = OneShot::with_engine(engine, sink.clone(), Ownership::Owned, &Options::new()).expect("to create");
    assert!(adapter.owns_sink());
    adapter.push(b"data").expect("to push");

    assert!(adapter.close().expect("to close").is_none());
    assert_eq!(calls.teardown.get(), 1);
    assert_eq!(calls.close.get(), 1);
    assert!(sink.is_dropped());
    assert!(sink.flushes.get() > 0);
}

#[test]
fn should_record_timings() {
    let engine = Scripted::new().take(2);
    let mut adapter = OneShot::with_engine(engine, Vec::<u8>::new(), Ownership::Hooked, &Options::new().record_timings(true)).expect("to create");
    adapter.push(b"012345").expect("to push");

    let timings = adapter.timings().expect("timings are enabled");
    assert_eq!(timings.len(), 3);
}

#[cfg(feature = "zlib")]
mod session {
    use super::common::sample;
    use zsink::{Format, OneShot, Options, SessionParams, StreamSink};

    #[test]
    fn should_compress_one_member_per_block() {
        let data = sample(10_000);
        let opts = Options::new().params(SessionParams::new().hw_buff_sz(1024));
        let mut adapter = OneShot::hook(Vec::new(), &opts).expect("to create");
        assert_eq!(adapter.push(&data).expect("to push"), data.len());
        let compressed = adapter.close().expect("to close").expect("hooked");

        //Each gzip member starts with magic.
        let members = compressed.windows(3).filter(|window| *window == [0x1f, 0x8b, 0x08]).count();
        assert!(members >= 10);

        let mut output = Vec::new();
        Format::Gzip.decoder().expect("decoder").decode_all(&compressed, &mut output).expect("to decode");
        assert_eq!(output, data);
    }
}
