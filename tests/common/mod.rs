#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

use zsink::{Compressed, Engine, SessionParams, Status, Stream};

///Copies input to output as is.
pub struct Passthrough {
    params: SessionParams,
}

impl Passthrough {
    pub fn new() -> Self {
        Self {
            params: SessionParams::new(),
        }
    }
}

impl Engine for Passthrough {
    fn params(&self) -> &SessionParams {
        &self.params
    }

    fn compress_bound(&self, len: usize) -> usize {
        len
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Compressed {
        let len = input.len().min(output.len());
        output[..len].copy_from_slice(&input[..len]);
        Compressed {
            consumed: len,
            produced: len,
            status: Status::Ok,
        }
    }

    fn compress_stream(&mut self, stream: &mut Stream, input: &[u8], output: &mut [u8], _last: bool) -> Status {
        let len = input.len().min(output.len());
        output[..len].copy_from_slice(&input[..len]);
        stream.consumed = len;
        stream.produced = len;
        stream.pending_in = 0;
        stream.pending_out = 0;
        Status::Ok
    }
}

#[derive(Default)]
///Shared record of what engine was asked to do.
pub struct Calls {
    pub compress: Cell<usize>,
    pub finalize: Cell<usize>,
    pub end_stream: Cell<usize>,
    pub teardown: Cell<usize>,
    pub close: Cell<usize>,
    ///Bytes still held by engine when stream was ended.
    pub held_at_end: Cell<usize>,
}

///Scriptable engine
///
///Holds all stream input until `last` is requested, then hands it out in pieces of at most
///`emit` bytes per call.
///One-shot calls consume at most `take` bytes, answering with statuses from `statuses` in order.
pub struct Scripted {
    params: SessionParams,
    held: Vec<u8>,
    emit: usize,
    take: usize,
    statuses: Vec<Status>,
    fail_finalize: bool,
    pub calls: Rc<Calls>,
}

impl Scripted {
    pub fn new() -> Self {
        Self {
            params: SessionParams::new(),
            held: Vec::new(),
            emit: usize::MAX,
            take: usize::MAX,
            statuses: Vec::new(),
            fail_finalize: false,
            calls: Rc::new(Calls::default()),
        }
    }

    pub fn emit(mut self, emit: usize) -> Self {
        self.emit = emit;
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = take;
        self
    }

    pub fn statuses(mut self, statuses: &[Status]) -> Self {
        self.statuses = statuses.iter().rev().copied().collect();
        self
    }

    pub fn fail_finalize(mut self) -> Self {
        self.fail_finalize = true;
        self
    }

    pub fn with_params(mut self, params: SessionParams) -> Self {
        self.params = params;
        self
    }
}

impl Engine for Scripted {
    fn params(&self) -> &SessionParams {
        &self.params
    }

    fn compress_bound(&self, len: usize) -> usize {
        len
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Compressed {
        self.calls.compress.set(self.calls.compress.get() + 1);
        let status = self.statuses.pop().unwrap_or(Status::Ok);
        if status == Status::Fail {
            return Compressed {
                consumed: 0,
                produced: 0,
                status,
            };
        }

        let len = input.len().min(output.len()).min(self.take);
        output[..len].copy_from_slice(&input[..len]);
        Compressed {
            consumed: len,
            produced: len,
            status,
        }
    }

    fn compress_stream(&mut self, stream: &mut Stream, input: &[u8], output: &mut [u8], last: bool) -> Status {
        self.held.extend_from_slice(input);
        stream.consumed = input.len();
        stream.produced = 0;

        if last {
            self.calls.finalize.set(self.calls.finalize.get() + 1);
            if self.fail_finalize {
                return Status::Fail;
            }

            let len = self.held.len().min(output.len()).min(self.emit);
            output[..len].copy_from_slice(&self.held[..len]);
            self.held.drain(..len);
            stream.produced = len;
        }

        stream.pending_in = self.held.len();
        stream.pending_out = 0;
        Status::Ok
    }

    fn end_stream(&mut self, stream: &mut Stream) -> Status {
        self.calls.end_stream.set(self.calls.end_stream.get() + 1);
        self.calls.held_at_end.set(self.held.len());
        self.held.clear();
        *stream = Stream::new();
        Status::Ok
    }

    fn teardown(&mut self) -> Status {
        self.calls.teardown.set(self.calls.teardown.get() + 1);
        Status::Ok
    }

    fn close(&mut self) -> Status {
        self.calls.close.set(self.calls.close.get() + 1);
        Status::Ok
    }
}

///Reports success without doing anything.
pub struct Idle {
    params: SessionParams,
}

impl Idle {
    pub fn new() -> Self {
        Self {
            params: SessionParams::new(),
        }
    }
}

impl Engine for Idle {
    fn params(&self) -> &SessionParams {
        &self.params
    }

    fn compress_bound(&self, len: usize) -> usize {
        len
    }

    fn compress(&mut self, _: &[u8], _: &mut [u8]) -> Compressed {
        Compressed {
            consumed: 0,
            produced: 0,
            status: Status::Ok,
        }
    }

    fn compress_stream(&mut self, stream: &mut Stream, _: &[u8], _: &mut [u8], _: bool) -> Status {
        stream.consumed = 0;
        stream.produced = 0;
        stream.pending_in = 1;
        Status::Ok
    }
}

#[derive(Clone, Default)]
///Sink recording every write, shared with test.
pub struct Recording {
    pub writes: Rc<RefCell<Vec<Vec<u8>>>>,
    pub flushes: Rc<Cell<usize>>,
    pub dropped: Rc<Cell<bool>>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.writes.borrow().iter().map(Vec::len).collect()
    }

    pub fn data(&self) -> Vec<u8> {
        self.writes.borrow().concat()
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped.get()
    }
}

impl Write for Recording {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.borrow_mut().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes.set(self.flushes.get() + 1);
        Ok(())
    }
}

impl Drop for Recording {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

///Sink accepting at most `limit` bytes in total, after which it accepts nothing.
pub struct Short {
    pub data: Vec<u8>,
    pub limit: usize,
}

impl Short {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }
}

impl Write for Short {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(self.limit - self.data.len());
        self.data.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn sample(len: usize) -> Vec<u8> {
    let text = b"Alice was beginning to get very tired of sitting by her sister on the bank, and of having nothing to do. ";
    text.iter().copied().cycle().take(len).collect()
}
