//! In-memory stream and console doubles for exercising the handler
//! without a real terminal.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

use crate::console::{ConsoleHandle, NativeConsole, StdStream};
use crate::stream::OutputStream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Write(String),
    Flush,
    Attribute(ConsoleHandle, u16),
}

/// Shared, ordered record of everything written and every attribute set.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<ConsoleEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: ConsoleEvent) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<ConsoleEvent> {
        self.0.lock().clone()
    }

    /// All written text, concatenated
    pub fn text(&self) -> String {
        self.0
            .lock()
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::Write(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn attributes(&self) -> Vec<u16> {
        self.0
            .lock()
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::Attribute(_, attribute) => Some(*attribute),
                _ => None,
            })
            .collect()
    }
}

/// An `OutputStream` that records into an `EventLog`. Clones share the log.
#[derive(Debug, Clone)]
pub struct CaptureStream {
    log: EventLog,
    tty: bool,
    fileno: Option<i32>,
    failing_writes: usize,
}

impl CaptureStream {
    pub fn new() -> Self {
        Self::with_log(EventLog::new())
    }

    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            tty: false,
            fileno: None,
            failing_writes: 0,
        }
    }

    pub fn tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn fileno(mut self, fd: i32) -> Self {
        self.fileno = Some(fd);
        self
    }

    /// Make the next `count` writes fail with `BrokenPipe`
    pub fn fail_writes(mut self, count: usize) -> Self {
        self.failing_writes = count;
        self
    }

    pub fn output(&self) -> String {
        self.log.text()
    }
}

impl Default for CaptureStream {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStream for CaptureStream {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "capture stream closed"));
        }
        self.log.push(ConsoleEvent::Write(text.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.push(ConsoleEvent::Flush);
        Ok(())
    }

    fn is_tty(&self) -> bool {
        self.tty
    }

    fn fileno(&self) -> Option<i32> {
        self.fileno
    }
}

/// A `NativeConsole` that hands out fake handles and records attribute calls.
#[derive(Debug, Clone)]
pub struct RecordingConsole {
    log: EventLog,
    available: bool,
}

impl RecordingConsole {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            available: true,
        }
    }

    /// A console whose handle lookups always fail
    pub fn unavailable(log: EventLog) -> Self {
        Self {
            log,
            available: false,
        }
    }

    pub fn handle(stream: StdStream) -> ConsoleHandle {
        match stream {
            StdStream::Output => ConsoleHandle(-11),
            StdStream::Error => ConsoleHandle(-12),
        }
    }
}

impl NativeConsole for RecordingConsole {
    fn std_handle(&self, stream: StdStream) -> Option<ConsoleHandle> {
        self.available.then(|| Self::handle(stream))
    }

    fn set_text_attribute(&self, handle: ConsoleHandle, attribute: u16) -> bool {
        self.log.push(ConsoleEvent::Attribute(handle, attribute));
        true
    }
}
