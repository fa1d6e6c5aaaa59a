//! Output sinks the handler writes to

use std::io::{self, IsTerminal, Write};

/// A writable text sink.
pub trait OutputStream: Send {
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Whether the sink is a live terminal
    fn is_tty(&self) -> bool {
        false
    }

    /// OS file descriptor, if the sink has one
    fn fileno(&self) -> Option<i32> {
        None
    }
}

/// Report whether `stream` should get colour at all.
pub fn is_interactive(stream: &dyn OutputStream) -> bool {
    stream.is_tty()
}

#[derive(Debug)]
pub struct StdoutStream(io::Stdout);

impl StdoutStream {
    pub fn new() -> Self {
        Self(io::stdout())
    }
}

impl Default for StdoutStream {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStream for StdoutStream {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.0.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }

    fn is_tty(&self) -> bool {
        self.0.is_terminal()
    }

    fn fileno(&self) -> Option<i32> {
        Some(1)
    }
}

#[derive(Debug)]
pub struct StderrStream(io::Stderr);

impl StderrStream {
    pub fn new() -> Self {
        Self(io::stderr())
    }
}

impl Default for StderrStream {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStream for StderrStream {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.0.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }

    fn is_tty(&self) -> bool {
        self.0.is_terminal()
    }

    fn fileno(&self) -> Option<i32> {
        Some(2)
    }
}

/// Any `io::Write` (a file, a socket, a `Vec<u8>`). Never a terminal.
#[derive(Debug)]
pub struct WriterStream<W>(pub W);

impl<W: Write + Send> OutputStream for WriterStream<W> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.0.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
