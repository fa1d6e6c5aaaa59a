//! Output strategies for colourised text on an interactive stream.

use once_cell::sync::OnceCell;
use std::io;
use std::sync::Arc;

use crate::ansi::{self, Segment};
use crate::console::{
    pack_attribute, BackgroundMerge, ConsoleHandle, NativeConsole, StdStream, DEFAULT_ATTRIBUTE,
};
use crate::stream::OutputStream;

pub trait ColourWriter: Send + Sync {
    /// Write a message that may contain SGR escape sequences.
    fn write_colourised(&self, stream: &mut dyn OutputStream, message: &str) -> io::Result<()>;
}

/// Terminals that render ANSI themselves get the message as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiPassthroughWriter;

impl ColourWriter for AnsiPassthroughWriter {
    fn write_colourised(&self, stream: &mut dyn OutputStream, message: &str) -> io::Result<()> {
        stream.write_str(message)
    }
}

/// Strips escape sequences out of the message and replays them as native
/// console attribute changes between the plain text pieces.
pub struct NativeConsoleTranslator {
    console: Arc<dyn NativeConsole>,
    merge: BackgroundMerge,
    stdout: OnceCell<Option<ConsoleHandle>>,
    stderr: OnceCell<Option<ConsoleHandle>>,
}

impl NativeConsoleTranslator {
    pub fn new(console: Arc<dyn NativeConsole>, merge: BackgroundMerge) -> Self {
        Self {
            console,
            merge,
            stdout: OnceCell::new(),
            stderr: OnceCell::new(),
        }
    }

    /// Handle for the stream's descriptor, looked up once per descriptor.
    fn handle_for(&self, stream: &dyn OutputStream) -> Option<ConsoleHandle> {
        let std_stream = stream.fileno().and_then(StdStream::from_fileno)?;
        let cell = match std_stream {
            StdStream::Output => &self.stdout,
            StdStream::Error => &self.stderr,
        };
        *cell.get_or_init(|| self.console.std_handle(std_stream))
    }

    fn write_segments(
        &self,
        stream: &mut dyn OutputStream,
        message: &str,
        handle: Option<ConsoleHandle>,
        coloured: &mut bool,
    ) -> io::Result<()> {
        for segment in ansi::split(message) {
            match segment {
                Segment::Text(text) => stream.write_str(text)?,
                Segment::Params(params) => {
                    let Some(handle) = handle else {
                        continue;
                    };
                    // buffered text must reach the console under the old attribute
                    stream.flush()?;
                    let attribute = pack_attribute(&ansi::parse_params(params), self.merge);
                    self.console.set_text_attribute(handle, attribute);
                    *coloured = attribute != DEFAULT_ATTRIBUTE;
                }
            }
        }
        Ok(())
    }
}

impl ColourWriter for NativeConsoleTranslator {
    fn write_colourised(&self, stream: &mut dyn OutputStream, message: &str) -> io::Result<()> {
        let handle = self.handle_for(stream);
        let mut coloured = false;

        let written = self.write_segments(stream, message, handle, &mut coloured);
        if let (Err(_), Some(handle), true) = (&written, handle, coloured) {
            // never leave the console in a level colour when the reset was not reached
            self.console.set_text_attribute(handle, DEFAULT_ATTRIBUTE);
        }
        written
    }
}
