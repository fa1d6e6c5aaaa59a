//! Direct printing with a raw console attribute, outside the logging path.
//!
//! `colour` is the packed attribute itself, e.g. 4 = red, 12 = light red,
//! 14 = yellow, 0x4F = white on red.

use std::io;

use crate::console::{self, NativeConsole, StdStream, WHITE_ATTRIBUTE};
use crate::stream::{OutputStream, StdoutStream};

/// Print one line in `colour`, then put the console back to bright white.
/// Legacy entry point; prefer a `ColourisingHandler`.
pub fn print_in_colour(
    stream: &mut dyn OutputStream,
    native_console: &dyn NativeConsole,
    colour: u16,
    message: &str,
) -> io::Result<()> {
    let handle = native_console.std_handle(StdStream::Output);
    if let Some(handle) = handle {
        native_console.set_text_attribute(handle, colour);
    }

    let written = write_line(stream, message);

    if let Some(handle) = handle {
        native_console.set_text_attribute(handle, WHITE_ATTRIBUTE);
    }
    written
}

fn write_line(stream: &mut dyn OutputStream, message: &str) -> io::Result<()> {
    stream.write_str(message)?;
    stream.write_str("\n")?;
    stream.flush()
}

/// `print_in_colour` on stdout with the platform console.
pub fn print_in_colour_stdout(colour: u16, message: &str) -> io::Result<()> {
    let native_console = console::platform_console();
    print_in_colour(&mut StdoutStream::new(), native_console.as_ref(), colour, message)
}
