//! Severity-coloured log output for terminals.
//!
//! A [`ColourisingHandler`] wraps an output stream. When the stream is a
//! terminal the first line of each message is wrapped in an ANSI colour for
//! its level; consoles without ANSI support get the same colours through the
//! native text attribute API instead. Redirected output is always plain.

pub mod ansi;
pub mod config;
pub mod console;
pub mod error;
pub mod handler;
pub mod log_parser;
pub mod print;
pub mod stream;
pub mod testing;
pub mod writer;

pub use config::Config;
pub use console::{BackgroundMerge, NativeConsole};
pub use error::ColourError;
pub use handler::{ColourMode, ColourisingHandler, ColourisingLogger, HandlerOptions};
pub use log_parser::{ColourName, Level, LevelDetector, LevelStyles, StyleTriple};
pub use print::print_in_colour;
pub use stream::{OutputStream, StderrStream, StdoutStream};
