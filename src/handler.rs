//! The colourising log handler and its `log` facade backend.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use crate::ansi;
use crate::console::{self, BackgroundMerge, NativeConsole};
use crate::error::ColourError;
use crate::log_parser::{Level, LevelStyles, StyleOverrides};
use crate::stream::{self, OutputStream, StderrStream};
use crate::writer::{AnsiPassthroughWriter, ColourWriter, NativeConsoleTranslator};

/// Which output strategy an interactive stream gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourMode {
    /// Native console API on Windows, ANSI everywhere else
    #[default]
    Auto,
    Ansi,
    Native,
}

impl ColourMode {
    pub fn uses_native(self) -> bool {
        match self {
            ColourMode::Auto => console::platform_needs_native(),
            ColourMode::Ansi => false,
            ColourMode::Native => true,
        }
    }
}

impl FromStr for ColourMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColourMode::Auto),
            "ansi" => Ok(ColourMode::Ansi),
            "native" => Ok(ColourMode::Native),
            other => Err(format!("unknown colour mode '{}'", other)),
        }
    }
}

impl fmt::Display for ColourMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColourMode::Auto => "auto",
            ColourMode::Ansi => "ansi",
            ColourMode::Native => "native",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct HandlerOptions {
    pub mode: ColourMode,
    pub background_merge: BackgroundMerge,
    /// Prefix each message with `LEVEL: `
    pub show_level: bool,
    /// Messages below this severity are dropped; `Unknown` is always kept
    pub min_level: Level,
    pub terminator: String,
    pub styles: StyleOverrides,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            mode: ColourMode::Auto,
            background_merge: BackgroundMerge::Replace,
            show_level: true,
            min_level: Level::Debug,
            terminator: "\n".to_string(),
            styles: StyleOverrides::default(),
        }
    }
}

/// Writes log messages to one stream, colouring them by level when the
/// stream is a terminal.
pub struct ColourisingHandler {
    stream: Mutex<Box<dyn OutputStream>>,
    writer: Box<dyn ColourWriter>,
    styles: LevelStyles,
    show_level: bool,
    min_level: Level,
    terminator: String,
}

impl ColourisingHandler {
    pub fn new(stream: Box<dyn OutputStream>) -> Self {
        Self::with_options(stream, HandlerOptions::default(), console::platform_console())
    }

    pub fn with_options(
        stream: Box<dyn OutputStream>,
        options: HandlerOptions,
        native_console: Arc<dyn NativeConsole>,
    ) -> Self {
        let native = options.mode.uses_native();
        let writer: Box<dyn ColourWriter> = if native {
            Box::new(NativeConsoleTranslator::new(native_console, options.background_merge))
        } else {
            Box::new(AnsiPassthroughWriter)
        };

        let mut styles = LevelStyles::for_console(native);
        styles.apply(&options.styles);

        Self {
            stream: Mutex::new(stream),
            writer,
            styles,
            show_level: options.show_level,
            min_level: options.min_level,
            terminator: options.terminator,
        }
    }

    pub fn styles(&self) -> &LevelStyles {
        &self.styles
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level == Level::Unknown || level.severity() >= self.min_level.severity()
    }

    /// Render the message text, colouring its first line for terminals.
    pub fn format(&self, level: Level, message: &str, interactive: bool) -> String {
        let message = if self.show_level && level != Level::Unknown {
            format!("{}: {}", level.name(), message)
        } else {
            message.to_string()
        };

        if !interactive {
            return message;
        }
        match self.styles.style_for(level) {
            Some(style) => ansi::colourise_first_line(&message, &style),
            None => message,
        }
    }

    /// Emit one message. Failures are reported on stderr, never returned.
    pub fn emit(&self, level: Level, message: &str) {
        if !self.is_enabled(level) {
            return;
        }

        let mut stream = self.stream.lock();
        if let Err(err) = self.emit_locked(&mut **stream, level, message) {
            handle_error(&err, message);
        }
    }

    fn emit_locked(
        &self,
        stream: &mut dyn OutputStream,
        level: Level,
        message: &str,
    ) -> Result<(), ColourError> {
        let interactive = stream::is_interactive(stream);
        let message = self.format(level, message, interactive);

        if interactive {
            self.writer.write_colourised(stream, &message)?;
        } else {
            stream.write_str(&message)?;
        }
        stream.write_str(&self.terminator)?;
        stream.flush()?;
        Ok(())
    }

    pub fn flush(&self) {
        if let Err(err) = self.stream.lock().flush() {
            handle_error(&ColourError::Io(err), "<flush>");
        }
    }
}

/// Last-resort one-line report for a message that could not be written.
fn handle_error(err: &ColourError, message: &str) {
    let _ = writeln!(io::stderr(), "logging error: {} (message: {:?})", err, message);
}

/// `log` facade backend around a `ColourisingHandler`.
pub struct ColourisingLogger {
    handler: ColourisingHandler,
    max_level: LevelFilter,
}

impl ColourisingLogger {
    pub fn new(handler: ColourisingHandler, max_level: LevelFilter) -> Self {
        Self { handler, max_level }
    }

    /// Install a stderr logger as the global `log` backend.
    pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
        let handler = ColourisingHandler::new(Box::new(StderrStream::new()));
        Self::new(handler, max_level).install()
    }

    pub fn install(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for ColourisingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.handler
            .emit(Level::from(record.level()), &record.args().to_string());
    }

    fn flush(&self) {
        self.handler.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::StdStream;
    use crate::log_parser::{ColourName, StyleTriple};
    use crate::testing::{CaptureStream, ConsoleEvent, EventLog, RecordingConsole};

    fn handler(stream: CaptureStream, mode: ColourMode, log: &EventLog) -> ColourisingHandler {
        let options = HandlerOptions {
            mode,
            show_level: false,
            ..Default::default()
        };
        ColourisingHandler::with_options(
            Box::new(stream),
            options,
            Arc::new(RecordingConsole::new(log.clone())),
        )
    }

    #[test]
    fn test_non_interactive_is_plain() {
        for mode in [ColourMode::Ansi, ColourMode::Native] {
            let log = EventLog::new();
            let stream = CaptureStream::with_log(log.clone()).fileno(1);
            let handler = handler(stream, mode, &log);

            handler.emit(Level::Critical, "disk on fire\n  detail");

            assert_eq!(log.text(), "disk on fire\n  detail\n");
            assert!(!log.text().contains('\x1b'));
            assert!(log.attributes().is_empty());
        }
    }

    #[test]
    fn test_ansi_terminal_gets_escapes() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone()).tty(true).fileno(1);
        let handler = handler(stream, ColourMode::Ansi, &log);

        handler.emit(Level::Error, "failed\ntraceback");

        assert_eq!(log.text(), "\x1b[31mfailed\x1b[0m\ntraceback\n");
        assert!(log.attributes().is_empty());
    }

    #[test]
    fn test_native_terminal_gets_attributes() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone()).tty(true).fileno(2);
        let handler = handler(stream, ColourMode::Native, &log);

        handler.emit(Level::Critical, "boom");

        // red background, white, intense; then reset
        assert_eq!(log.attributes(), vec![0x4F, 0x07]);
        assert_eq!(log.text(), "boom\n");
        assert_eq!(log.events().last(), Some(&ConsoleEvent::Flush));
    }

    #[test]
    fn test_native_levels_use_native_table() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone()).tty(true).fileno(1);
        let handler = handler(stream, ColourMode::Native, &log);

        handler.emit(Level::Debug, "d");
        handler.emit(Level::Info, "i");
        handler.emit(Level::Warning, "w");

        // blue+bold, white, yellow+bold; each followed by a reset
        assert_eq!(log.attributes(), vec![0x09, 0x07, 0x07, 0x07, 0x0E, 0x07]);
        let handle = RecordingConsole::handle(StdStream::Output);
        assert!(log.events().contains(&ConsoleEvent::Attribute(handle, 0x09)));
    }

    #[test]
    fn test_unmapped_level_is_unstyled() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone()).tty(true);
        let handler = handler(stream, ColourMode::Ansi, &log);

        handler.emit(Level::Unknown, "plain");
        handler.emit(Level::Trace, "dropped");

        assert_eq!(log.text(), "plain\n");
    }

    #[test]
    fn test_min_level_filters() {
        let log = EventLog::new();
        let options = HandlerOptions {
            mode: ColourMode::Ansi,
            min_level: Level::Warning,
            ..Default::default()
        };
        let handler = ColourisingHandler::with_options(
            Box::new(CaptureStream::with_log(log.clone())),
            options,
            Arc::new(RecordingConsole::new(log.clone())),
        );

        handler.emit(Level::Info, "quiet");
        handler.emit(Level::Warning, "loud");
        handler.emit(Level::Unknown, "no level");

        assert_eq!(log.text(), "WARNING: loud\nno level\n");
    }

    #[test]
    fn test_level_prefix_is_coloured_with_message() {
        let options = HandlerOptions {
            mode: ColourMode::Ansi,
            ..Default::default()
        };
        let handler = ColourisingHandler::with_options(
            Box::new(CaptureStream::new()),
            options,
            Arc::new(RecordingConsole::new(EventLog::new())),
        );

        assert_eq!(
            handler.format(Level::Warning, "careful", true),
            "\x1b[33mWARNING: careful\x1b[0m"
        );
        assert_eq!(handler.format(Level::Warning, "careful", false), "WARNING: careful");
    }

    #[test]
    fn test_style_overrides_applied() {
        let mut options = HandlerOptions {
            mode: ColourMode::Ansi,
            show_level: false,
            ..Default::default()
        };
        options.styles.info = Some(StyleTriple::new(None, Some(ColourName::Green), true));
        let handler = ColourisingHandler::with_options(
            Box::new(CaptureStream::new()),
            options,
            Arc::new(RecordingConsole::new(EventLog::new())),
        );

        assert_eq!(handler.format(Level::Info, "ok", true), "\x1b[32;1mok\x1b[0m");
    }

    #[test]
    fn test_custom_terminator() {
        let log = EventLog::new();
        let options = HandlerOptions {
            mode: ColourMode::Ansi,
            show_level: false,
            terminator: "\r\n".to_string(),
            ..Default::default()
        };
        let handler = ColourisingHandler::with_options(
            Box::new(CaptureStream::with_log(log.clone())),
            options,
            Arc::new(RecordingConsole::new(log.clone())),
        );

        handler.emit(Level::Info, "a");

        assert_eq!(log.text(), "a\r\n");
    }

    #[test]
    fn test_concurrent_emits_do_not_interleave() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone()).tty(true).fileno(1);
        let handler = Arc::new(handler(stream, ColourMode::Native, &log));

        let threads: Vec<_> = (0..4)
            .map(|t| {
                let handler = Arc::clone(&handler);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        handler.emit(Level::Error, &format!("thread {} message {}", t, i));
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        // every message is bracketed by its own attribute pair
        let events = log.events();
        let mut colour_on = false;
        for event in &events {
            match event {
                ConsoleEvent::Attribute(_, 0x07) => colour_on = false,
                ConsoleEvent::Attribute(_, _) => {
                    assert!(!colour_on, "attribute set twice without reset");
                    colour_on = true;
                }
                ConsoleEvent::Write(text) if text.starts_with("thread") => assert!(colour_on),
                _ => {}
            }
        }
        assert_eq!(log.text().lines().count(), 100);
    }

    #[test]
    fn test_logger_forwards_records() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone());
        let options = HandlerOptions {
            mode: ColourMode::Ansi,
            ..Default::default()
        };
        let handler = ColourisingHandler::with_options(
            Box::new(stream),
            options,
            Arc::new(RecordingConsole::new(log.clone())),
        );
        let logger = ColourisingLogger::new(handler, LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("low disk: {}%", 5))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(log::Level::Debug)
                .args(format_args!("hidden"))
                .build(),
        );

        assert_eq!(log.text(), "WARNING: low disk: 5%\n");
    }

    #[test]
    fn test_install_as_global_logger() {
        let log = EventLog::new();
        let options = HandlerOptions {
            mode: ColourMode::Ansi,
            ..Default::default()
        };
        let handler = ColourisingHandler::with_options(
            Box::new(CaptureStream::with_log(log.clone())),
            options,
            Arc::new(RecordingConsole::new(log.clone())),
        );

        ColourisingLogger::new(handler, LevelFilter::Warn)
            .install()
            .unwrap();
        log::warn!("via facade");
        log::logger().flush();

        // other tests may log through the same global logger
        assert!(log.text().contains("WARNING: via facade\n"));
    }

    #[test]
    fn test_failed_emit_is_contained() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone())
            .tty(true)
            .fileno(1)
            .fail_writes(1);
        let handler = handler(stream, ColourMode::Native, &log);

        // the write of "boom" fails after the critical colour is set
        handler.emit(Level::Critical, "boom");
        assert_eq!(log.attributes(), vec![0x4F, 0x07]);
        assert_eq!(log.text(), "");

        handler.emit(Level::Info, "after");
        assert_eq!(log.text(), "after\n");
        assert_eq!(log.attributes(), vec![0x4F, 0x07, 0x07, 0x07]);
    }

    #[test]
    fn test_failed_plain_emit_is_contained() {
        let log = EventLog::new();
        let stream = CaptureStream::with_log(log.clone()).fail_writes(2);
        let handler = handler(stream, ColourMode::Ansi, &log);

        handler.emit(Level::Error, "lost");
        handler.emit(Level::Error, "lost too");
        handler.emit(Level::Error, "kept");

        assert_eq!(log.text(), "kept\n");
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Native".parse::<ColourMode>(), Ok(ColourMode::Native));
        assert!("rainbow".parse::<ColourMode>().is_err());
        assert_eq!(ColourMode::Ansi.to_string(), "ansi");
    }
}
