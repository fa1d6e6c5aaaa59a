use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use colourlog::{ansi, console, print};
use colourlog::{ColourError, ColourMode, ColourisingHandler, Config, Level, LevelDetector, StdoutStream};

/// Colour log lines by severity
#[derive(Parser, Debug)]
#[command(name = "colourlog", version, about)]
struct Cli {
    /// Log files to read; stdin when none are given
    files: Vec<PathBuf>,

    /// Config file (default: ~/.config/colourlog/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output strategy for terminals: auto, ansi or native
    #[arg(long)]
    mode: Option<ColourMode>,

    /// Drop lines below this level
    #[arg(long)]
    min_level: Option<Level>,

    /// Don't prefix lines with their detected level
    #[arg(long)]
    no_level: bool,

    /// Print MESSAGE in raw console attribute N (0-255, e.g. 12 = light red) and exit
    #[arg(long, num_args = 2, value_names = ["N", "MESSAGE"], conflicts_with = "files")]
    print_colour: Option<Vec<String>>,

    /// Write an example config file and exit
    #[arg(long, conflicts_with_all = ["files", "print_colour"])]
    init_config: bool,
}

/// Emit every line of `reader`, coloured by its detected level. Bytes that
/// are not UTF-8 are replaced rather than ending the file.
fn colourise_lines(
    mut reader: impl BufRead,
    source: &Path,
    handler: &ColourisingHandler,
    detector: &LevelDetector,
) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to read {:?}: {}", source, e);
                break;
            }
        }

        let decoded = String::from_utf8_lossy(&buf);
        let mut raw: &str = &decoded;
        raw = raw.strip_suffix('\n').unwrap_or(raw);
        raw = raw.strip_suffix('\r').unwrap_or(raw);
        // input may already carry colours of its own
        let line = ansi::strip(raw);
        handler.emit(detector.detect(&line), &line);
    }
}

fn parse_print_colour(args: &[String]) -> (u16, &str) {
    let colour = args[0]
        .parse::<u8>()
        .map(u16::from)
        .unwrap_or_else(|_| {
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("colour '{}' is not in 0..=255", args[0]),
                )
                .exit()
        });
    (colour, args[1].as_str())
}

fn main() -> Result<(), ColourError> {
    // Initialize logging
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if let Some(args) = &cli.print_colour {
        let (colour, message) = parse_print_colour(args);
        print::print_in_colour_stdout(colour, message)?;
        return Ok(());
    }
    if cli.init_config {
        return Config::create_example(cli.config.as_deref());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(min_level) = cli.min_level {
        config.min_level = min_level;
    }
    if cli.no_level {
        config.show_level = false;
    }
    info!("Colour mode: {}", config.mode);

    let handler = ColourisingHandler::with_options(
        Box::new(StdoutStream::new()),
        config.handler_options(),
        console::platform_console(),
    );
    let detector = LevelDetector::new();

    if cli.files.is_empty() {
        colourise_lines(io::stdin().lock(), Path::new("<stdin>"), &handler, &detector);
    } else {
        for path in &cli.files {
            match File::open(path) {
                Ok(file) => colourise_lines(BufReader::new(file), path, &handler, &detector),
                Err(e) => warn!("Failed to open {:?}: {}", path, e),
            }
        }
    }

    handler.flush();
    Ok(())
}
