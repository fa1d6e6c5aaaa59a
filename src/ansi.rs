//! ANSI SGR sequence building and parsing

use once_cell::sync::Lazy;
use regex::Regex;

use crate::log_parser::StyleTriple;

pub const CSI: &str = "\x1b[";
pub const RESET: &str = "\x1b[0m";

static ANSI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[((?:\d+)(?:;(?:\d+))*)m").expect("ANSI pattern is valid"));

/// A piece of a message once its escape sequences are split out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// The `;`-separated parameter list of one `ESC[...m` sequence
    Params(&'a str),
}

/// SGR parameters for a style: background, then foreground, then bold.
pub fn sgr_params(style: &StyleTriple) -> Vec<u32> {
    let mut params = Vec::with_capacity(3);
    if let Some(bg) = style.background {
        params.push(40 + u32::from(bg.index()));
    }
    if let Some(fg) = style.foreground {
        params.push(30 + u32::from(fg.index()));
    }
    if style.bold {
        params.push(1);
    }
    params
}

/// Wrap `message` in the escape sequence for `style` and a trailing reset.
pub fn colourise(message: &str, style: &StyleTriple) -> String {
    let params = sgr_params(style);
    if params.is_empty() {
        return message.to_string();
    }

    let params = params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(";");
    format!("{}{}m{}{}", CSI, params, message, RESET)
}

/// Colourise only the first line, so tracebacks and other continuation
/// lines stay plain.
pub fn colourise_first_line(message: &str, style: &StyleTriple) -> String {
    match message.split_once('\n') {
        Some((head, rest)) => format!("{}\n{}", colourise(head, style), rest),
        None => colourise(message, style),
    }
}

/// Split a message into text and escape-parameter segments, in order.
/// Empty text between adjacent sequences is dropped.
pub fn split(message: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in ANSI_REGEX.captures_iter(message) {
        let (Some(whole), Some(params)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Text(&message[last..whole.start()]));
        }
        segments.push(Segment::Params(params.as_str()));
        last = whole.end();
    }

    if last < message.len() {
        segments.push(Segment::Text(&message[last..]));
    }
    segments
}

/// Parse a parameter list such as `41;37;1`. Values too large for `u32`
/// are skipped, like any other unrecognised parameter.
pub fn parse_params(params: &str) -> Vec<u32> {
    params.split(';').filter_map(|p| p.parse().ok()).collect()
}

/// Remove every SGR sequence, leaving the plain text.
pub fn strip(message: &str) -> String {
    ANSI_REGEX.replace_all(message, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_parser::{ColourName, LevelStyles, Level};

    #[test]
    fn test_unstyled_message_unchanged() {
        let style = StyleTriple::new(None, None, false);
        assert_eq!(colourise("hello", &style), "hello");
    }

    #[test]
    fn test_colourise_order() {
        let style = StyleTriple::new(Some(ColourName::Red), Some(ColourName::White), true);
        assert_eq!(colourise("boom", &style), "\x1b[41;37;1mboom\x1b[0m");

        let style = StyleTriple::new(None, Some(ColourName::Blue), false);
        assert_eq!(colourise("dbg", &style), "\x1b[34mdbg\x1b[0m");
    }

    #[test]
    fn test_only_first_line_coloured() {
        let style = StyleTriple::new(None, Some(ColourName::Red), false);
        let out = colourise_first_line("line1\nline2", &style);

        assert_eq!(out, "\x1b[31mline1\x1b[0m\nline2");
        assert!(out.ends_with("\nline2"));
    }

    #[test]
    fn test_traceback_lines_left_alone() {
        let style = StyleTriple::new(None, Some(ColourName::Yellow), true);
        let msg = "failed\n  at frame 1\n  at frame 2";
        let out = colourise_first_line(msg, &style);

        assert_eq!(out, "\x1b[33;1mfailed\x1b[0m\n  at frame 1\n  at frame 2");
    }

    #[test]
    fn test_split_alternates() {
        let segments = split("\x1b[31mred\x1b[0m tail");
        assert_eq!(
            segments,
            vec![
                Segment::Params("31"),
                Segment::Text("red"),
                Segment::Params("0"),
                Segment::Text(" tail"),
            ]
        );
    }

    #[test]
    fn test_split_plain_text() {
        assert_eq!(split("no escapes"), vec![Segment::Text("no escapes")]);
        assert!(split("").is_empty());
    }

    #[test]
    fn test_split_ignores_malformed_sequences() {
        // Not SGR: no digits, or a different final byte
        let msg = "\x1b[m x \x1b[2J";
        assert_eq!(split(msg), vec![Segment::Text(msg)]);
    }

    #[test]
    fn test_params_recovered_from_emitted_sequence() {
        for native in [true, false] {
            let styles = LevelStyles::for_console(native);
            for level in [Level::Debug, Level::Info, Level::Warning, Level::Error, Level::Critical] {
                let Some(style) = styles.style_for(level) else {
                    panic!("{} should be styled", level);
                };
                let coloured = colourise("msg", &style);

                let params: Vec<u32> = split(&coloured)
                    .into_iter()
                    .filter_map(|s| match s {
                        Segment::Params(p) => Some(p),
                        Segment::Text(_) => None,
                    })
                    .flat_map(parse_params)
                    .collect();

                let mut expected = sgr_params(&style);
                expected.push(0);
                assert_eq!(params, expected, "{} (native={})", level, native);
            }
        }
    }

    #[test]
    fn test_parse_params_overflow_skipped() {
        assert_eq!(parse_params("1;99999999999;32"), vec![1, 32]);
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip("\x1b[41;37;1mboom\x1b[0m!"), "boom!");
    }
}
