use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log message.
///
/// `Debug` through `Critical` carry a colour style; `Trace` and `Unknown`
/// are passed through unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Unknown,
}

impl Level {
    /// Get severity score for ordering (higher = more severe)
    pub fn severity(&self) -> u8 {
        match self {
            Level::Trace => 0,
            Level::Debug => 1,
            Level::Info => 2,
            Level::Warning => 3,
            Level::Error => 4,
            Level::Critical => 5,
            Level::Unknown => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Unknown => "UNKNOWN",
        }
    }

    /// Levels a log line can name
    pub const DETECTABLE: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Spellings of the level in log text, longest first
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Level::Warning => &["WARNING", "WARN"],
            Level::Critical => &["CRITICAL", "FATAL"],
            Level::Trace => &["TRACE"],
            Level::Debug => &["DEBUG"],
            Level::Info => &["INFO"],
            Level::Error => &["ERROR"],
            Level::Unknown => &[],
        }
    }

    /// Three-letter forms such as `WRN`
    fn abbreviations(&self) -> &'static [&'static str] {
        match self {
            Level::Trace => &["TRC"],
            Level::Debug => &["DBG"],
            Level::Info => &["INF"],
            Level::Warning => &["WRN"],
            Level::Error => &["ERR"],
            Level::Critical => &["FTL", "CRT"],
            Level::Unknown => &[],
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::DETECTABLE
            .into_iter()
            .find(|level| level.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(s)))
            .ok_or_else(|| format!("unknown level '{}'", s))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Trace,
            log::Level::Debug => Level::Debug,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warning,
            log::Level::Error => Level::Error,
        }
    }
}

pub struct LevelDetector {
    patterns: Vec<LevelPattern>,
}

struct LevelPattern {
    regex: Regex,
    level: Level,
}

fn alternation(names: &[&str], lowercase: bool) -> String {
    let names: Vec<String> = names
        .iter()
        .map(|n| if lowercase { n.to_ascii_lowercase() } else { n.to_string() })
        .collect();
    format!("(?:{})", names.join("|"))
}

// Each format is tried for every level before moving to the next format
static DEFAULT_PATTERNS: Lazy<Vec<(String, Level)>> = Lazy::new(|| {
    let formats: [fn(Level) -> String; 5] = [
        // Bracketed: [LEVEL]
        |l| format!(r"\[{}\]", alternation(l.aliases(), false)),
        // Colon-separated: LEVEL:
        |l| format!(r"(?i)\b{}:", alternation(l.aliases(), false)),
        // Angular brackets: <level>
        |l| format!("<{}>", alternation(l.aliases(), true)),
        // Short forms: INF, WRN, ERR
        |l| format!(r"\b{}\b", alternation(l.abbreviations(), false)),
        // Syslog style: level as word at start
        |l| format!(r"^{}\s", alternation(l.aliases(), true)),
    ];

    formats
        .iter()
        .flat_map(|build| Level::DETECTABLE.map(|level| (build(level), level)))
        .collect()
});

impl LevelDetector {
    pub fn new() -> Self {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .filter_map(|(pattern, level)| {
                Regex::new(pattern).ok().map(|regex| LevelPattern {
                    regex,
                    level: *level,
                })
            })
            .collect();

        Self { patterns }
    }

    /// Detect log level from a line of text
    pub fn detect(&self, line: &str) -> Level {
        for pattern in &self.patterns {
            if pattern.regex.is_match(line) {
                return pattern.level;
            }
        }
        Level::Unknown
    }
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::new()
    }
}
