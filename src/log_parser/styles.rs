use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Level;
use crate::error::ColourError;

/// The eight base terminal colours, in ANSI index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourName {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl ColourName {
    pub const ALL: [ColourName; 8] = [
        ColourName::Black,
        ColourName::Red,
        ColourName::Green,
        ColourName::Yellow,
        ColourName::Blue,
        ColourName::Magenta,
        ColourName::Cyan,
        ColourName::White,
    ];

    /// ANSI colour index (0-7)
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl FromStr for ColourName {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ColourName::ALL
            .into_iter()
            .find(|colour| format!("{:?}", colour).to_ascii_lowercase() == wanted)
            .ok_or_else(|| ColourError::InvalidColour(s.to_string()))
    }
}

/// Background, foreground and bold for one severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTriple {
    pub background: Option<ColourName>,
    pub foreground: Option<ColourName>,
    pub bold: bool,
}

impl StyleTriple {
    pub const fn new(background: Option<ColourName>, foreground: Option<ColourName>, bold: bool) -> Self {
        Self {
            background,
            foreground,
            bold,
        }
    }

    const fn fg(foreground: ColourName, bold: bool) -> Self {
        Self::new(None, Some(foreground), bold)
    }
}

/// Style table for the levels that get coloured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStyles {
    pub debug: StyleTriple,
    pub info: StyleTriple,
    pub warning: StyleTriple,
    pub error: StyleTriple,
    pub critical: StyleTriple,
}

/// Consoles driven through the native attribute API render bold as the
/// intensity bit, so most levels are bright there.
const NATIVE_STYLES: LevelStyles = LevelStyles {
    debug: StyleTriple::fg(ColourName::Blue, true),
    info: StyleTriple::fg(ColourName::White, false),
    warning: StyleTriple::fg(ColourName::Yellow, true),
    error: StyleTriple::fg(ColourName::Red, true),
    critical: StyleTriple::new(Some(ColourName::Red), Some(ColourName::White), true),
};

const ANSI_STYLES: LevelStyles = LevelStyles {
    debug: StyleTriple::fg(ColourName::Blue, false),
    info: StyleTriple::fg(ColourName::Black, false),
    warning: StyleTriple::fg(ColourName::Yellow, false),
    error: StyleTriple::fg(ColourName::Red, false),
    critical: StyleTriple::new(Some(ColourName::Red), Some(ColourName::White), true),
};

impl LevelStyles {
    pub fn native() -> Self {
        NATIVE_STYLES
    }

    pub fn ansi() -> Self {
        ANSI_STYLES
    }

    /// Pick the table for the active output strategy
    pub fn for_console(native: bool) -> Self {
        if native {
            Self::native()
        } else {
            Self::ansi()
        }
    }

    /// Get the style for a level; `None` leaves the message unstyled
    pub fn style_for(&self, level: Level) -> Option<StyleTriple> {
        match level {
            Level::Debug => Some(self.debug),
            Level::Info => Some(self.info),
            Level::Warning => Some(self.warning),
            Level::Error => Some(self.error),
            Level::Critical => Some(self.critical),
            Level::Trace | Level::Unknown => None,
        }
    }

    pub fn apply(&mut self, overrides: &StyleOverrides) {
        let slots = [
            (&mut self.debug, overrides.debug),
            (&mut self.info, overrides.info),
            (&mut self.warning, overrides.warning),
            (&mut self.error, overrides.error),
            (&mut self.critical, overrides.critical),
        ];
        for (slot, replacement) in slots {
            if let Some(style) = replacement {
                *slot = style;
            }
        }
    }
}

/// Per-level replacements read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<StyleTriple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<StyleTriple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<StyleTriple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StyleTriple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<StyleTriple>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
