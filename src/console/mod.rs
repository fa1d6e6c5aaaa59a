//! Native console colour attributes.
//!
//! Consoles without ANSI rendering take a packed 8-bit attribute instead:
//! foreground in bits 0-2, intensity in bit 3, background in bits 4-7.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::WindowsConsole;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const FOREGROUND_INTENSITY: u16 = 0x08;
/// Plain white on black, what an SGR reset maps to
pub const DEFAULT_ATTRIBUTE: u16 = 0x07;
/// Bright white, restored after a legacy coloured print
pub const WHITE_ATTRIBUTE: u16 = 0x0F;

const FOREGROUND_MASK: u16 = 0x07;
const BACKGROUND_MASK: u16 = 0xF0;

/// ANSI colour index to native colour bits. Red and blue trade places.
pub const NATIVE_COLOUR_MAP: [u16; 8] = [
    0x00, // black
    0x04, // red
    0x02, // green
    0x06, // yellow
    0x01, // blue
    0x05, // magenta
    0x03, // cyan
    0x07, // white
];

/// Map an ANSI colour index (0-7) to its native colour bits.
pub fn translate(index: u32) -> u16 {
    NATIVE_COLOUR_MAP[(index & 0x07) as usize]
}

/// How a colour directive combines with one already set in the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMerge {
    /// Clear the colour bits before setting the new value
    #[default]
    Replace,
    /// OR the bits together, so `41;44` gives magenta
    Or,
}

/// Fold one group of SGR parameters into a packed attribute.
pub fn pack_attribute(params: &[u32], merge: BackgroundMerge) -> u16 {
    let mut colour: u16 = 0;
    for &p in params {
        match p {
            40..=47 => {
                if merge == BackgroundMerge::Replace {
                    colour &= !BACKGROUND_MASK;
                }
                colour |= translate(p - 40) << 4;
            }
            30..=37 => {
                if merge == BackgroundMerge::Replace {
                    colour &= !FOREGROUND_MASK;
                }
                colour |= translate(p - 30);
            }
            1 => colour |= FOREGROUND_INTENSITY,
            0 => colour = DEFAULT_ATTRIBUTE,
            _ => {}
        }
    }
    colour
}

/// Standard stream a console handle can be looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    Output,
    Error,
}

impl StdStream {
    /// Only descriptors 1 and 2 have a console handle.
    pub fn from_fileno(fd: i32) -> Option<Self> {
        match fd {
            1 => Some(StdStream::Output),
            2 => Some(StdStream::Error),
            _ => None,
        }
    }
}

/// Opaque native console handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsoleHandle(pub isize);

/// The platform console API used to set text attributes.
pub trait NativeConsole: Send + Sync {
    fn std_handle(&self, stream: StdStream) -> Option<ConsoleHandle>;

    /// Returns false if the console rejected the attribute.
    fn set_text_attribute(&self, handle: ConsoleHandle, attribute: u16) -> bool;
}

/// Console for platforms without an attribute API; every lookup fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoConsole;

impl NativeConsole for NoConsole {
    fn std_handle(&self, _stream: StdStream) -> Option<ConsoleHandle> {
        None
    }

    fn set_text_attribute(&self, _handle: ConsoleHandle, _attribute: u16) -> bool {
        false
    }
}

/// Whether this platform wants the native attribute API over ANSI.
pub fn platform_needs_native() -> bool {
    cfg!(windows)
}

#[cfg(windows)]
pub fn platform_console() -> Arc<dyn NativeConsole> {
    Arc::new(WindowsConsole)
}

#[cfg(not(windows))]
pub fn platform_console() -> Arc<dyn NativeConsole> {
    Arc::new(NoConsole)
}
