pub mod detector;
pub mod styles;

pub use detector::{Level, LevelDetector};
pub use styles::{ColourName, LevelStyles, StyleOverrides, StyleTriple};
