use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColourError {
    #[error("failed to write log output: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown colour '{0}'")]
    InvalidColour(String),
}
