//! Error types
//!
//! Stream content never produces an error: unreadable bases and stray
//! characters are absorbed by the decoder. What remains are IO failures,
//! bad configuration and malformed control commands.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or unreadable conductor configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("group `{group}` must have at least one slot")]
    ZeroCapacity { group: &'static str },

    #[error("group `{group}` must have a cycle length of at least one step")]
    ZeroSize { group: &'static str },

    #[error("group `{group}` must have a step rate of at least one")]
    ZeroStepRate { group: &'static str },

    #[error("length thresholds must increase small < medium < large (got {small}, {medium}, {large})")]
    UnorderedThresholds { small: usize, medium: usize, large: usize },

    #[error("fixed density {0} is outside 0.0..=1.0")]
    DensityOutOfRange(f32),

    #[error("reader chunk size must be positive")]
    ZeroChunkSize,

    #[error("{channels} channels starting at {first_channel} overflow the channel range")]
    ChannelOverflow { first_channel: u32, channels: usize },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the character source behind a [`crate::ChromosomeReader`]
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read failed on {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("source `{0}` is not a file and cannot be re-read from the start")]
    NotSeekable(String),
}

/// Malformed control-script input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid line: {0}")]
    InvalidLine(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Wrong argument count for {command}: expected {expected}, got {got}")]
    ArgumentCount {
        command: String,
        expected: &'static str,
        got: usize,
    },

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unknown transport request: {0}")]
    UnknownTransport(String),
}

/// Umbrella error for the session layer and binaries
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
