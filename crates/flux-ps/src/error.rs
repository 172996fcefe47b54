use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemuxError {
    #[error("Allocation failed: {requested} bytes")]
    AllocationFailed { requested: usize },

    #[error("Invalid handle: session closed or buffer not allocated")]
    InvalidHandle,

    #[error("Capacity exceeded: requested {requested} bytes, {available} available")]
    CapacityExceeded { requested: usize, available: usize },

    #[error("Malformed PES at offset {offset}: {reason}")]
    MalformedPes { offset: usize, reason: &'static str },

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Refusing to flush an empty buffer")]
    EmptyBuffer,

    #[error("No media frames found while probing")]
    MediaInfoUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for DemuxError {
    fn from(err: config::ConfigError) -> Self {
        DemuxError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
