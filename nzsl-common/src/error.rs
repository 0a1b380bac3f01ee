//! Common error types for nzsl-fetch

use std::path::PathBuf;

use thiserror::Error;

/// Common result type for nzsl-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library and the binary
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file named explicitly but missing
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),
}
