//! Common error types for FluX-Tape

use thiserror::Error;

/// Common result type for FluX-Tape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the FluX-Tape core
///
/// Every variant is reported synchronously to the caller. A call that fails
/// leaves registry and session state exactly as it was.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid caller input (contract violation)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration file
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Requested entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload refused by the upload policy (extension or size)
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    /// Publish attempted before any stem was uploaded
    #[error("Nothing to publish: upload at least one stem first")]
    NothingToPublish,
}
