//! Error types
//!
//! Defines domain-specific error types for each module of the shell.
//! Path-carrying variants hold the *virtual* path the user typed against,
//! never the real host path.

use std::io;
use thiserror::Error;

/// Sandboxed filesystem operation errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("File or directory already exists: {0}")]
    AlreadyExists(String),

    #[error("No such file or directory: {0}")]
    NotExist(String),

    #[error("No such file: {0}")]
    FileNotExist(String),

    #[error("No such directory: {0}")]
    DirNotExist(String),

    /// The write was rejected before any byte reached the disk.
    #[error("Not enough free space: {requested}B requested, {available}B of {limit}B available")]
    QuotaExceeded {
        requested: u64,
        available: u64,
        limit: u64,
    },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Credential store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Credential store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Credential store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authentication and session routing errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Wrong password for user: {0}")]
    WrongCredential(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("User already has an active session: {0}")]
    SessionActive(String),

    #[error("Too many active sessions (limit {0})")]
    TooManySessions(usize),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Top-level error that encompasses all shell error types
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("File system error: {0}")]
    Fs(#[from] FsError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Whether this is an expected, user-caused failure rather than a host problem.
    pub fn is_expected(&self) -> bool {
        !matches!(self, FsError::Io(_))
    }
}
