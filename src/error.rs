//! Application-level error types for resp-lex.

use crate::protocol::LexError;
use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("corrupt RESP stream: {0}")]
    Lex(#[from] LexError),

    #[error("render error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stream ended mid-token at offset {offset} ({buffered} bytes buffered)")]
    UnexpectedEof { offset: u64, buffered: usize },
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("file error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
