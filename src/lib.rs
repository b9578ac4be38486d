pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod protocol;

pub use error::{AppError, ConfigError};
pub use protocol::{scan, split_token, tokenize, LexError, Token, TokenKind, TokenReader};
