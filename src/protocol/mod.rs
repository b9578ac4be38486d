//! Redis Serialization Protocol (RESP2) tokenization.

pub mod reader;
pub mod token;

pub use reader::{Token, TokenReader};
pub use token::{
    scan, split_token, tokenize, LengthSyntax, LexError, TokenKind, MAX_BULK_STRING_LENGTH,
    TERMINATOR,
};
