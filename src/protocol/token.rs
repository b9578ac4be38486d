//! Stateless RESP2 tokenizer.
//!
//! Finds the boundary of the next complete token at the start of a buffer
//! without copying or allocating. Array headers are tokens of their own; the
//! elements that follow are separate tokens.

use serde::Serialize;
use std::num::ParseIntError;
use std::str::Utf8Error;
use thiserror::Error;

/// Line terminator shared by every token shape.
pub const TERMINATOR: &[u8; 2] = b"\r\n";

/// Largest bulk string length a peer may declare (512 MiB, inclusive).
pub const MAX_BULK_STRING_LENGTH: i32 = 512 << 20;

/// The shape of a token, identified by its leading tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    SimpleString, // +
    Error,        // -
    Integer,      // :
    BulkString,   // $
    Array,        // *
}

impl TokenKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'+' => Some(Self::SimpleString),
            b'-' => Some(Self::Error),
            b':' => Some(Self::Integer),
            b'$' => Some(Self::BulkString),
            b'*' => Some(Self::Array),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::SimpleString => b'+',
            Self::Error => b'-',
            Self::Integer => b':',
            Self::BulkString => b'$',
            Self::Array => b'*',
        }
    }
}

/// Why a buffer can never start with a valid token.
///
/// Every variant is fatal for the stream it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("malformed bulk string length: {0}")]
    MalformedLength(#[source] LengthSyntax),

    #[error("invalid bulk string length {0}")]
    LengthOutOfRange(i32),

    #[error("unterminated bulk string")]
    UnterminatedBulkString,

    #[error("invalid RESP tag '{}'", .0.escape_ascii())]
    InvalidTag(u8),
}

/// Underlying reason a bulk length field failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LengthSyntax {
    #[error(transparent)]
    Utf8(#[from] Utf8Error),

    #[error(transparent)]
    Int(#[from] ParseIntError),
}

impl LexError {
    /// True for both flavours of a bad bulk string length.
    pub fn is_length_error(&self) -> bool {
        matches!(
            self,
            LexError::MalformedLength(_) | LexError::LengthOutOfRange(_)
        )
    }
}

/// Returns the length of the token at the start of `buf`.
///
/// `Ok(0)` means the buffer does not hold a complete token yet and the caller
/// should retry once more bytes have been appended.
pub fn tokenize(buf: &[u8]) -> Result<usize, LexError> {
    Ok(scan(buf)?.map_or(0, |(_, len)| len))
}

/// Like [`tokenize`], but also reports the shape of the complete token.
///
/// `Ok(None)` means incomplete.
pub fn scan(buf: &[u8]) -> Result<Option<(TokenKind, usize)>, LexError> {
    let Some(&tag) = buf.first() else {
        return Ok(None);
    };

    let kind = TokenKind::from_tag(tag).ok_or(LexError::InvalidTag(tag))?;

    let Some(line_end) = find_terminator(buf) else {
        return Ok(None);
    };
    let header_len = line_end + TERMINATOR.len();

    if kind != TokenKind::BulkString {
        return Ok(Some((kind, header_len)));
    }

    let declared = parse_bulk_length(&buf[1..line_end])?;
    if declared == -1 {
        return Ok(Some((kind, header_len)));
    }

    // declared is in [0, MAX] here
    let payload_end = header_len + declared as usize;
    let token_len = payload_end + TERMINATOR.len();
    if buf.len() < token_len {
        return Ok(None);
    }
    if &buf[payload_end..token_len] != TERMINATOR {
        return Err(LexError::UnterminatedBulkString);
    }

    Ok(Some((kind, token_len)))
}

/// Borrowed-view form of [`tokenize`]: splits `buf` into `(token, rest)`.
pub fn split_token(buf: &[u8]) -> Result<Option<(&[u8], &[u8])>, LexError> {
    match tokenize(buf)? {
        0 => Ok(None),
        n => Ok(Some(buf.split_at(n))),
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(TERMINATOR.len()).position(|w| w == TERMINATOR)
}

fn parse_bulk_length(field: &[u8]) -> Result<i32, LexError> {
    let text = std::str::from_utf8(field)
        .map_err(|e| LexError::MalformedLength(e.into()))?;
    let length = text
        .parse::<i32>()
        .map_err(|e| LexError::MalformedLength(e.into()))?;

    if !(-1..=MAX_BULK_STRING_LENGTH).contains(&length) {
        return Err(LexError::LengthOutOfRange(length));
    }
    Ok(length)
}
