use super::token::{scan, LexError, TokenKind};
use crate::error::{AppError, Result};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{trace, warn};

const DEFAULT_CHUNK_SIZE: usize = 4096;

/// One complete token split out of the read buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Absolute stream offset of the tag byte.
    pub offset: u64,
    pub bytes: Bytes,
}

impl Token {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Buffers bytes from a stream and hands out complete RESP tokens.
///
/// Tokens are split off the buffer without copying. Once the tokenizer rejects
/// the stream the reader stays failed until [`TokenReader::reset`].
pub struct TokenReader {
    buffer: BytesMut,
    offset: u64,
    chunk_size: usize,
    failed: Option<LexError>,
}

impl Default for TokenReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenReader {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            offset: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            failed: None,
        }
    }

    /// Set the most bytes a single read may pull from the source. Zero is
    /// ignored.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        if chunk_size > 0 {
            self.chunk_size = chunk_size;
        }
    }

    /// Add incoming bytes to the read buffer.
    pub fn add_data(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes received but not yet handed out as a token.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Stream offset of the next token.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Drop buffered bytes and any recorded failure to start a new stream.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.offset = 0;
        self.failed = None;
    }

    /// Split the next complete token off the buffer. Returns None if incomplete.
    pub fn next_token(&mut self) -> std::result::Result<Option<Token>, LexError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }

        let (kind, len) = match scan(&self.buffer) {
            Ok(Some(found)) => found,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!(offset = self.offset, error = %err, "rejecting RESP stream");
                self.failed = Some(err.clone());
                return Err(err);
            }
        };

        let token = Token {
            kind,
            offset: self.offset,
            bytes: self.buffer.split_to(len).freeze(),
        };
        self.offset += len as u64;

        trace!(offset = token.offset, len, kind = ?token.kind, "token");
        Ok(Some(token))
    }

    /// Read from `src` until a complete token is buffered.
    ///
    /// Returns `Ok(None)` on a clean end of stream, i.e. EOF on a token
    /// boundary.
    pub async fn read_token<R>(&mut self, src: &mut R) -> Result<Option<Token>>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            if let Some(token) = self.next_token()? {
                return Ok(Some(token));
            }

            self.buffer.reserve(self.chunk_size);
            let n = (&mut *src)
                .take(self.chunk_size as u64)
                .read_buf(&mut self.buffer)
                .await?;
            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(AppError::UnexpectedEof {
                    offset: self.offset,
                    buffered: self.buffer.len(),
                });
            }

            trace!("read {} bytes, {} buffered", n, self.buffer.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(reader: &mut TokenReader) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = reader.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_splits_command_into_tokens() {
        let mut reader = TokenReader::new();
        reader.add_data(b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n");

        let tokens = drain(&mut reader);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::Array);
        assert_eq!(&tokens[0].bytes[..], b"*2\r\n");
        assert_eq!(tokens[1].kind, TokenKind::BulkString);
        assert_eq!(&tokens[1].bytes[..], b"$3\r\nfoo\r\n");
        assert_eq!(tokens[2].offset, 13);
        assert_eq!(reader.buffered(), 0);
        assert_eq!(reader.offset(), 22);
    }

    #[test]
    fn test_incomplete_leaves_buffer_untouched() {
        let mut reader = TokenReader::new();
        reader.add_data(b"$6\r\nfoo");
        assert!(reader.next_token().unwrap().is_none());
        assert_eq!(reader.buffered(), 7);

        reader.add_data(b"bar\r\n");
        let token = reader.next_token().unwrap().unwrap();
        assert_eq!(&token.bytes[..], b"$6\r\nfoobar\r\n");
        assert_eq!(token.len(), 12);
    }

    #[test]
    fn test_byte_at_a_time_matches_bulk_delivery() {
        let input: &[u8] = b"+OK\r\n-ERR no\r\n:42\r\n$-1\r\n$0\r\n\r\n*1\r\n$5\r\nhe\r\no\r\n";

        let mut whole = TokenReader::new();
        whole.add_data(input);
        let expected = drain(&mut whole);
        assert_eq!(expected.len(), 7);

        let mut trickle = TokenReader::new();
        let mut actual = Vec::new();
        for byte in input {
            trickle.add_data(std::slice::from_ref(byte));
            actual.extend(drain(&mut trickle));
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_error_is_sticky_until_reset() {
        let mut reader = TokenReader::new();
        reader.add_data(b"+OK\r\n$-5\r\n");

        assert!(reader.next_token().unwrap().is_some());
        let err = reader.next_token().unwrap_err();
        assert_eq!(err, LexError::LengthOutOfRange(-5));

        reader.add_data(b"+OK\r\n");
        assert_eq!(reader.next_token().unwrap_err(), err);

        reader.reset();
        assert_eq!(reader.offset(), 0);
        reader.add_data(b"+OK\r\n");
        let token = reader.next_token().unwrap().unwrap();
        assert_eq!(token.kind, TokenKind::SimpleString);
    }

    #[test]
    fn test_invalid_tag() {
        let mut reader = TokenReader::new();
        reader.add_data(b"PING\r\n");
        assert_eq!(reader.next_token(), Err(LexError::InvalidTag(b'P')));

        // a bad tag poisons the reader like any other error
        reader.add_data(b"+OK\r\n");
        assert_eq!(reader.next_token(), Err(LexError::InvalidTag(b'P')));
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn test_zero_chunk_size_ignored() {
        let mut reader = TokenReader::new();
        reader.set_chunk_size(0);
        assert_eq!(reader.chunk_size, DEFAULT_CHUNK_SIZE);
        reader.set_chunk_size(16);
        assert_eq!(reader.chunk_size, 16);
    }
}
