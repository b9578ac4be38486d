//! Printable records for tokens pulled off a stream.

use crate::config::OutputFormat;
use crate::protocol::{Token, TokenKind};
use serde::Serialize;

/// What gets printed for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRecord {
    pub offset: u64,
    pub length: usize,
    pub kind: TokenKind,
    /// ASCII-escaped token bytes, cut at the preview limit.
    pub preview: String,
    pub truncated: bool,
}

impl TokenRecord {
    pub fn new(token: &Token, preview_limit: usize) -> Self {
        let shown = token.len().min(preview_limit);
        Self {
            offset: token.offset,
            length: token.len(),
            kind: token.kind,
            preview: token.bytes[..shown].escape_ascii().to_string(),
            truncated: shown < token.len(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => {
                let ellipsis = if self.truncated { "..." } else { "" };
                Ok(format!(
                    "{:>10} {:>8} {:<13} {}{}",
                    self.offset,
                    self.length,
                    kind_label(self.kind),
                    self.preview,
                    ellipsis
                ))
            }
            OutputFormat::Json => serde_json::to_string(self),
        }
    }
}

fn kind_label(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::SimpleString => "simple_string",
        TokenKind::Error => "error",
        TokenKind::Integer => "integer",
        TokenKind::BulkString => "bulk_string",
        TokenKind::Array => "array",
    }
}
