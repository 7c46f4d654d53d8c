//! Parser error types.

use std::fmt;

use crate::lexer::{Span, TokenKind};

/// A parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an "unexpected token" error.
    ///
    /// A lexer error token reports the lexer's own message instead.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected: String = expected.into();
        let message = match &found {
            TokenKind::Error(message) => message.clone(),
            TokenKind::Eof => format!("unexpected end of input, expected {expected}"),
            other => format!("expected {expected}, found {}", other.describe()),
        };
        Self {
            message,
            span,
            expected: Some(expected),
            found: Some(found),
        }
    }

    /// Returns the byte offset where the error starts.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.span.start
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.span.start)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Keyword;

    #[test]
    fn test_unexpected_message() {
        let err = ParseError::unexpected(
            "identifier",
            TokenKind::Keyword(Keyword::From),
            Span::new(7, 11),
        );
        assert_eq!(err.message, "expected identifier, found keyword FROM");
        assert_eq!(err.to_string(), "expected identifier, found keyword FROM at position 7");
    }

    #[test]
    fn test_lexer_error_passthrough() {
        let err = ParseError::unexpected(
            "expression",
            TokenKind::Error(String::from("unterminated string literal")),
            Span::new(3, 9),
        );
        assert_eq!(err.message, "unterminated string literal");
        assert_eq!(err.position(), 3);
    }
}
