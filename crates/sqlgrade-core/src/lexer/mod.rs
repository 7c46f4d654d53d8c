//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer that turns a submitted query into a stream of tokens
//! carrying byte spans, so later stages can point back into the text.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
