//! Pratt expression parser for operator precedence.
//!
//! Binding powers follow SQLite's precedence table, lowest first:
//! `OR`, `AND`, `NOT`, equality-like (`=`, `IS`, `IN`, `LIKE`, `BETWEEN`),
//! relational, bitwise, additive, multiplicative, `||`, unary.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Binding power of a prefix `NOT`.
pub const NOT_PREFIX_BP: u8 = 5;

/// Binding power of prefix `-`, `+` and `~`.
pub const UNARY_BP: u8 = 19;

/// Right binding power used for the operands of `BETWEEN`, so the `AND`
/// between its bounds is not read as a logical operator.
pub const BETWEEN_OPERAND_BP: u8 = 8;

/// Returns the infix binding power for a token.
///
/// Returns `(left_bp, right_bp)` where:
/// - Higher binding power = binds tighter
/// - Left associative: left_bp < right_bp
///
/// Returns `None` if the token is not an infix operator. `NOT` is reported
/// here too, for `NOT IN`, `NOT BETWEEN` and `NOT LIKE`; the parser checks
/// the following keyword.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::Keyword(Keyword::Or) => Some((1, 2)),
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),

        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Keyword(
            Keyword::Is | Keyword::In | Keyword::Between | Keyword::Like | Keyword::Not,
        ) => Some((7, 8)),

        TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => Some((9, 10)),

        TokenKind::BitAnd | TokenKind::BitOr | TokenKind::LeftShift | TokenKind::RightShift => {
            Some((11, 12))
        }

        TokenKind::Plus | TokenKind::Minus => Some((13, 14)),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((15, 16)),
        TokenKind::Concat => Some((17, 18)),

        _ => None,
    }
}

/// Converts a token to a binary operator.
#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Concat => Some(BinaryOp::Concat),
        TokenKind::BitAnd => Some(BinaryOp::BitAnd),
        TokenKind::BitOr => Some(BinaryOp::BitOr),
        TokenKind::LeftShift => Some(BinaryOp::LeftShift),
        TokenKind::RightShift => Some(BinaryOp::RightShift),
        _ => None,
    }
}

/// Converts a token to a unary operator and its binding power.
#[must_use]
pub const fn token_to_unary_op(kind: &TokenKind) -> Option<(UnaryOp, u8)> {
    match kind {
        TokenKind::Minus => Some((UnaryOp::Neg, UNARY_BP)),
        TokenKind::Plus => Some((UnaryOp::Plus, UNARY_BP)),
        TokenKind::BitNot => Some((UnaryOp::BitNot, UNARY_BP)),
        TokenKind::Keyword(Keyword::Not) => Some((UnaryOp::Not, NOT_PREFIX_BP)),
        _ => None,
    }
}
