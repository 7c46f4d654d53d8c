//! Identifier normalization.
//!
//! Every table, column and alias name is normalized exactly once, when its
//! [`Ident`] is built. Lookups downstream compare the stored `key` and never
//! normalize again.

use std::fmt;

use crate::lexer::Span;

/// Returns the lookup key for a name: surrounding whitespace trimmed, then
/// lowercased.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A name as written in SQL or a schema, paired with its lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// The name as written (quotes removed).
    pub value: String,
    /// Normalized lookup key.
    pub key: String,
    /// Where the name appears in the query text. Empty for schema names.
    pub span: Span,
}

impl Ident {
    /// Creates an identifier found at `span`.
    #[must_use]
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        let value = value.into();
        let key = normalize(&value);
        Self { value, key, span }
    }

    /// Creates an identifier that has no position in any query text.
    #[must_use]
    pub fn unspanned(value: impl Into<String>) -> Self {
        Self::new(value, Span::default())
    }

    /// Returns true if both names refer to the same object.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  UserName "), "username");
        assert_eq!(normalize("id"), "id");
    }

    #[test]
    fn test_ident_keeps_original_text() {
        let ident = Ident::new("Order Total", Span::new(7, 20));
        assert_eq!(ident.value, "Order Total");
        assert_eq!(ident.key, "order total");
        assert_eq!(ident.to_string(), "Order Total");
    }

    #[test]
    fn test_same_as_ignores_case() {
        assert!(Ident::unspanned("USERS").same_as(&Ident::unspanned("users")));
        assert!(!Ident::unspanned("users").same_as(&Ident::unspanned("user")));
    }
}
