//! Name scopes used while resolving column references.

use std::collections::HashSet;

use crate::ident::Ident;

/// The column names a relation exposes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Columns {
    /// Names known to exist.
    pub names: Vec<Ident>,
    /// False when the relation may expose more columns than `names`, e.g.
    /// an unnamed expression in a derived table or a table that failed to
    /// resolve. Lookups that miss an incomplete set are not errors.
    pub complete: bool,
}

impl Columns {
    pub const fn known(names: Vec<Ident>) -> Self {
        Self {
            names,
            complete: true,
        }
    }

    pub const fn opaque() -> Self {
        Self {
            names: Vec::new(),
            complete: false,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.names.iter().any(|n| n.key == key)
    }

    /// Returns true if a lookup of `key` should be accepted.
    pub fn admits(&self, key: &str) -> bool {
        !self.complete || self.contains(key)
    }

    pub fn extend(&mut self, other: &Self) {
        self.names.extend(other.names.iter().cloned());
        self.complete &= other.complete;
    }

    pub fn display_names(&self) -> Vec<String> {
        self.names.iter().map(|n| n.value.clone()).collect()
    }
}

/// A table, CTE or derived table visible in a FROM clause.
#[derive(Debug, Clone)]
pub struct Relation {
    /// The name column references qualify it with: alias, else table name.
    pub qualifier: Option<Ident>,
    /// Name used in messages.
    pub label: String,
    /// Exposed columns.
    pub columns: Columns,
    /// Whether this is a schema table, which also has a `rowid`.
    pub base_table: bool,
    /// Keys of columns merged into the tables on its left by `USING (...)`.
    pub merged: Vec<String>,
}

impl Relation {
    fn is_merged(&self, key: &str) -> bool {
        self.merged.iter().any(|m| m == key)
    }
}

/// One SELECT's worth of visible names.
#[derive(Debug, Default)]
pub struct Scope {
    pub relations: Vec<Relation>,
    /// Select-list aliases.
    pub aliases: Vec<Ident>,
}

impl Scope {
    pub fn relation(&self, qualifier: &Ident) -> Option<&Relation> {
        self.relations
            .iter()
            .find(|r| r.qualifier.as_ref().is_some_and(|q| q.same_as(qualifier)))
    }

    /// Relations exposing `key`, where a relation merged through
    /// `USING (key)` counts as the same source as its left side.
    pub fn sources_of(&self, key: &str) -> Vec<&Relation> {
        let matching: Vec<&Relation> = self
            .relations
            .iter()
            .filter(|r| r.columns.contains(key))
            .collect();
        let distinct: Vec<&Relation> = matching
            .iter()
            .copied()
            .filter(|r| !r.is_merged(key))
            .collect();
        if distinct.is_empty() {
            matching.into_iter().take(1).collect()
        } else {
            distinct
        }
    }

    pub fn has_incomplete_relation(&self) -> bool {
        self.relations.iter().any(|r| !r.columns.complete)
    }

    /// Column names of every relation, first occurrence wins.
    pub fn available_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.relations
            .iter()
            .flat_map(|r| r.columns.names.iter())
            .filter(|n| seen.insert(n.key.clone()))
            .map(|n| n.value.clone())
            .collect()
    }

    pub fn qualifiers(&self) -> Vec<String> {
        self.relations
            .iter()
            .filter_map(|r| r.qualifier.as_ref().map(|q| q.value.clone()))
            .collect()
    }
}

/// Implicit row identifier columns every SQLite table has.
pub fn is_rowid(key: &str) -> bool {
    matches!(key, "rowid" | "oid" | "_rowid_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(name: &str, columns: &[&str]) -> Relation {
        Relation {
            qualifier: Some(Ident::unspanned(name)),
            label: name.to_string(),
            columns: Columns::known(columns.iter().map(|c| Ident::unspanned(*c)).collect()),
            base_table: true,
            merged: Vec::new(),
        }
    }

    #[test]
    fn test_columns_admits() {
        let known = Columns::known(vec![Ident::unspanned("id")]);
        assert!(known.admits("id"));
        assert!(!known.admits("name"));
        assert!(Columns::opaque().admits("anything"));
    }

    #[test]
    fn test_extend_keeps_incompleteness() {
        let mut columns = Columns::known(vec![Ident::unspanned("id")]);
        columns.extend(&Columns::opaque());
        assert!(!columns.complete);
        assert!(columns.contains("id"));
    }

    #[test]
    fn test_scope_lookup() {
        let scope = Scope {
            relations: vec![relation("u", &["id", "name"]), relation("o", &["id", "total"])],
            ..Scope::default()
        };
        assert!(scope.relation(&Ident::unspanned("U")).is_some());
        assert!(scope.relation(&Ident::unspanned("x")).is_none());
        assert_eq!(scope.available_columns(), vec!["id", "name", "total"]);
        assert_eq!(scope.qualifiers(), vec!["u", "o"]);
    }

    #[test]
    fn test_sources_respect_using() {
        let mut joined = relation("b", &["id", "total"]);
        joined.merged.push(String::from("id"));
        let scope = Scope {
            relations: vec![relation("a", &["id"]), joined, relation("c", &["id"])],
            ..Scope::default()
        };
        let labels = |key: &str| -> Vec<String> {
            scope.sources_of(key).iter().map(|r| r.label.clone()).collect()
        };
        assert_eq!(labels("id"), vec!["a", "c"]);
        assert_eq!(labels("total"), vec!["b"]);
        assert!(labels("missing").is_empty());
    }
}
