//! SQL statement AST types.

use super::expression::Expr;
use crate::ident::Ident;
use crate::lexer::Span;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

/// Null ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    /// NULLs come first.
    First,
    /// NULLs come last.
    Last,
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction (ASC or DESC).
    pub direction: OrderDirection,
    /// Null ordering (optional).
    pub nulls: Option<NullOrdering>,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
    /// CROSS JOIN, also used for the comma in `FROM a, b`.
    Cross,
}

impl JoinType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// The type of join.
    pub join_type: JoinType,
    /// The table to join.
    pub table: TableRef,
    /// The join condition.
    pub on: Option<Expr>,
    /// USING columns (alternative to ON).
    pub using: Vec<Ident>,
}

/// A table reference in FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A named table, possibly schema-qualified.
    Table {
        /// Schema name.
        schema: Option<Ident>,
        /// Table name.
        name: Ident,
        /// Alias.
        alias: Option<Ident>,
    },
    /// A derived table.
    Subquery {
        /// The subquery.
        query: Box<Query>,
        /// Alias. SQLite does not require one.
        alias: Option<Ident>,
    },
    /// A joined table.
    Join {
        /// Left side of the join.
        left: Box<TableRef>,
        /// The join clause.
        join: Box<JoinClause>,
    },
}

/// A column in SELECT clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// The expression.
    pub expr: Expr,
    /// Column alias.
    pub alias: Option<Ident>,
}

impl SelectColumn {
    /// Returns the name this column is visible under from outside the
    /// query: the alias if any, else the bare column name.
    #[must_use]
    pub fn output_name(&self) -> Option<&Ident> {
        self.alias.as_ref().or_else(|| self.expr.column_name())
    }
}

/// A single `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ...` block.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Whether to select DISTINCT values.
    pub distinct: bool,
    /// The columns to select.
    pub columns: Vec<SelectColumn>,
    /// The FROM clause.
    pub from: Option<TableRef>,
    /// The WHERE clause.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING clause.
    pub having: Option<Expr>,
}

/// Compound operator between two query bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    /// UNION
    Union,
    /// INTERSECT
    Intersect,
    /// EXCEPT
    Except,
}

/// The body of a query: one SELECT or a compound of several.
#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    /// A plain SELECT.
    Select(Box<SelectStatement>),
    /// `left UNION [ALL] right` and friends.
    SetOperation {
        /// The operator.
        op: SetOperator,
        /// Whether ALL was specified.
        all: bool,
        /// Left operand.
        left: Box<SetExpr>,
        /// Right operand.
        right: Box<SetExpr>,
    },
}

impl SetExpr {
    /// Returns the leftmost SELECT, whose select list names the columns of
    /// the whole compound.
    #[must_use]
    pub fn first_select(&self) -> &SelectStatement {
        match self {
            Self::Select(select) => select,
            Self::SetOperation { left, .. } => left.first_select(),
        }
    }
}

/// A common table expression: `name [(columns)] AS (query)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// The CTE name.
    pub name: Ident,
    /// Explicit column names.
    pub columns: Vec<Ident>,
    /// The CTE body.
    pub query: Box<Query>,
}

/// A complete query, with its optional WITH prefix and trailing
/// ORDER BY/LIMIT/OFFSET.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Common table expressions.
    pub with: Vec<Cte>,
    /// Whether WITH RECURSIVE was written.
    pub recursive: bool,
    /// The query body.
    pub body: SetExpr,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// LIMIT clause.
    pub limit: Option<Expr>,
    /// OFFSET clause.
    pub offset: Option<Expr>,
}

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A read-only query.
    Query(Box<Query>),
    /// Anything that is not a query. Only the leading keyword is kept.
    Disallowed {
        /// The first word of the statement, uppercased.
        keyword: String,
        /// Where the statement starts.
        span: Span,
    },
}

impl Statement {
    /// Returns the query if this statement is one.
    #[must_use]
    pub fn as_query(&self) -> Option<&Query> {
        match self {
            Self::Query(query) => Some(query),
            Self::Disallowed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_type() {
        assert_eq!(JoinType::Inner.as_str(), "INNER JOIN");
        assert_eq!(JoinType::Left.as_str(), "LEFT JOIN");
    }

    #[test]
    fn test_output_name_prefers_alias() {
        let column = SelectColumn {
            expr: Expr::Column {
                table: None,
                name: Ident::unspanned("name"),
            },
            alias: Some(Ident::unspanned("customer")),
        };
        assert_eq!(column.output_name().map(|i| i.key.as_str()), Some("customer"));

        let bare = SelectColumn {
            alias: None,
            ..column
        };
        assert_eq!(bare.output_name().map(|i| i.key.as_str()), Some("name"));
    }

    #[test]
    fn test_disallowed_is_not_a_query() {
        let stmt = Statement::Disallowed {
            keyword: String::from("DROP"),
            span: Span::new(0, 4),
        };
        assert!(stmt.as_query().is_none());
    }
}
