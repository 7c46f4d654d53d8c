//! Abstract Syntax Tree (AST) types for the read-only query subset.

mod expression;
mod statement;
mod types;

pub use expression::{BinaryOp, CurrentValue, Expr, FunctionCall, Literal, UnaryOp, WindowSpec};
pub use statement::{
    Cte, JoinClause, JoinType, NullOrdering, OrderBy, OrderDirection, Query, SelectColumn,
    SelectStatement, SetExpr, SetOperator, Statement, TableRef,
};
pub use types::{Affinity, DataType};
