//! SQL Parser implementation.

use super::error::ParseError;
use super::pratt::{infix_binding_power, token_to_binary_op, token_to_unary_op, BETWEEN_OPERAND_BP};
use crate::ast::{
    BinaryOp, Cte, CurrentValue, DataType, Expr, FunctionCall, JoinClause, JoinType, Literal,
    NullOrdering, OrderBy, OrderDirection, Query, SelectColumn, SelectStatement, SetExpr,
    SetOperator, Statement, TableRef, UnaryOp, WindowSpec,
};
use crate::ident::Ident;
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// Deepest nesting of expressions and subqueries accepted before giving up.
const MAX_DEPTH: usize = 64;

/// SQL Parser.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            depth: 0,
        }
    }

    /// Parses exactly one SQL statement. Trailing semicolons are allowed.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is empty, is not a valid
    /// statement, or holds more than one statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = self.parse_one()?;
        while self.eat(&TokenKind::Semicolon) {}
        if !self.current.is_eof() {
            return Err(self.unexpected("end of input"));
        }
        Ok(statement)
    }

    /// Parses a `;`-separated script and returns every statement in it.
    /// Empty statements are skipped.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` for the first statement that fails to parse.
    pub fn parse_script(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![];
        loop {
            while self.eat(&TokenKind::Semicolon) {}
            if self.current.is_eof() {
                break;
            }
            statements.push(self.parse_one()?);
            if !self.check(&TokenKind::Semicolon) && !self.current.is_eof() {
                return Err(self.unexpected("';' or end of input"));
            }
        }
        Ok(statements)
    }

    fn parse_one(&mut self) -> Result<Statement, ParseError> {
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Select | Keyword::With) => self.parse_query_statement(),
            TokenKind::Keyword(_) | TokenKind::Identifier(_) => Ok(self.skip_disallowed()),
            _ => Err(self.unexpected("SELECT or WITH")),
        }
    }

    /// Parses `[WITH ...] SELECT ...`, or a disallowed statement hiding
    /// behind a WITH prefix.
    fn parse_query_statement(&mut self) -> Result<Statement, ParseError> {
        let (recursive, with) = self.parse_with_clause()?;
        if !self.check_keyword(Keyword::Select) {
            if matches!(self.current.kind, TokenKind::Eof | TokenKind::Error(_)) {
                return Err(self.unexpected("SELECT"));
            }
            return Ok(self.skip_disallowed());
        }
        let query = self.parse_query_body(with, recursive)?;
        Ok(Statement::Query(Box::new(query)))
    }

    /// Consumes tokens up to the next `;` and records the leading keyword.
    fn skip_disallowed(&mut self) -> Statement {
        let span = self.current.span;
        let keyword = span.slice(self.input).to_uppercase();
        while !self.check(&TokenKind::Semicolon) && !self.current.is_eof() {
            self.advance();
        }
        Statement::Disallowed { keyword, span }
    }

    /// Parses a nested query: a subquery, derived table or CTE body.
    fn parse_query(&mut self) -> Result<Query, ParseError> {
        self.enter()?;
        let query = self
            .parse_with_clause()
            .and_then(|(recursive, with)| self.parse_query_body(with, recursive));
        self.depth -= 1;
        query
    }

    fn parse_with_clause(&mut self) -> Result<(bool, Vec<Cte>), ParseError> {
        if !self.eat_keyword(Keyword::With) {
            return Ok((false, vec![]));
        }
        let recursive = self.eat_keyword(Keyword::Recursive);

        let mut ctes = vec![];
        loop {
            let name = self.expect_identifier()?;
            let columns = if self.eat(&TokenKind::LeftParen) {
                let columns = self.parse_identifier_list()?;
                self.expect(&TokenKind::RightParen)?;
                columns
            } else {
                vec![]
            };
            self.expect_keyword(Keyword::As)?;
            self.expect(&TokenKind::LeftParen)?;
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            ctes.push(Cte {
                name,
                columns,
                query: Box::new(query),
            });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok((recursive, ctes))
    }

    fn parse_query_body(&mut self, with: Vec<Cte>, recursive: bool) -> Result<Query, ParseError> {
        let body = self.parse_set_expr()?;

        let order_by = if self.eat_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        let (limit, offset) = self.parse_limit()?;

        Ok(Query {
            with,
            recursive,
            body,
            order_by,
            limit,
            offset,
        })
    }

    /// Parses a chain of SELECTs joined by compound operators. SQLite gives
    /// all compound operators the same precedence, left to right.
    fn parse_set_expr(&mut self) -> Result<SetExpr, ParseError> {
        let mut left = SetExpr::Select(Box::new(self.parse_select_statement()?));

        loop {
            let op = match self.current.as_keyword() {
                Some(Keyword::Union) => SetOperator::Union,
                Some(Keyword::Intersect) => SetOperator::Intersect,
                Some(Keyword::Except) => SetOperator::Except,
                _ => break,
            };
            self.advance();
            let all = self.eat_keyword(Keyword::All);
            let right = SetExpr::Select(Box::new(self.parse_select_statement()?));
            left = SetExpr::SetOperation {
                op,
                all,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// `LIMIT n`, `LIMIT n OFFSET m` or SQLite's `LIMIT m, n`.
    fn parse_limit(&mut self) -> Result<(Option<Expr>, Option<Expr>), ParseError> {
        if !self.eat_keyword(Keyword::Limit) {
            return Ok((None, None));
        }
        let first = self.parse_expression(0)?;
        if self.eat_keyword(Keyword::Offset) {
            let offset = self.parse_expression(0)?;
            Ok((Some(first), Some(offset)))
        } else if self.eat(&TokenKind::Comma) {
            let count = self.parse_expression(0)?;
            Ok((Some(count), Some(first)))
        } else {
            Ok((Some(first), None))
        }
    }

    /// Parses a SELECT block, without ORDER BY or LIMIT.
    fn parse_select_statement(&mut self) -> Result<SelectStatement, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        // DISTINCT or ALL
        let distinct = if self.eat_keyword(Keyword::Distinct) {
            true
        } else {
            self.eat_keyword(Keyword::All);
            false
        };

        let columns = self.parse_select_columns()?;

        // FROM clause (optional for expressions like SELECT 1+1)
        let from = if self.eat_keyword(Keyword::From) {
            Some(self.parse_table_ref()?)
        } else {
            None
        };

        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        let group_by = if self.eat_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        let having = if self.eat_keyword(Keyword::Having) {
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        Ok(SelectStatement {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
        })
    }

    /// Parses SELECT columns.
    fn parse_select_columns(&mut self) -> Result<Vec<SelectColumn>, ParseError> {
        let mut columns = vec![];

        loop {
            let expr = self.parse_expression(0)?;

            // AS name, bare name, or a string literal used as a name
            let alias = if self.eat_keyword(Keyword::As) {
                Some(self.expect_alias()?)
            } else if matches!(
                &self.current.kind,
                TokenKind::Identifier(_) | TokenKind::String(_)
            ) {
                Some(self.expect_alias()?)
            } else {
                None
            };

            columns.push(SelectColumn { expr, alias });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Ok(columns)
    }

    /// Parses the FROM list: table factors joined by JOIN clauses or commas.
    fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let mut table_ref = self.parse_table_factor()?;

        loop {
            let join_type = if self.eat(&TokenKind::Comma) {
                JoinType::Cross
            } else if self.is_join_keyword() {
                self.parse_join_type()?
            } else {
                break;
            };
            let table = self.parse_table_factor()?;

            let (on, using) = if self.eat_keyword(Keyword::On) {
                (Some(self.parse_expression(0)?), vec![])
            } else if self.eat_keyword(Keyword::Using) {
                self.expect(&TokenKind::LeftParen)?;
                let columns = self.parse_identifier_list()?;
                self.expect(&TokenKind::RightParen)?;
                (None, columns)
            } else {
                (None, vec![])
            };

            table_ref = TableRef::Join {
                left: Box::new(table_ref),
                join: Box::new(JoinClause {
                    join_type,
                    table,
                    on,
                    using,
                }),
            };
        }

        Ok(table_ref)
    }

    /// Parses a single table, derived table or parenthesized join.
    fn parse_table_factor(&mut self) -> Result<TableRef, ParseError> {
        if self.eat(&TokenKind::LeftParen) {
            if self.check_keyword(Keyword::Select) || self.check_keyword(Keyword::With) {
                let query = self.parse_query()?;
                self.expect(&TokenKind::RightParen)?;
                let alias = self.parse_optional_alias()?;
                return Ok(TableRef::Subquery {
                    query: Box::new(query),
                    alias,
                });
            }
            let inner = self.parse_table_ref()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(inner);
        }

        let first = self.expect_identifier()?;
        let (schema, name) = if self.eat(&TokenKind::Dot) {
            (Some(first), self.expect_identifier()?)
        } else {
            (None, first)
        };
        let alias = self.parse_optional_alias()?;

        Ok(TableRef::Table {
            schema,
            name,
            alias,
        })
    }

    /// Checks if current token is a join keyword.
    fn is_join_keyword(&self) -> bool {
        matches!(
            &self.current.kind,
            TokenKind::Keyword(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
            )
        )
    }

    /// Parses a join type.
    fn parse_join_type(&mut self) -> Result<JoinType, ParseError> {
        let join_type = match self.current.as_keyword() {
            Some(Keyword::Join) => return Ok(self.bump(JoinType::Inner)),
            Some(Keyword::Inner) => JoinType::Inner,
            Some(Keyword::Cross) => JoinType::Cross,
            Some(Keyword::Left) => JoinType::Left,
            Some(Keyword::Right) => JoinType::Right,
            Some(Keyword::Full) => JoinType::Full,
            _ => return Err(self.unexpected("JOIN keyword")),
        };
        self.advance();
        if matches!(join_type, JoinType::Left | JoinType::Right | JoinType::Full) {
            self.eat_keyword(Keyword::Outer);
        }
        self.expect_keyword(Keyword::Join)?;
        Ok(join_type)
    }

    /// Parses an optional table alias: `AS name` or a bare identifier.
    fn parse_optional_alias(&mut self) -> Result<Option<Ident>, ParseError> {
        if self.eat_keyword(Keyword::As) {
            Ok(Some(self.expect_identifier()?))
        } else if matches!(&self.current.kind, TokenKind::Identifier(_)) {
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// Parses an ORDER BY list.
    fn parse_order_by_list(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        let mut items = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let direction = if self.eat_keyword(Keyword::Desc) {
                OrderDirection::Desc
            } else {
                self.eat_keyword(Keyword::Asc);
                OrderDirection::Asc
            };

            let nulls = if self.eat_keyword(Keyword::Nulls) {
                if self.eat_keyword(Keyword::First) {
                    Some(NullOrdering::First)
                } else {
                    self.expect_keyword(Keyword::Last)?;
                    Some(NullOrdering::Last)
                }
            } else {
                None
            };

            items.push(OrderBy {
                expr,
                direction,
                nulls,
            });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Parses an expression using Pratt parsing.
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.enter()?;
        let expr = self.parse_expression_inner(min_bp);
        self.depth -= 1;
        expr
    }

    fn parse_expression_inner(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some((l_bp, r_bp)) = infix_binding_power(&self.current.kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            // NOT only continues an expression as NOT IN/BETWEEN/LIKE
            let negated = if self.check_keyword(Keyword::Not) {
                if !matches!(
                    self.peek_kind(),
                    TokenKind::Keyword(Keyword::In | Keyword::Between | Keyword::Like)
                ) {
                    break;
                }
                self.advance();
                true
            } else {
                false
            };

            match &self.current.kind {
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let not = self.eat_keyword(Keyword::Not);
                    if self.eat_keyword(Keyword::Null) {
                        lhs = Expr::IsNull {
                            expr: Box::new(lhs),
                            negated: not,
                        };
                    } else {
                        let rhs = self.parse_expression(r_bp)?;
                        lhs = Expr::Binary {
                            left: Box::new(lhs),
                            op: if not { BinaryOp::IsNot } else { BinaryOp::Is },
                            right: Box::new(rhs),
                        };
                    }
                }
                TokenKind::Keyword(Keyword::In) => {
                    self.advance();
                    lhs = self.parse_in_rhs(lhs, negated)?;
                }
                TokenKind::Keyword(Keyword::Between) => {
                    self.advance();
                    let low = self.parse_expression(BETWEEN_OPERAND_BP)?;
                    self.expect_keyword(Keyword::And)?;
                    let high = self.parse_expression(BETWEEN_OPERAND_BP)?;
                    lhs = Expr::Between {
                        expr: Box::new(lhs),
                        low: Box::new(low),
                        high: Box::new(high),
                        negated,
                    };
                }
                TokenKind::Keyword(Keyword::Like) => {
                    self.advance();
                    let pattern = self.parse_expression(r_bp)?;
                    lhs = Expr::Like {
                        expr: Box::new(lhs),
                        pattern: Box::new(pattern),
                        negated,
                    };
                }
                _ => {
                    let Some(op) = token_to_binary_op(&self.current.kind) else {
                        break;
                    };
                    self.advance();
                    let rhs = self.parse_expression(r_bp)?;
                    lhs = Expr::Binary {
                        left: Box::new(lhs),
                        op,
                        right: Box::new(rhs),
                    };
                }
            }
        }

        Ok(lhs)
    }

    /// Parses the `(...)` after IN: a subquery or a value list.
    fn parse_in_rhs(&mut self, lhs: Expr, negated: bool) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        if self.check_keyword(Keyword::Select) || self.check_keyword(Keyword::With) {
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(Expr::InSubquery {
                expr: Box::new(lhs),
                query: Box::new(query),
                negated,
            });
        }
        let list = if self.check(&TokenKind::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::InList {
            expr: Box::new(lhs),
            list,
            negated,
        })
    }

    /// Parses a prefix expression.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let Some((op, bp)) = token_to_unary_op(&self.current.kind) else {
            return self.parse_primary();
        };
        self.advance();
        let operand = self.parse_expression(bp)?;

        // NOT EXISTS folds into the EXISTS node
        if op == UnaryOp::Not {
            if let Expr::Exists {
                query,
                negated: false,
            } = operand
            {
                return Ok(Expr::Exists {
                    query,
                    negated: true,
                });
            }
        }

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current.clone();

        match &token.kind {
            // Literals
            TokenKind::Integer(n) => Ok(self.bump(Expr::Literal(Literal::Integer(*n)))),
            TokenKind::Float(f) => Ok(self.bump(Expr::Literal(Literal::Float(*f)))),
            TokenKind::String(s) => Ok(self.bump(Expr::Literal(Literal::String(s.clone())))),
            TokenKind::Blob(b) => Ok(self.bump(Expr::Literal(Literal::Blob(b.clone())))),
            TokenKind::Keyword(Keyword::True) => {
                Ok(self.bump(Expr::Literal(Literal::Boolean(true))))
            }
            TokenKind::Keyword(Keyword::False) => {
                Ok(self.bump(Expr::Literal(Literal::Boolean(false))))
            }
            TokenKind::Keyword(Keyword::Null) => Ok(self.bump(Expr::Literal(Literal::Null))),
            TokenKind::Keyword(Keyword::CurrentDate) => {
                Ok(self.bump(Expr::Literal(Literal::Current(CurrentValue::Date))))
            }
            TokenKind::Keyword(Keyword::CurrentTime) => {
                Ok(self.bump(Expr::Literal(Literal::Current(CurrentValue::Time))))
            }
            TokenKind::Keyword(Keyword::CurrentTimestamp) => {
                Ok(self.bump(Expr::Literal(Literal::Current(CurrentValue::Timestamp))))
            }

            // Wildcard
            TokenKind::Star => Ok(self.bump(Expr::Wildcard { table: None })),

            // Parenthesized expression or subquery
            TokenKind::LeftParen => {
                self.advance();
                if self.check_keyword(Keyword::Select) || self.check_keyword(Keyword::With) {
                    let subquery = self.parse_query()?;
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Subquery(Box::new(subquery)))
                } else {
                    let expr = self.parse_expression(0)?;
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Paren(Box::new(expr)))
                }
            }

            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast_expression(),

            TokenKind::Keyword(Keyword::Exists) => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let query = self.parse_query()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Exists {
                    query: Box::new(query),
                    negated: false,
                })
            }

            // Column reference or function call
            _ => {
                let Some(name) = self.identifier_at_current() else {
                    return Err(self.unexpected("expression"));
                };
                self.advance();

                if self.check(&TokenKind::LeftParen) {
                    return self.parse_function_call(name);
                }

                if !self.eat(&TokenKind::Dot) {
                    return Ok(Expr::Column { table: None, name });
                }
                if self.eat(&TokenKind::Star) {
                    return Ok(Expr::Wildcard { table: Some(name) });
                }
                let second = self.expect_identifier()?;

                // schema.table.column keeps only table and column
                if !self.eat(&TokenKind::Dot) {
                    return Ok(Expr::Column {
                        table: Some(name),
                        name: second,
                    });
                }
                if self.eat(&TokenKind::Star) {
                    return Ok(Expr::Wildcard {
                        table: Some(second),
                    });
                }
                let third = self.expect_identifier()?;
                Ok(Expr::Column {
                    table: Some(second),
                    name: third,
                })
            }
        }
    }

    /// Parses a function call, including an optional OVER clause.
    fn parse_function_call(&mut self, name: Ident) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;

        let distinct = self.eat_keyword(Keyword::Distinct);

        let args = if self.check(&TokenKind::RightParen) {
            vec![]
        } else if self.eat(&TokenKind::Star) {
            vec![Expr::Wildcard { table: None }]
        } else {
            self.parse_expression_list()?
        };

        self.expect(&TokenKind::RightParen)?;

        let over = self.parse_window_spec()?;

        Ok(Expr::Function(FunctionCall {
            name,
            args,
            distinct,
            over,
        }))
    }

    /// Parses `OVER (PARTITION BY ... ORDER BY ... [frame])`. The frame
    /// clause holds no column references and is skipped.
    fn parse_window_spec(&mut self) -> Result<Option<WindowSpec>, ParseError> {
        if !self.eat_keyword(Keyword::Over) {
            return Ok(None);
        }
        if matches!(self.current.kind, TokenKind::Identifier(_)) {
            return Err(ParseError::new(
                "named windows are not supported",
                self.current.span,
            ));
        }
        self.expect(&TokenKind::LeftParen)?;

        let partition_by = if self.eat_keyword(Keyword::Partition) {
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        let order_by = if self.eat_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => break,
                TokenKind::RightParen => depth -= 1,
                TokenKind::Eof | TokenKind::Error(_) => return Err(self.unexpected("')'")),
                _ => {}
            }
            self.advance();
        }
        self.expect(&TokenKind::RightParen)?;

        Ok(Some(WindowSpec {
            partition_by,
            order_by,
        }))
    }

    /// Parses a CAST expression.
    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_data_type()?;
        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// Parses a CASE expression.
    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;

        // Simple CASE (CASE expr WHEN ...)
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        let mut when_clauses = vec![];
        while self.eat_keyword(Keyword::When) {
            let when_expr = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then_expr = self.parse_expression(0)?;
            when_clauses.push((when_expr, then_expr));
        }
        if when_clauses.is_empty() {
            return Err(self.unexpected("WHEN"));
        }

        let else_clause = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };

        self.expect_keyword(Keyword::End)?;

        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    /// Parses a type name such as `INTEGER`, `DOUBLE PRECISION` or
    /// `DECIMAL(10, 2)`.
    fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        let mut words = vec![];
        while let TokenKind::Identifier(word) = &self.current.kind {
            words.push(word.clone());
            self.advance();
        }
        if words.is_empty() {
            return Err(self.unexpected("data type"));
        }

        let mut args = vec![];
        if self.eat(&TokenKind::LeftParen) {
            loop {
                let TokenKind::Integer(n) = self.current.kind else {
                    return Err(self.unexpected("integer"));
                };
                let arg = u32::try_from(n)
                    .map_err(|_| ParseError::new("type argument out of range", self.current.span))?;
                args.push(arg);
                self.advance();
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen)?;
        }

        Ok(DataType::from_parts(&words.join(" "), &args))
    }

    /// Parses a comma-separated list of expressions.
    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![];
        loop {
            exprs.push(self.parse_expression(0)?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    /// Parses a comma-separated list of identifiers.
    fn parse_identifier_list(&mut self) -> Result<Vec<Ident>, ParseError> {
        let mut idents = vec![];
        loop {
            idents.push(self.expect_identifier()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(idents)
    }

    // --- Helper methods ---

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Advances past the current token and hands back `value`.
    fn bump<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the kind of the token after the current one.
    fn peek_kind(&self) -> TokenKind {
        self.lexer.clone().next_token().kind
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new("query nested too deeply", self.current.span));
        }
        Ok(())
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Consumes the current token if it matches the given kind.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        let matched = self.check(kind);
        if matched {
            self.advance();
        }
        matched
    }

    /// Consumes the current token if it is the given keyword.
    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        let matched = self.check_keyword(keyword);
        if matched {
            self.advance();
        }
        matched
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(expected, self.current.kind.clone(), self.current.span)
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    /// Expects the current token to be the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    /// Returns the current token as an identifier. Non-reserved keywords
    /// count, spelled as written.
    fn identifier_at_current(&self) -> Option<Ident> {
        match &self.current.kind {
            TokenKind::Identifier(name) => Some(Ident::new(name.clone(), self.current.span)),
            TokenKind::Keyword(kw) if !kw.is_reserved() => Some(Ident::new(
                self.current.span.slice(self.input),
                self.current.span,
            )),
            _ => None,
        }
    }

    /// Expects and returns an identifier.
    fn expect_identifier(&mut self) -> Result<Ident, ParseError> {
        let ident = self
            .identifier_at_current()
            .ok_or_else(|| self.unexpected("identifier"))?;
        self.advance();
        Ok(ident)
    }

    /// Expects a column alias: an identifier or a string literal.
    fn expect_alias(&mut self) -> Result<Ident, ParseError> {
        if let TokenKind::String(value) = &self.current.kind {
            let ident = Ident::new(value.clone(), self.current.span);
            self.advance();
            return Ok(ident);
        }
        self.expect_identifier()
    }
}
