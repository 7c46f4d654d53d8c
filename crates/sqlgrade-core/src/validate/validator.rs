//! Reference resolution over the query AST.

use std::collections::HashSet;

use super::issue::{ColumnIssue, TableIssue, ValidationIssue};
use super::scope::{is_rowid, Columns, Relation, Scope};
use crate::ast::{Expr, JoinClause, OrderBy, Query, SelectStatement, SetExpr, TableRef};
use crate::ident::Ident;
use crate::schema::Schema;

/// Walks a query and records every reference that does not resolve.
pub struct Validator<'s> {
    schema: &'s Schema,
    issues: Vec<ValidationIssue>,
    reported: HashSet<String>,
    /// Enclosing SELECT scopes, innermost last.
    scopes: Vec<Scope>,
    /// CTE names visible at each query level, innermost last.
    ctes: Vec<Vec<(Ident, Columns)>>,
}

/// Whether select-list aliases can be referenced. SQLite resolves them in
/// WHERE, GROUP BY, HAVING and ORDER BY but not in the select list itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aliases {
    Hidden,
    Visible,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            issues: Vec::new(),
            reported: HashSet::new(),
            scopes: Vec::new(),
            ctes: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<ValidationIssue> {
        self.issues
    }

    fn report(&mut self, issue: ValidationIssue) {
        if self.reported.insert(issue.dedup_key()) {
            self.issues.push(issue);
        }
    }

    fn report_table(&mut self, table: String, reason: String, candidates: Vec<String>) {
        self.report(ValidationIssue::InvalidTable(TableIssue {
            table,
            reason,
            candidates,
        }));
    }

    fn report_column(&mut self, column: String, reason: String, candidates: Vec<String>) {
        self.report(ValidationIssue::InvalidColumn(ColumnIssue {
            column,
            reason,
            candidates,
        }));
    }

    /// Validates a full query and returns the columns it produces.
    pub fn query(&mut self, query: &Query) -> Columns {
        self.ctes.push(Vec::new());
        for cte in &query.with {
            // SQLite treats a CTE that names itself as recursive, with or
            // without the RECURSIVE keyword.
            let declared = if cte.columns.is_empty() {
                Columns::opaque()
            } else {
                Columns::known(cte.columns.clone())
            };
            self.define_cte(&cte.name, declared);
            let produced = self.query(&cte.query);
            if cte.columns.is_empty() {
                self.define_cte(&cte.name, produced);
            }
        }

        let columns = match &query.body {
            SetExpr::Select(select) => self.select(select, &query.order_by),
            compound @ SetExpr::SetOperation { .. } => {
                let columns = self.set_expr(compound);
                self.compound_order_by(&query.order_by, &columns);
                columns
            }
        };

        for expr in query.limit.iter().chain(query.offset.iter()) {
            self.expr(expr, Aliases::Hidden);
        }

        self.ctes.pop();
        columns
    }

    fn define_cte(&mut self, name: &Ident, columns: Columns) {
        let Some(frame) = self.ctes.last_mut() else {
            return;
        };
        if let Some(entry) = frame.iter_mut().find(|(n, _)| n.same_as(name)) {
            entry.1 = columns;
        } else {
            frame.push((name.clone(), columns));
        }
    }

    fn lookup_cte(&self, name: &Ident) -> Option<Columns> {
        self.ctes
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .find(|(n, _)| n.same_as(name))
            .map(|(_, columns)| columns.clone())
    }

    fn set_expr(&mut self, body: &SetExpr) -> Columns {
        match body {
            SetExpr::Select(select) => self.select(select, &[]),
            SetExpr::SetOperation { left, right, .. } => {
                let columns = self.set_expr(left);
                self.set_expr(right);
                columns
            }
        }
    }

    /// ORDER BY on a compound query may only name result columns.
    fn compound_order_by(&mut self, order_by: &[OrderBy], columns: &Columns) {
        for item in order_by {
            if let Expr::Column { table: None, name } = &item.expr {
                if !columns.admits(&name.key) {
                    self.report_column(
                        name.value.clone(),
                        String::from("not found in result columns"),
                        columns.display_names(),
                    );
                }
            }
        }
    }

    fn select(&mut self, select: &SelectStatement, order_by: &[OrderBy]) -> Columns {
        let mut scope = Scope::default();
        let mut joins = Vec::new();
        if let Some(from) = &select.from {
            self.table_ref(from, &mut scope, &mut joins);
        }
        scope.aliases = select
            .columns
            .iter()
            .filter_map(|c| c.alias.clone())
            .collect();
        self.scopes.push(scope);

        for join in joins {
            if let Some(on) = &join.on {
                self.expr(on, Aliases::Hidden);
            }
            for column in &join.using {
                self.using_column(column);
            }
        }

        for column in &select.columns {
            self.expr(&column.expr, Aliases::Hidden);
        }
        if let Some(where_clause) = &select.where_clause {
            self.expr(where_clause, Aliases::Visible);
        }
        for expr in &select.group_by {
            self.expr(expr, Aliases::Visible);
        }
        if let Some(having) = &select.having {
            self.expr(having, Aliases::Visible);
        }
        for item in order_by {
            self.expr(&item.expr, Aliases::Visible);
        }

        let columns = self.output_columns(select);
        self.scopes.pop();
        columns
    }

    /// Columns a SELECT produces, as seen by an enclosing query.
    fn output_columns(&self, select: &SelectStatement) -> Columns {
        let Some(scope) = self.scopes.last() else {
            return Columns::opaque();
        };
        let mut columns = Columns::known(Vec::new());
        for item in &select.columns {
            match &item.expr {
                Expr::Wildcard { table: None } => {
                    for relation in &scope.relations {
                        columns.extend(&relation.columns);
                    }
                }
                Expr::Wildcard { table: Some(q) } => match scope.relation(q) {
                    Some(relation) => columns.extend(&relation.columns),
                    None => columns.complete = false,
                },
                _ => match item.output_name() {
                    Some(name) => columns.names.push(name.clone()),
                    None => columns.complete = false,
                },
            }
        }
        columns
    }

    /// Collects the relations of a FROM clause into `scope`.
    fn table_ref<'q>(
        &mut self,
        table_ref: &'q TableRef,
        scope: &mut Scope,
        joins: &mut Vec<&'q JoinClause>,
    ) {
        match table_ref {
            TableRef::Table {
                schema,
                name,
                alias,
            } => {
                let relation = self.named_table(schema.as_ref(), name, alias.as_ref());
                scope.relations.push(relation);
            }
            TableRef::Subquery { query, alias } => {
                let columns = self.query(query);
                scope.relations.push(Relation {
                    qualifier: alias.clone(),
                    label: alias
                        .as_ref()
                        .map_or_else(|| String::from("subquery"), |a| a.value.clone()),
                    columns,
                    base_table: false,
                    merged: Vec::new(),
                });
            }
            TableRef::Join { left, join } => {
                self.table_ref(left, scope, joins);
                let start = scope.relations.len();
                self.table_ref(&join.table, scope, joins);
                for relation in &mut scope.relations[start..] {
                    relation
                        .merged
                        .extend(join.using.iter().map(|c| c.key.clone()));
                }
                joins.push(join);
            }
        }
    }

    fn named_table(
        &mut self,
        schema: Option<&Ident>,
        name: &Ident,
        alias: Option<&Ident>,
    ) -> Relation {
        let catalog = self.schema;
        let qualifier = Some(alias.unwrap_or(name).clone());
        let unresolved = |label: String| Relation {
            qualifier: qualifier.clone(),
            label,
            columns: Columns::opaque(),
            base_table: false,
            merged: Vec::new(),
        };

        if let Some(schema_ident) = schema {
            let written = format!("{}.{}", schema_ident.value, name.value);
            match &catalog.name {
                Some(expected) if expected.same_as(schema_ident) => {}
                Some(expected) => {
                    self.report_table(
                        written.clone(),
                        format!(
                            "schema '{}' does not match expected schema '{}'",
                            schema_ident.value, expected.value
                        ),
                        Vec::new(),
                    );
                    return unresolved(written);
                }
                None => {
                    self.report_table(
                        written.clone(),
                        format!("schema '{}' not found", schema_ident.value),
                        Vec::new(),
                    );
                    return unresolved(written);
                }
            }
        } else if let Some(columns) = self.lookup_cte(name) {
            return Relation {
                qualifier,
                label: name.value.clone(),
                columns,
                base_table: false,
                merged: Vec::new(),
            };
        }

        match catalog.table(&name.key) {
            Some(table) => Relation {
                qualifier,
                label: table.name.value.clone(),
                columns: Columns::known(table.columns.iter().map(|c| c.name.clone()).collect()),
                base_table: true,
                merged: Vec::new(),
            },
            None => {
                self.report_table(
                    name.value.clone(),
                    String::from("table not found in schema"),
                    catalog.table_names(),
                );
                unresolved(name.value.clone())
            }
        }
    }

    fn expr(&mut self, expr: &Expr, aliases: Aliases) {
        match expr {
            Expr::Literal(_) | Expr::Wildcard { table: None } => {}
            Expr::Column { table: None, name } => self.unqualified_column(name, aliases),
            Expr::Column {
                table: Some(table),
                name,
            } => self.qualified_column(table, Some(name)),
            Expr::Wildcard { table: Some(table) } => self.qualified_column(table, None),
            Expr::Binary { left, right, .. } => {
                self.expr(left, aliases);
                self.expr(right, aliases);
            }
            Expr::Unary { operand: inner, .. }
            | Expr::Paren(inner)
            | Expr::Cast { expr: inner, .. }
            | Expr::IsNull { expr: inner, .. } => self.expr(inner, aliases),
            Expr::Function(call) => {
                for arg in &call.args {
                    self.expr(arg, aliases);
                }
                if let Some(over) = &call.over {
                    for expr in &over.partition_by {
                        self.expr(expr, aliases);
                    }
                    for item in &over.order_by {
                        self.expr(&item.expr, aliases);
                    }
                }
            }
            Expr::Subquery(query) | Expr::Exists { query, .. } => {
                self.query(query);
            }
            Expr::InSubquery { expr, query, .. } => {
                self.expr(expr, aliases);
                self.query(query);
            }
            Expr::InList { expr, list, .. } => {
                self.expr(expr, aliases);
                for item in list {
                    self.expr(item, aliases);
                }
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                self.expr(expr, aliases);
                self.expr(low, aliases);
                self.expr(high, aliases);
            }
            Expr::Like { expr, pattern, .. } => {
                self.expr(expr, aliases);
                self.expr(pattern, aliases);
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(operand) = operand {
                    self.expr(operand, aliases);
                }
                for (when, then) in when_clauses {
                    self.expr(when, aliases);
                    self.expr(then, aliases);
                }
                if let Some(else_clause) = else_clause {
                    self.expr(else_clause, aliases);
                }
            }
        }
    }

    /// A `USING` column names one column on each side of its join, so it
    /// only has to exist somewhere in the FROM clause.
    fn using_column(&mut self, name: &Ident) {
        let Some(scope) = self.scopes.last() else {
            return;
        };
        if scope.relations.iter().any(|r| r.columns.admits(&name.key)) {
            return;
        }
        let candidates = scope.available_columns();
        self.report_column(
            name.value.clone(),
            String::from("not found in any table in scope"),
            candidates,
        );
    }

    fn unqualified_column(&mut self, name: &Ident, aliases: Aliases) {
        if let Some(issue) = self.resolve_unqualified(name, aliases) {
            self.report(ValidationIssue::InvalidColumn(issue));
        }
    }

    /// Resolves `name`, searching the innermost scope first. Returns the
    /// issue to report, if any.
    fn resolve_unqualified(&self, name: &Ident, aliases: Aliases) -> Option<ColumnIssue> {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            let matching = scope.sources_of(&name.key);
            match matching.len() {
                0 => {}
                1 => return None,
                _ => {
                    let tables: Vec<String> = matching.iter().map(|r| r.label.clone()).collect();
                    return Some(ColumnIssue {
                        column: name.value.clone(),
                        reason: format!("ambiguous across joined tables: {}", tables.join(", ")),
                        candidates: tables,
                    });
                }
            }

            let alias_visible = depth == 0
                && aliases == Aliases::Visible
                && scope.aliases.iter().any(|a| a.same_as(name));
            let implicit_rowid =
                is_rowid(&name.key) && scope.relations.iter().any(|r| r.base_table);
            if alias_visible || implicit_rowid || scope.has_incomplete_relation() {
                return None;
            }
        }

        Some(ColumnIssue {
            column: name.value.clone(),
            reason: String::from("not found in any table in scope"),
            candidates: self
                .scopes
                .last()
                .map(Scope::available_columns)
                .unwrap_or_default(),
        })
    }

    /// Resolves `qualifier.name`, or `qualifier.*` when `name` is `None`.
    fn qualified_column(&mut self, qualifier: &Ident, name: Option<&Ident>) {
        let written = format!(
            "{}.{}",
            qualifier.value,
            name.map_or("*", |n| n.value.as_str())
        );

        let found = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.relation(qualifier));
        let Some(relation) = found else {
            let candidates = self
                .scopes
                .last()
                .map(Scope::qualifiers)
                .unwrap_or_default();
            self.report_column(
                written,
                format!(
                    "not found: table or alias '{}' is not in scope",
                    qualifier.value
                ),
                candidates,
            );
            return;
        };

        let Some(name) = name else {
            return;
        };
        if relation.columns.admits(&name.key) || (relation.base_table && is_rowid(&name.key)) {
            return;
        }
        let reason = format!("not found in table '{}'", relation.label);
        let candidates = relation.columns.display_names();
        self.report_column(written, reason, candidates);
    }
}
