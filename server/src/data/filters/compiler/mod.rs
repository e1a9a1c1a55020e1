//! Clause compiler
//!
//! Turns a table name and an ordered list of [`FilterRule`]s into a
//! parameterized `SELECT` plus a matching `COUNT(*)` statement. Compilation is
//! total: every rule either yields a clause or is skipped, never an error.


use serde::Serialize;

use super::error::FilterError;
use super::types::{ColumnType, FilterRule, FilterValue, Operator, TableName};
use crate::data::sql::{DuckdbDialect, SqlDialect};

/// Seed of the WHERE accumulator, so an empty rule list still yields valid SQL
const WHERE_SEED: &str = "true";

/// SQL parameters collector
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<FilterValue>,
}

impl SqlParams {
    /// Append a bind value and return its placeholder
    pub fn bind(&mut self, dialect: &dyn SqlDialect, value: &FilterValue) -> String {
        self.values.push(value.clone());
        dialect.placeholder(self.values.len())
    }

    fn bind_typed(
        &mut self,
        dialect: &dyn SqlDialect,
        column_type: ColumnType,
        value: &FilterValue,
    ) -> String {
        let placeholder = self.bind(dialect, value);
        dialect.typed_placeholder(column_type, &placeholder)
    }
}

/// Compiled query, ready to be executed by the client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpec {
    pub statement: String,
    pub count_statement: String,
    /// Bind values in placeholder order
    pub values: Vec<FilterValue>,
}

impl QuerySpec {
    /// Append LIMIT/OFFSET to `statement`. `count_statement` is left alone.
    pub fn paginate(&mut self, dialect: &dyn SqlDialect, page: Page) {
        self.statement.push(' ');
        self.statement
            .push_str(&dialect.limit_offset(page.per_page(), page.offset()));
    }
}

/// 1-based page of `per_page` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u64,
    per_page: u64,
}

impl Page {
    pub fn new(page: u64, per_page: u64) -> Result<Self, FilterError> {
        if page == 0 {
            return Err(FilterError::InvalidPage("page must be at least 1".into()));
        }
        if per_page == 0 {
            return Err(FilterError::InvalidPage(
                "perPage must be at least 1".into(),
            ));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Compile rules for DuckDB
pub fn compile(table: &TableName, rules: &[FilterRule]) -> QuerySpec {
    compile_with(&DuckdbDialect, table, rules)
}

/// Compile rules for the given dialect
pub fn compile_with(dialect: &dyn SqlDialect, table: &TableName, rules: &[FilterRule]) -> QuerySpec {
    let mut params = SqlParams::default();
    let mut clauses = vec![WHERE_SEED.to_string()];
    clauses.extend(
        rules
            .iter()
            .filter_map(|rule| rule_to_sql(dialect, rule, &mut params)),
    );

    let where_clause = clauses.join(" AND ");
    let table_sql = dialect.quote_identifier(table.as_str());

    tracing::debug!(
        table = %table,
        dialect = dialect.name(),
        rules = rules.len(),
        clauses = clauses.len() - 1,
        values = params.values.len(),
        "Compiled filters"
    );

    QuerySpec {
        statement: format!("SELECT * FROM {} WHERE {}", table_sql, where_clause),
        count_statement: format!("SELECT COUNT(*) FROM {} WHERE {}", table_sql, where_clause),
        values: params.values,
    }
}

/// Build the clause for one rule, binding its values into `params`.
///
/// Returns `None` for rules that contribute nothing; such rules bind nothing.
fn rule_to_sql(dialect: &dyn SqlDialect, rule: &FilterRule, params: &mut SqlParams) -> Option<String> {
    let col = dialect.quote_identifier(rule.column());
    let column_type = rule.column_type();

    match rule.operator() {
        Operator::IsNull => return Some(format!("{} IS NULL", col)),
        Operator::IsNotNull => return Some(format!("{} IS NOT NULL", col)),
        _ => {}
    }

    if rule.is_incomplete() {
        tracing::debug!(
            column = rule.column(),
            operator = ?rule.operator(),
            "Skipping filter without a value"
        );
        return None;
    }
    let value = rule.value()?;

    let text_col = || match column_type {
        ColumnType::String => col.clone(),
        _ => dialect.cast_to_string(&col),
    };

    let clause = match rule.operator() {
        Operator::Equals => compare(dialect, params, rule, &col, "=", value),
        Operator::NotEqual => compare(dialect, params, rule, &col, "!=", value),
        Operator::GreaterThan => compare(dialect, params, rule, &col, ">", value),
        Operator::GreaterThanOrEqual => compare(dialect, params, rule, &col, ">=", value),
        Operator::LessThan => compare(dialect, params, rule, &col, "<", value),
        Operator::LessThanOrEqual => compare(dialect, params, rule, &col, "<=", value),
        Operator::Between => {
            let value_to = rule.value_to()?;
            let low = params.bind_typed(dialect, column_type, value);
            let high = params.bind_typed(dialect, column_type, value_to);
            format!("{} BETWEEN {} AND {}", col, low, high)
        }
        Operator::Contains => {
            let p = params.bind(dialect, value);
            dialect.contains_ignore_case(&text_col(), &p)
        }
        Operator::NotContains => {
            let p = params.bind(dialect, value);
            format!("NOT {}", dialect.contains_ignore_case(&text_col(), &p))
        }
        Operator::BeginsWith => {
            let p = params.bind(dialect, value);
            dialect.starts_with(&text_col(), &p)
        }
        Operator::EndsWith => {
            let p = params.bind(dialect, value);
            dialect.ends_with(&text_col(), &p)
        }
        Operator::In => {
            let p = params.bind_typed(dialect, column_type, value);
            format!("{} IN ({})", col, p)
        }
        Operator::NotIn => {
            let p = params.bind_typed(dialect, column_type, value);
            format!("{} NOT IN ({})", col, p)
        }
        Operator::IsNull | Operator::IsNotNull => return None,
        Operator::Other(raw) => match rule.operator().fallback_symbol() {
            Some(symbol) => {
                tracing::debug!(column = rule.column(), operator = %raw, "Using generic operator template");
                let p = params.bind(dialect, value);
                format!("{} {} {}", text_col(), symbol, p)
            }
            None => {
                tracing::warn!(
                    column = rule.column(),
                    operator = %raw,
                    "Dropping filter with unsupported operator"
                );
                return None;
            }
        },
    };

    Some(clause)
}

fn compare(
    dialect: &dyn SqlDialect,
    params: &mut SqlParams,
    rule: &FilterRule,
    col: &str,
    op: &str,
    value: &FilterValue,
) -> String {
    let p = params.bind_typed(dialect, rule.column_type(), value);
    format!("{} {} {}", col, op, p)
}
