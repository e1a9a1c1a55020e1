//! SQL dialect trait
//!
//! This trait defines the database-specific spelling of the fragments the
//! filter compiler emits. Everything structural (clause order, AND-joining,
//! bind order) lives in the compiler; only syntax lives here.

use crate::data::filters::ColumnType;

/// SQL dialect trait for generating database-specific SQL
///
/// Different engines have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - Identifier quoting
/// - Casting a bound value to a date or timestamp
/// - Text matching functions
/// - Limit/offset clauses
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - DuckDB: Always returns "?"
    fn placeholder(&self, index: usize) -> String;

    /// Quote an identifier that has already passed identifier validation
    ///
    /// - DuckDB: `"name"`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Wrap a placeholder so a client-encoded value compares correctly
    /// against a column of the given declared type
    ///
    /// - DuckDB date: `?::DATE`
    /// - DuckDB datetime (epoch milliseconds): `epoch_ms(?::BIGINT)`
    fn typed_placeholder(&self, column_type: ColumnType, placeholder: &str) -> String;

    /// Cast a column to string type
    ///
    /// - DuckDB: `col::VARCHAR`
    fn cast_to_string(&self, col: &str) -> String;

    /// Case-insensitive substring test
    ///
    /// - DuckDB: `CONTAINS(LOWER(col), LOWER(?))`
    fn contains_ignore_case(&self, col: &str, placeholder: &str) -> String;

    /// Prefix test
    ///
    /// - DuckDB: `STARTS_WITH(col, ?)`
    fn starts_with(&self, col: &str, placeholder: &str) -> String;

    /// Suffix test
    ///
    /// - DuckDB: `ENDS_WITH(col, ?)`
    fn ends_with(&self, col: &str, placeholder: &str) -> String;

    /// Generate LIMIT/OFFSET clause
    ///
    /// Most databases use `LIMIT x OFFSET y`, but syntax may vary.
    fn limit_offset(&self, limit: u64, offset: u64) -> String {
        format!("LIMIT {} OFFSET {}", limit, offset)
    }
}
