//! DuckDB SQL dialect implementation

use super::SqlDialect;
use crate::data::filters::ColumnType;

/// DuckDB SQL dialect
///
/// The statements are executed by DuckDB-WASM in the browser against a
/// locally registered parquet file.
pub struct DuckdbDialect;

impl SqlDialect for DuckdbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident)
    }

    fn typed_placeholder(&self, column_type: ColumnType, placeholder: &str) -> String {
        match column_type {
            ColumnType::Date => format!("{}::DATE", placeholder),
            // Datetimes travel as epoch milliseconds
            ColumnType::Datetime => format!("epoch_ms({}::BIGINT)", placeholder),
            ColumnType::Boolean | ColumnType::Float | ColumnType::Integer | ColumnType::String => {
                placeholder.to_string()
            }
        }
    }

    fn cast_to_string(&self, col: &str) -> String {
        format!("{}::VARCHAR", col)
    }

    fn contains_ignore_case(&self, col: &str, placeholder: &str) -> String {
        format!("CONTAINS(LOWER({}), LOWER({}))", col, placeholder)
    }

    fn starts_with(&self, col: &str, placeholder: &str) -> String {
        format!("STARTS_WITH({}, {})", col, placeholder)
    }

    fn ends_with(&self, col: &str, placeholder: &str) -> String {
        format!("ENDS_WITH({}, {})", col, placeholder)
    }
}
