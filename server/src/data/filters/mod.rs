//! Grid filter compilation
//!
//! Turns the filter model of a data grid into parameterized DuckDB SQL.
//! Values are always bound; identifiers are validated and quoted.
//!
//! ## Usage
//!
//! ```no_run
//! use pqviewer_server::data::filters::{FilterLimits, TableName, compile, parse_filters};
//!
//! let json = r#"[{"type": "date", "column": "date_col", "operator": ">", "value": "2024-01-02"}]"#;
//! let rules = parse_filters(json, &FilterLimits::default()).unwrap();
//! let table = TableName::parse("numbers").unwrap();
//! let spec = compile(&table, &rules);
//! assert_eq!(spec.values.len(), 1);
//! ```

mod compiler;
mod error;
mod parser;
mod types;

pub use compiler::{Page, QuerySpec, SqlParams, compile, compile_with};
pub use error::FilterError;
pub use parser::{
    DEFAULT_MAX_FILTER_JSON_BYTES, DEFAULT_MAX_FILTERS, FilterDescriptor, FilterLimits,
    parse_filters,
};
pub use types::{
    Arity, ColumnType, FilterRule, FilterValue, Operator, TableName, is_valid_identifier,
};
