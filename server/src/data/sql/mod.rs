//! SQL abstraction layer
//!
//! The filter compiler is written against [`SqlDialect`] so that engine
//! spelling stays out of the clause-assembly logic. Statements are currently
//! produced for DuckDB only.

mod dialect;
mod duckdb_dialect;

pub use dialect::SqlDialect;
pub use duckdb_dialect::DuckdbDialect;
