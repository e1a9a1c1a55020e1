//! Data layer
//!
//! - `filters` - Grid filter model and the SQL clause compiler
//! - `sql` - SQL dialect abstraction used by the compiler

pub mod filters;
pub mod sql;
