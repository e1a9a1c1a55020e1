//! Parquet viewer query service
//!
//! Compiles a data grid's filter model into parameterized DuckDB SQL and
//! serves it over HTTP.

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod utils;
