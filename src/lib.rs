//! census-query - Interactive query builder for Nomisweb census tables.
//!
//! This library exposes the core modules for use in integration tests.

pub mod api;
pub mod codegen;
pub mod config;
pub mod console;
pub mod error;
pub mod geography;
pub mod query;
