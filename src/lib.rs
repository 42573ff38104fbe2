//! Relstore - schema-driven data access layer over a relational backend
//!
//! This crate maps a generic entity-attribute-value object model onto a
//! narrow relational layout and provides:
//! - An immutable query AST with typed leaf values
//! - A schema catalog (classes, properties, relationships, derived properties)
//! - A pure SQL expression compiler
//! - A relationship-aware query translator that turns schema-relative
//!   queries into joined SQL statements and returns object identifiers

pub mod config;
pub mod errors;
pub mod executor;
pub mod model;
pub mod query_model;
pub mod schema_catalog;
pub mod sql_generator;
pub mod translator;

pub use config::StorageConfig;
pub use errors::StorageError;
pub use executor::SqlExecutor;
pub use query_model::Query;
pub use schema_catalog::data_schema::DataSchema;
pub use translator::QueryTranslator;
