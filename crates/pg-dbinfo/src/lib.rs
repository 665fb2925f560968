//! # pg-dbinfo
//!
//! PostgreSQL schema introspection library.
//!
//! Reads the system catalog of a PostgreSQL database and assembles it into a
//! navigable object graph:
//!
//! - **Tables** with their columns, non-primary indexes and foreign keys
//! - **Relationships** derived from every foreign key, in both directions
//!   (`has_many` on the referenced table, `belongs_to` on the referencing one)
//! - **Rendering** of the whole graph as YAML or JSON
//!
//! ## Example
//!
//! ```rust,no_run
//! use pg_dbinfo::{introspect, CatalogReader, Config, PostgresReader};
//!
//! #[tokio::main]
//! async fn main() -> pg_dbinfo::Result<()> {
//!     let config = Config::from_url("postgresql://postgres@localhost/shop");
//!     let reader = PostgresReader::connect(&config.database).await?;
//!     let schema = introspect(&reader, config.introspection).await?;
//!     for table in &schema.tables {
//!         println!("{}: {} has_many", table.full_name(), table.has_many.len());
//!     }
//!     reader.close().await;
//!     Ok(())
//! }
//! ```

pub mod assembler;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod output;

// Re-exports for convenient access
pub use assembler::{introspect, SchemaAssembler};
pub use config::{Config, DatabaseConfig, IntrospectionConfig, OutputConfig, OutputFormat};
pub use core::{
    build_relationships, CatalogReader, Column, ForeignKey, Index, ReferentialAction,
    Relationship, Schema, Table, TableKey,
};
pub use drivers::{PostgresReader, SslMode};
pub use error::{DbInfoError, Result};
pub use output::render;
