//! Core data model and abstractions.
//!
//! - [`schema`]: Table, column, index, foreign key and relationship types
//! - [`rows`]: Raw catalog rows yielded by readers
//! - [`traits`]: The [`CatalogReader`] trait implemented by drivers
//! - [`relationships`]: Derivation of `has_many`/`belongs_to` from foreign keys

pub mod relationships;
pub mod rows;
pub mod schema;
pub mod traits;

pub use relationships::build_relationships;
pub use rows::{ColumnRow, ForeignKeyRow, IndexRow, TableRow};
pub use schema::{
    Column, ForeignKey, Index, ReferentialAction, Relationship, Schema, Table, TableKey,
};
pub use traits::CatalogReader;
