//! Database driver implementations.
//!
//! - [`postgres`]: PostgreSQL catalog reader
//! - [`common`]: Shared utilities (TLS)
//!
//! Each driver implements [`CatalogReader`](crate::core::CatalogReader); the
//! assembler only ever sees the trait.

pub mod common;
pub mod postgres;

pub use common::{SslMode, TlsBuilder};
pub use postgres::PostgresReader;
