//! PostgreSQL driver.
//!
//! - [`PostgresReader`]: catalog reader for PostgreSQL databases

mod reader;

pub use reader::PostgresReader;
