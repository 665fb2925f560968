//! Error types for catalog introspection.

use thiserror::Error;

/// Main error type for introspection operations.
#[derive(Error, Debug)]
pub enum DbInfoError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog query or connection error
    #[error("Catalog query error: {0}")]
    Catalog(#[from] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Catalog data violates a structural invariant of the object graph
    #[error("Integrity violation on {table} ({constraint}): {message}")]
    Integrity {
        table: String,
        constraint: String,
        message: String,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbInfoError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        DbInfoError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create an Integrity error for a table and one of its constraints
    pub fn integrity(
        table: impl Into<String>,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DbInfoError::Integrity {
            table: table.into(),
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            DbInfoError::Config(_) | DbInfoError::Yaml(_) => 2,
            DbInfoError::Integrity { .. } => 3,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, DbInfoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DbInfoError::Config("bad".into()).exit_code(), 2);
        assert_eq!(
            DbInfoError::integrity("public.orders", "fk_x", "mismatch").exit_code(),
            3
        );
        assert_eq!(DbInfoError::pool("down", "connecting").exit_code(), 1);

        let yaml = serde_yaml::from_str::<Vec<String>>("{").unwrap_err();
        assert_eq!(DbInfoError::from(yaml).exit_code(), 2);
    }

    #[test]
    fn test_integrity_message() {
        let err = DbInfoError::integrity("public.orders", "orders_customer_fk", "2 vs 1 columns");
        assert_eq!(
            err.to_string(),
            "Integrity violation on public.orders (orders_customer_fk): 2 vs 1 columns"
        );
    }

    #[test]
    fn test_format_detailed_includes_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.yaml missing");
        let err = DbInfoError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error: config.yaml missing"));
    }
}
