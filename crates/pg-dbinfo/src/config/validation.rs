//! Configuration validation.

use super::Config;
use crate::drivers::common::SslMode;
use crate::error::{DbInfoError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let db = &config.database;

    if db.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
        return Err(DbInfoError::Config("database.url cannot be empty".into()));
    }
    if db.url.is_none() {
        if db.host.is_empty() {
            return Err(DbInfoError::Config(
                "database.host is required when database.url is not set".into(),
            ));
        }
        if db.database.is_empty() {
            return Err(DbInfoError::Config(
                "database.database is required when database.url is not set".into(),
            ));
        }
        if db.user.is_empty() {
            return Err(DbInfoError::Config(
                "database.user is required when database.url is not set".into(),
            ));
        }
    }
    SslMode::parse(&db.ssl_mode)?;

    if db.pool_size == 0 {
        return Err(DbInfoError::Config(
            "database.pool_size must be at least 1".into(),
        ));
    }
    if config.introspection.concurrency == 0 {
        return Err(DbInfoError::Config(
            "introspection.concurrency must be at least 1".into(),
        ));
    }
    if config.introspection.schemas.iter().any(|s| s.is_empty()) {
        return Err(DbInfoError::Config(
            "introspection.schemas cannot contain empty names".into(),
        ));
    }
    if let Some(bad) = config
        .introspection
        .exclude_tables
        .iter()
        .find(|t| t.split_once('.').map_or(true, |(s, n)| s.is_empty() || n.is_empty()))
    {
        return Err(DbInfoError::Config(format!(
            "introspection.exclude_tables entry '{}' must be qualified as schema.table",
            bad
        )));
    }

    Ok(())
}
