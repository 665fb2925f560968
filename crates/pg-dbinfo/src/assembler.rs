//! Assembly of catalog rows into the [`Schema`] object graph.
//!
//! The assembler lists tables through a [`CatalogReader`], fetches each table's
//! columns, indexes and foreign keys (up to `concurrency` tables at a time),
//! sorts the result by `(schema, name)` and hands it to the relationship builder.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::config::IntrospectionConfig;
use crate::core::relationships::build_relationships;
use crate::core::rows::{ColumnRow, ForeignKeyRow, IndexRow, TableRow};
use crate::core::schema::{Column, ForeignKey, Index, ReferentialAction, Schema, Table};
use crate::core::traits::CatalogReader;
use crate::error::{DbInfoError, Result};

/// Builds a [`Schema`] from a catalog reader.
pub struct SchemaAssembler<'a> {
    reader: &'a dyn CatalogReader,
    options: IntrospectionConfig,
}

impl<'a> SchemaAssembler<'a> {
    pub fn new(reader: &'a dyn CatalogReader, options: IntrospectionConfig) -> Self {
        Self { reader, options }
    }

    /// Run a full introspection: tables, per-table metadata, relationships.
    pub async fn assemble(&self) -> Result<Schema> {
        let name = self.reader.database_name().await?;

        let table_rows: Vec<TableRow> = self
            .reader
            .list_tables(&self.options.schemas)
            .await?
            .into_iter()
            .filter(|row| !self.options.is_excluded(&row.schema, &row.name))
            .collect();

        info!(
            "Introspecting {} tables from {} database '{}' ({} at a time)",
            table_rows.len(),
            self.reader.db_type(),
            name,
            self.options.concurrency
        );

        let mut tables: Vec<Table> = stream::iter(table_rows)
            .map(|row| self.load_table(row))
            .buffered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        tables.sort_by(|a, b| a.key().cmp(&b.key()));
        build_relationships(&mut tables)?;

        let schema = Schema { name, tables };
        info!(
            "Assembled {} tables with {} relationship entries",
            schema.table_count(),
            schema.relationship_count()
        );
        Ok(schema)
    }

    async fn load_table(&self, row: TableRow) -> Result<Table> {
        let mut table = Table::new(row.schema, row.name);
        table.comment = row.comment;

        let columns = self
            .reader
            .load_columns(&table.schema, &table.name)
            .await?;
        let indexes = self
            .reader
            .load_indexes(&table.schema, &table.name)
            .await?;
        let foreign_keys = self
            .reader
            .load_foreign_keys(&table.schema, &table.name)
            .await?;

        let full_name = table.full_name();
        table.columns = columns.into_iter().map(map_column).collect();
        table.indexes = indexes.into_iter().map(map_index).collect();
        table.foreign_keys = foreign_keys
            .into_iter()
            .map(|fk| map_foreign_key(&full_name, fk))
            .collect::<Result<_>>()?;

        debug!(
            "Loaded {}: {} columns, {} indexes, {} foreign keys",
            table.full_name(),
            table.columns.len(),
            table.indexes.len(),
            table.foreign_keys.len()
        );
        Ok(table)
    }
}

/// Convenience wrapper: assemble a schema with the given options.
pub async fn introspect(
    reader: &dyn CatalogReader,
    options: IntrospectionConfig,
) -> Result<Schema> {
    SchemaAssembler::new(reader, options).assemble().await
}

pub(crate) fn map_column(row: ColumnRow) -> Column {
    Column {
        name: row.name,
        data_type: row.data_type,
        nullable: row.is_nullable,
        default_value: row.default_value,
        comment: row.comment,
        is_primary_key: row.is_primary_key,
    }
}

pub(crate) fn map_index(row: IndexRow) -> Index {
    Index {
        name: row.name,
        unique: row.is_unique,
        columns: row.columns,
        expression: row.expression,
    }
}

pub(crate) fn map_foreign_key(table: &str, row: ForeignKeyRow) -> Result<ForeignKey> {
    let on_update = parse_action(table, &row.name, &row.on_update)?;
    let on_delete = parse_action(table, &row.name, &row.on_delete)?;

    let fk = ForeignKey {
        name: row.name,
        columns: row.columns,
        ref_schema: row.ref_schema,
        ref_table: row.ref_table,
        ref_columns: row.ref_columns,
        on_update,
        on_delete,
    };
    fk.validate(table)?;
    Ok(fk)
}

fn parse_action(table: &str, constraint: &str, action: &str) -> Result<ReferentialAction> {
    ReferentialAction::parse(action).ok_or_else(|| {
        DbInfoError::integrity(
            table,
            constraint,
            format!("unknown referential action '{}'", action),
        )
    })
}
