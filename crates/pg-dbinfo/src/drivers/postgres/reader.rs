//! PostgreSQL catalog reader implementation.
//!
//! Implements [`CatalogReader`] over `pg_catalog` and `information_schema`.
//! Uses deadpool-postgres for connection pooling so the assembler can fetch
//! several tables at once.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::Row;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::core::rows::{ColumnRow, ForeignKeyRow, IndexRow, TableRow};
use crate::core::schema::ReferentialAction;
use crate::core::traits::CatalogReader;
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::error::{DbInfoError, Result};

const LIST_TABLES: &str = r#"
    SELECT
        n.nspname::text,
        c.relname::text,
        obj_description(c.oid, 'pg_class')
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind IN ('r', 'p')
      AND NOT c.relispartition
      AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
      AND n.nspname NOT LIKE 'pg_temp%'
      AND n.nspname NOT LIKE 'pg_toast_temp%'
      AND (cardinality($1::text[]) = 0 OR n.nspname = ANY($1::text[]))
    ORDER BY n.nspname, c.relname
"#;

// Primary key membership is resolved against the table's own OID so a same-named
// table in another schema cannot leak its key columns.
const LOAD_COLUMNS: &str = r#"
    SELECT
        c.column_name::text,
        c.data_type::text,
        c.is_nullable = 'YES',
        c.column_default::text,
        col_description(cls.oid, c.ordinal_position::int4),
        EXISTS (
            SELECT 1
            FROM pg_catalog.pg_constraint pk
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = pk.conrelid AND a.attnum = ANY(pk.conkey)
            WHERE pk.conrelid = cls.oid
              AND pk.contype = 'p'
              AND a.attname = c.column_name
        )
    FROM information_schema.columns c
    JOIN pg_catalog.pg_namespace n ON n.nspname = c.table_schema
    JOIN pg_catalog.pg_class cls ON cls.relnamespace = n.oid AND cls.relname = c.table_name
    WHERE c.table_schema = $1 AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

// Expression slots in indkey are 0 and match no attribute, so only plain
// columns end up in the column list.
const LOAD_INDEXES: &str = r#"
    SELECT
        i.relname::text,
        ix.indisunique,
        ARRAY(
            SELECT a.attname::text
            FROM unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = ix.indrelid AND a.attnum = k.attnum
            ORDER BY k.ord
        ),
        pg_get_expr(ix.indexprs, ix.indrelid)
    FROM pg_catalog.pg_index ix
    JOIN pg_catalog.pg_class t ON t.oid = ix.indrelid
    JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
    WHERE n.nspname = $1
      AND t.relname = $2
      AND NOT ix.indisprimary
    ORDER BY i.relname
"#;

// A key referencing a partitioned table is cloned once per partition; the
// clones carry a nonzero conparentid and are skipped.
const LOAD_FOREIGN_KEYS: &str = r#"
    SELECT
        con.conname::text,
        ARRAY(
            SELECT a.attname::text
            FROM unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = con.conrelid AND a.attnum = k.attnum
            ORDER BY k.ord
        ),
        rn.nspname::text,
        rt.relname::text,
        ARRAY(
            SELECT a.attname::text
            FROM unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord)
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = con.confrelid AND a.attnum = k.attnum
            ORDER BY k.ord
        ),
        con.confupdtype::text,
        con.confdeltype::text
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class t ON t.oid = con.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_catalog.pg_class rt ON rt.oid = con.confrelid
    JOIN pg_catalog.pg_namespace rn ON rn.oid = rt.relnamespace
    WHERE con.contype = 'f'
      AND con.conparentid = 0
      AND n.nspname = $1
      AND t.relname = $2
    ORDER BY con.conname
"#;

/// PostgreSQL catalog reader.
pub struct PostgresReader {
    pool: Pool,
}

impl PostgresReader {
    /// Connect to PostgreSQL and verify the connection with a trivial query.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pg_config = config.pg_config()?;
        let ssl_mode = SslMode::parse(&config.ssl_mode)?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = match TlsBuilder::new(ssl_mode).build()? {
            Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config)
            }
        };
        let pool = Pool::builder(mgr)
            .max_size(config.pool_size.max(1))
            .build()
            .map_err(|e| DbInfoError::pool(e, "creating PostgreSQL catalog pool"))?;

        let client = pool
            .get()
            .await
            .map_err(|e| DbInfoError::pool(e, "testing PostgreSQL connection"))?;
        client.simple_query("SELECT 1").await?;

        info!("Connected to PostgreSQL: {}", config.describe());

        Ok(Self { pool })
    }

    async fn client(&self, purpose: &str) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| DbInfoError::pool(e, format!("getting connection for {}", purpose)))
    }
}

fn table_row(row: &Row) -> TableRow {
    TableRow {
        schema: row.get(0),
        name: row.get(1),
        comment: row.get(2),
    }
}

fn column_row(row: &Row) -> ColumnRow {
    ColumnRow {
        name: row.get(0),
        data_type: row.get(1),
        is_nullable: row.get(2),
        default_value: row.get(3),
        comment: row.get(4),
        is_primary_key: row.get(5),
    }
}

fn index_row(row: &Row) -> IndexRow {
    IndexRow {
        name: row.get(0),
        is_unique: row.get(1),
        columns: row.get(2),
        expression: row.get(3),
    }
}

fn foreign_key_row(row: &Row) -> ForeignKeyRow {
    ForeignKeyRow {
        name: row.get(0),
        columns: row.get(1),
        ref_schema: row.get(2),
        ref_table: row.get(3),
        ref_columns: row.get(4),
        on_update: action_text(row.get(5)),
        on_delete: action_text(row.get(6)),
    }
}

/// Translate a `pg_constraint` action code to its SQL text.
///
/// Unknown codes pass through untouched and are rejected during assembly.
fn action_text(code: String) -> String {
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => ReferentialAction::from_pg_code(c)
            .map(|action| action.as_sql().to_string())
            .unwrap_or(code),
        _ => code,
    }
}

#[async_trait]
impl CatalogReader for PostgresReader {
    async fn database_name(&self) -> Result<String> {
        let client = self.client("database_name").await?;
        let row = client.query_one("SELECT current_database()::text", &[]).await?;
        Ok(row.get(0))
    }

    async fn list_tables(&self, schemas: &[String]) -> Result<Vec<TableRow>> {
        let client = self.client("list_tables").await?;
        let rows = client.query(LIST_TABLES, &[&schemas]).await?;
        let tables: Vec<TableRow> = rows.iter().map(table_row).collect();

        if schemas.is_empty() {
            debug!("Found {} tables in all user schemas", tables.len());
        } else {
            debug!("Found {} tables in schemas {:?}", tables.len(), schemas);
        }
        Ok(tables)
    }

    async fn load_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnRow>> {
        let client = self.client("load_columns").await?;
        let rows = client.query(LOAD_COLUMNS, &[&schema, &table]).await?;
        let columns: Vec<ColumnRow> = rows.iter().map(column_row).collect();

        debug!("Loaded {} columns for {}.{}", columns.len(), schema, table);
        Ok(columns)
    }

    async fn load_indexes(&self, schema: &str, table: &str) -> Result<Vec<IndexRow>> {
        let client = self.client("load_indexes").await?;
        let rows = client.query(LOAD_INDEXES, &[&schema, &table]).await?;
        let indexes: Vec<IndexRow> = rows.iter().map(index_row).collect();

        debug!("Loaded {} indexes for {}.{}", indexes.len(), schema, table);
        Ok(indexes)
    }

    async fn load_foreign_keys(&self, schema: &str, table: &str) -> Result<Vec<ForeignKeyRow>> {
        let client = self.client("load_foreign_keys").await?;
        let rows = client.query(LOAD_FOREIGN_KEYS, &[&schema, &table]).await?;
        let fks: Vec<ForeignKeyRow> = rows.iter().map(foreign_key_row).collect();

        debug!("Loaded {} foreign keys for {}.{}", fks.len(), schema, table);
        Ok(fks)
    }

    fn db_type(&self) -> &str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close();
    }
}
