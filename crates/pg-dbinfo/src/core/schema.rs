//! Schema and metadata types for tables, columns, indexes, foreign keys, and
//! the relationships derived from them.
//!
//! Every type here serializes with `serde`. Relationship lists are plain
//! vectors so that they always render, even when empty.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DbInfoError, Result};

/// Top-level container for one introspection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Database name (`current_database()`).
    pub name: String,

    /// Tables, ordered by schema then name.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Find a table by its `(schema, name)` key.
    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == name)
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Total number of derived relationship entries (both directions).
    pub fn relationship_count(&self) -> usize {
        self.tables
            .iter()
            .map(|t| t.has_many.len() + t.belongs_to.len())
            .sum()
    }
}

/// Borrowed `(schema, name)` pair identifying a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey<'a> {
    pub schema: &'a str,
    pub name: &'a str,
}

impl<'a> TableKey<'a> {
    pub fn new(schema: &'a str, name: &'a str) -> Self {
        Self { schema, name }
    }
}

impl fmt::Display for TableKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Table comment, if one is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Columns in ordinal order.
    #[serde(default)]
    pub columns: Vec<Column>,

    /// Non-primary-key indexes.
    #[serde(default)]
    pub indexes: Vec<Index>,

    /// Foreign key constraints declared on this table.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,

    /// Tables holding a foreign key into this one.
    #[serde(default)]
    pub has_many: Vec<Relationship>,

    /// Tables this one references through its foreign keys.
    #[serde(default)]
    pub belongs_to: Vec<Relationship>,
}

impl Table {
    /// Create an empty table with no columns or constraints.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            comment: None,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            has_many: Vec::new(),
            belongs_to: Vec::new(),
        }
    }

    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// The unique lookup key of this table.
    pub fn key(&self) -> TableKey<'_> {
        TableKey::new(&self.schema, &self.name)
    }

    /// Columns that belong to the primary key, in ordinal order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        self.columns.iter().any(|c| c.is_primary_key)
    }

    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find a foreign key by constraint name.
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Type name as reported by the catalog (e.g. "integer", "character varying").
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Default expression, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Column comment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Whether the column is part of the table's primary key constraint.
    pub is_primary_key: bool,
}

/// Index metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Whether the index is unique.
    pub unique: bool,

    /// Plain indexed columns in key order. Empty for a pure expression index.
    #[serde(default)]
    pub columns: Vec<String>,

    /// Index expression for functional indexes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Index {
    /// Check if this index is built over expressions rather than plain columns.
    pub fn is_expression(&self) -> bool {
        self.expression.is_some()
    }
}

/// Foreign key metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,

    /// Local column names.
    pub columns: Vec<String>,

    /// Referenced schema name.
    pub ref_schema: String,

    /// Referenced table name.
    pub ref_table: String,

    /// Referenced column names, positionally paired with `columns`.
    pub ref_columns: Vec<String>,

    /// ON UPDATE action.
    pub on_update: ReferentialAction,

    /// ON DELETE action.
    pub on_delete: ReferentialAction,
}

impl ForeignKey {
    /// The key of the referenced table.
    pub fn target(&self) -> TableKey<'_> {
        TableKey::new(&self.ref_schema, &self.ref_table)
    }

    /// Check if this key references the table it is declared on.
    pub fn is_self_reference(&self, table: &Table) -> bool {
        self.target() == table.key()
    }

    /// Check that local and referenced columns pair up one-to-one.
    pub fn validate(&self, table: &str) -> Result<()> {
        if self.columns.is_empty() {
            return Err(DbInfoError::integrity(
                table,
                &self.name,
                "foreign key has no columns",
            ));
        }
        if self.columns.len() != self.ref_columns.len() {
            return Err(DbInfoError::integrity(
                table,
                &self.name,
                format!(
                    "foreign key has {} local columns but {} referenced columns",
                    self.columns.len(),
                    self.ref_columns.len()
                ),
            ));
        }
        Ok(())
    }

    /// Iterate `(local, referenced)` column pairs.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.ref_columns.iter().map(String::as_str))
    }
}

/// Standard SQL referential actions.
///
/// Serialized as the catalog's literal text (`"NO ACTION"`, `"SET NULL"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl ReferentialAction {
    /// Parse an action from catalog text.
    ///
    /// Accepts both the spaced form used by `information_schema` and the
    /// underscored form, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase().replace('_', " ");
        match normalized.as_str() {
            "NO ACTION" => Some(ReferentialAction::NoAction),
            "RESTRICT" => Some(ReferentialAction::Restrict),
            "CASCADE" => Some(ReferentialAction::Cascade),
            "SET NULL" => Some(ReferentialAction::SetNull),
            "SET DEFAULT" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }

    /// Decode a `pg_constraint.confupdtype` / `confdeltype` code.
    pub fn from_pg_code(code: char) -> Option<Self> {
        match code {
            'a' => Some(ReferentialAction::NoAction),
            'r' => Some(ReferentialAction::Restrict),
            'c' => Some(ReferentialAction::Cascade),
            'n' => Some(ReferentialAction::SetNull),
            'd' => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }

    /// The action as it appears in SQL DDL.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A derived view of one foreign key, seen from one of its two tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// The table on the other side of the foreign key.
    pub related_table: String,

    /// Schema of the related table.
    pub related_schema: String,

    /// Name of the originating foreign key constraint.
    pub foreign_key_name: String,

    /// Columns on the owning table.
    pub local_columns: Vec<String>,

    /// Columns on the related table, positionally paired with `local_columns`.
    pub related_columns: Vec<String>,

    pub on_update: ReferentialAction,

    pub on_delete: ReferentialAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_column(name: &str, is_primary_key: bool) -> Column {
        Column {
            name: name.to_string(),
            data_type: "integer".to_string(),
            nullable: !is_primary_key,
            default_value: None,
            comment: None,
            is_primary_key,
        }
    }

    fn make_test_fk(columns: &[&str], ref_columns: &[&str]) -> ForeignKey {
        ForeignKey {
            name: "fk_test".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ref_schema: "public".to_string(),
            ref_table: "parents".to_string(),
            ref_columns: ref_columns.iter().map(|c| c.to_string()).collect(),
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::Cascade,
        }
    }

    #[test]
    fn test_table_full_name_and_key() {
        let table = Table::new("sales", "orders");
        assert_eq!(table.full_name(), "sales.orders");
        assert_eq!(table.key(), TableKey::new("sales", "orders"));
        assert_eq!(table.key().to_string(), "sales.orders");
    }

    #[test]
    fn test_new_table_has_empty_relationships() {
        let table = Table::new("public", "t");
        assert!(table.has_many.is_empty());
        assert!(table.belongs_to.is_empty());
    }

    #[test]
    fn test_primary_key_columns() {
        let mut table = Table::new("public", "order_lines");
        table.columns = vec![
            make_test_column("order_id", true),
            make_test_column("note", false),
            make_test_column("line_no", true),
        ];
        assert_eq!(table.primary_key_columns(), vec!["order_id", "line_no"]);
        assert!(table.has_pk());
        assert!(table.column("note").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_referential_action_parse() {
        assert_eq!(
            ReferentialAction::parse("NO ACTION"),
            Some(ReferentialAction::NoAction)
        );
        assert_eq!(
            ReferentialAction::parse("NO_ACTION"),
            Some(ReferentialAction::NoAction)
        );
        assert_eq!(
            ReferentialAction::parse("set null"),
            Some(ReferentialAction::SetNull)
        );
        assert_eq!(
            ReferentialAction::parse("CASCADE"),
            Some(ReferentialAction::Cascade)
        );
        assert_eq!(ReferentialAction::parse("EXPLODE"), None);
    }

    #[test]
    fn test_referential_action_pg_codes() {
        assert_eq!(
            ReferentialAction::from_pg_code('r'),
            Some(ReferentialAction::Restrict)
        );
        assert_eq!(
            ReferentialAction::from_pg_code('d'),
            Some(ReferentialAction::SetDefault)
        );
        assert_eq!(ReferentialAction::from_pg_code('x'), None);
    }

    #[test]
    fn test_referential_action_serializes_as_sql_text() {
        let json = serde_json::to_string(&ReferentialAction::SetDefault).unwrap();
        assert_eq!(json, "\"SET DEFAULT\"");
        assert_eq!(ReferentialAction::NoAction.to_string(), "NO ACTION");
    }

    #[test]
    fn test_foreign_key_validate() {
        let ok = make_test_fk(&["a", "b"], &["x", "y"]);
        assert!(ok.validate("public.children").is_ok());
        assert_eq!(
            ok.column_pairs().collect::<Vec<_>>(),
            vec![("a", "x"), ("b", "y")]
        );

        let mismatched = make_test_fk(&["a", "b"], &["x"]);
        let err = mismatched.validate("public.children").unwrap_err();
        assert!(matches!(err, DbInfoError::Integrity { .. }));

        let empty = make_test_fk(&[], &[]);
        assert!(empty.validate("public.children").is_err());
    }

    #[test]
    fn test_self_reference_detection() {
        let table = Table::new("public", "parents");
        let fk = make_test_fk(&["parent_id"], &["id"]);
        assert!(fk.is_self_reference(&table));
        assert!(!fk.is_self_reference(&Table::new("public", "children")));
    }

    #[test]
    fn test_schema_lookup_and_counts() {
        let mut a = Table::new("public", "a");
        a.has_many.push(Relationship {
            related_table: "b".into(),
            related_schema: "public".into(),
            foreign_key_name: "b_a_fk".into(),
            local_columns: vec!["id".into()],
            related_columns: vec!["a_id".into()],
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::NoAction,
        });
        let schema = Schema {
            name: "app".into(),
            tables: vec![a, Table::new("public", "b")],
        };
        assert_eq!(schema.table_count(), 2);
        assert_eq!(schema.relationship_count(), 1);
        assert!(schema.table("public", "b").is_some());
        assert!(schema.table("other", "b").is_none());
    }
}
