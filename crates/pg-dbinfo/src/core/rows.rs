//! Raw rows as yielded by a catalog reader, before assembly.
//!
//! These mirror the catalog query output one-to-one: nullable catalog fields are
//! `Option`, referential actions are still the catalog's text.

/// One table from the table listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub schema: String,
    pub name: String,
    pub comment: Option<String>,
}

/// One column of a table, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,
    pub is_primary_key: bool,
}

/// One non-primary index of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub name: String,
    pub is_unique: bool,
    pub columns: Vec<String>,
    pub expression: Option<String>,
}

/// One foreign key constraint of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_update: String,
    pub on_delete: String,
}
