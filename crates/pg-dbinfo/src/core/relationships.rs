//! Derivation of `has_many` / `belongs_to` relationship lists from foreign keys.
//!
//! For every foreign key FK declared on table T and referencing table R:
//!
//! - T gains one `belongs_to` entry pointing at R, with T's columns as local.
//! - R, if it is part of the same table set, gains one `has_many` entry pointing
//!   at T, with the column roles swapped.
//!
//! A foreign key whose target is not in the set (filtered schema, excluded table)
//! still yields its `belongs_to` entry. Self-references yield both entries on the
//! same table. Entries are produced per constraint, never merged per table pair.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{DbInfoError, Result};

use super::schema::{ForeignKey, Relationship, Table, TableKey};

/// Populate `has_many` and `belongs_to` on every table.
///
/// Existing relationship contents are replaced. `belongs_to` follows foreign key
/// declaration order; `has_many` follows table-then-foreign-key iteration order
/// of `tables`, so the output is deterministic for a given input order.
///
/// # Errors
///
/// Returns [`DbInfoError::Integrity`] for a duplicated table key or a foreign key
/// whose local and referenced column counts differ. Validation runs before any
/// table is touched.
pub fn build_relationships(tables: &mut [Table]) -> Result<()> {
    let (has_many, belongs_to) = {
        let index = index_tables(tables)?;

        for table in tables.iter() {
            for fk in &table.foreign_keys {
                fk.validate(&table.full_name())?;
            }
        }

        let mut has_many: Vec<Vec<Relationship>> = vec![Vec::new(); tables.len()];
        let mut belongs_to: Vec<Vec<Relationship>> = tables
            .iter()
            .map(|t| Vec::with_capacity(t.foreign_keys.len()))
            .collect();

        for (pos, table) in tables.iter().enumerate() {
            for fk in &table.foreign_keys {
                belongs_to[pos].push(belongs_to_entry(fk));

                match index.get(&fk.target()) {
                    Some(&target) => {
                        if fk.is_self_reference(table) {
                            debug!("{} references itself through {}", table.full_name(), fk.name);
                        }
                        has_many[target].push(has_many_entry(table, fk));
                    }
                    None => warn!(
                        "Foreign key {} on {} references {}, which is not part of the introspected set",
                        fk.name,
                        table.full_name(),
                        fk.target()
                    ),
                }
            }
        }

        (has_many, belongs_to)
    };

    for ((table, has_many), belongs_to) in tables.iter_mut().zip(has_many).zip(belongs_to) {
        table.has_many = has_many;
        table.belongs_to = belongs_to;
    }

    debug!(
        "Built relationships for {} tables ({} foreign keys)",
        tables.len(),
        tables.iter().map(|t| t.foreign_keys.len()).sum::<usize>()
    );
    Ok(())
}

/// Map each table key to its position, rejecting duplicates.
fn index_tables(tables: &[Table]) -> Result<HashMap<TableKey<'_>, usize>> {
    let mut index = HashMap::with_capacity(tables.len());
    for (pos, table) in tables.iter().enumerate() {
        if index.insert(table.key(), pos).is_some() {
            return Err(DbInfoError::integrity(
                table.full_name(),
                "table key",
                "table appears more than once in the introspected set",
            ));
        }
    }
    Ok(index)
}

fn belongs_to_entry(fk: &ForeignKey) -> Relationship {
    Relationship {
        related_table: fk.ref_table.clone(),
        related_schema: fk.ref_schema.clone(),
        foreign_key_name: fk.name.clone(),
        local_columns: fk.columns.clone(),
        related_columns: fk.ref_columns.clone(),
        on_update: fk.on_update,
        on_delete: fk.on_delete,
    }
}

// Seen from the referenced table, its own key columns are local.
fn has_many_entry(owner: &Table, fk: &ForeignKey) -> Relationship {
    let (related_columns, local_columns) = fk
        .column_pairs()
        .map(|(local, referenced)| (local.to_string(), referenced.to_string()))
        .unzip();
    Relationship {
        related_table: owner.name.clone(),
        related_schema: owner.schema.clone(),
        foreign_key_name: fk.name.clone(),
        local_columns,
        related_columns,
        on_update: fk.on_update,
        on_delete: fk.on_delete,
    }
}
