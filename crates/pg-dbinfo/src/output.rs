//! Rendering of an assembled [`Schema`] as a YAML or JSON document.

use std::path::Path;

use tracing::info;

use crate::config::OutputFormat;
use crate::core::schema::Schema;
use crate::error::Result;

/// Render a schema in the requested format.
///
/// Relationship lists are always emitted, as `[]` when empty.
pub fn render(schema: &Schema, format: OutputFormat) -> Result<String> {
    let mut doc = match format {
        OutputFormat::Yaml => serde_yaml::to_string(schema)?,
        OutputFormat::Json => serde_json::to_string_pretty(schema)?,
    };
    if !doc.ends_with('\n') {
        doc.push('\n');
    }
    Ok(doc)
}

/// Render a schema and write it to `path`.
pub fn write_to_file(schema: &Schema, format: OutputFormat, path: &Path) -> Result<()> {
    let doc = render(schema, format)?;
    std::fs::write(path, doc)?;
    info!(
        "Wrote {} tables to {}",
        schema.table_count(),
        path.display()
    );
    Ok(())
}
